//! Linear navigator over a theorem's instruction hints

use alloc::format;
use alloc::string::String;
use alloc::vec::Vec;

/// Cursor over an immutable instruction log
///
/// The position is always a valid index; the cursor never wraps.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstructionCursor {
    log: Vec<String>,
    position: usize,
}

impl InstructionCursor {
    /// Returns `None` when there is nothing to navigate
    pub fn new(log: Vec<String>) -> Option<Self> {
        if log.is_empty() {
            None
        } else {
            Some(Self { log, position: 0 })
        }
    }

    pub fn position(&self) -> usize {
        self.position
    }

    pub fn len(&self) -> usize {
        self.log.len()
    }

    pub fn is_empty(&self) -> bool {
        self.log.is_empty()
    }

    pub fn current(&self) -> &str {
        &self.log[self.position]
    }

    /// Step back one instruction; at the start this is a no-op
    pub fn back(&mut self) -> &str {
        if self.position > 0 {
            self.position -= 1;
        }
        self.current()
    }

    /// Step forward one instruction; at the end this is a no-op
    pub fn forward(&mut self) -> &str {
        if self.position + 1 < self.log.len() {
            self.position += 1;
        }
        self.current()
    }

    /// 1-based counter, e.g. `2/3`
    pub fn counter(&self) -> String {
        format!("{}/{}", self.position + 1, self.log.len())
    }
}
