//! Session snapshot for deterministic replay testing

use crate::buffer::{Position, Selection};
use alloc::string::String;
use alloc::vec::Vec;

#[cfg(feature = "serde_support")]
use serde::{Deserialize, Serialize};

/// Observable session state
///
/// Two sessions fed the same command trace produce equal snapshots.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde_support", derive(Serialize, Deserialize))]
pub struct SessionSnapshot {
    pub cursor: Position,
    pub buffer_lines: Vec<String>,
    pub selection: Option<Selection>,
    pub goal_line: Option<usize>,
    pub facts: Vec<usize>,
    pub edit_line: Option<usize>,
    pub read_only_marks: usize,
    pub error_message: Option<String>,
    pub instruction_position: Option<usize>,
    pub last_applied: Option<u64>,
    pub pending_requests: usize,
}

impl SessionSnapshot {
    /// Compute a deterministic hash of the snapshot state
    #[cfg(test)]
    pub fn hash(&self) -> u64 {
        use sha2::{Digest, Sha256};

        fn opt(hasher: &mut Sha256, value: Option<usize>) {
            match value {
                Some(v) => {
                    hasher.update([1u8]);
                    hasher.update(v.to_le_bytes());
                }
                None => hasher.update([0u8]),
            }
        }

        let mut hasher = Sha256::new();
        hasher.update(self.cursor.row.to_le_bytes());
        hasher.update(self.cursor.col.to_le_bytes());
        for line in &self.buffer_lines {
            hasher.update(line.as_bytes());
            hasher.update(b"\n");
        }
        match self.selection {
            Some(sel) => {
                hasher.update([1u8]);
                hasher.update(sel.row.to_le_bytes());
                hasher.update(sel.start.to_le_bytes());
                hasher.update(sel.end.to_le_bytes());
            }
            None => hasher.update([0u8]),
        }
        opt(&mut hasher, self.goal_line);
        for fact in &self.facts {
            hasher.update(fact.to_le_bytes());
        }
        opt(&mut hasher, self.edit_line);
        hasher.update(self.read_only_marks.to_le_bytes());
        if let Some(message) = &self.error_message {
            hasher.update(message.as_bytes());
        }
        opt(&mut hasher, self.instruction_position);
        hasher.update(self.last_applied.unwrap_or(u64::MAX).to_le_bytes());
        hasher.update(self.pending_requests.to_le_bytes());

        let digest = hasher.finalize();
        let mut head = [0u8; 8];
        head.copy_from_slice(&digest[..8]);
        u64::from_le_bytes(head)
    }
}
