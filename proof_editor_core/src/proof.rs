//! Backing proof record
//!
//! A proof is an ordered list of step records. Each step renders to exactly
//! one buffer line, so the committed text of any line can be recovered from
//! the record at the same index.

use alloc::string::String;
use alloc::vec::Vec;
use alloc::{format, vec};

#[cfg(feature = "serde_support")]
use serde::{Deserialize, Serialize};

/// One step of a proof as stored by the backend
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde_support", derive(Serialize, Deserialize))]
pub struct StepRecord {
    pub id: String,
    #[cfg_attr(feature = "serde_support", serde(default))]
    pub rule: String,
    #[cfg_attr(feature = "serde_support", serde(default))]
    pub args: String,
    #[cfg_attr(feature = "serde_support", serde(default))]
    pub prevs: Vec<String>,
    #[cfg_attr(feature = "serde_support", serde(default))]
    pub th: String,
}

impl StepRecord {
    pub fn new(id: impl Into<String>, th: impl Into<String>, rule: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            rule: rule.into(),
            args: String::new(),
            prevs: Vec::new(),
            th: th.into(),
        }
    }

    /// A placeholder step that renders as a blank line
    pub fn blank(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Self::default()
        }
    }

    pub fn with_args(mut self, args: impl Into<String>) -> Self {
        self.args = args.into();
        self
    }

    pub fn with_prevs(mut self, prevs: Vec<String>) -> Self {
        self.prevs = prevs;
        self
    }

    pub fn is_blank(&self) -> bool {
        self.rule.is_empty() && self.th.is_empty()
    }

    /// Text shown in the buffer for this step
    pub fn display_line(&self) -> String {
        if self.is_blank() {
            return String::new();
        }
        if self.rule.is_empty() {
            return format!("{}: {}", self.id, self.th);
        }
        let mut line = format!("{}: {} by {}", self.id, self.th, self.rule);
        if !self.args.is_empty() {
            line.push(' ');
            line.push_str(&self.args);
        }
        if !self.prevs.is_empty() {
            line.push_str(" from ");
            line.push_str(&self.prevs.join(", "));
        }
        line
    }
}

/// Ordered list of committed steps
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde_support", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde_support", serde(transparent))]
pub struct ProofRecord {
    steps: Vec<StepRecord>,
}

impl ProofRecord {
    /// A record with one blank step, matching a fresh one-line buffer
    pub fn new() -> Self {
        Self {
            steps: vec![StepRecord::blank("0")],
        }
    }

    /// Build a record from steps; an empty list becomes one blank step
    pub fn from_steps(steps: Vec<StepRecord>) -> Self {
        if steps.is_empty() {
            Self::new()
        } else {
            Self { steps }
        }
    }

    pub fn steps(&self) -> &[StepRecord] {
        &self.steps
    }

    pub fn step(&self, row: usize) -> Option<&StepRecord> {
        self.steps.get(row)
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Committed text of a line
    pub fn display_line(&self, row: usize) -> Option<String> {
        self.steps.get(row).map(StepRecord::display_line)
    }

    pub fn render_lines(&self) -> Vec<String> {
        self.steps.iter().map(StepRecord::display_line).collect()
    }

    pub(crate) fn remove(&mut self, row: usize) -> Option<StepRecord> {
        if row < self.steps.len() && self.steps.len() > 1 {
            Some(self.steps.remove(row))
        } else {
            None
        }
    }
}

impl Default for ProofRecord {
    fn default() -> Self {
        Self::new()
    }
}
