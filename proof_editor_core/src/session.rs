//! Per-tab proof session state

use alloc::collections::{BTreeMap, BTreeSet};
use alloc::string::String;
use alloc::sync::Arc;
use alloc::vec::Vec;
use core::fmt;
use uuid::Uuid;

#[cfg(feature = "serde_support")]
use serde::{Deserialize, Serialize};

use crate::buffer::{Position, Selection, TextBuffer};
use crate::click::{ClickDetector, Tick, DEFAULT_DOUBLE_CLICK_WINDOW};
use crate::instructions::InstructionCursor;
use crate::proof::ProofRecord;
use crate::request::{RequestSeq, SequenceGate, StepRequestKind};
use crate::shorthand::ShorthandTable;

/// Default token marking an unfinished obligation
pub const DEFAULT_OBLIGATION_MARKER: &str = "sorry";

/// Identifier of an editor tab, unique among open tabs
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde_support", derive(Serialize, Deserialize))]
pub struct TabId(Uuid);

impl TabId {
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl fmt::Display for TabId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "tab:{}", self.0)
    }
}

/// Behaviour knobs shared by every session in a process
#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub obligation_marker: String,
    pub double_click_window: Tick,
    pub shorthands: Arc<ShorthandTable>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            obligation_marker: DEFAULT_OBLIGATION_MARKER.into(),
            double_click_window: DEFAULT_DOUBLE_CLICK_WINDOW,
            shorthands: Arc::new(ShorthandTable::builtin()),
        }
    }
}

/// Text handed to the step service for a line, kept until the reply
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct PendingCommit {
    pub(crate) seq: RequestSeq,
    pub(crate) text: String,
    /// End of the read-only prefix the line had while it was open
    pub(crate) locked_prefix: Option<usize>,
}

/// Editing session for one proof tab
///
/// Every line other than `edit_line` is committed and read-only; its text
/// can be restored from `record`, which stays line-aligned with `buffer`.
#[derive(Debug, Clone)]
pub struct ProofSession {
    pub(crate) id: TabId,
    pub(crate) theory_name: String,
    pub(crate) thm_name: Option<String>,
    pub(crate) config: SessionConfig,
    pub(crate) buffer: TextBuffer,
    pub(crate) cursor: Position,
    pub(crate) selection: Option<Selection>,
    pub(crate) record: ProofRecord,
    pub(crate) goal_line: Option<usize>,
    pub(crate) facts: BTreeSet<usize>,
    pub(crate) edit_line: Option<usize>,
    /// Raised while a sanctioned mutation is running
    pub(crate) edit_mode: bool,
    pub(crate) clicks: ClickDetector,
    pub(crate) matches: Vec<String>,
    pub(crate) error_message: Option<String>,
    pub(crate) instructions: Option<InstructionCursor>,
    pub(crate) sequence: SequenceGate,
    pub(crate) in_flight: BTreeMap<RequestSeq, StepRequestKind>,
    /// Committed text per line whose `SetLine` is still in flight
    pub(crate) pending_commits: BTreeMap<usize, PendingCommit>,
}

impl ProofSession {
    /// Fresh session: one blank committed line, no goal, no facts, no edit line
    pub fn new(id: TabId, theory_name: impl Into<String>, config: SessionConfig) -> Self {
        let clicks = ClickDetector::new(config.double_click_window);
        Self {
            id,
            theory_name: theory_name.into(),
            thm_name: None,
            config,
            buffer: TextBuffer::new(),
            cursor: Position::zero(),
            selection: None,
            record: ProofRecord::new(),
            goal_line: None,
            facts: BTreeSet::new(),
            edit_line: None,
            edit_mode: false,
            clicks,
            matches: Vec::new(),
            error_message: None,
            instructions: None,
            sequence: SequenceGate::new(),
            in_flight: BTreeMap::new(),
            pending_commits: BTreeMap::new(),
        }
    }

    pub fn id(&self) -> TabId {
        self.id
    }

    pub fn theory_name(&self) -> &str {
        &self.theory_name
    }

    pub fn thm_name(&self) -> Option<&str> {
        self.thm_name.as_deref()
    }

    pub fn set_thm_name(&mut self, name: Option<String>) {
        self.thm_name = name;
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn buffer(&self) -> &TextBuffer {
        &self.buffer
    }

    pub fn cursor(&self) -> Position {
        self.cursor
    }

    pub fn selection(&self) -> Option<Selection> {
        self.selection
    }

    pub fn record(&self) -> &ProofRecord {
        &self.record
    }

    pub fn goal_line(&self) -> Option<usize> {
        self.goal_line
    }

    pub fn facts(&self) -> &BTreeSet<usize> {
        &self.facts
    }

    pub fn edit_line(&self) -> Option<usize> {
        self.edit_line
    }

    pub fn is_edit_mode(&self) -> bool {
        self.edit_mode
    }

    /// Rule names the external matcher proposed for the current selection
    pub fn matches(&self) -> &[String] {
        &self.matches
    }

    pub fn set_matches(&mut self, matches: Vec<String>) {
        self.matches = matches;
    }

    pub fn error_message(&self) -> Option<&str> {
        self.error_message.as_deref()
    }

    pub fn instructions(&self) -> Option<&InstructionCursor> {
        self.instructions.as_ref()
    }

    /// Replace the instruction navigator; an empty log removes it
    pub fn set_instructions(&mut self, log: Vec<String>) {
        self.instructions = InstructionCursor::new(log);
    }

    pub fn pending_requests(&self) -> usize {
        self.in_flight.len()
    }

    pub fn is_obligation(&self, row: usize) -> bool {
        let marker = self.config.obligation_marker.as_str();
        !marker.is_empty()
            && self
                .buffer
                .line(row)
                .map(|line| line.contains(marker))
                .unwrap_or(false)
    }

    /// Load a committed proof, replacing the buffer. Goal, facts and the
    /// edit line are cleared.
    pub fn load_record(&mut self, record: ProofRecord) {
        self.controlled(|session| {
            session.buffer = TextBuffer::from_lines(record.render_lines());
            session.record = record;
        });
        self.edit_line = None;
        self.selection = None;
        self.goal_line = None;
        self.facts.clear();
        self.matches.clear();
        self.pending_commits.clear();
        self.error_message = None;
        self.cursor = self.buffer.clamp(self.cursor);
        tracing::debug!(tab = %self.id, lines = self.buffer.line_count(), "proof loaded");
    }

    /// Run a sanctioned mutation with the edit-mode flag raised
    pub(crate) fn controlled<R>(&mut self, f: impl FnOnce(&mut Self) -> R) -> R {
        let previous = self.edit_mode;
        self.edit_mode = true;
        let result = f(self);
        self.edit_mode = previous;
        result
    }
}
