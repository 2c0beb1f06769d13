//! Commands consumed by the session state machine
//!
//! Host adapters translate raw widget events into these; the session never
//! sees the widget itself.

use alloc::string::String;

#[cfg(feature = "serde_support")]
use serde::{Deserialize, Serialize};

use crate::buffer::Position;
use crate::click::Tick;
use crate::key::Key;

/// Proof rule understood by the step-application service
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde_support", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde_support", serde(rename_all = "snake_case"))]
pub enum StepRule {
    Introduction,
    BackwardStep,
    ForwardStep,
    RewriteGoal,
    Induction,
}

impl StepRule {
    /// Wire name of the rule
    pub fn as_str(&self) -> &'static str {
        match self {
            StepRule::Introduction => "introduction",
            StepRule::BackwardStep => "apply_backward_step",
            StepRule::ForwardStep => "apply_forward_step",
            StepRule::RewriteGoal => "rewrite_goal",
            StepRule::Induction => "apply_induction",
        }
    }

    /// Rule bound to a Ctrl chord. Induction has no chord.
    pub fn from_shortcut(ch: char) -> Option<Self> {
        match ch.to_ascii_lowercase() {
            'i' => Some(StepRule::Introduction),
            'b' => Some(StepRule::BackwardStep),
            'f' => Some(StepRule::ForwardStep),
            'r' => Some(StepRule::RewriteGoal),
            _ => None,
        }
    }
}

/// Command applied to one proof session
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionCommand {
    /// A key pressed while the buffer has focus
    Key(Key),
    /// Mouse-down at a buffer position
    MouseDown { at: Position, time: Tick },
    /// Logical clock advanced without input
    Tick(Tick),
    /// Plain cursor movement (keyboard or programmatic)
    MoveCursor(Position),
    /// Unlock the cursor line for editing (what a double click does)
    UnlockEdit,
    /// Goal/fact toggle for the cursor line (what a click does)
    ToggleSelection,
    /// Commit the unlocked line
    CommitEdit,
    /// Discard edits to the unlocked line
    CancelEdit,
    /// Ask for a new line after the cursor line
    InsertLineAfter,
    /// Remove the cursor line if it is blank
    RemoveLine,
    /// Expand the shorthand token before the cursor
    ExpandShorthand,
    /// Apply a rule to the selected goal and facts
    ApplyRule { rule: StepRule, args: Option<String> },
    InstructionBack,
    InstructionForward,
}
