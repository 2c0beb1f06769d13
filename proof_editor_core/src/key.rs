//! Keys as the proof session sees them

#[cfg(feature = "serde_support")]
use serde::{Deserialize, Serialize};

use crate::buffer::Position;

/// Logical key consumed by a proof session
///
/// Only the keys the session gives meaning to are represented; hosts drop
/// everything else before it reaches the core.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde_support", derive(Serialize, Deserialize))]
pub enum Key {
    Char(char),
    Left,
    Right,
    Up,
    Down,
    Home,
    End,
    /// Commit the unlocked line, or add a line below the cursor
    Enter,
    /// Expand the shorthand ending at the cursor
    Tab,
    Backspace,
    /// Discard the pending edit
    Escape,
    /// Rule shortcut (`Ctrl+b` etc.)
    Ctrl(char),
}

impl Key {
    /// Where a navigation key sends the cursor, before clamping to the buffer
    ///
    /// `End` targets `usize::MAX` and relies on the clamp to land on the
    /// last column. Non-navigation keys return `None`.
    pub fn motion(self, from: Position) -> Option<Position> {
        let Position { row, col } = from;
        let to = match self {
            Key::Left => Position::new(row, col.saturating_sub(1)),
            Key::Right => Position::new(row, col.saturating_add(1)),
            Key::Up => Position::new(row.saturating_sub(1), col),
            Key::Down => Position::new(row.saturating_add(1), col),
            Key::Home => Position::new(row, 0),
            Key::End => Position::new(row, usize::MAX),
            _ => return None,
        };
        Some(to)
    }
}
