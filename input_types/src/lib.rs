#![no_std]

//! # Input Types
//!
//! Raw events reported by the host text widget that displays a proof.
//!
//! The widget has already resolved layout and geometry: printable keys
//! arrive as characters and pointer presses arrive as buffer coordinates.
//! What an event *means* (unlocking a line, committing, expanding a
//! shorthand) is decided by the proof session, not here.
//!
//! Every event is plain data so that sessions can be recorded and replayed
//! with the same logical timestamps.

extern crate alloc;

use core::fmt;
use core::ops::BitOr;
use serde::{Deserialize, Serialize};

/// One event from the editing widget
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InputEvent {
    Key(KeyEvent),
    Pointer(PointerEvent),
}

impl InputEvent {
    pub fn key(event: KeyEvent) -> Self {
        Self::Key(event)
    }

    pub fn pointer(event: PointerEvent) -> Self {
        Self::Pointer(event)
    }
}

impl From<KeyEvent> for InputEvent {
    fn from(event: KeyEvent) -> Self {
        Self::Key(event)
    }
}

impl From<PointerEvent> for InputEvent {
    fn from(event: PointerEvent) -> Self {
        Self::Pointer(event)
    }
}

/// A key transition
///
/// Auto-repeat is reported as its own state so the session can treat a
/// held Backspace like repeated presses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyEvent {
    pub code: KeyCode,
    #[serde(default)]
    pub modifiers: Modifiers,
    pub state: KeyState,
}

impl KeyEvent {
    pub fn new(code: KeyCode, modifiers: Modifiers, state: KeyState) -> Self {
        Self {
            code,
            modifiers,
            state,
        }
    }

    pub fn pressed(code: KeyCode, modifiers: Modifiers) -> Self {
        Self::new(code, modifiers, KeyState::Pressed)
    }

    pub fn released(code: KeyCode, modifiers: Modifiers) -> Self {
        Self::new(code, modifiers, KeyState::Released)
    }

    /// A plain keystroke producing `ch`
    pub fn typed(ch: char) -> Self {
        Self::pressed(KeyCode::Char(ch), Modifiers::NONE)
    }

    pub fn is_pressed(&self) -> bool {
        self.state == KeyState::Pressed
    }

    pub fn is_repeat(&self) -> bool {
        self.state == KeyState::Repeat
    }
}

/// Formats as an input-script chord, e.g. `Ctrl+b` or `Enter`
impl fmt::Display for KeyEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.modifiers.is_empty() {
            write!(f, "{}+", self.modifiers)?;
        }
        write!(f, "{}", self.code)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KeyState {
    Pressed,
    Released,
    Repeat,
}

/// Logical key
///
/// `Char` holds the character after layout and Shift were applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum KeyCode {
    Char(char),
    Enter,
    Tab,
    Backspace,
    Delete,
    Escape,
    Up,
    Down,
    Left,
    Right,
    Home,
    End,
    Unknown,
}

impl fmt::Display for KeyCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            KeyCode::Char(' ') => "Space",
            KeyCode::Char(ch) => return write!(f, "{}", ch),
            KeyCode::Enter => "Enter",
            KeyCode::Tab => "Tab",
            KeyCode::Backspace => "Backspace",
            KeyCode::Delete => "Delete",
            KeyCode::Escape => "Escape",
            KeyCode::Up => "Up",
            KeyCode::Down => "Down",
            KeyCode::Left => "Left",
            KeyCode::Right => "Right",
            KeyCode::Home => "Home",
            KeyCode::End => "End",
            KeyCode::Unknown => "Unknown",
        };
        f.write_str(name)
    }
}

/// Held modifier keys
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Modifiers {
    #[serde(default)]
    ctrl: bool,
    #[serde(default)]
    alt: bool,
    #[serde(default)]
    shift: bool,
    #[serde(default)]
    meta: bool,
}

impl Modifiers {
    pub const NONE: Self = Self {
        ctrl: false,
        alt: false,
        shift: false,
        meta: false,
    };
    pub const CTRL: Self = Self {
        ctrl: true,
        ..Self::NONE
    };
    pub const ALT: Self = Self {
        alt: true,
        ..Self::NONE
    };
    pub const SHIFT: Self = Self {
        shift: true,
        ..Self::NONE
    };
    pub const META: Self = Self {
        meta: true,
        ..Self::NONE
    };

    pub fn none() -> Self {
        Self::NONE
    }

    pub fn with(self, other: Modifiers) -> Self {
        Self {
            ctrl: self.ctrl || other.ctrl,
            alt: self.alt || other.alt,
            shift: self.shift || other.shift,
            meta: self.meta || other.meta,
        }
    }

    /// True when every key held in `other` is also held here
    pub fn contains(&self, other: Modifiers) -> bool {
        self.with(other) == *self
    }

    pub fn is_ctrl(&self) -> bool {
        self.ctrl
    }

    pub fn is_alt(&self) -> bool {
        self.alt
    }

    pub fn is_shift(&self) -> bool {
        self.shift
    }

    pub fn is_meta(&self) -> bool {
        self.meta
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::NONE
    }
}

impl BitOr for Modifiers {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        self.with(rhs)
    }
}

impl fmt::Display for Modifiers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return f.write_str("none");
        }
        let held = [
            (self.ctrl, "Ctrl"),
            (self.alt, "Alt"),
            (self.shift, "Shift"),
            (self.meta, "Meta"),
        ];
        let mut sep = "";
        for (_, name) in held.iter().filter(|(on, _)| *on) {
            write!(f, "{}{}", sep, name)?;
            sep = "+";
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PointerKind {
    Down,
    Up,
}

/// Mouse button transition at a buffer position
///
/// `timestamp` is in host time units (milliseconds for browser hosts) and
/// only has to be monotonic within one tab; click gestures are measured
/// against it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PointerEvent {
    pub kind: PointerKind,
    pub row: usize,
    pub col: usize,
    pub timestamp: u64,
}

impl PointerEvent {
    pub fn down(row: usize, col: usize, timestamp: u64) -> Self {
        Self {
            kind: PointerKind::Down,
            row,
            col,
            timestamp,
        }
    }

    pub fn up(row: usize, col: usize, timestamp: u64) -> Self {
        Self {
            kind: PointerKind::Up,
            ..Self::down(row, col, timestamp)
        }
    }

    pub fn is_down(&self) -> bool {
        self.kind == PointerKind::Down
    }
}
