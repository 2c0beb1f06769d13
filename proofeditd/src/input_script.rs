//! # Input Scripts
//!
//! Line-based replay format for driving one proof tab without a widget.
//!
//! Each non-blank line is one directive:
//!
//! | line              | effect                                          |
//! |-------------------|-------------------------------------------------|
//! | `Enter`, `Up`, .. | press a named key (`Space` is `' '`)            |
//! | `a`, `>`, `⟶`     | press a single character                        |
//! | `Ctrl+b`          | press with modifiers (`Ctrl`, `Alt`, `Shift`, `Meta`) |
//! | `"A --> B"`       | type the quoted text, one press per character   |
//! | `click 2 5`       | mouse-down at row 2, column 5                   |
//! | `wait 400`        | advance the logical clock (`ms` or `s` suffix)  |
//! | `save`            | write the committed proof back to its theory    |
//! | `# ...`           | comment                                         |
//!
//! ```text
//! # Fill the obligation on the first line
//! click 0 0
//! click 0 0
//! "intro"
//! Enter
//! save
//! ```

use input_types::{InputEvent, KeyCode, KeyEvent, Modifiers, PointerEvent};
use proof_editor_core::Tick;
use std::collections::VecDeque;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum InputScriptError {
    #[error("unknown key '{0}'")]
    InvalidKeyName(String),

    #[error("unknown modifier '{0}'")]
    InvalidModifier(String),

    #[error("line {line}: {message}")]
    ParseError { line: usize, message: String },

    #[error("script has no inputs")]
    EmptyScript,

    #[error("bad delay '{0}'")]
    InvalidDelay(String),
}

/// One replayed action
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScriptedInput {
    Key(KeyCode, Modifiers),
    Click { row: usize, col: usize },
    /// Logical time to let pass
    Wait(Tick),
    Save,
}

impl ScriptedInput {
    fn typed(ch: char) -> Self {
        Self::Key(KeyCode::Char(ch), Modifiers::NONE)
    }

    /// The widget event for this action at logical time `now`
    ///
    /// `Wait` and `Save` are host actions and produce no event.
    pub fn to_input_event(&self, now: Tick) -> Option<InputEvent> {
        match *self {
            Self::Key(code, modifiers) => Some(KeyEvent::pressed(code, modifiers).into()),
            Self::Click { row, col } => Some(PointerEvent::down(row, col, now).into()),
            Self::Wait(_) | Self::Save => None,
        }
    }
}

/// Queue of parsed actions, consumed front to back
#[derive(Debug, Clone, Default)]
pub struct InputScript {
    inputs: VecDeque<ScriptedInput>,
}

impl InputScript {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_text(text: &str) -> Result<Self, InputScriptError> {
        let mut inputs = VecDeque::new();
        for (index, raw) in text.lines().enumerate() {
            let line = raw.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            Self::parse_line(line, index + 1, &mut inputs)?;
        }

        if inputs.is_empty() {
            return Err(InputScriptError::EmptyScript);
        }
        Ok(Self { inputs })
    }

    fn parse_line(
        line: &str,
        line_num: usize,
        out: &mut VecDeque<ScriptedInput>,
    ) -> Result<(), InputScriptError> {
        let at_line = |message: String| InputScriptError::ParseError {
            line: line_num,
            message,
        };

        if let Some(text) = line
            .strip_prefix('"')
            .and_then(|rest| rest.strip_suffix('"'))
        {
            out.extend(text.chars().map(ScriptedInput::typed));
            return Ok(());
        }

        let input = match line.split_once(' ') {
            Some(("wait", delay)) => {
                let ticks = Self::parse_duration(delay).map_err(|e| at_line(e.to_string()))?;
                ScriptedInput::Wait(ticks)
            }
            Some(("click", position)) => {
                let (row, col) = Self::parse_position(position).ok_or_else(|| {
                    at_line(format!("click needs a row and column, got '{}'", position))
                })?;
                ScriptedInput::Click { row, col }
            }
            None if line == "save" => ScriptedInput::Save,
            _ => {
                let (modifiers, name) = Self::parse_modifiers(line)?;
                let code = Self::parse_keycode(name).map_err(|e| at_line(e.to_string()))?;
                ScriptedInput::Key(code, modifiers)
            }
        };
        out.push_back(input);
        Ok(())
    }

    /// Splits `Ctrl+Shift+r` into its modifiers and key name
    ///
    /// A trailing `+` names the plus key, so `+` and `Ctrl++` both work.
    fn parse_modifiers(chord: &str) -> Result<(Modifiers, &str), InputScriptError> {
        let (prefix, key) = match chord.strip_suffix("++") {
            Some(prefix) => (prefix, "+"),
            None => match chord.rsplit_once('+') {
                Some((prefix, key)) if !prefix.is_empty() && !key.is_empty() => (prefix, key),
                _ => return Ok((Modifiers::NONE, chord)),
            },
        };

        prefix
            .split('+')
            .try_fold(Modifiers::NONE, |held, name| {
                let modifier = match name.trim().to_ascii_lowercase().as_str() {
                    "ctrl" | "control" => Modifiers::CTRL,
                    "alt" => Modifiers::ALT,
                    "shift" => Modifiers::SHIFT,
                    "meta" | "super" => Modifiers::META,
                    _ => return Err(InputScriptError::InvalidModifier(name.trim().to_string())),
                };
                Ok(held | modifier)
            })
            .map(|held| (held, key.trim()))
    }

    fn parse_keycode(name: &str) -> Result<KeyCode, InputScriptError> {
        let mut chars = name.chars();
        if let (Some(ch), None) = (chars.next(), chars.next()) {
            return Ok(KeyCode::Char(ch));
        }
        let code = match name.to_ascii_lowercase().as_str() {
            "space" => KeyCode::Char(' '),
            "enter" | "return" => KeyCode::Enter,
            "tab" => KeyCode::Tab,
            "backspace" => KeyCode::Backspace,
            "delete" | "del" => KeyCode::Delete,
            "escape" | "esc" => KeyCode::Escape,
            "up" | "arrowup" => KeyCode::Up,
            "down" | "arrowdown" => KeyCode::Down,
            "left" | "arrowleft" => KeyCode::Left,
            "right" | "arrowright" => KeyCode::Right,
            "home" => KeyCode::Home,
            "end" => KeyCode::End,
            _ => return Err(InputScriptError::InvalidKeyName(name.to_string())),
        };
        Ok(code)
    }

    /// `400`, `400ms` and `1s` all parse to logical ticks
    fn parse_duration(delay: &str) -> Result<Tick, InputScriptError> {
        let delay = delay.trim().to_ascii_lowercase();
        let (digits, scale): (&str, Tick) = if let Some(ms) = delay.strip_suffix("ms") {
            (ms, 1)
        } else if let Some(secs) = delay.strip_suffix('s') {
            (secs, 1000)
        } else {
            (delay.as_str(), 1)
        };
        digits
            .trim()
            .parse::<Tick>()
            .ok()
            .and_then(|n| n.checked_mul(scale))
            .ok_or_else(|| InputScriptError::InvalidDelay(delay.clone()))
    }

    fn parse_position(position: &str) -> Option<(usize, usize)> {
        let mut fields = position.split_whitespace().map(str::parse::<usize>);
        match (fields.next(), fields.next(), fields.next()) {
            (Some(Ok(row)), Some(Ok(col)), None) => Some((row, col)),
            _ => None,
        }
    }

    pub fn next_input(&mut self) -> Option<ScriptedInput> {
        self.inputs.pop_front()
    }

    pub fn has_more(&self) -> bool {
        !self.inputs.is_empty()
    }

    pub fn remaining(&self) -> usize {
        self.inputs.len()
    }
}
