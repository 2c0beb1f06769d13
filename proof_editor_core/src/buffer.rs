//! Line buffer, positions, marks and edits
//!
//! Columns are counted in `char`s, not bytes, so that expanded symbols such
//! as `→` occupy one column like any other character.

use alloc::string::String;
use alloc::vec;
use alloc::vec::Vec;

#[cfg(feature = "serde_support")]
use serde::{Deserialize, Serialize};

/// Cursor position in the buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde_support", derive(Serialize, Deserialize))]
pub struct Position {
    pub row: usize,
    pub col: usize,
}

impl Position {
    pub const fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }

    pub const fn zero() -> Self {
        Self { row: 0, col: 0 }
    }
}

/// A highlighted span on one line
///
/// Read-only marks block edits that touch their range even on the line
/// that is currently unlocked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde_support", derive(Serialize, Deserialize))]
pub struct TextMark {
    pub row: usize,
    pub start: usize,
    pub end: usize,
    pub read_only: bool,
}

impl TextMark {
    pub fn read_only(row: usize, start: usize, end: usize) -> Self {
        Self {
            row,
            start,
            end,
            read_only: true,
        }
    }

    /// Whether an edit replacing `[start, end)` on this row touches the mark.
    /// A pure insertion at the mark's end is allowed.
    fn blocks(&self, start: usize, end: usize) -> bool {
        if !self.read_only || self.start == self.end {
            return false;
        }
        if start == end {
            start >= self.start && start < self.end
        } else {
            start < self.end && end > self.start
        }
    }
}

/// Selected span on one line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde_support", derive(Serialize, Deserialize))]
pub struct Selection {
    pub row: usize,
    pub start: usize,
    pub end: usize,
}

/// A prospective change to the buffer
///
/// Every mutation of a session buffer is expressed as one of these so the
/// line-mutability guard can inspect it before it lands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BufferEdit {
    /// Insert text at a position (no newlines)
    Insert { at: Position, text: String },
    /// Delete the character before a position on the same line
    DeleteBefore { at: Position },
    /// Replace a column range on one line
    Replace {
        row: usize,
        start: usize,
        end: usize,
        text: String,
    },
    /// Replace the whole content of a line
    ReplaceLine { row: usize, text: String },
    /// Remove a line entirely
    RemoveLine { row: usize },
}

impl BufferEdit {
    /// Line the edit lands on
    pub fn row(&self) -> usize {
        match self {
            BufferEdit::Insert { at, .. } | BufferEdit::DeleteBefore { at } => at.row,
            BufferEdit::Replace { row, .. }
            | BufferEdit::ReplaceLine { row, .. }
            | BufferEdit::RemoveLine { row } => *row,
        }
    }

    /// Column range the edit touches, if it stays within one line
    fn span(&self, buffer: &TextBuffer) -> Option<(usize, usize)> {
        match self {
            BufferEdit::Insert { at, .. } => Some((at.col, at.col)),
            BufferEdit::DeleteBefore { at } => at.col.checked_sub(1).map(|c| (c, at.col)),
            BufferEdit::Replace { start, end, .. } => Some((*start, *end)),
            BufferEdit::ReplaceLine { row, .. } | BufferEdit::RemoveLine { row } => {
                Some((0, buffer.line_length(*row)))
            }
        }
    }
}

/// Byte offset of a char column, clamped to the line end
fn byte_index(line: &str, col: usize) -> usize {
    line.char_indices()
        .nth(col)
        .map(|(i, _)| i)
        .unwrap_or(line.len())
}

/// Text buffer with line-based storage
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextBuffer {
    lines: Vec<String>,
    marks: Vec<TextMark>,
}

impl TextBuffer {
    pub fn new() -> Self {
        Self {
            lines: vec![String::new()],
            marks: Vec::new(),
        }
    }

    /// Build a buffer from rendered lines; an empty list yields one blank line
    pub fn from_lines(lines: Vec<String>) -> Self {
        let lines = if lines.is_empty() {
            vec![String::new()]
        } else {
            lines
        };
        Self {
            lines,
            marks: Vec::new(),
        }
    }

    pub fn from_string(content: &str) -> Self {
        Self::from_lines(content.lines().map(String::from).collect())
    }

    pub fn as_string(&self) -> String {
        self.lines.join("\n")
    }

    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    pub fn line(&self, row: usize) -> Option<&str> {
        self.lines.get(row).map(|s| s.as_str())
    }

    /// Line length in chars
    pub fn line_length(&self, row: usize) -> usize {
        self.lines.get(row).map(|s| s.chars().count()).unwrap_or(0)
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn is_blank(&self, row: usize) -> bool {
        self.line(row).map(|l| l.trim().is_empty()).unwrap_or(false)
    }

    pub fn marks(&self) -> &[TextMark] {
        &self.marks
    }

    pub fn add_mark(&mut self, mark: TextMark) {
        self.marks.push(mark);
    }

    /// Drop read-only marks on a row, returning how many were removed
    pub fn clear_read_only_marks(&mut self, row: usize) -> usize {
        let before = self.marks.len();
        self.marks.retain(|m| !(m.row == row && m.read_only));
        before - self.marks.len()
    }

    /// Whether a read-only mark blocks the edit
    pub fn is_blocked(&self, edit: &BufferEdit) -> bool {
        let row = edit.row();
        match edit.span(self) {
            Some((start, end)) => self
                .marks
                .iter()
                .any(|m| m.row == row && m.blocks(start, end)),
            None => false,
        }
    }

    /// Apply an edit unconditionally. Returns false if it is out of bounds.
    pub fn apply(&mut self, edit: &BufferEdit) -> bool {
        match edit {
            BufferEdit::Insert { at, text } => self.replace_range(at.row, at.col, at.col, text),
            BufferEdit::DeleteBefore { at } => match at.col.checked_sub(1) {
                Some(start) => self.replace_range(at.row, start, at.col, ""),
                None => false,
            },
            BufferEdit::Replace {
                row,
                start,
                end,
                text,
            } => self.replace_range(*row, *start, *end, text),
            BufferEdit::ReplaceLine { row, text } => match self.lines.get_mut(*row) {
                Some(line) => {
                    line.clear();
                    line.push_str(text);
                    true
                }
                None => false,
            },
            BufferEdit::RemoveLine { row } => self.remove_line(*row),
        }
    }

    fn replace_range(&mut self, row: usize, start: usize, end: usize, text: &str) -> bool {
        let Some(line) = self.lines.get_mut(row) else {
            return false;
        };
        let len = line.chars().count();
        if start > end || end > len || text.contains('\n') {
            return false;
        }
        let from = byte_index(line, start);
        let to = byte_index(line, end);
        line.replace_range(from..to, text);
        true
    }

    /// Remove a line; marks below it move up. The last remaining line is
    /// never removed.
    fn remove_line(&mut self, row: usize) -> bool {
        if row >= self.lines.len() || self.lines.len() == 1 {
            return false;
        }
        self.lines.remove(row);
        self.marks.retain(|m| m.row != row);
        for mark in &mut self.marks {
            if mark.row > row {
                mark.row -= 1;
            }
        }
        true
    }

    /// Clamp a position to the buffer
    pub fn clamp(&self, pos: Position) -> Position {
        let row = pos.row.min(self.lines.len().saturating_sub(1));
        let col = pos.col.min(self.line_length(row));
        Position::new(row, col)
    }
}

impl Default for TextBuffer {
    fn default() -> Self {
        Self::new()
    }
}
