//! Line-mutability guard
//!
//! At most one line per session is unlocked (`edit_line`). A buffer change
//! lands only if it targets that line or runs inside a sanctioned mutation
//! (the edit-mode flag). Everything else is dropped without touching the
//! buffer.

use alloc::string::String;

use crate::buffer::{BufferEdit, Position};
use crate::core::{CoreOutcome, RejectReason};
use crate::request::StepRequestKind;
use crate::session::{PendingCommit, ProofSession};

impl ProofSession {
    /// Whether a change at `row` would be accepted right now
    pub fn permits(&self, row: usize) -> bool {
        self.edit_mode || self.edit_line == Some(row)
    }

    /// Submit a change through the guard
    pub fn propose(&mut self, edit: BufferEdit) -> Result<(), RejectReason> {
        let row = edit.row();
        if !self.permits(row) {
            tracing::trace!(tab = %self.id, line = row, "edit on locked line dropped");
            return Err(RejectReason::LineLocked { row });
        }
        if !self.edit_mode && self.buffer.is_blocked(&edit) {
            tracing::trace!(tab = %self.id, line = row, "edit on read-only span dropped");
            return Err(RejectReason::ReadOnlySpan { row });
        }
        if self.buffer.apply(&edit) {
            Ok(())
        } else {
            Err(RejectReason::OutOfBounds)
        }
    }

    /// Type text at the cursor, replacing the selection if it is on the
    /// cursor line
    pub(crate) fn insert_text(&mut self, text: &str) -> CoreOutcome {
        let (edit, start) = match self.selection {
            Some(sel) if sel.row == self.cursor.row => (
                BufferEdit::Replace {
                    row: sel.row,
                    start: sel.start,
                    end: sel.end,
                    text: text.into(),
                },
                sel.start,
            ),
            _ => (
                BufferEdit::Insert {
                    at: self.cursor,
                    text: text.into(),
                },
                self.cursor.col,
            ),
        };
        match self.propose(edit) {
            Ok(()) => {
                self.cursor.col = start + text.chars().count();
                self.selection = None;
                CoreOutcome::Changed
            }
            Err(reason) => CoreOutcome::Rejected(reason),
        }
    }

    /// Enter: commit the unlocked line, or ask for a new line below
    pub(crate) fn handle_enter(&mut self) -> CoreOutcome {
        if self.edit_line.is_some() {
            self.commit_edit()
        } else {
            self.insert_line_after()
        }
    }

    /// Hand the unlocked line's text to the step service and lock it again
    pub(crate) fn commit_edit(&mut self) -> CoreOutcome {
        let Some(line) = self.edit_line else {
            return CoreOutcome::Rejected(RejectReason::NoEditLine);
        };
        let text: String = self.buffer.line(line).unwrap_or_default().into();
        let locked_prefix = self
            .buffer
            .marks()
            .iter()
            .filter(|m| m.row == line && m.read_only && m.start == 0)
            .map(|m| m.end)
            .max();
        self.buffer.clear_read_only_marks(line);
        self.selection = None;
        self.edit_line = None;
        tracing::debug!(tab = %self.id, line, "edit committed");

        let request = self.issue(StepRequestKind::SetLine {
            line,
            text: text.clone(),
        });
        self.pending_commits.insert(
            line,
            PendingCommit {
                seq: request.seq,
                text,
                locked_prefix,
            },
        );
        CoreOutcome::Request(request)
    }

    pub(crate) fn insert_line_after(&mut self) -> CoreOutcome {
        let line = self.cursor.row;
        CoreOutcome::Request(self.issue(StepRequestKind::AddLineAfter { line }))
    }

    /// Backspace: a blank line is removed outright, otherwise one character
    /// before the cursor is deleted (guarded)
    pub(crate) fn handle_backspace(&mut self) -> CoreOutcome {
        let row = self.cursor.row;
        if self.buffer.is_blank(row) {
            return self.remove_line();
        }
        if self.cursor.col == 0 {
            return CoreOutcome::Continue;
        }
        match self.propose(BufferEdit::DeleteBefore { at: self.cursor }) {
            Ok(()) => {
                self.cursor.col -= 1;
                self.selection = None;
                CoreOutcome::Changed
            }
            Err(reason) => CoreOutcome::Rejected(reason),
        }
    }

    /// Remove the blank cursor line together with its step record
    pub(crate) fn remove_line(&mut self) -> CoreOutcome {
        let row = self.cursor.row;
        if !self.buffer.is_blank(row) || self.buffer.line_count() == 1 {
            return CoreOutcome::Continue;
        }
        // Outstanding requests carry line indices that a removal would shift
        if !self.in_flight.is_empty() {
            tracing::debug!(
                tab = %self.id,
                line = row,
                pending = self.in_flight.len(),
                "line removal deferred"
            );
            return CoreOutcome::Rejected(RejectReason::RequestPending);
        }
        let removed = self.controlled(|session| session.propose(BufferEdit::RemoveLine { row }));
        if let Err(reason) = removed {
            return CoreOutcome::Rejected(reason);
        }
        self.record.remove(row);
        self.edit_line = shift_after_removal(self.edit_line, row);
        self.goal_line = shift_after_removal(self.goal_line, row);
        self.facts = self
            .facts
            .iter()
            .filter_map(|&fact| shift_after_removal(Some(fact), row))
            .collect();
        self.selection = None;
        let target = if row > 0 {
            Position::new(row - 1, usize::MAX)
        } else {
            Position::zero()
        };
        self.cursor = self.buffer.clamp(target);
        tracing::debug!(tab = %self.id, line = row, "blank line removed");
        CoreOutcome::Changed
    }

    /// Escape: drop edits to the unlocked line and restore its committed text
    ///
    /// A commit still waiting on the step service counts as committed.
    pub(crate) fn cancel_edit(&mut self) -> CoreOutcome {
        let Some(line) = self.edit_line else {
            return CoreOutcome::Continue;
        };
        let original = match self.pending_commits.get(&line) {
            Some(pending) => pending.text.clone(),
            None => self.record.display_line(line).unwrap_or_default(),
        };
        self.buffer.clear_read_only_marks(line);
        if !self.buffer.apply(&BufferEdit::ReplaceLine {
            row: line,
            text: original,
        }) {
            tracing::warn!(tab = %self.id, line, "open line missing from buffer on cancel");
        }
        self.edit_line = None;
        self.selection = None;
        self.cursor = self.buffer.clamp(self.cursor);
        tracing::debug!(tab = %self.id, line, "edit cancelled");
        CoreOutcome::Changed
    }

    /// Tab: expand the shorthand token before the cursor. The key never
    /// falls through to the widget, match or not.
    pub(crate) fn expand_shorthand(&mut self) -> CoreOutcome {
        let row = self.cursor.row;
        let line = self.buffer.line(row).unwrap_or_default();
        let Some(expansion) = self.config.shorthands.expand(line, self.cursor.col) else {
            return CoreOutcome::Continue;
        };
        let cursor = expansion.cursor;
        match self.propose(BufferEdit::Replace {
            row,
            start: expansion.start,
            end: expansion.end,
            text: expansion.replacement,
        }) {
            Ok(()) => {
                self.cursor.col = cursor;
                self.selection = None;
                CoreOutcome::Changed
            }
            Err(reason) => CoreOutcome::Rejected(reason),
        }
    }
}

fn shift_after_removal(line: Option<usize>, removed: usize) -> Option<usize> {
    match line {
        Some(l) if l == removed => None,
        Some(l) if l > removed => Some(l - 1),
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::proof::{ProofRecord, StepRecord};
    use crate::session::{SessionConfig, TabId};
    use alloc::vec;
    use uuid::Uuid;

    fn session(lines: &[(&str, &str)]) -> ProofSession {
        let mut session = ProofSession::new(
            TabId::from_uuid(Uuid::from_u128(1)),
            "logic_base",
            SessionConfig::default(),
        );
        let steps = lines
            .iter()
            .enumerate()
            .map(|(i, (th, rule))| {
                if th.is_empty() {
                    StepRecord::blank(alloc::format!("{}", i))
                } else {
                    StepRecord::new(alloc::format!("{}", i), *th, *rule)
                }
            })
            .collect();
        session.load_record(ProofRecord::from_steps(steps));
        session
    }

    #[test]
    fn test_locked_line_rejects_edits() {
        let mut s = session(&[("A", "assume"), ("B", "sorry")]);
        let before = s.buffer().clone();
        let result = s.propose(BufferEdit::Insert {
            at: Position::new(0, 0),
            text: "x".into(),
        });
        assert_eq!(result, Err(RejectReason::LineLocked { row: 0 }));
        assert_eq!(s.buffer(), &before);
    }

    #[test]
    fn test_unlocked_line_accepts_edits() {
        let mut s = session(&[("A", "assume"), ("", "")]);
        s.edit_line = Some(1);
        s.cursor = Position::new(1, 0);
        assert_eq!(s.insert_text("x"), CoreOutcome::Changed);
        assert_eq!(s.buffer().line(1), Some("x"));
        assert_eq!(s.cursor(), Position::new(1, 1));
    }

    #[test]
    fn test_edit_mode_bypasses_guard() {
        let mut s = session(&[("A", "assume")]);
        let result = s.controlled(|s| {
            s.propose(BufferEdit::ReplaceLine {
                row: 0,
                text: "changed".into(),
            })
        });
        assert!(result.is_ok());
        assert!(!s.is_edit_mode());
        assert_eq!(s.buffer().line(0), Some("changed"));
    }

    #[test]
    fn test_escape_without_edit_line_is_noop() {
        let mut s = session(&[("A", "assume")]);
        let before = s.buffer().clone();
        assert_eq!(s.cancel_edit(), CoreOutcome::Continue);
        assert_eq!(s.cancel_edit(), CoreOutcome::Continue);
        assert_eq!(s.buffer(), &before);
        assert_eq!(s.edit_line(), None);
    }

    #[test]
    fn test_escape_restores_committed_text() {
        let mut s = session(&[("A", "sorry")]);
        s.edit_line = Some(0);
        s.cursor = Position::new(0, s.buffer().line_length(0));
        s.insert_text(" extra");
        assert_eq!(s.cancel_edit(), CoreOutcome::Changed);
        assert_eq!(s.buffer().line(0), Some("0: A by sorry"));
        assert_eq!(s.edit_line(), None);
    }

    #[test]
    fn test_backspace_on_blank_line_removes_it() {
        let mut s = session(&[("A", "assume"), ("", ""), ("C", "sorry")]);
        s.goal_line = Some(2);
        s.facts.insert(0);
        s.facts.insert(1);
        s.cursor = Position::new(1, 0);

        assert_eq!(s.handle_backspace(), CoreOutcome::Changed);
        assert_eq!(s.buffer().line_count(), 2);
        assert_eq!(s.record().len(), 2);
        assert_eq!(s.goal_line(), Some(1));
        assert_eq!(s.facts().iter().copied().collect::<alloc::vec::Vec<_>>(), vec![0]);
        assert_eq!(s.cursor(), Position::new(0, 14));
    }

    #[test]
    fn test_backspace_on_sole_blank_line_is_noop() {
        let mut s = session(&[]);
        assert_eq!(s.handle_backspace(), CoreOutcome::Continue);
        assert_eq!(s.buffer().line_count(), 1);
    }

    #[test]
    fn test_backspace_on_locked_text_is_rejected() {
        let mut s = session(&[("A", "assume")]);
        s.cursor = Position::new(0, 3);
        assert_eq!(
            s.handle_backspace(),
            CoreOutcome::Rejected(RejectReason::LineLocked { row: 0 })
        );
        assert_eq!(s.buffer().line(0), Some("0: A by assume"));
    }

    #[test]
    fn test_enter_without_edit_line_requests_new_line() {
        let mut s = session(&[("A", "assume")]);
        match s.handle_enter() {
            CoreOutcome::Request(request) => {
                assert_eq!(request.kind, StepRequestKind::AddLineAfter { line: 0 });
            }
            other => panic!("expected request, got {:?}", other),
        }
        assert_eq!(s.pending_requests(), 1);
    }

    #[test]
    fn test_enter_with_edit_line_commits_and_locks() {
        let mut s = session(&[("A", "assume"), ("", "")]);
        s.edit_line = Some(1);
        s.cursor = Position::new(1, 0);
        s.insert_text("1: B by sorry");
        match s.handle_enter() {
            CoreOutcome::Request(request) => assert_eq!(
                request.kind,
                StepRequestKind::SetLine {
                    line: 1,
                    text: "1: B by sorry".into()
                }
            ),
            other => panic!("expected request, got {:?}", other),
        }
        assert_eq!(s.edit_line(), None);
    }

    #[test]
    fn test_tab_expands_on_edit_line_only() {
        let mut s = session(&[("A", "assume"), ("", "")]);
        s.edit_line = Some(1);
        s.cursor = Position::new(1, 0);
        s.insert_text("a->");
        assert_eq!(s.expand_shorthand(), CoreOutcome::Changed);
        assert_eq!(s.buffer().line(1), Some("a→"));
        assert_eq!(s.cursor(), Position::new(1, 2));

        s.cursor = Position::new(0, 1);
        assert_eq!(s.expand_shorthand(), CoreOutcome::Continue);
    }
}
