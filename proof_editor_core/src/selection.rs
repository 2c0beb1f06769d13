//! Selection controller: edit unlock and goal/fact toggling

use crate::buffer::{Position, Selection, TextMark};
use crate::core::{CoreOutcome, RejectReason};
use crate::session::ProofSession;

impl ProofSession {
    /// Unlock the cursor line for editing
    ///
    /// An obligation line is unlocked with its marker selected and the text
    /// before the marker made read-only, so typing replaces the marker. A
    /// blank line is unlocked as an insertion point. Any other line stays
    /// locked.
    pub fn unlock_edit(&mut self) -> CoreOutcome {
        let row = self.cursor.row;
        match self.edit_line {
            Some(line) if line == row => return CoreOutcome::Continue,
            Some(line) => {
                tracing::debug!(tab = %self.id, line = row, open = line, "unlock refused");
                return CoreOutcome::Rejected(RejectReason::AlreadyEditing { row: line });
            }
            None => {}
        }

        let len = self.buffer.line_length(row);
        self.cursor = Position::new(row, len);

        if let Some((start, end)) = self.marker_span(row) {
            self.lock_prefix(row, start);
            self.selection = Some(Selection { row, start, end });
            self.edit_line = Some(row);
            tracing::debug!(tab = %self.id, line = row, "obligation unlocked");
            CoreOutcome::Changed
        } else if self.buffer.is_blank(row) {
            self.selection = None;
            self.edit_line = Some(row);
            tracing::debug!(tab = %self.id, line = row, "blank line unlocked");
            CoreOutcome::Changed
        } else {
            CoreOutcome::Continue
        }
    }

    /// Make `[0, end)` of an open line read-only
    pub(crate) fn lock_prefix(&mut self, row: usize, end: usize) {
        if end > 0 {
            self.buffer.add_mark(TextMark::read_only(row, 0, end));
        }
    }

    /// Goal/fact toggle for the cursor line
    ///
    /// Rule suggestions belong to the previous selection and are dropped on
    /// every toggle, including one that leaves goal and facts as they were.
    pub fn toggle_selection(&mut self) -> CoreOutcome {
        let row = self.cursor.row;
        let toggled = if self.is_obligation(row) {
            let moved = self.goal_line != Some(row);
            if moved {
                self.goal_line = Some(row);
                tracing::debug!(tab = %self.id, line = row, "goal selected");
            }
            moved
        } else if self.goal_line.is_some() {
            if !self.facts.remove(&row) {
                self.facts.insert(row);
            }
            tracing::debug!(tab = %self.id, line = row, facts = self.facts.len(), "fact toggled");
            true
        } else {
            false
        };

        let had_matches = !self.matches.is_empty();
        self.matches.clear();
        if toggled || had_matches {
            CoreOutcome::Changed
        } else {
            CoreOutcome::Continue
        }
    }

    /// Char span of the last obligation marker on a line
    fn marker_span(&self, row: usize) -> Option<(usize, usize)> {
        let marker = self.config.obligation_marker.as_str();
        if marker.is_empty() {
            return None;
        }
        let line = self.buffer.line(row)?;
        let byte_start = line.rfind(marker)?;
        let start = line[..byte_start].chars().count();
        Some((start, start + marker.chars().count()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::proof::{ProofRecord, StepRecord};
    use crate::session::{SessionConfig, TabId};
    use alloc::vec;
    use alloc::vec::Vec;
    use uuid::Uuid;

    fn session() -> ProofSession {
        let mut session = ProofSession::new(
            TabId::from_uuid(Uuid::from_u128(3)),
            "logic_base",
            SessionConfig::default(),
        );
        session.load_record(ProofRecord::from_steps(vec![
            StepRecord::new("0", "A & B", "assume"),
            StepRecord::new("1", "B", "sorry"),
            StepRecord::blank("2"),
            StepRecord::new("3", "B & A", "sorry"),
        ]));
        session
    }

    #[test]
    fn test_unlock_obligation_selects_marker() {
        let mut s = session();
        s.cursor = Position::new(1, 0);
        assert_eq!(s.unlock_edit(), CoreOutcome::Changed);
        assert_eq!(s.edit_line(), Some(1));
        assert_eq!(s.cursor(), Position::new(1, 13));
        assert_eq!(
            s.selection(),
            Some(Selection {
                row: 1,
                start: 8,
                end: 13
            })
        );
        assert_eq!(s.buffer().marks(), &[TextMark::read_only(1, 0, 8)]);
    }

    #[test]
    fn test_typing_replaces_marker_but_not_prefix() {
        let mut s = session();
        s.cursor = Position::new(1, 0);
        s.unlock_edit();
        assert_eq!(s.insert_text("auto"), CoreOutcome::Changed);
        assert_eq!(s.buffer().line(1), Some("1: B by auto"));

        s.cursor = Position::new(1, 2);
        assert_eq!(
            s.insert_text("x"),
            CoreOutcome::Rejected(RejectReason::ReadOnlySpan { row: 1 })
        );
        assert_eq!(s.buffer().line(1), Some("1: B by auto"));
    }

    #[test]
    fn test_unlock_blank_line() {
        let mut s = session();
        s.cursor = Position::new(2, 0);
        assert_eq!(s.unlock_edit(), CoreOutcome::Changed);
        assert_eq!(s.edit_line(), Some(2));
        assert!(s.selection().is_none());
    }

    #[test]
    fn test_proved_line_stays_locked() {
        let mut s = session();
        s.cursor = Position::new(0, 0);
        assert_eq!(s.unlock_edit(), CoreOutcome::Continue);
        assert_eq!(s.edit_line(), None);
        assert_eq!(s.cursor(), Position::new(0, 18));
    }

    #[test]
    fn test_second_unlock_is_rejected() {
        let mut s = session();
        s.cursor = Position::new(2, 0);
        s.unlock_edit();
        s.cursor = Position::new(3, 0);
        assert_eq!(
            s.unlock_edit(),
            CoreOutcome::Rejected(RejectReason::AlreadyEditing { row: 2 })
        );
        assert_eq!(s.edit_line(), Some(2));
    }

    #[test]
    fn test_fact_toggle_without_goal_is_noop() {
        let mut s = session();
        s.cursor = Position::new(0, 0);
        assert_eq!(s.toggle_selection(), CoreOutcome::Continue);
        assert!(s.facts().is_empty());
    }

    #[test]
    fn test_goal_then_fact_toggle() {
        let mut s = session();
        s.set_matches(vec!["conjI".into()]);

        s.cursor = Position::new(3, 0);
        assert_eq!(s.toggle_selection(), CoreOutcome::Changed);
        assert_eq!(s.goal_line(), Some(3));
        assert!(s.matches().is_empty());

        s.cursor = Position::new(0, 0);
        s.toggle_selection();
        assert_eq!(s.facts().iter().copied().collect::<Vec<_>>(), vec![0]);
        s.toggle_selection();
        assert!(s.facts().is_empty());
    }

    #[test]
    fn test_reselecting_goal_clears_suggestions() {
        let mut s = session();
        s.cursor = Position::new(3, 0);
        s.toggle_selection();
        s.set_matches(vec!["conjI".into()]);

        assert_eq!(s.toggle_selection(), CoreOutcome::Changed);
        assert_eq!(s.goal_line(), Some(3));
        assert!(s.matches().is_empty());
        assert_eq!(s.toggle_selection(), CoreOutcome::Continue);
    }

    #[test]
    fn test_switching_goal_keeps_facts() {
        let mut s = session();
        s.cursor = Position::new(3, 0);
        s.toggle_selection();
        s.cursor = Position::new(0, 0);
        s.toggle_selection();
        s.cursor = Position::new(1, 0);
        s.toggle_selection();
        assert_eq!(s.goal_line(), Some(1));
        assert!(s.facts().contains(&0));
    }
}
