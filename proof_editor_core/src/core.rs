//! Session command dispatch and step-response application
//!
//! `ProofSession::apply` is the single entry point for user intent; the
//! widget adapter never mutates the session any other way.
//! `ProofSession::apply_response` is the single entry point for results
//! coming back from the step service.

use alloc::collections::BTreeMap;
use alloc::string::String;
use alloc::vec::Vec;
use core::fmt;

use crate::buffer::Position;
use crate::click::{Gesture, Tick};
use crate::command::{SessionCommand, StepRule};
use crate::key::Key;
use crate::proof::{ProofRecord, StepRecord};
use crate::request::{SequenceError, StepRequest, StepRequestKind, StepResponse};
use crate::session::ProofSession;
use crate::snapshot::SessionSnapshot;

/// Outcome of applying a command to a session
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CoreOutcome {
    /// Nothing changed
    Continue,
    /// Session state changed (buffer, cursor, selection, goal or facts)
    Changed,
    /// The command was dropped; the session is unchanged
    Rejected(RejectReason),
    /// The host must forward this request to the step service
    Request(StepRequest),
}

/// Why a command was dropped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectReason {
    /// Change aimed at a committed line
    LineLocked { row: usize },
    /// Change overlapping a read-only span of the unlocked line
    ReadOnlySpan { row: usize },
    /// Another line is already unlocked
    AlreadyEditing { row: usize },
    /// Rule application needs a goal
    NoGoal,
    /// Commit without an unlocked line
    NoEditLine,
    /// Change outside the buffer
    OutOfBounds,
    /// Line indices are pinned until outstanding step requests resolve
    RequestPending,
}

impl fmt::Display for RejectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RejectReason::LineLocked { row } => write!(f, "line {} is committed", row),
            RejectReason::ReadOnlySpan { row } => {
                write!(f, "edit touches a read-only span on line {}", row)
            }
            RejectReason::AlreadyEditing { row } => write!(f, "line {} is already open", row),
            RejectReason::NoGoal => write!(f, "no goal selected"),
            RejectReason::NoEditLine => write!(f, "no line is open for editing"),
            RejectReason::OutOfBounds => write!(f, "edit outside the buffer"),
            RejectReason::RequestPending => write!(f, "a step request is still pending"),
        }
    }
}

/// Outcome of applying a step response
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResponseOutcome {
    /// The buffer was replaced with the returned proof
    Applied,
    /// The service rejected the request; its message is shown inline
    RuleError(String),
    /// Superseded or unknown response, dropped without effect
    Stale(SequenceError),
}

impl ProofSession {
    /// Apply a command and return the outcome
    pub fn apply(&mut self, command: SessionCommand) -> CoreOutcome {
        match command {
            SessionCommand::Key(key) => self.apply_key(key),
            SessionCommand::MouseDown { at, time } => self.mouse_down(at, time),
            SessionCommand::Tick(now) => {
                // A lapsed single click is plain cursor movement
                self.clicks.tick(now);
                CoreOutcome::Continue
            }
            SessionCommand::MoveCursor(pos) => self.move_cursor(pos),
            SessionCommand::UnlockEdit => self.unlock_edit(),
            SessionCommand::ToggleSelection => self.toggle_selection(),
            SessionCommand::CommitEdit => self.commit_edit(),
            SessionCommand::CancelEdit => self.cancel_edit(),
            SessionCommand::InsertLineAfter => self.insert_line_after(),
            SessionCommand::RemoveLine => self.remove_line(),
            SessionCommand::ExpandShorthand => self.expand_shorthand(),
            SessionCommand::ApplyRule { rule, args } => self.apply_rule(rule, args),
            SessionCommand::InstructionBack => self.step_instructions(false),
            SessionCommand::InstructionForward => self.step_instructions(true),
        }
    }

    fn apply_key(&mut self, key: Key) -> CoreOutcome {
        if let Some(target) = key.motion(self.cursor) {
            return self.move_cursor(target);
        }
        match key {
            Key::Char(ch) => {
                let mut buf = [0u8; 4];
                self.insert_text(ch.encode_utf8(&mut buf))
            }
            Key::Enter => self.handle_enter(),
            Key::Tab => self.expand_shorthand(),
            Key::Backspace => self.handle_backspace(),
            Key::Escape => self.cancel_edit(),
            Key::Ctrl(ch) => match StepRule::from_shortcut(ch) {
                Some(rule) => self.apply_rule(rule, None),
                None => CoreOutcome::Continue,
            },
            Key::Left | Key::Right | Key::Up | Key::Down | Key::Home | Key::End => {
                CoreOutcome::Continue
            }
        }
    }

    fn move_cursor(&mut self, pos: Position) -> CoreOutcome {
        let pos = self.buffer.clamp(pos);
        if pos == self.cursor && self.selection.is_none() {
            return CoreOutcome::Continue;
        }
        self.cursor = pos;
        self.selection = None;
        CoreOutcome::Changed
    }

    /// Mouse-down: move the cursor, then either toggle goal/facts (first
    /// click) or unlock the line (second click inside the window)
    fn mouse_down(&mut self, at: Position, time: Tick) -> CoreOutcome {
        self.cursor = self.buffer.clamp(at);
        self.selection = None;
        match self.clicks.press(time) {
            Gesture::Double => match self.unlock_edit() {
                CoreOutcome::Continue => CoreOutcome::Changed,
                other => other,
            },
            _ => {
                self.toggle_selection();
                CoreOutcome::Changed
            }
        }
    }

    fn apply_rule(&mut self, rule: StepRule, args: Option<String>) -> CoreOutcome {
        if self.goal_line.is_none() {
            return CoreOutcome::Rejected(RejectReason::NoGoal);
        }
        tracing::debug!(tab = %self.id, rule = rule.as_str(), "rule requested");
        CoreOutcome::Request(self.issue(StepRequestKind::ApplyRule { rule, args }))
    }

    fn step_instructions(&mut self, forward: bool) -> CoreOutcome {
        let Some(cursor) = self.instructions.as_mut() else {
            return CoreOutcome::Continue;
        };
        let before = cursor.position();
        if forward {
            cursor.forward();
        } else {
            cursor.back();
        }
        if cursor.position() == before {
            CoreOutcome::Continue
        } else {
            CoreOutcome::Changed
        }
    }

    /// Request a fresh proof of `prop` over `vars` from the step service
    pub fn request_empty_proof(
        &mut self,
        vars: BTreeMap<String, String>,
        prop: impl Into<String>,
    ) -> StepRequest {
        self.issue(StepRequestKind::InitEmptyProof {
            vars,
            prop: prop.into(),
        })
    }

    /// Stamp a request with the next sequence number and remember it
    pub(crate) fn issue(&mut self, kind: StepRequestKind) -> StepRequest {
        let seq = self.sequence.issue();
        self.in_flight.insert(seq, kind.clone());
        tracing::debug!(tab = %self.id, seq = seq.as_u64(), "step request issued");
        StepRequest {
            seq,
            goal_line: self.goal_line,
            facts: self.facts.iter().copied().collect(),
            kind,
        }
    }

    /// Apply a completion from the step service
    pub fn apply_response(&mut self, response: StepResponse) -> ResponseOutcome {
        let kind = self.in_flight.remove(&response.seq);
        if let Err(err) = self.sequence.admit(response.seq) {
            tracing::warn!(tab = %self.id, %err, "dropping step response");
            return ResponseOutcome::Stale(err);
        }
        let commit = match &kind {
            Some(StepRequestKind::SetLine { line, .. }) => self
                .pending_commits
                .get(line)
                .filter(|pending| pending.seq == response.seq)
                .cloned(),
            _ => None,
        };
        // Anything issued before this response can only arrive stale now
        self.in_flight.retain(|seq, _| *seq > response.seq);
        self.pending_commits
            .retain(|_, pending| self.in_flight.contains_key(&pending.seq));

        match response.result {
            Ok(steps) => {
                self.apply_steps(steps);
                ResponseOutcome::Applied
            }
            Err(message) => {
                tracing::warn!(tab = %self.id, seq = response.seq.as_u64(), %message, "step rejected");
                if let Some(StepRequestKind::SetLine { line, .. }) = kind {
                    if self.edit_line.is_none() && line < self.buffer.line_count() {
                        self.edit_line = Some(line);
                        if let Some(end) = commit.and_then(|c| c.locked_prefix) {
                            self.lock_prefix(line, end);
                        }
                    }
                }
                self.error_message = Some(message.clone());
                ResponseOutcome::RuleError(message)
            }
        }
    }

    /// Replace the proof with service output; new lines are committed and
    /// the first obligation becomes the goal
    fn apply_steps(&mut self, steps: Vec<StepRecord>) {
        self.load_record(ProofRecord::from_steps(steps));
        self.goal_line = (0..self.buffer.line_count()).find(|&row| self.is_obligation(row));
    }

    /// Deterministic view of the session state
    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            cursor: self.cursor,
            buffer_lines: self.buffer.lines().to_vec(),
            selection: self.selection,
            goal_line: self.goal_line,
            facts: self.facts.iter().copied().collect(),
            edit_line: self.edit_line,
            read_only_marks: self.buffer.marks().iter().filter(|m| m.read_only).count(),
            error_message: self.error_message.clone(),
            instruction_position: self.instructions.as_ref().map(|i| i.position()),
            last_applied: self.sequence.last_applied().map(|seq| seq.as_u64()),
            pending_requests: self.in_flight.len(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::buffer::TextMark;
    use crate::click::DEFAULT_DOUBLE_CLICK_WINDOW;
    use crate::proof::StepRecord;
    use crate::request::RequestSeq;
    use crate::session::{SessionConfig, TabId};
    use alloc::string::ToString;
    use alloc::vec;
    use uuid::Uuid;

    fn session() -> ProofSession {
        let mut session = ProofSession::new(
            TabId::from_uuid(Uuid::from_u128(9)),
            "logic_base",
            SessionConfig::default(),
        );
        session.load_record(ProofRecord::from_steps(vec![
            StepRecord::new("0", "A & B", "assume"),
            StepRecord::blank("1"),
            StepRecord::new("2", "B & A", "sorry"),
        ]));
        session
    }

    fn click(s: &mut ProofSession, row: usize, time: u64) -> CoreOutcome {
        s.apply(SessionCommand::MouseDown {
            at: Position::new(row, 0),
            time,
        })
    }

    #[test]
    fn test_double_click_inside_window_unlocks_blank_line() {
        let mut s = session();
        click(&mut s, 1, 1_000);
        click(&mut s, 1, 1_250);
        assert_eq!(s.edit_line(), Some(1));
    }

    #[test]
    fn test_slow_clicks_do_not_unlock() {
        let mut s = session();
        click(&mut s, 1, 1_000);
        s.apply(SessionCommand::Tick(1_000 + DEFAULT_DOUBLE_CLICK_WINDOW));
        click(&mut s, 1, 1_350);
        assert_eq!(s.edit_line(), None);
    }

    #[test]
    fn test_single_click_on_obligation_selects_goal() {
        let mut s = session();
        assert_eq!(click(&mut s, 2, 0), CoreOutcome::Changed);
        assert_eq!(s.goal_line(), Some(2));
        assert_eq!(s.edit_line(), None);
    }

    #[test]
    fn test_typing_on_committed_line_is_dropped() {
        let mut s = session();
        let before = s.snapshot();
        assert_eq!(
            s.apply(SessionCommand::Key(Key::Char('x'))),
            CoreOutcome::Rejected(RejectReason::LineLocked { row: 0 })
        );
        assert_eq!(s.snapshot(), before);
    }

    #[test]
    fn test_rule_shortcut_requires_goal() {
        let mut s = session();
        assert_eq!(
            s.apply(SessionCommand::Key(Key::Ctrl('b'))),
            CoreOutcome::Rejected(RejectReason::NoGoal)
        );
        assert_eq!(s.pending_requests(), 0);
    }

    #[test]
    fn test_rule_shortcut_carries_goal_and_facts() {
        let mut s = session();
        click(&mut s, 2, 0);
        click(&mut s, 0, 1_000);
        match s.apply(SessionCommand::Key(Key::Ctrl('b'))) {
            CoreOutcome::Request(request) => {
                assert_eq!(request.goal_line, Some(2));
                assert_eq!(request.facts, vec![0]);
                assert_eq!(
                    request.kind,
                    StepRequestKind::ApplyRule {
                        rule: StepRule::BackwardStep,
                        args: None
                    }
                );
            }
            other => panic!("expected request, got {:?}", other),
        }
    }

    #[test]
    fn test_successful_response_replaces_proof() {
        let mut s = session();
        click(&mut s, 2, 0);
        let CoreOutcome::Request(request) = s.apply(SessionCommand::Key(Key::Ctrl('i'))) else {
            panic!("expected request");
        };
        let outcome = s.apply_response(StepResponse::ok(
            request.seq,
            vec![
                StepRecord::new("0", "A & B", "assume"),
                StepRecord::new("1", "A", "sorry"),
                StepRecord::new("2", "B & A", "conjI"),
            ],
        ));
        assert_eq!(outcome, ResponseOutcome::Applied);
        assert_eq!(s.buffer().line(1), Some("1: A by sorry"));
        assert_eq!(s.goal_line(), Some(1));
        assert!(s.facts().is_empty());
        assert_eq!(s.pending_requests(), 0);
    }

    #[test]
    fn test_stale_response_is_dropped() {
        let mut s = session();
        click(&mut s, 2, 0);
        let CoreOutcome::Request(a) = s.apply(SessionCommand::Key(Key::Ctrl('i'))) else {
            panic!("expected request");
        };
        let CoreOutcome::Request(b) = s.apply(SessionCommand::Key(Key::Ctrl('f'))) else {
            panic!("expected request");
        };
        assert_eq!(
            s.apply_response(StepResponse::ok(b.seq, vec![StepRecord::new("0", "B", "")])),
            ResponseOutcome::Applied
        );
        let before = s.snapshot();
        assert!(matches!(
            s.apply_response(StepResponse::ok(a.seq, Vec::new())),
            ResponseOutcome::Stale(SequenceError::Stale { .. })
        ));
        assert_eq!(s.snapshot(), before);
    }

    #[test]
    fn test_unissued_response_is_dropped() {
        let mut s = session();
        assert_eq!(
            s.apply_response(StepResponse::ok(RequestSeq::new(3), Vec::new())),
            ResponseOutcome::Stale(SequenceError::Unissued {
                seq: RequestSeq::new(3)
            })
        );
    }

    #[test]
    fn test_rejected_commit_reopens_line() {
        let mut s = session();
        click(&mut s, 1, 0);
        click(&mut s, 1, 100);
        for ch in "1: C".chars() {
            s.apply(SessionCommand::Key(Key::Char(ch)));
        }
        let CoreOutcome::Request(request) = s.apply(SessionCommand::Key(Key::Enter)) else {
            panic!("expected request");
        };
        assert_eq!(s.edit_line(), None);

        let outcome = s.apply_response(StepResponse::error(request.seq, "parse error"));
        assert_eq!(outcome, ResponseOutcome::RuleError("parse error".to_string()));
        assert_eq!(s.edit_line(), Some(1));
        assert_eq!(s.error_message(), Some("parse error"));
        assert_eq!(s.buffer().line(1), Some("1: C"));
    }

    #[test]
    fn test_rejected_commit_relocks_prefix() {
        let mut s = session();
        click(&mut s, 2, 0);
        click(&mut s, 2, 100);
        assert_eq!(s.buffer().marks(), &[TextMark::read_only(2, 0, 12)]);
        for ch in "conjI".chars() {
            s.apply(SessionCommand::Key(Key::Char(ch)));
        }
        let CoreOutcome::Request(request) = s.apply(SessionCommand::Key(Key::Enter)) else {
            panic!("expected request");
        };
        assert!(s.buffer().marks().is_empty());

        s.apply_response(StepResponse::error(request.seq, "conjI does not apply"));
        assert_eq!(s.edit_line(), Some(2));
        assert_eq!(s.buffer().marks(), &[TextMark::read_only(2, 0, 12)]);

        s.apply(SessionCommand::MoveCursor(Position::new(2, 1)));
        assert_eq!(
            s.apply(SessionCommand::Key(Key::Char('x'))),
            CoreOutcome::Rejected(RejectReason::ReadOnlySpan { row: 2 })
        );
        assert_eq!(s.buffer().line(2), Some("2: B & A by conjI"));
    }

    #[test]
    fn test_instruction_commands() {
        let mut s = session();
        assert_eq!(s.apply(SessionCommand::InstructionForward), CoreOutcome::Continue);
        s.set_instructions(vec!["one".into(), "two".into()]);
        assert_eq!(s.apply(SessionCommand::InstructionBack), CoreOutcome::Continue);
        assert_eq!(s.apply(SessionCommand::InstructionForward), CoreOutcome::Changed);
        assert_eq!(s.apply(SessionCommand::InstructionForward), CoreOutcome::Continue);
        assert_eq!(s.instructions().map(|i| i.current()), Some("two"));
    }

    #[test]
    fn test_empty_proof_request() {
        let mut s = session();
        let mut vars = BTreeMap::new();
        vars.insert("A".to_string(), "bool".to_string());
        let request = s.request_empty_proof(vars.clone(), "A --> A");
        assert_eq!(
            request.kind,
            StepRequestKind::InitEmptyProof {
                vars,
                prop: "A --> A".into()
            }
        );
        assert_eq!(s.pending_requests(), 1);
    }

    #[test]
    fn test_arrow_keys_clamp() {
        let mut s = session();
        assert_eq!(s.apply(SessionCommand::Key(Key::Up)), CoreOutcome::Continue);
        s.apply(SessionCommand::Key(Key::End));
        assert_eq!(s.cursor(), Position::new(0, 18));
        s.apply(SessionCommand::Key(Key::Down));
        assert_eq!(s.cursor(), Position::new(1, 0));
    }
}
