//! Text rendering of a proof tab

use proof_editor_core::ProofSession;

/// Proof tab view
///
/// Provides a simple text-based representation of a session suitable for
/// display in a console or test output. Each buffer line is prefixed with
/// its role: `G` goal, `F` fact, `E` open for editing.
pub struct ProofView {
    /// Draw the cursor as `[c]`
    show_cursor: bool,
}

impl ProofView {
    pub fn new(show_cursor: bool) -> Self {
        Self { show_cursor }
    }

    /// Render the session to a string
    pub fn render(&self, session: &ProofSession) -> String {
        let mut output = String::new();
        output.push_str(&tab_label(session));
        output.push('\n');

        let cursor = session.cursor();
        for (row, line) in session.buffer().lines().iter().enumerate() {
            output.push(role(session, row));
            output.push(' ');
            if self.show_cursor && row == cursor.row {
                output.push_str(&render_line_with_cursor(line, cursor.col));
            } else {
                output.push_str(line);
            }
            output.push('\n');
        }

        output.push_str(&self.render_indicator(session));
        output.push('\n');

        if !session.matches().is_empty() {
            output.push_str("matches: ");
            output.push_str(&session.matches().join(", "));
            output.push('\n');
        }

        if let Some(nav) = session.instructions() {
            output.push_str(&format!("hint {}: {}\n", nav.counter(), nav.current()));
        }

        if let Some(message) = session.error_message() {
            output.push_str("error: ");
            output.push_str(message);
            output.push('\n');
        }

        output
    }

    /// Goal/facts indicator line
    pub fn render_indicator(&self, session: &ProofSession) -> String {
        let goal = match session.goal_line() {
            Some(row) => row.to_string(),
            None => "none".to_string(),
        };
        let facts = if session.facts().is_empty() {
            "-".to_string()
        } else {
            session
                .facts()
                .iter()
                .map(|row| row.to_string())
                .collect::<Vec<_>>()
                .join(", ")
        };
        format!("goal: {} | facts: {}", goal, facts)
    }
}

impl Default for ProofView {
    fn default() -> Self {
        Self::new(true)
    }
}

/// Label shown on the tab: `theory.theorem`, or the theory alone
pub fn tab_label(session: &ProofSession) -> String {
    match session.thm_name() {
        Some(thm) => format!("[{}.{}]", session.theory_name(), thm),
        None => format!("[{}]", session.theory_name()),
    }
}

fn role(session: &ProofSession, row: usize) -> char {
    if session.edit_line() == Some(row) {
        'E'
    } else if session.goal_line() == Some(row) {
        'G'
    } else if session.facts().contains(&row) {
        'F'
    } else {
        ' '
    }
}

fn render_line_with_cursor(line: &str, col: usize) -> String {
    let mut result = String::new();
    let mut len = 0;
    for (i, ch) in line.chars().enumerate() {
        if i == col {
            result.push_str(&format!("[{}]", ch));
        } else {
            result.push(ch);
        }
        len += 1;
    }
    // Cursor at end of line
    if col == len {
        result.push_str("[ ]");
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use proof_editor_core::{
        Position, ProofRecord, SessionCommand, SessionConfig, StepRecord, TabId,
    };
    use uuid::Uuid;

    fn session() -> ProofSession {
        let mut session = ProofSession::new(
            TabId::from_uuid(Uuid::from_u128(5)),
            "logic_base",
            SessionConfig::default(),
        );
        session.set_thm_name(Some("conj_comm".into()));
        session.load_record(ProofRecord::from_steps(vec![
            StepRecord::new("0", "A ∧ B", "assume"),
            StepRecord::new("1", "B ∧ A", "sorry"),
        ]));
        session
    }

    #[test]
    fn test_render_roles_and_indicator() {
        let mut s = session();
        s.apply(SessionCommand::MouseDown {
            at: Position::new(1, 0),
            time: 0,
        });
        s.apply(SessionCommand::MouseDown {
            at: Position::new(0, 0),
            time: 1_000,
        });

        let view = ProofView::new(false);
        let output = view.render(&s);
        assert_eq!(
            output,
            "[logic_base.conj_comm]\nF 0: A ∧ B by assume\nG 1: B ∧ A by sorry\ngoal: 1 | facts: 0\n"
        );
    }

    #[test]
    fn test_render_cursor_after_unicode() {
        assert_eq!(render_line_with_cursor("a→", 2), "a→[ ]");
        assert_eq!(render_line_with_cursor("a→", 1), "a[→]");
    }

    #[test]
    fn test_render_instructions_and_error() {
        let mut s = session();
        s.set_instructions(vec!["intro".into(), "apply conjI".into()]);
        s.apply(SessionCommand::InstructionForward);
        let output = ProofView::default().render(&s);
        assert!(output.contains("hint 2/2: apply conjI\n"));
        assert!(output.contains("goal: none | facts: -"));
        assert!(!output.contains("error:"));
    }

    #[test]
    fn test_tab_label_without_theorem() {
        let s = ProofSession::new(
            TabId::from_uuid(Uuid::from_u128(6)),
            "logic_base",
            SessionConfig::default(),
        );
        assert_eq!(tab_label(&s), "[logic_base]");
    }
}
