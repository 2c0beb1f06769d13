//! Proof editor: the widget adapter
//!
//! Translates raw widget events into session commands, forwards the
//! resulting step requests to the dispatcher and exposes tab-level
//! operations (open, close, save, render).

use crate::dispatcher::{StepDispatcher, StepService};
use crate::error::{SessionError, SessionResult};
use crate::registry::SessionStore;
use crate::render::ProofView;
use crate::settings::{shorthands, EditorSettings};
use crate::store::{ProofItem, TheoryStore};
use input_types::{InputEvent, KeyCode, KeyEvent, PointerEvent};
use proof_editor_core::{
    CoreOutcome, Key, Position, ProofRecord, ProofSession, RejectReason, RequestSeq,
    ResponseOutcome, SessionCommand, SessionConfig, TabId, Tick,
};

/// Editor action result
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditorAction {
    /// Nothing changed
    Continue,
    /// The tab needs redrawing
    Changed,
    /// The input was dropped by the session
    Rejected(RejectReason),
    /// A step request was queued
    Submitted(RequestSeq),
}

/// Multi-tab proof editor
pub struct ProofEditor {
    sessions: SessionStore,
    dispatcher: StepDispatcher,
    view: ProofView,
}

impl ProofEditor {
    pub fn new(config: SessionConfig) -> Self {
        Self {
            sessions: SessionStore::new(config),
            dispatcher: StepDispatcher::new(),
            view: ProofView::default(),
        }
    }

    /// Create an editor from settings, installing their shorthand table
    pub fn with_settings(settings: &EditorSettings) -> Self {
        Self::new(settings.install())
    }

    pub fn sessions(&self) -> &SessionStore {
        &self.sessions
    }

    pub fn sessions_mut(&mut self) -> &mut SessionStore {
        &mut self.sessions
    }

    pub fn dispatcher(&self) -> &StepDispatcher {
        &self.dispatcher
    }

    pub fn dispatcher_mut(&mut self) -> &mut StepDispatcher {
        &mut self.dispatcher
    }

    pub fn session(&self, tab: TabId) -> SessionResult<&ProofSession> {
        self.sessions.get(tab)
    }

    /// Open a tab for a theorem
    ///
    /// A saved proof is rendered directly with every line committed;
    /// otherwise an empty proof is requested from the step service.
    pub fn open_proof(
        &mut self,
        theory: &str,
        thm_name: &str,
        item: ProofItem,
    ) -> SessionResult<TabId> {
        let tab = self.sessions.open(theory);
        let session = self.sessions.get_mut(tab)?;
        session.set_thm_name(Some(thm_name.to_string()));
        session.set_instructions(item.instructions);
        match item.proof {
            Some(steps) => {
                session.load_record(ProofRecord::from_steps(steps));
                tracing::info!(%tab, theory, thm = thm_name, "saved proof opened");
            }
            None => {
                let request = session.request_empty_proof(item.vars, item.prop);
                self.dispatcher.submit(tab, request);
                tracing::info!(%tab, theory, thm = thm_name, "empty proof requested");
            }
        }
        Ok(tab)
    }

    /// Open a tab for a theorem stored in `store`
    pub fn open_from_store(
        &mut self,
        store: &dyn TheoryStore,
        theory: &str,
        thm_name: &str,
    ) -> SessionResult<TabId> {
        let item = store.load_proof(theory, thm_name)?;
        self.open_proof(theory, thm_name, item)
    }

    pub fn close(&mut self, tab: TabId) -> SessionResult<()> {
        self.sessions.destroy(tab).map(|_| ())
    }

    /// Process a raw widget event for a tab
    pub fn process_input(&mut self, tab: TabId, event: InputEvent) -> SessionResult<EditorAction> {
        match translate_event(&event) {
            Some(command) => self.apply(tab, command),
            None => {
                // Keep the tab id contract even for ignored events
                self.sessions.get(tab)?;
                Ok(EditorAction::Continue)
            }
        }
    }

    /// Apply a command to a tab's session
    pub fn apply(&mut self, tab: TabId, command: SessionCommand) -> SessionResult<EditorAction> {
        let session = self.sessions.get_mut(tab)?;
        let action = match session.apply(command) {
            CoreOutcome::Continue => EditorAction::Continue,
            CoreOutcome::Changed => EditorAction::Changed,
            CoreOutcome::Rejected(reason) => {
                tracing::trace!(%tab, %reason, "input dropped");
                EditorAction::Rejected(reason)
            }
            CoreOutcome::Request(request) => {
                let seq = request.seq;
                self.dispatcher.submit(tab, request);
                EditorAction::Submitted(seq)
            }
        };
        Ok(action)
    }

    /// Advance a tab's logical clock
    pub fn tick(&mut self, tab: TabId, now: Tick) -> SessionResult<EditorAction> {
        self.apply(tab, SessionCommand::Tick(now))
    }

    /// Run queued step requests through `service`
    pub fn run_pending(
        &mut self,
        service: &mut dyn StepService,
    ) -> SessionResult<Vec<(TabId, ResponseOutcome)>> {
        self.dispatcher.run_pending(&mut self.sessions, service)
    }

    /// Persist the committed proof of a tab
    pub fn save_proof(&self, store: &mut dyn TheoryStore, tab: TabId) -> SessionResult<()> {
        let session = self.sessions.get(tab)?;
        let thm = session.thm_name().ok_or(SessionError::Untitled(tab))?;
        let record = session.record();
        let marker = session.config().obligation_marker.as_str();
        let num_gaps = record
            .render_lines()
            .iter()
            .filter(|line| line.contains(marker))
            .count();
        store.save_proof(session.theory_name(), thm, record.steps(), num_gaps)?;
        Ok(())
    }

    pub fn render(&self, tab: TabId) -> SessionResult<String> {
        Ok(self.view.render(self.sessions.get(tab)?))
    }
}

/// Translate a widget event into a session command
///
/// Releases, pointer-up and keys the session has no use for yield `None`.
pub fn translate_event(event: &InputEvent) -> Option<SessionCommand> {
    match event {
        InputEvent::Pointer(pointer) => translate_pointer(pointer),
        InputEvent::Key(key) => translate_key(key).map(SessionCommand::Key),
    }
}

fn translate_pointer(event: &PointerEvent) -> Option<SessionCommand> {
    if !event.is_down() {
        return None;
    }
    Some(SessionCommand::MouseDown {
        at: Position::new(event.row, event.col),
        time: event.timestamp,
    })
}

fn translate_key(event: &KeyEvent) -> Option<Key> {
    if !(event.is_pressed() || event.is_repeat()) {
        return None;
    }
    let mods = event.modifiers;
    match event.code {
        KeyCode::Char(ch) if mods.is_ctrl() => Some(Key::Ctrl(ch.to_ascii_lowercase())),
        KeyCode::Char(_) if mods.is_alt() || mods.is_meta() => None,
        KeyCode::Char(ch) => Some(Key::Char(ch)),
        KeyCode::Enter => Some(Key::Enter),
        KeyCode::Tab => Some(Key::Tab),
        KeyCode::Backspace => Some(Key::Backspace),
        KeyCode::Escape => Some(Key::Escape),
        KeyCode::Up => Some(Key::Up),
        KeyCode::Down => Some(Key::Down),
        KeyCode::Left => Some(Key::Left),
        KeyCode::Right => Some(Key::Right),
        KeyCode::Home => Some(Key::Home),
        KeyCode::End => Some(Key::End),
        KeyCode::Delete | KeyCode::Unknown => None,
    }
}

/// Shorthand expansion for a free-text form field using the process-wide
/// table. Returns the new text and cursor, or `None` when nothing expands.
pub fn expand_field(text: &str, cursor: usize) -> Option<(String, usize)> {
    shorthands().expand_field(text, cursor)
}
