//! Session store: one proof session per open tab

use crate::error::{SessionError, SessionResult};
use proof_editor_core::{ProofSession, SessionConfig, TabId};
use std::collections::BTreeMap;
use uuid::Uuid;

/// Registry of open proof sessions
///
/// Sessions are keyed by tab id only; no two tabs share a session.
pub struct SessionStore {
    sessions: BTreeMap<TabId, ProofSession>,
    config: SessionConfig,
}

impl SessionStore {
    /// Creates an empty store whose sessions share `config`
    pub fn new(config: SessionConfig) -> Self {
        Self {
            sessions: BTreeMap::new(),
            config,
        }
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Opens a session under a freshly allocated tab id
    pub fn open(&mut self, theory_name: &str) -> TabId {
        let mut tab = TabId::from_uuid(Uuid::new_v4());
        while self.sessions.contains_key(&tab) {
            tab = TabId::from_uuid(Uuid::new_v4());
        }
        self.insert(tab, theory_name);
        tab
    }

    /// Creates a session for a caller-chosen tab id
    pub fn create(&mut self, tab: TabId, theory_name: &str) -> SessionResult<&mut ProofSession> {
        if self.sessions.contains_key(&tab) {
            return Err(SessionError::DuplicateTab(tab));
        }
        Ok(self.insert(tab, theory_name))
    }

    fn insert(&mut self, tab: TabId, theory_name: &str) -> &mut ProofSession {
        tracing::debug!(%tab, theory = theory_name, "session created");
        self.sessions
            .entry(tab)
            .or_insert_with(|| ProofSession::new(tab, theory_name, self.config.clone()))
    }

    pub fn get(&self, tab: TabId) -> SessionResult<&ProofSession> {
        self.sessions.get(&tab).ok_or_else(|| not_found(tab))
    }

    pub fn get_mut(&mut self, tab: TabId) -> SessionResult<&mut ProofSession> {
        self.sessions.get_mut(&tab).ok_or_else(|| not_found(tab))
    }

    /// Destroys the session of a closed tab
    pub fn destroy(&mut self, tab: TabId) -> SessionResult<ProofSession> {
        let session = self.sessions.remove(&tab).ok_or_else(|| not_found(tab))?;
        tracing::debug!(%tab, "session destroyed");
        Ok(session)
    }

    pub fn contains(&self, tab: TabId) -> bool {
        self.sessions.contains_key(&tab)
    }

    /// Open tabs in id order
    pub fn tabs(&self) -> Vec<TabId> {
        self.sessions.keys().copied().collect()
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new(SessionConfig::default())
    }
}

fn not_found(tab: TabId) -> SessionError {
    tracing::error!(%tab, "no session for tab");
    SessionError::NotFound(tab)
}
