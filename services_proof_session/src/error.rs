//! Error types

use proof_editor_core::TabId;
use thiserror::Error;

/// Session service error
#[derive(Debug, Error)]
pub enum SessionError {
    /// Addressed a tab that has no session. Callers treat this as a bug.
    #[error("no session for {0}")]
    NotFound(TabId),

    #[error("{0} already has a session")]
    DuplicateTab(TabId),

    #[error("{0} is not bound to a theorem")]
    Untitled(TabId),

    #[error("store error: {0}")]
    Store(#[from] StoreError),

    #[error("step service error: {0}")]
    Step(#[from] StepServiceError),

    #[error("settings error: {0}")]
    Settings(#[from] SettingsError),
}

/// Session service result
pub type SessionResult<T> = Result<T, SessionError>;

/// Failure reported by the step-application service
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StepServiceError {
    /// The rule does not apply to the goal and facts, or the edited line
    /// is not a valid step
    #[error("{0}")]
    Rejected(String),

    /// The service could not be reached or did not answer
    #[error("step service unavailable: {0}")]
    Unavailable(String),
}

/// Theory document store error
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("theory not found: {0}")]
    TheoryNotFound(String),

    #[error("item {item} not found in theory {theory}")]
    ItemNotFound { theory: String, item: String },

    #[error("item {0} is not a theorem")]
    NotATheorem(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Settings loading error
#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid settings: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("double_click_window must be positive")]
    ZeroWindow,

    #[error("obligation_marker must not be empty")]
    EmptyMarker,
}
