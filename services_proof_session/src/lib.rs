//! # Proof Session Service
//!
//! Hosts proof-editing sessions on top of `proof_editor_core`.
//!
//! ## Philosophy
//!
//! - **Explicit registry**: Sessions live in a `SessionStore` keyed by tab id;
//!   there is no ambient global session map
//! - **Events in, commands down**: Raw widget events are translated into
//!   `SessionCommand`s before they reach a session
//! - **Sequenced step calls**: Requests to the step service are queued and
//!   their responses fenced by sequence number
//! - **Testable**: Every workflow runs with injected input events and an
//!   in-process step service
//!
//! ## Non-Goals
//!
//! This is NOT:
//! - A prover (steps are computed by an external `StepService`)
//! - A parser or type-checker for formal syntax
//! - An HTML front end
//!
//! ## Design
//!
//! - `SessionStore`: create/get/destroy sessions by tab
//! - `StepDispatcher`: boundary to the step-application service
//! - `TheoryStore`: load and persist theory documents as JSON
//! - `ProofEditor`: widget adapter tying the above together
//! - `ProofView`: text rendering of a tab

pub mod dispatcher;
pub mod editor;
pub mod error;
pub mod registry;
pub mod render;
pub mod settings;
pub mod store;

pub use dispatcher::{StepDispatcher, StepService};
pub use editor::{expand_field, translate_event, EditorAction, ProofEditor};
pub use error::{SessionError, SessionResult, SettingsError, StepServiceError, StoreError};
pub use registry::SessionStore;
pub use render::{tab_label, ProofView};
pub use settings::{install_shorthands, shorthands, EditorSettings};
pub use store::{
    JsonFileTheoryStore, MemoryTheoryStore, ProofItem, Theory, TheoryItem, TheoryStore,
};
