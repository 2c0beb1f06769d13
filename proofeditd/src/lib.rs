//! # Proof Editor Host
//!
//! This crate provides the host runtime for the proof editor.
//!
//! ## Responsibilities
//!
//! The host runtime:
//! - Loads settings and a theory document
//! - Opens one proof tab for a theorem
//! - Replays a scripted input trace against it (input → step → resolve)
//! - Resolves step requests with an offline step service
//! - Prints the rendered session
//!
//! ## Non-Responsibilities
//!
//! The host does NOT:
//! - Compute inferences (rule applications need a proof backend)
//! - Provide terminal emulation or live keyboard input

pub mod input_script;
pub mod logging;
pub mod runtime;
pub mod service;

pub use input_script::{InputScript, InputScriptError, ScriptedInput};
pub use runtime::{HostRuntime, HostRuntimeConfig, HostRuntimeError};
pub use service::{parse_step, LocalStepService};
