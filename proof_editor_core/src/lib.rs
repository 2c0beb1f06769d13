#![no_std]

//! # Proof Editor Core
//!
//! Editing-session state machine for a line-oriented proof editor.
//!
//! ## Philosophy
//!
//! - **No_std compatible**: Uses alloc but not std
//! - **Deterministic**: Same command trace => same session state
//! - **One open line**: At most one line per session is editable; every
//!   other line is a committed proof step
//! - **Widget-agnostic**: Hosts translate raw events into `SessionCommand`s
//! - **Explicit requests**: Step-service calls are returned to the host as
//!   sequenced `StepRequest`s, never performed here
//!
//! ## Design
//!
//! The core provides:
//! - ProofSession: per-tab state (goal, facts, edit line, backing record)
//! - Line-mutability guard and selection controller
//! - ClickDetector: logical-clock double-click disambiguation
//! - ShorthandTable: ASCII token to symbol expansion
//! - InstructionCursor: linear hint navigator
//! - SequenceGate: stale-response fencing
//! - SessionSnapshot: deterministic state for replay testing

extern crate alloc;

pub mod buffer;
pub mod click;
pub mod command;
pub mod core;
pub mod guard;
pub mod instructions;
pub mod key;
pub mod proof;
pub mod request;
pub mod selection;
pub mod session;
pub mod shorthand;
pub mod snapshot;

pub use self::core::{CoreOutcome, RejectReason, ResponseOutcome};
pub use buffer::{BufferEdit, Position, Selection, TextBuffer, TextMark};
pub use click::{ClickDetector, ClickState, Gesture, Tick, DEFAULT_DOUBLE_CLICK_WINDOW};
pub use command::{SessionCommand, StepRule};
pub use instructions::InstructionCursor;
pub use key::Key;
pub use proof::{ProofRecord, StepRecord};
pub use request::{RequestSeq, SequenceError, SequenceGate, StepRequest, StepRequestKind, StepResponse};
pub use session::{ProofSession, SessionConfig, TabId, DEFAULT_OBLIGATION_MARKER};
pub use shorthand::{Expansion, ShorthandTable, BUILTIN_SHORTHANDS};
pub use snapshot::SessionSnapshot;
