//! Step-application requests, responses and response fencing
//!
//! Every request a session issues carries a per-session sequence number.
//! A response is applied only if its number is newer than the last one
//! applied; anything older has been superseded and is dropped.

use alloc::collections::BTreeMap;
use alloc::string::String;
use alloc::vec::Vec;
use core::fmt;

#[cfg(feature = "serde_support")]
use serde::{Deserialize, Serialize};

use crate::command::StepRule;
use crate::proof::StepRecord;

/// Per-session request sequence number
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde_support", derive(Serialize, Deserialize))]
pub struct RequestSeq(u64);

impl RequestSeq {
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    pub const fn as_u64(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for RequestSeq {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// What the session asks the step service to do
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde_support", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde_support", serde(tag = "type", rename_all = "snake_case"))]
pub enum StepRequestKind {
    /// Apply a rule to the goal using the facts
    ApplyRule {
        rule: StepRule,
        args: Option<String>,
    },
    /// Record edited text as the step at `line`
    SetLine { line: usize, text: String },
    /// Insert a new step after `line`
    AddLineAfter { line: usize },
    /// Start a proof of `prop` over `vars`
    InitEmptyProof {
        vars: BTreeMap<String, String>,
        prop: String,
    },
}

/// Request sent to the external step-application service
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde_support", derive(Serialize, Deserialize))]
pub struct StepRequest {
    pub seq: RequestSeq,
    pub goal_line: Option<usize>,
    pub facts: Vec<usize>,
    pub kind: StepRequestKind,
}

/// Completion of a step request
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde_support", derive(Serialize, Deserialize))]
pub struct StepResponse {
    pub seq: RequestSeq,
    /// New proof on success, the service's detail message on failure
    pub result: Result<Vec<StepRecord>, String>,
}

impl StepResponse {
    pub fn ok(seq: RequestSeq, steps: Vec<StepRecord>) -> Self {
        Self {
            seq,
            result: Ok(steps),
        }
    }

    pub fn error(seq: RequestSeq, message: impl Into<String>) -> Self {
        Self {
            seq,
            result: Err(message.into()),
        }
    }
}

/// Why a response was not admitted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SequenceError {
    /// Older than (or equal to) the last applied response
    Stale {
        seq: RequestSeq,
        last_applied: RequestSeq,
    },
    /// Never issued by this session
    Unissued { seq: RequestSeq },
}

impl fmt::Display for SequenceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SequenceError::Stale { seq, last_applied } => {
                write!(f, "response {} is stale (last applied {})", seq, last_applied)
            }
            SequenceError::Unissued { seq } => write!(f, "response {} was never issued", seq),
        }
    }
}

/// Issues sequence numbers and fences responses
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SequenceGate {
    next: u64,
    last_applied: Option<RequestSeq>,
}

impl SequenceGate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn issue(&mut self) -> RequestSeq {
        let seq = RequestSeq(self.next);
        self.next += 1;
        seq
    }

    pub fn last_applied(&self) -> Option<RequestSeq> {
        self.last_applied
    }

    /// Admit a response for application, recording it as the newest
    pub fn admit(&mut self, seq: RequestSeq) -> Result<(), SequenceError> {
        if seq.0 >= self.next {
            return Err(SequenceError::Unissued { seq });
        }
        if let Some(last_applied) = self.last_applied {
            if seq <= last_applied {
                return Err(SequenceError::Stale { seq, last_applied });
            }
        }
        self.last_applied = Some(seq);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_in_order_responses_are_admitted() {
        let mut gate = SequenceGate::new();
        let a = gate.issue();
        let b = gate.issue();
        assert!(gate.admit(a).is_ok());
        assert!(gate.admit(b).is_ok());
        assert_eq!(gate.last_applied(), Some(b));
    }

    #[test]
    fn test_late_older_response_is_stale() {
        let mut gate = SequenceGate::new();
        let a = gate.issue();
        let b = gate.issue();
        assert!(gate.admit(b).is_ok());
        assert_eq!(
            gate.admit(a),
            Err(SequenceError::Stale {
                seq: a,
                last_applied: b
            })
        );
    }

    #[test]
    fn test_duplicate_response_is_stale() {
        let mut gate = SequenceGate::new();
        let a = gate.issue();
        assert!(gate.admit(a).is_ok());
        assert!(matches!(gate.admit(a), Err(SequenceError::Stale { .. })));
    }

    #[test]
    fn test_unissued_response_is_rejected() {
        let mut gate = SequenceGate::new();
        assert_eq!(
            gate.admit(RequestSeq::new(4)),
            Err(SequenceError::Unissued {
                seq: RequestSeq::new(4)
            })
        );
    }
}
