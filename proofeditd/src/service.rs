//! # Offline Step Service
//!
//! Stands in for the proof backend when the host runs without one. It keeps
//! the record in sync with what the user typed but computes no inferences:
//! rule applications are refused.

use proof_editor_core::{ProofRecord, StepRecord, StepRequest, StepRequestKind};
use services_proof_session::{StepService, StepServiceError};

/// Step service that only records edits
#[derive(Debug, Clone)]
pub struct LocalStepService {
    obligation_marker: String,
    calls: usize,
}

impl LocalStepService {
    pub fn new(obligation_marker: impl Into<String>) -> Self {
        Self {
            obligation_marker: obligation_marker.into(),
            calls: 0,
        }
    }

    /// Number of requests served so far
    pub fn calls(&self) -> usize {
        self.calls
    }
}

impl StepService for LocalStepService {
    fn apply(
        &mut self,
        theory: &str,
        record: &ProofRecord,
        request: &StepRequest,
    ) -> Result<Vec<StepRecord>, StepServiceError> {
        self.calls += 1;
        tracing::debug!(theory, seq = request.seq.as_u64(), "local step request");

        let mut steps = record.steps().to_vec();
        match &request.kind {
            StepRequestKind::InitEmptyProof { prop, .. } => {
                return Ok(vec![StepRecord::new(
                    "0",
                    prop.clone(),
                    self.obligation_marker.clone(),
                )]);
            }
            StepRequestKind::AddLineAfter { line } => {
                let at = (*line + 1).min(steps.len());
                steps.insert(at, StepRecord::default());
            }
            StepRequestKind::SetLine { line, text } => {
                let slot = steps.get_mut(*line).ok_or_else(|| {
                    StepServiceError::Rejected(format!("no step at line {}", line))
                })?;
                *slot = parse_step(text)?;
            }
            StepRequestKind::ApplyRule { rule, .. } => {
                return Err(StepServiceError::Unavailable(format!(
                    "{} needs a proof backend",
                    rule.as_str()
                )));
            }
        }
        renumber(&mut steps);
        Ok(steps)
    }
}

/// Parse `[<id>: ]<th>[ by <rule>[ <args>][ from <prevs>]]`
///
/// The id is dropped; steps are numbered by position.
pub fn parse_step(text: &str) -> Result<StepRecord, StepServiceError> {
    let text = text.trim_start();
    let body = match text.split_once(": ") {
        Some((id, rest)) if !id.is_empty() && !id.contains(char::is_whitespace) => rest,
        _ => text,
    };

    let (th, justification) = match body.split_once(" by ") {
        Some((th, rest)) => (th.trim(), Some(rest.trim())),
        None => (body.trim(), None),
    };
    if th.is_empty() {
        return Err(StepServiceError::Rejected(format!(
            "missing statement in '{}'",
            text
        )));
    }

    let mut step = StepRecord::new("", th, "");
    if let Some(justification) = justification {
        let (rule_args, prevs) = match justification.split_once(" from ") {
            Some((rule_args, prevs)) => (rule_args, Some(prevs)),
            None => (justification, None),
        };
        let (rule, args) = match rule_args.split_once(' ') {
            Some((rule, args)) => (rule, args.trim()),
            None => (rule_args, ""),
        };
        if rule.is_empty() {
            return Err(StepServiceError::Rejected(format!("missing rule in '{}'", text)));
        }
        step.rule = rule.to_string();
        step.args = args.to_string();
        if let Some(prevs) = prevs {
            step.prevs = prevs
                .split(',')
                .map(str::trim)
                .filter(|p| !p.is_empty())
                .map(String::from)
                .collect();
        }
    }
    Ok(step)
}

fn renumber(steps: &mut [StepRecord]) {
    for (index, step) in steps.iter_mut().enumerate() {
        step.id = index.to_string();
    }
}
