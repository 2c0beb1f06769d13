//! Step dispatcher: boundary to the step-application service
//!
//! Sessions hand out sequenced `StepRequest`s; the dispatcher queues them
//! per tab, forwards them to a `StepService` and routes each completion back
//! through the session's sequence fence. A failed call is delivered as an
//! error response, so the session treats transport failures and rule
//! rejections alike.

use crate::error::{SessionResult, StepServiceError};
use crate::registry::SessionStore;
use proof_editor_core::{ProofRecord, ResponseOutcome, StepRecord, StepRequest, StepResponse, TabId};
use std::collections::VecDeque;

/// External step-application service
pub trait StepService {
    /// Compute the proof that results from `request` applied to `record`
    fn apply(
        &mut self,
        theory: &str,
        record: &ProofRecord,
        request: &StepRequest,
    ) -> Result<Vec<StepRecord>, StepServiceError>;
}

/// Queue of outstanding step requests
#[derive(Debug, Default)]
pub struct StepDispatcher {
    queue: VecDeque<(TabId, StepRequest)>,
}

impl StepDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a request issued by a tab's session
    pub fn submit(&mut self, tab: TabId, request: StepRequest) {
        tracing::debug!(%tab, seq = request.seq.as_u64(), "step request queued");
        self.queue.push_back((tab, request));
    }

    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    /// Take the queued requests without running them
    pub fn drain(&mut self) -> Vec<(TabId, StepRequest)> {
        self.queue.drain(..).collect()
    }

    /// Route a completion to its session
    pub fn complete(
        &mut self,
        store: &mut SessionStore,
        tab: TabId,
        response: StepResponse,
    ) -> SessionResult<ResponseOutcome> {
        let session = store.get_mut(tab)?;
        Ok(session.apply_response(response))
    }

    /// Run every queued request through `service` in submission order
    ///
    /// Requests whose tab has since been closed are dropped.
    pub fn run_pending(
        &mut self,
        store: &mut SessionStore,
        service: &mut dyn StepService,
    ) -> SessionResult<Vec<(TabId, ResponseOutcome)>> {
        let mut outcomes = Vec::new();
        while let Some((tab, request)) = self.queue.pop_front() {
            if !store.contains(tab) {
                tracing::debug!(%tab, seq = request.seq.as_u64(), "tab closed; request dropped");
                continue;
            }
            let response = {
                let session = store.get(tab)?;
                match service.apply(session.theory_name(), session.record(), &request) {
                    Ok(steps) => StepResponse::ok(request.seq, steps),
                    Err(err) => {
                        tracing::warn!(%tab, seq = request.seq.as_u64(), %err, "step service failed");
                        StepResponse::error(request.seq, err.to_string())
                    }
                }
            };
            let outcome = self.complete(store, tab, response)?;
            outcomes.push((tab, outcome));
        }
        Ok(outcomes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proof_editor_core::{CoreOutcome, Key, Position, SessionCommand, StepRequestKind, StepRule};

    /// Answers every rule with a fixed proof; fails everything else
    struct FixedService {
        steps: Vec<StepRecord>,
        calls: usize,
    }

    impl StepService for FixedService {
        fn apply(
            &mut self,
            _theory: &str,
            _record: &ProofRecord,
            request: &StepRequest,
        ) -> Result<Vec<StepRecord>, StepServiceError> {
            self.calls += 1;
            match request.kind {
                StepRequestKind::ApplyRule { .. } => Ok(self.steps.clone()),
                _ => Err(StepServiceError::Unavailable("offline".into())),
            }
        }
    }

    fn store_with_goal() -> (SessionStore, TabId) {
        let mut store = SessionStore::default();
        let tab = store.open("logic_base");
        let session = store.get_mut(tab).unwrap();
        session.load_record(ProofRecord::from_steps(vec![StepRecord::new(
            "0",
            "A --> A",
            "sorry",
        )]));
        session.apply(SessionCommand::MouseDown {
            at: Position::new(0, 0),
            time: 0,
        });
        (store, tab)
    }

    fn request(store: &mut SessionStore, tab: TabId, key: Key) -> StepRequest {
        match store.get_mut(tab).unwrap().apply(SessionCommand::Key(key)) {
            CoreOutcome::Request(request) => request,
            other => panic!("expected request, got {:?}", other),
        }
    }

    #[test]
    fn test_run_pending_applies_responses() {
        let (mut store, tab) = store_with_goal();
        let mut dispatcher = StepDispatcher::new();
        dispatcher.submit(tab, request(&mut store, tab, Key::Ctrl('i')));

        let mut service = FixedService {
            steps: vec![StepRecord::new("0", "A --> A", "intro")],
            calls: 0,
        };
        let outcomes = dispatcher.run_pending(&mut store, &mut service).unwrap();

        assert_eq!(outcomes, vec![(tab, ResponseOutcome::Applied)]);
        assert_eq!(dispatcher.pending(), 0);
        assert_eq!(
            store.get(tab).unwrap().buffer().line(0),
            Some("0: A --> A by intro")
        );
    }

    #[test]
    fn test_service_failure_becomes_error_response() {
        let (mut store, tab) = store_with_goal();
        let mut dispatcher = StepDispatcher::new();
        dispatcher.submit(tab, request(&mut store, tab, Key::Enter));

        let mut service = FixedService {
            steps: Vec::new(),
            calls: 0,
        };
        let outcomes = dispatcher.run_pending(&mut store, &mut service).unwrap();
        assert!(matches!(outcomes[0].1, ResponseOutcome::RuleError(_)));
        assert_eq!(
            store.get(tab).unwrap().error_message(),
            Some("step service unavailable: offline")
        );
    }

    #[test]
    fn test_closed_tab_requests_are_dropped() {
        let (mut store, tab) = store_with_goal();
        let mut dispatcher = StepDispatcher::new();
        dispatcher.submit(tab, request(&mut store, tab, Key::Ctrl('b')));
        store.destroy(tab).unwrap();

        let mut service = FixedService {
            steps: Vec::new(),
            calls: 0,
        };
        let outcomes = dispatcher.run_pending(&mut store, &mut service).unwrap();
        assert!(outcomes.is_empty());
        assert_eq!(service.calls, 0);
    }

    #[test]
    fn test_out_of_order_completion_is_fenced() {
        let (mut store, tab) = store_with_goal();
        let mut dispatcher = StepDispatcher::new();
        let a = request(&mut store, tab, Key::Ctrl('b'));
        let b = request(&mut store, tab, Key::Ctrl('f'));
        assert!(matches!(
            a.kind,
            StepRequestKind::ApplyRule {
                rule: StepRule::BackwardStep,
                ..
            }
        ));

        let applied = dispatcher
            .complete(
                &mut store,
                tab,
                StepResponse::ok(b.seq, vec![StepRecord::new("0", "B", "")]),
            )
            .unwrap();
        assert_eq!(applied, ResponseOutcome::Applied);

        let stale = dispatcher
            .complete(&mut store, tab, StepResponse::ok(a.seq, Vec::new()))
            .unwrap();
        assert!(matches!(stale, ResponseOutcome::Stale(_)));
        assert_eq!(store.get(tab).unwrap().buffer().line(0), Some("0: B"));
    }
}
