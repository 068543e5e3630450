//! Alert engine — folds the rule evaluators over one snapshot per cycle.

use herald_core::config::AlertsConfig;
use herald_core::{CandidateAlert, MemoryStore, Snapshot, StateStore};

use crate::evaluators::{evaluate_market, evaluate_news, evaluate_whale};
use crate::state::EvalState;

/// Runs the three rule evaluators in a fixed order (market, then whale,
/// then news), threading the evaluation state through them and persisting
/// the final state back into the owned store.
///
/// Evaluation cannot fail: malformed snapshot fields are clamped or
/// treated as absent by the evaluators, never rejected.
pub struct AlertEngine<S: StateStore<EvalState> = MemoryStore<EvalState>> {
    config: AlertsConfig,
    store: S,
}

impl AlertEngine<MemoryStore<EvalState>> {
    /// Engine with the reference in-memory state store.
    pub fn in_memory(config: AlertsConfig) -> Self {
        Self::new(config, MemoryStore::new())
    }
}

impl<S: StateStore<EvalState>> AlertEngine<S> {
    pub fn new(config: AlertsConfig, store: S) -> Self {
        Self { config, store }
    }

    /// Evaluate one cycle, returning 0–3 candidate alerts.
    ///
    /// The evaluator order matters only for cooldown bookkeeping
    /// consistency; the evaluators never read each other's candidates.
    pub fn evaluate(&mut self, snapshot: &Snapshot) -> Vec<CandidateAlert> {
        let state = self.store.load();

        let (market, state) = evaluate_market(snapshot, &self.config, state);
        let (whale, state) = evaluate_whale(snapshot, &self.config, state);
        let (news, state) = evaluate_news(snapshot, &self.config, state);

        self.store.save(state);

        let alerts: Vec<CandidateAlert> =
            [market, whale, news].into_iter().flatten().collect();

        tracing::debug!(
            candidates = alerts.len(),
            at = %snapshot.captured_at,
            "cycle evaluated"
        );
        alerts
    }

    /// Read-only view of the current evaluation state.
    pub fn state(&self) -> EvalState {
        self.store.load()
    }
}
