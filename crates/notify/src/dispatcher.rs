//! Applies delivery throttling and dedup, then hands at most one
//! formatted message per cycle to the channel.
//!
//! Rejections (cooldown, dedup, missing context) are normal outcomes,
//! reported with a reason and logged at debug, never as faults. Only a
//! successful send consumes the one-message budget and mutates state;
//! a failed send leaves the dispatch state untouched so the candidate
//! stays retryable on a later cycle.

use std::collections::HashMap;

use chrono::Duration;

use herald_core::{AlertKind, CandidateAlert, MemoryStore, StateStore};

use crate::context::AlertContext;
use crate::render::render_message;
use crate::state::DispatchState;
use crate::traits::{Channel, DispatchOutcome, SkipReason};

/// Fixed dispatch priority; independent of any score.
fn priority(kind: AlertKind) -> u8 {
    match kind {
        AlertKind::MarketShift => 0,
        AlertKind::WhaleActivity => 1,
        AlertKind::HighImpactNews => 2,
    }
}

/// Consumes one cycle's candidate alerts and delivers at most one message.
pub struct Dispatcher<S: StateStore<DispatchState> = MemoryStore<DispatchState>> {
    channel: Box<dyn Channel>,
    store: S,
    cooldown: Duration,
}

impl Dispatcher<MemoryStore<DispatchState>> {
    /// Dispatcher with the reference in-memory state store.
    pub fn in_memory(channel: Box<dyn Channel>, cooldown: Duration) -> Self {
        Self::new(channel, MemoryStore::new(), cooldown)
    }
}

impl<S: StateStore<DispatchState>> Dispatcher<S> {
    pub fn new(channel: Box<dyn Channel>, store: S, cooldown: Duration) -> Self {
        Self {
            channel,
            store,
            cooldown,
        }
    }

    /// Dispatch one cycle's candidates.
    ///
    /// Returns one outcome per attempted candidate. After a successful
    /// send the remaining candidates are not attempted: one message per
    /// invocation, across all kinds. The cycle timestamp carried by each
    /// alert is the clock for cooldown checks; the dispatcher never reads
    /// wall-clock time.
    pub async fn dispatch(
        &mut self,
        candidates: &[CandidateAlert],
        contexts: &HashMap<String, AlertContext>,
    ) -> Vec<DispatchOutcome> {
        let mut state = self.store.load();
        let mut outcomes = Vec::new();

        let mut ordered: Vec<&CandidateAlert> = candidates.iter().collect();
        ordered.sort_by_key(|a| priority(a.kind));

        for alert in ordered {
            let now = alert.created_at;

            let Some(ctx) = contexts.get(alert.context_key()) else {
                tracing::debug!(kind = %alert.kind, "no context for candidate, skipping");
                outcomes.push(DispatchOutcome::skipped(alert.kind, SkipReason::MissingContext));
                continue;
            };

            if !state.allows(alert.kind, now, self.cooldown) {
                tracing::debug!(kind = %alert.kind, "channel cooldown active, skipping");
                outcomes.push(DispatchOutcome::skipped(alert.kind, SkipReason::ChannelCooldown));
                continue;
            }

            if let Some(id) = &alert.item_id {
                if state.delivered_news.contains(id) {
                    tracing::debug!(id = %id, "news item already delivered, skipping");
                    outcomes.push(DispatchOutcome::skipped(
                        alert.kind,
                        SkipReason::AlreadyDelivered,
                    ));
                    continue;
                }
            }

            let text = render_message(alert, ctx);

            match self.channel.send(&text).await {
                Ok(delivery) => {
                    state.record_send(alert, now);
                    self.store.save(state);
                    tracing::info!(
                        kind = %alert.kind,
                        channel = self.channel.name(),
                        message_id = ?delivery.message_id,
                        "alert delivered"
                    );
                    outcomes.push(DispatchOutcome::sent(alert.kind, delivery.message_id));
                    // One message per cycle, across the whole system.
                    return outcomes;
                }
                Err(e) => {
                    tracing::warn!(
                        kind = %alert.kind,
                        channel = self.channel.name(),
                        error = %e,
                        "alert delivery failed"
                    );
                    outcomes.push(DispatchOutcome::skipped(
                        alert.kind,
                        SkipReason::SendFailed(e.to_string()),
                    ));
                }
            }
        }

        outcomes
    }

    /// Read-only view of the current dispatch state.
    pub fn state(&self) -> DispatchState {
        self.store.load()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use chrono::{DateTime, TimeZone, Utc};
    use herald_core::{Bias, Severity};

    use crate::traits::{Delivery, NotifyError};

    struct MockChannel {
        send_count: Arc<AtomicUsize>,
        should_fail: bool,
    }

    #[async_trait::async_trait]
    impl Channel for MockChannel {
        async fn send(&self, _text: &str) -> Result<Delivery, NotifyError> {
            self.send_count.fetch_add(1, Ordering::SeqCst);
            if self.should_fail {
                Err(NotifyError::Api("mock failure".to_string()))
            } else {
                Ok(Delivery {
                    message_id: Some("42".to_string()),
                })
            }
        }
        fn name(&self) -> &str {
            "mock"
        }
    }

    fn mock(should_fail: bool) -> (Box<dyn Channel>, Arc<AtomicUsize>) {
        let count = Arc::new(AtomicUsize::new(0));
        (
            Box::new(MockChannel {
                send_count: count.clone(),
                should_fail,
            }),
            count,
        )
    }

    fn t(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(1_770_000_000 + secs, 0).unwrap()
    }

    fn alert(kind: AlertKind, item_id: Option<&str>, at: DateTime<Utc>) -> CandidateAlert {
        CandidateAlert {
            kind,
            severity: Severity::Notable,
            title: format!("{kind} fired"),
            body: "details".to_string(),
            score: Some(1.0),
            item_id: item_id.map(str::to_string),
            created_at: at,
        }
    }

    fn contexts_for(alerts: &[CandidateAlert]) -> HashMap<String, AlertContext> {
        alerts
            .iter()
            .map(|a| {
                (
                    a.context_key().to_string(),
                    AlertContext {
                        symbol: "BTC".to_string(),
                        bias: Bias::Neutral,
                        category: None,
                    },
                )
            })
            .collect()
    }

    fn cooldown() -> Duration {
        Duration::seconds(3600)
    }

    #[tokio::test]
    async fn single_dispatch_per_cycle() {
        let (channel, count) = mock(false);
        let mut dispatcher = Dispatcher::in_memory(channel, cooldown());

        let candidates = vec![
            alert(AlertKind::HighImpactNews, Some("n1"), t(0)),
            alert(AlertKind::MarketShift, None, t(0)),
            alert(AlertKind::WhaleActivity, None, t(0)),
        ];
        let outcomes = dispatcher.dispatch(&candidates, &contexts_for(&candidates)).await;

        // Market wins on priority; the others are never attempted.
        assert_eq!(count.load(Ordering::SeqCst), 1);
        assert_eq!(outcomes.len(), 1);
        assert!(outcomes[0].dispatched);
        assert_eq!(outcomes[0].kind, AlertKind::MarketShift);
        assert_eq!(outcomes[0].message_id.as_deref(), Some("42"));
    }

    #[tokio::test]
    async fn missing_context_falls_through_to_next_candidate() {
        let (channel, count) = mock(false);
        let mut dispatcher = Dispatcher::in_memory(channel, cooldown());

        let candidates = vec![
            alert(AlertKind::MarketShift, None, t(0)),
            alert(AlertKind::WhaleActivity, None, t(0)),
        ];
        // Context only for the whale alert.
        let mut contexts = contexts_for(&candidates);
        contexts.remove("market_shift");

        let outcomes = dispatcher.dispatch(&candidates, &contexts).await;
        assert_eq!(outcomes.len(), 2);
        assert_eq!(outcomes[0].reason, Some(SkipReason::MissingContext));
        assert!(outcomes[1].dispatched);
        assert_eq!(outcomes[1].kind, AlertKind::WhaleActivity);
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn send_failure_leaves_state_untouched_and_retryable() {
        let (channel, _) = mock(true);
        let mut dispatcher = Dispatcher::in_memory(channel, cooldown());

        let candidates = vec![alert(AlertKind::HighImpactNews, Some("n1"), t(0))];
        let outcomes = dispatcher.dispatch(&candidates, &contexts_for(&candidates)).await;

        assert!(!outcomes[0].dispatched);
        assert!(matches!(
            outcomes[0].reason,
            Some(SkipReason::SendFailed(_))
        ));

        let state = dispatcher.state();
        assert!(state.last_sent_any.is_none());
        assert!(state.last_sent_by_kind.is_empty());
        assert!(state.delivered_news.is_empty());
    }

    #[tokio::test]
    async fn failed_send_is_retryable_next_cycle() {
        let (channel, _) = mock(true);
        let mut dispatcher = Dispatcher::in_memory(channel, cooldown());
        let candidates = vec![alert(AlertKind::HighImpactNews, Some("n1"), t(0))];
        dispatcher.dispatch(&candidates, &contexts_for(&candidates)).await;

        // Swap in a working channel, same state store semantics: a fresh
        // dispatcher seeded with the untouched state still delivers.
        let (channel, count) = mock(false);
        let mut dispatcher = Dispatcher::new(
            channel,
            MemoryStore::with_state(dispatcher.state()),
            cooldown(),
        );
        let retry = vec![alert(AlertKind::HighImpactNews, Some("n1"), t(300))];
        let outcomes = dispatcher.dispatch(&retry, &contexts_for(&retry)).await;
        assert!(outcomes[0].dispatched);
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn channel_cooldown_blocks_across_kinds() {
        let (channel, count) = mock(false);
        let mut dispatcher = Dispatcher::in_memory(channel, cooldown());

        let first = vec![alert(AlertKind::MarketShift, None, t(0))];
        dispatcher.dispatch(&first, &contexts_for(&first)).await;

        // A different kind within the window: global cooldown holds it.
        let second = vec![alert(AlertKind::WhaleActivity, None, t(600))];
        let outcomes = dispatcher.dispatch(&second, &contexts_for(&second)).await;
        assert_eq!(outcomes[0].reason, Some(SkipReason::ChannelCooldown));
        assert_eq!(count.load(Ordering::SeqCst), 1);

        // Past the window it goes through.
        let third = vec![alert(AlertKind::WhaleActivity, None, t(3700))];
        let outcomes = dispatcher.dispatch(&third, &contexts_for(&third)).await;
        assert!(outcomes[0].dispatched);
    }

    #[tokio::test]
    async fn delivered_news_never_resent() {
        let (channel, count) = mock(false);
        let mut dispatcher = Dispatcher::in_memory(channel, cooldown());

        let first = vec![alert(AlertKind::HighImpactNews, Some("n1"), t(0))];
        dispatcher.dispatch(&first, &contexts_for(&first)).await;
        assert!(dispatcher.state().delivered_news.contains("n1"));

        // Same item past the cooldown window: delivery-level dedup holds.
        let again = vec![alert(AlertKind::HighImpactNews, Some("n1"), t(7200))];
        let outcomes = dispatcher.dispatch(&again, &contexts_for(&again)).await;
        assert_eq!(outcomes[0].reason, Some(SkipReason::AlreadyDelivered));
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn empty_candidate_list_is_a_noop() {
        let (channel, count) = mock(false);
        let mut dispatcher = Dispatcher::in_memory(channel, cooldown());
        let outcomes = dispatcher.dispatch(&[], &HashMap::new()).await;
        assert!(outcomes.is_empty());
        assert_eq!(count.load(Ordering::SeqCst), 0);
    }
}
