//! Dispatch state — delivery history, owned by the dispatcher.
//!
//! Independent from the evaluation state: the `delivered_news` set gates
//! actual delivery, not candidate generation. A candidate blocked at
//! delivery (say, missing context) stays deliverable on a later cycle.

use std::collections::{HashMap, HashSet};

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use herald_core::{AlertKind, CandidateAlert};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DispatchState {
    /// Last successful delivery per alert kind.
    pub last_sent_by_kind: HashMap<AlertKind, DateTime<Utc>>,
    /// Last successful delivery of any kind.
    pub last_sent_any: Option<DateTime<Utc>>,
    /// News identifiers ever delivered; grows for the process lifetime.
    pub delivered_news: HashSet<String>,
}

impl DispatchState {
    /// Whether `kind` may send at `now`. Both the global and the per-kind
    /// stamp must be outside the cooldown window.
    pub fn allows(&self, kind: AlertKind, now: DateTime<Utc>, cooldown: Duration) -> bool {
        let global_clear = self
            .last_sent_any
            .is_none_or(|last| now.signed_duration_since(last) >= cooldown);
        let kind_clear = self
            .last_sent_by_kind
            .get(&kind)
            .is_none_or(|last| now.signed_duration_since(*last) >= cooldown);
        global_clear && kind_clear
    }

    /// Record a successful delivery of `alert` at `at`.
    pub fn record_send(&mut self, alert: &CandidateAlert, at: DateTime<Utc>) {
        self.last_sent_by_kind.insert(alert.kind, at);
        self.last_sent_any = Some(at);
        if let Some(id) = &alert.item_id {
            self.delivered_news.insert(id.clone());
        }
    }
}
