//! Evaluation state — owned by the alert engine, mutated once per cycle.

use std::collections::{HashMap, HashSet};

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use herald_core::AlertKind;

/// Which side of the market-score threshold the last cycle sat on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Band {
    Above,
    Below,
}

impl std::fmt::Display for Band {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Band::Above => write!(f, "above"),
            Band::Below => write!(f, "below"),
        }
    }
}

/// What was last observed and last alerted.
///
/// Band and last-flow are updated every cycle whether or not anything
/// fires; `last_fired` stamps move only on an actual fire. The
/// `candidated_news` set is permanent for the process lifetime and only
/// grows; it gates candidate generation, not delivery (the dispatcher
/// keeps its own delivered set).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EvalState {
    /// None until the first cycle has been observed.
    pub market_band: Option<Band>,
    /// None until the first cycle has been observed.
    pub last_net_flow: Option<f64>,
    /// News identifiers that have ever been considered for a candidate.
    pub candidated_news: HashSet<String>,
    /// Last time each alert kind actually fired.
    pub last_fired: HashMap<AlertKind, DateTime<Utc>>,
}

impl EvalState {
    /// Whether `kind` fired within `cooldown` of `now`.
    pub fn in_cooldown(&self, kind: AlertKind, now: DateTime<Utc>, cooldown: Duration) -> bool {
        self.last_fired
            .get(&kind)
            .is_some_and(|last| now.signed_duration_since(*last) < cooldown)
    }

    /// Stamp `kind` as having fired at `at`.
    pub fn record_fire(&mut self, kind: AlertKind, at: DateTime<Utc>) {
        self.last_fired.insert(kind, at);
    }
}
