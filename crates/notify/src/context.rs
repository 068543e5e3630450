//! Per-alert context supplied by the caller.

use serde::{Deserialize, Serialize};

use herald_core::Bias;

/// The small record the dispatcher needs to format a message.
///
/// Built by the caller from the same snapshot the alerts came from;
/// deriving it is not the dispatcher's responsibility. Keyed by
/// `CandidateAlert::context_key()` in the lookup map.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlertContext {
    /// Asset symbol the snapshot describes (e.g. "BTC").
    pub symbol: String,
    pub bias: Bias,
    /// News category when known (e.g. "narrative", "event", "rumor").
    pub category: Option<String>,
}
