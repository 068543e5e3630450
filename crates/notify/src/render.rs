//! Message rendering — fixed per-kind templates with deterministic caveats.
//!
//! Every message ends with a short "why this might not matter" line picked
//! from a per-kind pool. Selection hashes the alert's canonical score text,
//! so the same alert score always yields the same caveat: repeated
//! evaluation of one alert renders byte-identical messages.

use sha2::{Digest, Sha256};

use herald_core::{AlertKind, CandidateAlert};

use crate::context::AlertContext;

const MARKET_CAVEATS: &[&str] = &[
    "Sentiment flips at the threshold often retrace within a few cycles.",
    "Composite scores lag fast-moving markets; treat the level as context.",
    "A single crossing says little about durability; watch for follow-through.",
];

const WHALE_CAVEATS: &[&str] = &[
    "Large transfers are often exchange-internal reshuffling, not positioning.",
    "Net-flow spikes can be custody migrations with no market intent.",
    "One cycle's flow delta rarely marks a trend on its own.",
];

const NEWS_CAVEATS: &[&str] = &[
    "High-impact headlines are frequently priced in before they circulate.",
    "Early reports on this story may still be corrected or contradicted.",
    "Impact scores reflect reach, not accuracy; confirmation may lag.",
];

/// Render the full channel message for an alert.
///
/// Layout: a headline with severity tag and symbol, the alert body
/// (at most two lines), and the caveat line.
pub fn render_message(alert: &CandidateAlert, ctx: &AlertContext) -> String {
    let mut message = format!(
        "[{}] {} — {}\n{}",
        alert.severity, ctx.symbol, alert.title, alert.body
    );
    if let Some(category) = &ctx.category {
        message.push_str(&format!("\nCategory: {category}"));
    }
    message.push_str(&format!("\nNote: {}", caveat_for(alert)));
    message
}

/// Pick the caveat line for an alert, deterministically by score.
pub fn caveat_for(alert: &CandidateAlert) -> &'static str {
    let pool = match alert.kind {
        AlertKind::MarketShift => MARKET_CAVEATS,
        AlertKind::WhaleActivity => WHALE_CAVEATS,
        AlertKind::HighImpactNews => NEWS_CAVEATS,
    };
    pool[caveat_index(alert.score, pool.len())]
}

/// Hash the canonical score text into a pool index. The score is
/// formatted to fixed precision first so equal scores hash equally
/// across processes.
fn caveat_index(score: Option<f64>, pool_len: usize) -> usize {
    let canonical = format!("{:.4}", score.unwrap_or(0.0));
    let digest = Sha256::digest(canonical.as_bytes());
    (digest[0] as usize) % pool_len
}
