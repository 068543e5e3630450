//! The three rule evaluators.
//!
//! Each is a deterministic function of (snapshot, config, state) returning
//! at most one candidate alert plus the next state. "Now" is always the
//! snapshot's `captured_at`; malformed numeric fields are clamped or
//! defaulted, never rejected.

use herald_core::config::AlertsConfig;
use herald_core::{AlertKind, CandidateAlert, NewsItem, Severity, Snapshot};

use crate::state::{Band, EvalState};

/// Confidence at or above which a market shift is flagged critical.
const MARKET_CRITICAL_CONFIDENCE: u8 = 80;
/// Clamped news score at or above which a news alert is flagged critical.
const NEWS_CRITICAL_SCORE: f64 = 9.0;

// ── Market-state evaluator ──────────────────────────────────────────

/// Edge-triggered band crossing on the market score.
///
/// The first observed cycle records the band without alerting, so process
/// startup never fires. Afterwards an alert is produced only when the band
/// differs from the previous cycle's and the kind is outside its cooldown.
/// The band is updated every cycle either way.
pub fn evaluate_market(
    snapshot: &Snapshot,
    config: &AlertsConfig,
    mut state: EvalState,
) -> (Option<CandidateAlert>, EvalState) {
    let now = snapshot.captured_at;
    let score = if snapshot.market.score.is_finite() {
        snapshot.market.score
    } else {
        0.0
    };

    let band = if score >= config.market_score_threshold {
        Band::Above
    } else {
        Band::Below
    };

    let previous = state.market_band.replace(band);

    let Some(previous) = previous else {
        tracing::debug!(band = %band, score, "first market observation, band recorded");
        return (None, state);
    };

    if previous == band {
        return (None, state);
    }

    if state.in_cooldown(AlertKind::MarketShift, now, config.cooldown()) {
        tracing::debug!(band = %band, "market band changed but kind is in cooldown");
        return (None, state);
    }

    state.record_fire(AlertKind::MarketShift, now);

    let severity = if snapshot.market.confidence >= MARKET_CRITICAL_CONFIDENCE {
        Severity::Critical
    } else {
        Severity::Notable
    };

    let alert = CandidateAlert {
        kind: AlertKind::MarketShift,
        severity,
        title: format!(
            "Market score crossed {} {:.0}",
            band, config.market_score_threshold
        ),
        body: format!(
            "Score is now {:.1} with a {} bias ({}% confidence).",
            score, snapshot.market.bias, snapshot.market.confidence
        ),
        score: Some(score),
        item_id: None,
        created_at: now,
    };
    tracing::info!(band = %band, score, "market shift alert");
    (Some(alert), state)
}

// ── High-impact-news evaluator ──────────────────────────────────────

/// Clamp a news score into the 0–10 scale; non-finite values become 0.
fn clamp_news_score(score: f64) -> f64 {
    if score.is_finite() {
        score.clamp(0.0, 10.0)
    } else {
        0.0
    }
}

/// At most one news alert per cycle, with strict fatigue.
///
/// Qualifying items are ordered by descending clamped score, ties broken
/// by ascending identifier. The first item not already in the permanent
/// candidated set is marked candidated immediately, even when the kind's
/// cooldown then blocks the alert. An item whose only chance coincided
/// with cooldown is never reconsidered.
pub fn evaluate_news(
    snapshot: &Snapshot,
    config: &AlertsConfig,
    mut state: EvalState,
) -> (Option<CandidateAlert>, EvalState) {
    let now = snapshot.captured_at;

    let mut qualifying: Vec<(&NewsItem, f64)> = snapshot
        .news
        .iter()
        .map(|item| (item, clamp_news_score(item.score)))
        .filter(|(_, score)| *score >= config.news_score_threshold)
        .collect();
    qualifying.sort_by(|(a, sa), (b, sb)| sb.total_cmp(sa).then_with(|| a.id.cmp(&b.id)));

    for (item, score) in qualifying {
        if state.candidated_news.contains(&item.id) {
            continue;
        }
        state.candidated_news.insert(item.id.clone());

        if state.in_cooldown(AlertKind::HighImpactNews, now, config.cooldown()) {
            tracing::debug!(id = %item.id, "news item eligible but kind is in cooldown");
            return (None, state);
        }

        state.record_fire(AlertKind::HighImpactNews, now);

        let severity = if score >= NEWS_CRITICAL_SCORE {
            Severity::Critical
        } else {
            Severity::Notable
        };

        let alert = CandidateAlert {
            kind: AlertKind::HighImpactNews,
            severity,
            title: format!("High-impact news ({score:.1}/10)"),
            body: format!(
                "{}\n{} bias, {}% confidence.",
                item.title, capitalize(&item.bias.to_string()), item.confidence
            ),
            score: Some(score),
            item_id: Some(item.id.clone()),
            created_at: now,
        };
        tracing::info!(id = %item.id, score, "high-impact news alert");
        return (Some(alert), state);
    }

    (None, state)
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}

// ── Whale-activity evaluator ────────────────────────────────────────

/// Fires when the net-flow delta since the previous cycle meets the
/// configured threshold. The first observation only records the value;
/// the value is recorded every cycle regardless of firing.
pub fn evaluate_whale(
    snapshot: &Snapshot,
    config: &AlertsConfig,
    mut state: EvalState,
) -> (Option<CandidateAlert>, EvalState) {
    let now = snapshot.captured_at;
    let flow = if snapshot.net_flow.is_finite() {
        snapshot.net_flow
    } else {
        // Treat a malformed reading as unchanged.
        state.last_net_flow.unwrap_or(0.0)
    };

    let previous = state.last_net_flow.replace(flow);

    let Some(previous) = previous else {
        tracing::debug!(flow, "first whale observation, flow recorded");
        return (None, state);
    };

    let delta = flow - previous;
    if delta.abs() < config.whale_delta_threshold {
        return (None, state);
    }

    if state.in_cooldown(AlertKind::WhaleActivity, now, config.cooldown()) {
        tracing::debug!(delta, "whale delta over threshold but kind is in cooldown");
        return (None, state);
    }

    state.record_fire(AlertKind::WhaleActivity, now);

    let severity = if delta.abs() >= config.whale_delta_threshold * 2.0 {
        Severity::Critical
    } else {
        Severity::Notable
    };

    let alert = CandidateAlert {
        kind: AlertKind::WhaleActivity,
        severity,
        title: format!("Whale net flow moved {delta:+.0}"),
        body: format!("Net flow is now {flow:.0}, was {previous:.0} last cycle."),
        score: Some(delta.abs()),
        item_id: None,
        created_at: now,
    };
    tracing::info!(delta, flow, "whale activity alert");
    (Some(alert), state)
}

// ── Tests ───────────────────────────────────────────────────────────
