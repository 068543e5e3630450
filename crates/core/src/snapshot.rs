//! Snapshot model — one cycle's input record of derived metrics.
//!
//! A snapshot is produced upstream (ingestion, clustering, scoring) and
//! handed to the alert engine as an opaque, already-computed input. Its
//! `captured_at` timestamp is the authoritative clock for all temporal
//! logic; nothing downstream samples the wall clock.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Qualitative bias label attached to market and news metrics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Bias {
    Bullish,
    Bearish,
    Neutral,
}

impl std::fmt::Display for Bias {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Bias::Bullish => write!(f, "bullish"),
            Bias::Bearish => write!(f, "bearish"),
            Bias::Neutral => write!(f, "neutral"),
        }
    }
}

/// Aggregate market sentiment reading.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarketPulse {
    /// Composite score, conventionally 0–100 but not bounded upstream.
    pub score: f64,
    pub bias: Bias,
    /// Confidence percentage (0–100).
    pub confidence: u8,
}

/// A scored news item from the reliability pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewsItem {
    /// Stable unique identifier.
    pub id: String,
    pub title: String,
    /// Impact score on a 0–10 scale.
    pub score: f64,
    pub bias: Bias,
    /// Confidence percentage (0–100).
    pub confidence: u8,
}

/// One cycle's derived metrics, immutable per cycle.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Snapshot {
    pub market: MarketPulse,
    /// Ordered news list; order is upstream's, evaluators re-sort.
    #[serde(default)]
    pub news: Vec<NewsItem>,
    /// Signed whale net flow for the cycle.
    pub net_flow: f64,
    /// Cycle timestamp, monotonically non-decreasing across calls.
    pub captured_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn snapshot_round_trips_json() {
        let json = r#"{
            "market": { "score": 72.5, "bias": "bullish", "confidence": 64 },
            "news": [
                { "id": "evt-001", "title": "ETF inflows accelerate", "score": 8.2, "bias": "bullish", "confidence": 80 }
            ],
            "net_flow": -12500.0,
            "captured_at": "2026-03-01T12:00:00Z"
        }"#;

        let snapshot: Snapshot = serde_json::from_str(json).unwrap();
        assert_eq!(snapshot.market.bias, Bias::Bullish);
        assert_eq!(snapshot.news.len(), 1);
        assert_eq!(snapshot.news[0].id, "evt-001");

        let back = serde_json::to_string(&snapshot).unwrap();
        let again: Snapshot = serde_json::from_str(&back).unwrap();
        assert_eq!(again.net_flow, -12500.0);
    }

    #[test]
    fn news_defaults_to_empty() {
        let json = r#"{
            "market": { "score": 50.0, "bias": "neutral", "confidence": 30 },
            "net_flow": 0.0,
            "captured_at": "2026-03-01T12:00:00Z"
        }"#;
        let snapshot: Snapshot = serde_json::from_str(json).unwrap();
        assert!(snapshot.news.is_empty());
    }

    #[test]
    fn parse_shipped_example_snapshot() {
        let raw = include_str!("../../../data/snapshot.json");
        let snapshot: Snapshot = serde_json::from_str(raw).unwrap();
        assert_eq!(snapshot.news.len(), 2);
        assert!(snapshot.net_flow < 0.0);
    }

    #[test]
    fn bias_display_labels() {
        assert_eq!(Bias::Bullish.to_string(), "bullish");
        assert_eq!(Bias::Bearish.to_string(), "bearish");
        assert_eq!(Bias::Neutral.to_string(), "neutral");
    }
}
