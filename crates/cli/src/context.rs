//! Builds the alert-identity → context map the dispatcher consumes.
//!
//! Deriving context is the caller's job, not the dispatcher's: the map is
//! built from the same snapshot the candidates came from, keyed the way
//! `CandidateAlert::context_key()` looks entries up.

use std::collections::HashMap;

use herald_core::{AlertKind, NewsItem, Snapshot};
use herald_notify::AlertContext;

/// Context for every alert the snapshot could have produced: one entry
/// per non-news kind plus one per news item.
pub fn context_map_from_snapshot(
    snapshot: &Snapshot,
    symbol: &str,
) -> HashMap<String, AlertContext> {
    let mut contexts = HashMap::new();

    for kind in [AlertKind::MarketShift, AlertKind::WhaleActivity] {
        contexts.insert(
            kind.label().to_string(),
            AlertContext {
                symbol: symbol.to_string(),
                bias: snapshot.market.bias,
                category: None,
            },
        );
    }

    for item in &snapshot.news {
        contexts.insert(
            item.id.clone(),
            AlertContext {
                symbol: symbol.to_string(),
                bias: item.bias,
                category: Some(news_category(item).to_string()),
            },
        );
    }

    contexts
}

/// Coarse editorial category for a news item.
fn news_category(item: &NewsItem) -> &'static str {
    if item.confidence < 40 {
        "rumor"
    } else if item.score >= 9.0 {
        "event"
    } else {
        "narrative"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use herald_core::{Bias, MarketPulse};

    fn snapshot() -> Snapshot {
        Snapshot {
            market: MarketPulse {
                score: 72.0,
                bias: Bias::Bearish,
                confidence: 55,
            },
            news: vec![
                NewsItem {
                    id: "evt-1".to_string(),
                    title: "a".to_string(),
                    score: 9.5,
                    bias: Bias::Bullish,
                    confidence: 85,
                },
                NewsItem {
                    id: "evt-2".to_string(),
                    title: "b".to_string(),
                    score: 8.0,
                    bias: Bias::Neutral,
                    confidence: 20,
                },
            ],
            net_flow: 0.0,
            captured_at: Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap(),
        }
    }

    #[test]
    fn covers_kinds_and_news_items() {
        let contexts = context_map_from_snapshot(&snapshot(), "BTC");
        assert_eq!(contexts.len(), 4);
        assert_eq!(contexts["market_shift"].bias, Bias::Bearish);
        assert_eq!(contexts["whale_activity"].symbol, "BTC");
        assert_eq!(contexts["evt-1"].bias, Bias::Bullish);
    }

    #[test]
    fn news_categories_derived() {
        let contexts = context_map_from_snapshot(&snapshot(), "BTC");
        assert_eq!(contexts["evt-1"].category.as_deref(), Some("event"));
        assert_eq!(contexts["evt-2"].category.as_deref(), Some("rumor"));
    }
}
