//! Candidate alert model — produced by rule evaluators, consumed by the
//! dispatcher within the same cycle, never persisted.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The three fixed alert kinds this engine can produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertKind {
    MarketShift,
    WhaleActivity,
    HighImpactNews,
}

impl AlertKind {
    /// All kinds in dispatch priority order (market first, news last).
    pub fn all() -> &'static [AlertKind] {
        &[
            Self::MarketShift,
            Self::WhaleActivity,
            Self::HighImpactNews,
        ]
    }

    /// Stable lowercase label, used for logging and context lookup.
    pub fn label(&self) -> &'static str {
        match self {
            Self::MarketShift => "market_shift",
            Self::WhaleActivity => "whale_activity",
            Self::HighImpactNews => "high_impact_news",
        }
    }
}

impl std::fmt::Display for AlertKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Severity label attached to a candidate alert.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Info,
    Notable,
    Critical,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Severity::Info => write!(f, "INFO"),
            Severity::Notable => write!(f, "NOTABLE"),
            Severity::Critical => write!(f, "CRITICAL"),
        }
    }
}

/// A potential notification produced by a rule evaluator.
///
/// Transient: created and consumed within one cycle. The body is at most
/// two lines; the dispatcher appends nothing but the caveat line.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CandidateAlert {
    pub kind: AlertKind,
    pub severity: Severity,
    pub title: String,
    pub body: String,
    /// Numeric score behind the alert, when one exists (market score,
    /// news impact score, whale delta).
    pub score: Option<f64>,
    /// News item identifier for `HighImpactNews` alerts; drives
    /// delivery-level dedup.
    pub item_id: Option<String>,
    /// Cycle timestamp the alert was created at.
    pub created_at: DateTime<Utc>,
}

impl CandidateAlert {
    /// Key under which the caller registers this alert's context:
    /// the news item id for news alerts, the kind label otherwise.
    pub fn context_key(&self) -> &str {
        self.item_id.as_deref().unwrap_or_else(|| self.kind.label())
    }
}
