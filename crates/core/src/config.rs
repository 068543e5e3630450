//! TOML configuration for the alert engine, dispatcher and worker.
//!
//! The `[alerts]` section carries the four required tuning values; there
//! are no engine-side defaults, a missing field fails the load. Channel
//! secrets may reference environment variables as `${VAR}`; resolution
//! happens where the channel is constructed, not at parse time.

use std::collections::HashMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::HeraldError;

/// Load .env file (silently ignores if missing).
pub fn load_dotenv() {
    dotenvy::dotenv().ok();
}

/// Resolve a `${VAR}` environment reference, passing literals through.
///
/// Returns [`HeraldError::Config`] when the reference is malformed or the
/// variable is unset.
pub fn resolve_env_ref(value: &str) -> Result<String, HeraldError> {
    if !value.starts_with("${") {
        return Ok(value.to_string());
    }
    let var_name = value
        .strip_prefix("${")
        .and_then(|s| s.strip_suffix('}'))
        .ok_or_else(|| {
            HeraldError::Config(format!("Malformed env var reference: {value}"))
        })?;
    std::env::var(var_name).map_err(|_| {
        HeraldError::Config(format!("Environment variable '{var_name}' is not set"))
    })
}

// ── Top-level config ──────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct HeraldConfig {
    pub alerts: AlertsConfig,
    pub channel: ChannelConfig,
    #[serde(default)]
    pub worker: WorkerConfig,
}

impl HeraldConfig {
    /// Load and validate a config file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, HeraldError> {
        let raw = std::fs::read_to_string(path.as_ref())?;
        let config: Self = toml::from_str(&raw)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), HeraldError> {
        self.alerts.validate()?;
        if self.worker.interval_secs == 0 {
            return Err(HeraldError::Config(
                "worker.interval_secs must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// Print a redacted summary for startup logs.
    pub fn log_summary(&self) {
        tracing::info!("Config loaded:");
        tracing::info!(
            "  alerts:  market>={}, news>={}, whale_delta>={}, cooldown={}s",
            self.alerts.market_score_threshold,
            self.alerts.news_score_threshold,
            self.alerts.whale_delta_threshold,
            self.alerts.cooldown_secs,
        );
        tracing::info!("  channel: {}", self.channel.kind_label());
        tracing::info!(
            "  worker:  symbol={}, interval={}s",
            self.worker.symbol,
            self.worker.interval_secs,
        );
    }
}

// ── Alert thresholds ──────────────────────────────────────────

/// Evaluation and dispatch tuning. All four values are required.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AlertsConfig {
    /// Market score band threshold (conventionally 0–100).
    pub market_score_threshold: f64,
    /// News impact score threshold (0–10 scale).
    pub news_score_threshold: f64,
    /// Absolute whale net-flow delta threshold.
    pub whale_delta_threshold: f64,
    /// Cooldown window, applied per alert kind at evaluation and per
    /// kind plus globally at dispatch.
    pub cooldown_secs: u64,
}

impl AlertsConfig {
    pub fn cooldown(&self) -> chrono::Duration {
        chrono::Duration::seconds(self.cooldown_secs as i64)
    }

    fn validate(&self) -> Result<(), HeraldError> {
        for (name, value) in [
            ("market_score_threshold", self.market_score_threshold),
            ("news_score_threshold", self.news_score_threshold),
            ("whale_delta_threshold", self.whale_delta_threshold),
        ] {
            if !value.is_finite() {
                return Err(HeraldError::Config(format!(
                    "alerts.{name} must be a finite number"
                )));
            }
        }
        if self.cooldown_secs == 0 {
            return Err(HeraldError::Config(
                "alerts.cooldown_secs must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

// ── Delivery channel ──────────────────────────────────────────

/// Delivery channel selection, tagged by `kind`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ChannelConfig {
    Telegram {
        /// Bot token; supports `${VAR}` env references.
        bot_token: String,
        chat_id: String,
        #[serde(default)]
        parse_mode: Option<String>,
    },
    Webhook {
        /// Target URL; supports `${VAR}` env references.
        url: String,
        #[serde(default)]
        method: Option<String>,
        #[serde(default)]
        headers: Option<HashMap<String, String>>,
    },
    Console {},
}

impl ChannelConfig {
    pub fn kind_label(&self) -> &'static str {
        match self {
            ChannelConfig::Telegram { .. } => "telegram",
            ChannelConfig::Webhook { .. } => "webhook",
            ChannelConfig::Console {} => "console",
        }
    }
}

// ── Worker (caller-side) settings ─────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct WorkerConfig {
    /// Asset symbol stamped into alert contexts.
    #[serde(default = "default_symbol")]
    pub symbol: String,
    /// Watch-mode poll period in seconds.
    #[serde(default = "default_interval_secs")]
    pub interval_secs: u64,
}

fn default_symbol() -> String {
    "BTC".to_string()
}

fn default_interval_secs() -> u64 {
    300
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            symbol: default_symbol(),
            interval_secs: default_interval_secs(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FULL: &str = r#"
[alerts]
market_score_threshold = 80.0
news_score_threshold = 7.5
whale_delta_threshold = 2000.0
cooldown_secs = 3600

[channel]
kind = "telegram"
bot_token = "123:ABC"
chat_id = "-10042"

[worker]
symbol = "ETH"
interval_secs = 120
"#;

    #[test]
    fn parse_shipped_example_config() {
        let raw = include_str!("../../../config/herald.toml");
        let config: HeraldConfig = toml::from_str(raw).unwrap();
        config.validate().unwrap();
        assert_eq!(config.channel.kind_label(), "telegram");
    }

    #[test]
    fn parse_full_config() {
        let config: HeraldConfig = toml::from_str(FULL).unwrap();
        config.validate().unwrap();
        assert_eq!(config.alerts.cooldown_secs, 3600);
        assert_eq!(config.worker.symbol, "ETH");
        assert_eq!(config.channel.kind_label(), "telegram");
    }

    #[test]
    fn missing_threshold_fails() {
        let toml_str = r#"
[alerts]
market_score_threshold = 80.0
news_score_threshold = 7.5
cooldown_secs = 3600

[channel]
kind = "console"
"#;
        let result: Result<HeraldConfig, _> = toml::from_str(toml_str);
        assert!(result.is_err(), "whale_delta_threshold is required");
    }

    #[test]
    fn worker_section_is_optional() {
        let toml_str = r#"
[alerts]
market_score_threshold = 80.0
news_score_threshold = 7.5
whale_delta_threshold = 2000.0
cooldown_secs = 60

[channel]
kind = "console"
"#;
        let config: HeraldConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.worker.symbol, "BTC");
        assert_eq!(config.worker.interval_secs, 300);
    }

    #[test]
    fn zero_cooldown_rejected() {
        let mut config: HeraldConfig = toml::from_str(FULL).unwrap();
        config.alerts.cooldown_secs = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn non_finite_threshold_rejected() {
        let mut config: HeraldConfig = toml::from_str(FULL).unwrap();
        config.alerts.whale_delta_threshold = f64::NAN;
        assert!(config.validate().is_err());
    }

    #[test]
    fn resolve_env_ref_literal_passthrough() {
        assert_eq!(resolve_env_ref("plain-token").unwrap(), "plain-token");
    }

    #[test]
    fn resolve_env_ref_reads_variable() {
        std::env::set_var("HERALD_CONFIG_TEST_TOKEN", "secret");
        assert_eq!(
            resolve_env_ref("${HERALD_CONFIG_TEST_TOKEN}").unwrap(),
            "secret"
        );
        std::env::remove_var("HERALD_CONFIG_TEST_TOKEN");
    }

    #[test]
    fn resolve_env_ref_missing_variable() {
        let err = resolve_env_ref("${HERALD_DEFINITELY_UNSET_XYZ}").unwrap_err();
        assert!(err.to_string().contains("HERALD_DEFINITELY_UNSET_XYZ"));
    }
}
