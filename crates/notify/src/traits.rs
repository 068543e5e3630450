//! Channel trait definition and shared dispatch types.

use herald_core::AlertKind;

/// Errors that can occur during message delivery.
#[derive(Debug, thiserror::Error)]
pub enum NotifyError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Channel API error: {0}")]
    Api(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Rate limited: retry after {retry_after_secs}s")]
    RateLimited { retry_after_secs: u64 },
}

/// Result of a successful send.
#[derive(Debug, Clone)]
pub struct Delivery {
    /// Provider-assigned message identifier, when the transport has one.
    pub message_id: Option<String>,
}

/// Trait for delivery transport implementations.
///
/// A send that times out is reported as any other failure; timeout policy
/// belongs to the transport, not the dispatcher.
#[async_trait::async_trait]
pub trait Channel: Send + Sync {
    /// Deliver a rendered message through this transport.
    async fn send(&self, text: &str) -> Result<Delivery, NotifyError>;

    /// Human-readable name for this channel (e.g., "telegram").
    fn name(&self) -> &str;
}

/// Why a candidate alert was not delivered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// The caller supplied no context record for the alert.
    MissingContext,
    /// Global or per-kind channel cooldown has not elapsed.
    ChannelCooldown,
    /// News item already delivered earlier in the process lifetime.
    AlreadyDelivered,
    /// The channel reported a send failure.
    SendFailed(String),
}

impl std::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SkipReason::MissingContext => write!(f, "no context for alert"),
            SkipReason::ChannelCooldown => write!(f, "channel cooldown active"),
            SkipReason::AlreadyDelivered => write!(f, "news item already delivered"),
            SkipReason::SendFailed(err) => write!(f, "send failed: {err}"),
        }
    }
}

/// Per-candidate dispatch record, suitable for logging.
#[derive(Debug, Clone)]
pub struct DispatchOutcome {
    pub kind: AlertKind,
    pub dispatched: bool,
    pub reason: Option<SkipReason>,
    pub message_id: Option<String>,
}

impl DispatchOutcome {
    pub(crate) fn sent(kind: AlertKind, message_id: Option<String>) -> Self {
        Self {
            kind,
            dispatched: true,
            reason: None,
            message_id,
        }
    }

    pub(crate) fn skipped(kind: AlertKind, reason: SkipReason) -> Self {
        Self {
            kind,
            dispatched: false,
            reason: Some(reason),
            message_id: None,
        }
    }
}
