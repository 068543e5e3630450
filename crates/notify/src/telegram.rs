//! Telegram Bot API channel.
//!
//! Delivers alert messages via the Telegram Bot API `sendMessage`
//! endpoint. Supports MarkdownV2 formatting and rate limit handling;
//! the provider message id is returned for the dispatch record.

use crate::traits::{Channel, Delivery, NotifyError};

/// Escapes special characters for Telegram MarkdownV2 parse mode.
///
/// Telegram requires these characters to be escaped with a preceding
/// backslash when using MarkdownV2: `_`, `*`, `[`, `]`, `(`, `)`, `~`,
/// `` ` ``, `>`, `#`, `+`, `-`, `=`, `|`, `{`, `}`, `.`, `!`
pub fn escape_markdown_v2(text: &str) -> String {
    let special = ['_', '*', '[', ']', '(', ')', '~', '`', '>', '#', '+', '-', '=', '|', '{', '}', '.', '!'];
    let mut result = String::with_capacity(text.len() * 2);
    for ch in text.chars() {
        if special.contains(&ch) {
            result.push('\\');
        }
        result.push(ch);
    }
    result
}

/// Sends alert messages via the Telegram Bot API.
#[derive(Debug)]
pub struct TelegramChannel {
    bot_token: String,
    chat_id: String,
    parse_mode: Option<String>,
    client: reqwest::Client,
}

impl TelegramChannel {
    /// Creates a new `TelegramChannel` from configuration values.
    ///
    /// If `bot_token` is a `${VAR}` reference, the environment variable
    /// is resolved here. Returns [`NotifyError::Config`] if the token is
    /// empty or the env var is missing.
    pub fn from_config(
        bot_token: String,
        chat_id: String,
        parse_mode: Option<String>,
    ) -> Result<Self, NotifyError> {
        let resolved_token = herald_core::config::resolve_env_ref(&bot_token)
            .map_err(|e| NotifyError::Config(e.to_string()))?;

        if resolved_token.is_empty() {
            return Err(NotifyError::Config(
                "Telegram bot token must not be empty".to_string(),
            ));
        }

        Ok(Self {
            bot_token: resolved_token,
            chat_id,
            parse_mode,
            client: reqwest::Client::new(),
        })
    }
}

#[async_trait::async_trait]
impl Channel for TelegramChannel {
    /// Sends a message via the Telegram `sendMessage` API.
    async fn send(&self, text: &str) -> Result<Delivery, NotifyError> {
        let url = format!(
            "https://api.telegram.org/bot{}/sendMessage",
            self.bot_token
        );

        let rendered = if self.parse_mode.as_deref() == Some("MarkdownV2") {
            escape_markdown_v2(text)
        } else {
            text.to_string()
        };

        let mut body = serde_json::json!({
            "chat_id": self.chat_id,
            "text": rendered,
        });

        if let Some(ref mode) = self.parse_mode {
            body["parse_mode"] = serde_json::Value::String(mode.clone());
        }

        tracing::debug!(
            chat_id = %self.chat_id,
            parse_mode = ?self.parse_mode,
            "Sending Telegram message"
        );

        let response = self.client.post(&url).json(&body).send().await?;

        let status = response.status();
        let resp_body: serde_json::Value = response.json().await?;

        if resp_body.get("ok") == Some(&serde_json::Value::Bool(true)) {
            let message_id = resp_body
                .get("result")
                .and_then(|r| r.get("message_id"))
                .and_then(|v| v.as_i64())
                .map(|id| id.to_string());
            tracing::info!(chat_id = %self.chat_id, message_id = ?message_id, "Telegram message sent");
            return Ok(Delivery { message_id });
        }

        // Handle rate limiting (HTTP 429).
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            let retry_after = resp_body
                .get("parameters")
                .and_then(|p| p.get("retry_after"))
                .and_then(|v| v.as_u64())
                .unwrap_or(30);
            return Err(NotifyError::RateLimited {
                retry_after_secs: retry_after,
            });
        }

        let description = resp_body
            .get("description")
            .and_then(|v| v.as_str())
            .unwrap_or("Unknown Telegram API error");

        Err(NotifyError::Api(format!(
            "Telegram API error: {description}"
        )))
    }

    /// Returns the channel name for this transport.
    fn name(&self) -> &str {
        "telegram"
    }
}
