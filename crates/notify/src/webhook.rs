//! Generic HTTP webhook channel.
//!
//! Delivers alert messages as JSON payloads to a configured endpoint
//! with optional custom headers. Environment variable references
//! (`${VAR}`) in the URL and header values are resolved at construction
//! time.

use std::collections::HashMap;

use crate::traits::{Channel, Delivery, NotifyError};

/// Delivers alert text as JSON over HTTP to a configured endpoint.
#[derive(Debug)]
pub struct WebhookChannel {
    /// Target URL (env vars already resolved).
    url: String,
    /// HTTP method (defaults to POST).
    method: reqwest::Method,
    /// Custom headers to include on every request.
    headers: HashMap<String, String>,
    /// Shared HTTP client (connection pooling).
    client: reqwest::Client,
}

impl WebhookChannel {
    /// Construct a [`WebhookChannel`] from config-level primitives.
    ///
    /// `method` is parsed from a string (e.g. `"POST"`, `"PUT"`) and
    /// defaults to POST. Invalid method strings and missing env vars
    /// produce [`NotifyError::Config`].
    pub fn from_config(
        url: String,
        method: Option<String>,
        headers: Option<HashMap<String, String>>,
    ) -> Result<Self, NotifyError> {
        let resolved_url = herald_core::config::resolve_env_ref(&url)
            .map_err(|e| NotifyError::Config(e.to_string()))?;

        let parsed_method = match method {
            Some(m) => m
                .to_uppercase()
                .parse::<reqwest::Method>()
                .map_err(|_| NotifyError::Config(format!("invalid HTTP method: {m}")))?,
            None => reqwest::Method::POST,
        };

        let headers = headers.unwrap_or_default();
        let mut resolved_headers = HashMap::with_capacity(headers.len());
        for (key, value) in &headers {
            let resolved = herald_core::config::resolve_env_ref(value)
                .map_err(|e| NotifyError::Config(e.to_string()))?;
            resolved_headers.insert(key.clone(), resolved);
        }

        Ok(Self {
            url: resolved_url,
            method: parsed_method,
            headers: resolved_headers,
            client: reqwest::Client::new(),
        })
    }
}

#[async_trait::async_trait]
impl Channel for WebhookChannel {
    /// Deliver the message as a `{"text": ...}` JSON payload.
    async fn send(&self, text: &str) -> Result<Delivery, NotifyError> {
        let payload = serde_json::json!({ "text": text });

        let mut request = self
            .client
            .request(self.method.clone(), &self.url)
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .json(&payload);

        for (key, value) in &self.headers {
            request = request.header(key.as_str(), value.as_str());
        }

        let response = request.send().await?;
        let status = response.status();

        if !status.is_success() {
            let body_text = response
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable body>".to_string());
            tracing::warn!(
                url = %self.url,
                %status,
                body = %body_text,
                "webhook returned non-2xx status"
            );
            return Err(NotifyError::Api(format!(
                "webhook returned {status}: {body_text}"
            )));
        }

        // Providers may answer with an id; absent or non-JSON bodies are fine.
        let message_id = response
            .json::<serde_json::Value>()
            .await
            .ok()
            .and_then(|body| {
                body.get("id")
                    .or_else(|| body.get("message_id"))
                    .map(|v| match v.as_str() {
                        Some(s) => s.to_string(),
                        None => v.to_string(),
                    })
            });

        tracing::debug!(
            url = %self.url,
            method = %self.method,
            status = %status,
            "webhook message delivered"
        );

        Ok(Delivery { message_id })
    }

    fn name(&self) -> &str {
        "webhook"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn method_defaults_to_post() {
        let channel =
            WebhookChannel::from_config("https://example.com/hook".to_string(), None, None)
                .unwrap();
        assert_eq!(channel.method, reqwest::Method::POST);
    }

    #[test]
    fn method_parsed_case_insensitively() {
        let channel = WebhookChannel::from_config(
            "https://example.com/hook".to_string(),
            Some("put".to_string()),
            None,
        )
        .unwrap();
        assert_eq!(channel.method, reqwest::Method::PUT);
    }

    #[test]
    fn url_env_reference_resolved() {
        std::env::set_var("TEST_HERALD_HOOK_URL", "https://example.com/secret-hook");
        let channel = WebhookChannel::from_config(
            "${TEST_HERALD_HOOK_URL}".to_string(),
            None,
            None,
        )
        .unwrap();
        assert_eq!(channel.url, "https://example.com/secret-hook");
        std::env::remove_var("TEST_HERALD_HOOK_URL");
    }

    #[test]
    fn header_env_reference_resolved() {
        std::env::set_var("TEST_HERALD_HOOK_AUTH", "Bearer xyz");
        let mut headers = HashMap::new();
        headers.insert(
            "Authorization".to_string(),
            "${TEST_HERALD_HOOK_AUTH}".to_string(),
        );
        let channel = WebhookChannel::from_config(
            "https://example.com/hook".to_string(),
            None,
            Some(headers),
        )
        .unwrap();
        assert_eq!(
            channel.headers.get("Authorization").map(String::as_str),
            Some("Bearer xyz")
        );
        std::env::remove_var("TEST_HERALD_HOOK_AUTH");
    }

    #[test]
    fn missing_header_env_var_fails() {
        let mut headers = HashMap::new();
        headers.insert(
            "Authorization".to_string(),
            "${HERALD_UNSET_HOOK_AUTH_XYZ}".to_string(),
        );
        let result = WebhookChannel::from_config(
            "https://example.com/hook".to_string(),
            None,
            Some(headers),
        );
        assert!(result.is_err());
    }

    #[test]
    fn channel_name() {
        let channel =
            WebhookChannel::from_config("https://example.com/hook".to_string(), None, None)
                .unwrap();
        assert_eq!(channel.name(), "webhook");
    }
}
