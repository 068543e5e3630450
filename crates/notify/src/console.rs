//! Console channel — logs instead of sending. Used by `--dry-run`.

use crate::traits::{Channel, Delivery, NotifyError};

/// Prints the rendered message through tracing and reports success.
#[derive(Debug, Default)]
pub struct ConsoleChannel;

impl ConsoleChannel {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait::async_trait]
impl Channel for ConsoleChannel {
    async fn send(&self, text: &str) -> Result<Delivery, NotifyError> {
        tracing::info!("would deliver:\n{text}");
        Ok(Delivery { message_id: None })
    }

    fn name(&self) -> &str {
        "console"
    }
}
