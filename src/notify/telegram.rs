// =============================================================================
// Telegram Bot API notifier
// =============================================================================

use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use tracing::{debug, instrument};

use super::Notifier;

/// Public Telegram Bot API endpoint.
pub const DEFAULT_BASE_URL: &str = "https://api.telegram.org";

/// Posts plain-text messages to one chat through `sendMessage`.
pub struct TelegramNotifier {
    base_url: String,
    token: String,
    chat_id: String,
    client: reqwest::Client,
}

impl TelegramNotifier {
    pub fn new(
        base_url: impl Into<String>,
        token: impl Into<String>,
        chat_id: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("failed to build reqwest client")?;

        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token: token.into(),
            chat_id: chat_id.into(),
            client,
        })
    }

    fn endpoint(&self) -> String {
        format!("{}/bot{}/sendMessage", self.base_url, self.token)
    }
}

#[async_trait]
impl Notifier for TelegramNotifier {
    #[instrument(skip(self, text), name = "telegram::send")]
    async fn send(&self, text: &str) -> Result<()> {
        let resp = self
            .client
            .post(self.endpoint())
            .form(&[("chat_id", self.chat_id.as_str()), ("text", text)])
            .send()
            .await
            // reqwest errors embed the URL, which carries the token.
            .map_err(|e| anyhow::anyhow!("sendMessage request failed: {}", e.without_url()))?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            anyhow::bail!("Telegram sendMessage returned {}: {}", status, body);
        }

        debug!(chat_id = %self.chat_id, "message delivered");
        Ok(())
    }

    fn kind(&self) -> &'static str {
        "telegram"
    }
}

impl std::fmt::Debug for TelegramNotifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TelegramNotifier")
            .field("base_url", &self.base_url)
            .field("token", &"<redacted>")
            .field("chat_id", &self.chat_id)
            .finish()
    }
}
