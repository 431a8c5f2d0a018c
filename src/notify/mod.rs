// =============================================================================
// Notification delivery
// =============================================================================
//
// The scheduler hands finished message text to a `Notifier`.  With Telegram
// credentials present the text goes to the chat; without them the bot keeps
// scanning and only logs what it would have sent.

pub mod telegram;

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use tracing::{info, warn};

pub use telegram::TelegramNotifier;

#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send(&self, text: &str) -> Result<()>;

    /// Short delivery-channel name for logs and the status page.
    fn kind(&self) -> &'static str;
}

/// Fallback used when messaging credentials are missing.
#[derive(Debug, Default)]
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn send(&self, text: &str) -> Result<()> {
        info!(message = %text, "notification (log only, no Telegram credentials)");
        Ok(())
    }

    fn kind(&self) -> &'static str {
        "log-only"
    }
}

/// Build the notifier from `TELEGRAM_TOKEN` / `TELEGRAM_CHAT_ID`.
pub fn from_env(base_url: &str, timeout: Duration) -> Arc<dyn Notifier> {
    from_lookup(base_url, timeout, |key| std::env::var(key).ok())
}

fn from_lookup(
    base_url: &str,
    timeout: Duration,
    lookup: impl Fn(&str) -> Option<String>,
) -> Arc<dyn Notifier> {
    let token = lookup("TELEGRAM_TOKEN").filter(|s| !s.trim().is_empty());
    let chat_id = lookup("TELEGRAM_CHAT_ID").filter(|s| !s.trim().is_empty());

    let (Some(token), Some(chat_id)) = (token, chat_id) else {
        warn!("TELEGRAM_TOKEN or TELEGRAM_CHAT_ID missing — notifications are log-only");
        return Arc::new(LogNotifier);
    };

    match TelegramNotifier::new(base_url, token.trim(), chat_id.trim(), timeout) {
        Ok(notifier) => {
            info!(chat_id = %chat_id.trim(), "Telegram notifications enabled");
            Arc::new(notifier)
        }
        Err(e) => {
            warn!(error = %e, "failed to build Telegram notifier — notifications are log-only");
            Arc::new(LogNotifier)
        }
    }
}
