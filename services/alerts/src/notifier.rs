//! Alert delivery over email and an optional Telegram broadcast

use anyhow::Result;
use common::mailer::Mailer;
use serde_json::json;
use tracing::warn;

use crate::poller::Notifier;

/// Configuration for the Telegram broadcast channel
#[derive(Debug, Clone)]
pub struct NotifierConfig {
    /// Telegram Bot API base URL
    pub telegram_api_url: String,
    /// Bot token, broadcasts are skipped when absent
    pub telegram_bot_token: Option<String>,
    /// Target chat id, broadcasts are skipped when absent
    pub telegram_chat_id: Option<String>,
}

impl NotifierConfig {
    /// Create a new NotifierConfig from environment variables
    ///
    /// # Environment Variables
    /// - `TELEGRAM_API_URL`: API base (default: "https://api.telegram.org")
    /// - `TELEGRAM_BOT_TOKEN`: bot token (optional)
    /// - `TELEGRAM_CHAT_ID`: chat to broadcast into (optional)
    pub fn from_env() -> Result<Self> {
        let telegram_api_url = std::env::var("TELEGRAM_API_URL")
            .unwrap_or_else(|_| "https://api.telegram.org".to_string());
        let telegram_bot_token = std::env::var("TELEGRAM_BOT_TOKEN").ok();
        let telegram_chat_id = std::env::var("TELEGRAM_CHAT_ID").ok();

        Ok(NotifierConfig {
            telegram_api_url,
            telegram_bot_token,
            telegram_chat_id,
        })
    }
}

/// Concrete notifier combining the Postmark mailer with a Telegram bot
#[derive(Clone)]
pub struct AlertNotifier {
    mailer: Mailer,
    http: reqwest::Client,
    config: NotifierConfig,
}

impl AlertNotifier {
    pub fn new(mailer: Mailer, config: NotifierConfig) -> Self {
        Self {
            mailer,
            http: reqwest::Client::new(),
            config,
        }
    }
}

impl Notifier for AlertNotifier {
    async fn send_email(&self, to: &str, subject: &str, body: &str) -> Result<()> {
        self.mailer.send(to, subject, body, "search-alert").await
    }

    async fn send_message(&self, text: &str) -> Result<()> {
        let (Some(token), Some(chat_id)) = (
            self.config.telegram_bot_token.as_deref(),
            self.config.telegram_chat_id.as_deref(),
        ) else {
            warn!("Telegram broadcast not configured, skipping");
            return Ok(());
        };

        let url = format!("{}/bot{}/sendMessage", self.config.telegram_api_url, token);
        self.http
            .post(&url)
            .json(&json!({ "chat_id": chat_id, "text": text }))
            .send()
            .await?
            .error_for_status()?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    #[serial]
    fn test_notifier_config_defaults() {
        unsafe {
            std::env::remove_var("TELEGRAM_API_URL");
            std::env::remove_var("TELEGRAM_BOT_TOKEN");
            std::env::remove_var("TELEGRAM_CHAT_ID");
        }

        let config = NotifierConfig::from_env().expect("Failed to create notifier config");
        assert_eq!(config.telegram_api_url, "https://api.telegram.org");
        assert!(config.telegram_bot_token.is_none());
        assert!(config.telegram_chat_id.is_none());
    }
}
