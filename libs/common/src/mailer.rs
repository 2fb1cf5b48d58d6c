//! Outbound email delivery via the Postmark HTTP API
//!
//! Delivery is fire-and-forget from the caller's perspective: failures are
//! returned so the caller can log them, but nothing here retries.

use anyhow::Result;
use serde::Serialize;
use tracing::info;

/// Configuration for the Postmark mailer
#[derive(Debug, Clone)]
pub struct MailerConfig {
    /// Postmark email API endpoint
    pub api_url: String,
    /// Postmark server token
    pub server_token: String,
    /// Sender address for all outgoing mail
    pub sender: String,
}

impl MailerConfig {
    /// Create a new MailerConfig from environment variables
    ///
    /// # Environment Variables
    /// - `POSTMARK_API_URL`: API endpoint (default: "https://api.postmarkapp.com/email")
    /// - `POSTMARK_TOKEN`: Postmark server token (default: empty, sends will fail)
    /// - `POSTMARK_SENDER`: Sender address (default: "noreply@bin-alert.app")
    pub fn from_env() -> Result<Self> {
        let api_url = std::env::var("POSTMARK_API_URL")
            .unwrap_or_else(|_| "https://api.postmarkapp.com/email".to_string());
        let server_token = std::env::var("POSTMARK_TOKEN").unwrap_or_default();
        let sender = std::env::var("POSTMARK_SENDER")
            .unwrap_or_else(|_| "noreply@bin-alert.app".to_string());

        Ok(MailerConfig {
            api_url,
            server_token,
            sender,
        })
    }
}

#[derive(Serialize)]
struct PostmarkMessage<'a> {
    #[serde(rename = "From")]
    from: &'a str,
    #[serde(rename = "To")]
    to: &'a str,
    #[serde(rename = "Subject")]
    subject: &'a str,
    #[serde(rename = "TextBody")]
    text_body: &'a str,
    #[serde(rename = "Tag")]
    tag: &'a str,
}

/// Postmark email client
#[derive(Clone)]
pub struct Mailer {
    http: reqwest::Client,
    config: MailerConfig,
}

impl Mailer {
    /// Create a new mailer
    pub fn new(config: MailerConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            config,
        }
    }

    /// Send a plain-text email
    pub async fn send(&self, to: &str, subject: &str, body: &str, tag: &str) -> Result<()> {
        let message = PostmarkMessage {
            from: &self.config.sender,
            to,
            subject,
            text_body: body,
            tag,
        };

        self.http
            .post(&self.config.api_url)
            .header("X-Postmark-Server-Token", &self.config.server_token)
            .json(&message)
            .send()
            .await?
            .error_for_status()?;

        info!("Email sent to {}", to);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    #[serial]
    fn test_mailer_config_defaults() {
        unsafe {
            std::env::remove_var("POSTMARK_API_URL");
            std::env::remove_var("POSTMARK_TOKEN");
            std::env::remove_var("POSTMARK_SENDER");
        }

        let config = MailerConfig::from_env().expect("Failed to create mailer config");
        assert_eq!(config.api_url, "https://api.postmarkapp.com/email");
        assert_eq!(config.sender, "noreply@bin-alert.app");
        assert!(config.server_token.is_empty());
    }
}
