//! Telegram notification client

use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;

use crate::io::HttpClient;
use crate::notifier::Notifier;

const TELEGRAM_API_URL: &str = "https://api.telegram.org";

/// Telegram Bot API envelope for sendMessage
#[derive(Debug, Deserialize)]
struct TelegramResponse {
    ok: bool,
    description: Option<String>,
}

/// Telegram message sender
pub struct TelegramNotifier {
    send_url: String,
    chat_id: String,
    http: Arc<dyn HttpClient>,
}

impl std::fmt::Debug for TelegramNotifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TelegramNotifier")
            .field("chat_id", &self.chat_id)
            .finish()
    }
}

impl TelegramNotifier {
    pub fn new(bot_token: &str, chat_id: &str, http: Arc<dyn HttpClient>) -> Self {
        let send_url = format!("{}/bot{}/sendMessage", TELEGRAM_API_URL, bot_token);
        tracing::debug!("Created TelegramNotifier for chat {}", chat_id);
        Self {
            send_url,
            chat_id: chat_id.to_string(),
            http,
        }
    }
}

#[async_trait]
impl Notifier for TelegramNotifier {
    async fn send_message(&self, text: &str) -> crate::Result<()> {
        let params = [("chat_id", self.chat_id.as_str()), ("text", text)];

        let response = self
            .http
            .post_form(&self.send_url, &params)
            .await
            .map_err(|e| match e {
                crate::WatchError::Http(cause) => crate::WatchError::Delivery(cause),
                other => other,
            })?;

        if response.status != 200 {
            return Err(crate::WatchError::Delivery(format!(
                "Telegram API returned status {}: {}",
                response.status, response.body
            )));
        }

        let parsed: TelegramResponse = serde_json::from_str(&response.body).map_err(|e| {
            crate::WatchError::Delivery(format!("Unexpected Telegram response: {}", e))
        })?;
        if !parsed.ok {
            return Err(crate::WatchError::Delivery(format!(
                "Telegram API rejected the message: {}",
                parsed.description.unwrap_or_default()
            )));
        }

        tracing::debug!("Message delivered: {}", text);
        Ok(())
    }
}
