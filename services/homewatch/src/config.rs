//! Configuration for the homewatch service

use std::time::Duration;

/// Yandex Practicum homework status endpoint
pub const ENDPOINT: &str = "https://practicum.yandex.ru/api/user_api/homework_statuses/";

/// Environment variable holding the Practicum API token
pub const PRACTICUM_TOKEN_VAR: &str = "PRACTICUM_TOKEN";

/// Environment variable holding the Telegram bot token
pub const TELEGRAM_TOKEN_VAR: &str = "TELEGRAM_TOKEN";

/// Environment variable holding the Telegram chat identifier
pub const TELEGRAM_CHAT_ID_VAR: &str = "TELEGRAM_CHAT_ID";

/// Required environment variables, in reporting order
pub const REQUIRED_VARS: [&str; 3] = [PRACTICUM_TOKEN_VAR, TELEGRAM_TOKEN_VAR, TELEGRAM_CHAT_ID_VAR];

fn default_poll_interval() -> Duration {
    Duration::from_secs(600)
}

/// Runtime configuration resolved from the environment
#[derive(Debug, Clone)]
pub struct Config {
    pub practicum_token: String,
    pub telegram_token: String,
    pub telegram_chat_id: String,
    pub endpoint: String,
    pub poll_interval: Duration,
}

/// Names of required variables whose value is absent or empty, using the
/// given lookup. Factored over the lookup so the check is testable without
/// touching the process environment.
pub fn missing_vars_from<F>(lookup: F) -> Vec<&'static str>
where
    F: Fn(&str) -> Option<String>,
{
    REQUIRED_VARS
        .iter()
        .copied()
        .filter(|name| lookup(name).is_none_or(|value| value.is_empty()))
        .collect()
}

/// Names of required variables missing from the process environment
pub fn missing_vars() -> Vec<&'static str> {
    missing_vars_from(|name| std::env::var(name).ok())
}

impl Config {
    /// Resolve the configuration from the process environment
    pub fn from_env() -> crate::Result<Self> {
        let missing = missing_vars();
        if !missing.is_empty() {
            return Err(crate::WatchError::Config(format!(
                "Missing required environment variables: {}",
                missing.join(", ")
            )));
        }

        Ok(Self {
            practicum_token: std::env::var(PRACTICUM_TOKEN_VAR).unwrap_or_default(),
            telegram_token: std::env::var(TELEGRAM_TOKEN_VAR).unwrap_or_default(),
            telegram_chat_id: std::env::var(TELEGRAM_CHAT_ID_VAR).unwrap_or_default(),
            endpoint: ENDPOINT.to_string(),
            poll_interval: default_poll_interval(),
        })
    }
}
