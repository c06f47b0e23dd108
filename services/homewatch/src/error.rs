//! Error types for the homewatch service

/// Errors that can occur while watching homework statuses
#[derive(Debug, thiserror::Error)]
pub enum WatchError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("HTTP request failed: {0}")]
    Http(String),

    #[error("API request failed: {0}")]
    Request(String),

    #[error("API returned status {status}: {body}")]
    Response { status: u16, body: String },

    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Malformed API response: {0}")]
    Shape(String),

    #[error("Required key `{0}` is missing")]
    MissingField(&'static str),

    #[error("Unknown homework status: {0}")]
    UnknownStatus(String),

    #[error("Notification delivery failed: {0}")]
    Delivery(String),
}

/// Result type alias for homewatch operations
pub type Result<T> = std::result::Result<T, WatchError>;
