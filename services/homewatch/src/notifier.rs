//! Notifier trait for delivering messages

use async_trait::async_trait;

/// Trait for sending notification messages
#[async_trait]
pub trait Notifier: Send + Sync + std::fmt::Debug {
    /// Send a plain-text message to the configured destination
    async fn send_message(&self, text: &str) -> crate::Result<()>;
}
