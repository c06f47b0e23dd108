//! Homework status source trait

use async_trait::async_trait;
use serde_json::Value;

/// Trait for fetching homework status updates
#[async_trait]
pub trait HomeworkApi: Send + Sync + std::fmt::Debug {
    /// Fetch raw status data changed since the given unix timestamp.
    ///
    /// Returns the response body as parsed JSON; shape validation is the
    /// caller's responsibility.
    async fn fetch(&self, from_date: i64) -> crate::Result<Value>;
}
