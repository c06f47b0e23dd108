//! Yandex Practicum homework status client

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use crate::api::HomeworkApi;
use crate::io::HttpClient;

/// Client for the Practicum homework status API
pub struct PracticumClient {
    endpoint: String,
    token: String,
    http: Arc<dyn HttpClient>,
}

impl std::fmt::Debug for PracticumClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PracticumClient")
            .field("endpoint", &self.endpoint)
            .finish()
    }
}

impl PracticumClient {
    pub fn new(endpoint: &str, token: &str, http: Arc<dyn HttpClient>) -> Self {
        tracing::debug!("Created PracticumClient for {}", endpoint);
        Self {
            endpoint: endpoint.to_string(),
            token: token.to_string(),
            http,
        }
    }
}

#[async_trait]
impl HomeworkApi for PracticumClient {
    async fn fetch(&self, from_date: i64) -> crate::Result<Value> {
        let url = format!("{}?from_date={}", self.endpoint, from_date);
        let auth = format!("OAuth {}", self.token);
        tracing::debug!("GET {} (Authorization: OAuth <redacted>)", url);

        let response = self
            .http
            .get(&url, &[("Authorization", &auth)])
            .await
            .map_err(|e| match e {
                crate::WatchError::Http(cause) => crate::WatchError::Request(cause),
                other => other,
            })?;

        if response.status != 200 {
            return Err(crate::WatchError::Response {
                status: response.status,
                body: response.body,
            });
        }

        tracing::debug!("Homework status request succeeded with code {}", response.status);
        let value: Value = serde_json::from_str(&response.body)?;
        Ok(value)
    }
}
