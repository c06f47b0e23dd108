//! Homewatch - homework review status monitoring and notification service
//!
//! Polls the Yandex Practicum homework status API, detects review status
//! changes, and relays them to a Telegram chat.

pub mod api;
pub mod config;
pub mod engine;
pub mod error;
pub mod io;
pub mod notifier;
pub mod practicum;
pub mod state;
pub mod status;
pub mod telegram;

pub use config::Config;
pub use error::{Result, WatchError};

use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use tokio_util::sync::CancellationToken;

use crate::engine::Engine;
use crate::io::ReqwestHttpClient;
use crate::practicum::PracticumClient;
use crate::state::WatchState;
use crate::telegram::TelegramNotifier;

/// Hard timeout for every outbound HTTP request
const HTTP_TIMEOUT: Duration = Duration::from_secs(30);

/// Run the watcher with the given configuration
pub async fn run(config: Config) -> Result<()> {
    let http: Arc<dyn io::HttpClient> = Arc::new(ReqwestHttpClient::new(HTTP_TIMEOUT)?);
    let cancel = CancellationToken::new();

    let api = Arc::new(PracticumClient::new(
        &config.endpoint,
        &config.practicum_token,
        Arc::clone(&http),
    ));
    let notifier = Arc::new(TelegramNotifier::new(
        &config.telegram_token,
        &config.telegram_chat_id,
        Arc::clone(&http),
    ));

    let started_at = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs() as i64;

    let mut engine = Engine::new(
        api,
        notifier,
        WatchState::new(started_at),
        config.poll_interval,
        cancel.clone(),
    );

    // Setup shutdown handler
    let cancel_for_signal = cancel.clone();
    tokio::spawn(async move {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to listen for ctrl-c");
        tracing::info!("Shutdown signal received");
        cancel_for_signal.cancel();
    });

    // Run the engine (blocks until cancelled)
    engine.run().await;
    tracing::info!("Watcher stopped");

    Ok(())
}
