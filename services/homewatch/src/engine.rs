//! Engine: the poll-check-notify loop

use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use crate::api::HomeworkApi;
use crate::notifier::Notifier;
use crate::state::WatchState;
use crate::status::{check_response, parse_status, NO_NEW_STATUSES};

/// Prefix for error-report notifications
const FAILURE_PREFIX: &str = "Сбой в работе программы";

/// The engine polls the status API, detects changes, and dispatches
/// notifications. Cursor and dedup state are owned here and mutated only
/// from this single task.
pub struct Engine {
    api: Arc<dyn HomeworkApi>,
    notifier: Arc<dyn Notifier>,
    state: WatchState,
    interval: Duration,
    cancel: CancellationToken,
}

impl Engine {
    pub fn new(
        api: Arc<dyn HomeworkApi>,
        notifier: Arc<dyn Notifier>,
        state: WatchState,
        interval: Duration,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            api,
            notifier,
            state,
            interval,
            cancel,
        }
    }

    /// Run the poll loop until the cancellation token fires.
    ///
    /// The sleep runs after every iteration, whichever branch `tick` took.
    pub async fn run(&mut self) {
        tracing::info!("Poll loop started (interval {:?})", self.interval);

        loop {
            self.tick().await;

            tokio::select! {
                _ = tokio::time::sleep(self.interval) => {}
                _ = self.cancel.cancelled() => {
                    tracing::debug!("Poll loop cancelled");
                    break;
                }
            }
        }
    }

    /// Run one poll iteration. Every error except delivery failures is
    /// caught here, logged, and turned into an error-report notification
    /// that is itself deduplicated against the last delivered text.
    pub async fn tick(&mut self) {
        if let Err(e) = self.poll_once().await {
            tracing::error!("Poll iteration failed: {}", e);
            let report = format!("{}: {}", FAILURE_PREFIX, e);
            self.send_if_changed(&report, None).await;
        }
    }

    async fn poll_once(&mut self) -> crate::Result<()> {
        let raw = self.api.fetch(self.state.cursor).await?;
        let response = check_response(&raw)?;

        let candidate = match response.homeworks.first() {
            Some(homework) => parse_status(homework)?,
            None => NO_NEW_STATUSES.to_string(),
        };

        self.send_if_changed(&candidate, Some(response.current_date))
            .await;
        Ok(())
    }

    /// Send the candidate unless it repeats the last delivered text.
    /// Dedup state and cursor advance only on a successful send, so a
    /// failed delivery is retried on the next iteration.
    async fn send_if_changed(&mut self, candidate: &str, new_cursor: Option<i64>) {
        if self.state.is_repeat(candidate) {
            tracing::debug!("Message unchanged, not sending: {}", candidate);
            return;
        }

        match self.notifier.send_message(candidate).await {
            Ok(()) => self.state.record_sent(candidate, new_cursor),
            Err(e) => tracing::error!("Failed to deliver notification: {}", e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};
    use std::collections::VecDeque;

    /// A test API that replays a scripted sequence of fetch results and
    /// records the cursor passed to each call
    #[derive(Debug)]
    struct ScriptedApi {
        responses: tokio::sync::Mutex<VecDeque<crate::Result<Value>>>,
        cursors: tokio::sync::Mutex<Vec<i64>>,
    }

    impl ScriptedApi {
        fn new(responses: Vec<crate::Result<Value>>) -> Self {
            Self {
                responses: tokio::sync::Mutex::new(responses.into()),
                cursors: tokio::sync::Mutex::new(Vec::new()),
            }
        }

        fn with_response(response: Value) -> Self {
            Self::new(vec![Ok(response)])
        }

        async fn cursors(&self) -> Vec<i64> {
            self.cursors.lock().await.clone()
        }
    }

    #[async_trait::async_trait]
    impl HomeworkApi for ScriptedApi {
        async fn fetch(&self, from_date: i64) -> crate::Result<Value> {
            self.cursors.lock().await.push(from_date);
            self.responses
                .lock()
                .await
                .pop_front()
                .expect("unexpected extra fetch")
        }
    }

    /// A test notifier that records every attempted message and can be
    /// told to fail
    #[derive(Debug)]
    struct RecordingNotifier {
        succeed: bool,
        messages: tokio::sync::RwLock<Vec<String>>,
    }

    impl RecordingNotifier {
        fn new(succeed: bool) -> Self {
            Self {
                succeed,
                messages: tokio::sync::RwLock::new(Vec::new()),
            }
        }

        async fn messages(&self) -> Vec<String> {
            self.messages.read().await.clone()
        }
    }

    #[async_trait::async_trait]
    impl Notifier for RecordingNotifier {
        async fn send_message(&self, text: &str) -> crate::Result<()> {
            self.messages.write().await.push(text.to_string());
            if self.succeed {
                Ok(())
            } else {
                Err(crate::WatchError::Delivery("test failure".to_string()))
            }
        }
    }

    fn engine_with(
        api: Arc<ScriptedApi>,
        notifier: Arc<RecordingNotifier>,
        cursor: i64,
    ) -> Engine {
        Engine::new(
            api,
            notifier,
            WatchState::new(cursor),
            Duration::from_secs(600),
            CancellationToken::new(),
        )
    }

    #[tokio::test]
    async fn status_change_is_notified_and_cursor_advances() {
        let api = Arc::new(ScriptedApi::with_response(json!({
            "homeworks": [{"homework_name": "proj1", "status": "approved"}],
            "current_date": 1000
        })));
        let notifier = Arc::new(RecordingNotifier::new(true));
        let mut engine = engine_with(api, notifier.clone(), 0);

        engine.tick().await;

        assert_eq!(
            notifier.messages().await,
            vec![
                "Изменился статус проверки работы \"proj1\". Работа проверена: ревьюеру всё понравилось. Ура!"
            ]
        );
        assert_eq!(engine.state.cursor, 1000);
    }

    #[tokio::test]
    async fn empty_homeworks_sends_no_news_message() {
        let api = Arc::new(ScriptedApi::with_response(
            json!({"homeworks": [], "current_date": 2000}),
        ));
        let notifier = Arc::new(RecordingNotifier::new(true));
        let mut engine = engine_with(api, notifier.clone(), 0);

        engine.tick().await;

        assert_eq!(notifier.messages().await, vec![NO_NEW_STATUSES]);
        assert_eq!(engine.state.cursor, 2000);
    }

    #[tokio::test]
    async fn repeated_message_is_sent_only_once() {
        let api = Arc::new(ScriptedApi::new(vec![
            Ok(json!({
                "homeworks": [{"homework_name": "proj1", "status": "reviewing"}],
                "current_date": 1000
            })),
            Ok(json!({
                "homeworks": [{"homework_name": "proj1", "status": "reviewing"}],
                "current_date": 1500
            })),
        ]));
        let notifier = Arc::new(RecordingNotifier::new(true));
        let mut engine = engine_with(api, notifier.clone(), 0);

        engine.tick().await;
        engine.tick().await;

        assert_eq!(notifier.messages().await.len(), 1);
        // The cursor only moves on an actual send, so the second
        // iteration's current_date is ignored.
        assert_eq!(engine.state.cursor, 1000);
    }

    #[tokio::test]
    async fn unknown_status_sends_one_error_report() {
        let api = Arc::new(ScriptedApi::with_response(json!({
            "homeworks": [{"homework_name": "x", "status": "unknown_code"}],
            "current_date": 3000
        })));
        let notifier = Arc::new(RecordingNotifier::new(true));
        let mut engine = engine_with(api, notifier.clone(), 500);

        engine.tick().await;

        let messages = notifier.messages().await;
        assert_eq!(messages.len(), 1);
        assert!(
            messages[0].starts_with("Сбой в работе программы:"),
            "{}",
            messages[0]
        );
        assert!(messages[0].contains("unknown_code"), "{}", messages[0]);
        assert_eq!(engine.state.cursor, 500);
    }

    #[tokio::test]
    async fn identical_errors_notify_once() {
        let api = Arc::new(ScriptedApi::new(vec![
            Err(crate::WatchError::Request("connection refused".to_string())),
            Err(crate::WatchError::Request("connection refused".to_string())),
        ]));
        let notifier = Arc::new(RecordingNotifier::new(true));
        let mut engine = engine_with(api, notifier.clone(), 0);

        engine.tick().await;
        engine.tick().await;

        assert_eq!(notifier.messages().await.len(), 1);
    }

    #[tokio::test]
    async fn distinct_errors_notify_each() {
        let api = Arc::new(ScriptedApi::new(vec![
            Err(crate::WatchError::Request("connection refused".to_string())),
            Err(crate::WatchError::Response {
                status: 503,
                body: "unavailable".to_string(),
            }),
        ]));
        let notifier = Arc::new(RecordingNotifier::new(true));
        let mut engine = engine_with(api, notifier.clone(), 0);

        engine.tick().await;
        engine.tick().await;

        let messages = notifier.messages().await;
        assert_eq!(messages.len(), 2);
        assert_ne!(messages[0], messages[1]);
    }

    #[tokio::test]
    async fn delivery_failure_leaves_state_untouched() {
        let api = Arc::new(ScriptedApi::with_response(json!({
            "homeworks": [{"homework_name": "proj1", "status": "approved"}],
            "current_date": 1000
        })));
        let notifier = Arc::new(RecordingNotifier::new(false));
        let mut engine = engine_with(api, notifier.clone(), 0);

        engine.tick().await;

        assert_eq!(notifier.messages().await.len(), 1);
        assert!(engine.state.last_message.is_none());
        assert_eq!(engine.state.cursor, 0);
    }

    #[tokio::test]
    async fn failed_delivery_is_retried_next_iteration() {
        let response = json!({
            "homeworks": [{"homework_name": "proj1", "status": "approved"}],
            "current_date": 1000
        });
        let api = Arc::new(ScriptedApi::new(vec![Ok(response.clone()), Ok(response)]));
        let failing = Arc::new(RecordingNotifier::new(false));
        let mut engine = engine_with(Arc::clone(&api), failing.clone(), 0);

        engine.tick().await;
        assert!(engine.state.last_message.is_none());

        // Same candidate goes out again once delivery recovers.
        let working = Arc::new(RecordingNotifier::new(true));
        let working_dyn: Arc<dyn Notifier> = working.clone();
        engine.notifier = working_dyn;
        engine.tick().await;

        assert_eq!(failing.messages().await.len(), 1);
        assert_eq!(working.messages().await.len(), 1);
        assert_eq!(engine.state.cursor, 1000);
    }

    #[tokio::test]
    async fn fetch_receives_the_current_cursor() {
        let api = Arc::new(ScriptedApi::new(vec![
            Ok(json!({"homeworks": [], "current_date": 2000})),
            Ok(json!({
                "homeworks": [{"homework_name": "p", "status": "approved"}],
                "current_date": 2500
            })),
        ]));
        let notifier = Arc::new(RecordingNotifier::new(true));
        let mut engine = engine_with(Arc::clone(&api), notifier, 1000);

        engine.tick().await;
        engine.tick().await;

        assert_eq!(api.cursors().await, vec![1000, 2000]);
        assert_eq!(engine.state.cursor, 2500);
    }

    #[tokio::test]
    async fn run_exits_when_cancelled() {
        let api = Arc::new(ScriptedApi::with_response(
            json!({"homeworks": [], "current_date": 100}),
        ));
        let notifier = Arc::new(RecordingNotifier::new(true));
        let cancel = CancellationToken::new();
        let mut engine = Engine::new(
            api,
            notifier,
            WatchState::new(0),
            Duration::from_secs(600),
            cancel.clone(),
        );

        cancel.cancel();
        engine.run().await;
    }
}
