//! Poll cursor and notification dedup state

/// Mutable state carried across poll iterations.
///
/// Both values live for the process lifetime only; a restart resets them.
#[derive(Debug, Clone)]
pub struct WatchState {
    /// Fetch-changes-since cursor, unix seconds
    pub cursor: i64,
    /// Text of the most recently delivered notification
    pub last_message: Option<String>,
}

impl WatchState {
    pub fn new(cursor: i64) -> Self {
        Self {
            cursor,
            last_message: None,
        }
    }

    /// True if the candidate equals the last successfully delivered text
    pub fn is_repeat(&self, candidate: &str) -> bool {
        self.last_message.as_deref() == Some(candidate)
    }

    /// Record a successful delivery, advancing the cursor when the
    /// iteration produced a new one
    pub fn record_sent(&mut self, message: &str, new_cursor: Option<i64>) {
        self.last_message = Some(message.to_string());
        if let Some(cursor) = new_cursor {
            self.cursor = cursor;
        }
    }
}
