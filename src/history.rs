use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::store::KvStore;

pub const HISTORY_KEY: &str = "sessionHistory";
pub const PROGRESS_KEY: &str = "studyProgress";
pub const DARK_MODE_KEY: &str = "darkMode";
pub const HISTORY_LIMIT: usize = 10;

/// One completed study session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSummary {
    /// RFC 3339 timestamp of when the session closed
    pub date: String,
    pub cards_studied: usize,
    pub accuracy: u8,
    /// Seconds
    pub time_spent: u64,
}

/// Session history and study progress on top of the key-value layer
pub struct HistoryStore {
    kv: KvStore,
}

impl HistoryStore {
    pub fn new(kv: KvStore) -> Self {
        Self { kv }
    }

    /// Append a summary, dropping the oldest ones past the limit
    pub fn save_session_stats(&self, summary: SessionSummary) {
        let mut history = self.session_history();
        history.push(summary);
        if history.len() > HISTORY_LIMIT {
            let excess = history.len() - HISTORY_LIMIT;
            history.drain(..excess);
        }
        self.kv.set(HISTORY_KEY, &history);
    }

    /// Oldest first
    pub fn session_history(&self) -> Vec<SessionSummary> {
        self.kv.get(HISTORY_KEY).unwrap_or_default()
    }

    pub fn clear_history(&self) {
        self.kv.remove(HISTORY_KEY);
    }

    /// Remember the latest outcome for a card across sessions
    pub fn save_progress(&self, card_id: &str, is_correct: bool) {
        let mut progress = self.progress();
        progress.insert(card_id.to_string(), is_correct);
        self.kv.set(PROGRESS_KEY, &progress);
    }

    pub fn progress(&self) -> BTreeMap<String, bool> {
        self.kv.get(PROGRESS_KEY).unwrap_or_default()
    }

    pub fn dark_mode(&self) -> bool {
        self.kv.get(DARK_MODE_KEY).unwrap_or(true)
    }

    pub fn set_dark_mode(&self, dark: bool) {
        self.kv.set(DARK_MODE_KEY, &dark);
    }
}
