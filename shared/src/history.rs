//! Recent search queries, most recent first.

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::config::DEFAULT_HISTORY_LIMIT;

/// Ordered, duplicate-free and bounded by `limit`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchHistory {
    entries: Vec<String>,
    limit: usize,
}

impl Default for SearchHistory {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_LIMIT)
    }
}

impl SearchHistory {
    pub fn new(limit: usize) -> Self {
        Self {
            entries: Vec::with_capacity(limit),
            limit: limit.max(1),
        }
    }

    /// Builds a history from arbitrary entries, dropping later duplicates and
    /// anything past `limit`.
    pub fn from_entries(entries: impl IntoIterator<Item = String>, limit: usize) -> Self {
        let mut history = Self::new(limit);
        for entry in entries {
            if history.entries.len() == history.limit {
                break;
            }
            if !history.entries.contains(&entry) {
                history.entries.push(entry);
            }
        }
        history
    }

    /// Parses the stored JSON list. Missing or unreadable values give an empty
    /// history.
    pub fn from_stored(raw: Option<&[u8]>, limit: usize) -> Self {
        let Some(raw) = raw else {
            return Self::new(limit);
        };

        match serde_json::from_slice::<Vec<String>>(raw) {
            Ok(entries) => Self::from_entries(entries, limit),
            Err(e) => {
                warn!(error = %e, "stored search history is unreadable, starting empty");
                Self::new(limit)
            }
        }
    }

    /// Moves `query` to the front, dropping its previous occurrence and the
    /// oldest entry past the limit.
    pub fn record(&mut self, query: &str) {
        self.entries.retain(|entry| entry != query);
        self.entries.insert(0, query.to_string());
        self.entries.truncate(self.limit);
    }

    pub fn to_stored(&self) -> Result<Vec<u8>, serde_json::Error> {
        serde_json::to_vec(&self.entries)
    }

    pub fn set_limit(&mut self, limit: usize) {
        self.limit = limit.max(1);
        self.entries.truncate(self.limit);
    }

    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
