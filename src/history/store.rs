//! JSON file storage for history items

use std::path::{Path, PathBuf};

use chrono::Utc;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::generation::PodcastContent;

/// File name of the history list inside the data directory
pub const HISTORY_FILE: &str = "podcast_history.json";

/// One generated script, as remembered for later reuse
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryItem {
    /// Creation time in milliseconds, as a string
    pub id: String,
    /// Creation time in milliseconds since the Unix epoch
    pub timestamp: i64,
    pub book_name: String,
    pub content: PodcastContent,
}

#[derive(Debug, Error)]
pub enum HistoryError {
    #[error("History I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("History encoding failed: {0}")]
    Json(#[from] serde_json::Error),
}

/// History list bound to `<dir>/podcast_history.json`
#[derive(Debug)]
pub struct HistoryStore {
    path: PathBuf,
    items: Vec<HistoryItem>,
}

impl HistoryStore {
    /// Bind to the history file in `dir`; nothing is read until [`load`](Self::load)
    pub fn open(dir: impl AsRef<Path>) -> Self {
        Self {
            path: dir.as_ref().join(HISTORY_FILE),
            items: Vec::new(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the file, replacing the in-memory list.
    ///
    /// A missing file is an empty history. So is a file that does not parse;
    /// it is logged and will be overwritten by the next save.
    pub async fn load(&mut self) -> Result<&[HistoryItem], HistoryError> {
        let raw = match tokio::fs::read(&self.path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                self.items.clear();
                return Ok(&self.items);
            }
            Err(e) => return Err(e.into()),
        };

        self.items = match serde_json::from_slice(&raw) {
            Ok(items) => items,
            Err(e) => {
                tracing::warn!(path = %self.path.display(), error = %e, "Discarding unreadable history");
                Vec::new()
            }
        };

        tracing::debug!(count = self.items.len(), "Loaded history");
        Ok(&self.items)
    }

    /// Write the whole list
    pub async fn save(&self) -> Result<(), HistoryError> {
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        let json = serde_json::to_vec_pretty(&self.items)?;
        tokio::fs::write(&self.path, json).await?;
        Ok(())
    }

    /// Prepend a new item and save
    pub async fn record(
        &mut self,
        content: PodcastContent,
        book_name: &str,
    ) -> Result<HistoryItem, HistoryError> {
        let mut timestamp = Utc::now().timestamp_millis();
        // ids are millisecond stamps; keep them unique within a burst
        if let Some(newest) = self.items.first() {
            if newest.timestamp >= timestamp {
                timestamp = newest.timestamp + 1;
            }
        }

        let item = HistoryItem {
            id: timestamp.to_string(),
            timestamp,
            book_name: book_name.to_string(),
            content,
        };
        self.items.insert(0, item.clone());
        self.save().await?;

        tracing::info!(id = %item.id, book_name, "Recorded history item");
        Ok(item)
    }

    /// Drop the item with `id` and save. Returns whether it existed.
    pub async fn remove(&mut self, id: &str) -> Result<bool, HistoryError> {
        let before = self.items.len();
        self.items.retain(|item| item.id != id);
        let removed = self.items.len() != before;
        self.save().await?;
        Ok(removed)
    }

    /// Items, newest first
    pub fn items(&self) -> &[HistoryItem] {
        &self.items
    }

    pub fn get(&self, id: &str) -> Option<&HistoryItem> {
        self.items.iter().find(|item| item.id == id)
    }
}
