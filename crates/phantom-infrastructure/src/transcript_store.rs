//! File-backed provider transcript (`chat_history.json`).
//!
//! The transcript only exists to re-seed the chat handle after a reload.
//! Absent or invalid data means "start fresh", never an error.

use crate::storage::json_file::{load_json, save_json};
use async_trait::async_trait;
use phantom_core::Result;
use phantom_core::chat::{ChatTurn, TranscriptRepository};
use std::path::PathBuf;

/// JSON-file implementation of [`TranscriptRepository`].
pub struct FileTranscriptStore {
    path: PathBuf,
}

impl FileTranscriptStore {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }
}

#[async_trait]
impl TranscriptRepository for FileTranscriptStore {
    async fn load(&self) -> Option<Vec<ChatTurn>> {
        match load_json::<Vec<ChatTurn>>(&self.path).await {
            Ok(turns) => turns,
            Err(e) => {
                tracing::warn!("stored transcript unreadable ({}), starting fresh", e);
                None
            }
        }
    }

    async fn save(&self, turns: &[ChatTurn]) -> Result<()> {
        save_json(&self.path, &turns).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_absent_transcript_starts_fresh() {
        let dir = TempDir::new().unwrap();
        let store = FileTranscriptStore::new(dir.path().join("chat_history.json"));
        assert!(store.load().await.is_none());
    }

    #[tokio::test]
    async fn test_invalid_transcript_starts_fresh() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("chat_history.json");
        tokio::fs::write(&path, "\"not a transcript\"").await.unwrap();

        let store = FileTranscriptStore::new(path);
        assert!(store.load().await.is_none());
    }

    #[tokio::test]
    async fn test_transcript_round_trip() {
        let dir = TempDir::new().unwrap();
        let store = FileTranscriptStore::new(dir.path().join("chat_history.json"));

        let turns = vec![ChatTurn::user("hello"), ChatTurn::model("hi \u{1f47b}")];
        store.save(&turns).await.unwrap();
        assert_eq!(store.load().await, Some(turns));
    }
}
