//! File-backed conversation log snapshot (`messages.json`).

use crate::storage::json_file::{load_json, remove_if_exists, save_json};
use async_trait::async_trait;
use phantom_core::Result;
use phantom_core::conversation::MessageRepository;
use phantom_core::message::Message;
use std::path::PathBuf;

/// JSON-file implementation of [`MessageRepository`].
pub struct FileMessageStore {
    path: PathBuf,
}

impl FileMessageStore {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }
}

#[async_trait]
impl MessageRepository for FileMessageStore {
    async fn save(&self, log: &[Message]) -> Result<()> {
        save_json(&self.path, &log).await
    }

    async fn load(&self) -> Vec<Message> {
        match load_json::<Vec<Message>>(&self.path).await {
            Ok(Some(log)) => log,
            Ok(None) => Vec::new(),
            Err(e) => {
                tracing::warn!("message log unreadable ({}), clearing it", e);
                if let Err(e) = remove_if_exists(&self.path).await {
                    tracing::warn!("failed to clear corrupt message log: {}", e);
                }
                Vec::new()
            }
        }
    }
}
