//! JSON file store behind the community service.
//!
//! The whole message list lives in one pretty-printed JSON array and is rewritten on every
//! change. All file access goes through a single async mutex, so concurrent requests in
//! this process are applied one after another and none of their updates are lost. Two
//! processes sharing one file are not coordinated.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tokio::sync::Mutex;

use super::{unique_timestamp, validate_message};
use crate::errors::AppError;
use crate::models::{seed_messages, CommunityMessage, CreateMessageRequest};
use crate::storage::Clock;

pub struct MessageFile {
    path: PathBuf,
    clock: Arc<dyn Clock>,
    lock: Mutex<()>,
}

impl MessageFile {
    /// Open the file at `path`, creating it with the seed messages when absent.
    pub async fn open(path: &Path, clock: Arc<dyn Clock>) -> Result<Self, AppError> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }

        let file = Self {
            path: path.to_path_buf(),
            clock,
            lock: Mutex::new(()),
        };

        if !tokio::fs::try_exists(&file.path).await? {
            let seeds = seed_messages(file.clock.now().timestamp_millis());
            file.write(&seeds).await?;
            tracing::info!("Created message file {:?} with {} seed messages", file.path, seeds.len());
        }

        Ok(file)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn read(&self) -> Result<Vec<CommunityMessage>, AppError> {
        let raw = tokio::fs::read_to_string(&self.path).await?;
        Ok(serde_json::from_str(&raw)?)
    }

    /// Replace the file contents via a temporary file and rename.
    async fn write(&self, messages: &[CommunityMessage]) -> Result<(), AppError> {
        let raw = serde_json::to_string_pretty(messages)?;
        let tmp = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp, raw).await?;
        tokio::fs::rename(&tmp, &self.path).await?;
        Ok(())
    }

    pub async fn list(&self) -> Result<Vec<CommunityMessage>, AppError> {
        let _guard = self.lock.lock().await;
        self.read().await
    }

    pub async fn create(&self, request: &CreateMessageRequest) -> Result<CommunityMessage, AppError> {
        let author = request.author.trim();
        if author.is_empty() {
            return Err(AppError::Validation("Author is required".to_string()));
        }
        let text = validate_message(&request.message)?;

        let _guard = self.lock.lock().await;
        let mut messages = self.read().await?;

        let timestamp = unique_timestamp(&messages, self.clock.now().timestamp_millis());
        let message = CommunityMessage::new(author, request.initials.trim(), text, timestamp);
        messages.insert(0, message.clone());
        self.write(&messages).await?;

        tracing::info!("Message {} posted by {}", message.id, message.author);
        Ok(message)
    }

    pub async fn toggle_like(&self, id: &str, user_id: &str) -> Result<CommunityMessage, AppError> {
        let user_id = user_id.trim();
        if user_id.is_empty() {
            return Err(AppError::Validation("userId is required".to_string()));
        }

        let _guard = self.lock.lock().await;
        let mut messages = self.read().await?;

        let message = messages
            .iter_mut()
            .find(|m| m.id == id)
            .ok_or_else(|| AppError::NotFound(format!("Message {} not found", id)))?;
        message.toggle_like(user_id);
        let updated = message.clone();
        self.write(&messages).await?;

        Ok(updated)
    }
}
