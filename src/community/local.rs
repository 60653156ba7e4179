//! Board stored in the device key-value store.

use std::sync::Arc;

use async_trait::async_trait;

use super::{unique_timestamp, validate_message, MessageBoard};
use crate::errors::AppError;
use crate::models::{seed_messages, CommunityMessage};
use crate::session::CurrentUser;
use crate::storage::{keys, load_json, save_json, Clock, KeyValueStore};

#[derive(Clone)]
pub struct LocalBoard {
    store: Arc<dyn KeyValueStore>,
    clock: Arc<dyn Clock>,
}

impl LocalBoard {
    pub fn new(store: Arc<dyn KeyValueStore>, clock: Arc<dyn Clock>) -> Self {
        Self { store, clock }
    }

    async fn save(&self, messages: &[CommunityMessage]) -> Result<(), AppError> {
        save_json(self.store.as_ref(), keys::COMMUNITY_MESSAGES, messages).await
    }
}

#[async_trait]
impl MessageBoard for LocalBoard {
    async fn get_all_messages(&self) -> Result<Vec<CommunityMessage>, AppError> {
        if let Some(messages) = load_json(self.store.as_ref(), keys::COMMUNITY_MESSAGES).await {
            return Ok(messages);
        }

        let seeds = seed_messages(self.clock.now().timestamp_millis());
        self.save(&seeds).await?;
        Ok(seeds)
    }

    async fn post_message(
        &self,
        user: &CurrentUser,
        text: &str,
    ) -> Result<CommunityMessage, AppError> {
        let text = validate_message(text)?;
        let mut messages = self.get_all_messages().await?;

        let timestamp = unique_timestamp(&messages, self.clock.now().timestamp_millis());
        let message = CommunityMessage::new(&user.name, &user.initials, text, timestamp);
        messages.insert(0, message.clone());
        self.save(&messages).await?;

        Ok(message)
    }

    async fn toggle_like(
        &self,
        user: &CurrentUser,
        message_id: &str,
    ) -> Result<CommunityMessage, AppError> {
        let mut messages = self.get_all_messages().await?;
        let message = messages
            .iter_mut()
            .find(|m| m.id == message_id)
            .ok_or_else(|| AppError::NotFound(format!("Message {} not found", message_id)))?;

        message.toggle_like(&user.id);
        let updated = message.clone();
        self.save(&messages).await?;

        Ok(updated)
    }
}
