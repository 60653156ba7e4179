//! Community message board.
//!
//! The board runs against the device key-value store ([`LocalBoard`]) unless a community
//! service URL is configured, in which case the same operations go over HTTP
//! ([`RemoteBoard`]). The service itself keeps messages in a JSON file ([`MessageFile`]).

mod file;
mod local;
mod remote;

pub use file::*;
pub use local::*;
pub use remote::*;

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::watch;

use crate::analytics::{spawn_refresh, RefreshHandle, RELATIVE_TIME_REFRESH};
use crate::config::Config;
use crate::errors::AppError;
use crate::models::{format_relative_time, CommunityMessage};
use crate::session::CurrentUser;
use crate::storage::{Clock, KeyValueStore};

#[async_trait]
pub trait MessageBoard: Send + Sync {
    /// All messages, newest first.
    async fn get_all_messages(&self) -> Result<Vec<CommunityMessage>, AppError>;

    /// Post `text` as `user`; the new message goes to the front of the board.
    async fn post_message(
        &self,
        user: &CurrentUser,
        text: &str,
    ) -> Result<CommunityMessage, AppError>;

    /// Like or unlike a message on behalf of `user`.
    async fn toggle_like(
        &self,
        user: &CurrentUser,
        message_id: &str,
    ) -> Result<CommunityMessage, AppError>;
}

/// The board selected by configuration: remote when a service URL is set, local otherwise.
pub fn board_from_config(
    config: &Config,
    store: Arc<dyn KeyValueStore>,
    clock: Arc<dyn Clock>,
) -> Arc<dyn MessageBoard> {
    match &config.community_api_base {
        Some(base) => {
            tracing::info!("Community board in remote mode via {}", base);
            Arc::new(RemoteBoard::new(base))
        }
        None => Arc::new(LocalBoard::new(store, clock)),
    }
}

/// Trimmed message text, or a validation error when nothing is left.
pub fn validate_message(text: &str) -> Result<&str, AppError> {
    let text = text.trim();
    if text.is_empty() {
        return Err(AppError::Validation("Message cannot be empty".to_string()));
    }
    Ok(text)
}

/// Fill in each message's `time` label relative to `now_ms`.
pub fn with_relative_times(mut messages: Vec<CommunityMessage>, now_ms: i64) -> Vec<CommunityMessage> {
    for message in &mut messages {
        message.time = Some(format_relative_time(message.timestamp, now_ms));
    }
    messages
}

/// Keep a labelled listing of `board` current, re-read every [`RELATIVE_TIME_REFRESH`].
///
/// A failed read is logged and the previous listing stays in place. Dropping the handle
/// stops the refresh.
pub fn watch_messages(
    board: Arc<dyn MessageBoard>,
    clock: Arc<dyn Clock>,
) -> (RefreshHandle, watch::Receiver<Vec<CommunityMessage>>) {
    let (tx, rx) = watch::channel(Vec::new());
    let tx = Arc::new(tx);

    let handle = spawn_refresh(RELATIVE_TIME_REFRESH, move || {
        let board = board.clone();
        let clock = clock.clone();
        let tx = tx.clone();
        async move {
            match board.get_all_messages().await {
                Ok(messages) => {
                    let now_ms = clock.now().timestamp_millis();
                    tx.send_replace(with_relative_times(messages, now_ms));
                }
                Err(e) => tracing::warn!("Community board refresh failed: {}", e),
            }
        }
    });

    (handle, rx)
}

/// Creation timestamp for a new message, moved forward past any id already on the board.
fn unique_timestamp(messages: &[CommunityMessage], now_ms: i64) -> i64 {
    let mut timestamp = now_ms;
    while messages.iter().any(|m| m.id == timestamp.to_string()) {
        timestamp += 1;
    }
    timestamp
}
