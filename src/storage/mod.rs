//! Key-value storage abstraction.
//!
//! Every store in the crate reads and writes JSON text through [`KeyValueStore`], so the
//! persistent SQLite backend and the in-memory backend are interchangeable.

mod clock;
pub mod keys;
mod memory;

pub use clock::*;
pub use memory::*;

use async_trait::async_trait;
use serde::{de::DeserializeOwned, Serialize};

use crate::errors::AppError;

/// String key-value store with key enumeration.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>, AppError>;

    /// Insert or replace a value.
    async fn set(&self, key: &str, value: &str) -> Result<(), AppError>;

    async fn remove(&self, key: &str) -> Result<(), AppError>;

    /// All keys, in insertion order where the backend keeps one.
    async fn keys(&self) -> Result<Vec<String>, AppError>;
}

/// Read and decode a JSON value.
///
/// Missing keys, backend failures and corrupt JSON all yield `None`; callers fall back
/// to defaults.
pub async fn load_json<T: DeserializeOwned>(store: &dyn KeyValueStore, key: &str) -> Option<T> {
    let raw = match store.get(key).await {
        Ok(Some(raw)) => raw,
        Ok(None) => return None,
        Err(e) => {
            tracing::warn!("Failed to read {}: {}", key, e);
            return None;
        }
    };

    match serde_json::from_str(&raw) {
        Ok(value) => Some(value),
        Err(e) => {
            tracing::warn!("Ignoring corrupt value under {}: {}", key, e);
            None
        }
    }
}

/// Encode and write a JSON value.
pub async fn save_json<T: Serialize + ?Sized>(
    store: &dyn KeyValueStore,
    key: &str,
    value: &T,
) -> Result<(), AppError> {
    let raw = serde_json::to_string(value)?;
    store.set(key, &raw).await
}
