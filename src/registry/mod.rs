//! User registry index.
//!
//! Rosters are built from this explicit list instead of guessing users from key names.
//! [`UserRegistry::rebuild_from_keys`] imports data written before the index existed.

use std::collections::BTreeSet;
use std::sync::Arc;

use crate::errors::AppError;
use crate::models::{RegisteredUser, UserRole};
use crate::storage::{keys, load_json, save_json, Clock, KeyValueStore};

#[derive(Clone)]
pub struct UserRegistry {
    store: Arc<dyn KeyValueStore>,
    clock: Arc<dyn Clock>,
}

impl UserRegistry {
    pub fn new(store: Arc<dyn KeyValueStore>, clock: Arc<dyn Clock>) -> Self {
        Self { store, clock }
    }

    /// All registered users in registration order.
    pub async fn users(&self) -> Vec<RegisteredUser> {
        load_json(self.store.as_ref(), keys::USER_REGISTRY)
            .await
            .unwrap_or_default()
    }

    /// Add a user if not already present. Returns true when newly registered.
    pub async fn register(&self, user_id: &str, role: UserRole) -> Result<bool, AppError> {
        let user_id = user_id.trim();
        if user_id.is_empty() {
            return Err(AppError::Validation("User id is required".to_string()));
        }

        let mut users = self.users().await;
        if users.iter().any(|u| u.id == user_id && u.role == role) {
            return Ok(false);
        }

        users.push(RegisteredUser {
            id: user_id.to_string(),
            role,
            registered_at: self.clock.now(),
        });
        save_json(self.store.as_ref(), keys::USER_REGISTRY, &users).await?;

        tracing::info!("Registered {:?} {}", role, user_id);
        Ok(true)
    }

    pub async fn student_ids(&self) -> Vec<String> {
        self.ids_with_role(UserRole::Student).await
    }

    pub async fn teacher_ids(&self) -> Vec<String> {
        self.ids_with_role(UserRole::Teacher).await
    }

    async fn ids_with_role(&self, role: UserRole) -> Vec<String> {
        self.users()
            .await
            .into_iter()
            .filter(|u| u.role == role)
            .map(|u| u.id)
            .collect()
    }

    /// Register every student whose collections exist in the store but not in the index.
    ///
    /// Matches keys against the per-student suffixes and registers the distinct prefixes
    /// in sorted order. Returns how many were added.
    pub async fn rebuild_from_keys(&self) -> Result<usize, AppError> {
        let discovered: BTreeSet<String> = self
            .store
            .keys()
            .await?
            .iter()
            .filter_map(|key| keys::student_prefix(key))
            .map(str::to_string)
            .collect();

        let mut added = 0;
        for user_id in &discovered {
            if self.register(user_id, UserRole::Student).await? {
                added += 1;
            }
        }

        tracing::info!(
            "Registry rebuild found {} students, {} new",
            discovered.len(),
            added
        );
        Ok(added)
    }
}
