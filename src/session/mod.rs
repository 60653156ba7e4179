//! The signed-in student for this device.
//!
//! The current user is resolved once, when a [`Session`] opens, and handed explicitly to
//! anything that attributes actions to a person (community posts and likes).

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::errors::AppError;
use crate::models::{derive_initials, CommunityUser, UserRole, UserSettings};
use crate::progress::ProgressStore;
use crate::registry::UserRegistry;
use crate::settings::{SettingsStore, DEFAULT_NAME};
use crate::storage::{keys, load_json, Clock, KeyValueStore};

/// Who is acting right now.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CurrentUser {
    pub id: String,
    pub name: String,
    pub initials: String,
}

/// Resolve the display identity for `user_id`.
///
/// Uses the user's stored settings when they carry a name, then the device's community
/// identity, then the default student name.
pub async fn resolve_current_user(store: &dyn KeyValueStore, user_id: &str) -> CurrentUser {
    let settings_key = keys::user_key(user_id, keys::USER_SETTINGS);
    let settings = load_json::<UserSettings>(store, &settings_key).await;
    if let Some(settings) = settings.filter(|s| !s.name.trim().is_empty()) {
        return CurrentUser {
            id: user_id.to_string(),
            initials: derive_initials(&settings.name),
            name: settings.name,
        };
    }

    if let Some(identity) = load_json::<CommunityUser>(store, keys::COMMUNITY_USER).await {
        if !identity.name.trim().is_empty() {
            return CurrentUser {
                id: user_id.to_string(),
                name: identity.name,
                initials: identity.initials,
            };
        }
    }

    CurrentUser {
        id: user_id.to_string(),
        name: DEFAULT_NAME.to_string(),
        initials: derive_initials(DEFAULT_NAME),
    }
}

/// A student's stores bundled with their resolved identity.
#[derive(Clone)]
pub struct Session {
    user: CurrentUser,
    progress: ProgressStore,
    settings: SettingsStore,
}

impl Session {
    /// Register `user_id` as a student and resolve who they are.
    pub async fn open(
        store: Arc<dyn KeyValueStore>,
        clock: Arc<dyn Clock>,
        user_id: &str,
    ) -> Result<Self, AppError> {
        let user_id = user_id.trim();
        UserRegistry::new(store.clone(), clock.clone())
            .register(user_id, UserRole::Student)
            .await?;

        let user = resolve_current_user(store.as_ref(), user_id).await;
        tracing::info!("Opened session for {} ({})", user.id, user.name);

        Ok(Self {
            progress: ProgressStore::new(store.clone(), clock, user_id),
            settings: SettingsStore::new(store, user_id),
            user,
        })
    }

    pub fn user(&self) -> &CurrentUser {
        &self.user
    }

    pub fn progress(&self) -> &ProgressStore {
        &self.progress
    }

    pub fn settings(&self) -> &SettingsStore {
        &self.settings
    }

    /// Rename the user and refresh the session identity.
    pub async fn rename(&mut self, name: &str) -> Result<&CurrentUser, AppError> {
        let saved = self.settings.update_user_name(name).await?;
        self.user.name = saved.name;
        self.user.initials = saved.initials;
        Ok(&self.user)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{save_json, FixedClock, MemoryStore};
    use chrono::{TimeZone, Utc};

    fn clock() -> Arc<FixedClock> {
        Arc::new(FixedClock::new(Utc.with_ymd_and_hms(2024, 6, 3, 9, 0, 0).unwrap()))
    }

    #[tokio::test]
    async fn test_resolution_prefers_settings() {
        let store = MemoryStore::new();
        save_json(
            &store,
            keys::COMMUNITY_USER,
            &CommunityUser {
                id: "other".into(),
                name: "Device Owner".into(),
                initials: "DO".into(),
            },
        )
        .await
        .unwrap();
        let profile_store: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new());
        SettingsStore::new(profile_store.clone(), "u1")
            .update_user_name("Nia Bello")
            .await
            .unwrap();

        let user = resolve_current_user(profile_store.as_ref(), "u1").await;
        assert_eq!(user.name, "Nia Bello");
        assert_eq!(user.initials, "NB");

        let user = resolve_current_user(&store, "u1").await;
        assert_eq!(user.name, "Device Owner");
        assert_eq!(user.initials, "DO");
        assert_eq!(user.id, "u1");
    }

    #[tokio::test]
    async fn test_resolution_falls_back_to_default() {
        let store = MemoryStore::new();
        let user = resolve_current_user(&store, "u2").await;
        assert_eq!(
            user,
            CurrentUser {
                id: "u2".into(),
                name: "Student".into(),
                initials: "S".into()
            }
        );
    }

    #[tokio::test]
    async fn test_default_identity_matches_default_settings() {
        let store: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new());
        let fallback = resolve_current_user(store.as_ref(), "u4").await;

        let defaults = SettingsStore::new(store.clone(), "u4").load().await;
        let from_settings = resolve_current_user(store.as_ref(), "u4").await;

        assert_eq!(defaults.initials, fallback.initials);
        assert_eq!(from_settings, fallback);
    }

    #[tokio::test]
    async fn test_open_registers_student() {
        let store: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new());
        let session = Session::open(store.clone(), clock(), "STU-2024-0311").await.unwrap();

        assert_eq!(session.user().id, "STU-2024-0311");
        assert_eq!(session.progress().user_id(), "STU-2024-0311");

        let registry = UserRegistry::new(store, clock());
        assert_eq!(registry.student_ids().await, vec!["STU-2024-0311"]);
    }

    #[tokio::test]
    async fn test_rename_updates_identity() {
        let store: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new());
        let mut session = Session::open(store.clone(), clock(), "u3").await.unwrap();

        session.rename("Tendai Moyo").await.unwrap();
        assert_eq!(session.user().name, "Tendai Moyo");
        assert_eq!(session.user().initials, "TM");

        let reopened = Session::open(store, clock(), "u3").await.unwrap();
        assert_eq!(reopened.user().name, "Tendai Moyo");
    }
}
