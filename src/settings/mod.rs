//! Settings store and device preferences.
//!
//! Saving a profile also rewrites the device's community identity, so posts made after a
//! name change carry the new name.

use std::sync::Arc;

use crate::errors::AppError;
use crate::models::{
    derive_initials, CommunityUser, NotificationSettings, PrivacySettings, UserSettings,
};
use crate::storage::{keys, load_json, save_json, KeyValueStore};

/// Display name given to profiles that have not set one.
pub const DEFAULT_NAME: &str = "Student";

/// Language used until the user picks one.
pub const DEFAULT_LANGUAGE: &str = "en";

/// A fresh identifier of the form `STU-2024-NNNN`.
pub fn generate_student_id() -> String {
    let n = uuid::Uuid::new_v4().as_u128() % 10_000;
    format!("STU-2024-{:04}", n)
}

fn is_student_id(id: &str) -> bool {
    id.strip_prefix("STU-2024-")
        .is_some_and(|digits| digits.len() == 4 && digits.chars().all(|c| c.is_ascii_digit()))
}

#[derive(Clone)]
pub struct SettingsStore {
    store: Arc<dyn KeyValueStore>,
    user_id: String,
}

impl SettingsStore {
    pub fn new(store: Arc<dyn KeyValueStore>, user_id: impl Into<String>) -> Self {
        Self {
            store,
            user_id: user_id.into(),
        }
    }

    fn key(&self) -> String {
        keys::user_key(&self.user_id, keys::USER_SETTINGS)
    }

    /// The user id when it is already a student id, otherwise a fresh one.
    fn new_student_id(&self) -> String {
        if is_student_id(&self.user_id) {
            self.user_id.clone()
        } else {
            generate_student_id()
        }
    }

    /// The stored profile, without creating defaults.
    pub async fn stored(&self) -> Option<UserSettings> {
        load_json(self.store.as_ref(), &self.key()).await
    }

    /// The profile, persisting defaults on first read.
    pub async fn load(&self) -> UserSettings {
        if let Some(settings) = self.stored().await {
            return settings;
        }

        let defaults = UserSettings {
            name: DEFAULT_NAME.to_string(),
            initials: derive_initials(DEFAULT_NAME),
            email: String::new(),
            student_id: self.new_student_id(),
            notifications: NotificationSettings::default(),
            privacy: PrivacySettings::default(),
        };
        if let Err(e) = save_json(self.store.as_ref(), &self.key(), &defaults).await {
            tracing::warn!("Could not persist default settings for {}: {}", self.user_id, e);
        }
        defaults
    }

    /// Write the profile. Initials are re-derived from the name and the student id
    /// already on record is kept.
    pub async fn save(&self, mut settings: UserSettings) -> Result<UserSettings, AppError> {
        if let Some(existing) = self.stored().await {
            settings.student_id = existing.student_id;
        } else if settings.student_id.trim().is_empty() {
            settings.student_id = self.new_student_id();
        }
        settings.initials = derive_initials(&settings.name);

        save_json(self.store.as_ref(), &self.key(), &settings).await?;

        let identity = CommunityUser {
            id: self.user_id.clone(),
            name: settings.name.clone(),
            initials: settings.initials.clone(),
        };
        save_json(self.store.as_ref(), keys::COMMUNITY_USER, &identity).await?;

        Ok(settings)
    }

    pub async fn update_user_name(&self, name: &str) -> Result<UserSettings, AppError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(AppError::Validation("Name is required".to_string()));
        }

        let mut settings = self.load().await;
        settings.name = name.to_string();
        let saved = self.save(settings).await?;
        tracing::info!("{} is now {}", self.user_id, saved.name);
        Ok(saved)
    }
}

/// Device-wide preferences shared by every user of the browser profile.
#[derive(Clone)]
pub struct Preferences {
    store: Arc<dyn KeyValueStore>,
}

impl Preferences {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    pub async fn language(&self) -> String {
        load_json(self.store.as_ref(), keys::LANGUAGE)
            .await
            .unwrap_or_else(|| DEFAULT_LANGUAGE.to_string())
    }

    pub async fn set_language(&self, language: &str) -> Result<(), AppError> {
        let language = language.trim();
        if language.is_empty() {
            return Err(AppError::Validation("Language is required".to_string()));
        }
        save_json(self.store.as_ref(), keys::LANGUAGE, language).await
    }

    pub async fn start_screen_completed(&self) -> bool {
        load_json(self.store.as_ref(), keys::START_SCREEN_COMPLETED)
            .await
            .unwrap_or(false)
    }

    pub async fn mark_start_screen_completed(&self) -> Result<(), AppError> {
        save_json(self.store.as_ref(), keys::START_SCREEN_COMPLETED, &true).await
    }
}
