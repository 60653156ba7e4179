//! Per-user profile settings.

use serde::{Deserialize, Serialize};

/// Initials used when a name yields none.
pub const FALLBACK_INITIALS: &str = "ST";

/// First letter of each word, uppercased, at most two characters.
pub fn derive_initials(name: &str) -> String {
    let initials: String = name
        .split_whitespace()
        .filter_map(|word| word.chars().next())
        .flat_map(char::to_uppercase)
        .take(2)
        .collect();

    if initials.is_empty() {
        FALLBACK_INITIALS.to_string()
    } else {
        initials
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationSettings {
    pub lesson_reminders: bool,
    pub quiz_results: bool,
    pub community_replies: bool,
    pub weekly_report: bool,
}

impl Default for NotificationSettings {
    fn default() -> Self {
        Self {
            lesson_reminders: true,
            quiz_results: true,
            community_replies: true,
            weekly_report: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PrivacySettings {
    pub show_profile: bool,
    pub share_progress: bool,
}

impl Default for PrivacySettings {
    fn default() -> Self {
        Self {
            show_profile: true,
            share_progress: false,
        }
    }
}

/// A user's profile. `student_id` never changes once generated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserSettings {
    pub name: String,
    pub initials: String,
    #[serde(default)]
    pub email: String,
    pub student_id: String,
    #[serde(default)]
    pub notifications: NotificationSettings,
    #[serde(default)]
    pub privacy: PrivacySettings,
}
