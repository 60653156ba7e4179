//! Storage key naming.
//!
//! Per-user collections live under `"{user_id}_{suffix}"`; device-wide values use the
//! `flowhivee_` prefix.

pub const LESSON_PROGRESS: &str = "lessonProgress";
pub const QUIZ_RESULTS: &str = "quizResults";
pub const USER_STATS: &str = "userStats";
pub const USER_SETTINGS: &str = "userSettings";
pub const TRAINING_PROGRESS: &str = "trainingProgress";

/// Suffixes of the four per-student collections.
pub const STUDENT_SUFFIXES: [&str; 4] = [LESSON_PROGRESS, QUIZ_RESULTS, USER_STATS, USER_SETTINGS];

pub const COMMUNITY_MESSAGES: &str = "flowhivee_communityMessages";
pub const COMMUNITY_USER: &str = "flowhivee_communityUser";
pub const LANGUAGE: &str = "flowhivee_language";
pub const START_SCREEN_COMPLETED: &str = "flowhivee_startScreenCompleted";
pub const USER_REGISTRY: &str = "flowhivee_userRegistry";
pub const TEACHER_AUTHENTICATED: &str = "flowhivee_teacherAuthenticated";
pub const ADMIN_AUTHENTICATED: &str = "flowhivee_adminAuthenticated";

pub fn user_key(user_id: &str, suffix: &str) -> String {
    format!("{}_{}", user_id, suffix)
}

/// Split a per-student key into its user id, if it ends in one of the student suffixes.
pub fn student_prefix(key: &str) -> Option<&str> {
    if key.starts_with("flowhivee_") {
        return None;
    }
    STUDENT_SUFFIXES.iter().find_map(|suffix| {
        key.strip_suffix(suffix)
            .and_then(|rest| rest.strip_suffix('_'))
            .filter(|id| !id.is_empty())
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_key() {
        assert_eq!(user_key("STU-2024-0001", USER_STATS), "STU-2024-0001_userStats");
    }

    #[test]
    fn test_student_prefix() {
        assert_eq!(student_prefix("STU-2024-0001_userStats"), Some("STU-2024-0001"));
        assert_eq!(student_prefix("ana_maria_quizResults"), Some("ana_maria"));
        assert_eq!(student_prefix("_quizResults"), None);
        assert_eq!(student_prefix("flowhivee_language"), None);
        assert_eq!(student_prefix("t1_trainingProgress"), None);
        assert_eq!(student_prefix("quizResults"), None);
    }
}
