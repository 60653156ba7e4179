//! Lesson progress, quiz results and per-user stats.

use std::collections::BTreeSet;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// XP needed to advance one level.
pub const XP_PER_LEVEL: u64 = 500;

/// Level for a given XP total. Level 1 starts at 0 XP.
pub fn level_for_xp(total_xp: u64) -> u32 {
    (total_xp / XP_PER_LEVEL + 1) as u32
}

/// A student's progress through one lesson.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LessonProgress {
    pub lesson_id: u32,
    pub title: String,
    pub subject: String,
    pub completed: bool,
    pub current_section: u32,
    pub total_sections: u32,
    pub last_accessed: DateTime<Utc>,
}

/// Input for a lesson progress upsert; the store stamps `last_accessed`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LessonUpdate {
    pub lesson_id: u32,
    pub title: String,
    pub subject: String,
    #[serde(default)]
    pub completed: bool,
    #[serde(default)]
    pub current_section: u32,
    pub total_sections: u32,
}

/// One quiz attempt. Retakes are separate entries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizResult {
    pub quiz_id: u32,
    pub lesson_id: u32,
    pub title: String,
    pub subject: String,
    /// Percentage, 0..=100
    pub score: u32,
    pub total_questions: u32,
    pub correct_answers: u32,
    pub completed_at: DateTime<Utc>,
}

/// Input for recording a quiz attempt; the store stamps `completed_at`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewQuizResult {
    pub quiz_id: u32,
    pub lesson_id: u32,
    pub title: String,
    pub subject: String,
    pub score: u32,
    pub total_questions: u32,
    pub correct_answers: u32,
}

/// Per-user XP, level, streak and badges.
///
/// `level` is always `level_for_xp(total_xp)`; mutate XP through [`UserStats::add_xp`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserStats {
    #[serde(default, rename = "totalXP")]
    pub total_xp: u64,
    /// Recomputed from `total_xp` on load, so a missing value is harmless.
    #[serde(default)]
    pub level: u32,
    #[serde(default)]
    pub day_streak: u32,
    #[serde(default)]
    pub last_active_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub badges: BTreeSet<String>,
}

impl Default for UserStats {
    fn default() -> Self {
        Self {
            total_xp: 0,
            level: 1,
            day_streak: 0,
            last_active_date: None,
            badges: BTreeSet::new(),
        }
    }
}

impl UserStats {
    /// Add XP and recompute the level.
    pub fn add_xp(&mut self, amount: u64) {
        self.total_xp = self.total_xp.saturating_add(amount);
        self.level = level_for_xp(self.total_xp);
    }

    /// Re-derive `level` from `total_xp` (used after loading stored records).
    pub fn normalized(mut self) -> Self {
        self.level = level_for_xp(self.total_xp);
        self
    }
}

/// Completion percentage of one subject.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubjectProgress {
    pub subject: String,
    pub completed: usize,
    pub total: usize,
    pub percentage: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ActivityKind {
    Lesson,
    Quiz,
}

/// One row of the recent activity feed.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityItem {
    pub kind: ActivityKind,
    pub title: String,
    pub subject: String,
    pub detail: String,
    pub timestamp: DateTime<Utc>,
    pub date_label: String,
}

/// Human label for the calendar distance between `date` and `today`.
pub fn relative_date_label(date: NaiveDate, today: NaiveDate) -> String {
    match (today - date).num_days() {
        0 => "Today".to_string(),
        1 => "Yesterday".to_string(),
        n @ 2..=6 => format!("{} days ago", n),
        _ => date.format("%Y-%m-%d").to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_formula() {
        assert_eq!(level_for_xp(0), 1);
        assert_eq!(level_for_xp(499), 1);
        assert_eq!(level_for_xp(500), 2);
        assert_eq!(level_for_xp(1234), 3);
    }

    #[test]
    fn test_level_tracks_xp_across_additions() {
        let mut stats = UserStats::default();
        for amount in [0, 100, 399, 1, 0, 1000, 7, 493] {
            stats.add_xp(amount);
            assert_eq!(stats.level as u64, stats.total_xp / 500 + 1);
        }
        assert_eq!(stats.total_xp, 2000);
        assert_eq!(stats.level, 5);
    }

    #[test]
    fn test_normalized_repairs_drifted_level() {
        let stats = UserStats {
            total_xp: 1600,
            level: 1,
            ..UserStats::default()
        };
        assert_eq!(stats.normalized().level, 4);
    }

    #[test]
    fn test_stats_serialize_with_xp_key() {
        let value = serde_json::to_value(UserStats::default()).unwrap();
        assert_eq!(value["totalXP"], 0);
        assert_eq!(value["dayStreak"], 0);
        assert_eq!(value["level"], 1);
    }

    #[test]
    fn test_relative_date_labels() {
        let today = NaiveDate::from_ymd_opt(2024, 3, 10).unwrap();
        let label = |d: u32| relative_date_label(NaiveDate::from_ymd_opt(2024, 3, d).unwrap(), today);

        assert_eq!(label(10), "Today");
        assert_eq!(label(9), "Yesterday");
        assert_eq!(label(5), "5 days ago");
        assert_eq!(label(1), "2024-03-01");
    }
}
