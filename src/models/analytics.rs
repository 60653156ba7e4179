//! Roster and system-wide analytics views.

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;

use super::{LessonProgress, QuizResult, UserSettings, UserStats};

/// Everything stored for one student, with defaults for absent collections.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentRecord {
    pub user_id: String,
    pub name: String,
    pub settings: Option<UserSettings>,
    pub lessons: Vec<LessonProgress>,
    pub quizzes: Vec<QuizResult>,
    pub stats: UserStats,
    /// Latest of lesson access, quiz completion and the stats' last active date
    pub last_active: Option<DateTime<Utc>>,
}

impl StudentRecord {
    pub fn completed_lessons(&self) -> usize {
        self.lessons.iter().filter(|l| l.completed).count()
    }

    /// Mean quiz score, `None` without quizzes.
    pub fn average_score(&self) -> Option<f64> {
        if self.quizzes.is_empty() {
            return None;
        }
        let total: u64 = self.quizzes.iter().map(|q| q.score as u64).sum();
        Some(total as f64 / self.quizzes.len() as f64)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SystemStats {
    pub total_students: usize,
    pub total_teachers: usize,
    /// Sum of per-student lesson records, not catalogue size
    pub total_lessons: usize,
    pub completed_lessons: usize,
    /// Percent, 0 when there are no lessons
    pub completion_rate: f64,
    pub total_quizzes: usize,
    /// Mean over every quiz score of every student, 0 when there are none
    pub average_quiz_score: f64,
    /// Students active within the last 7 days
    pub active_students: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyEngagement {
    pub date: NaiveDate,
    /// Short weekday name, e.g. "Mon"
    pub label: String,
    pub lessons: usize,
    pub quizzes: usize,
    pub total: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubjectPerformance {
    pub subject: String,
    pub completion_rate: f64,
    pub average_score: f64,
    pub lesson_count: usize,
    pub quiz_count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaderboardEntry {
    pub rank: usize,
    pub user_id: String,
    pub name: String,
    #[serde(rename = "totalXP")]
    pub total_xp: u64,
    pub level: u32,
    pub day_streak: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AtRiskStudent {
    pub user_id: String,
    pub name: String,
    /// First matching condition: inactivity, then low score, then low progress
    pub reason: String,
    pub last_active: Option<DateTime<Utc>>,
    pub average_score: Option<f64>,
    pub completed_lessons: usize,
}
