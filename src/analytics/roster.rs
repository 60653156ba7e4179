//! Per-student record assembly for the teacher dashboard.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::watch;

use super::{admin, spawn_refresh, RefreshHandle, DASHBOARD_REFRESH};
use crate::models::{
    AtRiskStudent, DailyEngagement, LeaderboardEntry, LessonProgress, QuizResult,
    StudentRecord, SubjectPerformance, SystemStats, UserSettings, UserStats,
};
use crate::registry::UserRegistry;
use crate::storage::{keys, load_json, Clock, KeyValueStore};

/// Number of students shown on the admin leaderboard.
pub const LEADERBOARD_SIZE: usize = 10;

/// Everything the admin dashboard shows, computed in one pass.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminOverview {
    pub stats: SystemStats,
    pub engagement: Vec<DailyEngagement>,
    pub subjects: Vec<SubjectPerformance>,
    pub leaderboard: Vec<LeaderboardEntry>,
    pub at_risk: Vec<AtRiskStudent>,
}

#[derive(Clone)]
pub struct Roster {
    store: Arc<dyn KeyValueStore>,
    clock: Arc<dyn Clock>,
    registry: UserRegistry,
}

impl Roster {
    pub fn new(store: Arc<dyn KeyValueStore>, clock: Arc<dyn Clock>) -> Self {
        Self {
            registry: UserRegistry::new(store.clone(), clock.clone()),
            store,
            clock,
        }
    }

    /// Every registered student id, in registration order.
    pub async fn discover_all_user_ids(&self) -> Vec<String> {
        self.registry.student_ids().await
    }

    /// Load one student's collections; absent ones come back empty.
    pub async fn load_user_data(&self, user_id: &str) -> StudentRecord {
        let store = self.store.as_ref();
        let lessons: Vec<LessonProgress> =
            load_json(store, &keys::user_key(user_id, keys::LESSON_PROGRESS))
                .await
                .unwrap_or_default();
        let quizzes: Vec<QuizResult> =
            load_json(store, &keys::user_key(user_id, keys::QUIZ_RESULTS))
                .await
                .unwrap_or_default();
        let stats = load_json::<UserStats>(store, &keys::user_key(user_id, keys::USER_STATS))
            .await
            .unwrap_or_default()
            .normalized();
        let settings: Option<UserSettings> =
            load_json(store, &keys::user_key(user_id, keys::USER_SETTINGS)).await;

        let last_active = latest_activity(&lessons, &quizzes, &stats);
        let name = settings
            .as_ref()
            .map(|s| s.name.trim())
            .filter(|name| !name.is_empty())
            .unwrap_or(user_id)
            .to_string();

        StudentRecord {
            user_id: user_id.to_string(),
            name,
            settings,
            lessons,
            quizzes,
            stats,
            last_active,
        }
    }

    pub async fn load_all_students(&self) -> Vec<StudentRecord> {
        let mut records = Vec::new();
        for user_id in self.discover_all_user_ids().await {
            records.push(self.load_user_data(&user_id).await);
        }
        records
    }

    pub async fn teacher_count(&self) -> usize {
        self.registry.teacher_ids().await.len()
    }

    /// Recompute every admin view from the current store contents.
    pub async fn admin_overview(&self) -> AdminOverview {
        let now = self.clock.now();
        let records = self.load_all_students().await;
        let teachers = self.teacher_count().await;

        AdminOverview {
            stats: admin::system_stats(&records, teachers, now),
            engagement: admin::engagement_series(&records, now.date_naive()),
            subjects: admin::subject_performance(&records),
            leaderboard: admin::leaderboard(&records, LEADERBOARD_SIZE),
            at_risk: admin::at_risk_students(&records, now),
        }
    }

    /// Keep an admin overview current for a mounted dashboard, recomputed every
    /// [`DASHBOARD_REFRESH`].
    ///
    /// The receiver holds `None` until the first pass completes. Dropping the handle
    /// stops the refresh.
    pub fn watch_overview(&self) -> (RefreshHandle, watch::Receiver<Option<AdminOverview>>) {
        let (tx, rx) = watch::channel(None);
        let tx = Arc::new(tx);
        let roster = self.clone();

        let handle = spawn_refresh(DASHBOARD_REFRESH, move || {
            let roster = roster.clone();
            let tx = tx.clone();
            async move {
                let overview = roster.admin_overview().await;
                tx.send_replace(Some(overview));
            }
        });

        (handle, rx)
    }
}

/// Most recent of lesson access, quiz completion and the stats' own last active date.
fn latest_activity(
    lessons: &[LessonProgress],
    quizzes: &[QuizResult],
    stats: &UserStats,
) -> Option<DateTime<Utc>> {
    lessons
        .iter()
        .map(|l| l.last_accessed)
        .chain(quizzes.iter().map(|q| q.completed_at))
        .chain(stats.last_active_date)
        .max()
}
