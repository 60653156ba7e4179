//! Progress store: lessons, quiz attempts, XP, streaks and badges for one user.
//!
//! Every activity write also advances the day streak. Derived views
//! ([`ProgressStore::subject_progress`], [`ProgressStore::recent_activity`]) are
//! recomputed from the stored collections on each call.

mod streak;

pub use streak::next_streak;

use std::sync::Arc;

use crate::errors::AppError;
use crate::models::{
    relative_date_label, ActivityItem, ActivityKind, LessonProgress, LessonUpdate, NewQuizResult,
    QuizResult, SubjectProgress, UserStats,
};
use crate::storage::{keys, load_json, save_json, Clock, KeyValueStore};

/// Subjects shown on the progress dashboard.
pub const SUBJECTS: [&str; 5] = ["Math", "Science", "English", "History", "Art"];

/// XP awarded for completing a lesson.
pub const LESSON_COMPLETE_XP: u64 = 100;

/// XP awarded for a perfect quiz; partial scores earn a rounded share.
pub const QUIZ_MAX_XP: u64 = 150;

/// Entries returned by [`ProgressStore::recent_activity`].
pub const RECENT_ACTIVITY_LIMIT: usize = 5;

/// XP earned for a quiz score, `round(score / 100 * 150)`.
pub fn quiz_xp(score: u32) -> u64 {
    (score as u64 * QUIZ_MAX_XP + 50) / 100
}

#[derive(Clone)]
pub struct ProgressStore {
    store: Arc<dyn KeyValueStore>,
    clock: Arc<dyn Clock>,
    user_id: String,
}

impl ProgressStore {
    pub fn new(
        store: Arc<dyn KeyValueStore>,
        clock: Arc<dyn Clock>,
        user_id: impl Into<String>,
    ) -> Self {
        Self {
            store,
            clock,
            user_id: user_id.into(),
        }
    }

    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    fn key(&self, suffix: &str) -> String {
        keys::user_key(&self.user_id, suffix)
    }

    pub async fn lessons(&self) -> Vec<LessonProgress> {
        load_json(self.store.as_ref(), &self.key(keys::LESSON_PROGRESS))
            .await
            .unwrap_or_default()
    }

    pub async fn quiz_results(&self) -> Vec<QuizResult> {
        load_json(self.store.as_ref(), &self.key(keys::QUIZ_RESULTS))
            .await
            .unwrap_or_default()
    }

    pub async fn stats(&self) -> UserStats {
        load_json::<UserStats>(self.store.as_ref(), &self.key(keys::USER_STATS))
            .await
            .unwrap_or_default()
            .normalized()
    }

    async fn save_stats(&self, stats: &UserStats) -> Result<(), AppError> {
        save_json(self.store.as_ref(), &self.key(keys::USER_STATS), stats).await
    }

    /// Insert or replace the record for `update.lesson_id`, stamped with the current time.
    pub async fn record_lesson_progress(
        &self,
        update: LessonUpdate,
    ) -> Result<LessonProgress, AppError> {
        let record = LessonProgress {
            lesson_id: update.lesson_id,
            title: update.title,
            subject: update.subject,
            completed: update.completed,
            current_section: update.current_section,
            total_sections: update.total_sections,
            last_accessed: self.clock.now(),
        };

        let mut lessons = self.lessons().await;
        match lessons.iter_mut().find(|l| l.lesson_id == record.lesson_id) {
            Some(existing) => *existing = record.clone(),
            None => lessons.push(record.clone()),
        }
        save_json(
            self.store.as_ref(),
            &self.key(keys::LESSON_PROGRESS),
            &lessons,
        )
        .await?;

        self.update_streak().await?;
        Ok(record)
    }

    /// Store the lesson as fully completed and award the completion bonus.
    pub async fn mark_lesson_complete(
        &self,
        lesson_id: u32,
        title: &str,
        subject: &str,
        total_sections: u32,
    ) -> Result<LessonProgress, AppError> {
        let record = self
            .record_lesson_progress(LessonUpdate {
                lesson_id,
                title: title.to_string(),
                subject: subject.to_string(),
                completed: true,
                current_section: total_sections,
                total_sections,
            })
            .await?;

        self.add_xp(LESSON_COMPLETE_XP).await?;
        tracing::info!("{} completed lesson {}", self.user_id, lesson_id);
        Ok(record)
    }

    /// Append a quiz attempt and award XP for its score.
    pub async fn record_quiz_result(&self, result: NewQuizResult) -> Result<QuizResult, AppError> {
        if result.score > 100 {
            return Err(AppError::Validation(format!(
                "Quiz score must be between 0 and 100, got {}",
                result.score
            )));
        }

        let record = QuizResult {
            quiz_id: result.quiz_id,
            lesson_id: result.lesson_id,
            title: result.title,
            subject: result.subject,
            score: result.score,
            total_questions: result.total_questions,
            correct_answers: result.correct_answers,
            completed_at: self.clock.now(),
        };

        let mut results = self.quiz_results().await;
        results.push(record.clone());
        save_json(self.store.as_ref(), &self.key(keys::QUIZ_RESULTS), &results).await?;

        self.add_xp(quiz_xp(record.score)).await?;
        self.update_streak().await?;
        Ok(record)
    }

    pub async fn add_xp(&self, amount: u64) -> Result<UserStats, AppError> {
        let mut stats = self.stats().await;
        stats.add_xp(amount);
        self.save_stats(&stats).await?;
        Ok(stats)
    }

    /// Returns true when the badge was not held before.
    pub async fn add_badge(&self, badge_id: &str) -> Result<bool, AppError> {
        let mut stats = self.stats().await;
        if !stats.badges.insert(badge_id.to_string()) {
            return Ok(false);
        }
        self.save_stats(&stats).await?;
        Ok(true)
    }

    /// Advance the day streak for activity happening now.
    pub async fn update_streak(&self) -> Result<UserStats, AppError> {
        let mut stats = self.stats().await;
        let (streak, last_active) =
            next_streak(self.clock.now(), stats.last_active_date, stats.day_streak);

        if streak == stats.day_streak && last_active == stats.last_active_date {
            return Ok(stats);
        }

        stats.day_streak = streak;
        stats.last_active_date = last_active;
        self.save_stats(&stats).await?;
        Ok(stats)
    }

    /// Completion percentage per subject over this user's lesson records.
    ///
    /// The denominator is floored to 1, so a subject without records reports 0%.
    pub async fn subject_progress(&self) -> Vec<SubjectProgress> {
        let lessons = self.lessons().await;

        SUBJECTS
            .iter()
            .map(|subject| {
                let in_subject: Vec<&LessonProgress> =
                    lessons.iter().filter(|l| l.subject == *subject).collect();
                let completed = in_subject.iter().filter(|l| l.completed).count();
                let total = in_subject.len();
                let percentage =
                    ((completed as f64 / total.max(1) as f64) * 100.0).round() as u32;

                SubjectProgress {
                    subject: subject.to_string(),
                    completed,
                    total,
                    percentage,
                }
            })
            .collect()
    }

    /// The latest lesson and quiz events, newest first.
    pub async fn recent_activity(&self) -> Vec<ActivityItem> {
        let today = self.clock.now().date_naive();

        let lessons = self.lessons().await.into_iter().map(|l| {
            let detail = if l.completed {
                "Completed lesson".to_string()
            } else {
                format!("Section {} of {}", l.current_section, l.total_sections)
            };
            (ActivityKind::Lesson, l.title, l.subject, detail, l.last_accessed)
        });
        let quizzes = self.quiz_results().await.into_iter().map(|q| {
            let detail = format!("Scored {}%", q.score);
            (ActivityKind::Quiz, q.title, q.subject, detail, q.completed_at)
        });

        let mut items: Vec<ActivityItem> = lessons
            .chain(quizzes)
            .map(|(kind, title, subject, detail, timestamp)| ActivityItem {
                kind,
                title,
                subject,
                detail,
                timestamp,
                date_label: relative_date_label(timestamp.date_naive(), today),
            })
            .collect();

        items.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        items.truncate(RECENT_ACTIVITY_LIMIT);
        items
    }

    /// Delete every per-user collection for this user.
    pub async fn wipe(&self) -> Result<(), AppError> {
        for suffix in keys::STUDENT_SUFFIXES {
            self.store.remove(&self.key(suffix)).await?;
        }
        tracing::info!("Wiped stored data for {}", self.user_id);
        Ok(())
    }
}
