//! Teacher training progress and certification, kept per teacher.

use std::sync::Arc;

use crate::errors::AppError;
use crate::models::{
    find_module, CertificationStatus, TrainingProgress, UserRole, PASSING_SCORE,
    TRAINING_MODULES,
};
use crate::registry::UserRegistry;
use crate::storage::{keys, load_json, save_json, Clock, KeyValueStore};

pub const ACHIEVEMENT_FIRST_MODULE: &str = "first_module";
pub const ACHIEVEMENT_ALL_MODULES: &str = "all_modules";
pub const ACHIEVEMENT_PERFECT_SCORE: &str = "perfect_score";

#[derive(Clone)]
pub struct TrainingStore {
    store: Arc<dyn KeyValueStore>,
    teacher_id: String,
}

impl TrainingStore {
    /// Open the training record for `teacher_id`, registering them as a teacher.
    pub async fn open(
        store: Arc<dyn KeyValueStore>,
        clock: Arc<dyn Clock>,
        teacher_id: &str,
    ) -> Result<Self, AppError> {
        let teacher_id = teacher_id.trim();
        UserRegistry::new(store.clone(), clock)
            .register(teacher_id, UserRole::Teacher)
            .await?;

        Ok(Self {
            store,
            teacher_id: teacher_id.to_string(),
        })
    }

    fn key(&self) -> String {
        keys::user_key(&self.teacher_id, keys::TRAINING_PROGRESS)
    }

    pub async fn progress(&self) -> TrainingProgress {
        load_json(self.store.as_ref(), &self.key())
            .await
            .unwrap_or_default()
    }

    async fn save(&self, progress: &TrainingProgress) -> Result<(), AppError> {
        save_json(self.store.as_ref(), &self.key(), progress).await
    }

    /// Mark a module done and award its XP once.
    pub async fn complete_module(&self, module_id: &str) -> Result<TrainingProgress, AppError> {
        let module = find_module(module_id)
            .ok_or_else(|| AppError::NotFound(format!("Training module {} not found", module_id)))?;

        let mut progress = self.progress().await;
        if progress.completed_modules.iter().any(|m| m == module.id) {
            return Ok(progress);
        }

        progress.completed_modules.push(module.id.to_string());
        progress.total_xp += module.xp;
        progress
            .achievements
            .insert(ACHIEVEMENT_FIRST_MODULE.to_string());
        if progress.completed_modules.len() == TRAINING_MODULES.len() {
            progress
                .achievements
                .insert(ACHIEVEMENT_ALL_MODULES.to_string());
        }

        self.save(&progress).await?;
        tracing::info!("Teacher {} completed module {}", self.teacher_id, module.id);
        Ok(progress)
    }

    /// Record an assessment attempt, keeping the best score per module.
    pub async fn record_assessment(
        &self,
        module_id: &str,
        score: u32,
    ) -> Result<TrainingProgress, AppError> {
        let module = find_module(module_id)
            .ok_or_else(|| AppError::NotFound(format!("Training module {} not found", module_id)))?;
        if score > 100 {
            return Err(AppError::Validation(format!(
                "Assessment score must be between 0 and 100, got {}",
                score
            )));
        }

        let mut progress = self.progress().await;
        let best = progress
            .assessment_scores
            .entry(module.id.to_string())
            .or_insert(score);
        *best = (*best).max(score);
        if score == 100 {
            progress
                .achievements
                .insert(ACHIEVEMENT_PERFECT_SCORE.to_string());
        }

        self.save(&progress).await?;
        Ok(progress)
    }

    /// Returns true when the achievement is new.
    pub async fn unlock_achievement(&self, achievement: &str) -> Result<bool, AppError> {
        let mut progress = self.progress().await;
        if !progress.achievements.insert(achievement.to_string()) {
            return Ok(false);
        }
        self.save(&progress).await?;
        Ok(true)
    }

    pub async fn certification_status(&self) -> CertificationStatus {
        let progress = self.progress().await;

        let outstanding: Vec<String> = TRAINING_MODULES
            .iter()
            .filter(|module| {
                let completed = progress.completed_modules.iter().any(|m| m == module.id);
                let passed = progress
                    .assessment_scores
                    .get(module.id)
                    .is_some_and(|&score| score >= PASSING_SCORE);
                !(completed && passed)
            })
            .map(|module| module.id.to_string())
            .collect();

        CertificationStatus {
            certified: outstanding.is_empty(),
            modules_completed: progress.completed_modules.len(),
            modules_total: TRAINING_MODULES.len(),
            outstanding,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{FixedClock, MemoryStore};
    use chrono::{TimeZone, Utc};

    async fn open(store: Arc<dyn KeyValueStore>, teacher: &str) -> TrainingStore {
        let clock = Arc::new(FixedClock::new(Utc.with_ymd_and_hms(2024, 8, 1, 9, 0, 0).unwrap()));
        TrainingStore::open(store, clock, teacher).await.unwrap()
    }

    #[tokio::test]
    async fn test_complete_module_is_idempotent() {
        let training = open(Arc::new(MemoryStore::new()), "t1").await;

        training.complete_module("platform-basics").await.unwrap();
        let progress = training.complete_module("platform-basics").await.unwrap();

        assert_eq!(progress.completed_modules, vec!["platform-basics"]);
        assert_eq!(progress.total_xp, 100);
        assert!(progress.achievements.contains(ACHIEVEMENT_FIRST_MODULE));
    }

    #[tokio::test]
    async fn test_unknown_module() {
        let training = open(Arc::new(MemoryStore::new()), "t1").await;
        let err = training.complete_module("basket-weaving").await.unwrap_err();
        assert_eq!(err.error_code(), "NOT_FOUND");
    }

    #[tokio::test]
    async fn test_records_are_per_teacher() {
        let store: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new());
        let first = open(store.clone(), "t1").await;
        let second = open(store.clone(), "t2").await;

        first.complete_module("student-tracking").await.unwrap();

        assert_eq!(first.progress().await.total_xp, 100);
        assert_eq!(second.progress().await, TrainingProgress::default());

        let clock = Arc::new(FixedClock::new(Utc.with_ymd_and_hms(2024, 8, 1, 9, 0, 0).unwrap()));
        let registry = UserRegistry::new(store, clock);
        assert_eq!(registry.teacher_ids().await, vec!["t1", "t2"]);
    }

    #[tokio::test]
    async fn test_assessment_keeps_best_score() {
        let training = open(Arc::new(MemoryStore::new()), "t1").await;
        training.record_assessment("assessment-design", 85).await.unwrap();
        training.record_assessment("assessment-design", 60).await.unwrap();
        let progress = training.record_assessment("assessment-design", 100).await.unwrap();

        assert_eq!(progress.assessment_scores["assessment-design"], 100);
        assert!(progress.achievements.contains(ACHIEVEMENT_PERFECT_SCORE));
        assert!(training.record_assessment("assessment-design", 101).await.is_err());
    }

    #[tokio::test]
    async fn test_certification_requires_completion_and_passing_scores() {
        let training = open(Arc::new(MemoryStore::new()), "t1").await;

        for module in TRAINING_MODULES {
            training.complete_module(module.id).await.unwrap();
            training.record_assessment(module.id, 90).await.unwrap();
        }
        training.record_assessment("offline-classroom", 50).await.unwrap();

        let status = training.certification_status().await;
        assert!(status.certified);
        assert_eq!(status.modules_completed, 5);
        assert!(training.progress().await.achievements.contains(ACHIEVEMENT_ALL_MODULES));

        let fresh = open(Arc::new(MemoryStore::new()), "t2").await;
        fresh.complete_module("platform-basics").await.unwrap();
        fresh.record_assessment("platform-basics", 70).await.unwrap();
        let status = fresh.certification_status().await;
        assert!(!status.certified);
        assert_eq!(status.outstanding.len(), 5);
        assert!(status.outstanding.contains(&"platform-basics".to_string()));
    }

    #[tokio::test]
    async fn test_unlock_achievement() {
        let training = open(Arc::new(MemoryStore::new()), "t1").await;
        assert!(training.unlock_achievement("mentor").await.unwrap());
        assert!(!training.unlock_achievement("mentor").await.unwrap());
    }
}
