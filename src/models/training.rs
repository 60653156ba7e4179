//! Teacher training and certification model.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

/// A module in the teacher training course.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrainingModule {
    pub id: &'static str,
    pub title: &'static str,
    pub xp: u64,
}

/// The fixed training course, in recommended order.
pub static TRAINING_MODULES: [TrainingModule; 5] = [
    TrainingModule {
        id: "platform-basics",
        title: "Getting Started with FlowHivee",
        xp: 100,
    },
    TrainingModule {
        id: "offline-classroom",
        title: "Running an Offline Classroom",
        xp: 100,
    },
    TrainingModule {
        id: "student-tracking",
        title: "Tracking Student Progress",
        xp: 100,
    },
    TrainingModule {
        id: "assessment-design",
        title: "Designing Quizzes and Assessments",
        xp: 100,
    },
    TrainingModule {
        id: "community-moderation",
        title: "Moderating the Community Board",
        xp: 100,
    },
];

/// Minimum assessment score for a module to count towards certification.
pub const PASSING_SCORE: u32 = 80;

pub fn find_module(id: &str) -> Option<&'static TrainingModule> {
    TRAINING_MODULES.iter().find(|m| m.id == id)
}

/// One teacher's training record.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrainingProgress {
    #[serde(default)]
    pub completed_modules: Vec<String>,
    #[serde(default, rename = "totalXP")]
    pub total_xp: u64,
    #[serde(default)]
    pub achievements: BTreeSet<String>,
    /// Best score per module id
    #[serde(default)]
    pub assessment_scores: BTreeMap<String, u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CertificationStatus {
    pub certified: bool,
    pub modules_completed: usize,
    pub modules_total: usize,
    /// Modules still missing completion or a passing assessment
    pub outstanding: Vec<String>,
}
