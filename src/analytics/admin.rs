//! School-wide rollups over student records.

use std::collections::BTreeSet;

use chrono::{DateTime, Duration, NaiveDate, Utc};

use crate::models::{
    AtRiskStudent, DailyEngagement, LeaderboardEntry, StudentRecord, SubjectPerformance,
    SystemStats,
};
use crate::progress::SUBJECTS;

/// Days without activity after which a student is flagged.
pub const INACTIVITY_DAYS: i64 = 3;

/// Mean quiz score below which a student is flagged.
pub const LOW_SCORE_THRESHOLD: f64 = 70.0;

/// Completed lessons below which a student is flagged.
pub const MIN_COMPLETED_LESSONS: usize = 2;

/// Window for counting a student as active.
pub const ACTIVE_WINDOW_DAYS: i64 = 7;

/// Days covered by the engagement chart.
pub const ENGAGEMENT_DAYS: i64 = 7;

fn percent(part: usize, whole: usize) -> f64 {
    if whole == 0 {
        0.0
    } else {
        part as f64 / whole as f64 * 100.0
    }
}

fn mean(scores: &[u32]) -> f64 {
    if scores.is_empty() {
        0.0
    } else {
        scores.iter().map(|&s| s as u64).sum::<u64>() as f64 / scores.len() as f64
    }
}

pub fn system_stats(records: &[StudentRecord], total_teachers: usize, now: DateTime<Utc>) -> SystemStats {
    let total_lessons: usize = records.iter().map(|r| r.lessons.len()).sum();
    let completed_lessons: usize = records.iter().map(|r| r.completed_lessons()).sum();

    // Flattened over every attempt, so prolific quiz takers weigh more
    let scores: Vec<u32> = records
        .iter()
        .flat_map(|r| r.quizzes.iter().map(|q| q.score))
        .collect();

    let active_since = now - Duration::days(ACTIVE_WINDOW_DAYS);
    let active_students = records
        .iter()
        .filter(|r| r.last_active.is_some_and(|t| t >= active_since))
        .count();

    SystemStats {
        total_students: records.len(),
        total_teachers,
        total_lessons,
        completed_lessons,
        completion_rate: percent(completed_lessons, total_lessons),
        total_quizzes: scores.len(),
        average_quiz_score: mean(&scores),
        active_students,
    }
}

/// Lesson accesses plus quiz completions per calendar day, oldest day first, ending today.
pub fn engagement_series(records: &[StudentRecord], today: NaiveDate) -> Vec<DailyEngagement> {
    (0..ENGAGEMENT_DAYS)
        .rev()
        .map(|back| {
            let date = today - Duration::days(back);
            let lessons = records
                .iter()
                .flat_map(|r| &r.lessons)
                .filter(|l| l.last_accessed.date_naive() == date)
                .count();
            let quizzes = records
                .iter()
                .flat_map(|r| &r.quizzes)
                .filter(|q| q.completed_at.date_naive() == date)
                .count();

            DailyEngagement {
                date,
                label: date.format("%a").to_string(),
                lessons,
                quizzes,
                total: lessons + quizzes,
            }
        })
        .collect()
}

/// Completion and average score per subject, using each record's own subject field.
///
/// Covers the dashboard subjects first, then any other subject found in the data.
pub fn subject_performance(records: &[StudentRecord]) -> Vec<SubjectPerformance> {
    let known: BTreeSet<&str> = SUBJECTS.iter().copied().collect();
    let extra: BTreeSet<&str> = records
        .iter()
        .flat_map(|r| {
            r.lessons
                .iter()
                .map(|l| l.subject.as_str())
                .chain(r.quizzes.iter().map(|q| q.subject.as_str()))
        })
        .filter(|s| !s.is_empty() && !known.contains(s))
        .collect();

    let mut subjects: Vec<&str> = SUBJECTS.to_vec();
    subjects.extend(extra);

    subjects
        .into_iter()
        .map(|subject| {
            let lessons: Vec<_> = records
                .iter()
                .flat_map(|r| &r.lessons)
                .filter(|l| l.subject == subject)
                .collect();
            let scores: Vec<u32> = records
                .iter()
                .flat_map(|r| &r.quizzes)
                .filter(|q| q.subject == subject)
                .map(|q| q.score)
                .collect();
            let completed = lessons.iter().filter(|l| l.completed).count();

            SubjectPerformance {
                subject: subject.to_string(),
                completion_rate: percent(completed, lessons.len()),
                average_score: mean(&scores),
                lesson_count: lessons.len(),
                quiz_count: scores.len(),
            }
        })
        .collect()
}

/// Top `limit` students by XP. Ties keep roster order.
pub fn leaderboard(records: &[StudentRecord], limit: usize) -> Vec<LeaderboardEntry> {
    let mut ranked: Vec<&StudentRecord> = records.iter().collect();
    ranked.sort_by(|a, b| b.stats.total_xp.cmp(&a.stats.total_xp));

    ranked
        .into_iter()
        .take(limit)
        .enumerate()
        .map(|(i, r)| LeaderboardEntry {
            rank: i + 1,
            user_id: r.user_id.clone(),
            name: r.name.clone(),
            total_xp: r.stats.total_xp,
            level: r.stats.level,
            day_streak: r.stats.day_streak,
        })
        .collect()
}

/// Why a student needs attention, checking inactivity, then scores, then progress.
pub fn at_risk_reason(record: &StudentRecord, now: DateTime<Utc>) -> Option<String> {
    let inactive = match record.last_active {
        Some(last) => now - last > Duration::days(INACTIVITY_DAYS),
        None => true,
    };
    if inactive {
        return Some("Inactive for 3+ days".to_string());
    }

    if let Some(avg) = record.average_score().filter(|&avg| avg < LOW_SCORE_THRESHOLD) {
        return Some(format!("Low quiz scores (avg {:.0}%)", avg));
    }

    if record.completed_lessons() < MIN_COMPLETED_LESSONS {
        return Some("Fewer than 2 lessons completed".to_string());
    }

    None
}

pub fn at_risk_students(records: &[StudentRecord], now: DateTime<Utc>) -> Vec<AtRiskStudent> {
    records
        .iter()
        .filter_map(|r| {
            at_risk_reason(r, now).map(|reason| AtRiskStudent {
                user_id: r.user_id.clone(),
                name: r.name.clone(),
                reason,
                last_active: r.last_active,
                average_score: r.average_score(),
                completed_lessons: r.completed_lessons(),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{LessonProgress, QuizResult, UserStats};
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 11, 20, 15, 0, 0).unwrap()
    }

    fn lesson(id: u32, subject: &str, completed: bool, at: DateTime<Utc>) -> LessonProgress {
        LessonProgress {
            lesson_id: id,
            title: format!("Lesson {}", id),
            subject: subject.to_string(),
            completed,
            current_section: if completed { 4 } else { 1 },
            total_sections: 4,
            last_accessed: at,
        }
    }

    fn quiz(subject: &str, title: &str, score: u32, at: DateTime<Utc>) -> QuizResult {
        QuizResult {
            quiz_id: 1,
            lesson_id: 1,
            title: title.to_string(),
            subject: subject.to_string(),
            score,
            total_questions: 10,
            correct_answers: score / 10,
            completed_at: at,
        }
    }

    fn student(id: &str, xp: u64, lessons: Vec<LessonProgress>, quizzes: Vec<QuizResult>) -> StudentRecord {
        let mut stats = UserStats::default();
        stats.add_xp(xp);
        let last_active = lessons
            .iter()
            .map(|l| l.last_accessed)
            .chain(quizzes.iter().map(|q| q.completed_at))
            .max();
        StudentRecord {
            user_id: id.to_string(),
            name: id.to_uppercase(),
            settings: None,
            lessons,
            quizzes,
            stats,
            last_active,
        }
    }

    #[test]
    fn test_system_stats_flatten_scores() {
        let recent = now() - Duration::hours(2);
        let records = vec![
            student(
                "a",
                0,
                vec![lesson(1, "Math", true, recent), lesson(2, "Math", false, recent)],
                vec![quiz("Math", "q", 100, recent)],
            ),
            student(
                "b",
                0,
                vec![lesson(1, "Math", true, now() - Duration::days(9))],
                vec![
                    quiz("Math", "q", 40, recent),
                    quiz("Math", "q", 50, recent),
                    quiz("Math", "q", 60, recent),
                ],
            ),
        ];

        let stats = system_stats(&records, 2, now());
        assert_eq!(stats.total_students, 2);
        assert_eq!(stats.total_teachers, 2);
        assert_eq!(stats.total_lessons, 3);
        assert_eq!(stats.completed_lessons, 2);
        assert!((stats.completion_rate - 66.666).abs() < 0.01);
        assert_eq!(stats.total_quizzes, 4);
        // (100 + 40 + 50 + 60) / 4, not the mean of per-student means
        assert_eq!(stats.average_quiz_score, 62.5);
        assert_eq!(stats.active_students, 2);
    }

    #[test]
    fn test_system_stats_empty() {
        let stats = system_stats(&[], 0, now());
        assert_eq!(stats.completion_rate, 0.0);
        assert_eq!(stats.average_quiz_score, 0.0);
    }

    #[test]
    fn test_engagement_counts_by_calendar_day() {
        let today = now();
        let yesterday_late = Utc.with_ymd_and_hms(2024, 11, 19, 23, 59, 0).unwrap();
        let records = vec![
            student(
                "a",
                0,
                vec![lesson(1, "Math", true, today), lesson(2, "Art", false, yesterday_late)],
                vec![quiz("Math", "q", 70, today)],
            ),
            student(
                "b",
                0,
                vec![lesson(3, "Math", false, today - Duration::days(10))],
                vec![quiz("Art", "q", 70, today - Duration::days(6))],
            ),
        ];

        let series = engagement_series(&records, today.date_naive());
        assert_eq!(series.len(), 7);
        assert_eq!(series[0].date, NaiveDate::from_ymd_opt(2024, 11, 14).unwrap());
        assert_eq!(series[0].total, 1);
        assert_eq!(series[5].total, 1);
        assert_eq!((series[6].lessons, series[6].quizzes, series[6].total), (1, 1, 2));
        assert_eq!(series[6].label, "Wed");
        assert_eq!(series.iter().map(|d| d.total).sum::<usize>(), 4);
    }

    #[test]
    fn test_subject_performance_uses_subject_field() {
        let t = now();
        let records = vec![student(
            "a",
            0,
            vec![lesson(1, "Science", true, t), lesson(2, "Science", false, t)],
            // Title mentions maths but the quiz is tagged Science
            vec![quiz("Science", "Math in the lab", 90, t), quiz("Science", "Cells", 70, t), quiz("Music", "Rhythm", 60, t)],
        )];

        let perf = subject_performance(&records);
        let science = perf.iter().find(|p| p.subject == "Science").unwrap();
        let math = perf.iter().find(|p| p.subject == "Math").unwrap();

        assert_eq!(science.completion_rate, 50.0);
        assert_eq!(science.average_score, 80.0);
        assert_eq!(science.quiz_count, 2);
        assert_eq!(math.quiz_count, 0);
        assert_eq!(math.average_score, 0.0);
        assert_eq!(perf.len(), SUBJECTS.len() + 1);
        assert_eq!(perf.last().unwrap().subject, "Music");
    }

    #[test]
    fn test_leaderboard_orders_by_xp_and_keeps_ties_stable() {
        let records = vec![
            student("a", 300, vec![], vec![]),
            student("b", 900, vec![], vec![]),
            student("c", 300, vec![], vec![]),
            student("d", 50, vec![], vec![]),
        ];

        let board = leaderboard(&records, 3);
        let ids: Vec<&str> = board.iter().map(|e| e.user_id.as_str()).collect();
        assert_eq!(ids, vec!["b", "a", "c"]);
        assert_eq!(board[0].rank, 1);
        assert_eq!(board[0].level, 2);
        assert_eq!(board[2].rank, 3);
    }

    #[test]
    fn test_at_risk_reports_first_matching_reason() {
        let five_days_ago = now() - Duration::days(5);
        let recent = now() - Duration::hours(3);

        let records = vec![
            // Inactive and low progress: inactivity wins
            student("idle", 100, vec![lesson(1, "Math", true, five_days_ago)], vec![]),
            student(
                "steady",
                900,
                vec![lesson(1, "Math", true, recent), lesson(2, "Art", true, recent)],
                vec![quiz("Math", "q", 90, recent)],
            ),
        ];

        let flagged = at_risk_students(&records, now());
        assert_eq!(flagged.len(), 1);
        assert_eq!(flagged[0].user_id, "idle");
        assert_eq!(flagged[0].reason, "Inactive for 3+ days");
        assert_eq!(flagged[0].completed_lessons, 1);
    }

    #[test]
    fn test_at_risk_score_and_progress_reasons() {
        let recent = now() - Duration::hours(1);
        let low_scores = student(
            "low",
            0,
            vec![lesson(1, "Math", false, recent)],
            vec![quiz("Math", "q", 60, recent), quiz("Math", "q", 64, recent)],
        );
        let few_lessons = student("few", 0, vec![lesson(1, "Math", true, recent)], vec![]);
        let never_seen = student("new", 0, vec![], vec![]);

        assert_eq!(at_risk_reason(&low_scores, now()).unwrap(), "Low quiz scores (avg 62%)");
        assert_eq!(at_risk_reason(&few_lessons, now()).unwrap(), "Fewer than 2 lessons completed");
        assert_eq!(at_risk_reason(&never_seen, now()).unwrap(), "Inactive for 3+ days");
    }

    #[test]
    fn test_exactly_three_days_is_not_inactive() {
        let edge = now() - Duration::days(3);
        let record = student(
            "edge",
            0,
            vec![lesson(1, "Math", true, edge), lesson(2, "Math", true, edge)],
            vec![],
        );
        assert!(at_risk_reason(&record, now()).is_none());
    }
}
