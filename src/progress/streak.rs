use chrono::{DateTime, Utc};

/// Day streak after activity at `now`.
///
/// Compares calendar dates: same day as `last_active` leaves everything unchanged, the
/// following day extends the streak, anything else starts a new streak of 1. Returns
/// `(streak, last_active)`.
pub fn next_streak(
    now: DateTime<Utc>,
    last_active: Option<DateTime<Utc>>,
    streak: u32,
) -> (u32, Option<DateTime<Utc>>) {
    let today = now.date_naive();

    let Some(last) = last_active else {
        return (1, Some(now));
    };
    let last_day = last.date_naive();

    if last_day == today {
        return (streak, last_active);
    }

    if today.pred_opt() == Some(last_day) {
        (streak.saturating_add(1), Some(now))
    } else {
        (1, Some(now))
    }
}
