use chrono::{Duration, NaiveDate};

use crate::models::WorkoutHistoryRecord;

/// Workouts completed on each of the `days` days ending at `today`, oldest
/// first, labelled by weekday.
pub fn daily_counts(
    history: &[WorkoutHistoryRecord],
    today: NaiveDate,
    days: usize,
) -> Vec<(String, u64)> {
    (0..days)
        .rev()
        .map(|back| {
            let day = today - Duration::days(back as i64);
            let count = history
                .iter()
                .filter(|r| r.completed_at.date_naive() == day)
                .count() as u64;
            (day.format("%a").to_string(), count)
        })
        .collect()
}

/// Fraction of exercises marked done, always within 0..=1.
pub fn completion_ratio(done: usize, total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    (done as f64 / total as f64).clamp(0.0, 1.0)
}
