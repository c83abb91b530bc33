use chrono::{DateTime, Utc};
use std::time::Duration;
use time_humanize::{Accuracy, HumanTime, Tense};

/// time-humanize renders anything shorter than this as "now".
const JUST_NOW: Duration = Duration::from_secs(10);

/// Render whole seconds as `MM:SS`, or `H:MM:SS` once an hour has passed.
/// The hour is never padded.
pub fn format_duration(total_secs: u64) -> String {
    let hours = total_secs / 3600;
    let minutes = (total_secs % 3600) / 60;
    let secs = total_secs % 60;

    if hours > 0 {
        format!("{hours}:{minutes:02}:{secs:02}")
    } else {
        format!("{minutes:02}:{secs:02}")
    }
}

/// "3 hours ago" style label relative to `now`. Future timestamps count as "just now".
pub fn time_ago(at: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let elapsed = (now - at).to_std().unwrap_or_default();
    if elapsed < JUST_NOW {
        return "just now".to_string();
    }
    HumanTime::from(elapsed).to_text_en(Accuracy::Rough, Tense::Past)
}
