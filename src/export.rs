use serde::Serialize;
use std::io::Write;

use crate::error::Result;
use crate::models::WorkoutHistoryRecord;

#[derive(Serialize)]
struct HistoryRow<'a> {
    completed_at: String,
    workout: &'a str,
    muscle_group: &'a str,
    duration: &'a str,
    exercises: usize,
}

/// Write history as CSV with a header row. Returns the number of records written.
pub fn export_history_csv<W: Write>(records: &[WorkoutHistoryRecord], writer: W) -> Result<usize> {
    let mut wtr = csv::Writer::from_writer(writer);
    for r in records {
        wtr.serialize(HistoryRow {
            completed_at: r.completed_at.to_rfc3339(),
            workout: &r.workout_name,
            muscle_group: &r.muscle_group,
            duration: &r.duration,
            exercises: r.exercise_count,
        })?;
    }
    wtr.flush()?;
    Ok(records.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn record(name: &str) -> WorkoutHistoryRecord {
        WorkoutHistoryRecord {
            id: "r".into(),
            user_id: "u".into(),
            workout_name: name.into(),
            muscle_group: "Back".into(),
            duration: "1:02:03".into(),
            exercise_count: 6,
            completed_at: Utc.with_ymd_and_hms(2024, 3, 9, 18, 30, 0).unwrap(),
        }
    }

    #[test]
    fn test_export_writes_header_and_rows() {
        let mut out = Vec::new();
        let n = export_history_csv(&[record("Pull, heavy"), record("Rows")], &mut out).unwrap();
        assert_eq!(n, 2);

        let text = String::from_utf8(out).unwrap();
        let lines: Vec<_> = text.lines().collect();
        assert_eq!(lines[0], "completed_at,workout,muscle_group,duration,exercises");
        assert_eq!(
            lines[1],
            "2024-03-09T18:30:00+00:00,\"Pull, heavy\",Back,1:02:03,6"
        );
        assert_eq!(lines.len(), 3);
    }

    #[test]
    fn test_export_empty_history() {
        let mut out = Vec::new();
        assert_eq!(export_history_csv(&[], &mut out).unwrap(), 0);
    }
}
