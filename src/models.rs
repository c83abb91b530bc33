use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Reference from a template to a catalog exercise, with per-template overrides.
/// `sets` and `reps` are free text ("3", "8-12", "to failure").
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkoutExerciseRef {
    pub exercise_id: String,
    pub name: String,
    pub muscle_group: String,
    pub sets: String,
    pub reps: String,
}

/// A reusable workout plan owned by one member. Edits overwrite in place.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkoutTemplate {
    pub id: String,
    pub user_id: String,
    pub name: String,
    pub muscle_group: String,
    pub duration_label: String,
    pub exercises: Vec<WorkoutExerciseRef>,
    pub created_at: DateTime<Utc>,
}

impl WorkoutTemplate {
    pub fn exercise_count(&self) -> usize {
        self.exercises.len()
    }
}

/// Durable artifact of a finished session. Append-only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkoutHistoryRecord {
    pub id: String,
    pub user_id: String,
    pub workout_name: String,
    pub muscle_group: String,
    pub duration: String,
    pub exercise_count: usize,
    pub completed_at: DateTime<Utc>,
}

/// Payload for a history write; the gateway assigns the id and stamps the time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewHistoryRecord {
    pub workout_name: String,
    pub muscle_group: String,
    pub duration: String,
    pub exercise_count: usize,
}

impl NewHistoryRecord {
    pub fn from_template(template: &WorkoutTemplate, duration: String) -> Self {
        Self {
            workout_name: template.name.clone(),
            muscle_group: template.muscle_group.clone(),
            duration,
            exercise_count: template.exercise_count(),
        }
    }
}

/// Aggregate counters kept on the member profile.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub user_id: String,
    pub display_name: String,
    pub total_workouts: u64,
    pub current_streak: u64,
}

impl UserProfile {
    pub fn bump(&mut self, counter: Counter, delta: u64) {
        match counter {
            Counter::TotalWorkouts => self.total_workouts += delta,
            Counter::CurrentStreak => self.current_streak += delta,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum_macros::Display)]
pub enum Counter {
    #[strum(serialize = "total_workouts")]
    TotalWorkouts,
    #[strum(serialize = "current_streak")]
    CurrentStreak,
}

impl Counter {
    pub const ALL: [Counter; 2] = [Counter::TotalWorkouts, Counter::CurrentStreak];

    /// Column backing this counter in the profile table.
    pub fn column(&self) -> &'static str {
        match self {
            Counter::TotalWorkouts => "total_workouts",
            Counter::CurrentStreak => "current_streak",
        }
    }
}
