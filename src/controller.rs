use tracing::{info, warn};

use crate::error::{GatewayError, GymError, Result};
use crate::gateway::PersistenceGateway;
use crate::models::{Counter, NewHistoryRecord, UserProfile, WorkoutTemplate};
use crate::session::WorkoutSession;

#[derive(Debug, Clone, PartialEq, Default)]
pub enum ControllerState {
    #[default]
    Idle,
    Running(WorkoutSession),
}

/// What a successful finish produced.
#[derive(Debug)]
pub struct FinishReport {
    pub record_id: String,
    pub workout_name: String,
    pub duration: String,
    pub exercise_count: usize,
    /// Durable counter bumps that failed. The local profile was still updated.
    pub counter_failures: Vec<(Counter, GatewayError)>,
}

impl FinishReport {
    pub fn fully_synced(&self) -> bool {
        self.counter_failures.is_empty()
    }
}

/// Owns the lifecycle of the one in-progress workout.
#[derive(Debug, Default)]
pub struct SessionController {
    state: ControllerState,
}

impl SessionController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &ControllerState {
        &self.state
    }

    pub fn session(&self) -> Option<&WorkoutSession> {
        match &self.state {
            ControllerState::Running(s) => Some(s),
            ControllerState::Idle => None,
        }
    }

    pub fn is_running(&self) -> bool {
        matches!(self.state, ControllerState::Running(_))
    }

    /// Begin a session. A session already running is replaced and its timer reset.
    pub fn start(&mut self, template: WorkoutTemplate) {
        if let ControllerState::Running(current) = &self.state {
            warn!(
                replaced = %current.template.name,
                elapsed_secs = current.elapsed_secs,
                "starting a workout over one in progress"
            );
        }
        info!(template_id = %template.id, name = %template.name, "workout started");
        self.state = ControllerState::Running(WorkoutSession::new(template));
    }

    /// One timer period. Does nothing while idle.
    pub fn tick(&mut self) {
        if let ControllerState::Running(session) = &mut self.state {
            session.tick();
        }
    }

    /// Flip the completion mark of one exercise. Out-of-range indices and idle
    /// state are ignored.
    pub fn toggle_exercise_complete(&mut self, index: usize) {
        if let ControllerState::Running(session) = &mut self.state {
            session.toggle(index);
        }
    }

    /// Persist the running session as a history record and bump the member's
    /// counters. If the history write fails the session keeps running so the
    /// member can try again.
    pub fn finish<G: PersistenceGateway + ?Sized>(
        &mut self,
        gateway: &G,
        profile: &mut UserProfile,
    ) -> Result<FinishReport> {
        let ControllerState::Running(session) = &self.state else {
            return Err(GymError::NoActiveSession);
        };

        let duration = session.formatted_elapsed();
        let record = NewHistoryRecord::from_template(&session.template, duration.clone());
        let workout_name = record.workout_name.clone();
        let exercise_count = record.exercise_count;

        let record_id = gateway
            .create_history_record(&profile.user_id, record)
            .map_err(|e| {
                warn!(error = %e, "failed to save workout, session kept running");
                GymError::from(e)
            })?;

        let mut counter_failures = Vec::new();
        for counter in Counter::ALL {
            profile.bump(counter, 1);
            if let Err(e) = gateway.increment_counter(&profile.user_id, counter, 1) {
                warn!(%counter, error = %e, "counter increment not persisted");
                counter_failures.push((counter, e));
            }
        }

        info!(%record_id, %duration, exercise_count, "workout finished");
        self.state = ControllerState::Idle;

        Ok(FinishReport {
            record_id,
            workout_name,
            duration,
            exercise_count,
            counter_failures,
        })
    }

    /// Throw away the running session without writing anything.
    pub fn cancel(&mut self) -> Result<WorkoutSession> {
        match std::mem::take(&mut self.state) {
            ControllerState::Running(session) => {
                info!(
                    name = %session.template.name,
                    elapsed_secs = session.elapsed_secs,
                    "workout discarded"
                );
                Ok(session)
            }
            ControllerState::Idle => Err(GymError::NoActiveSession),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::WorkoutExerciseRef;
    use crate::store::SqliteGateway;
    use assert_matches::assert_matches;
    use chrono::Utc;

    fn template(n: usize) -> WorkoutTemplate {
        WorkoutTemplate {
            id: "tpl-1".into(),
            user_id: "u1".into(),
            name: "Upper Body".into(),
            muscle_group: "Chest".into(),
            duration_label: "50 min".into(),
            exercises: (0..n)
                .map(|i| WorkoutExerciseRef {
                    exercise_id: format!("ex-{i}"),
                    name: format!("Exercise {i}"),
                    muscle_group: "Chest".into(),
                    sets: "3".into(),
                    reps: "12".into(),
                })
                .collect(),
            created_at: Utc::now(),
        }
    }

    fn setup() -> (SqliteGateway, UserProfile) {
        let db = SqliteGateway::open_in_memory().unwrap();
        let profile = db.load_profile("u1", "Kai").unwrap();
        (db, profile)
    }

    #[test]
    fn test_starts_idle() {
        let c = SessionController::new();
        assert_eq!(c.state(), &ControllerState::Idle);
        assert!(c.session().is_none());
    }

    #[test]
    fn test_start_resets_counter_and_marks() {
        let mut c = SessionController::new();
        c.start(template(3));
        c.tick();
        c.toggle_exercise_complete(0);

        c.start(template(3));
        let s = c.session().unwrap();
        assert_eq!(s.elapsed_secs, 0);
        assert!(s.completed.is_empty());
    }

    #[test]
    fn test_tick_only_counts_while_running() {
        let mut c = SessionController::new();
        c.tick();
        c.start(template(1));
        c.tick();
        c.tick();
        assert_eq!(c.session().unwrap().elapsed_secs, 2);
    }

    #[test]
    fn test_toggle_when_idle_is_noop() {
        let mut c = SessionController::new();
        c.toggle_exercise_complete(0);
        assert_eq!(c.state(), &ControllerState::Idle);
    }

    #[test]
    fn test_finish_writes_one_record() {
        let (db, mut profile) = setup();
        let mut c = SessionController::new();
        c.start(template(3));
        c.toggle_exercise_complete(1);
        for _ in 0..65 {
            c.tick();
        }

        let report = c.finish(&db, &mut profile).unwrap();
        assert_eq!(report.duration, "01:05");
        assert_eq!(report.exercise_count, 3);
        assert!(report.fully_synced());
        assert!(!c.is_running());

        let history = db.list_history("u1").unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].id, report.record_id);
        assert_eq!(history[0].duration, "01:05");
        assert_eq!(history[0].exercise_count, 3);
        assert_eq!(history[0].workout_name, "Upper Body");

        assert_eq!(profile.total_workouts, 1);
        assert_eq!(profile.current_streak, 1);
        let stored = db.load_profile("u1", "Kai").unwrap();
        assert_eq!(stored.total_workouts, 1);
        assert_eq!(stored.current_streak, 1);
    }

    #[test]
    fn test_finish_right_after_start() {
        let (db, mut profile) = setup();
        let mut c = SessionController::new();
        c.start(template(5));

        let report = c.finish(&db, &mut profile).unwrap();
        assert_eq!(report.duration, "00:00");
        assert_eq!(report.exercise_count, 5);
    }

    #[test]
    fn test_finish_with_no_exercises() {
        let (db, mut profile) = setup();
        let mut c = SessionController::new();
        c.start(template(0));
        let report = c.finish(&db, &mut profile).unwrap();
        assert_eq!(report.exercise_count, 0);
    }

    #[test]
    fn test_finish_when_idle() {
        let (db, mut profile) = setup();
        let mut c = SessionController::new();
        assert_matches!(c.finish(&db, &mut profile), Err(GymError::NoActiveSession));
        assert!(db.list_history("u1").unwrap().is_empty());
        assert_eq!(profile.total_workouts, 0);
    }

    #[test]
    fn test_cancel_writes_nothing() {
        let (db, mut profile) = setup();
        let mut c = SessionController::new();
        c.start(template(3));
        for i in 0..7 {
            c.toggle_exercise_complete(i % 3);
            c.tick();
        }

        let discarded = c.cancel().unwrap();
        assert_eq!(discarded.elapsed_secs, 7);
        assert!(!c.is_running());
        assert!(db.list_history("u1").unwrap().is_empty());
        assert_eq!(db.load_profile("u1", "Kai").unwrap().total_workouts, 0);

        // and a later finish has nothing to save
        assert_matches!(c.finish(&db, &mut profile), Err(GymError::NoActiveSession));
    }

    #[test]
    fn test_cancel_when_idle() {
        let mut c = SessionController::new();
        assert_matches!(c.cancel(), Err(GymError::NoActiveSession));
    }

    #[test]
    fn test_long_session_uses_hours() {
        let (db, mut profile) = setup();
        let mut c = SessionController::new();
        c.start(template(1));
        for _ in 0..3661 {
            c.tick();
        }
        let report = c.finish(&db, &mut profile).unwrap();
        assert_eq!(report.duration, "1:01:01");
    }
}
