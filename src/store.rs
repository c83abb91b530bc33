use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::{params, types::Type, Connection, OptionalExtension, Row};
use std::path::Path;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::app_dirs::AppDirs;
use crate::error::GatewayError;
use crate::gateway::{PersistenceGateway, SubscriberRegistry, Subscription};
use crate::models::{
    Counter, NewHistoryRecord, UserProfile, WorkoutExerciseRef, WorkoutHistoryRecord,
    WorkoutTemplate,
};

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS workout_templates (
    id TEXT PRIMARY KEY,
    user_id TEXT NOT NULL,
    name TEXT NOT NULL,
    muscle_group TEXT NOT NULL,
    duration_label TEXT NOT NULL,
    exercises TEXT NOT NULL,
    created_at TEXT NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_workout_templates_user
    ON workout_templates(user_id, created_at);

CREATE TABLE IF NOT EXISTS workout_history (
    id TEXT PRIMARY KEY,
    user_id TEXT NOT NULL,
    workout_name TEXT NOT NULL,
    muscle_group TEXT NOT NULL,
    duration TEXT NOT NULL,
    exercise_count INTEGER NOT NULL,
    completed_at TEXT NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_workout_history_user
    ON workout_history(user_id, completed_at);

CREATE TABLE IF NOT EXISTS user_profiles (
    user_id TEXT PRIMARY KEY,
    display_name TEXT NOT NULL,
    total_workouts INTEGER NOT NULL DEFAULT 0,
    current_streak INTEGER NOT NULL DEFAULT 0
);
"#;

/// Gateway backed by a local SQLite file.
pub struct SqliteGateway {
    conn: Connection,
    template_listeners: SubscriberRegistry<Vec<WorkoutTemplate>>,
    history_listeners: SubscriberRegistry<Vec<WorkoutHistoryRecord>>,
}

impl std::fmt::Debug for SqliteGateway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SqliteGateway")
            .field("conn", &self.conn)
            .finish_non_exhaustive()
    }
}

fn timestamp(at: DateTime<Utc>) -> String {
    // fixed width so lexical order matches time order
    at.to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn parse_timestamp(row: &Row, idx: usize) -> rusqlite::Result<DateTime<Utc>> {
    let raw: String = row.get(idx)?;
    DateTime::parse_from_rfc3339(&raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

fn row_to_template(row: &Row) -> rusqlite::Result<WorkoutTemplate> {
    let exercises_json: String = row.get(5)?;
    let exercises: Vec<WorkoutExerciseRef> = serde_json::from_str(&exercises_json)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(5, Type::Text, Box::new(e)))?;

    Ok(WorkoutTemplate {
        id: row.get(0)?,
        user_id: row.get(1)?,
        name: row.get(2)?,
        muscle_group: row.get(3)?,
        duration_label: row.get(4)?,
        exercises,
        created_at: parse_timestamp(row, 6)?,
    })
}

fn row_to_history(row: &Row) -> rusqlite::Result<WorkoutHistoryRecord> {
    let exercise_count: i64 = row.get(5)?;
    Ok(WorkoutHistoryRecord {
        id: row.get(0)?,
        user_id: row.get(1)?,
        workout_name: row.get(2)?,
        muscle_group: row.get(3)?,
        duration: row.get(4)?,
        exercise_count: exercise_count.max(0) as usize,
        completed_at: parse_timestamp(row, 6)?,
    })
}

impl SqliteGateway {
    /// Open (or create) the database at `path`, creating parent directories.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, GatewayError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                GatewayError::Unavailable(format!(
                    "failed to create {}: {e}",
                    parent.display()
                ))
            })?;
        }

        let conn = Connection::open(path)?;
        info!(path = %path.display(), "opened workout database");
        Self::with_connection(conn)
    }

    /// Open the database at the platform state directory.
    pub fn open_default() -> Result<Self, GatewayError> {
        let path = AppDirs::db_path()
            .ok_or_else(|| GatewayError::Unavailable("no state directory available".into()))?;
        Self::open(path)
    }

    pub fn open_in_memory() -> Result<Self, GatewayError> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> Result<Self, GatewayError> {
        conn.execute_batch(SCHEMA)?;
        Ok(Self {
            conn,
            template_listeners: SubscriberRegistry::new(),
            history_listeners: SubscriberRegistry::new(),
        })
    }

    fn publish_templates(&self, user_id: &str) {
        if !self.template_listeners.has_listeners(user_id) {
            return;
        }
        match self.list_templates(user_id) {
            Ok(snapshot) => self.template_listeners.notify(user_id, &snapshot),
            Err(e) => warn!(user_id, error = %e, "failed to refresh template listeners"),
        }
    }

    fn publish_history(&self, user_id: &str) {
        if !self.history_listeners.has_listeners(user_id) {
            return;
        }
        match self.list_history(user_id) {
            Ok(snapshot) => self.history_listeners.notify(user_id, &snapshot),
            Err(e) => warn!(user_id, error = %e, "failed to refresh history listeners"),
        }
    }

    /// Wipe every table (for testing or reset purposes)
    pub fn clear_all(&self) -> Result<(), GatewayError> {
        self.conn.execute_batch(
            "DELETE FROM workout_templates; DELETE FROM workout_history; DELETE FROM user_profiles;",
        )?;
        Ok(())
    }
}

impl PersistenceGateway for SqliteGateway {
    fn create_history_record(
        &self,
        user_id: &str,
        record: NewHistoryRecord,
    ) -> Result<String, GatewayError> {
        let id = Uuid::new_v4().to_string();
        self.conn.execute(
            r#"
            INSERT INTO workout_history
            (id, user_id, workout_name, muscle_group, duration, exercise_count, completed_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
            params![
                id,
                user_id,
                record.workout_name,
                record.muscle_group,
                record.duration,
                record.exercise_count as i64,
                timestamp(Utc::now()),
            ],
        )?;
        debug!(user_id, record_id = %id, "history record written");

        self.publish_history(user_id);
        Ok(id)
    }

    fn increment_counter(
        &self,
        user_id: &str,
        counter: Counter,
        delta: u64,
    ) -> Result<(), GatewayError> {
        self.conn.execute(
            "INSERT INTO user_profiles (user_id, display_name) VALUES (?1, '') ON CONFLICT(user_id) DO NOTHING",
            params![user_id],
        )?;
        let column = counter.column();
        self.conn.execute(
            &format!("UPDATE user_profiles SET {column} = {column} + ?2 WHERE user_id = ?1"),
            params![user_id, delta as i64],
        )?;
        Ok(())
    }

    fn subscribe_templates(
        &self,
        user_id: &str,
    ) -> Result<Subscription<Vec<WorkoutTemplate>>, GatewayError> {
        let initial = self.list_templates(user_id)?;
        Ok(self.template_listeners.subscribe(user_id, initial))
    }

    fn subscribe_history(
        &self,
        user_id: &str,
    ) -> Result<Subscription<Vec<WorkoutHistoryRecord>>, GatewayError> {
        let initial = self.list_history(user_id)?;
        Ok(self.history_listeners.subscribe(user_id, initial))
    }

    fn create_template(&self, template: &WorkoutTemplate) -> Result<(), GatewayError> {
        let exercises = serde_json::to_string(&template.exercises)?;
        self.conn.execute(
            r#"
            INSERT INTO workout_templates
            (id, user_id, name, muscle_group, duration_label, exercises, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
            params![
                template.id,
                template.user_id,
                template.name,
                template.muscle_group,
                template.duration_label,
                exercises,
                timestamp(template.created_at),
            ],
        )?;
        debug!(user_id = %template.user_id, template_id = %template.id, "template created");

        self.publish_templates(&template.user_id);
        Ok(())
    }

    fn update_template(&self, template: &WorkoutTemplate) -> Result<(), GatewayError> {
        let exercises = serde_json::to_string(&template.exercises)?;
        let changed = self.conn.execute(
            r#"
            UPDATE workout_templates
            SET name = ?3, muscle_group = ?4, duration_label = ?5, exercises = ?6
            WHERE id = ?1 AND user_id = ?2
            "#,
            params![
                template.id,
                template.user_id,
                template.name,
                template.muscle_group,
                template.duration_label,
                exercises,
            ],
        )?;
        if changed == 0 {
            return Err(GatewayError::NotFound {
                kind: "template",
                id: template.id.clone(),
            });
        }
        debug!(user_id = %template.user_id, template_id = %template.id, "template updated");

        self.publish_templates(&template.user_id);
        Ok(())
    }

    fn delete_template(&self, user_id: &str, template_id: &str) -> Result<(), GatewayError> {
        let changed = self.conn.execute(
            "DELETE FROM workout_templates WHERE id = ?1 AND user_id = ?2",
            params![template_id, user_id],
        )?;
        if changed == 0 {
            return Err(GatewayError::NotFound {
                kind: "template",
                id: template_id.to_string(),
            });
        }
        debug!(user_id, template_id, "template deleted");

        self.publish_templates(user_id);
        Ok(())
    }

    fn list_templates(&self, user_id: &str) -> Result<Vec<WorkoutTemplate>, GatewayError> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT id, user_id, name, muscle_group, duration_label, exercises, created_at
            FROM workout_templates
            WHERE user_id = ?1
            ORDER BY created_at DESC, rowid DESC
            "#,
        )?;

        let rows = stmt.query_map([user_id], row_to_template)?;
        let mut templates = Vec::new();
        for t in rows {
            templates.push(t?);
        }
        Ok(templates)
    }

    fn list_history(&self, user_id: &str) -> Result<Vec<WorkoutHistoryRecord>, GatewayError> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT id, user_id, workout_name, muscle_group, duration, exercise_count, completed_at
            FROM workout_history
            WHERE user_id = ?1
            ORDER BY completed_at DESC, rowid DESC
            "#,
        )?;

        let rows = stmt.query_map([user_id], row_to_history)?;
        let mut history = Vec::new();
        for r in rows {
            history.push(r?);
        }
        Ok(history)
    }

    fn load_profile(
        &self,
        user_id: &str,
        display_name: &str,
    ) -> Result<UserProfile, GatewayError> {
        self.conn.execute(
            r#"
            INSERT INTO user_profiles (user_id, display_name) VALUES (?1, ?2)
            ON CONFLICT(user_id) DO UPDATE SET display_name = excluded.display_name
            WHERE user_profiles.display_name = ''
            "#,
            params![user_id, display_name],
        )?;

        let profile = self
            .conn
            .query_row(
                "SELECT user_id, display_name, total_workouts, current_streak FROM user_profiles WHERE user_id = ?1",
                [user_id],
                |row| {
                    let total: i64 = row.get(2)?;
                    let streak: i64 = row.get(3)?;
                    Ok(UserProfile {
                        user_id: row.get(0)?,
                        display_name: row.get(1)?,
                        total_workouts: total.max(0) as u64,
                        current_streak: streak.max(0) as u64,
                    })
                },
            )
            .optional()?;

        profile.ok_or_else(|| GatewayError::NotFound {
            kind: "profile",
            id: user_id.to_string(),
        })
    }
}
