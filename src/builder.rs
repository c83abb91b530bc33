use chrono::Utc;
use tracing::{debug, info};
use uuid::Uuid;

use crate::auth::Member;
use crate::catalog::{Exercise, MuscleGroup};
use crate::error::{Result, ValidationError};
use crate::gateway::PersistenceGateway;
use crate::models::{WorkoutExerciseRef, WorkoutTemplate};

pub const DEFAULT_SETS: &str = "3";
pub const DEFAULT_REPS: &str = "10";

/// In-memory draft of a template. Nothing is stored until `save`.
#[derive(Debug, Clone, PartialEq)]
pub struct TemplateBuilder {
    /// Set when editing an existing template; saving then overwrites it.
    editing: Option<WorkoutTemplate>,
    pub name: String,
    pub muscle_group: String,
    pub duration_label: String,
    pub exercises: Vec<WorkoutExerciseRef>,
}

impl Default for TemplateBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl TemplateBuilder {
    pub fn new() -> Self {
        Self {
            editing: None,
            name: String::new(),
            muscle_group: MuscleGroup::FullBody.to_string(),
            duration_label: String::new(),
            exercises: Vec::new(),
        }
    }

    /// Start a draft from an existing template.
    pub fn edit(template: WorkoutTemplate) -> Self {
        Self {
            name: template.name.clone(),
            muscle_group: template.muscle_group.clone(),
            duration_label: template.duration_label.clone(),
            exercises: template.exercises.clone(),
            editing: Some(template),
        }
    }

    pub fn is_editing(&self) -> bool {
        self.editing.is_some()
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    pub fn set_muscle_group(&mut self, group: MuscleGroup) {
        self.muscle_group = group.to_string();
    }

    pub fn set_duration_label(&mut self, label: impl Into<String>) {
        self.duration_label = label.into();
    }

    pub fn add_exercise(&mut self, exercise: &Exercise) {
        self.exercises.push(WorkoutExerciseRef {
            exercise_id: exercise.id.clone(),
            name: exercise.name.clone(),
            muscle_group: exercise.muscle_group.to_string(),
            sets: DEFAULT_SETS.to_string(),
            reps: DEFAULT_REPS.to_string(),
        });
    }

    pub fn remove_exercise(&mut self, index: usize) -> Option<WorkoutExerciseRef> {
        (index < self.exercises.len()).then(|| self.exercises.remove(index))
    }

    pub fn set_sets(&mut self, index: usize, sets: impl Into<String>) {
        if let Some(ex) = self.exercises.get_mut(index) {
            ex.sets = sets.into();
        }
    }

    pub fn set_reps(&mut self, index: usize, reps: impl Into<String>) {
        if let Some(ex) = self.exercises.get_mut(index) {
            ex.reps = reps.into();
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.name.trim().is_empty() {
            return Err(ValidationError::MissingName);
        }
        if self.duration_label.trim().is_empty() {
            return Err(ValidationError::MissingDuration);
        }
        Ok(())
    }

    /// Validate, then create a new template or overwrite the one being edited.
    pub fn save<G: PersistenceGateway + ?Sized>(
        &self,
        gateway: &G,
        member: &Member,
    ) -> Result<WorkoutTemplate> {
        if let Err(e) = self.validate() {
            debug!(error = %e, "template draft rejected");
            return Err(e.into());
        }

        match &self.editing {
            Some(existing) => {
                let template = WorkoutTemplate {
                    name: self.name.trim().to_string(),
                    muscle_group: self.muscle_group.clone(),
                    duration_label: self.duration_label.trim().to_string(),
                    exercises: self.exercises.clone(),
                    ..existing.clone()
                };
                gateway.update_template(&template)?;
                info!(template_id = %template.id, "template updated");
                Ok(template)
            }
            None => {
                let template = WorkoutTemplate {
                    id: Uuid::new_v4().to_string(),
                    user_id: member.user_id.clone(),
                    name: self.name.trim().to_string(),
                    muscle_group: self.muscle_group.clone(),
                    duration_label: self.duration_label.trim().to_string(),
                    exercises: self.exercises.clone(),
                    created_at: Utc::now(),
                };
                gateway.create_template(&template)?;
                info!(template_id = %template.id, "template created");
                Ok(template)
            }
        }
    }
}
