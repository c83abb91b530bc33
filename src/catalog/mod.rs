use include_dir::{include_dir, Dir};
use itertools::Itertools;
use serde::{Deserialize, Serialize};

use crate::error::{GymError, Result};

static CATALOG_DIR: Dir = include_dir!("$CARGO_MANIFEST_DIR/src/catalog");

const CATALOG_FILE: &str = "exercises.json";

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    clap::ValueEnum,
    strum_macros::Display,
)]
#[serde(rename_all = "snake_case")]
pub enum MuscleGroup {
    Chest,
    Back,
    Legs,
    Shoulders,
    Arms,
    Core,
    #[strum(serialize = "Full Body")]
    FullBody,
    Cardio,
}

impl MuscleGroup {
    pub const ALL: [MuscleGroup; 8] = [
        MuscleGroup::Chest,
        MuscleGroup::Back,
        MuscleGroup::Legs,
        MuscleGroup::Shoulders,
        MuscleGroup::Arms,
        MuscleGroup::Core,
        MuscleGroup::FullBody,
        MuscleGroup::Cardio,
    ];

    /// Cycle used by the builder's muscle-group picker.
    pub fn next(self) -> Self {
        let idx = Self::ALL.iter().position(|g| *g == self).unwrap_or(0);
        Self::ALL[(idx + 1) % Self::ALL.len()]
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Exercise {
    pub id: String,
    pub name: String,
    pub muscle_group: MuscleGroup,
    pub equipment: String,
    pub description: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Catalog {
    pub name: String,
    exercises: Vec<Exercise>,
}

impl Catalog {
    /// Parse the catalog bundled into the binary.
    pub fn load() -> Result<Self> {
        let file = CATALOG_DIR
            .get_file(CATALOG_FILE)
            .ok_or_else(|| GymError::Catalog(format!("{CATALOG_FILE} not bundled")))?;

        let contents = file
            .contents_utf8()
            .ok_or_else(|| GymError::Catalog(format!("{CATALOG_FILE} is not utf-8")))?;

        serde_json::from_str(contents).map_err(|e| GymError::Catalog(e.to_string()))
    }

    pub fn all(&self) -> &[Exercise] {
        &self.exercises
    }

    pub fn by_id(&self, id: &str) -> Option<&Exercise> {
        self.exercises.iter().find(|e| e.id == id)
    }

    pub fn by_muscle_group(&self, group: MuscleGroup) -> Vec<&Exercise> {
        self.exercises
            .iter()
            .filter(|e| e.muscle_group == group)
            .collect()
    }

    /// Distinct groups in the order they first appear.
    pub fn muscle_groups(&self) -> Vec<MuscleGroup> {
        self.exercises
            .iter()
            .map(|e| e.muscle_group)
            .unique()
            .collect()
    }
}
