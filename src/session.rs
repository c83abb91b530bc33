use std::collections::BTreeSet;

use crate::models::WorkoutTemplate;
use crate::util::format_duration;

/// Period of the session timer.
pub const TICK_SECS: u64 = 1;

/// One live, timed run of a template. Lives in memory only; nothing here is
/// written until the session is finished.
#[derive(Debug, Clone, PartialEq)]
pub struct WorkoutSession {
    pub template: WorkoutTemplate,
    pub elapsed_secs: u64,
    /// 0-based positions into `template.exercises`.
    pub completed: BTreeSet<usize>,
}

impl WorkoutSession {
    pub fn new(template: WorkoutTemplate) -> Self {
        Self {
            template,
            elapsed_secs: 0,
            completed: BTreeSet::new(),
        }
    }

    pub fn tick(&mut self) {
        self.elapsed_secs += TICK_SECS;
    }

    /// Flip the completion mark at `index`. Returns false when the index is
    /// outside the exercise list, in which case nothing changes.
    pub fn toggle(&mut self, index: usize) -> bool {
        if index >= self.template.exercises.len() {
            return false;
        }
        if !self.completed.remove(&index) {
            self.completed.insert(index);
        }
        true
    }

    pub fn is_complete(&self, index: usize) -> bool {
        self.completed.contains(&index)
    }

    pub fn completed_count(&self) -> usize {
        self.completed.len()
    }

    pub fn formatted_elapsed(&self) -> String {
        format_duration(self.elapsed_secs)
    }
}
