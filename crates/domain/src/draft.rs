use chrono::{DateTime, NaiveDate, Utc};
use thiserror::Error;

use crate::{Exercise, Minutes, NewWorkout, RestTime, Reps, Sets, WorkoutExercise};

const DEFAULT_SETS: u32 = 3;
const DEFAULT_REPS: u32 = 10;
const DEFAULT_REST: u32 = 60;

/// A workout being composed and timed before it is saved.
#[derive(Debug, Clone, PartialEq)]
pub struct WorkoutDraft {
    pub start_time: DateTime<Utc>,
    pub exercises: Vec<WorkoutExercise>,
}

impl WorkoutDraft {
    #[must_use]
    pub fn new(start_time: DateTime<Utc>) -> Self {
        Self {
            start_time,
            exercises: vec![],
        }
    }

    /// Append an exercise from the library with three sets of ten reps.
    pub fn add_exercise(&mut self, exercise: &Exercise) {
        self.exercises.push(WorkoutExercise {
            name: exercise.name.clone(),
            sets: Sets::new(DEFAULT_SETS).unwrap_or_default(),
            reps: vec![Reps::new(DEFAULT_REPS).unwrap_or_default(); DEFAULT_SETS as usize],
            notes: None,
            rest: RestTime::new(DEFAULT_REST).ok(),
        });
    }

    pub fn replace_exercise(
        &mut self,
        idx: usize,
        exercise: WorkoutExercise,
    ) -> Result<(), DraftError> {
        let entry = self
            .exercises
            .get_mut(idx)
            .ok_or(DraftError::NoSuchExercise(idx))?;
        *entry = exercise;
        Ok(())
    }

    pub fn remove_exercise(&mut self, idx: usize) -> Result<WorkoutExercise, DraftError> {
        if idx >= self.exercises.len() {
            return Err(DraftError::NoSuchExercise(idx));
        }
        Ok(self.exercises.remove(idx))
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.exercises.is_empty()
    }

    #[must_use]
    pub fn total_sets(&self) -> u32 {
        crate::workout::total_sets(&self.exercises)
    }

    #[must_use]
    pub fn total_reps(&self) -> u32 {
        crate::workout::total_reps(&self.exercises)
    }

    #[must_use]
    pub fn duration(&self, now: DateTime<Utc>) -> Minutes {
        Minutes::from_seconds((now - self.start_time).num_seconds())
    }

    /// Turn the draft into a workout ready to be saved.
    pub fn finish(self, now: DateTime<Utc>, date: NaiveDate) -> Result<NewWorkout, DraftError> {
        if self.is_empty() {
            return Err(DraftError::Empty);
        }
        let duration = self.duration(now);
        Ok(NewWorkout::new(self.exercises, duration, date))
    }
}

#[derive(Error, Debug, PartialEq)]
pub enum DraftError {
    #[error("Workout must contain at least one exercise")]
    Empty,
    #[error("No exercise at position {0}")]
    NoSuchExercise(usize),
}
