//! Volatile storage keeping all rows in process memory.

use std::{
    collections::BTreeMap,
    sync::{Mutex, MutexGuard},
};

use chrono::Utc;
use fitlog_domain as domain;
use log::debug;
use uuid::Uuid;

#[derive(Default)]
pub struct InMemory {
    workouts: Mutex<BTreeMap<domain::WorkoutID, domain::WorkoutRecord>>,
    exercises: Mutex<BTreeMap<domain::ExerciseID, domain::Exercise>>,
}

impl InMemory {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_exercises(exercises: impl IntoIterator<Item = domain::Exercise>) -> Self {
        Self {
            workouts: Mutex::default(),
            exercises: Mutex::new(exercises.into_iter().map(|e| (e.id, e)).collect()),
        }
    }
}

fn lock<T>(mutex: &Mutex<T>) -> Result<MutexGuard<'_, T>, domain::StorageError> {
    mutex
        .lock()
        .map_err(|err| domain::StorageError::Other(err.to_string().into()))
}

impl domain::WorkoutRepository for InMemory {
    async fn read_workouts(
        &self,
        owner_id: &domain::UserID,
    ) -> Result<Vec<domain::WorkoutRecord>, domain::ReadError> {
        Ok(lock(&self.workouts)?
            .values()
            .filter(|w| w.owner_id == *owner_id)
            .cloned()
            .collect())
    }

    async fn create_workout(
        &self,
        owner_id: &domain::UserID,
        workout: domain::NewWorkout,
    ) -> Result<domain::WorkoutRecord, domain::CreateError> {
        let record = domain::WorkoutRecord {
            id: Uuid::new_v4().into(),
            owner_id: owner_id.clone(),
            exercises: workout.exercises,
            duration: workout.duration,
            total_sets: workout.total_sets,
            total_reps: workout.total_reps,
            date: workout.date,
            created_at: Utc::now(),
        };
        lock(&self.workouts)?.insert(record.id, record.clone());
        debug!("stored workout {}", *record.id);
        Ok(record)
    }

    async fn modify_workout(
        &self,
        id: domain::WorkoutID,
        changes: domain::WorkoutChanges,
    ) -> Result<domain::WorkoutRecord, domain::UpdateError> {
        let mut workouts = lock(&self.workouts)?;
        let workout = workouts.get_mut(&id).ok_or(domain::UpdateError::NotFound)?;
        changes.apply(workout);
        Ok(workout.clone())
    }

    async fn delete_workout(
        &self,
        id: domain::WorkoutID,
    ) -> Result<domain::WorkoutID, domain::DeleteError> {
        lock(&self.workouts)?
            .remove(&id)
            .map(|_| id)
            .ok_or(domain::DeleteError::NotFound)
    }
}

impl domain::ExerciseRepository for InMemory {
    async fn read_exercises(&self) -> Result<Vec<domain::Exercise>, domain::ReadError> {
        Ok(lock(&self.exercises)?.values().cloned().collect())
    }

    async fn create_exercise(
        &self,
        exercise: domain::NewExercise,
    ) -> Result<domain::Exercise, domain::CreateError> {
        let mut exercises = lock(&self.exercises)?;
        if exercises.values().any(|e| e.name == exercise.name) {
            return Err(domain::CreateError::Conflict);
        }
        let exercise = domain::Exercise {
            id: Uuid::new_v4().into(),
            name: exercise.name,
            muscle_group: exercise.muscle_group,
            instructions: exercise.instructions,
            difficulty: exercise.difficulty,
        };
        exercises.insert(exercise.id, exercise.clone());
        Ok(exercise)
    }

    async fn replace_exercise(
        &self,
        exercise: domain::Exercise,
    ) -> Result<domain::Exercise, domain::UpdateError> {
        let mut exercises = lock(&self.exercises)?;
        if !exercises.contains_key(&exercise.id) {
            return Err(domain::UpdateError::NotFound);
        }
        if exercises
            .values()
            .any(|e| e.id != exercise.id && e.name == exercise.name)
        {
            return Err(domain::UpdateError::Conflict);
        }
        exercises.insert(exercise.id, exercise.clone());
        Ok(exercise)
    }

    async fn delete_exercise(
        &self,
        id: domain::ExerciseID,
    ) -> Result<domain::ExerciseID, domain::DeleteError> {
        lock(&self.exercises)?
            .remove(&id)
            .map(|_| id)
            .ok_or(domain::DeleteError::NotFound)
    }
}
