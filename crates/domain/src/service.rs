use chrono::{NaiveDate, Utc};
use log::{debug, error};

use crate::{
    Achievements, CreateError, Dashboard, DeleteError, Exercise, ExerciseID, ExerciseRepository,
    ExerciseService, MuscleGroup, NewExercise, NewWorkout, RECENT_WORKOUTS_LIMIT, ReadError,
    SameDayWorkouts, Session, UpdateError, WorkoutChanges, WorkoutID, WorkoutRecord,
    WorkoutRepository, WorkoutService, WorkoutStats, achievements, sort_by_recency,
    workout_stats,
};

pub struct Service<R> {
    repository: R,
    same_day_workouts: SameDayWorkouts,
}

impl<R> Service<R> {
    pub fn new(repository: R) -> Self {
        Self {
            repository,
            same_day_workouts: SameDayWorkouts::default(),
        }
    }

    #[must_use]
    pub fn with_same_day_workouts(mut self, same_day_workouts: SameDayWorkouts) -> Self {
        self.same_day_workouts = same_day_workouts;
        self
    }

    fn achievements(&self, workouts: &[WorkoutRecord], today: NaiveDate) -> Achievements {
        let dates = workouts.iter().map(|w| w.date).collect::<Vec<_>>();
        achievements(&dates, today, self.same_day_workouts)
    }
}

macro_rules! log_on_error {
    ($func: expr, $error: ident, $action: literal, $entity: literal) => {{
        let result = $func.await;
        match result {
            Ok(_) => {}
            Err(ref err) => match err {
                $error::Storage(crate::StorageError::NoConnection) => {
                    debug!("failed to {} {}: {err}", $action, $entity);
                }
                _ => {
                    error!("failed to {} {}: {err}", $action, $entity);
                }
            },
        }
        result
    }};
}

impl<R: WorkoutRepository> Service<R> {
    async fn read_workouts(&self, session: &Session) -> Result<Vec<WorkoutRecord>, ReadError> {
        log_on_error!(
            self.repository.read_workouts(&session.user_id),
            ReadError,
            "get",
            "workouts"
        )
    }

    async fn read_owned_workout(
        &self,
        session: &Session,
        id: WorkoutID,
    ) -> Result<WorkoutRecord, ReadError> {
        self.repository
            .read_workouts(&session.user_id)
            .await?
            .into_iter()
            .find(|w| w.id == id)
            .ok_or(ReadError::NotFound)
    }

    async fn modify_owned_workout(
        &self,
        session: &Session,
        id: WorkoutID,
        changes: WorkoutChanges,
    ) -> Result<WorkoutRecord, UpdateError> {
        let workout = self.read_owned_workout(session, id).await?;
        if changes.is_empty() {
            return Ok(workout);
        }
        self.repository.modify_workout(id, changes).await
    }

    async fn delete_owned_workout(
        &self,
        session: &Session,
        id: WorkoutID,
    ) -> Result<WorkoutID, DeleteError> {
        self.read_owned_workout(session, id).await?;
        self.repository.delete_workout(id).await
    }
}

impl<R: WorkoutRepository> WorkoutService for Service<R> {
    async fn get_workouts(&self, session: &Session) -> Result<Vec<WorkoutRecord>, ReadError> {
        let mut workouts = self.read_workouts(session).await?;
        sort_by_recency(&mut workouts);
        Ok(workouts)
    }

    async fn get_recent_workouts(
        &self,
        session: &Session,
        limit: usize,
    ) -> Result<Vec<WorkoutRecord>, ReadError> {
        log_on_error!(
            self.repository
                .read_recent_workouts(&session.user_id, limit),
            ReadError,
            "get",
            "recent workouts"
        )
    }

    async fn get_workouts_between(
        &self,
        session: &Session,
        first: NaiveDate,
        last: NaiveDate,
    ) -> Result<Vec<WorkoutRecord>, ReadError> {
        log_on_error!(
            self.repository
                .read_workouts_between(&session.user_id, first, last),
            ReadError,
            "get",
            "workouts"
        )
    }

    async fn create_workout(
        &self,
        session: &Session,
        workout: NewWorkout,
    ) -> Result<WorkoutRecord, CreateError> {
        log_on_error!(
            self.repository.create_workout(&session.user_id, workout),
            CreateError,
            "create",
            "workout"
        )
    }

    async fn modify_workout(
        &self,
        session: &Session,
        id: WorkoutID,
        changes: WorkoutChanges,
    ) -> Result<WorkoutRecord, UpdateError> {
        log_on_error!(
            self.modify_owned_workout(session, id, changes),
            UpdateError,
            "modify",
            "workout"
        )
    }

    async fn delete_workout(
        &self,
        session: &Session,
        id: WorkoutID,
    ) -> Result<WorkoutID, DeleteError> {
        log_on_error!(
            self.delete_owned_workout(session, id),
            DeleteError,
            "delete",
            "workout"
        )
    }

    async fn get_workout_stats(&self, session: &Session) -> Result<WorkoutStats, ReadError> {
        let workouts = self.read_workouts(session).await?;
        let stats = workout_stats(&workouts);
        debug!("calculated workout statistics: {stats:?}");
        Ok(stats)
    }

    async fn get_workout_achievements(
        &self,
        session: &Session,
    ) -> Result<Achievements, ReadError> {
        let workouts = self.read_workouts(session).await?;
        Ok(self.achievements(&workouts, Utc::now().date_naive()))
    }

    async fn get_dashboard(&self, session: &Session) -> Result<Dashboard, ReadError> {
        let mut workouts = self.read_workouts(session).await?;
        let stats = workout_stats(&workouts);
        let achievements = self.achievements(&workouts, Utc::now().date_naive());
        sort_by_recency(&mut workouts);
        workouts.truncate(RECENT_WORKOUTS_LIMIT);
        Ok(Dashboard {
            stats,
            achievements,
            recent_workouts: workouts,
        })
    }
}

impl<R: ExerciseRepository> ExerciseService for Service<R> {
    async fn get_exercises(&self) -> Result<Vec<Exercise>, ReadError> {
        let mut exercises = log_on_error!(
            self.repository.read_exercises(),
            ReadError,
            "get",
            "exercises"
        )?;
        exercises.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(exercises)
    }

    async fn get_exercises_by_muscle_group(
        &self,
        muscle_group: MuscleGroup,
    ) -> Result<Vec<Exercise>, ReadError> {
        Ok(self
            .get_exercises()
            .await?
            .into_iter()
            .filter(|e| e.muscle_group == muscle_group)
            .collect())
    }

    async fn create_exercise(&self, exercise: NewExercise) -> Result<Exercise, CreateError> {
        log_on_error!(
            self.repository.create_exercise(exercise),
            CreateError,
            "create",
            "exercise"
        )
    }

    async fn replace_exercise(&self, exercise: Exercise) -> Result<Exercise, UpdateError> {
        log_on_error!(
            self.repository.replace_exercise(exercise),
            UpdateError,
            "replace",
            "exercise"
        )
    }

    async fn delete_exercise(&self, id: ExerciseID) -> Result<ExerciseID, DeleteError> {
        log_on_error!(
            self.repository.delete_exercise(id),
            DeleteError,
            "delete",
            "exercise"
        )
    }
}
