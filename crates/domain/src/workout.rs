use chrono::{DateTime, NaiveDate, Utc};
use derive_more::Deref;
use uuid::Uuid;

use crate::{
    Achievements, CreateError, DeleteError, Minutes, Name, ReadError, RestTime, Reps, Session,
    Sets, UpdateError, UserID, WorkoutStats,
};

pub const RECENT_WORKOUTS_LIMIT: usize = 5;

#[allow(async_fn_in_trait)]
pub trait WorkoutService {
    async fn get_workouts(&self, session: &Session) -> Result<Vec<WorkoutRecord>, ReadError>;
    async fn get_recent_workouts(
        &self,
        session: &Session,
        limit: usize,
    ) -> Result<Vec<WorkoutRecord>, ReadError>;
    async fn get_workouts_between(
        &self,
        session: &Session,
        first: NaiveDate,
        last: NaiveDate,
    ) -> Result<Vec<WorkoutRecord>, ReadError>;
    async fn create_workout(
        &self,
        session: &Session,
        workout: NewWorkout,
    ) -> Result<WorkoutRecord, CreateError>;
    async fn modify_workout(
        &self,
        session: &Session,
        id: WorkoutID,
        changes: WorkoutChanges,
    ) -> Result<WorkoutRecord, UpdateError>;
    async fn delete_workout(
        &self,
        session: &Session,
        id: WorkoutID,
    ) -> Result<WorkoutID, DeleteError>;
    async fn get_workout_stats(&self, session: &Session) -> Result<WorkoutStats, ReadError>;
    async fn get_workout_achievements(&self, session: &Session)
    -> Result<Achievements, ReadError>;
    async fn get_dashboard(&self, session: &Session) -> Result<Dashboard, ReadError>;
}

/// Durable store of workout records.
///
/// Calls are independent of each other and may fail independently.
#[allow(async_fn_in_trait)]
pub trait WorkoutRepository {
    async fn read_workouts(&self, owner_id: &UserID) -> Result<Vec<WorkoutRecord>, ReadError>;

    /// The `limit` most recently persisted workouts, newest first.
    async fn read_recent_workouts(
        &self,
        owner_id: &UserID,
        limit: usize,
    ) -> Result<Vec<WorkoutRecord>, ReadError> {
        let mut workouts = self.read_workouts(owner_id).await?;
        sort_by_recency(&mut workouts);
        workouts.truncate(limit);
        Ok(workouts)
    }

    /// Workouts dated between `first` and `last` inclusive, newest date first.
    async fn read_workouts_between(
        &self,
        owner_id: &UserID,
        first: NaiveDate,
        last: NaiveDate,
    ) -> Result<Vec<WorkoutRecord>, ReadError> {
        Ok(workouts_between(
            self.read_workouts(owner_id).await?,
            first,
            last,
        ))
    }

    async fn create_workout(
        &self,
        owner_id: &UserID,
        workout: NewWorkout,
    ) -> Result<WorkoutRecord, CreateError>;
    async fn modify_workout(
        &self,
        id: WorkoutID,
        changes: WorkoutChanges,
    ) -> Result<WorkoutRecord, UpdateError>;
    async fn delete_workout(&self, id: WorkoutID) -> Result<WorkoutID, DeleteError>;
}

#[derive(Debug, Clone, PartialEq)]
pub struct WorkoutRecord {
    pub id: WorkoutID,
    pub owner_id: UserID,
    pub exercises: Vec<WorkoutExercise>,
    pub duration: Minutes,
    pub total_sets: u32,
    pub total_reps: u32,
    pub date: NaiveDate,
    pub created_at: DateTime<Utc>,
}

#[derive(Deref, Debug, Default, Clone, Copy, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub struct WorkoutID(Uuid);

impl WorkoutID {
    #[must_use]
    pub fn nil() -> Self {
        Self(Uuid::nil())
    }

    #[must_use]
    pub fn is_nil(&self) -> bool {
        self.0.is_nil()
    }
}

impl From<Uuid> for WorkoutID {
    fn from(value: Uuid) -> Self {
        Self(value)
    }
}

impl From<u128> for WorkoutID {
    fn from(value: u128) -> Self {
        Self(Uuid::from_bytes(value.to_be_bytes()))
    }
}

/// One exercise as performed within a workout.
#[derive(Debug, Clone, PartialEq)]
pub struct WorkoutExercise {
    pub name: Name,
    pub sets: Sets,
    pub reps: Vec<Reps>,
    pub notes: Option<String>,
    pub rest: Option<RestTime>,
}

impl WorkoutExercise {
    #[must_use]
    pub fn total_reps(&self) -> u32 {
        self.reps.iter().copied().sum()
    }
}

#[must_use]
pub fn total_sets(exercises: &[WorkoutExercise]) -> u32 {
    exercises.iter().map(|e| e.sets).sum()
}

#[must_use]
pub fn total_reps(exercises: &[WorkoutExercise]) -> u32 {
    exercises.iter().map(WorkoutExercise::total_reps).sum()
}

/// A workout about to be persisted.
///
/// The totals are derived from `exercises` once, at save time, and stored alongside them.
#[derive(Debug, Clone, PartialEq)]
pub struct NewWorkout {
    pub exercises: Vec<WorkoutExercise>,
    pub duration: Minutes,
    pub total_sets: u32,
    pub total_reps: u32,
    pub date: NaiveDate,
}

impl NewWorkout {
    #[must_use]
    pub fn new(exercises: Vec<WorkoutExercise>, duration: Minutes, date: NaiveDate) -> Self {
        Self {
            total_sets: total_sets(&exercises),
            total_reps: total_reps(&exercises),
            exercises,
            duration,
            date,
        }
    }
}

/// Partial update of a stored workout. Unset fields are left untouched.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct WorkoutChanges {
    pub exercises: Option<Vec<WorkoutExercise>>,
    pub duration: Option<Minutes>,
    pub date: Option<NaiveDate>,
}

impl WorkoutChanges {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.exercises.is_none() && self.duration.is_none() && self.date.is_none()
    }

    /// Totals to store together with changed exercises.
    #[must_use]
    pub fn totals(&self) -> Option<(u32, u32)> {
        self.exercises
            .as_ref()
            .map(|exercises| (total_sets(exercises), total_reps(exercises)))
    }

    pub fn apply(self, workout: &mut WorkoutRecord) {
        if let Some((sets, reps)) = self.totals() {
            workout.total_sets = sets;
            workout.total_reps = reps;
        }
        if let Some(exercises) = self.exercises {
            workout.exercises = exercises;
        }
        if let Some(duration) = self.duration {
            workout.duration = duration;
        }
        if let Some(date) = self.date {
            workout.date = date;
        }
    }
}

/// Everything the home screen shows, computed from a single fetch.
#[derive(Debug, Clone, PartialEq)]
pub struct Dashboard {
    pub stats: WorkoutStats,
    pub achievements: Achievements,
    pub recent_workouts: Vec<WorkoutRecord>,
}

/// Newest first by time of persistence.
pub fn sort_by_recency(workouts: &mut [WorkoutRecord]) {
    workouts.sort_by(|a, b| b.created_at.cmp(&a.created_at));
}

#[must_use]
pub fn workouts_between(
    workouts: Vec<WorkoutRecord>,
    first: NaiveDate,
    last: NaiveDate,
) -> Vec<WorkoutRecord> {
    let mut workouts = workouts
        .into_iter()
        .filter(|w| (first..=last).contains(&w.date))
        .collect::<Vec<_>>();
    workouts.sort_by(|a, b| b.date.cmp(&a.date));
    workouts
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;

    use super::*;

    fn exercise(name: &str, sets: u32, reps: &[u32]) -> WorkoutExercise {
        WorkoutExercise {
            name: Name::new(name).unwrap(),
            sets: Sets::new(sets).unwrap(),
            reps: reps.iter().map(|r| Reps::new(*r).unwrap()).collect(),
            notes: None,
            rest: None,
        }
    }

    fn workout(id: u128, date: NaiveDate, created_at: DateTime<Utc>) -> WorkoutRecord {
        WorkoutRecord {
            id: id.into(),
            owner_id: UserID::new("user_1").unwrap(),
            exercises: vec![],
            duration: Minutes::default(),
            total_sets: 0,
            total_reps: 0,
            date,
            created_at,
        }
    }

    fn date(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, day).unwrap()
    }

    #[test]
    fn test_new_workout_derives_totals() {
        let workout = NewWorkout::new(
            vec![
                exercise("Bench Press", 3, &[10, 8, 6]),
                exercise("Squat", 2, &[5, 5]),
            ],
            Minutes::new(45).unwrap(),
            date(1),
        );
        assert_eq!(workout.total_sets, 5);
        assert_eq!(workout.total_reps, 34);
    }

    #[test]
    fn test_new_workout_without_exercises() {
        let workout = NewWorkout::new(vec![], Minutes::default(), date(1));
        assert_eq!((workout.total_sets, workout.total_reps), (0, 0));
    }

    #[test]
    fn test_workout_changes_apply() {
        let mut record = workout(1, date(1), Utc.with_ymd_and_hms(2024, 1, 1, 8, 0, 0).unwrap());
        let changes = WorkoutChanges {
            exercises: Some(vec![exercise("Deadlift", 4, &[5, 5, 5, 3])]),
            duration: None,
            date: Some(date(2)),
        };
        assert!(!changes.is_empty());
        changes.apply(&mut record);
        assert_eq!(record.total_sets, 4);
        assert_eq!(record.total_reps, 18);
        assert_eq!(record.date, date(2));
        assert_eq!(record.duration, Minutes::default());
    }

    #[test]
    fn test_workout_changes_without_exercises_keep_totals() {
        let mut record = workout(1, date(1), Utc.with_ymd_and_hms(2024, 1, 1, 8, 0, 0).unwrap());
        record.total_sets = 7;
        record.total_reps = 70;
        let changes = WorkoutChanges {
            duration: Some(Minutes::new(30).unwrap()),
            ..WorkoutChanges::default()
        };
        assert_eq!(changes.totals(), None);
        changes.apply(&mut record);
        assert_eq!((record.total_sets, record.total_reps), (7, 70));
        assert_eq!(record.duration, Minutes::new(30).unwrap());
        assert!(WorkoutChanges::default().is_empty());
    }

    #[test]
    fn test_sort_by_recency() {
        let mut workouts = vec![
            workout(1, date(3), Utc.with_ymd_and_hms(2024, 1, 1, 8, 0, 0).unwrap()),
            workout(2, date(1), Utc.with_ymd_and_hms(2024, 1, 3, 8, 0, 0).unwrap()),
            workout(3, date(2), Utc.with_ymd_and_hms(2024, 1, 2, 8, 0, 0).unwrap()),
        ];
        sort_by_recency(&mut workouts);
        assert_eq!(
            workouts.iter().map(|w| w.id).collect::<Vec<_>>(),
            vec![2.into(), 3.into(), 1.into()]
        );
    }

    #[test]
    fn test_workouts_between() {
        let created_at = Utc.with_ymd_and_hms(2024, 1, 1, 8, 0, 0).unwrap();
        let workouts = vec![
            workout(1, date(1), created_at),
            workout(2, date(5), created_at),
            workout(3, date(3), created_at),
            workout(4, date(9), created_at),
        ];
        assert_eq!(
            workouts_between(workouts, date(3), date(5))
                .iter()
                .map(|w| w.id)
                .collect::<Vec<_>>(),
            vec![2.into(), 3.into()]
        );
    }

    #[test]
    fn test_workout_id_nil() {
        assert!(WorkoutID::nil().is_nil());
        assert!(!WorkoutID::from(1).is_nil());
    }
}
