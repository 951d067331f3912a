use crate::WorkoutRecord;

/// Aggregate over all workouts of one user.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct WorkoutStats {
    pub total_workouts: u64,
    pub total_sets: u64,
    pub total_reps: u64,
    pub total_minutes: u64,
    pub average_workout_duration: u64,
    pub average_sets_per_workout: u64,
    pub average_reps_per_workout: u64,
}

/// Summarize a user's workouts.
///
/// The stored totals of each record are trusted as is. The order of `workouts` does not matter
/// and an empty input yields all-zero statistics. Averages are rounded to the nearest integer,
/// with halves rounded up.
#[must_use]
pub fn workout_stats<'a>(workouts: impl IntoIterator<Item = &'a WorkoutRecord>) -> WorkoutStats {
    let mut stats = workouts
        .into_iter()
        .fold(WorkoutStats::default(), |mut stats, workout| {
            stats.total_workouts += 1;
            stats.total_sets += u64::from(workout.total_sets);
            stats.total_reps += u64::from(workout.total_reps);
            stats.total_minutes += u64::from(u32::from(workout.duration));
            stats
        });

    stats.average_workout_duration = rounded_average(stats.total_minutes, stats.total_workouts);
    stats.average_sets_per_workout = rounded_average(stats.total_sets, stats.total_workouts);
    stats.average_reps_per_workout = rounded_average(stats.total_reps, stats.total_workouts);

    stats
}

fn rounded_average(total: u64, count: u64) -> u64 {
    if count == 0 {
        return 0;
    }
    (2 * total + count) / (2 * count)
}
