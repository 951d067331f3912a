use chrono::NaiveDate;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Achievements {
    /// Consecutive workout days up to today or yesterday.
    pub current_streak: u32,
    pub max_streak: u32,
    /// Number of workout dates, counting every workout on a shared day.
    pub total_workout_days: u32,
    pub last_workout_date: Option<NaiveDate>,
}

/// How several workouts on the same calendar day affect a streak.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum SameDayWorkouts {
    /// Every workout extends the running streak, so two workouts on one day count as two.
    Extend,
    /// Workouts on the same day count as a single streak day.
    #[default]
    Merge,
}

/// Compute streaks from the dates of a user's workouts.
///
/// The dates may arrive in any order. Two dates belong to the same streak if they are at most one
/// calendar day apart. The current streak is the streak of the latest date, provided that date is
/// at most one day away from `today`, and zero otherwise.
#[must_use]
pub fn achievements(
    dates: &[NaiveDate],
    today: NaiveDate,
    same_day_workouts: SameDayWorkouts,
) -> Achievements {
    let mut dates = dates.to_vec();
    dates.sort_unstable();

    let total_workout_days = saturating_u32(dates.len());

    if same_day_workouts == SameDayWorkouts::Merge {
        dates.dedup();
    }

    let Some(&last_workout_date) = dates.last() else {
        return Achievements::default();
    };

    let mut max_streak = 0;
    let mut streak = 1;

    for pair in dates.windows(2) {
        if days_between(pair[0], pair[1]) <= 1 {
            streak += 1;
        } else {
            max_streak = max_streak.max(streak);
            streak = 1;
        }
    }

    max_streak = max_streak.max(streak);

    let current_streak = if days_between(last_workout_date, today) <= 1 {
        streak
    } else {
        0
    };

    Achievements {
        current_streak,
        max_streak,
        total_workout_days,
        last_workout_date: Some(last_workout_date),
    }
}

fn days_between(a: NaiveDate, b: NaiveDate) -> i64 {
    (b - a).num_days().abs()
}

fn saturating_u32(value: usize) -> u32 {
    u32::try_from(value).unwrap_or(u32::MAX)
}
