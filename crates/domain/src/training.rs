use std::{fmt, iter::Sum};

use derive_more::{Display, Into};

#[derive(Debug, Default, Display, Clone, Copy, Into, PartialEq, Eq, PartialOrd, Ord)]
pub struct Reps(u32);

impl Reps {
    pub fn new(value: u32) -> Result<Self, RepsError> {
        if !(0..1000).contains(&value) {
            return Err(RepsError::OutOfRange);
        }

        Ok(Self(value))
    }
}

impl TryFrom<&str> for Reps {
    type Error = RepsError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.trim().parse::<u32>() {
            Ok(parsed_value) => Reps::new(parsed_value),
            Err(_) => Err(RepsError::ParseError),
        }
    }
}

#[derive(thiserror::Error, Debug, PartialEq)]
pub enum RepsError {
    #[error("Reps must be in the range 0 to 999")]
    OutOfRange,
    #[error("Reps must be an integer")]
    ParseError,
}

#[derive(Debug, Default, Display, Clone, Copy, Into, PartialEq, Eq, PartialOrd, Ord)]
pub struct Sets(u32);

impl Sets {
    pub fn new(value: u32) -> Result<Self, SetsError> {
        if !(0..1000).contains(&value) {
            return Err(SetsError::OutOfRange);
        }

        Ok(Self(value))
    }
}

impl TryFrom<&str> for Sets {
    type Error = SetsError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.trim().parse::<u32>() {
            Ok(parsed_value) => Sets::new(parsed_value),
            Err(_) => Err(SetsError::ParseError),
        }
    }
}

#[derive(thiserror::Error, Debug, PartialEq)]
pub enum SetsError {
    #[error("Sets must be in the range 0 to 999")]
    OutOfRange,
    #[error("Sets must be an integer")]
    ParseError,
}

/// Whole minutes of a workout session.
#[derive(Debug, Default, Display, Clone, Copy, Into, PartialEq, Eq, PartialOrd, Ord)]
pub struct Minutes(u32);

impl Minutes {
    pub fn new(value: u32) -> Result<Self, MinutesError> {
        if !(0..1440).contains(&value) {
            return Err(MinutesError::OutOfRange);
        }

        Ok(Self(value))
    }

    /// Elapsed time in whole minutes, truncated and saturated at the upper bound.
    #[must_use]
    pub fn from_seconds(seconds: i64) -> Self {
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let minutes = (seconds.max(0) / 60).min(1439) as u32;
        Self(minutes)
    }
}

impl TryFrom<&str> for Minutes {
    type Error = MinutesError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.trim().parse::<u32>() {
            Ok(parsed_value) => Minutes::new(parsed_value),
            Err(_) => Err(MinutesError::ParseError),
        }
    }
}

#[derive(thiserror::Error, Debug, PartialEq)]
pub enum MinutesError {
    #[error("Duration must be in the range 0 to 1439 min")]
    OutOfRange,
    #[error("Duration must be an integer")]
    ParseError,
}

/// Rest interval between sets in seconds.
#[derive(Debug, Default, Clone, Copy, Into, PartialEq, Eq, PartialOrd, Ord)]
pub struct RestTime(u32);

impl RestTime {
    pub fn new(value: u32) -> Result<Self, RestTimeError> {
        if !(0..=3600).contains(&value) {
            return Err(RestTimeError::OutOfRange);
        }

        Ok(Self(value))
    }
}

impl TryFrom<&str> for RestTime {
    type Error = RestTimeError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let value = value.trim();
        match value.strip_suffix('s').unwrap_or(value).trim().parse::<u32>() {
            Ok(parsed_value) => RestTime::new(parsed_value),
            Err(_) => Err(RestTimeError::ParseError),
        }
    }
}

impl fmt::Display for RestTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}s", self.0)
    }
}

#[derive(thiserror::Error, Debug, PartialEq)]
pub enum RestTimeError {
    #[error("Rest time must be in the range 0 to 3600 s")]
    OutOfRange,
    #[error("Rest time must be an integer number of seconds")]
    ParseError,
}

impl Sum<Reps> for u32 {
    fn sum<I: Iterator<Item = Reps>>(iter: I) -> Self {
        iter.map(u32::from).sum()
    }
}

impl Sum<Sets> for u32 {
    fn sum<I: Iterator<Item = Sets>>(iter: I) -> Self {
        iter.map(u32::from).sum()
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case(0, Ok(Reps(0)))]
    #[case(999, Ok(Reps(999)))]
    #[case(1000, Err(RepsError::OutOfRange))]
    fn test_reps_new(#[case] input: u32, #[case] expected: Result<Reps, RepsError>) {
        assert_eq!(Reps::new(input), expected);
    }

    #[rstest]
    #[case("12", Ok(Reps(12)))]
    #[case(" 8 ", Ok(Reps(8)))]
    #[case("1000", Err(RepsError::OutOfRange))]
    #[case("4.", Err(RepsError::ParseError))]
    #[case("", Err(RepsError::ParseError))]
    fn test_reps_from_str(#[case] input: &str, #[case] expected: Result<Reps, RepsError>) {
        assert_eq!(Reps::try_from(input), expected);
    }

    #[rstest]
    #[case("3", Ok(Sets(3)))]
    #[case("1000", Err(SetsError::OutOfRange))]
    #[case("-1", Err(SetsError::ParseError))]
    fn test_sets_from_str(#[case] input: &str, #[case] expected: Result<Sets, SetsError>) {
        assert_eq!(Sets::try_from(input), expected);
    }

    #[rstest]
    #[case(45, Ok(Minutes(45)))]
    #[case(1439, Ok(Minutes(1439)))]
    #[case(1440, Err(MinutesError::OutOfRange))]
    fn test_minutes_new(#[case] input: u32, #[case] expected: Result<Minutes, MinutesError>) {
        assert_eq!(Minutes::new(input), expected);
    }

    #[rstest]
    #[case(-5, Minutes(0))]
    #[case(59, Minutes(0))]
    #[case(60, Minutes(1))]
    #[case(3599, Minutes(59))]
    #[case(200_000, Minutes(1439))]
    fn test_minutes_from_seconds(#[case] seconds: i64, #[case] expected: Minutes) {
        assert_eq!(Minutes::from_seconds(seconds), expected);
    }

    #[rstest]
    #[case("60s", Ok(RestTime(60)))]
    #[case("90", Ok(RestTime(90)))]
    #[case(" 45 s ", Ok(RestTime(45)))]
    #[case("3601", Err(RestTimeError::OutOfRange))]
    #[case("1m", Err(RestTimeError::ParseError))]
    fn test_rest_time_from_str(
        #[case] input: &str,
        #[case] expected: Result<RestTime, RestTimeError>,
    ) {
        assert_eq!(RestTime::try_from(input), expected);
    }

    #[test]
    fn test_rest_time_display() {
        assert_eq!(RestTime(60).to_string(), "60s");
    }

    #[test]
    fn test_sum_reps() {
        assert_eq!([Reps(10), Reps(8), Reps(6)].into_iter().sum::<u32>(), 24);
    }
}
