//! Weekly study-hour goal model.
//!
//! # Invariants
//! - `weekly_hours` is strictly positive.
//! - `current_hours` never goes below zero.
//! - `week_start` is always a Sunday.

use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Goal used when nothing has been persisted yet.
pub const DEFAULT_WEEKLY_HOURS: f64 = 20.0;

/// Weekly goal state with accumulated progress for the tracked week.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudyGoal {
    pub weekly_hours: f64,
    #[serde(default)]
    pub current_hours: f64,
    /// Sunday that opens the tracked week; midnight is implied.
    pub week_start: NaiveDate,
}

impl StudyGoal {
    /// Creates a goal with zero progress for the week containing `now`.
    pub fn new(weekly_hours: f64, now: NaiveDateTime) -> Self {
        Self {
            weekly_hours,
            current_hours: 0.0,
            week_start: week_start(now),
        }
    }

    /// Share of the weekly goal reached, capped at 100.
    pub fn progress_percent(&self) -> f64 {
        if self.weekly_hours <= 0.0 {
            return 0.0;
        }
        (self.current_hours / self.weekly_hours * 100.0).min(100.0)
    }

    pub fn is_met(&self) -> bool {
        self.current_hours >= self.weekly_hours
    }
}

/// Returns the Sunday on or before `now`.
pub fn week_start(now: NaiveDateTime) -> NaiveDate {
    let date = now.date();
    date - Duration::days(i64::from(date.weekday().num_days_from_sunday()))
}

/// Validation failures for goal input.
#[derive(Debug, Clone, PartialEq)]
pub enum GoalValidationError {
    NonPositiveWeeklyHours(f64),
}

impl Display for GoalValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NonPositiveWeeklyHours(hours) => {
                write!(f, "weekly study goal must be greater than zero, got {hours}")
            }
        }
    }
}

impl GoalValidationError {
    pub fn code(&self) -> &'static str {
        match self {
            Self::NonPositiveWeeklyHours(_) => "non_positive_weekly_hours",
        }
    }
}

impl Error for GoalValidationError {}

/// Rejects zero, negative and non-finite goal values.
pub fn validate_weekly_hours(hours: f64) -> Result<f64, GoalValidationError> {
    if hours.is_finite() && hours > 0.0 {
        Ok(hours)
    } else {
        Err(GoalValidationError::NonPositiveWeeklyHours(hours))
    }
}

#[cfg(test)]
mod tests {
    use super::{validate_weekly_hours, week_start, StudyGoal};
    use chrono::NaiveDate;

    fn at(y: i32, m: u32, d: u32, h: u32) -> chrono::NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(h, 0, 0)
            .unwrap()
    }

    #[test]
    fn week_start_is_previous_or_same_sunday() {
        let sunday = NaiveDate::from_ymd_opt(2026, 10, 11).unwrap();
        assert_eq!(week_start(at(2026, 10, 11, 0)), sunday);
        assert_eq!(week_start(at(2026, 10, 17, 23)), sunday);
        assert_eq!(
            week_start(at(2026, 10, 18, 8)),
            NaiveDate::from_ymd_opt(2026, 10, 18).unwrap()
        );
    }

    #[test]
    fn progress_is_capped_at_one_hundred() {
        let mut goal = StudyGoal::new(10.0, at(2026, 10, 17, 9));
        goal.current_hours = 5.0;
        assert_eq!(goal.progress_percent(), 50.0);
        goal.current_hours = 25.0;
        assert_eq!(goal.progress_percent(), 100.0);
        assert!(goal.is_met());
    }

    #[test]
    fn weekly_hours_must_be_positive() {
        assert!(validate_weekly_hours(0.0).is_err());
        assert!(validate_weekly_hours(-2.0).is_err());
        assert!(validate_weekly_hours(f64::NAN).is_err());
        assert_eq!(validate_weekly_hours(12.5), Ok(12.5));
    }
}
