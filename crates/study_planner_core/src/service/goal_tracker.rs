//! Weekly goal tracker.
//!
//! # Responsibility
//! - Own the `StudyGoal` and apply completion deltas, goal changes and
//!   week rollover.
//!
//! # Invariants
//! - `current_hours` is clamped at zero after every delta.
//! - Rollover only moves `week_start` forward.

use crate::model::goal::{validate_weekly_hours, week_start, GoalValidationError, StudyGoal};
use chrono::NaiveDateTime;

/// Direction of a completion change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompletionChange {
    Completed,
    Uncompleted,
}

impl CompletionChange {
    pub fn from_completed(completed: bool) -> Self {
        if completed {
            Self::Completed
        } else {
            Self::Uncompleted
        }
    }

    fn sign(self) -> f64 {
        match self {
            Self::Completed => 1.0,
            Self::Uncompleted => -1.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct GoalTracker {
    goal: StudyGoal,
}

impl GoalTracker {
    pub fn new(goal: StudyGoal) -> Self {
        Self { goal }
    }

    pub fn goal(&self) -> &StudyGoal {
        &self.goal
    }

    /// Adds or removes `hours` of progress, never going below zero.
    pub fn apply_completion_delta(&mut self, hours: f64, change: CompletionChange) {
        let updated = self.goal.current_hours + change.sign() * hours;
        self.goal.current_hours = updated.max(0.0);
    }

    pub fn set_weekly_goal(&mut self, hours: f64) -> Result<(), GoalValidationError> {
        self.goal.weekly_hours = validate_weekly_hours(hours)?;
        Ok(())
    }

    /// Resets progress when `now` falls in a later week than the tracked one.
    ///
    /// Returns `true` when a reset happened.
    pub fn rollover_if_needed(&mut self, now: NaiveDateTime) -> bool {
        let current_week = week_start(now);
        if current_week <= self.goal.week_start {
            return false;
        }
        self.goal.current_hours = 0.0;
        self.goal.week_start = current_week;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::{CompletionChange, GoalTracker};
    use crate::model::goal::StudyGoal;
    use chrono::NaiveDate;

    fn at(d: u32, h: u32) -> chrono::NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 10, d)
            .unwrap()
            .and_hms_opt(h, 0, 0)
            .unwrap()
    }

    #[test]
    fn delta_is_clamped_at_zero() {
        let mut tracker = GoalTracker::new(StudyGoal::new(20.0, at(14, 9)));
        tracker.apply_completion_delta(3.0, CompletionChange::Completed);
        tracker.apply_completion_delta(5.0, CompletionChange::Uncompleted);
        assert_eq!(tracker.goal().current_hours, 0.0);
    }

    #[test]
    fn rollover_resets_progress_once_per_new_week() {
        // 2026-10-11 is a Sunday; 2026-10-19 is the following Monday.
        let mut tracker = GoalTracker::new(StudyGoal::new(20.0, at(14, 9)));
        tracker.apply_completion_delta(15.0, CompletionChange::Completed);

        assert!(!tracker.rollover_if_needed(at(17, 23)));
        assert_eq!(tracker.goal().current_hours, 15.0);

        assert!(tracker.rollover_if_needed(at(19, 8)));
        assert_eq!(tracker.goal().current_hours, 0.0);
        assert_eq!(
            tracker.goal().week_start,
            NaiveDate::from_ymd_opt(2026, 10, 18).unwrap()
        );
        assert!(!tracker.rollover_if_needed(at(19, 9)));
    }

    #[test]
    fn clock_moving_backwards_never_rewinds_week() {
        let mut tracker = GoalTracker::new(StudyGoal::new(20.0, at(19, 9)));
        assert!(!tracker.rollover_if_needed(at(12, 9)));
        assert_eq!(
            tracker.goal().week_start,
            NaiveDate::from_ymd_opt(2026, 10, 18).unwrap()
        );
    }
}
