//! Six-week calendar month projection.
//!
//! # Invariants
//! - A month grid always has exactly `CALENDAR_CELLS` days.
//! - The first cell is the Sunday on or before the 1st of the month.

use crate::model::task::Task;
use chrono::{Datelike, Duration, Months, NaiveDate};
use std::collections::HashMap;

pub const CALENDAR_CELLS: usize = 42;

/// One grid cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CalendarDay {
    pub date: NaiveDate,
    pub in_current_month: bool,
    pub is_today: bool,
    /// Tasks due on `date`, completed or not.
    pub task_count: usize,
}

/// Calendar view of one month.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CalendarMonth {
    /// First day of the displayed month.
    pub month: NaiveDate,
    /// e.g. "October 2026".
    pub title: String,
    pub days: Vec<CalendarDay>,
}

/// First day of the month containing `day`.
pub fn month_start(day: NaiveDate) -> NaiveDate {
    day.with_day(1).unwrap_or(day)
}

/// First day of the month `delta` months away from the month of `day`.
///
/// Saturates at the chrono date range bounds.
pub fn shift_month(day: NaiveDate, delta: i32) -> NaiveDate {
    let start = month_start(day);
    let shifted = if delta >= 0 {
        start.checked_add_months(Months::new(delta.unsigned_abs()))
    } else {
        start.checked_sub_months(Months::new(delta.unsigned_abs()))
    };
    shifted.unwrap_or(start)
}

/// Sunday on or before the 1st of the month containing `day`.
pub fn grid_start(day: NaiveDate) -> NaiveDate {
    let first = month_start(day);
    first - Duration::days(i64::from(first.weekday().num_days_from_sunday()))
}

/// Builds the 42-cell grid for the month containing `month`.
pub fn calendar_month(tasks: &[Task], month: NaiveDate, today: NaiveDate) -> CalendarMonth {
    let first = month_start(month);
    let mut due_counts: HashMap<NaiveDate, usize> = HashMap::new();
    for task in tasks {
        *due_counts.entry(task.due_date).or_default() += 1;
    }

    let days = grid_dates(first)
        .map(|date| CalendarDay {
            date,
            in_current_month: date.month() == first.month() && date.year() == first.year(),
            is_today: date == today,
            task_count: due_counts.get(&date).copied().unwrap_or(0),
        })
        .collect();

    CalendarMonth {
        month: first,
        title: first.format("%B %Y").to_string(),
        days,
    }
}

/// Per-cell due-task counts for the month containing `month`.
pub fn calendar_bucket(tasks: &[Task], month: NaiveDate) -> [usize; CALENDAR_CELLS] {
    let mut counts = [0usize; CALENDAR_CELLS];
    let start = grid_start(month);
    for task in tasks {
        let offset = (task.due_date - start).num_days();
        if let Ok(index) = usize::try_from(offset) {
            if let Some(count) = counts.get_mut(index) {
                *count += 1;
            }
        }
    }
    counts
}

fn grid_dates(month: NaiveDate) -> impl Iterator<Item = NaiveDate> {
    grid_start(month).iter_days().take(CALENDAR_CELLS)
}
