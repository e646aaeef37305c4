//! Derived task state: status, filtering, ordering, due labels and stats.
//!
//! # Invariants
//! - Every function here is pure over `(tasks, now)`; nothing is cached.
//! - Date comparisons use calendar days of local wall-clock time.

use crate::model::task::{Priority, Subject, Task};
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

const MILLIS_PER_DAY: i64 = 24 * 60 * 60 * 1000;

/// Derived lifecycle state of a task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskStatus {
    Pending,
    Overdue,
    Completed,
}

impl TaskStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Overdue => "overdue",
            Self::Completed => "completed",
        }
    }
}

impl Display for TaskStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TaskStatus {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "pending" => Ok(Self::Pending),
            "overdue" => Ok(Self::Overdue),
            "completed" => Ok(Self::Completed),
            other => Err(format!(
                "unknown status `{other}`; expected pending|overdue|completed"
            )),
        }
    }
}

/// Completed wins; otherwise a due date before today is overdue.
pub fn task_status(task: &Task, now: NaiveDateTime) -> TaskStatus {
    if task.completed {
        TaskStatus::Completed
    } else if task.due_date < now.date() {
        TaskStatus::Overdue
    } else {
        TaskStatus::Pending
    }
}

/// List filter. Empty/unset criteria match everything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskFilter {
    /// Case-insensitive substring searched in title and description.
    pub search_term: String,
    pub subject: Option<Subject>,
    pub priority: Option<Priority>,
    pub status: Option<TaskStatus>,
}

impl TaskFilter {
    pub fn matches(&self, task: &Task, now: NaiveDateTime) -> bool {
        let needle = self.search_term.trim().to_lowercase();
        let matches_search = needle.is_empty()
            || task.title.to_lowercase().contains(&needle)
            || task.description.to_lowercase().contains(&needle);

        matches_search
            && self.subject.map_or(true, |subject| task.subject == subject)
            && self.priority.map_or(true, |priority| task.priority == priority)
            && self
                .status
                .map_or(true, |status| task_status(task, now) == status)
    }
}

/// Tasks matching `filter`, in input order.
pub fn filter_tasks<'a>(
    tasks: &'a [Task],
    filter: &TaskFilter,
    now: NaiveDateTime,
) -> Vec<&'a Task> {
    tasks
        .iter()
        .filter(|task| filter.matches(task, now))
        .collect()
}

/// List comparator: incomplete first, then priority, then earliest due date.
pub fn compare_for_list(a: &Task, b: &Task) -> Ordering {
    a.completed
        .cmp(&b.completed)
        .then_with(|| a.priority.cmp(&b.priority))
        .then_with(|| a.due_date.cmp(&b.due_date))
}

/// Stable sort by `compare_for_list`.
pub fn sort_for_list<'a>(tasks: impl IntoIterator<Item = &'a Task>) -> Vec<&'a Task> {
    let mut sorted: Vec<&Task> = tasks.into_iter().collect();
    sorted.sort_by(|a, b| compare_for_list(a, b));
    sorted
}

/// Incomplete tasks by ascending due date, at most `limit`.
pub fn upcoming(tasks: &[Task], limit: usize) -> Vec<&Task> {
    let mut pending: Vec<&Task> = tasks.iter().filter(|task| !task.completed).collect();
    pending.sort_by_key(|task| task.due_date);
    pending.truncate(limit);
    pending
}

/// Whole days from `now` until midnight of `due_date`, rounded up.
///
/// Today's date yields 0 for any time of day, tomorrow yields 1.
pub fn days_until(due_date: NaiveDate, now: NaiveDateTime) -> i64 {
    let diff_ms = (due_date.and_time(NaiveTime::MIN) - now).num_milliseconds();
    let days = diff_ms.div_euclid(MILLIS_PER_DAY);
    if diff_ms.rem_euclid(MILLIS_PER_DAY) == 0 {
        days
    } else {
        days + 1
    }
}

/// Human label for a due date relative to `now`.
pub fn due_date_label(due_date: NaiveDate, now: NaiveDateTime) -> String {
    match days_until(due_date, now) {
        0 => "Due Today".to_string(),
        1 => "Due Tomorrow".to_string(),
        -1 => "1 day overdue".to_string(),
        days if days < 0 => format!("{} days overdue", -days),
        days if days <= 7 => format!("{days} days left"),
        _ => due_date.format("%b %-d").to_string(),
    }
}

/// Coarse due-date class used for highlighting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DueUrgency {
    Overdue,
    Today,
    Upcoming,
}

pub fn due_urgency(due_date: NaiveDate, now: NaiveDateTime) -> DueUrgency {
    match days_until(due_date, now) {
        days if days < 0 => DueUrgency::Overdue,
        0 => DueUrgency::Today,
        _ => DueUrgency::Upcoming,
    }
}

/// Dashboard counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TaskStats {
    pub total: usize,
    pub completed: usize,
    pub pending: usize,
    pub overdue: usize,
    pub due_today: usize,
    /// Rounded completed share, 0 when there are no tasks.
    pub progress_percent: u8,
}

pub fn task_stats(tasks: &[Task], now: NaiveDateTime) -> TaskStats {
    let today = now.date();
    let total = tasks.len();
    let completed = tasks.iter().filter(|task| task.completed).count();
    let overdue = tasks
        .iter()
        .filter(|task| task_status(task, now) == TaskStatus::Overdue)
        .count();
    let due_today = tasks.iter().filter(|task| task.due_date == today).count();
    let progress_percent = if total == 0 {
        0
    } else {
        ((completed as f64 / total as f64) * 100.0).round() as u8
    };

    TaskStats {
        total,
        completed,
        pending: total - completed,
        overdue,
        due_today,
        progress_percent,
    }
}
