//! Periodic overdue-task reminders.
//!
//! # Responsibility
//! - Summarize overdue and due-today work.
//! - Gate checks on a fixed interval driven by caller-supplied time.
//!
//! # Invariants
//! - The scheduler never spawns threads or timers; the host calls `tick`.
//! - Notifications are sent only when the notifier reports permission.

use crate::model::task::Task;
use crate::query::task_query::{task_status, TaskStatus};
use chrono::{Duration, NaiveDateTime};
use log::{debug, info};

pub const REMINDER_TITLE: &str = "Study Planner Reminder";

/// Platform notification capability.
pub trait Notifier {
    /// Whether the user allowed notifications.
    fn is_permitted(&self) -> bool;
    fn notify(&mut self, title: &str, body: &str);
}

/// Snapshot of open work that needs attention.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReminderSummary {
    pub overdue: usize,
    pub due_today: usize,
}

impl ReminderSummary {
    /// One-line notification body, `None` when nothing is overdue.
    pub fn message(&self) -> Option<String> {
        (self.overdue > 0).then(|| format!("You have {} overdue task(s)!", self.overdue))
    }
}

pub fn reminder_summary(tasks: &[Task], now: NaiveDateTime) -> ReminderSummary {
    let today = now.date();
    tasks
        .iter()
        .filter(|task| !task.completed)
        .fold(ReminderSummary::default(), |mut summary, task| {
            if task_status(task, now) == TaskStatus::Overdue {
                summary.overdue += 1;
            } else if task.due_date == today {
                summary.due_today += 1;
            }
            summary
        })
}

/// Interval gate for reminder checks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReminderScheduler {
    interval: Duration,
    last_run: Option<NaiveDateTime>,
}

impl ReminderScheduler {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            last_run: None,
        }
    }

    pub fn from_secs(interval_secs: u64) -> Self {
        let secs = i64::try_from(interval_secs)
            .unwrap_or(i64::MAX)
            .clamp(1, i64::MAX / 1000);
        Self::new(Duration::seconds(secs))
    }

    pub fn last_run(&self) -> Option<NaiveDateTime> {
        self.last_run
    }

    /// Whether a check is due at `now`. The first check is always due.
    pub fn is_due(&self, now: NaiveDateTime) -> bool {
        self.last_run
            .map_or(true, |last_run| now - last_run >= self.interval)
    }

    /// Runs a check when due and notifies about overdue tasks.
    ///
    /// Returns the summary when a check ran.
    pub fn tick(
        &mut self,
        tasks: &[Task],
        now: NaiveDateTime,
        notifier: &mut dyn Notifier,
    ) -> Option<ReminderSummary> {
        if !self.is_due(now) {
            return None;
        }
        self.last_run = Some(now);

        let summary = reminder_summary(tasks, now);
        debug!(
            "event=reminder_check module=reminder status=ok overdue={} due_today={}",
            summary.overdue, summary.due_today
        );
        if let Some(body) = summary.message() {
            if notifier.is_permitted() {
                notifier.notify(REMINDER_TITLE, &body);
                info!(
                    "event=reminder_sent module=reminder status=ok overdue={}",
                    summary.overdue
                );
            } else {
                debug!("event=reminder_sent module=reminder status=skipped reason=not_permitted");
            }
        }
        Some(summary)
    }
}
