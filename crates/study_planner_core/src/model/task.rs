//! Study task domain model.
//!
//! # Responsibility
//! - Define the canonical `Task` record and its enumerated attributes.
//! - Validate creation drafts and partial edits before they reach the store.
//!
//! # Invariants
//! - `id` is unique and never reused for another task.
//! - `title` is non-empty after trimming.
//! - `completed_at.is_some() == completed` for every stored task.
//! - `estimated_hours` is finite and non-negative.

use crate::model::timestamp;
use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::str::FromStr;
use uuid::{NoContext, Timestamp, Uuid};

/// Stable task identifier.
///
/// Generated ids are UUID v7 strings, so lexical order follows creation time.
/// Any non-empty string is accepted when loading persisted data.
pub type TaskId = String;

/// Task urgency as picked by the user.
///
/// Declaration order is the list order: `High < Medium < Low`.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    High,
    #[default]
    Medium,
    Low,
}

impl Priority {
    pub const ALL: [Priority; 3] = [Self::High, Self::Medium, Self::Low];

    /// Stable wire value.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::High => "high",
            Self::Medium => "medium",
            Self::Low => "low",
        }
    }
}

impl Display for Priority {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for Priority {
    type Err = TaskValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "high" => Ok(Self::High),
            "medium" => Ok(Self::Medium),
            "low" => Ok(Self::Low),
            other => Err(TaskValidationError::UnknownPriority(other.to_string())),
        }
    }
}

/// Fixed set of study subjects a task can belong to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Subject {
    Math,
    Science,
    English,
    History,
    Programming,
    Languages,
    Other,
}

impl Subject {
    pub const ALL: [Subject; 7] = [
        Self::Math,
        Self::Science,
        Self::English,
        Self::History,
        Self::Programming,
        Self::Languages,
        Self::Other,
    ];

    /// Display name, identical to the wire value.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Math => "Math",
            Self::Science => "Science",
            Self::English => "English",
            Self::History => "History",
            Self::Programming => "Programming",
            Self::Languages => "Languages",
            Self::Other => "Other",
        }
    }
}

impl Display for Subject {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for Subject {
    type Err = TaskValidationError;

    /// Case-insensitive lookup by display name.
    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(TaskValidationError::MissingSubject);
        }
        Self::ALL
            .into_iter()
            .find(|subject| subject.as_str().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| TaskValidationError::UnknownSubject(trimmed.to_string()))
    }
}

/// Validation failures for task input.
#[derive(Debug, Clone, PartialEq)]
pub enum TaskValidationError {
    MissingTitle,
    MissingSubject,
    MissingDueDate,
    InvalidEstimatedHours(f64),
    UnknownSubject(String),
    UnknownPriority(String),
}

impl Display for TaskValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingTitle => write!(f, "task title is required"),
            Self::MissingSubject => write!(f, "task subject is required"),
            Self::MissingDueDate => write!(f, "task due date is required"),
            Self::InvalidEstimatedHours(hours) => {
                write!(f, "estimated hours must be a non-negative number, got {hours}")
            }
            Self::UnknownSubject(value) => write!(f, "unknown subject `{value}`"),
            Self::UnknownPriority(value) => {
                write!(f, "unknown priority `{value}`; expected high|medium|low")
            }
        }
    }
}

impl TaskValidationError {
    /// Stable code for log records; never carries user input.
    pub fn code(&self) -> &'static str {
        match self {
            Self::MissingTitle => "missing_title",
            Self::MissingSubject => "missing_subject",
            Self::MissingDueDate => "missing_due_date",
            Self::InvalidEstimatedHours(_) => "invalid_estimated_hours",
            Self::UnknownSubject(_) => "unknown_subject",
            Self::UnknownPriority(_) => "unknown_priority",
        }
    }
}

impl Error for TaskValidationError {}

/// Canonical study task record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: TaskId,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub subject: Subject,
    pub priority: Priority,
    pub due_date: NaiveDate,
    #[serde(default)]
    pub estimated_hours: f64,
    #[serde(default)]
    pub completed: bool,
    /// Local wall-clock creation time. Never changes after creation.
    #[serde(deserialize_with = "timestamp::deserialize")]
    pub created_at: NaiveDateTime,
    /// Present iff `completed` is true.
    #[serde(default, deserialize_with = "timestamp::deserialize_option")]
    pub completed_at: Option<NaiveDateTime>,
}

impl Task {
    /// Builds a fresh, incomplete task from a validated draft.
    ///
    /// # Errors
    /// - Returns the first failed draft rule; no task is produced.
    pub fn from_draft(
        draft: &TaskDraft,
        created_at: NaiveDateTime,
    ) -> Result<Self, TaskValidationError> {
        let (subject, due_date) = draft.validate()?;
        Ok(Self {
            id: new_task_id(created_at),
            title: draft.title.trim().to_string(),
            description: draft.description.trim().to_string(),
            subject,
            priority: draft.priority,
            due_date,
            estimated_hours: draft.estimated_hours,
            completed: false,
            created_at,
            completed_at: None,
        })
    }

    /// Flips completion state, stamping or clearing `completed_at`.
    ///
    /// Returns the new `completed` value.
    pub fn toggle_completion(&mut self, now: NaiveDateTime) -> bool {
        self.completed = !self.completed;
        self.completed_at = self.completed.then_some(now);
        self.completed
    }

    /// Restores the completion invariant on records written by other clients.
    ///
    /// A stale `completed_at` on an incomplete task is dropped; a completed
    /// task without a timestamp is stamped with `created_at`.
    pub fn repair_completion(&mut self) -> bool {
        match (self.completed, self.completed_at) {
            (false, Some(_)) => {
                self.completed_at = None;
                true
            }
            (true, None) => {
                self.completed_at = Some(self.created_at);
                true
            }
            _ => false,
        }
    }

    /// Hours counted toward the weekly goal when this task completes.
    pub fn goal_hours(&self) -> f64 {
        if self.estimated_hours.is_finite() && self.estimated_hours > 0.0 {
            self.estimated_hours
        } else {
            0.0
        }
    }
}

/// Creation input for a new task.
///
/// Optional fields model "left blank in the form"; `validate()` turns them
/// into required values.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TaskDraft {
    pub title: String,
    pub description: String,
    pub subject: Option<Subject>,
    pub priority: Priority,
    pub due_date: Option<NaiveDate>,
    pub estimated_hours: f64,
}

impl TaskDraft {
    pub fn new(title: impl Into<String>, subject: Subject, due_date: NaiveDate) -> Self {
        Self {
            title: title.into(),
            subject: Some(subject),
            due_date: Some(due_date),
            ..Self::default()
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = priority;
        self
    }

    pub fn with_estimated_hours(mut self, hours: f64) -> Self {
        self.estimated_hours = hours;
        self
    }

    /// Checks required fields and returns the resolved subject and due date.
    pub fn validate(&self) -> Result<(Subject, NaiveDate), TaskValidationError> {
        if self.title.trim().is_empty() {
            return Err(TaskValidationError::MissingTitle);
        }
        let subject = self.subject.ok_or(TaskValidationError::MissingSubject)?;
        let due_date = self.due_date.ok_or(TaskValidationError::MissingDueDate)?;
        validate_estimated_hours(self.estimated_hours)?;
        Ok((subject, due_date))
    }
}

/// Partial edit of an existing task. `None` keeps the current value.
///
/// Completion state is not editable here; use toggle semantics instead.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TaskPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub subject: Option<Subject>,
    pub priority: Option<Priority>,
    pub due_date: Option<NaiveDate>,
    pub estimated_hours: Option<f64>,
}

impl TaskPatch {
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }

    /// Returns `task` with this patch merged in, or the first failed rule.
    pub fn merged_into(&self, task: &Task) -> Result<Task, TaskValidationError> {
        let mut merged = task.clone();
        if let Some(title) = &self.title {
            let title = title.trim();
            if title.is_empty() {
                return Err(TaskValidationError::MissingTitle);
            }
            merged.title = title.to_string();
        }
        if let Some(description) = &self.description {
            merged.description = description.trim().to_string();
        }
        if let Some(subject) = self.subject {
            merged.subject = subject;
        }
        if let Some(priority) = self.priority {
            merged.priority = priority;
        }
        if let Some(due_date) = self.due_date {
            merged.due_date = due_date;
        }
        if let Some(hours) = self.estimated_hours {
            validate_estimated_hours(hours)?;
            merged.estimated_hours = hours;
        }
        Ok(merged)
    }
}

fn validate_estimated_hours(hours: f64) -> Result<(), TaskValidationError> {
    if hours.is_finite() && hours >= 0.0 {
        Ok(())
    } else {
        Err(TaskValidationError::InvalidEstimatedHours(hours))
    }
}

/// Generates a time-ordered id stamped with the task creation time.
pub fn new_task_id(created_at: NaiveDateTime) -> TaskId {
    let utc = created_at.and_utc();
    let seconds = u64::try_from(utc.timestamp()).unwrap_or(0);
    let timestamp = Timestamp::from_unix(NoContext, seconds, utc.timestamp_subsec_nanos());
    Uuid::new_v7(timestamp).to_string()
}
