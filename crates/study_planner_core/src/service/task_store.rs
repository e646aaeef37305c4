//! In-memory task store.
//!
//! # Responsibility
//! - Own the ordered task collection and apply create/edit/delete/toggle.
//!
//! # Invariants
//! - Insertion order is preserved; ids are unique.
//! - A failed operation leaves the collection untouched.
//! - `completed_at.is_some() == completed` holds for every stored task.

use crate::model::task::{Task, TaskDraft, TaskId, TaskPatch, TaskValidationError};
use chrono::NaiveDateTime;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Task store errors.
#[derive(Debug, Clone, PartialEq)]
pub enum TaskStoreError {
    Validation(TaskValidationError),
    NotFound(TaskId),
}

impl Display for TaskStoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::NotFound(id) => write!(f, "task not found: {id}"),
        }
    }
}

impl TaskStoreError {
    pub fn code(&self) -> &'static str {
        match self {
            Self::Validation(err) => err.code(),
            Self::NotFound(_) => "not_found",
        }
    }
}

impl Error for TaskStoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::NotFound(_) => None,
        }
    }
}

impl From<TaskValidationError> for TaskStoreError {
    fn from(value: TaskValidationError) -> Self {
        Self::Validation(value)
    }
}

/// Ordered collection of tasks.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TaskStore {
    tasks: Vec<Task>,
}

impl TaskStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wraps already persisted tasks, keeping the first of any duplicate id.
    pub fn from_tasks(tasks: Vec<Task>) -> Self {
        let mut store = Self::new();
        for task in tasks {
            if store.get(&task.id).is_none() {
                store.tasks.push(task);
            }
        }
        store
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn get(&self, id: &str) -> Option<&Task> {
        self.tasks.iter().find(|task| task.id == id)
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Appends a new incomplete task built from `draft`.
    pub fn add(
        &mut self,
        draft: &TaskDraft,
        now: NaiveDateTime,
    ) -> Result<&Task, TaskStoreError> {
        let task = Task::from_draft(draft, now)?;
        self.tasks.push(task);
        let index = self.tasks.len() - 1;
        Ok(&self.tasks[index])
    }

    /// Merges `patch` into the task with `id`.
    pub fn update(&mut self, id: &str, patch: &TaskPatch) -> Result<&Task, TaskStoreError> {
        let index = self.position(id)?;
        let merged = patch.merged_into(&self.tasks[index])?;
        self.tasks[index] = merged;
        Ok(&self.tasks[index])
    }

    /// Removes and returns the task with `id`.
    pub fn delete(&mut self, id: &str) -> Result<Task, TaskStoreError> {
        let index = self.position(id)?;
        Ok(self.tasks.remove(index))
    }

    /// Flips completion of the task with `id`.
    pub fn toggle_complete(
        &mut self,
        id: &str,
        now: NaiveDateTime,
    ) -> Result<&Task, TaskStoreError> {
        let index = self.position(id)?;
        self.tasks[index].toggle_completion(now);
        Ok(&self.tasks[index])
    }

    fn position(&self, id: &str) -> Result<usize, TaskStoreError> {
        self.tasks
            .iter()
            .position(|task| task.id == id)
            .ok_or_else(|| TaskStoreError::NotFound(id.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::{TaskStore, TaskStoreError};
    use crate::model::task::{Subject, TaskDraft, TaskPatch, TaskValidationError};
    use chrono::NaiveDate;

    fn now() -> chrono::NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 10, 17)
            .unwrap()
            .and_hms_opt(10, 0, 0)
            .unwrap()
    }

    fn draft(title: &str) -> TaskDraft {
        TaskDraft::new(
            title,
            Subject::Math,
            NaiveDate::from_ymd_opt(2026, 10, 20).unwrap(),
        )
    }

    #[test]
    fn rejected_update_leaves_task_unchanged() {
        let mut store = TaskStore::new();
        let id = store.add(&draft("Algebra"), now()).unwrap().id.clone();
        let before = store.clone();

        let patch = TaskPatch {
            title: Some("   ".to_string()),
            ..TaskPatch::default()
        };
        let err = store.update(&id, &patch).unwrap_err();
        assert_eq!(err, TaskStoreError::Validation(TaskValidationError::MissingTitle));
        assert_eq!(store, before);
    }

    #[test]
    fn from_tasks_drops_duplicate_ids() {
        let mut store = TaskStore::new();
        let task = store.add(&draft("Algebra"), now()).unwrap().clone();
        let reloaded = TaskStore::from_tasks(vec![task.clone(), task]);
        assert_eq!(reloaded.len(), 1);
    }
}
