//! Typed persistence of planner state over a key-value store.
//!
//! # Responsibility
//! - Map tasks, goal, achievements and activity log to their storage keys.
//! - Encode values as JSON text.
//!
//! # Invariants
//! - Each key is loaded and saved independently.
//! - Reads never fail: a missing, unreadable or unparsable value yields the
//!   documented default and a `warn` event.
//! - List keys are decoded record by record; one bad record is skipped, its
//!   siblings still load.

use crate::model::achievement::Achievements;
use crate::model::activity::{ActivityEntry, ActivityLog};
use crate::model::goal::StudyGoal;
use crate::model::task::Task;
use crate::repo::kv_store::{KeyValueStore, RepoError, RepoResult};
use log::{debug, warn};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

pub const TASKS_KEY: &str = "studyPlannerTasks";
pub const GOAL_KEY: &str = "studyPlannerGoal";
pub const ACHIEVEMENTS_KEY: &str = "studyPlannerAchievements";
pub const ACTIVITY_KEY: &str = "studyPlannerActivity";

/// Planner state repository.
pub struct PlannerStateRepository<S: KeyValueStore> {
    store: S,
}

impl<S: KeyValueStore> PlannerStateRepository<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn into_store(self) -> S {
        self.store
    }

    /// Loads all tasks, repairing completion stamps that break the invariant.
    pub fn load_tasks(&self) -> Vec<Task> {
        let mut tasks: Vec<Task> = self.load_records(TASKS_KEY);
        let mut repaired = 0usize;
        tasks.retain_mut(|task| {
            if task.id.trim().is_empty() || task.title.trim().is_empty() {
                warn!("event=state_load module=repo status=skipped key={TASKS_KEY} reason=missing_required_field");
                return false;
            }
            if task.repair_completion() {
                repaired += 1;
            }
            true
        });
        if repaired > 0 {
            warn!(
                "event=state_load module=repo status=repaired key={TASKS_KEY} repaired={repaired}"
            );
        }
        tasks
    }

    /// Loads the persisted goal; `None` when absent or unreadable.
    pub fn load_goal(&self) -> Option<StudyGoal> {
        self.load_json::<StudyGoal>(GOAL_KEY)
            .filter(|goal| goal.weekly_hours.is_finite() && goal.weekly_hours > 0.0)
            .map(|mut goal| {
                if !(goal.current_hours.is_finite() && goal.current_hours >= 0.0) {
                    goal.current_hours = 0.0;
                }
                goal
            })
    }

    pub fn load_achievements(&self) -> Achievements {
        self.load_json(ACHIEVEMENTS_KEY).unwrap_or_default()
    }

    pub fn load_activity(&self, capacity: usize) -> ActivityLog {
        let entries: Vec<ActivityEntry> = self.load_records(ACTIVITY_KEY);
        ActivityLog::from_entries(entries, capacity)
    }

    pub fn save_tasks(&mut self, tasks: &[Task]) -> RepoResult<()> {
        self.save_json(TASKS_KEY, tasks)
    }

    pub fn save_goal(&mut self, goal: &StudyGoal) -> RepoResult<()> {
        self.save_json(GOAL_KEY, goal)
    }

    pub fn save_achievements(&mut self, achievements: &Achievements) -> RepoResult<()> {
        self.save_json(ACHIEVEMENTS_KEY, achievements)
    }

    pub fn save_activity(&mut self, log: &ActivityLog) -> RepoResult<()> {
        let entries: Vec<&ActivityEntry> = log.entries().collect();
        self.save_json(ACTIVITY_KEY, &entries)
    }

    fn load_json<T: DeserializeOwned>(&self, key: &'static str) -> Option<T> {
        let raw = self.load_raw(key)?;
        match serde_json::from_str(&raw) {
            Ok(value) => Some(value),
            Err(err) => {
                warn_parse_failed(key, &err);
                None
            }
        }
    }

    /// Decodes a JSON array one element at a time, dropping only the
    /// elements that fail.
    fn load_records<T: DeserializeOwned>(&self, key: &'static str) -> Vec<T> {
        let Some(raw) = self.load_raw(key) else {
            return Vec::new();
        };
        let values: Vec<Value> = match serde_json::from_str(&raw) {
            Ok(values) => values,
            Err(err) => {
                warn_parse_failed(key, &err);
                return Vec::new();
            }
        };

        let total = values.len();
        let records: Vec<T> = values
            .into_iter()
            .enumerate()
            .filter_map(|(index, value)| match serde_json::from_value(value) {
                Ok(record) => Some(record),
                Err(_) => {
                    warn!(
                        "event=state_load module=repo status=skipped key={key} index={index} reason=invalid_record"
                    );
                    None
                }
            })
            .collect();
        if records.len() < total {
            warn!(
                "event=state_load module=repo status=partial key={key} loaded={} skipped={}",
                records.len(),
                total - records.len()
            );
        }
        records
    }

    fn load_raw(&self, key: &'static str) -> Option<String> {
        match self.store.get(key) {
            Ok(Some(raw)) => Some(raw),
            Ok(None) => {
                debug!("event=state_load module=repo status=default key={key} reason=absent");
                None
            }
            Err(err) => {
                warn!("event=state_load module=repo status=default key={key} reason=read_failed error={err}");
                None
            }
        }
    }

    fn save_json<T: Serialize + ?Sized>(&mut self, key: &'static str, value: &T) -> RepoResult<()> {
        let encoded = serde_json::to_string(value).map_err(|err| RepoError::Serialize {
            key,
            message: err.to_string(),
        })?;
        self.store.set(key, &encoded).inspect_err(|err| {
            warn!("event=state_save module=repo status=error key={key} error={err}");
        })
    }
}

fn warn_parse_failed(key: &str, err: &serde_json::Error) {
    warn!(
        "event=state_load module=repo status=default key={key} reason=parse_failed line={} column={}",
        err.line(),
        err.column()
    );
}
