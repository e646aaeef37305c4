//! Core domain logic for the study planner.
//! This crate owns every planner invariant; front-ends only render its output.

pub mod clock;
pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod query;
pub mod repo;
pub mod service;

pub use clock::{Clock, ManualClock, SystemClock};
pub use config::{default_database_path, ConfigError, PlannerConfig};
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::achievement::{AchievementKind, Achievements};
pub use model::activity::{format_relative_time, ActivityEntry, ActivityLog};
pub use model::goal::{week_start, GoalValidationError, StudyGoal};
pub use model::task::{Priority, Subject, Task, TaskDraft, TaskId, TaskPatch, TaskValidationError};
pub use query::calendar::{calendar_bucket, calendar_month, shift_month, CalendarDay, CalendarMonth};
pub use query::task_query::{
    due_date_label, due_urgency, filter_tasks, sort_for_list, task_stats, task_status, upcoming,
    DueUrgency, TaskFilter, TaskStats, TaskStatus,
};
pub use repo::kv_store::{
    KeyValueStore, MemoryKeyValueStore, RepoError, RepoResult, SqliteKeyValueStore,
};
pub use repo::state_repo::PlannerStateRepository;
pub use service::planner::{Planner, PlannerError, PlannerResult, TaskChange};
pub use service::reminder::{reminder_summary, Notifier, ReminderScheduler, ReminderSummary};

