//! Planner composition root.
//!
//! # Responsibility
//! - Own all mutable planner state: tasks, weekly goal, achievements and the
//!   activity log.
//! - Turn user intents into mutations, write state back after each one and
//!   re-evaluate achievements.
//! - Serve derived views to the presentation layer.
//!
//! # Invariants
//! - State is only mutated through the operations below.
//! - Every successful mutation is persisted before the call returns.
//! - Validation and not-found failures leave state and storage untouched.
//! - Goal rollover runs before any goal read or goal mutation.

use crate::clock::Clock;
use crate::config::PlannerConfig;
use crate::model::achievement::{AchievementKind, Achievements};
use crate::model::activity::{ActivityEntry, ActivityLog};
use crate::model::goal::{GoalValidationError, StudyGoal};
use crate::model::task::{Task, TaskDraft, TaskId, TaskPatch, TaskValidationError};
use crate::query::calendar::{calendar_month, CalendarMonth};
use crate::query::task_query::{
    filter_tasks, sort_for_list, task_stats, upcoming, TaskFilter, TaskStats,
};
use crate::repo::kv_store::{KeyValueStore, RepoError};
use crate::repo::state_repo::PlannerStateRepository;
use crate::service::achievement_evaluator::evaluate_achievements;
use crate::service::goal_tracker::{CompletionChange, GoalTracker};
use crate::service::reminder::{reminder_summary, Notifier, ReminderScheduler, ReminderSummary};
use crate::service::task_store::{TaskStore, TaskStoreError};
use chrono::{NaiveDate, NaiveDateTime};
use log::{debug, info};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type PlannerResult<T> = Result<T, PlannerError>;

/// Error returned by planner operations.
#[derive(Debug)]
pub enum PlannerError {
    /// Task input rejected; nothing changed.
    Validation(TaskValidationError),
    /// Goal input rejected; nothing changed.
    Goal(GoalValidationError),
    /// No task with this id; nothing changed.
    NotFound(TaskId),
    /// State changed in memory but could not be written back.
    Repo(RepoError),
}

impl Display for PlannerError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Goal(err) => write!(f, "{err}"),
            Self::NotFound(id) => write!(f, "task not found: {id}"),
            Self::Repo(err) => write!(f, "failed to persist planner state: {err}"),
        }
    }
}

impl Error for PlannerError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Goal(err) => Some(err),
            Self::NotFound(_) => None,
            Self::Repo(err) => Some(err),
        }
    }
}

impl From<TaskStoreError> for PlannerError {
    fn from(value: TaskStoreError) -> Self {
        match value {
            TaskStoreError::Validation(err) => Self::Validation(err),
            TaskStoreError::NotFound(id) => Self::NotFound(id),
        }
    }
}

impl From<TaskValidationError> for PlannerError {
    fn from(value: TaskValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<GoalValidationError> for PlannerError {
    fn from(value: GoalValidationError) -> Self {
        Self::Goal(value)
    }
}

impl From<RepoError> for PlannerError {
    fn from(value: RepoError) -> Self {
        Self::Repo(value)
    }
}

/// Result of a task mutation.
#[derive(Debug, Clone, PartialEq)]
pub struct TaskChange {
    /// Task state after the mutation.
    pub task: Task,
    /// Achievements unlocked by this mutation, for one-time notification.
    pub unlocked: Vec<AchievementKind>,
}

/// Application state owned by the composition root.
pub struct Planner<S: KeyValueStore, C: Clock> {
    repo: PlannerStateRepository<S>,
    clock: C,
    config: PlannerConfig,
    tasks: TaskStore,
    goals: GoalTracker,
    achievements: Achievements,
    activity: ActivityLog,
}

impl<S: KeyValueStore, C: Clock> Planner<S, C> {
    /// Loads persisted state, falling back to defaults per key.
    ///
    /// # Errors
    /// - `PlannerError::Repo` when a goal rollover detected at load time
    ///   cannot be written back.
    pub fn load(store: S, clock: C, config: PlannerConfig) -> PlannerResult<Self> {
        let repo = PlannerStateRepository::new(store);
        let now = clock.now();

        let tasks = TaskStore::from_tasks(repo.load_tasks());
        let goal = repo
            .load_goal()
            .unwrap_or_else(|| StudyGoal::new(config.default_weekly_hours, now));
        let achievements = repo.load_achievements();
        let activity = repo.load_activity(config.activity_log_capacity);

        let mut planner = Self {
            repo,
            clock,
            config,
            tasks,
            goals: GoalTracker::new(goal),
            achievements,
            activity,
        };
        planner.rollover_goal(now)?;

        info!(
            "event=planner_load module=planner status=ok tasks={} activity={} achievements={}",
            planner.tasks.len(),
            planner.activity.len(),
            planner.achievements.unlocked_count()
        );
        Ok(planner)
    }

    /// Creates a task from `draft`.
    pub fn add_task(&mut self, draft: &TaskDraft) -> PlannerResult<TaskChange> {
        let now = self.clock.now();
        let task = self
            .tasks
            .add(draft, now)
            .inspect_err(|err| log_rejected("task_create", err.code()))?
            .clone();
        self.repo.save_tasks(self.tasks.tasks())?;
        self.log_activity(format!("Created task: {}", task.title), now)?;
        let unlocked = self.refresh_achievements(now)?;

        info!(
            "event=task_create module=planner status=ok task_id={} total={}",
            task.id,
            self.tasks.len()
        );
        Ok(TaskChange { task, unlocked })
    }

    /// Merges `patch` into the task with `id`.
    pub fn update_task(&mut self, id: &str, patch: &TaskPatch) -> PlannerResult<TaskChange> {
        let now = self.clock.now();
        let task = self
            .tasks
            .update(id, patch)
            .inspect_err(|err| log_rejected("task_update", err.code()))?
            .clone();
        self.repo.save_tasks(self.tasks.tasks())?;
        self.log_activity(format!("Updated task: {}", task.title), now)?;

        info!("event=task_update module=planner status=ok task_id={}", task.id);
        Ok(TaskChange {
            task,
            unlocked: Vec::new(),
        })
    }

    /// Deletes the task with `id`. Confirmation is the caller's concern.
    ///
    /// Progress already credited to the weekly goal is kept.
    pub fn delete_task(&mut self, id: &str) -> PlannerResult<Task> {
        let now = self.clock.now();
        let task = self
            .tasks
            .delete(id)
            .inspect_err(|err| log_rejected("task_delete", err.code()))?;
        self.repo.save_tasks(self.tasks.tasks())?;
        self.log_activity(format!("Deleted task: {}", task.title), now)?;

        info!(
            "event=task_delete module=planner status=ok task_id={} total={}",
            task.id,
            self.tasks.len()
        );
        Ok(task)
    }

    /// Flips completion of the task with `id` and credits or debits its
    /// estimated hours against the weekly goal.
    pub fn toggle_complete(&mut self, id: &str) -> PlannerResult<TaskChange> {
        let now = self.clock.now();
        if self.tasks.get(id).is_none() {
            let err = TaskStoreError::NotFound(id.to_string());
            log_rejected("task_toggle", err.code());
            return Err(err.into());
        }
        self.rollover_goal(now)?;

        let task = self.tasks.toggle_complete(id, now)?.clone();
        let change = CompletionChange::from_completed(task.completed);
        self.goals.apply_completion_delta(task.goal_hours(), change);

        self.repo.save_tasks(self.tasks.tasks())?;
        self.repo.save_goal(self.goals.goal())?;
        let action = match change {
            CompletionChange::Completed => format!("Completed task: {}", task.title),
            CompletionChange::Uncompleted => format!("Uncompleted task: {}", task.title),
        };
        self.log_activity(action, now)?;
        let unlocked = self.refresh_achievements(now)?;

        info!(
            "event=task_toggle module=planner status=ok task_id={} completed={} current_hours={}",
            task.id,
            task.completed,
            self.goals.goal().current_hours
        );
        Ok(TaskChange { task, unlocked })
    }

    /// Sets the weekly study-hour goal.
    ///
    /// Returns achievements unlocked by the new target.
    pub fn set_weekly_goal(&mut self, hours: f64) -> PlannerResult<Vec<AchievementKind>> {
        let now = self.clock.now();
        self.goals
            .set_weekly_goal(hours)
            .inspect_err(|err| log_rejected("goal_set", err.code()))?;
        self.rollover_goal(now)?;
        self.repo.save_goal(self.goals.goal())?;
        let unlocked = self.refresh_achievements(now)?;

        info!(
            "event=goal_set module=planner status=ok weekly_hours={}",
            self.goals.goal().weekly_hours
        );
        Ok(unlocked)
    }

    /// Applies any pending weekly rollover and returns the current goal.
    ///
    /// Goal views should read through this instead of `goal()`.
    pub fn refresh_goal(&mut self) -> PlannerResult<&StudyGoal> {
        let now = self.clock.now();
        self.rollover_goal(now)?;
        Ok(self.goals.goal())
    }

    /// Goal as last stored, without rollover.
    pub fn goal(&self) -> &StudyGoal {
        self.goals.goal()
    }

    pub fn tasks(&self) -> &[Task] {
        self.tasks.tasks()
    }

    pub fn task(&self, id: &str) -> Option<&Task> {
        self.tasks.get(id)
    }

    pub fn achievements(&self) -> &Achievements {
        &self.achievements
    }

    pub fn activity(&self) -> &ActivityLog {
        &self.activity
    }

    pub fn config(&self) -> &PlannerConfig {
        &self.config
    }

    pub fn now(&self) -> NaiveDateTime {
        self.clock.now()
    }

    /// Tasks matching `filter`, in list order.
    pub fn filtered_tasks(&self, filter: &TaskFilter) -> Vec<&Task> {
        sort_for_list(filter_tasks(self.tasks.tasks(), filter, self.clock.now()))
    }

    /// Next incomplete tasks by due date, capped by `upcoming_limit`.
    pub fn upcoming(&self) -> Vec<&Task> {
        upcoming(self.tasks.tasks(), self.config.upcoming_limit)
    }

    pub fn stats(&self) -> TaskStats {
        task_stats(self.tasks.tasks(), self.clock.now())
    }

    /// Calendar grid for the month containing `month`.
    pub fn calendar_month(&self, month: NaiveDate) -> CalendarMonth {
        calendar_month(self.tasks.tasks(), month, self.clock.now().date())
    }

    /// Newest activity entries for the dashboard feed, newest first.
    pub fn recent_activity(&self) -> Vec<&ActivityEntry> {
        self.activity.recent(self.config.recent_activity_limit)
    }

    pub fn reminder_summary(&self) -> ReminderSummary {
        reminder_summary(self.tasks.tasks(), self.clock.now())
    }

    /// Runs one reminder tick against the current tasks.
    pub fn check_reminders(
        &self,
        scheduler: &mut ReminderScheduler,
        notifier: &mut dyn Notifier,
    ) -> Option<ReminderSummary> {
        scheduler.tick(self.tasks.tasks(), self.clock.now(), notifier)
    }

    pub fn store(&self) -> &S {
        self.repo.store()
    }

    pub fn into_store(self) -> S {
        self.repo.into_store()
    }

    fn rollover_goal(&mut self, now: NaiveDateTime) -> PlannerResult<()> {
        if self.goals.rollover_if_needed(now) {
            self.repo.save_goal(self.goals.goal())?;
            info!(
                "event=goal_rollover module=planner status=ok week_start={}",
                self.goals.goal().week_start
            );
        }
        Ok(())
    }

    fn log_activity(&mut self, action: String, now: NaiveDateTime) -> PlannerResult<()> {
        self.activity.append(action, now);
        self.repo.save_activity(&self.activity)?;
        Ok(())
    }

    fn refresh_achievements(&mut self, now: NaiveDateTime) -> PlannerResult<Vec<AchievementKind>> {
        let unlocked = evaluate_achievements(
            &mut self.achievements,
            self.tasks.tasks(),
            self.goals.goal(),
            now.date(),
        );
        if !unlocked.is_empty() {
            self.repo.save_achievements(&self.achievements)?;
            for kind in &unlocked {
                info!(
                    "event=achievement_unlock module=planner status=ok achievement={}",
                    kind.key()
                );
            }
        }
        Ok(unlocked)
    }
}

fn log_rejected(event: &str, code: &str) {
    debug!("event={event} module=planner status=rejected error_code={code}");
}
