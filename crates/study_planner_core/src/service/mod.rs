//! Planner use-case services.
//!
//! # Responsibility
//! - Apply user intents to the task store and goal tracker.
//! - Evaluate achievements and run reminder checks.
//! - Compose everything behind the `Planner` root so UI layers never touch
//!   storage directly.

pub mod achievement_evaluator;
pub mod goal_tracker;
pub mod planner;
pub mod reminder;
pub mod task_store;
