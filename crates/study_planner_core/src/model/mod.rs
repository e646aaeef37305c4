//! Study planner domain model.
//!
//! # Responsibility
//! - Define the records persisted by the planner: tasks, the weekly goal,
//!   achievement flags and the activity log.
//! - Keep validation rules next to the data they protect.
//!
//! # Invariants
//! - Model types are plain data; clocks and storage are passed in, never read
//!   from globals.

pub mod achievement;
pub mod activity;
pub mod goal;
pub mod task;
pub mod timestamp;
