//! Query and derived-state engine.
//!
//! # Responsibility
//! - Compute values the presentation layer renders: statuses, filtered and
//!   sorted lists, due labels, dashboard counters and calendar grids.
//!
//! # Invariants
//! - Derived state is never stored; it is recomputed from tasks and "now".

pub mod calendar;
pub mod task_query;
