//! Persistence layer for planner state.
//!
//! # Responsibility
//! - Define the key-value storage contract the planner writes through.
//! - Isolate SQLite and JSON encoding details from services.
//!
//! # Invariants
//! - Every mutation is written back synchronously; nothing is buffered.
//! - Read failures degrade to defaults instead of surfacing errors.

pub mod kv_store;
pub mod state_repo;
