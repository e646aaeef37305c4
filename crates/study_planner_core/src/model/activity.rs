//! Bounded activity log.
//!
//! # Responsibility
//! - Keep the most recent human-readable planner events in insertion order.
//! - Format entry age for feed display.
//!
//! # Invariants
//! - `len() <= capacity()` after every operation.
//! - Eviction always removes the oldest entry first.

use crate::model::timestamp;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// Default number of entries retained.
pub const DEFAULT_ACTIVITY_CAPACITY: usize = 20;

/// One logged planner event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivityEntry {
    pub action: String,
    #[serde(deserialize_with = "timestamp::deserialize")]
    pub timestamp: NaiveDateTime,
}

/// Append-only log capped at `capacity` entries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActivityLog {
    entries: VecDeque<ActivityEntry>,
    capacity: usize,
}

impl ActivityLog {
    /// Creates an empty log. A zero capacity is raised to one.
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: VecDeque::new(),
            capacity: capacity.max(1),
        }
    }

    /// Rebuilds a log from persisted entries, keeping only the newest ones.
    pub fn from_entries(entries: Vec<ActivityEntry>, capacity: usize) -> Self {
        let mut log = Self::new(capacity);
        log.entries = entries.into();
        log.evict_overflow();
        log
    }

    pub fn append(&mut self, action: impl Into<String>, now: NaiveDateTime) {
        self.entries.push_back(ActivityEntry {
            action: action.into(),
            timestamp: now,
        });
        self.evict_overflow();
    }

    /// Newest `limit` entries, newest first.
    pub fn recent(&self, limit: usize) -> Vec<&ActivityEntry> {
        self.entries.iter().rev().take(limit).collect()
    }

    /// All entries, oldest first.
    pub fn entries(&self) -> impl Iterator<Item = &ActivityEntry> + '_ {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    fn evict_overflow(&mut self) {
        while self.entries.len() > self.capacity {
            self.entries.pop_front();
        }
    }
}

impl Default for ActivityLog {
    fn default() -> Self {
        Self::new(DEFAULT_ACTIVITY_CAPACITY)
    }
}

/// Formats how long ago `timestamp` happened relative to `now`.
///
/// Under an hour (or in the future) is "Just now", under a day is "{H}h ago",
/// anything older is "{D}d ago" with whole days.
pub fn format_relative_time(timestamp: NaiveDateTime, now: NaiveDateTime) -> String {
    let hours = (now - timestamp).num_hours();
    if hours < 1 {
        "Just now".to_string()
    } else if hours < 24 {
        format!("{hours}h ago")
    } else {
        format!("{}d ago", hours / 24)
    }
}

#[cfg(test)]
mod tests {
    use super::format_relative_time;
    use chrono::{Duration, NaiveDate};

    #[test]
    fn relative_time_buckets() {
        let now = NaiveDate::from_ymd_opt(2026, 10, 17)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap();
        assert_eq!(format_relative_time(now - Duration::minutes(59), now), "Just now");
        assert_eq!(format_relative_time(now + Duration::hours(3), now), "Just now");
        assert_eq!(format_relative_time(now - Duration::hours(5), now), "5h ago");
        assert_eq!(format_relative_time(now - Duration::hours(23), now), "23h ago");
        assert_eq!(format_relative_time(now - Duration::hours(24), now), "1d ago");
        assert_eq!(format_relative_time(now - Duration::hours(73), now), "3d ago");
    }
}
