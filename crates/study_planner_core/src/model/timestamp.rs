//! Lenient timestamp decoding for persisted records.
//!
//! # Responsibility
//! - Accept both the naive local form this crate writes
//!   (`2026-10-17T09:00:00`) and RFC 3339 strings with an offset or `Z`
//!   suffix, as written by browser front-ends (`2026-10-17T09:00:00.000Z`).
//!
//! # Invariants
//! - Offset-carrying values are converted to local wall-clock time.
//! - Serialization is untouched; records are always written in naive form.

use chrono::{DateTime, Local, NaiveDateTime};
use serde::de::Error as _;
use serde::{Deserialize, Deserializer};

/// Parses a naive or RFC 3339 timestamp into local wall-clock time.
pub fn parse_local(value: &str) -> Option<NaiveDateTime> {
    let trimmed = value.trim();
    if let Ok(naive) = trimmed.parse::<NaiveDateTime>() {
        return Some(naive);
    }
    DateTime::parse_from_rfc3339(trimmed)
        .ok()
        .map(|stamped| stamped.with_timezone(&Local).naive_local())
}

/// `deserialize_with` adapter for required timestamps.
pub fn deserialize<'de, D>(deserializer: D) -> Result<NaiveDateTime, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_local(&raw).ok_or_else(|| D::Error::custom(format!("invalid timestamp `{raw}`")))
}

/// `deserialize_with` adapter for optional timestamps; `null` stays `None`.
pub fn deserialize_option<'de, D>(deserializer: D) -> Result<Option<NaiveDateTime>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<String>::deserialize(deserializer)?
        .map(|raw| {
            parse_local(&raw).ok_or_else(|| D::Error::custom(format!("invalid timestamp `{raw}`")))
        })
        .transpose()
}
