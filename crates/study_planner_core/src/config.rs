//! Planner configuration.
//!
//! # Responsibility
//! - Describe tunables of the planner core and its host process.
//! - Load them from TOML with every field optional.
//!
//! # Invariants
//! - A config that passed `validate()` never yields a zero capacity, a zero
//!   reminder interval, a non-positive default goal or an unknown log level.

use crate::logging::{default_log_level, parse_level};
use crate::model::activity::DEFAULT_ACTIVITY_CAPACITY;
use crate::model::goal::DEFAULT_WEEKLY_HOURS;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};

const DEFAULT_UPCOMING_LIMIT: usize = 5;
const DEFAULT_RECENT_ACTIVITY_LIMIT: usize = 5;
const DEFAULT_REMINDER_INTERVAL_SECS: u64 = 60;
const DATA_DIR_NAME: &str = "study-planner";
const DATABASE_FILE_NAME: &str = "planner.db";

/// Per-user database file, e.g. `~/.local/share/study-planner/planner.db`.
///
/// `None` when the platform has no user data directory.
pub fn default_database_path() -> Option<PathBuf> {
    dirs::data_dir().map(|dir| dir.join(DATA_DIR_NAME).join(DATABASE_FILE_NAME))
}

/// Configuration errors.
#[derive(Debug)]
pub enum ConfigError {
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    Parse {
        path: Option<PathBuf>,
        message: String,
    },
    Invalid(String),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Read { path, source } => {
                write!(f, "failed to read config `{}`: {source}", path.display())
            }
            Self::Parse {
                path: Some(path),
                message,
            } => write!(f, "failed to parse config `{}`: {message}", path.display()),
            Self::Parse {
                path: None,
                message,
            } => write!(f, "failed to parse config: {message}"),
            Self::Invalid(message) => write!(f, "invalid config: {message}"),
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Read { source, .. } => Some(source),
            _ => None,
        }
    }
}

/// Planner tunables.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlannerConfig {
    /// Weekly goal used until the user sets one.
    pub default_weekly_hours: f64,
    /// Activity entries kept; older ones are evicted.
    pub activity_log_capacity: usize,
    /// Tasks listed in the dashboard "upcoming" panel.
    pub upcoming_limit: usize,
    /// Entries listed in the dashboard activity feed.
    pub recent_activity_limit: usize,
    /// Seconds between reminder checks.
    pub reminder_interval_secs: u64,
    pub log_level: String,
    /// Absolute directory for rolling log files; no file logging when unset.
    pub log_dir: Option<PathBuf>,
    /// SQLite database file; `default_database_path()` when unset.
    pub database_path: Option<PathBuf>,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            default_weekly_hours: DEFAULT_WEEKLY_HOURS,
            activity_log_capacity: DEFAULT_ACTIVITY_CAPACITY,
            upcoming_limit: DEFAULT_UPCOMING_LIMIT,
            recent_activity_limit: DEFAULT_RECENT_ACTIVITY_LIMIT,
            reminder_interval_secs: DEFAULT_REMINDER_INTERVAL_SECS,
            log_level: default_log_level().to_string(),
            log_dir: None,
            database_path: None,
        }
    }
}

impl PlannerConfig {
    /// Loads and validates a TOML config file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Self = toml::from_str(&content).map_err(|err| ConfigError::Parse {
            path: Some(path.to_path_buf()),
            message: err.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Parses and validates TOML text.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content).map_err(|err| ConfigError::Parse {
            path: None,
            message: err.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Database file to open: the configured one, else the per-user default.
    pub fn resolved_database_path(&self) -> Result<PathBuf, ConfigError> {
        self.database_path
            .clone()
            .or_else(default_database_path)
            .ok_or_else(|| {
                ConfigError::Invalid(
                    "no user data directory; set database_path explicitly".to_string(),
                )
            })
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.default_weekly_hours.is_finite() && self.default_weekly_hours > 0.0) {
            return Err(ConfigError::Invalid(format!(
                "default_weekly_hours must be greater than zero, got {}",
                self.default_weekly_hours
            )));
        }
        if self.activity_log_capacity == 0 {
            return Err(ConfigError::Invalid(
                "activity_log_capacity must be at least 1".to_string(),
            ));
        }
        if self.upcoming_limit == 0 {
            return Err(ConfigError::Invalid(
                "upcoming_limit must be at least 1".to_string(),
            ));
        }
        if self.reminder_interval_secs == 0 {
            return Err(ConfigError::Invalid(
                "reminder_interval_secs must be at least 1".to_string(),
            ));
        }
        parse_level(&self.log_level).map_err(ConfigError::Invalid)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::{default_database_path, ConfigError, PlannerConfig};
    use std::path::PathBuf;

    #[test]
    fn empty_document_yields_defaults() {
        let config = PlannerConfig::from_toml_str("").expect("empty config should parse");
        assert_eq!(config, PlannerConfig::default());
        assert_eq!(config.default_weekly_hours, 20.0);
        assert_eq!(config.activity_log_capacity, 20);
        assert_eq!(config.reminder_interval_secs, 60);
    }

    #[test]
    fn partial_document_overrides_only_named_fields() {
        let config = PlannerConfig::from_toml_str(
            "default_weekly_hours = 12.5\nupcoming_limit = 3\ndatabase_path = \"/tmp/planner.db\"",
        )
        .expect("partial config should parse");
        assert_eq!(config.default_weekly_hours, 12.5);
        assert_eq!(config.upcoming_limit, 3);
        assert_eq!(config.activity_log_capacity, 20);
        assert!(config.database_path.is_some());
    }

    #[test]
    fn invalid_values_are_rejected() {
        let err = PlannerConfig::from_toml_str("default_weekly_hours = 0.0")
            .expect_err("zero goal must be rejected");
        assert!(matches!(err, ConfigError::Invalid(_)));

        let err = PlannerConfig::from_toml_str("reminder_interval_secs = \"soon\"")
            .expect_err("wrong type must be rejected");
        assert!(matches!(err, ConfigError::Parse { path: None, .. }));
    }

    #[test]
    fn unknown_log_level_is_rejected_at_load() {
        let err = PlannerConfig::from_toml_str("log_level = \"verbose\"")
            .expect_err("unknown level must be rejected");
        assert!(matches!(err, ConfigError::Invalid(message) if message.contains("verbose")));

        let config = PlannerConfig::from_toml_str("log_level = \"WARNING\"")
            .expect("level aliases are accepted");
        assert_eq!(config.log_level, "WARNING");
    }

    #[test]
    fn database_path_prefers_config_over_user_default() {
        let config = PlannerConfig {
            database_path: Some(PathBuf::from("/tmp/planner.db")),
            ..PlannerConfig::default()
        };
        assert_eq!(
            config.resolved_database_path().expect("explicit path"),
            PathBuf::from("/tmp/planner.db")
        );

        if let Some(default_path) = default_database_path() {
            assert_eq!(
                PlannerConfig::default()
                    .resolved_database_path()
                    .expect("user default"),
                default_path
            );
            assert!(default_path.ends_with("study-planner/planner.db"));
        }
    }
}
