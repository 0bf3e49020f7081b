//! Configuration loading and management
//!
//! Configuration is loaded from `~/.config/readlog/config.toml`
//!
//! Paths follow the XDG Base Directory Specification:
//! - Config: `$XDG_CONFIG_HOME/readlog/` (~/.config/readlog/)
//! - Data: `$XDG_DATA_HOME/readlog/` (~/.local/share/readlog/)
//! - State/Logs: `$XDG_STATE_HOME/readlog/` (~/.local/state/readlog/)

use crate::calendar::DayBoundary;
use crate::error::{Error, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

const APP_DIR: &str = "readlog";

fn home_dir() -> PathBuf {
    std::env::var_os("HOME")
        .map(PathBuf::from)
        .or_else(dirs::home_dir)
        .unwrap_or_else(|| PathBuf::from("."))
}

fn xdg_dir(var: &str, fallback: &str) -> PathBuf {
    std::env::var_os(var)
        .map(PathBuf::from)
        .unwrap_or_else(|| home_dir().join(fallback))
}

/// Main configuration struct
#[derive(Debug, Deserialize, Default)]
pub struct Config {
    /// Override for the SQLite database location
    #[serde(default)]
    pub database_path: Option<PathBuf>,

    /// Day-window and target policy
    #[serde(default)]
    pub tracking: TrackingConfig,

    /// Leaderboard presentation
    #[serde(default)]
    pub leaderboard: LeaderboardConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Reading marathon window, if one is running
    #[serde(default)]
    pub marathon: Option<MarathonConfig>,
}

/// How submissions are bucketed into calendar days.
#[derive(Debug, Deserialize, Default, Clone, Copy)]
pub struct TrackingConfig {
    /// Which clock defines midnight (`local` or `utc`)
    #[serde(default)]
    pub day_boundary: DayBoundary,
}

/// Leaderboard configuration
#[derive(Debug, Deserialize, Clone, Copy)]
pub struct LeaderboardConfig {
    /// Rows shown on the user dashboard
    #[serde(default = "default_leaderboard_top")]
    pub top: usize,
}

impl Default for LeaderboardConfig {
    fn default() -> Self {
        Self {
            top: default_leaderboard_top(),
        }
    }
}

fn default_leaderboard_top() -> usize {
    3
}

/// A fixed reading challenge with checkpoint tests along the way.
///
/// Dates are quoted `YYYY-MM-DD` strings.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct MarathonConfig {
    pub start: NaiveDate,
    pub end: NaiveDate,
    #[serde(default)]
    pub checkpoints: Vec<Checkpoint>,
}

/// A dated test inside the marathon.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct Checkpoint {
    pub date: NaiveDate,
    pub name: String,
    #[serde(default)]
    pub description: String,
}

/// Logging configuration
#[derive(Debug, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Maximum number of rotated log files to keep
    #[serde(default = "default_max_log_files")]
    pub max_files: usize,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            max_files: default_max_log_files(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_max_log_files() -> usize {
    5
}

impl Config {
    /// Load configuration from the default path
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path();

        if !config_path.exists() {
            tracing::info!("No config file found at {:?}, using defaults", config_path);
            return Ok(Config::default());
        }

        Self::load_from(&config_path)
    }

    /// Load configuration from a specific path
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("failed to read config file {:?}: {}", path, e)))?;

        let config: Config = toml::from_str(&content)
            .map_err(|e| Error::Config(format!("failed to parse config: {}", e)))?;

        config.validate()?;
        Ok(config)
    }

    /// Reject settings that would make the dashboard meaningless.
    pub fn validate(&self) -> Result<()> {
        if self.leaderboard.top == 0 {
            return Err(Error::Config(
                "leaderboard.top must be at least 1".to_string(),
            ));
        }
        if let Some(marathon) = &self.marathon {
            if marathon.end <= marathon.start {
                return Err(Error::Config(format!(
                    "marathon.end ({}) must be after marathon.start ({})",
                    marathon.end, marathon.start
                )));
            }
        }
        Ok(())
    }

    /// Database location, honoring the `database_path` override.
    pub fn db_path(&self) -> PathBuf {
        self.database_path
            .clone()
            .unwrap_or_else(Self::database_path)
    }

    /// `$XDG_CONFIG_HOME/readlog/config.toml`
    pub fn config_path() -> PathBuf {
        xdg_dir("XDG_CONFIG_HOME", ".config")
            .join(APP_DIR)
            .join("config.toml")
    }

    /// `$XDG_DATA_HOME/readlog/`
    pub fn data_dir() -> PathBuf {
        xdg_dir("XDG_DATA_HOME", ".local/share").join(APP_DIR)
    }

    /// `$XDG_STATE_HOME/readlog/`
    pub fn state_dir() -> PathBuf {
        xdg_dir("XDG_STATE_HOME", ".local/state").join(APP_DIR)
    }

    /// Default database file: `$XDG_DATA_HOME/readlog/readlog.db`
    pub fn database_path() -> PathBuf {
        Self::data_dir().join("readlog.db")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert!(config.database_path.is_none());
        assert_eq!(config.tracking.day_boundary, DayBoundary::Local);
        assert_eq!(config.leaderboard.top, 3);
        assert_eq!(config.logging.level, "info");
        assert!(config.marathon.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_parse_config() {
        let toml = r#"
database_path = "/tmp/readlog-test.db"

[tracking]
day_boundary = "utc"

[leaderboard]
top = 10

[logging]
level = "debug"
"#;
        let config: Config = toml::from_str(toml).unwrap();

        assert_eq!(config.tracking.day_boundary, DayBoundary::Utc);
        assert_eq!(config.leaderboard.top, 10);
        assert_eq!(config.logging.level, "debug");
        assert_eq!(config.logging.max_files, 5);
        assert_eq!(config.db_path(), PathBuf::from("/tmp/readlog-test.db"));
    }

    #[test]
    fn test_zero_top_rejected() {
        let config: Config = toml::from_str("[leaderboard]\ntop = 0\n").unwrap();
        assert!(matches!(config.validate(), Err(Error::Config(_))));
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[tracking]\nday_boundary = \"local\"\n").unwrap();

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.tracking.day_boundary, DayBoundary::Local);
    }

    #[test]
    fn test_unknown_boundary_is_config_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[tracking]\nday_boundary = \"martian\"\n").unwrap();

        assert!(matches!(Config::load_from(&path), Err(Error::Config(_))));
    }

    #[test]
    fn test_parse_marathon() {
        let toml = r#"
[marathon]
start = "2025-07-17"
end = "2025-08-17"

[[marathon.checkpoints]]
date = "2025-07-30"
name = "Mid-Marathon Test"
description = "Halfway checkpoint assessment"

[[marathon.checkpoints]]
date = "2025-08-15"
name = "Final Marathon Test"
"#;
        let config: Config = toml::from_str(toml).unwrap();
        let marathon = config.marathon.as_ref().unwrap();

        assert_eq!(marathon.start, NaiveDate::from_ymd_opt(2025, 7, 17).unwrap());
        assert_eq!(marathon.checkpoints.len(), 2);
        assert_eq!(marathon.checkpoints[1].name, "Final Marathon Test");
        assert_eq!(marathon.checkpoints[1].description, "");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_inverted_marathon_rejected() {
        let toml = "[marathon]\nstart = \"2025-08-17\"\nend = \"2025-07-17\"\n";
        let config: Config = toml::from_str(toml).unwrap();
        assert!(matches!(config.validate(), Err(Error::Config(_))));
    }
}
