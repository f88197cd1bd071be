use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::ledger::domain::daily_ledger::SkipPolicy;
use crate::shared::constants::{
    APP_DIR_NAME, CONFIG_FILE_NAME, DEFAULT_FRAME_DELAY_MS, DEFAULT_FRAME_HEIGHT,
    DEFAULT_FRAME_WIDTH, DEFAULT_PRESENCE_THRESHOLD_SECONDS, DEFAULT_TIME_INTERVAL_SECONDS,
};

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Options recognised by an attendance session.
///
/// Every field has a default, so a config file only needs to name the
/// values it changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AttendanceConfig {
    pub time_interval_seconds: f64,
    pub presence_threshold_seconds: f64,
    pub frame_width: u32,
    pub frame_height: u32,
    pub frame_delay_ms: u64,
    pub ledger_dir: PathBuf,
    pub roster_path: Option<PathBuf>,
    pub skip_policy: SkipPolicy,
}

impl Default for AttendanceConfig {
    fn default() -> Self {
        Self {
            time_interval_seconds: DEFAULT_TIME_INTERVAL_SECONDS,
            presence_threshold_seconds: DEFAULT_PRESENCE_THRESHOLD_SECONDS,
            frame_width: DEFAULT_FRAME_WIDTH,
            frame_height: DEFAULT_FRAME_HEIGHT,
            frame_delay_ms: DEFAULT_FRAME_DELAY_MS,
            ledger_dir: default_ledger_dir(),
            roster_path: None,
            skip_policy: SkipPolicy::default(),
        }
    }
}

impl AttendanceConfig {
    /// Loads configuration.
    ///
    /// An explicit `path` must exist and parse. Without one, the per-user
    /// config file is used when present, otherwise the built-in defaults.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(path) => Self::from_file(path),
            None => match default_config_path() {
                Some(path) if path.exists() => Self::from_file(&path),
                _ => Ok(Self::default()),
            },
        }
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let json = fs::read_to_string(path).map_err(|e| ConfigError::Read {
            path: path.to_path_buf(),
            source: e,
        })?;
        let config: Self = serde_json::from_str(&json).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            source: e,
        })?;
        log::debug!("Loaded config from {}", path.display());
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.time_interval_seconds.is_finite() && self.time_interval_seconds > 0.0) {
            return Err(ConfigError::Invalid(format!(
                "time_interval_seconds must be positive, got {}",
                self.time_interval_seconds
            )));
        }
        if !(self.presence_threshold_seconds.is_finite() && self.presence_threshold_seconds >= 0.0)
        {
            return Err(ConfigError::Invalid(format!(
                "presence_threshold_seconds must be non-negative, got {}",
                self.presence_threshold_seconds
            )));
        }
        if self.frame_width == 0 || self.frame_height == 0 {
            return Err(ConfigError::Invalid(format!(
                "frame size must be non-zero, got {}x{}",
                self.frame_width, self.frame_height
            )));
        }
        Ok(())
    }

    pub fn time_interval(&self) -> Duration {
        Duration::from_secs_f64(self.time_interval_seconds)
    }

    pub fn frame_delay(&self) -> Duration {
        Duration::from_millis(self.frame_delay_ms)
    }
}

/// `<config_dir>/attendance/config.json`, if the platform has a config dir.
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join(APP_DIR_NAME).join(CONFIG_FILE_NAME))
}

/// `<data_dir>/attendance/ledger`, or `./attendance` when there is no data dir.
pub fn default_ledger_dir() -> PathBuf {
    dirs::data_dir()
        .map(|d| d.join(APP_DIR_NAME).join("ledger"))
        .unwrap_or_else(|| PathBuf::from(APP_DIR_NAME))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use tempfile::TempDir;

    #[test]
    fn test_defaults() {
        let config = AttendanceConfig::default();
        assert_eq!(config.time_interval_seconds, 120.0);
        assert_eq!(config.presence_threshold_seconds, 60.0);
        assert_eq!((config.frame_width, config.frame_height), (640, 480));
        assert_eq!(config.frame_delay_ms, 100);
        assert_eq!(config.skip_policy, SkipPolicy::AnyRecord);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_file_keeps_other_defaults() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("config.json");
        fs::write(
            &path,
            r#"{"time_interval_seconds": 30, "skip_policy": "full-roster"}"#,
        )
        .unwrap();

        let config = AttendanceConfig::load(Some(&path)).unwrap();

        assert_eq!(config.time_interval_seconds, 30.0);
        assert_eq!(config.skip_policy, SkipPolicy::FullRoster);
        assert_eq!(config.presence_threshold_seconds, 60.0);
        assert_eq!(config.frame_width, 640);
    }

    #[test]
    fn test_explicit_missing_file_is_error() {
        let tmp = TempDir::new().unwrap();
        let result = AttendanceConfig::load(Some(&tmp.path().join("nope.json")));
        assert!(matches!(result, Err(ConfigError::Read { .. })));
    }

    #[test]
    fn test_malformed_file_is_parse_error() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("config.json");
        fs::write(&path, "{ not json").unwrap();
        let result = AttendanceConfig::load(Some(&path));
        assert!(matches!(result, Err(ConfigError::Parse { .. })));
    }

    #[rstest]
    #[case::zero_interval(0.0, 60.0, 640, 480)]
    #[case::negative_threshold(120.0, -1.0, 640, 480)]
    #[case::zero_width(120.0, 60.0, 0, 480)]
    #[case::nan_interval(f64::NAN, 60.0, 640, 480)]
    fn test_validate_rejects(
        #[case] interval: f64,
        #[case] threshold: f64,
        #[case] width: u32,
        #[case] height: u32,
    ) {
        let config = AttendanceConfig {
            time_interval_seconds: interval,
            presence_threshold_seconds: threshold,
            frame_width: width,
            frame_height: height,
            ..AttendanceConfig::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_durations() {
        let config = AttendanceConfig {
            time_interval_seconds: 1.5,
            frame_delay_ms: 250,
            ..AttendanceConfig::default()
        };
        assert_eq!(config.time_interval(), Duration::from_millis(1500));
        assert_eq!(config.frame_delay(), Duration::from_millis(250));
    }

    #[test]
    fn test_default_ledger_dir_names_app() {
        assert!(default_ledger_dir().to_string_lossy().contains(APP_DIR_NAME));
    }
}
