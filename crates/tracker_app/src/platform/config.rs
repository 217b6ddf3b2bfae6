//! Tracker configuration loaded from `./tracker.ron`.
//!
//! A missing file yields defaults; a malformed one is an error.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::Duration;

use log::LevelFilter;
use serde::Deserialize;
use tracker_core::PollerConfig;
use tracker_engine::ClientSettings;

use super::logging::LogDestination;

pub const DEFAULT_CONFIG_PATH: &str = "./tracker.ron";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("cannot read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("cannot parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: ron::error::SpannedError,
    },
    #[error("{field} must be greater than zero")]
    ZeroInterval { field: &'static str },
    #[error("unknown log level {0:?}")]
    LogLevel(String),
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct TrackerConfig {
    pub base_url: String,
    pub session_cookie: Option<String>,
    pub connect_timeout_ms: u64,
    pub request_timeout_ms: Option<u64>,
    pub single_job_poll_ms: u64,
    pub dashboard_poll_ms: u64,
    pub elapsed_tick_ms: u64,
    pub log_destination: LogDestination,
    pub log_level: String,
    pub log_file: PathBuf,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:5000/".to_string(),
            session_cookie: None,
            connect_timeout_ms: 10_000,
            request_timeout_ms: None,
            single_job_poll_ms: 2000,
            dashboard_poll_ms: 5000,
            elapsed_tick_ms: 1000,
            log_destination: LogDestination::File,
            log_level: "info".to_string(),
            log_file: PathBuf::from("./tracker.log"),
        }
    }
}

impl TrackerConfig {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = match fs::read_to_string(path) {
            Ok(text) => text,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(Self::default()),
            Err(source) => {
                return Err(ConfigError::Io {
                    path: path.to_path_buf(),
                    source,
                })
            }
        };
        let config: Self = ron::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Interval timers reject a zero period, so every interval must be positive.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (field, value) in [
            ("single_job_poll_ms", self.single_job_poll_ms),
            ("dashboard_poll_ms", self.dashboard_poll_ms),
            ("elapsed_tick_ms", self.elapsed_tick_ms),
        ] {
            if value == 0 {
                return Err(ConfigError::ZeroInterval { field });
            }
        }
        self.level_filter().map(|_| ())
    }

    pub fn level_filter(&self) -> Result<LevelFilter, ConfigError> {
        self.log_level
            .parse()
            .map_err(|_| ConfigError::LogLevel(self.log_level.clone()))
    }

    pub fn client_settings(&self) -> ClientSettings {
        ClientSettings {
            base_url: self.base_url.clone(),
            session_cookie: self.session_cookie.clone(),
            connect_timeout: Duration::from_millis(self.connect_timeout_ms),
            request_timeout: self.request_timeout_ms.map(Duration::from_millis),
            ..ClientSettings::default()
        }
    }

    pub fn single_job_poller(&self) -> PollerConfig {
        let mut config = PollerConfig::single_job()
            .with_poll_interval(Duration::from_millis(self.single_job_poll_ms));
        config.elapsed_interval = Some(Duration::from_millis(self.elapsed_tick_ms));
        config
    }

    pub fn dashboard_poller(&self) -> PollerConfig {
        PollerConfig::dashboard().with_poll_interval(Duration::from_millis(self.dashboard_poll_ms))
    }
}
