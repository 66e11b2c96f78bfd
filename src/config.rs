//! Configuration file and on-disk locations.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::constants;
use crate::core::log_capture::LogCapture;
use crate::core::orchestrator::ConnectSettings;
use crate::core::poller::PollSettings;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file {}: {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Failed to parse config {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
    #[error("Could not determine a config directory; pass --config-dir")]
    NoConfigDir,
}

/// Files the application reads and writes, all under one directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Paths {
    pub config_dir: PathBuf,
}

impl Paths {
    /// Uses `override_dir` when given, else the platform config directory.
    pub fn resolve(override_dir: Option<PathBuf>) -> Result<Self, ConfigError> {
        let config_dir = match override_dir {
            Some(dir) => dir,
            None => dirs::config_dir()
                .ok_or(ConfigError::NoConfigDir)?
                .join(constants::CONFIG_DIR_NAME),
        };
        Ok(Self { config_dir })
    }

    pub fn config_file(&self) -> PathBuf {
        self.config_dir.join(constants::CONFIG_FILE_NAME)
    }

    pub fn usernames_file(&self) -> PathBuf {
        self.config_dir.join(constants::USERNAMES_FILE_NAME)
    }

    pub fn logs_dir(&self) -> PathBuf {
        self.config_dir.join(constants::LOGS_DIR_NAME)
    }

    pub fn session_log(&self) -> PathBuf {
        self.logs_dir().join(constants::SESSION_LOG_FILE_NAME)
    }

    pub fn diagnostics_log(&self) -> PathBuf {
        self.logs_dir().join(constants::DIAGNOSTICS_LOG_FILE_NAME)
    }
}

/// Contents of `config.toml`. Every field is optional.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub tick_rate_ms: u64,
    pub refresh_interval_secs: u64,
    /// 0 disables the idle exit.
    pub idle_exit_minutes: u64,
    /// Default tracing filter, overridden by `RUST_LOG` and `--log-level`.
    pub log_level: String,
    pub connect: ConnectConfig,
    pub log_capture: LogCaptureConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            tick_rate_ms: constants::DEFAULT_TICK_RATE_MS,
            refresh_interval_secs: constants::DEFAULT_REFRESH_SECS,
            idle_exit_minutes: constants::DEFAULT_IDLE_EXIT_MINUTES,
            log_level: "info".to_string(),
            connect: ConnectConfig::default(),
            log_capture: LogCaptureConfig::default(),
        }
    }
}

/// `[connect]` table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConnectConfig {
    pub status_deadline_secs: u64,
    pub poll_tick_ms: u64,
    pub status_interval_ms: u64,
    pub ready_retry_ms: u64,
    pub settle_attempts: u32,
    pub settle_interval_ms: u64,
    pub log_flush_ms: u64,
}

impl Default for ConnectConfig {
    fn default() -> Self {
        let settings = ConnectSettings::default();
        Self {
            status_deadline_secs: settings.poll.deadline.as_secs(),
            poll_tick_ms: millis(settings.poll.tick),
            status_interval_ms: millis(settings.poll.interval),
            ready_retry_ms: millis(settings.ready_retry),
            settle_attempts: settings.settle_attempts,
            settle_interval_ms: millis(settings.settle_interval),
            log_flush_ms: millis(settings.log_flush),
        }
    }
}

fn millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

/// `[log_capture]` table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogCaptureConfig {
    pub enabled: bool,
    pub log_level: u8,
    pub rotate_bytes: u64,
}

impl Default for LogCaptureConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            log_level: constants::DEFAULT_CAPTURE_LOG_LEVEL,
            rotate_bytes: constants::DEFAULT_LOG_ROTATE_BYTES,
        }
    }
}

impl AppConfig {
    /// Reads `path`; a missing file yields the defaults.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Self::default()),
            Err(source) => {
                return Err(ConfigError::Read {
                    path: path.to_path_buf(),
                    source,
                })
            }
        };
        toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn connect_settings(&self) -> ConnectSettings {
        let c = &self.connect;
        ConnectSettings {
            settle_attempts: c.settle_attempts,
            settle_interval: Duration::from_millis(c.settle_interval_ms),
            ready_retry: Duration::from_millis(c.ready_retry_ms),
            log_flush: Duration::from_millis(c.log_flush_ms),
            poll: PollSettings {
                deadline: Duration::from_secs(c.status_deadline_secs),
                // A zero tick would spin
                tick: Duration::from_millis(c.poll_tick_ms.max(1)),
                interval: Duration::from_millis(c.status_interval_ms),
            },
        }
    }

    /// Log capture for new sessions, unless disabled.
    pub fn log_capture(&self, paths: &Paths) -> Option<LogCapture> {
        self.log_capture.enabled.then(|| {
            LogCapture::new(
                paths.session_log(),
                self.log_capture.log_level,
                self.log_capture.rotate_bytes,
            )
        })
    }

    pub fn refresh_interval(&self) -> Duration {
        Duration::from_secs(self.refresh_interval_secs)
    }

    /// `None` when idle exit is disabled.
    pub fn idle_exit(&self) -> Option<Duration> {
        (self.idle_exit_minutes > 0).then(|| Duration::from_secs(self.idle_exit_minutes * 60))
    }
}
