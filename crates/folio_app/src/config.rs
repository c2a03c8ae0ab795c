use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use folio_engine::{ClientSettings, EngineSettings, PollSettings};
use folio_logging::folio_info;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::logging::LogDestination;

/// Read when `--config` is not given; a missing file means defaults.
pub const DEFAULT_CONFIG_FILE: &str = "folio.ron";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path:?}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config {path:?}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: ron::error::SpannedError,
    },
}

/// Settings loaded from a RON file, e.g.
///
/// ```ron
/// (
///     base_url: "https://folio.example.org/",
///     poll_interval_ms: 2000,
///     log_level: "debug",
/// )
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FolioConfig {
    pub base_url: String,
    pub connect_timeout_ms: u64,
    pub request_timeout_ms: u64,
    pub poll_interval_ms: u64,
    pub max_polls: u32,
    pub debounce_ms: u64,
    /// How long a command waits for its requests to settle.
    pub wait_timeout_secs: u64,
    pub log_level: String,
    pub log_destination: LogDestination,
}

impl Default for FolioConfig {
    fn default() -> Self {
        let engine = EngineSettings::default();
        Self {
            base_url: engine.client.base_url,
            connect_timeout_ms: millis(engine.client.connect_timeout),
            request_timeout_ms: millis(engine.client.request_timeout),
            poll_interval_ms: millis(engine.poll.interval),
            max_polls: engine.poll.max_polls,
            debounce_ms: millis(engine.debounce),
            wait_timeout_secs: 600,
            log_level: "info".to_string(),
            log_destination: LogDestination::Terminal,
        }
    }
}

impl FolioConfig {
    /// Loads `path`, or `folio.ron` in the working directory when `path` is
    /// `None`. Only an explicitly named file has to exist.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let (path, required) = match path {
            Some(path) => (path.to_path_buf(), true),
            None => (PathBuf::from(DEFAULT_CONFIG_FILE), false),
        };
        let content = match fs::read_to_string(&path) {
            Ok(text) => text,
            Err(err) if !required && err.kind() == std::io::ErrorKind::NotFound => {
                return Ok(Self::default());
            }
            Err(source) => return Err(ConfigError::Read { path, source }),
        };
        let config = ron::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.clone(),
            source,
        })?;
        folio_info!("loaded configuration from {:?}", path);
        Ok(config)
    }

    pub fn engine_settings(&self) -> EngineSettings {
        EngineSettings {
            client: ClientSettings {
                base_url: self.base_url.clone(),
                connect_timeout: Duration::from_millis(self.connect_timeout_ms),
                request_timeout: Duration::from_millis(self.request_timeout_ms),
            },
            poll: PollSettings {
                interval: Duration::from_millis(self.poll_interval_ms),
                max_polls: self.max_polls,
            },
            debounce: Duration::from_millis(self.debounce_ms),
        }
    }

    pub fn wait_timeout(&self) -> Duration {
        Duration::from_secs(self.wait_timeout_secs)
    }
}

fn millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}
