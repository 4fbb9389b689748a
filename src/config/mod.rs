//! Configuration management for calibr-sync.
//!
//! Configuration is read from `~/.config/calibr-sync/config.toml` unless a
//! path is given explicitly. If the default file doesn't exist, a default
//! configuration with comments is created. Command-line flags are applied on
//! top of whatever the file provides.

use std::collections::BTreeMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::fetcher::ConcurrencyMode;

pub const DEFAULT_BASE_URL: &str = "http://webrobo.mgul.ac.ru:3000/db_api_REST/calibr";
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 6.1) AppleWebKit/537.36 \
     (KHTML, like Gecko) Chrome/41.0.2228.0 Safari/537.36";

/// Main configuration struct.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub fetch: FetchConfig,
    pub retry: RetryConfig,
    /// Request headers sent with every fetch
    pub headers: BTreeMap<String, String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            fetch: FetchConfig::default(),
            retry: RetryConfig::default(),
            headers: BTreeMap::from([("User-Agent".to_string(), DEFAULT_USER_AGENT.to_string())]),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FetchConfig {
    /// Endpoint root; days are fetched from `{base_url}/day/YYYY-MM-DD`
    pub base_url: String,
    pub output_dir: PathBuf,
    /// First day of the range
    pub start: NaiveDate,
    /// Number of consecutive days to fetch
    pub days: usize,
    pub mode: ConcurrencyMode,
    /// Simultaneous workers in parallel mode, 0 for one per day
    pub workers: usize,
    /// Per-request timeout in seconds
    pub timeout_secs: Option<u64>,
    /// Give up on the whole run after this many seconds
    pub deadline_secs: Option<u64>,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            output_dir: PathBuf::from("loaded"),
            start: NaiveDate::from_ymd_opt(2023, 3, 18).unwrap_or_default(),
            days: 1,
            mode: ConcurrencyMode::Parallel,
            workers: 0,
            timeout_secs: None,
            deadline_secs: None,
        }
    }
}

impl FetchConfig {
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }

    pub fn deadline(&self) -> Option<Duration> {
        self.deadline_secs.map(Duration::from_secs)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackoffKind {
    #[default]
    Fixed,
    Exponential,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryConfig {
    /// Attempts per day before giving up, 0 for unlimited
    pub max_attempts: u32,
    /// Delay before the first retry in milliseconds, 0 retries immediately
    pub delay_ms: u64,
    pub backoff: BackoffKind,
    /// Upper bound for exponential backoff in milliseconds
    pub max_delay_ms: u64,
    /// Stop retrying a day the server answers with 404
    pub stop_on_not_found: bool,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 0,
            delay_ms: 0,
            backoff: BackoffKind::Fixed,
            max_delay_ms: 60_000,
            stop_on_not_found: false,
        }
    }
}

impl Config {
    /// Load configuration from the default path.
    ///
    /// If the config file doesn't exist, creates a default one with comments.
    pub fn load() -> Result<Self, ConfigError> {
        let config_path = Self::default_config_path()?;

        if !config_path.exists() {
            Self::create_default_config(&config_path)?;
            return Ok(Self::default());
        }

        Self::load_from(&config_path)
    }

    /// Load configuration from an explicit path, which must exist.
    /// Missing fields use default values.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;

        toml::from_str(&content).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            source: e,
        })
    }

    /// Get the default config file path: `~/.config/calibr-sync/config.toml`
    pub fn default_config_path() -> Result<PathBuf, ConfigError> {
        let config_dir = dirs::config_dir().ok_or(ConfigError::NoConfigDir)?;
        Ok(config_dir.join("calibr-sync").join("config.toml"))
    }

    /// Render the effective configuration as TOML.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(ConfigError::Serialize)
    }

    fn create_default_config(path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| ConfigError::Io {
                path: parent.to_path_buf(),
                source: e,
            })?;
        }

        let mut file = fs::File::create(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;

        file.write_all(Self::default_config_content().as_bytes())
            .map_err(|e| ConfigError::Io {
                path: path.to_path_buf(),
                source: e,
            })?;

        Ok(())
    }

    fn default_config_content() -> String {
        format!(
            r##"# calibr-sync configuration
#
# Every value can be overridden on the command line, see `calibr-sync --help`.

[fetch]
# Days are fetched from {{base_url}}/day/YYYY-MM-DD
base_url = "{base_url}"

# Each day is written to {{output_dir}}/YYYY-MM-DD.json
output_dir = "loaded"

# First day and number of consecutive days
start = "2023-03-18"
days = 1

# "parallel" runs one worker per day, "sequential" one day at a time
mode = "parallel"

# Maximum simultaneous workers in parallel mode (0 = one per day)
workers = 0

# Per-request timeout and whole-run deadline in seconds (unset = none)
# timeout_secs = 30
# deadline_secs = 3600

[retry]
# Attempts per day before giving up (0 = retry forever)
max_attempts = 0

# Delay before retrying in milliseconds (0 = retry immediately)
delay_ms = 0

# "fixed" waits delay_ms every time, "exponential" doubles it up to max_delay_ms
backoff = "fixed"
max_delay_ms = 60000

# Treat HTTP 404 as "no data for this day" and stop retrying it
stop_on_not_found = false

[headers]
User-Agent = "{user_agent}"
"##,
            base_url = DEFAULT_BASE_URL,
            user_agent = DEFAULT_USER_AGENT,
        )
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Could not determine config directory")]
    NoConfigDir,

    #[error("Failed to read/write config file at {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config file at {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("Failed to render config: {0}")]
    Serialize(toml::ser::Error),
}
