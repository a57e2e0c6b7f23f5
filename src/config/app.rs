//! Application configuration: JSON file, environment overrides, defaults.
//!
//! Lookup order for each value is environment, then file, then default.
//! Without an explicit path the loader tries `./.worker-pool.json` and falls
//! back to defaults when it is absent.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::pool::{WorkerPoolConfig, DEFAULT_INITIAL_WORKERS, DEFAULT_THREAD_NAME_PREFIX};

/// Config file read when no path is given.
pub const DEFAULT_CONFIG_FILE: &str = ".worker-pool.json";

/// Overrides `workers.initial`.
pub const ENV_WORKERS_INITIAL: &str = "WORKER_POOL_WORKERS_INITIAL";

/// Overrides `log.level`.
pub const ENV_LOG_LEVEL: &str = "WORKER_POOL_LOG_LEVEL";

/// Errors raised while loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The config file could not be read.
    #[error("failed to read config file {}: {source}", .path.display())]
    Io {
        /// File that failed.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },
    /// The config file is not valid JSON for this schema.
    #[error("parse error: {0}")]
    Parse(#[from] serde_json::Error),
    /// An environment override could not be parsed.
    #[error("invalid value for {var}: {value:?}")]
    Env {
        /// Variable name.
        var: &'static str,
        /// Raw value.
        value: String,
    },
    /// A value is out of range.
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// `workers` section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkersSection {
    /// Number of workers started with the pool.
    pub initial: i64,
    /// Worker thread name prefix.
    pub thread_name_prefix: String,
}

impl Default for WorkersSection {
    fn default() -> Self {
        Self {
            initial: DEFAULT_INITIAL_WORKERS,
            thread_name_prefix: DEFAULT_THREAD_NAME_PREFIX.to_string(),
        }
    }
}

/// `log` section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogSection {
    /// Default tracing filter when `RUST_LOG` is unset.
    pub level: String,
    /// Echo each processed job to stdout.
    pub echo_jobs: bool,
}

impl Default for LogSection {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            echo_jobs: true,
        }
    }
}

/// Where the loaded configuration came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    /// Read from this file.
    File(PathBuf),
    /// No file found; defaults (plus environment) were used.
    Defaults,
}

/// Root application configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Worker settings.
    pub workers: WorkersSection,
    /// Logging settings.
    pub log: LogSection,
}

impl AppConfig {
    /// Parse configuration from a JSON string and validate.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Parse` or `ConfigError::Invalid`.
    pub fn from_json_str(input: &str) -> Result<Self, ConfigError> {
        let cfg: Self = serde_json::from_str(input)?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Read and parse a JSON config file.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Io` if the file cannot be read, otherwise as
    /// [`AppConfig::from_json_str`].
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&raw)
    }

    /// Load configuration from `path` (or the default file) and the process
    /// environment.
    ///
    /// An explicit path must exist; the default file is optional.
    ///
    /// # Errors
    ///
    /// Returns any error from reading, parsing, overriding or validating.
    pub fn load(path: Option<&Path>) -> Result<(Self, ConfigSource), ConfigError> {
        Self::load_with(path, |var| std::env::var(var).ok())
    }

    /// Same as [`AppConfig::load`] with a custom environment lookup.
    ///
    /// # Errors
    ///
    /// Returns any error from reading, parsing, overriding or validating.
    pub fn load_with<F>(path: Option<&Path>, env: F) -> Result<(Self, ConfigSource), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let (mut cfg, source) = match path {
            Some(path) => (Self::from_file(path)?, ConfigSource::File(path.to_path_buf())),
            None => {
                let default = Path::new(DEFAULT_CONFIG_FILE);
                if default.is_file() {
                    (Self::from_file(default)?, ConfigSource::File(default.to_path_buf()))
                } else {
                    (Self::default(), ConfigSource::Defaults)
                }
            }
        };

        cfg.apply_env_overrides(env)?;
        cfg.validate()?;
        Ok((cfg, source))
    }

    /// Apply `WORKER_POOL_*` overrides from `env`.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Env` for values that do not parse.
    pub fn apply_env_overrides<F>(&mut self, env: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(raw) = env(ENV_WORKERS_INITIAL) {
            self.workers.initial = raw.trim().parse().map_err(|_| ConfigError::Env {
                var: ENV_WORKERS_INITIAL,
                value: raw.clone(),
            })?;
        }
        if let Some(level) = env(ENV_LOG_LEVEL) {
            self.log.level = level;
        }
        Ok(())
    }

    /// Validate configuration values.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Invalid` describing the first bad value.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.pool_config().validate().map_err(ConfigError::Invalid)?;
        if self.log.level.trim().is_empty() {
            return Err(ConfigError::Invalid("log.level must not be empty".into()));
        }
        Ok(())
    }

    /// Pool settings derived from this configuration.
    #[must_use]
    pub fn pool_config(&self) -> WorkerPoolConfig {
        WorkerPoolConfig::new()
            .with_initial_workers(self.workers.initial)
            .with_thread_name_prefix(self.workers.thread_name_prefix.clone())
    }
}
