//! Configuration management for gpstrack.
//!
//! This module provides configuration loading and validation using figment,
//! supporting TOML config files, environment variables, and defaults.

use std::path::PathBuf;

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::location::Coordinate;

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "config.toml";

/// Default data directory name.
const DATA_DIR_NAME: &str = "gpstrack";

/// Directory holding one JSON document per project.
const PROJECTS_DIR_NAME: &str = "projects";

/// Directory holding route log sessions.
const ROUTES_DIR_NAME: &str = "routes";

/// Application configuration.
///
/// Configuration is loaded from (in order of precedence, highest first):
/// 1. Environment variables (prefixed with `GPSTRACK_`, nested keys split on `__`)
/// 2. TOML config file at `~/.config/gpstrack/config.toml`
/// 3. Default values
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Storage configuration.
    pub storage: StorageConfig,
    /// Route logger configuration.
    pub logger: LoggerConfig,
    /// Log viewer configuration.
    pub viewer: ViewerConfig,
}

/// Storage-related configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Root directory for project documents and route logs.
    /// Defaults to `~/.local/share/gpstrack`
    pub data_dir: Option<PathBuf>,
}

/// Route logger configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggerConfig {
    /// Latitude the simulated position jitters around.
    pub base_latitude: f64,
    /// Longitude the simulated position jitters around.
    pub base_longitude: f64,
    /// Upper bound (exclusive) of the per-axis jitter, in degrees.
    pub jitter_degrees: f64,
    /// Maximum number of pending metadata submissions.
    /// Set to 0 for unlimited.
    pub max_pending: usize,
}

/// Log viewer configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewerConfig {
    /// Number of records shown before the output is truncated.
    pub max_lines: usize,
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self {
            // Connaught Place, New Delhi
            base_latitude: 28.6448,
            base_longitude: 77.2167,
            jitter_degrees: 0.001,
            max_pending: 0,
        }
    }
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self { max_lines: 50 }
    }
}

impl Config {
    /// Load configuration from all sources.
    ///
    /// Configuration is loaded in this order (later sources override earlier):
    /// 1. Default values
    /// 2. TOML config file (if exists)
    /// 3. Environment variables (prefixed with `GPSTRACK_`)
    ///
    /// # Errors
    ///
    /// Returns an error if configuration loading or parsing fails.
    pub fn load() -> Result<Self> {
        Self::load_from(None)
    }

    /// Load configuration with an optional custom config path.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration loading or parsing fails.
    pub fn load_from(config_path: Option<PathBuf>) -> Result<Self> {
        let config_file = config_path.unwrap_or_else(Self::default_config_path);

        let figment = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Toml::file(&config_file))
            .merge(Env::prefixed("GPSTRACK_").split("__"));

        let config: Config = figment.extract()?;
        config.validate()?;
        Ok(config)
    }

    /// Get the default configuration file path.
    #[must_use]
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from(".config"))
            .join(DATA_DIR_NAME)
            .join(CONFIG_FILE_NAME)
    }

    /// Get the default data directory path.
    #[must_use]
    pub fn default_data_dir() -> PathBuf {
        dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from(".local/share"))
            .join(DATA_DIR_NAME)
    }

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if any configuration values are invalid.
    pub fn validate(&self) -> Result<()> {
        let logger = &self.logger;

        if !(-90.0..=90.0).contains(&logger.base_latitude) {
            return Err(Error::ConfigValidation {
                message: format!(
                    "base_latitude ({}) must be between -90 and 90",
                    logger.base_latitude
                ),
            });
        }

        if !(-180.0..=180.0).contains(&logger.base_longitude) {
            return Err(Error::ConfigValidation {
                message: format!(
                    "base_longitude ({}) must be between -180 and 180",
                    logger.base_longitude
                ),
            });
        }

        if !logger.jitter_degrees.is_finite() || logger.jitter_degrees < 0.0 {
            return Err(Error::ConfigValidation {
                message: format!(
                    "jitter_degrees ({}) must be a non-negative number",
                    logger.jitter_degrees
                ),
            });
        }

        if self.viewer.max_lines == 0 {
            return Err(Error::ConfigValidation {
                message: "max_lines must be greater than 0".to_string(),
            });
        }

        Ok(())
    }

    /// Get the data directory, resolving defaults if not set.
    #[must_use]
    pub fn data_dir(&self) -> PathBuf {
        self.storage
            .data_dir
            .clone()
            .unwrap_or_else(Self::default_data_dir)
    }

    /// Get the directory holding project documents.
    #[must_use]
    pub fn projects_dir(&self) -> PathBuf {
        self.data_dir().join(PROJECTS_DIR_NAME)
    }

    /// Get the directory holding route log sessions.
    #[must_use]
    pub fn routes_dir(&self) -> PathBuf {
        self.data_dir().join(ROUTES_DIR_NAME)
    }

    /// Get the coordinate the simulated position source jitters around.
    #[must_use]
    pub fn base_coordinate(&self) -> Coordinate {
        Coordinate::new(self.logger.base_latitude, self.logger.base_longitude)
    }

    /// Get the pending queue capacity, `None` meaning unbounded.
    #[must_use]
    pub fn pending_capacity(&self) -> Option<usize> {
        match self.logger.max_pending {
            0 => None,
            n => Some(n),
        }
    }
}
