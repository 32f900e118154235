//! Daemon configuration.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use airlog_core::InitOptions;
use airlog_types::CompensationPair;

/// Daemon configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Storage settings.
    pub storage: StorageConfig,
    /// Object-store mirroring settings.
    pub upload: UploadConfig,
    /// Polling loop settings.
    pub collector: CollectorConfig,
}

impl Config {
    /// Load configuration from the default path.
    pub fn load_default() -> Result<Self, ConfigError> {
        let path = default_config_path();
        if path.exists() {
            Self::load(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Load configuration from a file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(|e| ConfigError::Read {
            path: path.as_ref().to_path_buf(),
            source: e,
        })?;
        toml::from_str(&content).map_err(|e| ConfigError::Parse {
            path: path.as_ref().to_path_buf(),
            source: e,
        })
    }

    /// Save configuration to a file.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        let content = toml::to_string_pretty(self).map_err(ConfigError::Serialize)?;

        // Create parent directories if needed
        if let Some(parent) = path.as_ref().parent() {
            std::fs::create_dir_all(parent).map_err(|e| ConfigError::Write {
                path: parent.to_path_buf(),
                source: e,
            })?;
        }

        std::fs::write(path.as_ref(), content).map_err(|e| ConfigError::Write {
            path: path.as_ref().to_path_buf(),
            source: e,
        })
    }

    /// Validate the configuration and return any errors.
    ///
    /// This checks:
    /// - Storage data directory is not empty
    /// - Cycle interval and error backoff are within bounds (1s - 1 hour)
    /// - Mode-change attempts is at least 1
    /// - Upload endpoint and bucket are set when mirroring is enabled
    ///
    /// # Example
    ///
    /// ```
    /// use airlog_daemon::Config;
    ///
    /// let config = Config::default();
    /// config.validate().expect("Default config should be valid");
    /// ```
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut errors = Vec::new();

        errors.extend(self.storage.validate());
        errors.extend(self.upload.validate());
        errors.extend(self.collector.validate());

        if errors.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::Validation(errors))
        }
    }

    /// Load and validate configuration from a file.
    ///
    /// This is a convenience method that combines `load()` and `validate()`.
    pub fn load_validated<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let config = Self::load(path)?;
        config.validate()?;
        Ok(config)
    }
}

/// Storage configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Directory the daily CSV logs are written into.
    pub data_dir: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: airlog_store::default_data_dir(),
        }
    }
}

impl StorageConfig {
    /// Validate storage configuration.
    pub fn validate(&self) -> Vec<ValidationError> {
        let mut errors = Vec::new();

        if self.data_dir.as_os_str().is_empty() {
            errors.push(ValidationError {
                field: "storage.data_dir".to_string(),
                message: "data directory cannot be empty".to_string(),
            });
        }

        errors
    }
}

/// Object-store mirroring configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct UploadConfig {
    /// Whether to mirror the daily log after every cycle.
    pub enabled: bool,
    /// Object store endpoint URL.
    pub endpoint: String,
    /// Bucket the daily logs upload into.
    pub bucket: String,
    /// Optional bearer token sent with every upload.
    pub token: Option<String>,
}

impl UploadConfig {
    /// Validate upload configuration.
    pub fn validate(&self) -> Vec<ValidationError> {
        let mut errors = Vec::new();

        if self.enabled {
            if self.endpoint.is_empty() {
                errors.push(ValidationError {
                    field: "upload.endpoint".to_string(),
                    message: "endpoint is required when upload is enabled".to_string(),
                });
            }
            if self.bucket.is_empty() {
                errors.push(ValidationError {
                    field: "upload.bucket".to_string(),
                    message: "bucket is required when upload is enabled".to_string(),
                });
            }
        }

        if let Some(token) = &self.token
            && token.is_empty()
        {
            errors.push(ValidationError {
                field: "upload.token".to_string(),
                message: "token cannot be empty string (use null/omit instead)".to_string(),
            });
        }

        errors
    }
}

/// Polling loop configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CollectorConfig {
    /// Seconds between cycles.
    pub interval_secs: u64,
    /// Seconds to back off after a cycle fails unexpectedly.
    pub error_backoff_secs: u64,
    /// Baud rate for the multi-gas UART transport.
    pub nh3_baud: u32,
    /// Total attempts for the ammonia acquisition-mode switch.
    pub nh3_mode_change_attempts: u32,
    /// Seconds between mode-change attempts.
    pub nh3_mode_change_spacing_secs: u64,
    /// Fallback compensation temperature in °C.
    pub default_temperature: f64,
    /// Fallback compensation humidity in %.
    pub default_humidity: f64,
}

/// Minimum cycle interval in seconds.
pub const MIN_INTERVAL: u64 = 1;
/// Maximum cycle interval in seconds (1 hour).
pub const MAX_INTERVAL: u64 = 3600;

impl Default for CollectorConfig {
    fn default() -> Self {
        Self {
            interval_secs: 5,
            error_backoff_secs: 5,
            nh3_baud: 9600,
            nh3_mode_change_attempts: 5,
            nh3_mode_change_spacing_secs: 1,
            default_temperature: 25.0,
            default_humidity: 50.0,
        }
    }
}

impl CollectorConfig {
    /// Validate collector configuration.
    pub fn validate(&self) -> Vec<ValidationError> {
        let mut errors = Vec::new();

        for (field, value) in [
            ("collector.interval_secs", self.interval_secs),
            ("collector.error_backoff_secs", self.error_backoff_secs),
        ] {
            if value < MIN_INTERVAL {
                errors.push(ValidationError {
                    field: field.to_string(),
                    message: format!(
                        "{} is too short (minimum {} second)",
                        value, MIN_INTERVAL
                    ),
                });
            } else if value > MAX_INTERVAL {
                errors.push(ValidationError {
                    field: field.to_string(),
                    message: format!(
                        "{} is too long (maximum {} seconds / 1 hour)",
                        value, MAX_INTERVAL
                    ),
                });
            }
        }

        if self.nh3_mode_change_attempts == 0 {
            errors.push(ValidationError {
                field: "collector.nh3_mode_change_attempts".to_string(),
                message: "at least one mode-change attempt is required".to_string(),
            });
        }

        if !(0.0..=100.0).contains(&self.default_humidity) {
            errors.push(ValidationError {
                field: "collector.default_humidity".to_string(),
                message: format!(
                    "default humidity {} is outside 0-100%",
                    self.default_humidity
                ),
            });
        }

        errors
    }

    /// The cycle interval as a duration.
    #[must_use]
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }

    /// The error backoff as a duration.
    #[must_use]
    pub fn error_backoff(&self) -> Duration {
        Duration::from_secs(self.error_backoff_secs)
    }

    /// Sensor bring-up tunables derived from this configuration.
    #[must_use]
    pub fn init_options(&self) -> InitOptions {
        InitOptions {
            multi_gas_baud: self.nh3_baud,
            mode_change_attempts: self.nh3_mode_change_attempts,
            mode_change_spacing: Duration::from_secs(self.nh3_mode_change_spacing_secs),
            ..InitOptions::default()
        }
    }

    /// Fallback compensation inputs derived from this configuration.
    #[must_use]
    pub fn compensation_defaults(&self) -> CompensationPair {
        CompensationPair {
            temperature: self.default_temperature,
            humidity: self.default_humidity,
        }
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
    #[error("Failed to serialize config: {0}")]
    Serialize(toml::ser::Error),
    #[error("Failed to write config file {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Configuration validation failed:\n{}", format_validation_errors(.0))]
    Validation(Vec<ValidationError>),
}

/// A single validation error with context.
#[derive(Debug, Clone)]
pub struct ValidationError {
    /// The field path (e.g., `collector.interval_secs`).
    pub field: String,
    /// Description of the validation failure.
    pub message: String,
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

fn format_validation_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(|e| format!("  - {}", e))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Default configuration file path.
pub fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("airlog")
        .join("daemon.toml")
}
