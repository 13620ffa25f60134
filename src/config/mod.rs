//! Configuration with YAML schema and validation.
//!
//! Loading runs three gates in order: serde parsing with unknown fields
//! rejected, `validator` field constraints, then semantic checks that span
//! fields.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::error::{PiError, PiResult};
use crate::ledger::store::{DEFAULT_COMPRESSION_LEVEL, DEFAULT_LEDGER_PATH};
use crate::sampler::{MAX_POINTS, MIN_POINTS};

/// Top-level application configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct AppConfig {
    /// Schema version for forward compatibility.
    #[validate(length(min = 1))]
    #[serde(default = "default_schema_version")]
    pub schema_version: String,

    /// Sampling defaults.
    #[validate(nested)]
    #[serde(default)]
    pub sampling: SamplingConfig,

    /// Ledger storage settings.
    #[validate(nested)]
    #[serde(default)]
    pub ledger: LedgerConfig,

    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

fn default_schema_version() -> String {
    "1.0".to_string()
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            schema_version: default_schema_version(),
            sampling: SamplingConfig::default(),
            ledger: LedgerConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl AppConfig {
    /// Load configuration from a YAML file.
    ///
    /// # Errors
    ///
    /// Returns error if the file cannot be read, parsing fails, or
    /// validation fails.
    pub fn load<P: AsRef<Path>>(path: P) -> PiResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Parse configuration from a YAML string.
    ///
    /// # Errors
    ///
    /// Returns error if parsing or validation fails.
    pub fn from_yaml(yaml: &str) -> PiResult<Self> {
        let config: Self = serde_yaml::from_str(yaml)?;
        config.validate()?;
        config.validate_semantic()?;
        Ok(config)
    }

    /// Serialize to YAML.
    ///
    /// # Errors
    ///
    /// Returns error if serialization fails.
    pub fn to_yaml(&self) -> PiResult<String> {
        Ok(serde_yaml::to_string(self)?)
    }

    /// Create a builder for configuration.
    #[must_use]
    pub fn builder() -> AppConfigBuilder {
        AppConfigBuilder::default()
    }

    fn validate_semantic(&self) -> PiResult<()> {
        if self.schema_version != "1.0" {
            return Err(PiError::config(format!(
                "unsupported schema_version '{}', expected '1.0'",
                self.schema_version
            )));
        }

        if self.ledger.path.as_os_str().is_empty() {
            return Err(PiError::config("ledger.path must not be empty"));
        }

        if self.logging.filter.trim().is_empty() {
            return Err(PiError::config("logging.filter must not be empty"));
        }

        Ok(())
    }
}

/// Configuration builder for programmatic construction.
#[derive(Debug, Default)]
pub struct AppConfigBuilder {
    seed: Option<u64>,
    default_points: Option<u64>,
    ledger_path: Option<PathBuf>,
    max_records: Option<usize>,
    compression_level: Option<i32>,
}

impl AppConfigBuilder {
    /// Set the random seed.
    #[must_use]
    pub const fn seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Set the point count used when a run does not specify one.
    #[must_use]
    pub const fn default_points(mut self, n: u64) -> Self {
        self.default_points = Some(n);
        self
    }

    /// Set the ledger file path.
    #[must_use]
    pub fn ledger_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.ledger_path = Some(path.into());
        self
    }

    /// Cap the number of ledger records kept.
    #[must_use]
    pub const fn max_records(mut self, max: usize) -> Self {
        self.max_records = Some(max);
        self
    }

    /// Set the zstd compression level for the ledger.
    #[must_use]
    pub const fn compression_level(mut self, level: i32) -> Self {
        self.compression_level = Some(level);
        self
    }

    /// Build and validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns error if a supplied value violates a constraint.
    pub fn build(self) -> PiResult<AppConfig> {
        let mut config = AppConfig::default();

        if let Some(seed) = self.seed {
            config.sampling.seed = Some(seed);
        }
        if let Some(n) = self.default_points {
            config.sampling.default_points = n;
        }
        if let Some(path) = self.ledger_path {
            config.ledger.path = path;
        }
        if let Some(max) = self.max_records {
            config.ledger.max_records = Some(max);
        }
        if let Some(level) = self.compression_level {
            config.ledger.compression_level = level;
        }

        config.validate()?;
        config.validate_semantic()?;
        Ok(config)
    }
}

/// Sampling defaults.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct SamplingConfig {
    /// Point count used when a run does not specify one.
    #[validate(range(min = 1, max = 10000))]
    #[serde(default = "default_points")]
    pub default_points: u64,

    /// Fixed seed; `None` draws one from OS entropy per run.
    #[serde(default)]
    pub seed: Option<u64>,
}

const fn default_points() -> u64 {
    1000
}

impl Default for SamplingConfig {
    fn default() -> Self {
        Self {
            default_points: default_points(),
            seed: None,
        }
    }
}

// Keep the validator range literal in sync with the sampler bounds.
const _: () = assert!(MIN_POINTS == 1 && MAX_POINTS == 10_000);

/// Ledger storage settings.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct LedgerConfig {
    /// Ledger file, relative to the working directory unless absolute.
    #[serde(default = "default_ledger_path")]
    pub path: PathBuf,

    /// Retention cap; `None` keeps every record.
    #[validate(range(min = 1))]
    #[serde(default)]
    pub max_records: Option<usize>,

    /// zstd compression level.
    #[validate(range(min = 1, max = 22))]
    #[serde(default = "default_compression_level")]
    pub compression_level: i32,
}

fn default_ledger_path() -> PathBuf {
    PathBuf::from(DEFAULT_LEDGER_PATH)
}

const fn default_compression_level() -> i32 {
    DEFAULT_COMPRESSION_LEVEL
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            path: default_ledger_path(),
            max_records: None,
            compression_level: default_compression_level(),
        }
    }
}

/// Logging settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoggingConfig {
    /// `tracing_subscriber::EnvFilter` directive; `RUST_LOG` overrides it.
    #[serde(default = "default_filter")]
    pub filter: String,
}

fn default_filter() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: default_filter(),
        }
    }
}
