//! Error types for montepi.
//!
//! Every fallible operation returns `Result<T, PiError>`; nothing in the
//! estimation cycle panics. A failed cycle leaves the persisted ledger as it
//! was before the cycle started.

use std::path::PathBuf;

use thiserror::Error;

/// Result type alias for montepi operations.
pub type PiResult<T> = Result<T, PiError>;

/// Unified error type for all montepi operations.
#[derive(Debug, Error)]
pub enum PiError {
    // ===== Input Errors =====
    /// A caller-supplied argument is outside its allowed range.
    #[error("Invalid argument '{name}' = {value}: {reason}")]
    InvalidArgument {
        /// Name of the offending argument.
        name: &'static str,
        /// Rendered value that was rejected.
        value: String,
        /// Why the value was rejected.
        reason: String,
    },

    // ===== Storage Errors =====
    /// The persisted ledger exists but cannot be decoded.
    #[error("Ledger storage corrupt at {}: {reason}", path.display())]
    StorageCorrupt {
        /// Location of the corrupt ledger.
        path: PathBuf,
        /// What was wrong with it.
        reason: String,
    },

    /// A read-only command found no ledger at the given location.
    #[error("No ledger at {}; run an estimate first", path.display())]
    LedgerMissing {
        /// Location that was checked.
        path: PathBuf,
    },

    // ===== Configuration Errors =====
    /// Invalid configuration parameter.
    #[error("Configuration error: {message}")]
    Config {
        /// Description of the configuration error.
        message: String,
    },

    /// YAML parsing error.
    #[error("YAML parsing error: {0}")]
    YamlParse(#[from] serde_yaml::Error),

    /// Validation error.
    #[error("Validation error: {0}")]
    Validation(#[from] validator::ValidationErrors),

    // ===== I/O Errors =====
    /// File I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error.
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl PiError {
    /// Create an invalid-argument error.
    #[must_use]
    pub fn invalid_argument(
        name: &'static str,
        value: impl ToString,
        reason: impl Into<String>,
    ) -> Self {
        Self::InvalidArgument {
            name,
            value: value.to_string(),
            reason: reason.into(),
        }
    }

    /// Create a storage-corruption error for the ledger at `path`.
    #[must_use]
    pub fn storage_corrupt(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::StorageCorrupt {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Create a configuration error with a message.
    #[must_use]
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a serialization error.
    #[must_use]
    pub fn serialization(message: impl Into<String>) -> Self {
        Self::Serialization(message.into())
    }

    /// Check if this error came from the ledger storage layer.
    #[must_use]
    pub const fn is_storage_error(&self) -> bool {
        matches!(
            self,
            Self::StorageCorrupt { .. } | Self::LedgerMissing { .. } | Self::Io(_)
        )
    }
}
