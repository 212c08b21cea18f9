//! Error types for the plateforme-ia library.
//!
//! Every failure in this crate is local to one operation: validation errors are
//! returned synchronously, simulated failures land on the affected record. None
//! of them is fatal for the session that produced it.

use thiserror::Error;

/// Errors that can occur in the plateforme-ia application.
#[derive(Error, Debug)]
pub enum PlatformError {
    /// A required field is missing or an input is malformed
    #[error("Validation error: {0}")]
    Validation(String),

    /// The declared file type is outside the accepted set
    #[error("Unsupported file type for {name}: {mime_type}")]
    UnsupportedFileType {
        /// File name as provided by the user
        name: String,
        /// Declared MIME type
        mime_type: String,
    },

    /// The file exceeds the configured size ceiling
    #[error("File {name} is too large: {size} bytes (limit {limit} bytes)")]
    FileTooLarge {
        /// File name as provided by the user
        name: String,
        /// Declared size in bytes
        size: u64,
        /// Configured ceiling in bytes
        limit: u64,
    },

    /// The file could not be read from disk
    #[error("Cannot read {name}: {source}")]
    Unreadable {
        /// File name or path as given
        name: String,
        /// Underlying I/O failure
        #[source]
        source: std::io::Error,
    },

    /// A console line did not match any command
    #[error("{0}")]
    Usage(#[from] clap::Error),

    /// The operation is not valid in the current state
    #[error("Invalid state: {0}")]
    InvalidState(String),

    /// An id did not match any record
    #[error("Not found: {0}")]
    NotFound(String),

    /// Simulated text extraction failed
    #[error("Extraction failed: {0}")]
    Extraction(String),

    /// Configuration could not be loaded
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    /// File I/O errors
    #[error("File I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// CSV export errors
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// YAML serialization errors
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// General error with context
    #[error("{0}")]
    Other(String),
}

impl PlatformError {
    /// Whether this error comes from user input rather than a simulated operation.
    #[must_use]
    pub const fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::Validation(_)
                | Self::UnsupportedFileType { .. }
                | Self::FileTooLarge { .. }
                | Self::Unreadable { .. }
                | Self::Usage(_)
        )
    }

    /// Name of the file an upload error is about, if any
    #[must_use]
    pub fn file_name(&self) -> Option<&str> {
        match self {
            Self::UnsupportedFileType { name, .. }
            | Self::FileTooLarge { name, .. }
            | Self::Unreadable { name, .. } => Some(name),
            _ => None,
        }
    }
}

/// Convenience type alias for Result with `PlatformError`
pub type Result<T> = std::result::Result<T, PlatformError>;

impl From<anyhow::Error> for PlatformError {
    fn from(err: anyhow::Error) -> Self {
        PlatformError::Other(err.to_string())
    }
}
