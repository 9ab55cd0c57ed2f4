//! Error types for the symshrink-rs library.
//!
//! Renaming itself never fails: allocation always succeeds and lookups that
//! miss simply leave an occurrence unrewritten. The errors below therefore
//! cover the edges of a run, namely configuration, the persisted mapping
//! file, and applying edits to source text.

use std::io;

use thiserror::Error;

/// Main result type for symshrink operations.
pub type Result<T> = std::result::Result<T, SymshrinkError>;

/// Error type for all symshrink operations.
#[derive(Error, Debug)]
pub enum SymshrinkError {
    /// I/O related errors (mapping files, source files, config files)
    #[error("I/O error: {message}")]
    Io {
        /// Human-readable error message
        message: String,
        /// Underlying I/O error
        #[source]
        source: io::Error,
    },

    /// Configuration errors
    #[error("Configuration error: {message}")]
    Config {
        /// Error description
        message: String,
        /// Configuration field that caused the error
        field: Option<String>,
    },

    /// Serialization/deserialization errors
    #[error("Serialization error: {message}")]
    Serialization {
        /// Error description
        message: String,
        /// Data type being serialized
        data_type: Option<String>,
        /// Underlying serialization error
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Validation errors for input data
    #[error("Validation error: {message}")]
    Validation {
        /// Error description
        message: String,
        /// Field or input that failed validation
        field: Option<String>,
    },

    /// Edits that cannot be applied to a source buffer
    #[error("Rewrite error in {file}: {message}")]
    Rewrite {
        /// Unit whose edits were rejected
        file: String,
        /// Error description
        message: String,
    },

    /// Generic internal errors
    #[error("Internal error: {message}")]
    Internal {
        /// Error description
        message: String,
        /// Additional context
        context: Option<String>,
    },
}

impl SymshrinkError {
    /// Create a new I/O error with context
    pub fn io(message: impl Into<String>, source: io::Error) -> Self {
        Self::Io {
            message: message.into(),
            source,
        }
    }

    /// Create a new configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
            field: None,
        }
    }

    /// Create a new configuration error with field context
    pub fn config_field(message: impl Into<String>, field: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
            field: Some(field.into()),
        }
    }

    /// Create a new validation error
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
            field: None,
        }
    }

    /// Create a new rewrite error for one unit
    pub fn rewrite(file: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Rewrite {
            file: file.into(),
            message: message.into(),
        }
    }

    /// Create a new internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
            context: None,
        }
    }

    /// Add context to an existing error
    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        match &mut self {
            Self::Internal { context: ctx, .. } => {
                *ctx = Some(context.into());
            }
            Self::Serialization { data_type, .. } if data_type.is_none() => {
                *data_type = Some(context.into());
            }
            _ => {}
        }
        self
    }
}

impl From<io::Error> for SymshrinkError {
    fn from(err: io::Error) -> Self {
        Self::io("I/O operation failed", err)
    }
}

impl From<serde_json::Error> for SymshrinkError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization {
            message: format!("JSON serialization failed: {err}"),
            data_type: Some("JSON".to_string()),
            source: Some(Box::new(err)),
        }
    }
}

impl From<serde_yaml::Error> for SymshrinkError {
    fn from(err: serde_yaml::Error) -> Self {
        Self::Serialization {
            message: format!("YAML serialization failed: {err}"),
            data_type: Some("YAML".to_string()),
            source: Some(Box::new(err)),
        }
    }
}

/// Result extension trait for attaching context while converting errors
pub trait SymshrinkResultExt<T> {
    /// Convert a JSON error, naming what was being (de)serialized
    fn map_json_err(self, what: &str) -> Result<T>;

    /// Convert an I/O error, naming the operation that failed
    fn map_io_err(self, what: impl FnOnce() -> String) -> Result<T>;
}

impl<T> SymshrinkResultExt<T> for std::result::Result<T, serde_json::Error> {
    fn map_json_err(self, what: &str) -> Result<T> {
        self.map_err(|e| SymshrinkError::Serialization {
            message: format!("Failed to process {what}: {e}"),
            data_type: Some("JSON".to_string()),
            source: Some(Box::new(e)),
        })
    }

    fn map_io_err(self, what: impl FnOnce() -> String) -> Result<T> {
        self.map_err(|e| SymshrinkError::io(what(), e.into()))
    }
}

impl<T> SymshrinkResultExt<T> for std::result::Result<T, io::Error> {
    fn map_json_err(self, what: &str) -> Result<T> {
        self.map_err(|e| SymshrinkError::io(format!("Failed to read {what}"), e))
    }

    fn map_io_err(self, what: impl FnOnce() -> String) -> Result<T> {
        self.map_err(|e| SymshrinkError::io(what(), e))
    }
}
