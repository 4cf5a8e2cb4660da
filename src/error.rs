//! Error types for pbxdesc

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for pbxdesc operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for pbxdesc
#[derive(Error, Debug)]
pub enum Error {
    // -------------------------------------------------------------------------
    // I/O Errors
    // -------------------------------------------------------------------------
    #[error("Failed to read file '{path}': {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to read directory '{path}': {source}")]
    DirectoryRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // -------------------------------------------------------------------------
    // Serialization Errors
    // -------------------------------------------------------------------------
    #[error("Failed to serialize data: {0}")]
    Serialize(String),

    #[error("Failed to parse descriptor: {0}")]
    Parse(String),

    #[error("Unsupported descriptor format: {0}")]
    UnsupportedFormat(String),

    // -------------------------------------------------------------------------
    // Descriptor Errors
    // -------------------------------------------------------------------------
    #[error("Malformed descriptor at '{field}': {reason}")]
    MalformedDescriptor { field: String, reason: String },

    #[error("Unsupported dialect '{dialect}': {reason}")]
    UnsupportedDialect { dialect: String, reason: String },

    #[error("Invalid setting value for {key}: {reason}")]
    InvalidSettingValue { key: String, reason: String },

    // -------------------------------------------------------------------------
    // Registry Errors
    // -------------------------------------------------------------------------
    #[error("Module not found: {0}")]
    ModuleNotFound(String),

    #[error("Module '{name}' ({uuid}) is registered more than once")]
    DuplicateModule { name: String, uuid: String },

    #[error("Circular table dependency: {0}")]
    CircularDependency(String),
}

impl Error {
    /// Shorthand for a [`Error::MalformedDescriptor`]
    pub(crate) fn malformed(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Error::MalformedDescriptor {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// Check if this is a "not found" type error
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::ModuleNotFound(_))
            || matches!(self, Error::FileRead { source, .. } | Error::DirectoryRead { source, .. }
                if source.kind() == std::io::ErrorKind::NotFound)
    }

    /// Check if this error comes from descriptor content rather than I/O
    #[must_use]
    pub fn is_schema_error(&self) -> bool {
        matches!(
            self,
            Error::MalformedDescriptor { .. }
                | Error::UnsupportedDialect { .. }
                | Error::InvalidSettingValue { .. }
                | Error::CircularDependency(_)
        )
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Serialize(e.to_string())
    }
}
