//! Error types for Razor front-end operations
//!
//! Malformed template input never surfaces here: it becomes a
//! [`RazorDiagnostic`](crate::diagnostics::RazorDiagnostic) attached to the tree.
//! `RazorError` covers I/O, configuration, descriptor loading, API
//! preconditions and broken internal invariants.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for Razor front-end operations
#[derive(Debug, Error)]
pub enum RazorError {
    /// Configuration loading or validation errors
    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    /// File system I/O errors
    #[error("IO error for path '{path}': {source}")]
    IoError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Tag helper descriptor catalog or selector could not be read
    #[error("Descriptor error: {message}")]
    DescriptorError { message: String },

    /// A public entry point was called with an argument it cannot accept
    #[error("Invalid argument '{argument}': {message}")]
    InvalidArgument { argument: String, message: String },

    /// Internal invariant violation
    #[error("Internal error: {message}")]
    InternalError { message: String },
}

/// Error kind enumeration for categorizing errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Config,
    Io,
    Descriptor,
    InvalidArgument,
    Internal,
}

impl RazorError {
    /// Get the error kind for this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            RazorError::ConfigError { .. } => ErrorKind::Config,
            RazorError::IoError { .. } => ErrorKind::Io,
            RazorError::DescriptorError { .. } => ErrorKind::Descriptor,
            RazorError::InvalidArgument { .. } => ErrorKind::InvalidArgument,
            RazorError::InternalError { .. } => ErrorKind::Internal,
        }
    }

    /// Check if this error is recoverable (processing of other documents can continue)
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self.kind(),
            ErrorKind::Config | ErrorKind::Io | ErrorKind::Descriptor
        )
    }

    /// Create a configuration error
    pub fn config_error(message: impl Into<String>) -> Self {
        Self::ConfigError {
            message: message.into(),
        }
    }

    /// Create an IO error with path context
    pub fn io_error(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::IoError {
            path: path.into(),
            source,
        }
    }

    /// Create a descriptor error
    pub fn descriptor_error(message: impl Into<String>) -> Self {
        Self::DescriptorError {
            message: message.into(),
        }
    }

    /// Create an argument-contract error
    pub fn invalid_argument(argument: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            argument: argument.into(),
            message: message.into(),
        }
    }

    /// Create an internal error
    pub fn internal_error(message: impl Into<String>) -> Self {
        Self::InternalError {
            message: message.into(),
        }
    }
}

/// Convert from std::io::Error
impl From<std::io::Error> for RazorError {
    fn from(err: std::io::Error) -> Self {
        Self::IoError {
            path: PathBuf::new(),
            source: err,
        }
    }
}

impl From<serde_json::Error> for RazorError {
    fn from(err: serde_json::Error) -> Self {
        Self::DescriptorError {
            message: err.to_string(),
        }
    }
}
