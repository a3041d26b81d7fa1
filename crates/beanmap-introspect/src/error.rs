//! Introspection errors

use std::path::PathBuf;

use thiserror::Error;

/// Result type for introspection operations
pub type IntrospectResult<T> = Result<T, IntrospectError>;

/// Errors that can occur while introspecting members
///
/// Missing metadata is never an error: lookups return `None`.
#[derive(Debug, Error)]
pub enum IntrospectError {
    /// The host policy refused to relax visibility on a method
    #[error("Access denied for {method}: {reason}")]
    AccessDenied {
        /// Full name of the method (`Type#name(n params)`)
        method: String,
        /// Why the relaxation was refused
        reason: String,
    },

    /// A permission value could not be parsed
    #[error("Invalid permission value: {value}")]
    InvalidPermission {
        /// The offending value
        value: String,
    },

    /// Malformed configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// Configuration file could not be read
    #[error("Failed to read {}: {source}", path.display())]
    Io {
        /// File that was being read
        path: PathBuf,
        /// Underlying I/O error
        source: std::io::Error,
    },
}

impl From<toml::de::Error> for IntrospectError {
    fn from(e: toml::de::Error) -> Self {
        IntrospectError::Config(e.to_string())
    }
}
