//! Error handling for dslog
//!
//! Errors are only ever produced while building or forking a logger. Writing
//! a record never fails from the caller's point of view.

use std::io;

/// Result alias for logger construction and builder calls
pub type LogResult<T> = Result<T, LogError>;

/// Error type for logger operations
#[derive(Debug, thiserror::Error)]
pub enum LogError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// A sink could not be created or rotated
    #[error("{context}: {source}")]
    Io {
        /// What was being attempted
        context: String,
        /// Underlying failure
        #[source]
        source: io::Error,
    },

    /// The API was called in a way that indicates a programming mistake
    #[error("Usage error: {0}")]
    Usage(String),
}

impl LogError {
    /// Create a configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Create a usage error
    pub fn usage(message: impl Into<String>) -> Self {
        Self::Usage(message.into())
    }

    /// Wrap an I/O error with a description of the failed operation
    pub fn io(context: impl Into<String>, source: io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }

    /// `true` for errors caused by the caller rather than the environment
    #[must_use]
    pub fn is_usage(&self) -> bool {
        matches!(self, Self::Usage(_))
    }
}
