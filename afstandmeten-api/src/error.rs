//! Error types for the afstandmeten.nl client.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur when talking to afstandmeten.nl.
#[derive(Debug, Error)]
pub enum AfstandmetenError {
    /// HTTP transport error (connection refused, timeout, TLS failure,
    /// non-2xx status, etc.).
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// A caller-supplied value was rejected before anything was sent:
    /// an unknown folder/sort/match name, an empty route selection, or a
    /// search without any criterion.
    #[error("invalid input: {0}")]
    Validation(String),

    /// The site rejected the supplied credentials.
    ///
    /// `message` is the error text the login page showed.
    #[error("login rejected: {message}")]
    Authentication {
        /// Error text scraped from the login response.
        message: String,
    },

    /// An operation that needs a logged-in session was attempted without one.
    #[error("you must log in to {operation}")]
    Authorization {
        /// What was attempted, e.g. `"add favorites"`.
        operation: String,
    },

    /// The download destination already exists.
    #[error("file already exists: {}", path.display())]
    Conflict {
        /// The path that would have been overwritten.
        path: PathBuf,
    },

    /// The HTML returned by the site did not have the expected shape.
    #[error("unexpected page layout: {reason}")]
    Parse {
        /// What was missing or malformed.
        reason: String,
    },

    /// File I/O error (writing a downloaded track).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl AfstandmetenError {
    pub(crate) fn parse(reason: impl Into<String>) -> Self {
        Self::Parse {
            reason: reason.into(),
        }
    }

    pub(crate) fn authorization(operation: impl Into<String>) -> Self {
        Self::Authorization {
            operation: operation.into(),
        }
    }
}

/// Convenience alias for `Result<T, AfstandmetenError>`.
pub type Result<T> = std::result::Result<T, AfstandmetenError>;
