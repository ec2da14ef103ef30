//! Error types for learnit-core.
//!
//! Malformed configuration inside a learndata file is never an error: it is
//! reported through [`crate::flags::FlagDiagnostic`] and logged. The variants
//! here are the conditions that end a session.

use std::path::PathBuf;

use thiserror::Error;

/// Result type alias using [`LearnError`].
pub type Result<T> = std::result::Result<T, LearnError>;

/// Errors that terminate loading or drilling a learndata file.
#[derive(Debug, Error)]
pub enum LearnError {
    /// The learndata file (or a file about to be rewritten) does not exist.
    #[error("learndata file not found: {}", .0.display())]
    NotFound(PathBuf),

    /// Reading or writing a file failed.
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The preset store exists but could not be read as JSON.
    #[error("invalid preset store {}: {message}", path.display())]
    Preset { path: PathBuf, message: String },

    /// Nothing is left to drill once filtering has been applied.
    #[error("no items to ask in {file}")]
    NoItems { file: String },

    /// Reading from or writing to the terminal failed.
    #[error("terminal I/O failed: {0}")]
    Terminal(#[source] std::io::Error),

    /// The user interrupted the session.
    #[error("session cancelled by user")]
    Cancelled,
}

impl LearnError {
    /// Wrap an I/O error, mapping `NotFound` to [`LearnError::NotFound`].
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        let path = path.into();
        if source.kind() == std::io::ErrorKind::NotFound {
            LearnError::NotFound(path)
        } else {
            LearnError::Io { path, source }
        }
    }

    /// Returns `true` if this error is a user cancellation.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, LearnError::Cancelled)
    }
}
