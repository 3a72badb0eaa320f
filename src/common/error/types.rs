//! Unified error types for the pbix reader.
use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

/// Main error type for container operations.
#[derive(Error, Debug)]
pub enum Error {
    /// IO error outside of archive extraction (staging setup, cleanup)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The input path does not carry an accepted container extension.
    ///
    /// Raised before any filesystem side effect.
    #[error("Invalid input: {} is not a .{} container", .path.display(), .expected)]
    InvalidInput { path: PathBuf, expected: String },

    /// The archive could not be staged (missing file, corrupt archive, I/O)
    #[error("Could not extract container content: {0}")]
    ExtractionFailed(String),

    /// Extraction did not finish before the configured deadline
    #[error("Extraction exceeded the deadline of {0:?}")]
    DeadlineExceeded(Duration),

    /// The caller cancelled the operation
    #[error("Operation cancelled")]
    Cancelled,

    /// A background task panicked or was aborted
    #[error("Background task failed: {0}")]
    TaskFailed(String),
}

impl Error {
    /// Whether the error was caused by the caller's input rather than the container.
    #[inline]
    pub fn is_invalid_input(&self) -> bool {
        matches!(self, Error::InvalidInput { .. })
    }
}

/// Result type for container operations.
pub type Result<T> = std::result::Result<T, Error>;
