//! Error types for airlog-store.

use std::path::PathBuf;

use thiserror::Error;

use crate::upload::UploadError;

/// Errors that can occur while persisting or forwarding the daily log.
///
/// This enum is marked `#[non_exhaustive]` to allow adding new error variants
/// in future versions without breaking downstream code.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    /// Failed to create the data directory.
    #[error("failed to create directory {path}: {source}")]
    CreateDirectory {
        /// The directory that could not be created.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// Failed to read the daily log back for upload.
    #[error("failed to read log file {path}: {source}")]
    ReadLog {
        /// The log file that could not be read.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// CSV writing failed.
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    /// I/O error.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Timestamp/date formatting failed.
    #[error("failed to format date: {0}")]
    Format(#[from] time::error::Format),

    /// Upload to the object store failed.
    #[error(transparent)]
    Upload(#[from] UploadError),

    /// An upload was requested but no object store is configured.
    #[error("no object store configured")]
    UploadNotConfigured,
}

/// Result type alias using airlog-store's Error type.
pub type Result<T> = std::result::Result<T, Error>;
