//! Defines the custom error type for the `core` module.

use std::path::PathBuf;
use thiserror::Error;

/// The primary error type for the `core` module.
///
/// Only `InvalidRoot`, `OutputWrite` and `InvalidTypeFilter` abort an
/// operation. `DirectoryRead` and `FileRead` are produced per entry and
/// downgraded to [`ReadFailure`](super::ReadFailure) records by the batch
/// operations that encounter them.
#[derive(Debug, Error)]
pub enum CoreError {
    /// The selected root is missing or is not a directory.
    #[error("Path is not a valid directory: {0}")]
    InvalidRoot(PathBuf),

    /// A directory below the root could not be listed.
    #[error("Failed to read directory {path}: {source}")]
    DirectoryRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A file could not be read or is not valid UTF-8.
    #[error("Failed to read {path}: {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Saving to disk or writing to the clipboard failed.
    #[error("Failed to write output to {target}: {source}")]
    OutputWrite {
        target: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// A type filter string that is neither "All Files" nor an extension.
    #[error("Invalid file type filter: {0:?}")]
    InvalidTypeFilter(String),
}
