//! Error types shared by the scan, organize and rename passes.
//!
//! None of these abort a run on their own: the passes catch them per file or
//! per directory, log them and keep going. They surface to callers through
//! the failure lists in the pass reports.

use std::io;
use std::path::PathBuf;

/// Errors that can occur while walking, classifying or copying files.
#[derive(Debug)]
pub enum OrganizeError {
    /// A directory could not be listed (permission denied, vanished).
    Traversal { path: PathBuf, source: io::Error },
    /// A symbolic link whose target cannot be read (dangling, permission denied).
    BrokenLink { path: PathBuf, source: io::Error },
    /// No creation timestamp could be read for a file.
    Timestamp { path: PathBuf, source: io::Error },
    /// Failed to create a destination folder.
    DirectoryCreationFailed { path: PathBuf, source: io::Error },
    /// Failed to copy a file to its destination folder.
    CopyFailed {
        source: PathBuf,
        destination: PathBuf,
        source_error: io::Error,
    },
    /// Failed to rename a file in place.
    RenameFailed {
        source: PathBuf,
        destination: PathBuf,
        source_error: io::Error,
    },
    /// The root directory path is invalid or doesn't exist.
    InvalidRoot { path: PathBuf, source: io::Error },
}

impl OrganizeError {
    /// The path the error is about, for per-item reporting.
    pub fn path(&self) -> &PathBuf {
        match self {
            Self::Traversal { path, .. }
            | Self::BrokenLink { path, .. }
            | Self::Timestamp { path, .. }
            | Self::DirectoryCreationFailed { path, .. }
            | Self::InvalidRoot { path, .. } => path,
            Self::CopyFailed { source, .. } | Self::RenameFailed { source, .. } => source,
        }
    }
}

impl std::fmt::Display for OrganizeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Traversal { path, source } => {
                write!(f, "Failed to read directory {}: {}", path.display(), source)
            }
            Self::BrokenLink { path, source } => {
                write!(f, "Failed to resolve link {}: {}", path.display(), source)
            }
            Self::Timestamp { path, source } => {
                write!(
                    f,
                    "No creation time available for {}: {}",
                    path.display(),
                    source
                )
            }
            Self::DirectoryCreationFailed { path, source } => {
                write!(
                    f,
                    "Failed to create directory {}: {}",
                    path.display(),
                    source
                )
            }
            Self::CopyFailed {
                source,
                destination,
                source_error,
            } => {
                write!(
                    f,
                    "Failed to copy {} to {}: {}",
                    source.display(),
                    destination.display(),
                    source_error
                )
            }
            Self::RenameFailed {
                source,
                destination,
                source_error,
            } => {
                write!(
                    f,
                    "Failed to rename {} to {}: {}",
                    source.display(),
                    destination.display(),
                    source_error
                )
            }
            Self::InvalidRoot { path, source } => {
                write!(f, "Invalid directory {}: {}", path.display(), source)
            }
        }
    }
}

impl std::error::Error for OrganizeError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Traversal { source, .. }
            | Self::BrokenLink { source, .. }
            | Self::Timestamp { source, .. }
            | Self::DirectoryCreationFailed { source, .. }
            | Self::InvalidRoot { source, .. } => Some(source),
            Self::CopyFailed { source_error, .. } | Self::RenameFailed { source_error, .. } => {
                Some(source_error)
            }
        }
    }
}

/// Result type for organize operations.
pub type OrganizeResult<T> = Result<T, OrganizeError>;
