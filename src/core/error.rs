//! Error types for backup and restore operations.

use std::path::PathBuf;
use thiserror::Error;

/// Result type for versionkeep operations.
pub type KeepResult<T> = Result<T, KeepError>;

/// Errors that abort an operation before any file is touched.
///
/// Per-file copy failures are not represented here; they are logged and
/// collected on the running job instead.
#[derive(Debug, Error)]
pub enum KeepError {
    /// Source folder does not exist.
    #[error("Source folder not found: {0}")]
    SourceMissing(PathBuf),

    /// Source path exists but is not a directory.
    #[error("Source is not a directory: {0}")]
    NotADirectory(PathBuf),

    /// A version name that is not a single folder name.
    #[error("Invalid version name: {0:?}")]
    InvalidVersionName(String),

    /// No version folders were found where one was required.
    #[error("No version folders found in {0}")]
    NoVersions(PathBuf),

    /// Configuration could not be read or written.
    #[error("Configuration error: {0}")]
    Config(String),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<toml::de::Error> for KeepError {
    fn from(err: toml::de::Error) -> Self {
        Self::Config(err.to_string())
    }
}

impl From<toml::ser::Error> for KeepError {
    fn from(err: toml::ser::Error) -> Self {
        Self::Config(err.to_string())
    }
}
