//! Error types shared by the snapshot crates

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while deriving, reading or writing snapshots
#[derive(Debug, Error)]
pub enum SnapshotError {
    /// The requested blob does not exist in the store
    #[error("not found: {}", .0.display())]
    NotFound(PathBuf),

    /// An I/O operation on a stored blob failed
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The document declares a charset we cannot encode to
    #[error("unsupported charset: {0}")]
    UnsupportedCharset(String),

    /// The document cannot be snapshotted at all
    #[error("invalid document: {0}")]
    InvalidDocument(String),

    /// A configuration value is out of range or malformed
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// No async runtime was available to drive background tasks
    #[error("no tokio runtime available to run snapshot tasks")]
    NoRuntime,
}

impl SnapshotError {
    /// Wrap an `io::Error`, mapping `NotFound` onto [`SnapshotError::NotFound`]
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        let path = path.into();
        if source.kind() == std::io::ErrorKind::NotFound {
            Self::NotFound(path)
        } else {
            Self::Io { path, source }
        }
    }

    /// Whether this error means "nothing stored there"
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}

/// Result type used throughout lifeboat-core
pub type Result<T> = std::result::Result<T, SnapshotError>;
