use std::path::PathBuf;
use thiserror::Error;

/// Main error type for Photodeck
#[derive(Error, Debug)]
pub enum PhotodeckError {
    /// A directory that had to be listed could not be opened or read
    #[error("Directory unreadable: {}: {source}", .path.display())]
    DirectoryUnreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Sidecar descriptor content is not the expected structure
    #[error("Descriptor parse error in {}: {message}", .path.display())]
    DescriptorParse { path: PathBuf, message: String },

    /// Requested media file does not exist
    #[error("File not found: {}", .0.display())]
    FileNotFound(PathBuf),

    /// Request target escapes the configured root or is malformed
    #[error("Invalid path: {0}")]
    InvalidPath(String),

    /// File system I/O errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),
}

impl PhotodeckError {
    pub(crate) fn unreadable(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::DirectoryUnreadable {
            path: path.into(),
            source,
        }
    }
}

/// Convenient Result type using PhotodeckError
pub type Result<T> = std::result::Result<T, PhotodeckError>;
