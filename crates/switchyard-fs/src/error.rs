//! Error types for switchyard-fs

use std::path::PathBuf;

use crate::FileFormat;

/// Result type for switchyard-fs operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in switchyard-fs operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse {format} file at {path}: {message}")]
    Parse {
        path: PathBuf,
        format: FileFormat,
        message: String,
    },

    #[error("Failed to serialize {format} file at {path}: {message}")]
    Serialize {
        path: PathBuf,
        format: FileFormat,
        message: String,
    },

    #[error("Unsupported file format: {extension:?}")]
    UnsupportedFormat { extension: String },

    #[error("Lock acquisition failed for {path}")]
    LockFailed { path: PathBuf },
}

impl Error {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub fn parse(path: impl Into<PathBuf>, format: FileFormat, message: impl ToString) -> Self {
        Self::Parse {
            path: path.into(),
            format,
            message: message.to_string(),
        }
    }

    pub fn serialize(path: impl Into<PathBuf>, format: FileFormat, message: impl ToString) -> Self {
        Self::Serialize {
            path: path.into(),
            format,
            message: message.to_string(),
        }
    }
}
