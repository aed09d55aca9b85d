//! Error types shared by the file snapshot store.

use std::{io, path::PathBuf};

use thiserror::Error;

use crate::dao::storage::StorageError;

/// Convenient result alias returning [`FileDaoError`] failures.
pub type FileResult<T> = Result<T, FileDaoError>;

/// Failures that can occur while reading or writing snapshot files.
#[derive(Debug, Error)]
pub enum FileDaoError {
    /// The save directory could not be created or is not a directory.
    #[error("save directory `{}` is not usable", path.display())]
    Directory {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    /// Snapshot names are plain file names; anything resembling a path is refused.
    #[error("invalid snapshot name `{name}`")]
    InvalidName { name: String },
    #[error("failed to read `{}`", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to write `{}`", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to encode snapshot `{name}`")]
    Encode {
        name: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("failed to decode snapshot `{name}`")]
    Decode {
        name: String,
        #[source]
        source: serde_json::Error,
    },
}

impl From<FileDaoError> for StorageError {
    fn from(err: FileDaoError) -> Self {
        match err {
            FileDaoError::Decode { name, source } => StorageError::corrupt(name, source),
            FileDaoError::InvalidName { name } => StorageError::InvalidName { name },
            other => StorageError::unavailable(other.to_string(), other),
        }
    }
}
