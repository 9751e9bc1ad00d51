//! Error types shared by the JSON file storage implementation.

use std::{io, path::PathBuf};

use thiserror::Error;

/// Convenient result alias returning [`FileStoreError`] failures.
pub type FileResult<T> = Result<T, FileStoreError>;

/// Failures that can occur while reading or writing the data directory.
#[derive(Debug, Error)]
pub enum FileStoreError {
    /// The data directory (or one of its children) could not be created.
    #[error("failed to create directory `{}`", .path.display())]
    CreateDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    /// The configured data root exists but is not a directory.
    #[error("data root `{}` is not a directory", .path.display())]
    NotADirectory { path: PathBuf },
    /// Reading a document failed for a reason other than its absence.
    #[error("failed to read `{}`", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    /// Writing or renaming a document failed.
    #[error("failed to write `{}`", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    /// A document does not contain valid JSON for the expected model.
    #[error("failed to decode `{}`", .path.display())]
    Decode {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    /// Serialising an entity before writing failed.
    #[error("failed to encode document for `{}`", .path.display())]
    Encode {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    /// A court document holds a different court number than its file name.
    #[error("`{}` holds court {found}, expected court {expected}", .path.display())]
    Mismatch {
        path: PathBuf,
        expected: u32,
        found: u32,
    },
}

impl FileStoreError {
    /// Path of the file or directory involved in the failure.
    pub fn path(&self) -> &PathBuf {
        match self {
            FileStoreError::CreateDir { path, .. }
            | FileStoreError::NotADirectory { path }
            | FileStoreError::Read { path, .. }
            | FileStoreError::Write { path, .. }
            | FileStoreError::Decode { path, .. }
            | FileStoreError::Encode { path, .. }
            | FileStoreError::Mismatch { path, .. } => path,
        }
    }
}
