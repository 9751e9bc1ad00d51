mod error;
mod store;

pub use error::{FileResult, FileStoreError};
pub use store::FileCourtStore;

use crate::dao::storage::StorageError;

impl From<FileStoreError> for StorageError {
    fn from(err: FileStoreError) -> Self {
        match err {
            FileStoreError::Decode { .. } | FileStoreError::Mismatch { .. } => {
                let key = err.path().display().to_string();
                StorageError::corrupted(key, err.to_string())
            }
            other => StorageError::unavailable(other.to_string(), other),
        }
    }
}
