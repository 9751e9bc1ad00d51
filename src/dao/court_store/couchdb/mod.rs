//! CouchDB backend speaking the HTTP document API.

mod config;
mod error;
mod models;
mod store;

pub use config::{CouchConfig, CouchCredentials};
pub use error::CouchDaoError;
pub use store::CouchCourtStore;

use crate::dao::storage::StorageError;

impl From<CouchDaoError> for StorageError {
    fn from(err: CouchDaoError) -> Self {
        match err {
            CouchDaoError::Document { ref id, .. } => {
                StorageError::corrupted(id.clone(), err.to_string())
            }
            other => StorageError::unavailable(other.to_string(), other),
        }
    }
}
