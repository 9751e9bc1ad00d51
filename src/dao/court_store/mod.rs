#[cfg(feature = "couch-store")]
pub mod couchdb;
pub mod file;
pub mod memory;
#[cfg(feature = "mongo-store")]
pub mod mongodb;

use std::sync::Arc;

use futures::future::BoxFuture;

use crate::dao::models::{CourtEntity, SavedMatchEntity};
use crate::dao::storage::StorageResult;

/// Raw persistence of court records, one record per court number.
///
/// Backends only store and load what they are given; default initialisation,
/// timestamps and score resets are layered on top by
/// [`CourtRepository`](crate::dao::courts::CourtRepository).
pub trait CourtStore: Send + Sync {
    fn find_court(&self, court_number: u32)
    -> BoxFuture<'static, StorageResult<Option<CourtEntity>>>;
    /// Upsert the full record.
    fn save_court(&self, court: CourtEntity) -> BoxFuture<'static, StorageResult<()>>;
    /// Insert `court` unless a record with the same number exists, returning whichever
    /// record is stored once the call completes.
    fn insert_court_if_absent(
        &self,
        court: CourtEntity,
    ) -> BoxFuture<'static, StorageResult<CourtEntity>>;
    fn list_courts(&self) -> BoxFuture<'static, StorageResult<Vec<CourtEntity>>>;
    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>>;
    fn try_reconnect(&self) -> BoxFuture<'static, StorageResult<()>>;
}

/// Append-only log of archived matches.
pub trait MatchArchive: Send + Sync {
    fn append_match(&self, saved: SavedMatchEntity) -> BoxFuture<'static, StorageResult<()>>;
    /// All archived matches, most recent first.
    fn list_matches(&self) -> BoxFuture<'static, StorageResult<Vec<SavedMatchEntity>>>;
}

/// A connected storage backend serving both courts and the match archive.
#[derive(Clone)]
pub struct Backend {
    courts: Arc<dyn CourtStore>,
    matches: Arc<dyn MatchArchive>,
}

impl Backend {
    /// Wrap a store implementing both halves of the persistence contract.
    pub fn new<S>(store: S) -> Self
    where
        S: CourtStore + MatchArchive + 'static,
    {
        let store = Arc::new(store);
        Self {
            courts: store.clone(),
            matches: store,
        }
    }

    /// Assemble a backend from independently provided stores.
    pub fn from_parts(courts: Arc<dyn CourtStore>, matches: Arc<dyn MatchArchive>) -> Self {
        Self { courts, matches }
    }

    /// Fresh in-memory backend.
    pub fn memory() -> Self {
        Self::new(memory::MemoryCourtStore::new())
    }

    pub fn courts(&self) -> Arc<dyn CourtStore> {
        self.courts.clone()
    }

    pub fn matches(&self) -> Arc<dyn MatchArchive> {
        self.matches.clone()
    }
}
