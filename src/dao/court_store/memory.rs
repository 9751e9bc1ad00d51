//! Process-local backend used by tests and throwaway deployments.

use std::sync::{Arc, Mutex, PoisonError};

use dashmap::DashMap;
use futures::future::BoxFuture;

use crate::dao::{
    court_store::{CourtStore, MatchArchive},
    models::{CourtEntity, SavedMatchEntity, sort_newest_first},
    storage::StorageResult,
};

/// Court records and archived matches kept in memory.
#[derive(Clone, Default)]
pub struct MemoryCourtStore {
    courts: Arc<DashMap<u32, CourtEntity>>,
    matches: Arc<Mutex<Vec<SavedMatchEntity>>>,
}

impl MemoryCourtStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl CourtStore for MemoryCourtStore {
    fn find_court(
        &self,
        court_number: u32,
    ) -> BoxFuture<'static, StorageResult<Option<CourtEntity>>> {
        let found = self
            .courts
            .get(&court_number)
            .map(|entry| entry.value().clone());
        Box::pin(async move { Ok(found) })
    }

    fn save_court(&self, court: CourtEntity) -> BoxFuture<'static, StorageResult<()>> {
        self.courts.insert(court.court_number, court);
        Box::pin(async { Ok(()) })
    }

    fn insert_court_if_absent(
        &self,
        court: CourtEntity,
    ) -> BoxFuture<'static, StorageResult<CourtEntity>> {
        let stored = self
            .courts
            .entry(court.court_number)
            .or_insert(court)
            .value()
            .clone();
        Box::pin(async move { Ok(stored) })
    }

    fn list_courts(&self) -> BoxFuture<'static, StorageResult<Vec<CourtEntity>>> {
        let mut courts = self
            .courts
            .iter()
            .map(|entry| entry.value().clone())
            .collect::<Vec<_>>();
        courts.sort_by_key(|court| court.court_number);
        Box::pin(async move { Ok(courts) })
    }

    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>> {
        Box::pin(async { Ok(()) })
    }

    fn try_reconnect(&self) -> BoxFuture<'static, StorageResult<()>> {
        Box::pin(async { Ok(()) })
    }
}

impl MatchArchive for MemoryCourtStore {
    fn append_match(&self, saved: SavedMatchEntity) -> BoxFuture<'static, StorageResult<()>> {
        self.matches
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(saved);
        Box::pin(async { Ok(()) })
    }

    fn list_matches(&self) -> BoxFuture<'static, StorageResult<Vec<SavedMatchEntity>>> {
        let mut matches = self
            .matches
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();
        sort_newest_first(&mut matches);
        Box::pin(async move { Ok(matches) })
    }
}
