use std::{sync::Arc, time::SystemTime};

use thiserror::Error;
use tracing::{debug, warn};

use crate::dao::{
    court_store::CourtStore,
    models::CourtEntity,
    storage::{StorageError, StorageResult},
};

/// Failures raised by the court repository.
#[derive(Debug, Error)]
pub enum CourtError {
    /// The court number is outside `1..=court_count`.
    #[error("court {court_number} does not exist (courts 1..={court_count})")]
    OutOfRange { court_number: u32, court_count: u32 },
    /// The underlying backend failed.
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Data access object giving every backend the same court semantics: records are
/// created lazily with defaults, listed in ascending order and stamped on each write.
///
/// Mutators are crate-private; callers outside the update coordinator only get reads.
#[derive(Clone)]
pub struct CourtRepository {
    store: Arc<dyn CourtStore>,
    court_count: u32,
}

impl CourtRepository {
    pub fn new(store: Arc<dyn CourtStore>, court_count: u32) -> Self {
        Self { store, court_count }
    }

    /// Number of courts configured for this deployment.
    pub fn court_count(&self) -> u32 {
        self.court_count
    }

    /// Reject court numbers outside the configured range.
    pub fn ensure_in_range(&self, court_number: u32) -> Result<(), CourtError> {
        if (1..=self.court_count).contains(&court_number) {
            Ok(())
        } else {
            Err(CourtError::OutOfRange {
                court_number,
                court_count: self.court_count,
            })
        }
    }

    /// Return the court, creating its default record on first access.
    pub async fn get(&self, court_number: u32) -> Result<CourtEntity, CourtError> {
        self.ensure_in_range(court_number)?;
        Ok(self.load_or_create(court_number).await?)
    }

    /// Every configured court in ascending order, creating the missing ones.
    pub async fn get_all(&self) -> Result<Vec<CourtEntity>, CourtError> {
        let stored = self.store.list_courts().await?;

        let mut courts = Vec::with_capacity(self.court_count as usize);
        let mut stored = stored.into_iter().peekable();
        for court_number in 1..=self.court_count {
            // Records sorting before the current number are duplicates or court 0.
            while let Some(stray) = stored.next_if(|court| court.court_number < court_number) {
                warn!(
                    court_number = stray.court_number,
                    "ignoring stray court record"
                );
            }
            match stored.next_if(|court| court.court_number == court_number) {
                Some(court) => courts.push(court),
                None => courts.push(self.load_or_create(court_number).await?),
            }
        }

        Ok(courts)
    }

    /// Upsert the full record, stamping `last_updated`.
    pub(crate) async fn put(&self, mut court: CourtEntity) -> Result<CourtEntity, CourtError> {
        self.ensure_in_range(court.court_number)?;
        court.last_updated = SystemTime::now();
        self.store.save_court(court.clone()).await?;
        Ok(court)
    }

    /// Zero both scores of a court, leaving names and upcoming teams untouched.
    pub(crate) async fn reset_scores(&self, court_number: u32) -> Result<CourtEntity, CourtError> {
        let mut court = self.get(court_number).await?;
        court.left_team.score = 0;
        court.right_team.score = 0;
        self.put(court).await
    }

    /// Apply [`Self::reset_scores`] to every configured court.
    pub(crate) async fn reset_all_scores(&self) -> Result<Vec<CourtEntity>, CourtError> {
        let mut courts = Vec::with_capacity(self.court_count as usize);
        for court_number in 1..=self.court_count {
            courts.push(self.reset_scores(court_number).await?);
        }
        Ok(courts)
    }

    async fn load_or_create(&self, court_number: u32) -> StorageResult<CourtEntity> {
        if let Some(court) = self.store.find_court(court_number).await? {
            return Ok(court);
        }

        debug!(court_number, "initialising court with default teams");
        self.store
            .insert_court_if_absent(CourtEntity::initial(court_number))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dao::{
        court_store::memory::MemoryCourtStore,
        models::{DEFAULT_LEFT_TEAM_NAME, DEFAULT_RIGHT_TEAM_NAME},
    };

    fn repository(store: &MemoryCourtStore) -> CourtRepository {
        CourtRepository::new(Arc::new(store.clone()), 6)
    }

    #[tokio::test]
    async fn get_creates_default_court_once() {
        let store = MemoryCourtStore::new();
        let repo = repository(&store);

        let court = repo.get(3).await.unwrap();
        assert_eq!(court.court_number, 3);
        assert_eq!(court.left_team.name, DEFAULT_LEFT_TEAM_NAME);
        assert_eq!(court.right_team.name, DEFAULT_RIGHT_TEAM_NAME);
        assert_eq!((court.left_team.score, court.right_team.score), (0, 0));
        assert!(court.upcoming_left.is_empty() && court.upcoming_right.is_empty());

        let persisted = store.find_court(3).await.unwrap().unwrap();
        assert_eq!(persisted, court);
    }

    #[tokio::test]
    async fn out_of_range_court_is_rejected() {
        let repo = repository(&MemoryCourtStore::new());
        assert!(matches!(
            repo.get(0).await,
            Err(CourtError::OutOfRange { court_number: 0, .. })
        ));
        assert!(matches!(
            repo.get(7).await,
            Err(CourtError::OutOfRange {
                court_number: 7,
                court_count: 6
            })
        ));
    }

    #[tokio::test]
    async fn get_all_fills_gaps_and_orders_ascending() {
        let store = MemoryCourtStore::new();
        let mut existing = CourtEntity::initial(4);
        existing.left_team.score = 12;
        store.save_court(existing.clone()).await.unwrap();
        store.save_court(CourtEntity::initial(9)).await.unwrap();

        let courts = repository(&store).get_all().await.unwrap();
        let numbers = courts.iter().map(|c| c.court_number).collect::<Vec<_>>();
        assert_eq!(numbers, vec![1, 2, 3, 4, 5, 6]);
        assert_eq!(courts[3], existing);
    }

    #[tokio::test]
    async fn put_stamps_last_updated() {
        let store = MemoryCourtStore::new();
        let repo = repository(&store);
        let mut court = repo.get(1).await.unwrap();
        court.last_updated = SystemTime::UNIX_EPOCH;

        let stored = repo.put(court).await.unwrap();
        assert!(stored.last_updated > SystemTime::UNIX_EPOCH);
    }

    #[tokio::test]
    async fn reset_scores_keeps_names() {
        let store = MemoryCourtStore::new();
        let repo = repository(&store);
        let mut court = repo.get(2).await.unwrap();
        court.left_team.name = "Falcons".into();
        court.left_team.score = 5;
        court.right_team.score = 3;
        court.upcoming_right = "Owls".into();
        repo.put(court).await.unwrap();

        let reset = repo.reset_scores(2).await.unwrap();
        assert_eq!((reset.left_team.score, reset.right_team.score), (0, 0));
        assert_eq!(reset.left_team.name, "Falcons");
        assert_eq!(reset.upcoming_right, "Owls");
    }
}
