//! The only write path to court records.
//!
//! Every mutation follows the same protocol: validate the inputs, take the global lock
//! without waiting, read the court, apply the change, write it back. The lock guard is
//! dropped on every exit path. Reads never take the lock.

use std::{sync::Arc, time::SystemTime};

use tracing::{debug, info};

use crate::{
    dao::{court_store::MatchArchive, courts::CourtRepository},
    error::ServiceError,
    state::{
        court::{
            Court, SavedMatch, ScoreChange, Side, TeamName, UpcomingName, normalize_notes,
        },
        lock::{GlobalLock, LockGuard},
    },
};

/// Complete replacement of one court's teams, as produced by the test data generator.
#[derive(Debug, Clone)]
pub struct CourtFill {
    pub court_number: u32,
    pub left_name: TeamName,
    pub right_name: TeamName,
    pub left_score: u8,
    pub right_score: u8,
    pub upcoming_left: UpcomingName,
    pub upcoming_right: UpcomingName,
}

/// Serializes court mutations behind the global lock and applies the scoreboard rules.
#[derive(Clone)]
pub struct UpdateCoordinator {
    courts: CourtRepository,
    matches: Arc<dyn MatchArchive>,
    lock: Arc<GlobalLock>,
}

impl UpdateCoordinator {
    pub fn new(
        courts: CourtRepository,
        matches: Arc<dyn MatchArchive>,
        lock: Arc<GlobalLock>,
    ) -> Self {
        Self {
            courts,
            matches,
            lock,
        }
    }

    pub fn court_count(&self) -> u32 {
        self.courts.court_count()
    }

    /// Current state of one court.
    pub async fn court(&self, court_number: u32) -> Result<Court, ServiceError> {
        Ok(self.courts.get(court_number).await?.into())
    }

    /// Every configured court in ascending order.
    pub async fn courts(&self) -> Result<Vec<Court>, ServiceError> {
        let courts = self.courts.get_all().await?;
        Ok(courts.into_iter().map(Court::from).collect())
    }

    /// Archived matches, most recent first.
    pub async fn saved_matches(&self) -> Result<Vec<SavedMatch>, ServiceError> {
        let matches = self.matches.list_matches().await?;
        Ok(matches.into_iter().map(SavedMatch::from).collect())
    }

    pub async fn increment_score(&self, court_number: u32, side: Side) -> Result<Court, ServiceError> {
        self.mutate_court(court_number, |court| {
            court.apply_score_change(side, ScoreChange::Increment)
        })
        .await
    }

    pub async fn decrement_score(&self, court_number: u32, side: Side) -> Result<Court, ServiceError> {
        self.mutate_court(court_number, |court| {
            court.apply_score_change(side, ScoreChange::Decrement)
        })
        .await
    }

    /// Zero both scores; names and upcoming teams are kept.
    pub async fn reset_scores(&self, court_number: u32) -> Result<Court, ServiceError> {
        self.courts.ensure_in_range(court_number)?;
        let _guard = self.acquire()?;
        Ok(self.courts.reset_scores(court_number).await?.into())
    }

    /// Zero the scores of every court under a single lock acquisition.
    pub async fn reset_all_scores(&self) -> Result<Vec<Court>, ServiceError> {
        let _guard = self.acquire()?;
        let courts = self.courts.reset_all_scores().await?;
        info!(courts = courts.len(), "reset scores on all courts");
        Ok(courts.into_iter().map(Court::from).collect())
    }

    pub async fn update_team_name(
        &self,
        court_number: u32,
        side: Side,
        name: &str,
    ) -> Result<Court, ServiceError> {
        let name = TeamName::parse(name)?;
        self.mutate_court(court_number, |court| court.rename_team(side, name))
            .await
    }

    /// Rename both teams at once; neither name is applied unless both are valid.
    pub async fn update_team_names(
        &self,
        court_number: u32,
        left: &str,
        right: &str,
    ) -> Result<Court, ServiceError> {
        let left = TeamName::parse(left)?;
        let right = TeamName::parse(right)?;
        self.mutate_court(court_number, |court| {
            court.rename_team(Side::Left, left);
            court.rename_team(Side::Right, right);
        })
        .await
    }

    /// Set the "next up" label for one side. An empty name clears it.
    pub async fn update_upcoming_team(
        &self,
        court_number: u32,
        side: Side,
        name: &str,
    ) -> Result<Court, ServiceError> {
        let name = UpcomingName::parse(name)?;
        self.mutate_court(court_number, |court| court.set_upcoming(side, name))
            .await
    }

    /// Archive a snapshot of the court. The court itself is left unchanged.
    pub async fn save_match(
        &self,
        court_number: u32,
        notes: Option<&str>,
    ) -> Result<SavedMatch, ServiceError> {
        let notes = normalize_notes(notes)?;
        self.courts.ensure_in_range(court_number)?;

        let _guard = self.acquire()?;
        let court: Court = self.courts.get(court_number).await?.into();
        let saved = SavedMatch::capture(&court, notes, SystemTime::now());
        self.matches.append_match(saved.clone().into()).await?;

        info!(court_number, id = %saved.id, "match saved");
        Ok(saved)
    }

    /// Overwrite several courts under a single lock acquisition.
    pub async fn populate(&self, fills: Vec<CourtFill>) -> Result<Vec<Court>, ServiceError> {
        for fill in &fills {
            self.courts.ensure_in_range(fill.court_number)?;
        }

        let _guard = self.acquire()?;
        let mut updated = Vec::with_capacity(fills.len());
        for fill in fills {
            let mut court: Court = self.courts.get(fill.court_number).await?.into();
            court.rename_team(Side::Left, fill.left_name);
            court.rename_team(Side::Right, fill.right_name);
            court.set_scores(fill.left_score, fill.right_score);
            court.set_upcoming(Side::Left, fill.upcoming_left);
            court.set_upcoming(Side::Right, fill.upcoming_right);
            updated.push(self.courts.put(court.into()).await?.into());
        }
        Ok(updated)
    }

    async fn mutate_court<F>(&self, court_number: u32, apply: F) -> Result<Court, ServiceError>
    where
        F: FnOnce(&mut Court),
    {
        self.courts.ensure_in_range(court_number)?;

        let _guard = self.acquire()?;
        let mut court: Court = self.courts.get(court_number).await?.into();
        apply(&mut court);
        Ok(self.courts.put(court.into()).await?.into())
    }

    fn acquire(&self) -> Result<LockGuard, ServiceError> {
        self.lock.acquire().map_err(|busy| {
            debug!("scoreboard lock busy; rejecting update");
            ServiceError::from(busy)
        })
    }
}

#[cfg(test)]
mod tests {
    use std::{io, time::Duration};

    use futures::future::BoxFuture;

    use super::*;
    use crate::{
        dao::{
            court_store::{CourtStore, memory::MemoryCourtStore},
            models::{CourtEntity, SavedMatchEntity},
            storage::{StorageError, StorageResult},
        },
        state::{court::MAX_SCORE, lock::ManualClock},
    };

    const TIMEOUT: Duration = Duration::from_secs(10);

    fn coordinator_with_lock(lock: Arc<GlobalLock>) -> (UpdateCoordinator, MemoryCourtStore) {
        let store = MemoryCourtStore::new();
        let courts = CourtRepository::new(Arc::new(store.clone()), 6);
        let coordinator = UpdateCoordinator::new(courts, Arc::new(store.clone()), lock);
        (coordinator, store)
    }

    fn coordinator() -> (UpdateCoordinator, MemoryCourtStore) {
        coordinator_with_lock(Arc::new(GlobalLock::new(TIMEOUT)))
    }

    #[tokio::test]
    async fn end_to_end_scoring_scenario() {
        let (coordinator, _store) = coordinator();

        let court = coordinator.court(1).await.unwrap();
        assert_eq!(court.left_team.name, "Team A");
        assert_eq!(court.right_team.name, "Team B");
        assert_eq!((court.left_team.score, court.right_team.score), (0, 0));

        for _ in 0..3 {
            coordinator.increment_score(1, Side::Left).await.unwrap();
        }
        assert_eq!(coordinator.court(1).await.unwrap().left_team.score, 3);

        let renamed = coordinator
            .update_team_name(1, Side::Left, "  Falcons ")
            .await
            .unwrap();
        assert_eq!(renamed.left_team.name, "Falcons");

        let saved = coordinator.save_match(1, Some("great match")).await.unwrap();
        let archive = coordinator.saved_matches().await.unwrap();
        assert_eq!(archive.len(), 1);
        assert_eq!(archive[0], saved);
        assert_eq!(archive[0].left_team.score, 3);
        assert_eq!(archive[0].left_team.name, "Falcons");
        assert_eq!(archive[0].notes.as_deref(), Some("great match"));

        let reset = coordinator.reset_scores(1).await.unwrap();
        assert_eq!(reset.left_team.score, 0);
        assert_eq!(reset.left_team.name, "Falcons");
    }

    #[tokio::test]
    async fn name_boundaries() {
        let (coordinator, _store) = coordinator();

        assert!(matches!(
            coordinator.update_team_name(1, Side::Left, "").await,
            Err(ServiceError::InvalidInput(_))
        ));
        assert!(matches!(
            coordinator
                .update_team_name(1, Side::Left, &"x".repeat(21))
                .await,
            Err(ServiceError::InvalidInput(_))
        ));

        let court = coordinator
            .update_upcoming_team(1, Side::Left, "")
            .await
            .unwrap();
        assert_eq!(court.upcoming_left, "");
    }

    #[tokio::test]
    async fn bulk_rename_is_all_or_nothing() {
        let (coordinator, _store) = coordinator();

        let err = coordinator
            .update_team_names(2, "Falcons", "   ")
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::InvalidInput(_)));
        assert_eq!(coordinator.court(2).await.unwrap().left_team.name, "Team A");

        let court = coordinator
            .update_team_names(2, " Falcons", "Hawks ")
            .await
            .unwrap();
        assert_eq!(court.left_team.name, "Falcons");
        assert_eq!(court.right_team.name, "Hawks");
    }

    #[tokio::test]
    async fn scores_clamp_at_bounds() {
        let (coordinator, store) = coordinator();
        let mut entity = CourtEntity::initial(1);
        entity.left_team.score = MAX_SCORE;
        store.save_court(entity).await.unwrap();

        let court = coordinator.increment_score(1, Side::Left).await.unwrap();
        assert_eq!(court.left_team.score, MAX_SCORE);

        let court = coordinator.decrement_score(1, Side::Right).await.unwrap();
        assert_eq!(court.right_team.score, 0);
    }

    #[tokio::test]
    async fn reset_is_idempotent() {
        let (coordinator, _store) = coordinator();
        coordinator.increment_score(3, Side::Right).await.unwrap();
        coordinator.update_upcoming_team(3, Side::Right, "Owls").await.unwrap();

        let once = coordinator.reset_scores(3).await.unwrap();
        let twice = coordinator.reset_scores(3).await.unwrap();
        assert_eq!(once.left_team, twice.left_team);
        assert_eq!(once.right_team, twice.right_team);
        assert_eq!(twice.upcoming_right, "Owls");
    }

    #[tokio::test]
    async fn reset_all_covers_every_court() {
        let (coordinator, _store) = coordinator();
        coordinator.increment_score(1, Side::Left).await.unwrap();
        coordinator.increment_score(6, Side::Right).await.unwrap();

        let courts = coordinator.reset_all_scores().await.unwrap();
        assert_eq!(courts.len(), 6);
        assert!(
            courts
                .iter()
                .all(|court| court.left_team.score == 0 && court.right_team.score == 0)
        );
    }

    #[tokio::test]
    async fn save_match_does_not_touch_the_court() {
        let (coordinator, _store) = coordinator();
        coordinator.increment_score(4, Side::Left).await.unwrap();
        let before = coordinator.court(4).await.unwrap();

        let saved = coordinator.save_match(4, Some("   ")).await.unwrap();
        assert_eq!(saved.notes, None);

        let after = coordinator.court(4).await.unwrap();
        assert_eq!(before, after);
    }

    #[tokio::test]
    async fn unknown_court_is_not_found() {
        let (coordinator, _store) = coordinator();
        assert!(matches!(
            coordinator.increment_score(7, Side::Left).await,
            Err(ServiceError::NotFound(_))
        ));
        assert!(matches!(
            coordinator.save_match(0, None).await,
            Err(ServiceError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn held_lock_reports_busy_until_stale() {
        let clock = ManualClock::new();
        let lock = Arc::new(GlobalLock::with_clock(TIMEOUT, clock.clone()));
        let (coordinator, _store) = coordinator_with_lock(lock.clone());

        let _crashed_holder = lock.acquire().unwrap();
        assert!(matches!(
            coordinator.increment_score(1, Side::Left).await,
            Err(ServiceError::LockBusy(_))
        ));

        clock.advance(TIMEOUT + Duration::from_secs(1));
        let court = coordinator.increment_score(1, Side::Left).await.unwrap();
        assert_eq!(court.left_team.score, 1);
        assert!(!lock.is_held());
    }

    #[tokio::test]
    async fn validation_failure_does_not_take_the_lock() {
        let lock = Arc::new(GlobalLock::new(TIMEOUT));
        let (coordinator, _store) = coordinator_with_lock(lock.clone());
        let _holder = lock.acquire().unwrap();

        // Rejected for its input, not for the held lock.
        assert!(matches!(
            coordinator.update_team_name(1, Side::Left, "").await,
            Err(ServiceError::InvalidInput(_))
        ));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_increments_are_serialized() {
        let (coordinator, _store) = coordinator();
        let tasks = (0..20)
            .map(|_| {
                let coordinator = coordinator.clone();
                tokio::spawn(async move {
                    loop {
                        match coordinator.increment_score(1, Side::Left).await {
                            Ok(_) => break,
                            Err(ServiceError::LockBusy(_)) => tokio::task::yield_now().await,
                            Err(other) => panic!("unexpected error: {other}"),
                        }
                    }
                })
            })
            .collect::<Vec<_>>();

        for task in tasks {
            task.await.unwrap();
        }

        assert_eq!(coordinator.court(1).await.unwrap().left_team.score, 20);
    }

    struct FailingStore;

    fn offline() -> StorageError {
        StorageError::unavailable(
            "backend offline".into(),
            io::Error::new(io::ErrorKind::ConnectionRefused, "refused"),
        )
    }

    impl CourtStore for FailingStore {
        fn find_court(&self, court_number: u32) -> BoxFuture<'static, StorageResult<Option<CourtEntity>>> {
            Box::pin(async move { Ok(Some(CourtEntity::initial(court_number))) })
        }

        fn save_court(&self, _court: CourtEntity) -> BoxFuture<'static, StorageResult<()>> {
            Box::pin(async { Err(offline()) })
        }

        fn insert_court_if_absent(&self, court: CourtEntity) -> BoxFuture<'static, StorageResult<CourtEntity>> {
            Box::pin(async move { Ok(court) })
        }

        fn list_courts(&self) -> BoxFuture<'static, StorageResult<Vec<CourtEntity>>> {
            Box::pin(async { Err(offline()) })
        }

        fn health_check(&self) -> BoxFuture<'static, StorageResult<()>> {
            Box::pin(async { Err(offline()) })
        }

        fn try_reconnect(&self) -> BoxFuture<'static, StorageResult<()>> {
            Box::pin(async { Err(offline()) })
        }
    }

    impl MatchArchive for FailingStore {
        fn append_match(&self, _saved: SavedMatchEntity) -> BoxFuture<'static, StorageResult<()>> {
            Box::pin(async { Err(offline()) })
        }

        fn list_matches(&self) -> BoxFuture<'static, StorageResult<Vec<SavedMatchEntity>>> {
            Box::pin(async { Err(offline()) })
        }
    }

    #[tokio::test]
    async fn store_failure_releases_the_lock() {
        let lock = Arc::new(GlobalLock::new(TIMEOUT));
        let store = Arc::new(FailingStore);
        let coordinator =
            UpdateCoordinator::new(CourtRepository::new(store.clone(), 6), store, lock.clone());

        assert!(matches!(
            coordinator.increment_score(1, Side::Left).await,
            Err(ServiceError::Storage(_))
        ));
        assert!(!lock.is_held());

        assert!(matches!(
            coordinator.save_match(1, None).await,
            Err(ServiceError::Storage(_))
        ));
        assert!(!lock.is_held());
    }
}
