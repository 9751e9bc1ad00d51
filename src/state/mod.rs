pub mod court;
pub mod lock;

use std::sync::Arc;

use tokio::sync::{RwLock, watch};
use tracing::info;

use crate::{
    config::AppConfig,
    dao::{court_store::Backend, courts::CourtRepository},
    error::ServiceError,
    services::coordinator::UpdateCoordinator,
};

use self::lock::{Clock, GlobalLock};

pub type SharedState = Arc<AppState>;

/// Central application state: configuration, the installed storage backend and the global lock.
pub struct AppState {
    config: AppConfig,
    backend: RwLock<Option<Backend>>,
    lock: Arc<GlobalLock>,
    degraded: watch::Sender<bool>,
}

impl AppState {
    /// Construct a new [`AppState`] wrapped in an [`Arc`] so it can be cloned cheaply.
    ///
    /// The application starts in degraded mode until a storage backend is installed.
    pub fn new(config: AppConfig) -> SharedState {
        let lock = GlobalLock::new(config.lock_timeout());
        Self::from_parts(config, lock)
    }

    /// Same as [`AppState::new`] but the lock reads time from `clock`.
    pub fn with_clock(config: AppConfig, clock: Arc<dyn Clock>) -> SharedState {
        let lock = GlobalLock::with_clock(config.lock_timeout(), clock);
        Self::from_parts(config, lock)
    }

    fn from_parts(config: AppConfig, lock: GlobalLock) -> SharedState {
        let (degraded_tx, _rx) = watch::channel(true);
        Arc::new(Self {
            config,
            backend: RwLock::new(None),
            lock: Arc::new(lock),
            degraded: degraded_tx,
        })
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// The process-wide lock serializing court mutations.
    pub fn lock(&self) -> &Arc<GlobalLock> {
        &self.lock
    }

    /// Obtain a handle to the current backend, if one is installed.
    pub async fn backend(&self) -> Option<Backend> {
        let guard = self.backend.read().await;
        guard.as_ref().cloned()
    }

    /// Install a new backend and leave degraded mode.
    pub async fn install_backend(&self, backend: Backend) {
        {
            let mut guard = self.backend.write().await;
            *guard = Some(backend);
        }
        info!("storage backend installed");
        self.update_degraded(false);
    }

    /// Remove the current backend and enter degraded mode.
    pub async fn clear_backend(&self) {
        {
            let mut guard = self.backend.write().await;
            guard.take();
        }
        self.update_degraded(true);
    }

    /// Current degraded flag.
    pub fn is_degraded(&self) -> bool {
        *self.degraded.borrow()
    }

    /// Update and broadcast the degraded flag when the value changes.
    pub(crate) fn update_degraded(&self, value: bool) {
        self.degraded.send_if_modified(|current| {
            if *current == value {
                return false;
            }
            *current = value;
            true
        });
    }

    /// Coordinator for reads and locked mutations over the installed backend.
    pub async fn coordinator(&self) -> Result<UpdateCoordinator, ServiceError> {
        let backend = self.healthy_backend().await?;
        let courts = CourtRepository::new(backend.courts(), self.config.court_count());
        Ok(UpdateCoordinator::new(
            courts,
            backend.matches(),
            self.lock.clone(),
        ))
    }

    async fn healthy_backend(&self) -> Result<Backend, ServiceError> {
        if self.is_degraded() {
            return Err(ServiceError::Degraded);
        }
        self.backend().await.ok_or(ServiceError::Degraded)
    }
}
