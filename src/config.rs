//! Application-level configuration loading: court count, lock timeout and storage backend.

use std::{env, fs, io::ErrorKind, path::PathBuf, str::FromStr, time::Duration};

use serde::Deserialize;
use tracing::{info, warn};

/// Default location on disk where the server looks for the JSON configuration.
const DEFAULT_CONFIG_PATH: &str = "config/app.json";
/// Environment variable that overrides [`DEFAULT_CONFIG_PATH`].
const CONFIG_PATH_ENV: &str = "PADEL_SCOREBOARD_CONFIG_PATH";
/// Environment variable that overrides the configured storage backend.
const STORE_BACKEND_ENV: &str = "STORE_BACKEND";

const DEFAULT_COURT_COUNT: u32 = 6;
const DEFAULT_LOCK_TIMEOUT_MS: u64 = 10_000;
const DEFAULT_DATA_DIR: &str = "data";

/// Persistence backend selected at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    #[default]
    File,
    Memory,
    Mongo,
    Couch,
}

impl FromStr for StoreBackend {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "file" => Ok(Self::File),
            "memory" => Ok(Self::Memory),
            "mongo" | "mongodb" => Ok(Self::Mongo),
            "couch" | "couchdb" => Ok(Self::Couch),
            other => Err(format!("unknown store backend `{other}`")),
        }
    }
}

#[derive(Debug, Clone)]
/// Immutable runtime configuration shared across the application.
pub struct AppConfig {
    court_count: u32,
    lock_timeout: Duration,
    store: StoreBackend,
    data_dir: PathBuf,
}

impl AppConfig {
    /// Load the configuration from disk and the environment, falling back to built-in defaults.
    pub fn load() -> Self {
        let mut config = Self::load_file();

        if let Ok(raw) = env::var(STORE_BACKEND_ENV) {
            match raw.parse::<StoreBackend>() {
                Ok(store) => config.store = store,
                Err(err) => warn!(error = %err, "ignoring {STORE_BACKEND_ENV}"),
            }
        }

        config
    }

    fn load_file() -> Self {
        let path = resolve_config_path();
        match fs::read_to_string(&path) {
            Ok(contents) => match serde_json::from_str::<RawConfig>(&contents) {
                Ok(raw) => {
                    let app_config: Self = raw.into();
                    info!(
                        path = %path.display(),
                        court_count = app_config.court_count,
                        store = ?app_config.store,
                        "loaded scoreboard config"
                    );
                    app_config
                }
                Err(err) => {
                    warn!(
                        path = %path.display(),
                        error = %err,
                        "failed to parse config; falling back to defaults"
                    );
                    Self::default()
                }
            },
            Err(err) if err.kind() == ErrorKind::NotFound => {
                info!(
                    path = %path.display(),
                    "config file not found; using built-in defaults"
                );
                Self::default()
            }
            Err(err) => {
                warn!(
                    path = %path.display(),
                    error = %err,
                    "failed to read config; falling back to defaults"
                );
                Self::default()
            }
        }
    }

    /// Number of courts, numbered `1..=court_count`.
    pub fn court_count(&self) -> u32 {
        self.court_count
    }

    /// Age after which a held global lock is reclaimed.
    pub fn lock_timeout(&self) -> Duration {
        self.lock_timeout
    }

    pub fn store(&self) -> StoreBackend {
        self.store
    }

    /// Root directory of the file backend.
    pub fn data_dir(&self) -> &PathBuf {
        &self.data_dir
    }

    /// Override the court count.
    pub fn with_court_count(mut self, court_count: u32) -> Self {
        self.court_count = court_count.max(1);
        self
    }

    /// Override the lock timeout.
    pub fn with_lock_timeout(mut self, lock_timeout: Duration) -> Self {
        self.lock_timeout = lock_timeout;
        self
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            court_count: DEFAULT_COURT_COUNT,
            lock_timeout: Duration::from_millis(DEFAULT_LOCK_TIMEOUT_MS),
            store: StoreBackend::default(),
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
        }
    }
}

#[derive(Debug, Deserialize)]
/// JSON representation of the configuration file located at [`DEFAULT_CONFIG_PATH`].
struct RawConfig {
    #[serde(default)]
    court_count: Option<u32>,
    #[serde(default)]
    lock_timeout_ms: Option<u64>,
    #[serde(default)]
    store: Option<StoreBackend>,
    #[serde(default)]
    data_dir: Option<PathBuf>,
}

impl From<RawConfig> for AppConfig {
    fn from(value: RawConfig) -> Self {
        let defaults = Self::default();
        Self {
            court_count: value
                .court_count
                .filter(|count| *count > 0)
                .unwrap_or(defaults.court_count),
            lock_timeout: value
                .lock_timeout_ms
                .map(Duration::from_millis)
                .unwrap_or(defaults.lock_timeout),
            store: value.store.unwrap_or(defaults.store),
            data_dir: value.data_dir.unwrap_or(defaults.data_dir),
        }
    }
}

/// Resolve the configuration path taking the environment override into account.
fn resolve_config_path() -> PathBuf {
    env::var_os(CONFIG_PATH_ENV)
        .map(PathBuf::from)
        .filter(|path| !path.as_os_str().is_empty())
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_file_keeps_defaults() {
        let raw: RawConfig = serde_json::from_str(r#"{"store": "memory"}"#).unwrap();
        let config = AppConfig::from(raw);
        assert_eq!(config.store(), StoreBackend::Memory);
        assert_eq!(config.court_count(), 6);
        assert_eq!(config.lock_timeout(), Duration::from_secs(10));
        assert_eq!(config.data_dir(), &PathBuf::from("data"));
    }

    #[test]
    fn zero_courts_falls_back_to_default() {
        let raw: RawConfig = serde_json::from_str(r#"{"court_count": 0}"#).unwrap();
        assert_eq!(AppConfig::from(raw).court_count(), 6);
    }

    #[test]
    fn backend_names_parse_case_insensitively() {
        assert_eq!("Mongo".parse(), Ok(StoreBackend::Mongo));
        assert_eq!(" couchdb ".parse(), Ok(StoreBackend::Couch));
        assert!("redis".parse::<StoreBackend>().is_err());
    }
}
