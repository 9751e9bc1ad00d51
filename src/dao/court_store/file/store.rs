use std::{
    io::ErrorKind,
    path::{Path, PathBuf},
    sync::Arc,
};

use futures::future::BoxFuture;
use serde::{Serialize, de::DeserializeOwned};
use tokio::{fs, io::AsyncWriteExt, sync::Mutex};
use tracing::{info, warn};

use crate::dao::{
    court_store::{CourtStore, MatchArchive},
    models::{CourtEntity, SavedMatchEntity, sort_newest_first},
    storage::StorageResult,
};

use super::error::{FileResult, FileStoreError};

const COURTS_DIR: &str = "courts";
const MATCH_LOG: &str = "saved-matches.jsonl";

/// Stores every court in its own JSON document (plus a backup copy) and archives
/// saved matches in an append-only JSON-lines log.
#[derive(Clone)]
pub struct FileCourtStore {
    inner: Arc<FileInner>,
}

struct FileInner {
    root: PathBuf,
    write_gate: Mutex<()>,
}

struct CourtPaths {
    main: PathBuf,
    backup: PathBuf,
}

impl FileCourtStore {
    /// Open (or create) a data directory rooted at `root`.
    pub async fn open(root: impl Into<PathBuf>) -> FileResult<Self> {
        let store = Self {
            inner: Arc::new(FileInner {
                root: root.into(),
                write_gate: Mutex::new(()),
            }),
        };
        store.ensure_layout().await?;
        Ok(store)
    }

    fn courts_dir(&self) -> PathBuf {
        self.inner.root.join(COURTS_DIR)
    }

    fn court_paths(&self, court_number: u32) -> CourtPaths {
        let dir = self.courts_dir();
        CourtPaths {
            main: dir.join(format!("court-{court_number}.json")),
            backup: dir.join(format!("court-{court_number}-backup.json")),
        }
    }

    fn match_log(&self) -> PathBuf {
        self.inner.root.join(MATCH_LOG)
    }

    async fn ensure_layout(&self) -> FileResult<()> {
        let dir = self.courts_dir();
        fs::create_dir_all(&dir)
            .await
            .map_err(|source| FileStoreError::CreateDir { path: dir, source })
    }

    async fn load_court(&self, court_number: u32) -> FileResult<Option<CourtEntity>> {
        let paths = self.court_paths(court_number);
        match read_court_document(&paths.main, court_number).await {
            Ok(Some(court)) => Ok(Some(court)),
            Ok(None) => self.restore_from_backup(court_number, &paths).await,
            Err(err) => {
                warn!(court_number, error = %err, "court document unreadable; trying backup");
                match self.restore_from_backup(court_number, &paths).await {
                    Ok(Some(court)) => Ok(Some(court)),
                    Ok(None) => Err(err),
                    Err(backup_err) => {
                        warn!(court_number, error = %backup_err, "court backup unreadable too");
                        Err(err)
                    }
                }
            }
        }
    }

    async fn restore_from_backup(
        &self,
        court_number: u32,
        paths: &CourtPaths,
    ) -> FileResult<Option<CourtEntity>> {
        let _gate = self.inner.write_gate.lock().await;
        // A writer may have replaced the main document while we waited for the gate.
        if let Ok(Some(current)) = read_court_document(&paths.main, court_number).await {
            return Ok(Some(current));
        }
        let Some(court) = read_court_document(&paths.backup, court_number).await? else {
            return Ok(None);
        };

        write_document(&paths.main, &court).await?;
        info!(court_number, "court document restored from backup");
        Ok(Some(court))
    }

    async fn store_court(&self, court: &CourtEntity) -> FileResult<()> {
        let paths = self.court_paths(court.court_number);
        let _gate = self.inner.write_gate.lock().await;
        write_document(&paths.main, court).await?;
        write_document(&paths.backup, court).await
    }

    async fn store_court_if_absent(&self, court: CourtEntity) -> FileResult<CourtEntity> {
        if let Some(existing) = self.load_court(court.court_number).await? {
            return Ok(existing);
        }

        let paths = self.court_paths(court.court_number);
        let _gate = self.inner.write_gate.lock().await;
        // Another writer may have created the record while we waited for the gate.
        if let Some(existing) = read_court_document(&paths.main, court.court_number).await? {
            return Ok(existing);
        }
        write_document(&paths.main, &court).await?;
        write_document(&paths.backup, &court).await?;
        Ok(court)
    }

    async fn load_all_courts(&self) -> FileResult<Vec<CourtEntity>> {
        let dir = self.courts_dir();
        let mut entries = match fs::read_dir(&dir).await {
            Ok(entries) => entries,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(source) => return Err(FileStoreError::Read { path: dir, source }),
        };

        let mut numbers = Vec::new();
        loop {
            let entry = entries
                .next_entry()
                .await
                .map_err(|source| FileStoreError::Read {
                    path: dir.clone(),
                    source,
                })?;
            let Some(entry) = entry else {
                break;
            };
            if let Some(number) = court_number_from_file_name(&entry.file_name().to_string_lossy())
            {
                numbers.push(number);
            }
        }
        numbers.sort_unstable();

        let mut courts = Vec::with_capacity(numbers.len());
        for number in numbers {
            if let Some(court) = self.load_court(number).await? {
                courts.push(court);
            }
        }
        Ok(courts)
    }

    async fn append_to_log(&self, saved: &SavedMatchEntity) -> FileResult<()> {
        let path = self.match_log();
        let mut line = serde_json::to_vec(saved).map_err(|source| FileStoreError::Encode {
            path: path.clone(),
            source,
        })?;
        line.push(b'\n');

        let _gate = self.inner.write_gate.lock().await;
        let mut file = fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .await
            .map_err(|source| FileStoreError::Write {
                path: path.clone(),
                source,
            })?;
        file.write_all(&line)
            .await
            .map_err(|source| FileStoreError::Write {
                path: path.clone(),
                source,
            })?;
        file.sync_data()
            .await
            .map_err(|source| FileStoreError::Write { path, source })
    }

    async fn read_log(&self) -> FileResult<Vec<SavedMatchEntity>> {
        let path = self.match_log();
        let contents = match fs::read_to_string(&path).await {
            Ok(contents) => contents,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(source) => return Err(FileStoreError::Read { path, source }),
        };

        let mut matches = contents
            .lines()
            .filter(|line| !line.trim().is_empty())
            .map(|line| {
                serde_json::from_str::<SavedMatchEntity>(line).map_err(|source| {
                    FileStoreError::Decode {
                        path: path.clone(),
                        source,
                    }
                })
            })
            .collect::<FileResult<Vec<_>>>()?;
        sort_newest_first(&mut matches);
        Ok(matches)
    }

    async fn check_root(&self) -> FileResult<()> {
        let root = self.inner.root.clone();
        let metadata = fs::metadata(&root)
            .await
            .map_err(|source| FileStoreError::Read {
                path: root.clone(),
                source,
            })?;
        if metadata.is_dir() {
            Ok(())
        } else {
            Err(FileStoreError::NotADirectory { path: root })
        }
    }
}

/// Parse `court-<n>.json`, ignoring backups and temporary files.
fn court_number_from_file_name(name: &str) -> Option<u32> {
    name.strip_prefix("court-")?
        .strip_suffix(".json")?
        .parse()
        .ok()
}

async fn read_court_document(path: &Path, court_number: u32) -> FileResult<Option<CourtEntity>> {
    let Some(court) = read_document::<CourtEntity>(path).await? else {
        return Ok(None);
    };
    if court.court_number != court_number {
        return Err(FileStoreError::Mismatch {
            path: path.to_path_buf(),
            expected: court_number,
            found: court.court_number,
        });
    }
    Ok(Some(court))
}

async fn read_document<T>(path: &Path) -> FileResult<Option<T>>
where
    T: DeserializeOwned,
{
    let bytes = match fs::read(path).await {
        Ok(bytes) => bytes,
        Err(err) if err.kind() == ErrorKind::NotFound => return Ok(None),
        Err(source) => {
            return Err(FileStoreError::Read {
                path: path.to_path_buf(),
                source,
            });
        }
    };

    serde_json::from_slice(&bytes)
        .map(Some)
        .map_err(|source| FileStoreError::Decode {
            path: path.to_path_buf(),
            source,
        })
}

/// Write through a temporary sibling and rename, so readers never see half a document.
async fn write_document<T>(path: &Path, document: &T) -> FileResult<()>
where
    T: ?Sized + Serialize,
{
    let bytes =
        serde_json::to_vec_pretty(document).map_err(|source| FileStoreError::Encode {
            path: path.to_path_buf(),
            source,
        })?;

    let tmp = path.with_extension("json.tmp");
    fs::write(&tmp, &bytes)
        .await
        .map_err(|source| FileStoreError::Write {
            path: tmp.clone(),
            source,
        })?;
    fs::rename(&tmp, path)
        .await
        .map_err(|source| FileStoreError::Write {
            path: path.to_path_buf(),
            source,
        })
}

impl CourtStore for FileCourtStore {
    fn find_court(
        &self,
        court_number: u32,
    ) -> BoxFuture<'static, StorageResult<Option<CourtEntity>>> {
        let store = self.clone();
        Box::pin(async move { store.load_court(court_number).await.map_err(Into::into) })
    }

    fn save_court(&self, court: CourtEntity) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move { store.store_court(&court).await.map_err(Into::into) })
    }

    fn insert_court_if_absent(
        &self,
        court: CourtEntity,
    ) -> BoxFuture<'static, StorageResult<CourtEntity>> {
        let store = self.clone();
        Box::pin(async move { store.store_court_if_absent(court).await.map_err(Into::into) })
    }

    fn list_courts(&self) -> BoxFuture<'static, StorageResult<Vec<CourtEntity>>> {
        let store = self.clone();
        Box::pin(async move { store.load_all_courts().await.map_err(Into::into) })
    }

    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move { store.check_root().await.map_err(Into::into) })
    }

    fn try_reconnect(&self) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move { store.ensure_layout().await.map_err(Into::into) })
    }
}

impl MatchArchive for FileCourtStore {
    fn append_match(&self, saved: SavedMatchEntity) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move { store.append_to_log(&saved).await.map_err(Into::into) })
    }

    fn list_matches(&self) -> BoxFuture<'static, StorageResult<Vec<SavedMatchEntity>>> {
        let store = self.clone();
        Box::pin(async move { store.read_log().await.map_err(Into::into) })
    }
}

#[cfg(test)]
mod tests {
    use std::time::{Duration, SystemTime};

    use uuid::Uuid;

    use super::*;
    use crate::dao::{models::TeamEntity, storage::StorageError};

    fn scratch_dir() -> PathBuf {
        std::env::temp_dir().join(format!("padel-file-store-{}", Uuid::new_v4()))
    }

    fn saved(court_number: u32, saved_at: SystemTime) -> SavedMatchEntity {
        SavedMatchEntity {
            id: Uuid::new_v4(),
            court_number,
            left_team: TeamEntity {
                name: "Falcons".into(),
                score: 6,
            },
            right_team: TeamEntity {
                name: "Hawks".into(),
                score: 4,
            },
            upcoming_left: String::new(),
            upcoming_right: String::new(),
            notes: None,
            saved_at,
        }
    }

    #[test]
    fn parses_only_main_court_documents() {
        assert_eq!(court_number_from_file_name("court-3.json"), Some(3));
        assert_eq!(court_number_from_file_name("court-12.json"), Some(12));
        assert_eq!(court_number_from_file_name("court-3-backup.json"), None);
        assert_eq!(court_number_from_file_name("court-3.json.tmp"), None);
        assert_eq!(court_number_from_file_name("saved-matches.jsonl"), None);
    }

    #[tokio::test]
    async fn missing_court_reads_as_absent() {
        let store = FileCourtStore::open(scratch_dir()).await.unwrap();
        assert!(store.find_court(1).await.unwrap().is_none());
        assert!(store.list_courts().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn saved_court_is_listed_in_order() {
        let store = FileCourtStore::open(scratch_dir()).await.unwrap();
        store.save_court(CourtEntity::initial(2)).await.unwrap();
        store.save_court(CourtEntity::initial(1)).await.unwrap();

        let numbers = store
            .list_courts()
            .await
            .unwrap()
            .into_iter()
            .map(|court| court.court_number)
            .collect::<Vec<_>>();
        assert_eq!(numbers, vec![1, 2]);
    }

    #[tokio::test]
    async fn corrupt_main_document_is_restored_from_backup() {
        let root = scratch_dir();
        let store = FileCourtStore::open(&root).await.unwrap();
        let mut court = CourtEntity::initial(4);
        court.left_team.score = 7;
        store.save_court(court.clone()).await.unwrap();

        let main = root.join(COURTS_DIR).join("court-4.json");
        fs::write(&main, b"{ not json").await.unwrap();

        let restored = store.find_court(4).await.unwrap().unwrap();
        assert_eq!(restored, court);
        let repaired = read_court_document(&main, 4).await.unwrap().unwrap();
        assert_eq!(repaired, court);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn backup_restore_never_overwrites_concurrent_save() {
        let root = scratch_dir();
        let store = FileCourtStore::open(&root).await.unwrap();
        let main = root.join(COURTS_DIR).join("court-1.json");

        for round in 0..100u8 {
            store.save_court(CourtEntity::initial(1)).await.unwrap();
            fs::remove_file(&main).await.unwrap();

            let mut updated = CourtEntity::initial(1);
            updated.left_team.score = round % 90 + 1;

            let reader = tokio::spawn({
                let store = store.clone();
                async move { store.find_court(1).await }
            });
            let writer = tokio::spawn({
                let store = store.clone();
                let updated = updated.clone();
                async move { store.save_court(updated).await }
            });
            reader.await.unwrap().unwrap();
            writer.await.unwrap().unwrap();

            let stored = store.find_court(1).await.unwrap().unwrap();
            assert_eq!(stored, updated, "save lost in round {round}");
        }
    }

    #[tokio::test]
    async fn unreadable_main_and_backup_is_an_error() {
        let root = scratch_dir();
        let store = FileCourtStore::open(&root).await.unwrap();
        store.save_court(CourtEntity::initial(5)).await.unwrap();

        let dir = root.join(COURTS_DIR);
        fs::write(dir.join("court-5.json"), b"garbage").await.unwrap();
        fs::write(dir.join("court-5-backup.json"), b"garbage")
            .await
            .unwrap();

        let err = store.find_court(5).await.unwrap_err();
        assert!(matches!(err, StorageError::Corrupted { .. }));
    }

    #[tokio::test]
    async fn insert_if_absent_keeps_existing_record() {
        let store = FileCourtStore::open(scratch_dir()).await.unwrap();
        let mut court = CourtEntity::initial(1);
        court.right_team.score = 9;
        store.save_court(court.clone()).await.unwrap();

        let stored = store
            .insert_court_if_absent(CourtEntity::initial(1))
            .await
            .unwrap();
        assert_eq!(stored, court);
    }

    #[tokio::test]
    async fn match_log_lists_newest_first() {
        let store = FileCourtStore::open(scratch_dir()).await.unwrap();
        let earlier = SystemTime::now();
        let later = earlier + Duration::from_secs(60);

        store.append_match(saved(1, earlier)).await.unwrap();
        store.append_match(saved(2, later)).await.unwrap();

        let courts = store
            .list_matches()
            .await
            .unwrap()
            .into_iter()
            .map(|entry| entry.court_number)
            .collect::<Vec<_>>();
        assert_eq!(courts, vec![2, 1]);
    }
}
