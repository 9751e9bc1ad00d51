use std::sync::Arc;

use futures::{TryStreamExt, future::BoxFuture};
use mongodb::{
    Client, Collection, Database,
    bson::doc,
    options::{IndexOptions, ReturnDocument},
};
use tokio::sync::RwLock;

use super::{
    config::MongoConfig,
    connection::establish_connection,
    error::{MongoDaoError, MongoResult},
    models::{MongoCourtDocument, MongoSavedMatchDocument, court_filter},
};
use crate::dao::{
    court_store::{CourtStore, MatchArchive},
    models::{CourtEntity, SavedMatchEntity},
    storage::StorageResult,
};

const COURT_COLLECTION_NAME: &str = "courts";
const MATCH_COLLECTION_NAME: &str = "saved_matches";

#[derive(Clone)]
pub struct MongoCourtStore {
    inner: Arc<MongoInner>,
}

struct MongoInner {
    state: RwLock<MongoState>,
    config: MongoConfig,
}

struct MongoState {
    client: Client,
    database: Database,
}

impl MongoInner {
    async fn ping(&self) -> MongoResult<()> {
        let database = {
            let guard = self.state.read().await;
            guard.database.clone()
        };

        database
            .run_command(doc! { "ping": 1 })
            .await
            .map_err(|source| MongoDaoError::HealthPing { source })?;
        Ok(())
    }

    async fn reconnect(&self) -> MongoResult<()> {
        let (client, database) =
            establish_connection(&self.config.options, &self.config.database_name).await?;
        let mut guard = self.state.write().await;
        guard.client = client;
        guard.database = database;
        Ok(())
    }
}

impl MongoCourtStore {
    /// Establish a connection to MongoDB and ensure indexes are present.
    pub async fn connect(config: MongoConfig) -> MongoResult<Self> {
        let (client, database) =
            establish_connection(&config.options, &config.database_name).await?;

        let inner = Arc::new(MongoInner {
            state: RwLock::new(MongoState { client, database }),
            config,
        });

        let store = Self { inner };
        store.ensure_indexes().await?;
        Ok(store)
    }

    async fn ensure_indexes(&self) -> MongoResult<()> {
        let collection = self.match_collection().await;
        let index = mongodb::IndexModel::builder()
            .keys(doc! {"saved_at": -1})
            .options(
                IndexOptions::builder()
                    .name(Some("saved_at_desc_idx".to_owned()))
                    .build(),
            )
            .build();

        collection
            .create_index(index)
            .await
            .map_err(|source| MongoDaoError::EnsureIndex {
                collection: MATCH_COLLECTION_NAME,
                index: "saved_at",
                source,
            })?;

        Ok(())
    }

    async fn court_collection(&self) -> Collection<MongoCourtDocument> {
        let guard = self.inner.state.read().await;
        guard
            .database
            .collection::<MongoCourtDocument>(COURT_COLLECTION_NAME)
    }

    async fn match_collection(&self) -> Collection<MongoSavedMatchDocument> {
        let guard = self.inner.state.read().await;
        guard
            .database
            .collection::<MongoSavedMatchDocument>(MATCH_COLLECTION_NAME)
    }

    async fn find_court(&self, court_number: u32) -> MongoResult<Option<CourtEntity>> {
        let collection = self.court_collection().await;
        let document = collection
            .find_one(court_filter(court_number))
            .await
            .map_err(|source| MongoDaoError::LoadCourt {
                court_number,
                source,
            })?;

        document.map(CourtEntity::try_from).transpose()
    }

    async fn save_court(&self, court: CourtEntity) -> MongoResult<()> {
        let court_number = court.court_number;
        let document: MongoCourtDocument = court.into();
        let collection = self.court_collection().await;
        collection
            .replace_one(court_filter(court_number), &document)
            .upsert(true)
            .await
            .map_err(|source| MongoDaoError::SaveCourt {
                court_number,
                source,
            })?;

        Ok(())
    }

    async fn insert_court_if_absent(&self, court: CourtEntity) -> MongoResult<CourtEntity> {
        let court_number = court.court_number;
        let document: MongoCourtDocument = court.into();
        let mut insert = mongodb::bson::serialize_to_document(&document).map_err(|err| {
            MongoDaoError::Corrupted {
                key: format!("{COURT_COLLECTION_NAME}/{court_number}"),
                reason: err.to_string(),
            }
        })?;
        insert.remove("_id");

        let collection = self.court_collection().await;
        let stored = collection
            .find_one_and_update(court_filter(court_number), doc! {"$setOnInsert": insert})
            .upsert(true)
            .return_document(ReturnDocument::After)
            .await
            .map_err(|source| MongoDaoError::SaveCourt {
                court_number,
                source,
            })?;

        match stored {
            Some(document) => document.try_into(),
            None => Err(MongoDaoError::Corrupted {
                key: format!("{COURT_COLLECTION_NAME}/{court_number}"),
                reason: "upsert returned no document".into(),
            }),
        }
    }

    async fn list_courts(&self) -> MongoResult<Vec<CourtEntity>> {
        let collection = self.court_collection().await;
        let documents: Vec<MongoCourtDocument> = collection
            .find(doc! {})
            .sort(doc! {"_id": 1})
            .await
            .map_err(|source| MongoDaoError::ListCourts { source })?
            .try_collect()
            .await
            .map_err(|source| MongoDaoError::ListCourts { source })?;

        documents.into_iter().map(CourtEntity::try_from).collect()
    }

    async fn append_match(&self, saved: SavedMatchEntity) -> MongoResult<()> {
        let id = saved.id;
        let document: MongoSavedMatchDocument = saved.into();
        let collection = self.match_collection().await;
        collection
            .insert_one(&document)
            .await
            .map_err(|source| MongoDaoError::AppendMatch { id, source })?;
        Ok(())
    }

    async fn list_matches(&self) -> MongoResult<Vec<SavedMatchEntity>> {
        let collection = self.match_collection().await;
        let documents: Vec<MongoSavedMatchDocument> = collection
            .find(doc! {})
            .sort(doc! {"saved_at": -1})
            .await
            .map_err(|source| MongoDaoError::ListMatches { source })?
            .try_collect()
            .await
            .map_err(|source| MongoDaoError::ListMatches { source })?;

        documents
            .into_iter()
            .map(SavedMatchEntity::try_from)
            .collect()
    }
}

impl CourtStore for MongoCourtStore {
    fn find_court(
        &self,
        court_number: u32,
    ) -> BoxFuture<'static, StorageResult<Option<CourtEntity>>> {
        let store = self.clone();
        Box::pin(async move { store.find_court(court_number).await.map_err(Into::into) })
    }

    fn save_court(&self, court: CourtEntity) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move { store.save_court(court).await.map_err(Into::into) })
    }

    fn insert_court_if_absent(
        &self,
        court: CourtEntity,
    ) -> BoxFuture<'static, StorageResult<CourtEntity>> {
        let store = self.clone();
        Box::pin(async move { store.insert_court_if_absent(court).await.map_err(Into::into) })
    }

    fn list_courts(&self) -> BoxFuture<'static, StorageResult<Vec<CourtEntity>>> {
        let store = self.clone();
        Box::pin(async move { store.list_courts().await.map_err(Into::into) })
    }

    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move { store.inner.ping().await.map_err(Into::into) })
    }

    fn try_reconnect(&self) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move { store.inner.reconnect().await.map_err(Into::into) })
    }
}

impl MatchArchive for MongoCourtStore {
    fn append_match(&self, saved: SavedMatchEntity) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move { store.append_match(saved).await.map_err(Into::into) })
    }

    fn list_matches(&self) -> BoxFuture<'static, StorageResult<Vec<SavedMatchEntity>>> {
        let store = self.clone();
        Box::pin(async move { store.list_matches().await.map_err(Into::into) })
    }
}
