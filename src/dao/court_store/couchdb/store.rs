use futures::future::BoxFuture;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::{Serialize, de::DeserializeOwned};

use crate::dao::{
    court_store::{CourtStore, MatchArchive},
    models::{CourtEntity, SavedMatchEntity, sort_newest_first},
    storage::{StorageError, StorageResult},
};

use super::{
    config::CouchConfig,
    error::{CouchDaoError, CouchResult},
    models::{
        AllDocsResponse, COURT_PREFIX, CouchCourtDocument, CouchMatchDocument, END_SUFFIX,
        MATCH_PREFIX, RevisionOnly, court_doc_id,
    },
};

/// Result of a `PUT` that may lose a revision race.
enum PutOutcome {
    Written,
    Conflict,
}

/// Court and match storage in a single CouchDB database.
#[derive(Clone)]
pub struct CouchCourtStore {
    client: Client,
    config: CouchConfig,
}

impl CouchCourtStore {
    /// Build the HTTP client and create the database when it does not exist yet.
    pub async fn connect(config: CouchConfig) -> CouchResult<Self> {
        let client = Client::builder()
            .build()
            .map_err(|source| CouchDaoError::ClientBuilder { source })?;

        let store = Self { client, config };
        store.ensure_database().await?;
        Ok(store)
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.config.credentials {
            Some(credentials) => {
                request.basic_auth(&credentials.username, Some(&credentials.password))
            }
            None => request,
        }
    }

    fn document_url(&self, id: &str) -> String {
        format!("{}/{id}", self.config.database_url())
    }

    async fn send(
        &self,
        operation: &'static str,
        target: &str,
        request: RequestBuilder,
    ) -> CouchResult<Response> {
        self.authorize(request)
            .send()
            .await
            .map_err(|source| CouchDaoError::Transport {
                operation,
                target: target.to_owned(),
                source,
            })
    }

    fn unexpected(operation: &'static str, target: &str, status: StatusCode) -> CouchDaoError {
        CouchDaoError::Status {
            operation,
            target: target.to_owned(),
            status,
        }
    }

    async fn ensure_database(&self) -> CouchResult<()> {
        let url = self.config.database_url();
        let database = self.config.database.as_str();

        let response = self
            .send("database lookup", database, self.client.get(&url))
            .await?;
        match response.status() {
            StatusCode::OK => Ok(()),
            StatusCode::NOT_FOUND => {
                let created = self
                    .send("database creation", database, self.client.put(&url))
                    .await?;
                // 412: created concurrently by another instance.
                match created.status() {
                    status if status.is_success() => Ok(()),
                    StatusCode::PRECONDITION_FAILED => Ok(()),
                    status => Err(Self::unexpected("database creation", database, status)),
                }
            }
            status => Err(Self::unexpected("database lookup", database, status)),
        }
    }

    async fn get_document<T>(&self, id: &str) -> CouchResult<Option<T>>
    where
        T: DeserializeOwned,
    {
        let response = self
            .send("read", id, self.client.get(self.document_url(id)))
            .await?;

        match response.status() {
            StatusCode::NOT_FOUND => Ok(None),
            status if status.is_success() => {
                let body = response
                    .bytes()
                    .await
                    .map_err(|source| CouchDaoError::Body {
                        target: id.to_owned(),
                        source,
                    })?;
                serde_json::from_slice(&body)
                    .map(Some)
                    .map_err(|source| CouchDaoError::Document {
                        id: id.to_owned(),
                        source,
                    })
            }
            status => Err(Self::unexpected("read", id, status)),
        }
    }

    async fn put_document<T>(&self, id: &str, document: &T) -> CouchResult<PutOutcome>
    where
        T: Serialize,
    {
        let response = self
            .send("write", id, self.client.put(self.document_url(id)).json(document))
            .await?;

        match response.status() {
            StatusCode::CONFLICT => Ok(PutOutcome::Conflict),
            status if status.is_success() => Ok(PutOutcome::Written),
            status => Err(Self::unexpected("write", id, status)),
        }
    }

    /// Every document whose id starts with `prefix`, in id order.
    async fn documents_with_prefix<T>(&self, prefix: &str) -> CouchResult<Vec<T>>
    where
        T: DeserializeOwned,
    {
        let url = self.document_url("_all_docs");
        let query = [
            ("include_docs", "true".to_owned()),
            ("startkey", format!("\"{prefix}\"")),
            ("endkey", format!("\"{prefix}{END_SUFFIX}\"")),
        ];

        let response = self
            .send("listing", prefix, self.client.get(url).query(&query))
            .await?;
        if !response.status().is_success() {
            return Err(Self::unexpected("listing", prefix, response.status()));
        }

        let listing = response
            .json::<AllDocsResponse>()
            .await
            .map_err(|source| CouchDaoError::Body {
                target: prefix.to_owned(),
                source,
            })?;

        listing
            .rows
            .into_iter()
            .filter_map(|row| row.doc.map(|doc| (row.id, doc)))
            .map(|(id, doc)| {
                serde_json::from_value(doc).map_err(|source| CouchDaoError::Document { id, source })
            })
            .collect()
    }

    async fn find_court(&self, court_number: u32) -> CouchResult<Option<CourtEntity>> {
        let id = court_doc_id(court_number);
        let document = self.get_document::<CouchCourtDocument>(&id).await?;
        Ok(document.map(|document| document.court))
    }

    async fn save_court(&self, court: CourtEntity) -> CouchResult<()> {
        let mut document = CouchCourtDocument::from_entity(court);
        document.rev = self
            .get_document::<RevisionOnly>(&document.id)
            .await?
            .map(|existing| existing.rev);

        match self.put_document(&document.id, &document).await? {
            PutOutcome::Written => Ok(()),
            PutOutcome::Conflict => Err(CouchDaoError::Conflict { id: document.id }),
        }
    }

    async fn insert_court_if_absent(&self, court: CourtEntity) -> CouchResult<CourtEntity> {
        let document = CouchCourtDocument::from_entity(court);
        match self.put_document(&document.id, &document).await? {
            PutOutcome::Written => Ok(document.court),
            PutOutcome::Conflict => self
                .get_document::<CouchCourtDocument>(&document.id)
                .await?
                .map(|existing| existing.court)
                .ok_or(CouchDaoError::Conflict { id: document.id }),
        }
    }

    async fn append_match(&self, saved: SavedMatchEntity) -> CouchResult<()> {
        let document = CouchMatchDocument::from_entity(saved);
        match self.put_document(&document.id, &document).await? {
            PutOutcome::Written => Ok(()),
            PutOutcome::Conflict => Err(CouchDaoError::Conflict { id: document.id }),
        }
    }

    async fn list_matches(&self) -> CouchResult<Vec<SavedMatchEntity>> {
        let documents = self
            .documents_with_prefix::<CouchMatchDocument>(MATCH_PREFIX)
            .await?;
        let mut matches = documents
            .into_iter()
            .map(|document| document.saved)
            .collect::<Vec<_>>();
        sort_newest_first(&mut matches);
        Ok(matches)
    }

    async fn ping(&self) -> CouchResult<()> {
        let url = self.config.database_url();
        let database = self.config.database.as_str();
        let response = self.send("ping", database, self.client.get(url)).await?;
        if response.status().is_success() {
            Ok(())
        } else {
            Err(Self::unexpected("ping", database, response.status()))
        }
    }
}

impl CourtStore for CouchCourtStore {
    fn find_court(
        &self,
        court_number: u32,
    ) -> BoxFuture<'static, StorageResult<Option<CourtEntity>>> {
        let store = self.clone();
        Box::pin(async move {
            store
                .find_court(court_number)
                .await
                .map_err(StorageError::from)
        })
    }

    fn save_court(&self, court: CourtEntity) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move { store.save_court(court).await.map_err(StorageError::from) })
    }

    fn insert_court_if_absent(
        &self,
        court: CourtEntity,
    ) -> BoxFuture<'static, StorageResult<CourtEntity>> {
        let store = self.clone();
        Box::pin(async move {
            store
                .insert_court_if_absent(court)
                .await
                .map_err(StorageError::from)
        })
    }

    fn list_courts(&self) -> BoxFuture<'static, StorageResult<Vec<CourtEntity>>> {
        let store = self.clone();
        Box::pin(async move {
            let documents = store
                .documents_with_prefix::<CouchCourtDocument>(COURT_PREFIX)
                .await
                .map_err(StorageError::from)?;
            Ok(documents.into_iter().map(|document| document.court).collect())
        })
    }

    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move { store.ping().await.map_err(StorageError::from) })
    }

    fn try_reconnect(&self) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move { store.ensure_database().await.map_err(StorageError::from) })
    }
}

impl MatchArchive for CouchCourtStore {
    fn append_match(&self, saved: SavedMatchEntity) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move { store.append_match(saved).await.map_err(StorageError::from) })
    }

    fn list_matches(&self) -> BoxFuture<'static, StorageResult<Vec<SavedMatchEntity>>> {
        let store = self.clone();
        Box::pin(async move { store.list_matches().await.map_err(StorageError::from) })
    }
}
