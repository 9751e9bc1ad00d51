use reqwest::StatusCode;
use thiserror::Error;

pub type CouchResult<T> = Result<T, CouchDaoError>;

/// Failures of the CouchDB court backend.
#[derive(Debug, Error)]
pub enum CouchDaoError {
    #[error("missing CouchDB environment variable `{var}`")]
    MissingEnvVar { var: &'static str },
    #[error("failed to build CouchDB client")]
    ClientBuilder {
        #[source]
        source: reqwest::Error,
    },
    /// The request never got a response.
    #[error("CouchDB {operation} on `{target}` failed")]
    Transport {
        operation: &'static str,
        target: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("CouchDB {operation} on `{target}` returned {status}")]
    Status {
        operation: &'static str,
        target: String,
        status: StatusCode,
    },
    /// Another writer created the document first.
    #[error("CouchDB document `{id}` was written concurrently")]
    Conflict { id: String },
    /// The response body is not the JSON CouchDB is expected to send.
    #[error("unreadable CouchDB response for `{target}`")]
    Body {
        target: String,
        #[source]
        source: reqwest::Error,
    },
    /// A stored document does not match the court or match layout.
    #[error("CouchDB document `{id}` is not a valid record")]
    Document {
        id: String,
        #[source]
        source: serde_json::Error,
    },
}
