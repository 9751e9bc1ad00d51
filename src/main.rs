//! Padel scoreboard binary entrypoint wiring configuration, storage supervision and the REST API.

use std::{env, future::Future, net::SocketAddr};

use anyhow::Context;
use axum::Router;
use futures::{FutureExt, future::BoxFuture};
use tokio::net::TcpListener;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use padel_scoreboard_back::{
    config::{AppConfig, StoreBackend},
    dao::{
        court_store::{Backend, file::FileCourtStore},
        storage::StorageError,
    },
    routes,
    services::storage_supervisor,
    state::{AppState, SharedState},
};

type Connector = Box<dyn FnMut() -> BoxFuture<'static, Result<Backend, StorageError>> + Send>;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let config = AppConfig::load();
    let connector = backend_connector(&config)?;
    info!(
        store = ?config.store(),
        court_count = config.court_count(),
        lock_timeout_ms = config.lock_timeout().as_millis() as u64,
        "starting padel scoreboard"
    );

    let app_state = AppState::new(config);
    tokio::spawn(storage_supervisor::run(app_state.clone(), connector));

    // Build the HTTP router once the shared state is ready.
    let app = build_router(app_state);

    let port = env::var("PORT")
        .or_else(|_| env::var("SERVER_PORT"))
        .ok()
        .and_then(|value| value.parse::<u16>().ok())
        .unwrap_or(8080);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    info!(%addr, "starting server");

    let listener = TcpListener::bind(addr).await.context("binding server")?;
    let service = app.into_make_service();
    axum::serve(listener, service)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("serving axum")?;

    Ok(())
}

/// Build the closure the storage supervisor calls to (re)connect the configured backend.
fn backend_connector(config: &AppConfig) -> anyhow::Result<Connector> {
    match config.store() {
        StoreBackend::Memory => Ok(connector(|| async {
            Ok::<_, StorageError>(Backend::memory())
        })),
        StoreBackend::File => {
            let root = config.data_dir().clone();
            Ok(connector(move || {
                let root = root.clone();
                async move {
                    let store = FileCourtStore::open(root).await?;
                    Ok::<_, StorageError>(Backend::new(store))
                }
            }))
        }
        #[cfg(feature = "mongo-store")]
        StoreBackend::Mongo => {
            use padel_scoreboard_back::dao::court_store::mongodb::{MongoConfig, MongoCourtStore};

            Ok(connector(|| async {
                let config = MongoConfig::from_env().await?;
                let store = MongoCourtStore::connect(config).await?;
                Ok::<_, StorageError>(Backend::new(store))
            }))
        }
        #[cfg(feature = "couch-store")]
        StoreBackend::Couch => {
            use padel_scoreboard_back::dao::court_store::couchdb::{CouchConfig, CouchCourtStore};

            Ok(connector(|| async {
                let config = CouchConfig::from_env()?;
                let store = CouchCourtStore::connect(config).await?;
                Ok::<_, StorageError>(Backend::new(store))
            }))
        }
        #[allow(unreachable_patterns)]
        other => anyhow::bail!("store backend {other:?} is not compiled into this binary"),
    }
}

fn connector<F, Fut>(mut connect: F) -> Connector
where
    F: FnMut() -> Fut + Send + 'static,
    Fut: Future<Output = Result<Backend, StorageError>> + Send + 'static,
{
    Box::new(move || connect().boxed())
}

/// Build the top-level router and attach cross-cutting middleware layers.
fn build_router(state: SharedState) -> Router<()> {
    routes::router(state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

/// Configure tracing subscribers so logs include spans by default.
fn init_tracing() {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "info,tower_http=debug".into());
    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

/// Wait for Ctrl+C or SIGTERM and shut the server down gracefully.
async fn shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal};

        match signal(SignalKind::terminate()) {
            Ok(mut term) => {
                tokio::select! {
                    _ = tokio::signal::ctrl_c() => {},
                    _ = term.recv() => {},
                }
            }
            Err(_) => {
                let _ = tokio::signal::ctrl_c().await;
            }
        }
    }

    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }
}
