use axum::{Json, Router, extract::State, routing::get};

use crate::{
    dto::health::{HealthResponse, KeepAliveResponse},
    services::health_service,
    state::SharedState,
};

#[utoipa::path(
    get,
    path = "/healthcheck",
    tag = "health",
    responses((status = 200, description = "Storage status and court integrity", body = HealthResponse))
)]
/// Report degraded mode and whether every court record is consistent.
pub async fn healthcheck(State(state): State<SharedState>) -> Json<HealthResponse> {
    let status = health_service::health_status(&state).await;
    Json(status)
}

#[utoipa::path(
    get,
    path = "/keep-alive",
    tag = "health",
    responses((status = 200, description = "Server is up", body = KeepAliveResponse))
)]
/// Cheap liveness probe.
pub async fn keep_alive() -> Json<KeepAliveResponse> {
    Json(KeepAliveResponse::now())
}

#[utoipa::path(
    post,
    path = "/keep-alive",
    tag = "health",
    responses((status = 200, description = "Server is up", body = KeepAliveResponse))
)]
pub async fn keep_alive_post() -> Json<KeepAliveResponse> {
    Json(KeepAliveResponse::now())
}

/// Configure the health routes subtree.
pub fn router() -> Router<SharedState> {
    Router::<SharedState>::new()
        .route("/healthcheck", get(healthcheck))
        .route("/keep-alive", get(keep_alive).post(keep_alive_post))
}
