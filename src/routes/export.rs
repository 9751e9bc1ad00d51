use axum::{Json, Router, extract::State, routing::get};

use crate::{
    dto::export::TournamentExport, error::AppError, services::export_service, state::SharedState,
};

/// Tournament export route.
pub fn router() -> Router<SharedState> {
    Router::new().route("/export", get(export_tournament))
}

/// Download every court together with the match archive.
#[utoipa::path(
    get,
    path = "/export",
    tag = "history",
    responses(
        (status = 200, description = "Tournament snapshot", body = TournamentExport),
        (status = 503, description = "Storage unavailable")
    )
)]
pub async fn export_tournament(
    State(state): State<SharedState>,
) -> Result<Json<TournamentExport>, AppError> {
    let coordinator = state.coordinator().await?;
    Ok(Json(export_service::export_tournament(&coordinator).await?))
}
