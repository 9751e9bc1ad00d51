use axum::{Json, Router, extract::State, routing::get};

use crate::{dto::court::SavedMatchView, error::AppError, state::SharedState};

/// Archived match routes.
pub fn router() -> Router<SharedState> {
    Router::new().route("/history", get(list_history))
}

/// List every saved match, most recent first.
#[utoipa::path(
    get,
    path = "/history",
    tag = "history",
    responses(
        (status = 200, description = "Saved matches, newest first", body = [SavedMatchView]),
        (status = 503, description = "Storage unavailable")
    )
)]
pub async fn list_history(
    State(state): State<SharedState>,
) -> Result<Json<Vec<SavedMatchView>>, AppError> {
    let matches = state.coordinator().await?.saved_matches().await?;
    Ok(Json(matches.into_iter().map(SavedMatchView::from).collect()))
}
