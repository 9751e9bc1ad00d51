use axum::{
    Json, Router,
    extract::{
        Path, Query, State,
        rejection::{JsonRejection, QueryRejection},
    },
    response::{IntoResponse, Response},
    routing::{get, post},
};
use axum_valid::{Valid, ValidRejection};

use crate::{
    dto::court::{
        CourtAction, CourtQuery, CourtView, SaveMatchRequest, SavedMatchView, UpdateNamesRequest,
    },
    error::AppError,
    services::test_data,
    state::SharedState,
};

/// Court read and mutation routes.
pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/courts", get(list_courts).post(court_action))
        .route("/courts/{court_number}", get(get_court))
        .route("/courts/update-names", post(update_names))
        .route("/courts/save-match", post(save_match))
        .route("/courts/populate-test-data", post(populate_test_data))
}

/// List every court, or a single one when `courtId` is given.
#[utoipa::path(
    get,
    path = "/courts",
    tag = "courts",
    params(CourtQuery),
    responses(
        (status = 200, description = "All courts in ascending order, or the requested court", body = [CourtView]),
        (status = 404, description = "Court number out of range"),
        (status = 503, description = "Storage unavailable")
    )
)]
pub async fn list_courts(
    State(state): State<SharedState>,
    query: Result<Query<CourtQuery>, QueryRejection>,
) -> Result<Response, AppError> {
    let Query(query) = query?;
    let coordinator = state.coordinator().await?;

    if let Some(court_id) = query.court_id {
        let court = coordinator.court(court_number(court_id)?).await?;
        return Ok(Json(CourtView::from(court)).into_response());
    }

    let courts = coordinator.courts().await?;
    let views = courts.into_iter().map(CourtView::from).collect::<Vec<_>>();
    Ok(Json(views).into_response())
}

/// Fetch one court by number.
#[utoipa::path(
    get,
    path = "/courts/{court_number}",
    tag = "courts",
    params(("court_number" = i64, Path, description = "Court number, starting at 1")),
    responses(
        (status = 200, description = "Court state", body = CourtView),
        (status = 404, description = "Court number out of range")
    )
)]
pub async fn get_court(
    State(state): State<SharedState>,
    Path(court_id): Path<i64>,
) -> Result<Json<CourtView>, AppError> {
    let court = state
        .coordinator()
        .await?
        .court(court_number(court_id)?)
        .await?;
    Ok(Json(court.into()))
}

/// Apply one scoreboard mutation selected by `action`.
#[utoipa::path(
    post,
    path = "/courts",
    tag = "courts",
    request_body = CourtAction,
    responses(
        (status = 200, description = "Updated court, or every court for resetAllCourts", body = CourtView),
        (status = 400, description = "Malformed body, unknown action or invalid name"),
        (status = 404, description = "Court number out of range"),
        (status = 423, description = "Another update is in progress; retry"),
        (status = 500, description = "Storage failure")
    )
)]
pub async fn court_action(
    State(state): State<SharedState>,
    payload: Result<Json<CourtAction>, JsonRejection>,
) -> Result<Response, AppError> {
    let Json(action) = payload?;
    let coordinator = state.coordinator().await?;

    let court = match action {
        CourtAction::IncrementScore { court_number: id, side } => {
            coordinator.increment_score(court_number(id)?, side).await?
        }
        CourtAction::DecrementScore { court_number: id, side } => {
            coordinator.decrement_score(court_number(id)?, side).await?
        }
        CourtAction::ResetScores { court_number: id } => {
            coordinator.reset_scores(court_number(id)?).await?
        }
        CourtAction::ResetAllCourts => {
            let courts = coordinator.reset_all_scores().await?;
            let views = courts.into_iter().map(CourtView::from).collect::<Vec<_>>();
            return Ok(Json(views).into_response());
        }
        CourtAction::UpdateTeamName {
            court_number: id,
            side,
            name,
        } => {
            coordinator
                .update_team_name(court_number(id)?, side, &name)
                .await?
        }
        CourtAction::UpdateUpcomingTeam {
            court_number: id,
            side,
            name,
        } => {
            coordinator
                .update_upcoming_team(court_number(id)?, side, &name)
                .await?
        }
    };

    Ok(Json(CourtView::from(court)).into_response())
}

/// Rename both teams of a court at once.
#[utoipa::path(
    post,
    path = "/courts/update-names",
    tag = "courts",
    request_body = UpdateNamesRequest,
    responses(
        (status = 200, description = "Updated court", body = CourtView),
        (status = 400, description = "Invalid team name"),
        (status = 404, description = "Court number out of range"),
        (status = 423, description = "Another update is in progress; retry")
    )
)]
pub async fn update_names(
    State(state): State<SharedState>,
    payload: Result<Json<UpdateNamesRequest>, JsonRejection>,
) -> Result<Json<CourtView>, AppError> {
    let Json(request) = payload?;
    let court = state
        .coordinator()
        .await?
        .update_team_names(
            court_number(request.court_number)?,
            &request.left_name,
            &request.right_name,
        )
        .await?;
    Ok(Json(court.into()))
}

/// Archive the current state of a court.
#[utoipa::path(
    post,
    path = "/courts/save-match",
    tag = "history",
    request_body = SaveMatchRequest,
    responses(
        (status = 200, description = "The archived snapshot", body = SavedMatchView),
        (status = 400, description = "Notes too long or malformed body"),
        (status = 404, description = "Court number out of range"),
        (status = 423, description = "Another update is in progress; retry"),
        (status = 500, description = "Storage failure")
    )
)]
pub async fn save_match(
    State(state): State<SharedState>,
    payload: Result<Valid<Json<SaveMatchRequest>>, ValidRejection<JsonRejection>>,
) -> Result<Json<SavedMatchView>, AppError> {
    let Valid(Json(request)) = payload?;
    let saved = state
        .coordinator()
        .await?
        .save_match(court_number(request.court_number)?, request.notes.as_deref())
        .await?;

    Ok(Json(saved.into()))
}

/// Fill every court with random players and scores.
#[utoipa::path(
    post,
    path = "/courts/populate-test-data",
    tag = "courts",
    responses(
        (status = 200, description = "Courts after population", body = [CourtView]),
        (status = 423, description = "Another update is in progress; retry")
    )
)]
pub async fn populate_test_data(
    State(state): State<SharedState>,
) -> Result<Json<Vec<CourtView>>, AppError> {
    let coordinator = state.coordinator().await?;
    let courts = test_data::populate_test_data(&coordinator).await?;
    Ok(Json(courts.into_iter().map(CourtView::from).collect()))
}

/// Court numbers arrive as signed integers; anything outside `u32` names no court.
fn court_number(raw: i64) -> Result<u32, AppError> {
    u32::try_from(raw).map_err(|_| AppError::NotFound(format!("court {raw} does not exist")))
}
