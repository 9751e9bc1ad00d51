use utoipa::OpenApi;

#[derive(OpenApi)]
/// Aggregated OpenAPI specification for the padel scoreboard.
#[openapi(
    paths(
        crate::routes::health::healthcheck,
        crate::routes::health::keep_alive,
        crate::routes::health::keep_alive_post,
        crate::routes::courts::list_courts,
        crate::routes::courts::get_court,
        crate::routes::courts::court_action,
        crate::routes::courts::update_names,
        crate::routes::courts::save_match,
        crate::routes::courts::populate_test_data,
        crate::routes::history::list_history,
        crate::routes::export::export_tournament,
    ),
    components(
        schemas(
            crate::dto::health::HealthResponse,
            crate::dto::health::KeepAliveResponse,
            crate::dto::court::CourtView,
            crate::dto::court::TeamView,
            crate::dto::court::SavedMatchView,
            crate::dto::court::CourtAction,
            crate::dto::court::UpdateNamesRequest,
            crate::dto::court::SaveMatchRequest,
            crate::dto::export::TournamentExport,
            crate::state::court::Side,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "courts", description = "Live court scores and team names"),
        (name = "history", description = "Archived matches and exports"),
    )
)]
pub struct ApiDoc;
