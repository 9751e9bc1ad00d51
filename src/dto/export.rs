use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::dto::court::{CourtView, SavedMatchView};

/// Snapshot of every court and the full match archive.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TournamentExport {
    /// RFC 3339 time the export was taken.
    pub exported: String,
    pub courts: Vec<CourtView>,
    /// Most recent first.
    pub saved_matches: Vec<SavedMatchView>,
}
