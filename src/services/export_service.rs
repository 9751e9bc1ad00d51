use std::time::SystemTime;

use tracing::info;

use crate::{
    dto::{
        court::{CourtView, SavedMatchView},
        export::TournamentExport,
        format_system_time,
    },
    error::ServiceError,
    services::coordinator::UpdateCoordinator,
};

/// Snapshot every court and the whole match archive. Reads are not locked.
pub async fn export_tournament(
    coordinator: &UpdateCoordinator,
) -> Result<TournamentExport, ServiceError> {
    let courts = coordinator.courts().await?;
    let saved_matches = coordinator.saved_matches().await?;
    info!(
        courts = courts.len(),
        saved_matches = saved_matches.len(),
        "exporting tournament"
    );

    Ok(TournamentExport {
        exported: format_system_time(SystemTime::now()),
        courts: courts.into_iter().map(CourtView::from).collect(),
        saved_matches: saved_matches.into_iter().map(SavedMatchView::from).collect(),
    })
}
