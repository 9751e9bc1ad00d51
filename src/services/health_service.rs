use tracing::warn;

use crate::{
    dto::health::HealthResponse,
    error::ServiceError,
    state::{
        SharedState,
        court::{Court, MAX_SCORE, TeamName, UpcomingName},
    },
};

/// Respond with the storage status and the outcome of the court integrity check.
pub async fn health_status(state: &SharedState) -> HealthResponse {
    match state.backend().await {
        Some(backend) => {
            if let Err(err) = backend.courts().health_check().await {
                warn!(error = %err, "storage health check failed");
            }
        }
        None => warn!("storage unavailable (degraded mode)"),
    }

    if state.is_degraded() {
        return HealthResponse::degraded();
    }

    match check_integrity(state).await {
        Ok(issues) => {
            for issue in &issues {
                warn!(%issue, "court integrity issue");
            }
            HealthResponse::ok(issues.is_empty())
        }
        Err(err) => {
            warn!(error = %err, "integrity check could not read courts");
            HealthResponse::ok(false)
        }
    }
}

/// Load every court and list the records that break the scoreboard rules.
pub async fn check_integrity(state: &SharedState) -> Result<Vec<String>, ServiceError> {
    let coordinator = state.coordinator().await?;
    let courts = coordinator.courts().await?;
    Ok(integrity_issues(&courts, coordinator.court_count()))
}

fn integrity_issues(courts: &[Court], court_count: u32) -> Vec<String> {
    let mut issues = Vec::new();

    if courts.len() != court_count as usize {
        issues.push(format!(
            "expected {court_count} courts, found {}",
            courts.len()
        ));
    }

    for (expected, court) in (1..=court_count).zip(courts) {
        let number = court.court_number;
        if number != expected {
            issues.push(format!("court {number} listed where court {expected} belongs"));
        }
        for team in [&court.left_team, &court.right_team] {
            if team.score > MAX_SCORE {
                issues.push(format!("court {number}: score {} out of range", team.score));
            }
            if !is_stored_team_name(&team.name) {
                issues.push(format!("court {number}: invalid team name {:?}", team.name));
            }
        }
        for upcoming in [&court.upcoming_left, &court.upcoming_right] {
            if !is_stored_upcoming_name(upcoming) {
                issues.push(format!("court {number}: invalid upcoming name {upcoming:?}"));
            }
        }
    }

    issues
}

/// Valid and already trimmed.
fn is_stored_team_name(name: &str) -> bool {
    TeamName::parse(name).is_ok_and(|parsed| parsed.as_str() == name)
}

fn is_stored_upcoming_name(name: &str) -> bool {
    UpcomingName::parse(name).is_ok_and(|parsed| parsed.as_str() == name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dao::models::CourtEntity;

    fn courts(count: u32) -> Vec<Court> {
        (1..=count).map(|n| CourtEntity::initial(n).into()).collect()
    }

    #[test]
    fn default_courts_are_consistent() {
        assert!(integrity_issues(&courts(6), 6).is_empty());
    }

    #[test]
    fn missing_court_and_bad_names_are_reported() {
        let mut courts = courts(5);
        courts[0].left_team.name = " padded ".into();
        courts[1].upcoming_right = "x".repeat(16);
        courts[2].right_team.score = 120;

        let issues = integrity_issues(&courts, 6);
        assert_eq!(issues.len(), 4, "{issues:?}");
    }
}
