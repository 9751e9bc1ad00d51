use rand::{Rng, seq::IndexedRandom};
use tracing::info;

use crate::{
    error::ServiceError,
    services::coordinator::{CourtFill, UpdateCoordinator},
    state::court::{Court, TeamName, UpcomingName},
};

const FIRST_NAMES: &[&str] = &[
    "Alex", "Jordan", "Casey", "Taylor", "Morgan", "Riley", "Jamie", "Avery", "Blake", "Cameron",
    "Drew", "Emery", "Finley", "Hayden", "Jesse", "Kai", "Logan", "Micah", "Noah", "Parker",
    "Quinn", "Reese", "Sage", "Skyler", "Tanner", "Val", "Wren", "Zion", "Aria", "Brook",
    "Charlie", "Dana", "Ellis", "Frankie", "Gray", "Harper", "Indigo", "Jules", "Kendall", "Lane",
    "Max", "Nico", "Ocean", "Phoenix", "River", "Storm", "True", "Winter",
];

const LAST_NAMES: &[&str] = &[
    "Smith", "Johnson", "Williams", "Brown", "Jones", "Garcia", "Miller", "Davis", "Rodriguez",
    "Martinez", "Hernandez", "Lopez", "Gonzalez", "Wilson", "Anderson", "Thomas", "Taylor",
    "Moore", "Jackson", "Martin", "Lee", "Perez", "Thompson", "White", "Harris", "Sanchez",
    "Clark", "Ramirez", "Lewis", "Robinson", "Walker", "Young", "Allen", "King", "Wright",
    "Scott", "Torres", "Nguyen", "Hill", "Flores", "Green", "Adams", "Nelson", "Baker", "Hall",
    "Rivera", "Campbell", "Mitchell",
];

const UPCOMING_NAMES: &[&str] = &[
    "Next Player",
    "Waiting",
    "Queue A",
    "Queue B",
    "Standby",
    "Reserve",
    "Next Up",
    "On Deck",
    "Ready",
    "Pending",
    "Listed",
    "Scheduled",
];

/// Highest score handed out to generated matches.
const MAX_GENERATED_SCORE: u8 = 10;

/// Fill every court with random players and scores.
pub async fn populate_test_data(coordinator: &UpdateCoordinator) -> Result<Vec<Court>, ServiceError> {
    // ThreadRng is not Send, so everything random is drawn before the first await.
    let fills = generate_fills(coordinator.court_count())?;
    let courts = coordinator.populate(fills).await?;
    info!(courts = courts.len(), "populated courts with test data");
    Ok(courts)
}

fn generate_fills(court_count: u32) -> Result<Vec<CourtFill>, ServiceError> {
    let mut rng = rand::rng();
    (1..=court_count)
        .map(|court_number| {
            Ok(CourtFill {
                court_number,
                left_name: TeamName::parse(&person_name(&mut rng))?,
                right_name: TeamName::parse(&person_name(&mut rng))?,
                left_score: rng.random_range(0..=MAX_GENERATED_SCORE),
                right_score: rng.random_range(0..=MAX_GENERATED_SCORE),
                upcoming_left: UpcomingName::parse(pick(&mut rng, UPCOMING_NAMES))?,
                upcoming_right: UpcomingName::parse(pick(&mut rng, UPCOMING_NAMES))?,
            })
        })
        .collect()
}

fn person_name<R: Rng + ?Sized>(rng: &mut R) -> String {
    let first = pick(rng, FIRST_NAMES);
    let last = pick(rng, LAST_NAMES);
    format!("{first} {last}")
}

fn pick<'a, R: Rng + ?Sized>(rng: &mut R, names: &[&'a str]) -> &'a str {
    names.choose(rng).copied().unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use std::{sync::Arc, time::Duration};

    use super::*;
    use crate::{
        dao::{court_store::memory::MemoryCourtStore, courts::CourtRepository},
        state::{
            court::{TEAM_NAME_MAX_CHARS, UPCOMING_NAME_MAX_CHARS},
            lock::GlobalLock,
        },
    };

    #[test]
    fn every_generated_name_passes_validation() {
        for first in FIRST_NAMES {
            for last in LAST_NAMES {
                assert!(format!("{first} {last}").chars().count() <= TEAM_NAME_MAX_CHARS);
            }
        }
        for upcoming in UPCOMING_NAMES {
            assert!(upcoming.chars().count() <= UPCOMING_NAME_MAX_CHARS);
        }
    }

    #[tokio::test]
    async fn populate_fills_every_court() {
        let store = MemoryCourtStore::new();
        let coordinator = UpdateCoordinator::new(
            CourtRepository::new(Arc::new(store.clone()), 6),
            Arc::new(store),
            Arc::new(GlobalLock::new(Duration::from_secs(10))),
        );

        let courts = populate_test_data(&coordinator).await.unwrap();
        assert_eq!(courts.len(), 6);
        for court in courts {
            assert!(court.left_team.score <= MAX_GENERATED_SCORE);
            assert!(court.right_team.score <= MAX_GENERATED_SCORE);
            assert!(court.left_team.name.contains(' '));
            assert!(UPCOMING_NAMES.contains(&court.upcoming_left.as_str()));
        }
    }
}
