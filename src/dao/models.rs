use serde::{Deserialize, Serialize};
use std::time::SystemTime;
use uuid::Uuid;

/// Name given to the left team of a court that was never edited.
pub const DEFAULT_LEFT_TEAM_NAME: &str = "Team A";
/// Name given to the right team of a court that was never edited.
pub const DEFAULT_RIGHT_TEAM_NAME: &str = "Team B";

/// Name and score of one side of a court as persisted by the storage layer.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TeamEntity {
    /// Display name of the team.
    pub name: String,
    /// Current score, always within `0..=99`.
    pub score: u8,
}

impl TeamEntity {
    fn fresh(name: &str) -> Self {
        Self {
            name: name.to_owned(),
            score: 0,
        }
    }
}

/// One scoreboard record, keyed by its court number.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CourtEntity {
    /// Immutable identity of the court (1-based).
    pub court_number: u32,
    /// Team displayed on the left half of the board.
    pub left_team: TeamEntity,
    /// Team displayed on the right half of the board.
    pub right_team: TeamEntity,
    /// Team queued to replace the left team (may be empty).
    pub upcoming_left: String,
    /// Team queued to replace the right team (may be empty).
    pub upcoming_right: String,
    /// Last time this record was written.
    pub last_updated: SystemTime,
}

impl CourtEntity {
    /// Default record created the first time a court is accessed.
    pub fn initial(court_number: u32) -> Self {
        Self {
            court_number,
            left_team: TeamEntity::fresh(DEFAULT_LEFT_TEAM_NAME),
            right_team: TeamEntity::fresh(DEFAULT_RIGHT_TEAM_NAME),
            upcoming_left: String::new(),
            upcoming_right: String::new(),
            last_updated: SystemTime::now(),
        }
    }
}

/// Immutable snapshot of a court appended to the match archive.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SavedMatchEntity {
    /// Unique key of the archived entry.
    pub id: Uuid,
    /// Court the snapshot was taken from.
    pub court_number: u32,
    /// Left team at save time.
    pub left_team: TeamEntity,
    /// Right team at save time.
    pub right_team: TeamEntity,
    /// Upcoming left team at save time.
    pub upcoming_left: String,
    /// Upcoming right team at save time.
    pub upcoming_right: String,
    /// Free-form notes typed by the operator.
    #[serde(default)]
    pub notes: Option<String>,
    /// Moment the snapshot was archived.
    pub saved_at: SystemTime,
}

/// Order archived matches (given in insertion order) newest first.
///
/// Entries sharing a timestamp end up in reverse insertion order.
pub fn sort_newest_first(matches: &mut [SavedMatchEntity]) {
    matches.reverse();
    matches.sort_by(|a, b| b.saved_at.cmp(&a.saved_at));
}
