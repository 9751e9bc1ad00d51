//! Scoreboard domain model and the mutation rules applied before anything is persisted.

use std::time::SystemTime;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::dao::models::{CourtEntity, SavedMatchEntity, TeamEntity};

/// Highest score a team can display.
pub const MAX_SCORE: u8 = 99;
/// Maximum length of a team name, in characters, after trimming.
pub const TEAM_NAME_MAX_CHARS: usize = 20;
/// Maximum length of an upcoming team name, in characters, after trimming.
pub const UPCOMING_NAME_MAX_CHARS: usize = 15;
/// Maximum length of the notes attached to a saved match.
pub const MATCH_NOTES_MAX_CHARS: usize = 500;

/// Half of the board a team is displayed on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Left,
    Right,
}

/// Direction of a single-point score change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScoreChange {
    Increment,
    Decrement,
}

/// Reason a requested mutation was refused.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RuleViolation {
    #[error("team name must not be empty")]
    EmptyTeamName,
    #[error("team name must be 1-{max} characters (got {len})")]
    TeamNameTooLong { len: usize, max: usize },
    #[error("upcoming team name must be at most {max} characters (got {len})")]
    UpcomingNameTooLong { len: usize, max: usize },
    #[error("match notes must be at most {max} characters (got {len})")]
    NotesTooLong { len: usize, max: usize },
}

/// Name and score for one side of a court.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Team {
    pub name: String,
    pub score: u8,
}

/// Live state of one court.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Court {
    pub court_number: u32,
    pub left_team: Team,
    pub right_team: Team,
    pub upcoming_left: String,
    pub upcoming_right: String,
    pub last_updated: SystemTime,
}

impl Court {
    pub fn team(&self, side: Side) -> &Team {
        match side {
            Side::Left => &self.left_team,
            Side::Right => &self.right_team,
        }
    }

    pub fn team_mut(&mut self, side: Side) -> &mut Team {
        match side {
            Side::Left => &mut self.left_team,
            Side::Right => &mut self.right_team,
        }
    }

    pub fn upcoming(&self, side: Side) -> &str {
        match side {
            Side::Left => &self.upcoming_left,
            Side::Right => &self.upcoming_right,
        }
    }

    fn upcoming_mut(&mut self, side: Side) -> &mut String {
        match side {
            Side::Left => &mut self.upcoming_left,
            Side::Right => &mut self.upcoming_right,
        }
    }

    /// Move a score one point up or down, saturating at `0` and [`MAX_SCORE`].
    pub fn apply_score_change(&mut self, side: Side, change: ScoreChange) {
        let team = self.team_mut(side);
        team.score = match change {
            ScoreChange::Increment => team.score.saturating_add(1).min(MAX_SCORE),
            ScoreChange::Decrement => team.score.saturating_sub(1),
        };
    }

    pub fn reset_scores(&mut self) {
        self.left_team.score = 0;
        self.right_team.score = 0;
    }

    /// Store an already-normalized team name.
    pub fn rename_team(&mut self, side: Side, name: TeamName) {
        self.team_mut(side).name = name.0;
    }

    /// Store an already-normalized upcoming team name.
    pub fn set_upcoming(&mut self, side: Side, name: UpcomingName) {
        *self.upcoming_mut(side) = name.0;
    }

    /// Overwrite both scores, clamping to [`MAX_SCORE`].
    pub fn set_scores(&mut self, left: u8, right: u8) {
        self.left_team.score = left.min(MAX_SCORE);
        self.right_team.score = right.min(MAX_SCORE);
    }
}

/// A team name that passed validation (trimmed, 1..=20 characters).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TeamName(String);

impl TeamName {
    pub fn parse(raw: &str) -> Result<Self, RuleViolation> {
        let trimmed = raw.trim();
        let len = trimmed.chars().count();
        if len == 0 {
            return Err(RuleViolation::EmptyTeamName);
        }
        if len > TEAM_NAME_MAX_CHARS {
            return Err(RuleViolation::TeamNameTooLong {
                len,
                max: TEAM_NAME_MAX_CHARS,
            });
        }
        Ok(Self(trimmed.to_owned()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// An upcoming team name that passed validation (trimmed, 0..=15 characters).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpcomingName(String);

impl UpcomingName {
    pub fn parse(raw: &str) -> Result<Self, RuleViolation> {
        let trimmed = raw.trim();
        let len = trimmed.chars().count();
        if len > UPCOMING_NAME_MAX_CHARS {
            return Err(RuleViolation::UpcomingNameTooLong {
                len,
                max: UPCOMING_NAME_MAX_CHARS,
            });
        }
        Ok(Self(trimmed.to_owned()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Trim match notes, dropping them when blank.
pub fn normalize_notes(raw: Option<&str>) -> Result<Option<String>, RuleViolation> {
    let Some(trimmed) = raw.map(str::trim).filter(|notes| !notes.is_empty()) else {
        return Ok(None);
    };
    let len = trimmed.chars().count();
    if len > MATCH_NOTES_MAX_CHARS {
        return Err(RuleViolation::NotesTooLong {
            len,
            max: MATCH_NOTES_MAX_CHARS,
        });
    }
    Ok(Some(trimmed.to_owned()))
}

/// Immutable archive entry captured from a court.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SavedMatch {
    pub id: Uuid,
    pub court_number: u32,
    pub left_team: Team,
    pub right_team: Team,
    pub upcoming_left: String,
    pub upcoming_right: String,
    pub notes: Option<String>,
    pub saved_at: SystemTime,
}

impl SavedMatch {
    /// Snapshot the current state of `court`.
    pub fn capture(court: &Court, notes: Option<String>, saved_at: SystemTime) -> Self {
        Self {
            id: Uuid::new_v4(),
            court_number: court.court_number,
            left_team: court.left_team.clone(),
            right_team: court.right_team.clone(),
            upcoming_left: court.upcoming_left.clone(),
            upcoming_right: court.upcoming_right.clone(),
            notes,
            saved_at,
        }
    }
}

impl From<TeamEntity> for Team {
    fn from(value: TeamEntity) -> Self {
        Self {
            name: value.name,
            score: value.score.min(MAX_SCORE),
        }
    }
}

impl From<Team> for TeamEntity {
    fn from(value: Team) -> Self {
        Self {
            name: value.name,
            score: value.score,
        }
    }
}

impl From<CourtEntity> for Court {
    fn from(value: CourtEntity) -> Self {
        Self {
            court_number: value.court_number,
            left_team: value.left_team.into(),
            right_team: value.right_team.into(),
            upcoming_left: value.upcoming_left,
            upcoming_right: value.upcoming_right,
            last_updated: value.last_updated,
        }
    }
}

impl From<Court> for CourtEntity {
    fn from(value: Court) -> Self {
        Self {
            court_number: value.court_number,
            left_team: value.left_team.into(),
            right_team: value.right_team.into(),
            upcoming_left: value.upcoming_left,
            upcoming_right: value.upcoming_right,
            last_updated: value.last_updated,
        }
    }
}

impl From<SavedMatchEntity> for SavedMatch {
    fn from(value: SavedMatchEntity) -> Self {
        Self {
            id: value.id,
            court_number: value.court_number,
            left_team: value.left_team.into(),
            right_team: value.right_team.into(),
            upcoming_left: value.upcoming_left,
            upcoming_right: value.upcoming_right,
            notes: value.notes,
            saved_at: value.saved_at,
        }
    }
}

impl From<SavedMatch> for SavedMatchEntity {
    fn from(value: SavedMatch) -> Self {
        Self {
            id: value.id,
            court_number: value.court_number,
            left_team: value.left_team.into(),
            right_team: value.right_team.into(),
            upcoming_left: value.upcoming_left,
            upcoming_right: value.upcoming_right,
            notes: value.notes,
            saved_at: value.saved_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn court_with_scores(left: u8, right: u8) -> Court {
        let mut court: Court = CourtEntity::initial(1).into();
        court.set_scores(left, right);
        court
    }

    #[test]
    fn increment_then_decrement_round_trips_inside_bounds() {
        for start in 0..MAX_SCORE {
            let mut court = court_with_scores(start, 0);
            court.apply_score_change(Side::Left, ScoreChange::Increment);
            court.apply_score_change(Side::Left, ScoreChange::Decrement);
            assert_eq!(court.left_team.score, start);
        }
    }

    #[test]
    fn scores_saturate_at_bounds() {
        let mut court = court_with_scores(MAX_SCORE, 0);
        court.apply_score_change(Side::Left, ScoreChange::Increment);
        court.apply_score_change(Side::Right, ScoreChange::Decrement);
        assert_eq!(court.left_team.score, MAX_SCORE);
        assert_eq!(court.right_team.score, 0);
    }

    #[test]
    fn set_scores_clamps() {
        let court = court_with_scores(150, 3);
        assert_eq!(court.left_team.score, MAX_SCORE);
        assert_eq!(court.right_team.score, 3);
    }

    #[test]
    fn team_name_is_trimmed() {
        let name = TeamName::parse("  Falcons ").unwrap();
        assert_eq!(name.as_str(), "Falcons");
    }

    #[test]
    fn team_name_bounds() {
        assert_eq!(TeamName::parse(""), Err(RuleViolation::EmptyTeamName));
        assert_eq!(TeamName::parse("   "), Err(RuleViolation::EmptyTeamName));
        assert!(TeamName::parse("x").is_ok());
        assert!(TeamName::parse(&"x".repeat(20)).is_ok());
        assert_eq!(
            TeamName::parse(&"x".repeat(21)),
            Err(RuleViolation::TeamNameTooLong { len: 21, max: 20 })
        );
        // Surrounding whitespace does not count towards the limit.
        assert!(TeamName::parse(&format!("  {}  ", "x".repeat(20))).is_ok());
    }

    #[test]
    fn team_name_length_counts_characters() {
        assert!(TeamName::parse(&"é".repeat(20)).is_ok());
        assert!(TeamName::parse(&"é".repeat(21)).is_err());
    }

    #[test]
    fn upcoming_name_bounds() {
        assert_eq!(UpcomingName::parse("").unwrap().as_str(), "");
        assert_eq!(UpcomingName::parse("  Owls ").unwrap().as_str(), "Owls");
        assert!(UpcomingName::parse(&"y".repeat(15)).is_ok());
        assert_eq!(
            UpcomingName::parse(&"y".repeat(16)),
            Err(RuleViolation::UpcomingNameTooLong { len: 16, max: 15 })
        );
    }

    #[test]
    fn notes_are_trimmed_and_bounded() {
        assert_eq!(normalize_notes(None), Ok(None));
        assert_eq!(normalize_notes(Some("   ")), Ok(None));
        assert_eq!(
            normalize_notes(Some(" great match ")),
            Ok(Some("great match".into()))
        );
        assert!(normalize_notes(Some(&"n".repeat(500))).is_ok());
        assert_eq!(
            normalize_notes(Some(&"n".repeat(501))),
            Err(RuleViolation::NotesTooLong { len: 501, max: 500 })
        );
    }

    #[test]
    fn rename_and_upcoming_target_the_requested_side() {
        let mut court = court_with_scores(0, 0);
        court.rename_team(Side::Right, TeamName::parse("Hawks").unwrap());
        court.set_upcoming(Side::Left, UpcomingName::parse("Owls").unwrap());
        assert_eq!(court.team(Side::Right).name, "Hawks");
        assert_eq!(court.team(Side::Left).name, "Team A");
        assert_eq!(court.upcoming(Side::Left), "Owls");
        assert_eq!(court.upcoming(Side::Right), "");
    }
}
