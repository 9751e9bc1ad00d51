//! Wire types for the court and match history endpoints.

use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use crate::{
    dto::{format_system_time, validation::validate_notes},
    state::court::{Court, SavedMatch, Side, Team},
};

/// Name and score of one team as shown on the board.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct TeamView {
    pub name: String,
    pub score: u8,
}

/// Full state of one court.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CourtView {
    pub court_number: u32,
    pub left_team: TeamView,
    pub right_team: TeamView,
    pub upcoming_left: String,
    pub upcoming_right: String,
    /// RFC 3339 timestamp of the last write.
    pub last_updated: String,
}

/// Archived snapshot of a court.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SavedMatchView {
    pub id: Uuid,
    pub court_number: u32,
    pub left_team: TeamView,
    pub right_team: TeamView,
    pub upcoming_left: String,
    pub upcoming_right: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    /// RFC 3339 timestamp of the save.
    pub saved_at: String,
}

/// Query accepted by `GET /courts`.
#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct CourtQuery {
    /// Return only this court instead of the full list.
    pub court_id: Option<i64>,
}

/// Mutation requested through `POST /courts`, selected by its `action` field.
#[derive(Debug, Deserialize, ToSchema)]
#[serde(tag = "action", rename_all = "camelCase")]
pub enum CourtAction {
    #[serde(rename_all = "camelCase")]
    IncrementScore { court_number: i64, side: Side },
    #[serde(rename_all = "camelCase")]
    DecrementScore { court_number: i64, side: Side },
    #[serde(rename_all = "camelCase")]
    ResetScores { court_number: i64 },
    ResetAllCourts,
    #[serde(rename_all = "camelCase")]
    UpdateTeamName {
        court_number: i64,
        side: Side,
        name: String,
    },
    #[serde(rename_all = "camelCase")]
    UpdateUpcomingTeam {
        court_number: i64,
        side: Side,
        /// Omitted or blank clears the label.
        #[serde(default)]
        name: String,
    },
}

/// Payload of `POST /courts/update-names`.
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateNamesRequest {
    pub court_number: i64,
    pub left_name: String,
    pub right_name: String,
}

/// Payload of `POST /courts/save-match`.
#[derive(Debug, Deserialize, ToSchema, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SaveMatchRequest {
    pub court_number: i64,
    #[validate(custom(function = validate_notes))]
    #[serde(default)]
    pub notes: Option<String>,
}

impl From<Team> for TeamView {
    fn from(value: Team) -> Self {
        Self {
            name: value.name,
            score: value.score,
        }
    }
}

impl From<Court> for CourtView {
    fn from(value: Court) -> Self {
        Self {
            court_number: value.court_number,
            left_team: value.left_team.into(),
            right_team: value.right_team.into(),
            upcoming_left: value.upcoming_left,
            upcoming_right: value.upcoming_right,
            last_updated: format_system_time(value.last_updated),
        }
    }
}

impl From<SavedMatch> for SavedMatchView {
    fn from(value: SavedMatch) -> Self {
        Self {
            id: value.id,
            court_number: value.court_number,
            left_team: value.left_team.into(),
            right_team: value.right_team.into(),
            upcoming_left: value.upcoming_left,
            upcoming_right: value.upcoming_right,
            notes: value.notes,
            saved_at: format_system_time(value.saved_at),
        }
    }
}
