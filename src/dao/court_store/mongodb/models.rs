use mongodb::bson::{DateTime, Document, doc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::dao::models::{CourtEntity, SavedMatchEntity, TeamEntity};

use super::error::MongoDaoError;

/// Court record as stored in the `courts` collection, keyed by court number.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MongoCourtDocument {
    #[serde(rename = "_id")]
    court_number: i64,
    left_team: TeamEntity,
    right_team: TeamEntity,
    #[serde(default)]
    upcoming_left: String,
    #[serde(default)]
    upcoming_right: String,
    last_updated: DateTime,
}

impl From<CourtEntity> for MongoCourtDocument {
    fn from(value: CourtEntity) -> Self {
        Self {
            court_number: i64::from(value.court_number),
            left_team: value.left_team,
            right_team: value.right_team,
            upcoming_left: value.upcoming_left,
            upcoming_right: value.upcoming_right,
            last_updated: DateTime::from_system_time(value.last_updated),
        }
    }
}

impl TryFrom<MongoCourtDocument> for CourtEntity {
    type Error = MongoDaoError;

    fn try_from(value: MongoCourtDocument) -> Result<Self, Self::Error> {
        let court_number =
            u32::try_from(value.court_number).map_err(|_| MongoDaoError::Corrupted {
                key: format!("courts/{}", value.court_number),
                reason: "court number out of range".into(),
            })?;

        Ok(Self {
            court_number,
            left_team: value.left_team,
            right_team: value.right_team,
            upcoming_left: value.upcoming_left,
            upcoming_right: value.upcoming_right,
            last_updated: value.last_updated.to_system_time(),
        })
    }
}

/// Archived match as stored in the `saved_matches` collection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MongoSavedMatchDocument {
    #[serde(rename = "_id")]
    id: String,
    court_number: i64,
    left_team: TeamEntity,
    right_team: TeamEntity,
    upcoming_left: String,
    upcoming_right: String,
    #[serde(default)]
    notes: Option<String>,
    saved_at: DateTime,
}

impl From<SavedMatchEntity> for MongoSavedMatchDocument {
    fn from(value: SavedMatchEntity) -> Self {
        Self {
            id: value.id.to_string(),
            court_number: i64::from(value.court_number),
            left_team: value.left_team,
            right_team: value.right_team,
            upcoming_left: value.upcoming_left,
            upcoming_right: value.upcoming_right,
            notes: value.notes,
            saved_at: DateTime::from_system_time(value.saved_at),
        }
    }
}

impl TryFrom<MongoSavedMatchDocument> for SavedMatchEntity {
    type Error = MongoDaoError;

    fn try_from(value: MongoSavedMatchDocument) -> Result<Self, Self::Error> {
        let key = format!("saved_matches/{}", value.id);
        let id = Uuid::parse_str(&value.id).map_err(|err| MongoDaoError::Corrupted {
            key: key.clone(),
            reason: err.to_string(),
        })?;
        let court_number =
            u32::try_from(value.court_number).map_err(|_| MongoDaoError::Corrupted {
                key,
                reason: "court number out of range".into(),
            })?;

        Ok(Self {
            id,
            court_number,
            left_team: value.left_team,
            right_team: value.right_team,
            upcoming_left: value.upcoming_left,
            upcoming_right: value.upcoming_right,
            notes: value.notes,
            saved_at: value.saved_at.to_system_time(),
        })
    }
}

pub fn court_filter(court_number: u32) -> Document {
    doc! {"_id": i64::from(court_number)}
}
