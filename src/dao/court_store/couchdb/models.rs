use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::dao::models::{CourtEntity, SavedMatchEntity};

pub const COURT_PREFIX: &str = "court::";
pub const MATCH_PREFIX: &str = "match::";
pub const END_SUFFIX: &str = "\u{ffff}";

#[derive(Debug, Deserialize)]
pub struct AllDocsResponse {
    pub rows: Vec<AllDocsRow>,
}

#[derive(Debug, Deserialize)]
pub struct AllDocsRow {
    pub id: String,
    #[serde(default)]
    pub doc: Option<Value>,
}

#[derive(Debug, Deserialize)]
pub struct RevisionOnly {
    #[serde(rename = "_rev")]
    pub rev: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CouchCourtDocument {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(rename = "_rev", skip_serializing_if = "Option::is_none")]
    pub rev: Option<String>,
    #[serde(flatten)]
    pub court: CourtEntity,
}

impl CouchCourtDocument {
    pub fn from_entity(court: CourtEntity) -> Self {
        Self {
            id: court_doc_id(court.court_number),
            rev: None,
            court,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CouchMatchDocument {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(rename = "_rev", skip_serializing_if = "Option::is_none")]
    pub rev: Option<String>,
    #[serde(flatten)]
    pub saved: SavedMatchEntity,
}

impl CouchMatchDocument {
    pub fn from_entity(saved: SavedMatchEntity) -> Self {
        Self {
            id: match_doc_id(&saved),
            rev: None,
            saved,
        }
    }
}

/// Zero-padded so `_all_docs` returns courts in numeric order.
pub fn court_doc_id(court_number: u32) -> String {
    format!("{COURT_PREFIX}{court_number:010}")
}

/// Keyed by save time first so ids sort chronologically.
pub fn match_doc_id(saved: &SavedMatchEntity) -> String {
    let millis = saved
        .saved_at
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_millis())
        .unwrap_or_default();
    format!("{MATCH_PREFIX}{millis:020}::{}", saved.id)
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use uuid::Uuid;

    use super::*;
    use crate::dao::models::TeamEntity;

    fn saved_at(offset_secs: u64) -> SavedMatchEntity {
        SavedMatchEntity {
            id: Uuid::new_v4(),
            court_number: 1,
            left_team: TeamEntity {
                name: "Team A".into(),
                score: 0,
            },
            right_team: TeamEntity {
                name: "Team B".into(),
                score: 0,
            },
            upcoming_left: String::new(),
            upcoming_right: String::new(),
            notes: None,
            saved_at: SystemTime::UNIX_EPOCH + Duration::from_secs(offset_secs),
        }
    }

    #[test]
    fn court_ids_sort_numerically() {
        assert!(court_doc_id(2) < court_doc_id(10));
        assert!(court_doc_id(10).starts_with(COURT_PREFIX));
    }

    #[test]
    fn match_ids_sort_chronologically() {
        assert!(match_doc_id(&saved_at(5)) < match_doc_id(&saved_at(1_000)));
    }
}
