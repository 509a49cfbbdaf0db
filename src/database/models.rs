use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::domain::{EventStatus, GroupStatus, LeaderboardEntry, PlayerId};

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupRecord {
    pub group_id: String,
    pub position: u32,
    pub player_ids: Vec<PlayerId>,
    pub status: GroupStatus,
    pub round_ref: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EventRecord {
    pub event_id: String,
    pub name: String,
    pub status: EventStatus,
    pub total_groups: u32,
    pub completed_groups: u32,
    pub final_leaderboard: Option<Vec<LeaderboardEntry>>,
    pub rivalries_processed: bool,
    pub series_id: Option<String>,
    pub round_index: Option<u32>,
    #[serde(skip)]
    pub version: i64,
    pub finalized_at: Option<DateTime<Utc>>,
    pub groups: Vec<GroupRecord>,
}

impl EventRecord {
    pub fn is_complete(&self) -> bool {
        self.status == EventStatus::Complete
    }
}

/// Result of one pass through the completion barrier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BarrierState {
    pub completed_groups: u32,
    pub total_groups: u32,
    /// `false` when the group had already been marked complete
    pub newly_completed: bool,
}

impl BarrierState {
    pub fn is_complete(&self) -> bool {
        self.completed_groups == self.total_groups
    }
}

/// Reads a JSON text column into a typed value
pub(crate) fn json_column<T: serde::de::DeserializeOwned>(
    row: &rusqlite::Row,
    idx: usize,
) -> rusqlite::Result<T> {
    let raw: String = row.get(idx)?;
    serde_json::from_str(&raw).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, Box::new(e))
    })
}

pub(crate) fn optional_json_column<T: serde::de::DeserializeOwned>(
    row: &rusqlite::Row,
    idx: usize,
) -> rusqlite::Result<Option<T>> {
    let raw: Option<String> = row.get(idx)?;
    raw.map(|text| {
        serde_json::from_str(&text).map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, Box::new(e))
        })
    })
    .transpose()
}
