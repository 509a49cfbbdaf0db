use serde::Serialize;

use crate::rivalry::{MatchResult, Rivalry};

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisteredResponse {
    pub id: String,
    pub created: bool,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorResponse {
    pub error: String,
}

/// Rivalry as seen from one player's side
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerRivalryItem {
    pub pair_key: String,
    pub opponent_id: String,
    pub opponent_name: String,
    pub wins: u32,
    pub losses: u32,
    pub ties: u32,
    pub total_matches: u32,
    pub holds_belt: bool,
    pub last_result: Option<MatchResult>,
}

impl PlayerRivalryItem {
    pub fn from_rivalry(player_id: &str, rivalry: &Rivalry) -> Self {
        let opponent = rivalry.opponent_of(player_id);
        let record = if rivalry.player_a.player_id == player_id {
            rivalry.record
        } else {
            rivalry.record.flipped()
        };

        Self {
            pair_key: rivalry.pair_key.clone(),
            opponent_id: opponent.player_id.clone(),
            opponent_name: opponent.display_name.clone(),
            wins: record.wins,
            losses: record.losses,
            ties: record.ties,
            total_matches: rivalry.total_matches,
            holds_belt: rivalry.belt_holder.as_deref() == Some(player_id),
            last_result: rivalry.latest_result().cloned(),
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerRivalriesResponse {
    pub player_id: String,
    pub items: Vec<PlayerRivalryItem>,
}
