use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::{PlayerId, ScoringMode};

/// One player's contribution to one series round
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoundScore {
    pub player_id: PlayerId,
    pub display_name: String,
    pub net: i32,
    /// Externally supplied points, used only in `points` mode
    #[serde(default)]
    pub points: Option<f64>,
}

impl RoundScore {
    pub fn value_for(&self, mode: ScoringMode) -> f64 {
        match mode {
            ScoringMode::Points => self.points.unwrap_or(0.0),
            ScoringMode::Cumulative | ScoringMode::BestOf => self.net as f64,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Standing {
    pub player_id: PlayerId,
    pub display_name: String,
    /// Mode value per series round; `None` where the player did not play
    pub round_scores: Vec<Option<f64>>,
    pub rounds_played: u32,
    pub total: Option<f64>,
    /// `None` until the player has played at least one round
    pub rank: Option<u32>,
}

impl Standing {
    pub fn has_played(&self) -> bool {
        self.rounds_played > 0
    }
}

/// Standings table as handed to the presentation layer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StandingsSnapshot {
    pub series_id: String,
    pub scoring_mode: ScoringMode,
    pub round_index: u32,
    pub standings: Vec<Standing>,
    pub computed_at: DateTime<Utc>,
}
