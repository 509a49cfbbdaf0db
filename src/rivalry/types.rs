use std::collections::VecDeque;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::PlayerId;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RivalSide {
    pub player_id: PlayerId,
    pub display_name: String,
}

/// Won/lost/tied, always from player A's point of view
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchRecord {
    pub wins: u32,
    pub losses: u32,
    pub ties: u32,
}

impl MatchRecord {
    /// Same record from player B's side
    pub fn flipped(&self) -> Self {
        Self {
            wins: self.losses,
            losses: self.wins,
            ties: self.ties,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Streak {
    pub player_id: Option<PlayerId>,
    pub count: u32,
}

impl Streak {
    pub fn held_by(&self, player_id: &str) -> bool {
        self.player_id.as_deref() == Some(player_id)
    }
}

/// One shared round between the pair
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchResult {
    pub event_id: String,
    /// `None` for a true tie
    pub winner: Option<PlayerId>,
    pub player_a_net: i32,
    pub player_b_net: i32,
    pub player_a_gross: i32,
    pub player_b_gross: i32,
    pub course: String,
    #[serde(default)]
    pub region: Option<String>,
    pub played_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Rivalry {
    pub pair_key: String,
    pub player_a: RivalSide,
    pub player_b: RivalSide,
    pub record: MatchRecord,
    /// Most recent first, capped
    pub recent_results: VecDeque<MatchResult>,
    pub current_streak: Streak,
    pub longest_streak: Streak,
    pub belt_holder: Option<PlayerId>,
    pub total_matches: u32,
    pub first_match_at: DateTime<Utc>,
    pub last_match_at: DateTime<Utc>,
    #[serde(skip)]
    pub version: i64,
}

impl Rivalry {
    /// Player ahead on the overall record, `None` when level
    pub fn leader(&self) -> Option<&RivalSide> {
        match self.record.wins.cmp(&self.record.losses) {
            std::cmp::Ordering::Greater => Some(&self.player_a),
            std::cmp::Ordering::Less => Some(&self.player_b),
            std::cmp::Ordering::Equal => None,
        }
    }

    pub fn side(&self, player_id: &str) -> Option<&RivalSide> {
        if self.player_a.player_id == player_id {
            Some(&self.player_a)
        } else if self.player_b.player_id == player_id {
            Some(&self.player_b)
        } else {
            None
        }
    }

    pub fn opponent_of(&self, player_id: &str) -> &RivalSide {
        if self.player_a.player_id == player_id {
            &self.player_b
        } else {
            &self.player_a
        }
    }

    pub fn name_of<'a>(&'a self, player_id: &'a str) -> &'a str {
        self.side(player_id)
            .map(|s| s.display_name.as_str())
            .unwrap_or(player_id)
    }

    pub fn latest_result(&self) -> Option<&MatchResult> {
        self.recent_results.front()
    }

    /// Record as "W-L-T" from player A's side
    pub fn score_line(&self) -> String {
        format!(
            "{}-{}-{}",
            self.record.wins, self.record.losses, self.record.ties
        )
    }
}
