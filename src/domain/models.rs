use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub type PlayerId = String;

/// Lifecycle of one scored group round
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoundStatus {
    Live,
    Complete,
    Abandoned,
}

impl RoundStatus {
    pub fn as_str(&self) -> &str {
        match self {
            RoundStatus::Live => "live",
            RoundStatus::Complete => "complete",
            RoundStatus::Abandoned => "abandoned",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "live" => Some(RoundStatus::Live),
            "complete" => Some(RoundStatus::Complete),
            "abandoned" => Some(RoundStatus::Abandoned),
            _ => None,
        }
    }

    pub fn is_finished(&self) -> bool {
        !matches!(self, RoundStatus::Live)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GroupStatus {
    Pending,
    Complete,
}

impl GroupStatus {
    pub fn as_str(&self) -> &str {
        match self {
            GroupStatus::Pending => "pending",
            GroupStatus::Complete => "complete",
        }
    }

    pub fn parse(value: &str) -> Self {
        match value {
            "complete" => GroupStatus::Complete,
            _ => GroupStatus::Pending,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventStatus {
    Pending,
    Complete,
}

impl EventStatus {
    pub fn as_str(&self) -> &str {
        match self {
            EventStatus::Pending => "pending",
            EventStatus::Complete => "complete",
        }
    }

    pub fn parse(value: &str) -> Self {
        match value {
            "complete" => EventStatus::Complete,
            _ => EventStatus::Pending,
        }
    }
}

/// One player's line on a scorecard, already scored upstream
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerSlot {
    pub player_id: PlayerId,
    pub display_name: String,
    /// Off-platform ("ghost") players are ranked but never paired
    #[serde(default = "default_on_platform")]
    pub on_platform: bool,
    /// Strokes per hole; `None` for holes not played
    pub hole_strokes: Vec<Option<u32>>,
    /// Handicap allowance supplied by the scoring service
    #[serde(default)]
    pub handicap_strokes: i32,
}

fn default_on_platform() -> bool {
    true
}

impl PlayerSlot {
    pub fn gross(&self) -> i32 {
        self.hole_strokes.iter().flatten().sum::<u32>() as i32
    }

    pub fn net(&self) -> i32 {
        self.gross() - self.handicap_strokes
    }

    pub fn holes_completed(&self) -> u32 {
        self.hole_strokes.iter().filter(|s| s.is_some()).count() as u32
    }

    /// Gross strokes relative to par over the holes actually played
    pub fn to_par(&self, hole_pars: &[u32]) -> i32 {
        let par_played: u32 = self
            .hole_strokes
            .iter()
            .zip(hole_pars.iter())
            .filter(|(strokes, _)| strokes.is_some())
            .map(|(_, par)| *par)
            .sum();
        self.gross() - par_played as i32
    }
}

/// Course/date/region shared by every pairing of a round
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoundContext {
    pub course: String,
    pub played_at: DateTime<Utc>,
    #[serde(default)]
    pub region: Option<String>,
    #[serde(default)]
    pub hole_pars: Vec<u32>,
}

/// A finished group round as delivered by the scoring service
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Round {
    pub round_id: String,
    pub event_id: String,
    pub group_id: String,
    pub status: RoundStatus,
    pub context: RoundContext,
    pub players: Vec<PlayerSlot>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupSpec {
    pub group_id: String,
    #[serde(default)]
    pub player_ids: Vec<PlayerId>,
}

/// Registration payload for an outing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventSpec {
    pub event_id: String,
    pub name: String,
    pub groups: Vec<GroupSpec>,
    #[serde(default)]
    pub series_id: Option<String>,
    /// Zero-based round of the series this event counts for
    #[serde(default)]
    pub round_index: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaderboardEntry {
    pub rank: u32,
    pub player_id: PlayerId,
    pub display_name: String,
    pub on_platform: bool,
    pub group_id: String,
    pub gross: i32,
    pub net: i32,
    pub to_par: i32,
    pub holes_completed: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoringMode {
    Cumulative,
    BestOf,
    Points,
}

impl ScoringMode {
    pub fn as_str(&self) -> &str {
        match self {
            ScoringMode::Cumulative => "cumulative",
            ScoringMode::BestOf => "best_of",
            ScoringMode::Points => "points",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "cumulative" => Some(ScoringMode::Cumulative),
            "best_of" => Some(ScoringMode::BestOf),
            "points" => Some(ScoringMode::Points),
            _ => None,
        }
    }

    /// Points are the only mode where a larger total is better
    pub fn higher_is_better(&self) -> bool {
        matches!(self, ScoringMode::Points)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RosterEntry {
    pub player_id: PlayerId,
    pub display_name: String,
}

/// A multi-round tournament
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeriesSpec {
    pub series_id: String,
    pub name: String,
    pub scoring_mode: ScoringMode,
    pub total_rounds: u32,
    pub roster: Vec<RosterEntry>,
    /// Points awarded by finishing rank (index 0 = rank 1) in `points` mode
    #[serde(default)]
    pub points_by_rank: Vec<f64>,
}

impl SeriesSpec {
    pub fn points_for_rank(&self, rank: u32) -> f64 {
        rank.checked_sub(1)
            .and_then(|idx| self.points_by_rank.get(idx as usize))
            .copied()
            .unwrap_or(0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn slot(strokes: Vec<Option<u32>>, handicap: i32) -> PlayerSlot {
        PlayerSlot {
            player_id: "p1".to_string(),
            display_name: "Player One".to_string(),
            on_platform: true,
            hole_strokes: strokes,
            handicap_strokes: handicap,
        }
    }

    #[test]
    fn test_slot_totals_skip_unplayed_holes() {
        let s = slot(vec![Some(4), Some(5), None, Some(3)], 2);
        assert_eq!(s.gross(), 12);
        assert_eq!(s.net(), 10);
        assert_eq!(s.holes_completed(), 3);
        assert_eq!(s.to_par(&[4, 4, 5, 3]), 1);
    }

    #[test]
    fn test_points_for_rank_outside_table_is_zero() {
        let series = SeriesSpec {
            series_id: "s1".to_string(),
            name: "Club Champs".to_string(),
            scoring_mode: ScoringMode::Points,
            total_rounds: 3,
            roster: vec![],
            points_by_rank: vec![10.0, 6.0, 4.0],
        };
        assert_eq!(series.points_for_rank(1), 10.0);
        assert_eq!(series.points_for_rank(3), 4.0);
        assert_eq!(series.points_for_rank(4), 0.0);
        assert_eq!(series.points_for_rank(0), 0.0);
    }

    #[test]
    fn test_round_deserializes_with_defaults() {
        let json = r#"{
            "roundId": "r1", "eventId": "e1", "groupId": "g1", "status": "complete",
            "context": {"course": "Pebble", "playedAt": "2026-05-01T10:00:00Z"},
            "players": [{"playerId": "p1", "displayName": "A", "holeStrokes": [4, null]}]
        }"#;
        let round: Round = serde_json::from_str(json).unwrap();
        assert_eq!(round.status, RoundStatus::Complete);
        assert!(round.players[0].on_platform);
        assert_eq!(round.players[0].handicap_strokes, 0);
    }
}
