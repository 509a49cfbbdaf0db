pub mod calculator;
pub mod types;

pub use calculator::{compute_standings, round_scores_from_leaderboard};
pub use types::{RoundScore, Standing, StandingsSnapshot};
