pub mod builder;
pub mod ranking;

pub use builder::{build_leaderboard, on_platform_entries};
pub use ranking::competition_ranks;
