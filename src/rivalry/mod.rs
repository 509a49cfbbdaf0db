//! Head-to-head rivalries between on-platform players.
//!
//! Everything in here is pure: persistence and retries live in
//! `services::rivalry_ledger`.

pub mod announce;
pub mod changes;
pub mod key;
pub mod rules;
pub mod types;

pub use announce::{notifiable, order_changes, select_feed_cards, FeedCard};
pub use changes::{detect_changes, formed_change, ChangeKind, RivalryChange};
pub use key::{canonical_pair, pair_key};
pub use rules::{decide_winner, record_match, start_rivalry, Matchup};
pub use types::{MatchRecord, MatchResult, RivalSide, Rivalry, Streak};
