use log::info;

use crate::domain::LeaderboardEntry;
use crate::rivalry::{FeedCard, RivalryChange};
use crate::standings::StandingsSnapshot;

/// Outbound side of the pipeline. Push delivery and feed storage live
/// outside this crate; they plug in here.
pub trait Notifier: Send + Sync {
    fn announce_leaderboard(&self, event_id: &str, leaderboard: &[LeaderboardEntry]);

    fn push_rivalry_alerts(&self, event_id: &str, changes: &[RivalryChange]);

    fn publish_feed_cards(&self, event_id: &str, cards: &[FeedCard]);

    fn publish_standings(&self, snapshot: &StandingsSnapshot);
}

/// Writes every notification to the log.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn announce_leaderboard(&self, event_id: &str, leaderboard: &[LeaderboardEntry]) {
        info!("Final leaderboard for event {} ({} players)", event_id, leaderboard.len());
        for entry in leaderboard {
            info!(
                "  {:>3}. {:<24} net {:>3}  gross {:>3}  {:+}",
                entry.rank, entry.display_name, entry.net, entry.gross, entry.to_par
            );
        }
    }

    fn push_rivalry_alerts(&self, event_id: &str, changes: &[RivalryChange]) {
        for change in changes {
            info!("  → [{}] {} ({})", event_id, change.message, change.kind.as_str());
        }
    }

    fn publish_feed_cards(&self, event_id: &str, cards: &[FeedCard]) {
        info!("  → {} feed cards for event {}", cards.len(), event_id);
    }

    fn publish_standings(&self, snapshot: &StandingsSnapshot) {
        info!(
            "Standings for series {} updated after round {}",
            snapshot.series_id,
            snapshot.round_index + 1
        );
    }
}

#[cfg(test)]
pub(crate) mod recording {
    use std::sync::Mutex;

    use super::*;

    /// Keeps every notification so tests can assert on them
    #[derive(Debug, Default)]
    pub(crate) struct RecordingNotifier {
        pub leaderboards: Mutex<Vec<(String, Vec<LeaderboardEntry>)>>,
        pub alerts: Mutex<Vec<RivalryChange>>,
        pub cards: Mutex<Vec<FeedCard>>,
        pub standings: Mutex<Vec<StandingsSnapshot>>,
    }

    impl RecordingNotifier {
        pub(crate) fn leaderboard_count(&self) -> usize {
            self.leaderboards.lock().unwrap().len()
        }

        pub(crate) fn alert_count(&self) -> usize {
            self.alerts.lock().unwrap().len()
        }
    }

    impl Notifier for RecordingNotifier {
        fn announce_leaderboard(&self, event_id: &str, leaderboard: &[LeaderboardEntry]) {
            self.leaderboards
                .lock()
                .unwrap()
                .push((event_id.to_string(), leaderboard.to_vec()));
        }

        fn push_rivalry_alerts(&self, _event_id: &str, changes: &[RivalryChange]) {
            self.alerts.lock().unwrap().extend_from_slice(changes);
        }

        fn publish_feed_cards(&self, _event_id: &str, cards: &[FeedCard]) {
            self.cards.lock().unwrap().extend_from_slice(cards);
        }

        fn publish_standings(&self, snapshot: &StandingsSnapshot) {
            self.standings.lock().unwrap().push(snapshot.clone());
        }
    }
}
