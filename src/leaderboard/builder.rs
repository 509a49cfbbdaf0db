use log::debug;

use super::ranking::competition_ranks;
use crate::domain::{LeaderboardEntry, PlayerSlot, Round, RoundStatus};

/// Builds the final ranked leaderboard of an event from all of its rounds.
///
/// Entries are ordered by net score, then gross score; equal net scores
/// share a rank. Abandoned rounds contribute nothing. Ghost players are
/// kept so the displayed ranking matches the course.
pub fn build_leaderboard(rounds: &[Round]) -> Vec<LeaderboardEntry> {
    let mut entries = collect_entries(rounds);
    sort_entries(&mut entries);
    assign_ranks(&mut entries);

    debug!(
        "Built leaderboard with {} entries from {} rounds",
        entries.len(),
        rounds.len()
    );
    entries
}

/// Entries eligible for rivalry and notification processing
pub fn on_platform_entries(entries: &[LeaderboardEntry]) -> Vec<&LeaderboardEntry> {
    entries.iter().filter(|e| e.on_platform).collect()
}

fn collect_entries(rounds: &[Round]) -> Vec<LeaderboardEntry> {
    rounds
        .iter()
        .filter(|round| round.status == RoundStatus::Complete)
        .flat_map(|round| {
            round
                .players
                .iter()
                .map(move |slot| to_entry(round, slot))
        })
        .collect()
}

fn to_entry(round: &Round, slot: &PlayerSlot) -> LeaderboardEntry {
    LeaderboardEntry {
        rank: 0,
        player_id: slot.player_id.clone(),
        display_name: slot.display_name.clone(),
        on_platform: slot.on_platform,
        group_id: round.group_id.clone(),
        gross: slot.gross(),
        net: slot.net(),
        to_par: slot.to_par(&round.context.hole_pars),
        holes_completed: slot.holes_completed(),
    }
}

// Stable, so full ties keep group/slot order
fn sort_entries(entries: &mut [LeaderboardEntry]) {
    entries.sort_by(|a, b| a.net.cmp(&b.net).then_with(|| a.gross.cmp(&b.gross)));
}

fn assign_ranks(entries: &mut [LeaderboardEntry]) {
    let ranks = competition_ranks(entries, |prev, next| prev.net == next.net);
    for (entry, rank) in entries.iter_mut().zip(ranks) {
        entry.rank = rank;
    }
}
