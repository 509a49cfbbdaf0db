use std::collections::HashMap;

use super::types::{RoundScore, Standing};
use crate::domain::{LeaderboardEntry, PlayerId, RosterEntry, ScoringMode, SeriesSpec};
use crate::leaderboard::competition_ranks;

/// Rebuilds the whole standings table from the series' round history.
///
/// `rounds[i]` holds the scores of series round `i`, or `None` if that
/// round has not been finalized yet. Players who have not played sit below
/// everyone who has, in roster order, without a rank.
pub fn compute_standings(
    roster: &[RosterEntry],
    rounds: &[Option<Vec<RoundScore>>],
    mode: ScoringMode,
) -> Vec<Standing> {
    let mut table = seed_table(roster, rounds);
    fill_round_scores(&mut table, rounds, mode);

    let (mut played, unplayed): (Vec<Standing>, Vec<Standing>) =
        table.into_iter().partition(Standing::has_played);

    sort_played(&mut played, mode);
    let ranks = competition_ranks(&played, |prev, next| prev.total == next.total);
    for (standing, rank) in played.iter_mut().zip(ranks) {
        standing.rank = Some(rank);
    }

    played.extend(unplayed);
    played
}

/// Converts a finalized leaderboard into series round scores. Ghost players
/// never enter a series table.
pub fn round_scores_from_leaderboard(
    series: &SeriesSpec,
    leaderboard: &[LeaderboardEntry],
) -> Vec<RoundScore> {
    leaderboard
        .iter()
        .filter(|entry| entry.on_platform)
        .map(|entry| RoundScore {
            player_id: entry.player_id.clone(),
            display_name: entry.display_name.clone(),
            net: entry.net,
            points: match series.scoring_mode {
                ScoringMode::Points => Some(series.points_for_rank(entry.rank)),
                _ => None,
            },
        })
        .collect()
}

// Roster first, then anyone who played without being on the roster
fn seed_table(roster: &[RosterEntry], rounds: &[Option<Vec<RoundScore>>]) -> Vec<Standing> {
    let mut table: Vec<Standing> = roster
        .iter()
        .map(|r| empty_standing(&r.player_id, &r.display_name, rounds.len()))
        .collect();

    for score in rounds.iter().flatten().flatten() {
        if !table.iter().any(|s| s.player_id == score.player_id) {
            table.push(empty_standing(&score.player_id, &score.display_name, rounds.len()));
        }
    }

    table
}

fn empty_standing(player_id: &PlayerId, display_name: &str, round_count: usize) -> Standing {
    Standing {
        player_id: player_id.clone(),
        display_name: display_name.to_string(),
        round_scores: vec![None; round_count],
        rounds_played: 0,
        total: None,
        rank: None,
    }
}

fn fill_round_scores(
    table: &mut [Standing],
    rounds: &[Option<Vec<RoundScore>>],
    mode: ScoringMode,
) {
    let index: HashMap<PlayerId, usize> = table
        .iter()
        .enumerate()
        .map(|(idx, s)| (s.player_id.clone(), idx))
        .collect();

    for (round_idx, scores) in rounds.iter().enumerate() {
        let Some(scores) = scores else { continue };
        for score in scores {
            if let Some(&row) = index.get(&score.player_id) {
                table[row].round_scores[round_idx] = Some(score.value_for(mode));
            }
        }
    }

    for standing in table.iter_mut() {
        let played: Vec<f64> = standing.round_scores.iter().flatten().copied().collect();
        standing.rounds_played = played.len() as u32;
        standing.total = total_for(&played, mode);
    }
}

fn total_for(values: &[f64], mode: ScoringMode) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let total = match mode {
        ScoringMode::Cumulative | ScoringMode::Points => values.iter().sum(),
        ScoringMode::BestOf => values.iter().copied().fold(f64::INFINITY, f64::min),
    };
    Some(total)
}

// Stable: tied players keep roster order
fn sort_played(played: &mut [Standing], mode: ScoringMode) {
    played.sort_by(|a, b| {
        let a_total = a.total.unwrap_or_default();
        let b_total = b.total.unwrap_or_default();
        let ordering = a_total.total_cmp(&b_total);
        if mode.higher_is_better() {
            ordering.reverse()
        } else {
            ordering
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    fn roster(ids: &[&str]) -> Vec<RosterEntry> {
        ids.iter()
            .map(|id| RosterEntry {
                player_id: id.to_string(),
                display_name: id.to_uppercase(),
            })
            .collect()
    }

    fn score(id: &str, net: i32) -> RoundScore {
        RoundScore {
            player_id: id.to_string(),
            display_name: id.to_uppercase(),
            net,
            points: None,
        }
    }

    fn points(id: &str, pts: f64) -> RoundScore {
        RoundScore {
            points: Some(pts),
            ..score(id, 0)
        }
    }

    fn find<'a>(table: &'a [Standing], id: &str) -> &'a Standing {
        table.iter().find(|s| s.player_id == id).unwrap()
    }

    #[test]
    fn test_cumulative_mid_series_skips_missed_round() {
        let rounds = vec![
            Some(vec![score("a", 70), score("b", 71)]),
            Some(vec![score("b", 72)]),
            Some(vec![score("a", 68), score("b", 70)]),
        ];
        let table = compute_standings(&roster(&["a", "b", "c"]), &rounds, ScoringMode::Cumulative);

        let a = find(&table, "a");
        assert_eq!(a.round_scores, vec![Some(70.0), None, Some(68.0)]);
        assert_eq!(a.rounds_played, 2);
        assert_eq!(a.total, Some(138.0));
        assert_eq!(a.rank, Some(1));

        let b = find(&table, "b");
        assert_eq!(b.total, Some(213.0));
        assert_eq!(b.rank, Some(2));

        let c = find(&table, "c");
        assert_eq!(c.rank, None);
        assert_eq!(table.last().unwrap().player_id, "c");
    }

    #[test]
    fn test_best_of_takes_single_lowest_round() {
        let rounds = vec![
            Some(vec![score("a", 75), score("b", 70)]),
            Some(vec![score("a", 69), score("b", 72)]),
        ];
        let table = compute_standings(&roster(&["a", "b"]), &rounds, ScoringMode::BestOf);
        assert_eq!(table[0].player_id, "a");
        assert_eq!(table[0].total, Some(69.0));
        assert_eq!(table[1].total, Some(70.0));
    }

    #[test]
    fn test_points_sorted_descending_with_shared_rank() {
        let rounds = vec![
            Some(vec![points("a", 10.0), points("b", 6.0), points("c", 4.0)]),
            Some(vec![points("a", 6.0), points("b", 10.0), points("c", 4.0)]),
            None,
        ];
        let table = compute_standings(&roster(&["c", "b", "a", "d"]), &rounds, ScoringMode::Points);

        let order: Vec<&str> = table.iter().map(|s| s.player_id.as_str()).collect();
        let ranks: Vec<Option<u32>> = table.iter().map(|s| s.rank).collect();
        // b and a tie on 16 and keep roster order
        assert_eq!(order, vec!["b", "a", "c", "d"]);
        assert_eq!(ranks, vec![Some(1), Some(1), Some(3), None]);
        assert_eq!(table[0].round_scores.len(), 3);
    }

    #[test]
    fn test_unrostered_players_are_appended() {
        let rounds = vec![Some(vec![score("walk-on", 71)])];
        let table = compute_standings(&roster(&["a"]), &rounds, ScoringMode::Cumulative);
        assert_eq!(table[0].player_id, "walk-on");
        assert_eq!(table[0].rank, Some(1));
        assert_eq!(table[1].player_id, "a");
        assert_eq!(table[1].rank, None);
    }

    #[test]
    fn test_unplayed_players_keep_roster_order() {
        let rounds: Vec<Option<Vec<RoundScore>>> = vec![None, None];
        let table = compute_standings(&roster(&["z", "y", "x"]), &rounds, ScoringMode::Cumulative);
        let order: Vec<&str> = table.iter().map(|s| s.player_id.as_str()).collect();
        assert_eq!(order, vec!["z", "y", "x"]);
        assert!(table.iter().all(|s| s.rank.is_none() && s.total.is_none()));
    }
}
