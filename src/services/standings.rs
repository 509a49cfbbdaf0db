use chrono::Utc;
use log::{info, warn};
use rusqlite::Connection;

use crate::database::{events, series};
use crate::errors::{LedgerError, LedgerResult};
use crate::standings::{
    compute_standings, round_scores_from_leaderboard, RoundScore, StandingsSnapshot,
};

/// Rebuilds the series table from every finalized round and stores it.
/// `round_index` is the round whose completion triggered the rebuild.
pub fn rebuild_standings(
    conn: &Connection,
    series_id: &str,
    round_index: u32,
) -> LedgerResult<StandingsSnapshot> {
    let spec = series::find_by_id(conn, series_id)?
        .ok_or_else(|| LedgerError::SeriesNotFound(series_id.to_string()))?;

    let finalized = events::list_finalized_for_series(conn, series_id)?;

    let mut rounds: Vec<Option<Vec<RoundScore>>> = vec![None; spec.total_rounds as usize];
    for (idx, leaderboard) in &finalized {
        match rounds.get_mut(*idx as usize) {
            Some(slot) => *slot = Some(round_scores_from_leaderboard(&spec, leaderboard)),
            None => warn!(
                "Series {} has {} rounds; ignoring finalized round index {}",
                series_id, spec.total_rounds, idx
            ),
        }
    }

    let snapshot = StandingsSnapshot {
        series_id: spec.series_id.clone(),
        scoring_mode: spec.scoring_mode,
        round_index,
        standings: compute_standings(&spec.roster, &rounds, spec.scoring_mode),
        computed_at: Utc::now(),
    };

    series::store_standings(conn, &snapshot)?;
    info!(
        "  → Standings for series {} rebuilt from {} finalized rounds",
        series_id,
        finalized.len()
    );

    Ok(snapshot)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::events::tests::{finished_round, spec};
    use crate::database::get_connection;
    use crate::database::setup::test_support::temp_pool;
    use crate::domain::{RosterEntry, ScoringMode, SeriesSpec};
    use crate::leaderboard::build_leaderboard;

    fn finalize(conn: &mut Connection, event_id: &str, round_index: u32, players: &[(&str, i32)]) {
        let mut event = spec(event_id, &["g1"]);
        event.series_id = Some("spring".to_string());
        event.round_index = Some(round_index);
        events::insert_event(conn, &event).unwrap();

        let round = finished_round(event_id, "g1", players);
        events::complete_group(conn, &round).unwrap();
        let version = events::find_event(conn, event_id).unwrap().unwrap().version;
        let board = build_leaderboard(&[round]);
        assert!(events::claim_finalization(conn, event_id, version, &board).unwrap());
    }

    #[test]
    fn test_rebuild_uses_all_finalized_rounds() {
        let pool = temp_pool("standings_rebuild");
        let mut conn = get_connection(&pool).unwrap();
        series::insert_series(
            &conn,
            &SeriesSpec {
                series_id: "spring".to_string(),
                name: "Spring Series".to_string(),
                scoring_mode: ScoringMode::Cumulative,
                total_rounds: 3,
                roster: vec![
                    RosterEntry {
                        player_id: "zed".to_string(),
                        display_name: "Zed".to_string(),
                    },
                    RosterEntry {
                        player_id: "a".to_string(),
                        display_name: "A".to_string(),
                    },
                ],
                points_by_rank: vec![],
            },
        )
        .unwrap();

        finalize(&mut conn, "r1", 0, &[("a", 70), ("b", 72)]);
        finalize(&mut conn, "r3", 2, &[("a", 68), ("b", 75)]);

        let snapshot = rebuild_standings(&conn, "spring", 2).unwrap();
        assert_eq!(snapshot.round_index, 2);

        let a = &snapshot.standings[0];
        assert_eq!(a.player_id, "a");
        assert_eq!(a.total, Some(138.0));
        assert_eq!(a.round_scores, vec![Some(70.0), None, Some(68.0)]);
        assert_eq!(a.rank, Some(1));

        assert_eq!(snapshot.standings[1].player_id, "b");
        assert_eq!(snapshot.standings[2].player_id, "zed");
        assert_eq!(snapshot.standings[2].rank, None);

        let stored = series::latest_standings(&conn, "spring").unwrap().unwrap();
        assert_eq!(stored.standings.len(), 3);
    }

    #[test]
    fn test_round_index_past_series_end_is_ignored() {
        let pool = temp_pool("standings_out_of_range");
        let mut conn = get_connection(&pool).unwrap();
        series::insert_series(
            &conn,
            &SeriesSpec {
                series_id: "spring".to_string(),
                name: "Spring Series".to_string(),
                scoring_mode: ScoringMode::Cumulative,
                total_rounds: 2,
                roster: vec![],
                points_by_rank: vec![],
            },
        )
        .unwrap();
        finalize(&mut conn, "r1", 0, &[("a", 70)]);
        finalize(&mut conn, "r2", 1, &[("a", 71)]);
        conn.execute("UPDATE events SET round_index = 2000000 WHERE event_id = 'r2'", [])
            .unwrap();

        let snapshot = rebuild_standings(&conn, "spring", 0).unwrap();
        assert_eq!(snapshot.standings[0].round_scores, vec![Some(70.0), None]);
        assert_eq!(snapshot.standings[0].total, Some(70.0));
    }

    #[test]
    fn test_unknown_series_is_reported() {
        let pool = temp_pool("standings_missing");
        let conn = get_connection(&pool).unwrap();

        let result = rebuild_standings(&conn, "nope", 0);
        assert!(matches!(result, Err(LedgerError::SeriesNotFound(_))));
    }
}
