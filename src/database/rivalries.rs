use rusqlite::{params, Connection, OptionalExtension};

use super::models::json_column;
use crate::errors::{LedgerError, LedgerResult};
use crate::rivalry::{MatchRecord, RivalSide, Rivalry, Streak};

const RIVALRY_COLUMNS: &str = "pair_key, player_a, player_a_name, player_b, player_b_name, wins, losses, ties, recent_results, current_streak_player, current_streak_count, longest_streak_player, longest_streak_count, belt_holder, total_matches, first_match_at, last_match_at, version";

fn parse_rivalry_row(row: &rusqlite::Row) -> rusqlite::Result<Rivalry> {
    Ok(Rivalry {
        pair_key: row.get(0)?,
        player_a: RivalSide {
            player_id: row.get(1)?,
            display_name: row.get(2)?,
        },
        player_b: RivalSide {
            player_id: row.get(3)?,
            display_name: row.get(4)?,
        },
        record: MatchRecord {
            wins: row.get(5)?,
            losses: row.get(6)?,
            ties: row.get(7)?,
        },
        recent_results: json_column(row, 8)?,
        current_streak: Streak {
            player_id: row.get(9)?,
            count: row.get(10)?,
        },
        longest_streak: Streak {
            player_id: row.get(11)?,
            count: row.get(12)?,
        },
        belt_holder: row.get(13)?,
        total_matches: row.get(14)?,
        first_match_at: row.get(15)?,
        last_match_at: row.get(16)?,
        version: row.get(17)?,
    })
}

pub fn find_by_key(conn: &Connection, pair_key: &str) -> LedgerResult<Option<Rivalry>> {
    let sql = format!("SELECT {} FROM rivalries WHERE pair_key = ?1", RIVALRY_COLUMNS);

    let rivalry = conn
        .query_row(&sql, params![pair_key], parse_rivalry_row)
        .optional()?;
    Ok(rivalry)
}

pub fn list_for_player(conn: &Connection, player_id: &str) -> LedgerResult<Vec<Rivalry>> {
    let sql = format!(
        "SELECT {} FROM rivalries WHERE player_a = ?1 OR player_b = ?1 ORDER BY total_matches DESC, pair_key",
        RIVALRY_COLUMNS
    );

    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt
        .query_map(params![player_id], parse_rivalry_row)?
        .collect::<rusqlite::Result<Vec<_>>>()?;

    Ok(rows)
}

pub fn insert_rivalry(conn: &Connection, rivalry: &Rivalry) -> LedgerResult<()> {
    let sql = format!(
        "INSERT INTO rivalries ({}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17, 0)",
        RIVALRY_COLUMNS
    );

    let inserted = conn.execute(
        &sql,
        params![
            rivalry.pair_key,
            rivalry.player_a.player_id,
            rivalry.player_a.display_name,
            rivalry.player_b.player_id,
            rivalry.player_b.display_name,
            rivalry.record.wins,
            rivalry.record.losses,
            rivalry.record.ties,
            serde_json::to_string(&rivalry.recent_results)?,
            rivalry.current_streak.player_id,
            rivalry.current_streak.count,
            rivalry.longest_streak.player_id,
            rivalry.longest_streak.count,
            rivalry.belt_holder,
            rivalry.total_matches,
            rivalry.first_match_at,
            rivalry.last_match_at
        ],
    );

    match inserted {
        Ok(_) => Ok(()),
        Err(rusqlite::Error::SqliteFailure(err, _))
            if err.code == rusqlite::ErrorCode::ConstraintViolation =>
        {
            Err(conflict(&rivalry.pair_key))
        }
        Err(e) => Err(e.into()),
    }
}

/// Writes the new state only if the stored version still matches
/// `expected_version`.
pub fn update_rivalry(
    conn: &Connection,
    rivalry: &Rivalry,
    expected_version: i64,
) -> LedgerResult<()> {
    let sql = "UPDATE rivalries SET player_a_name = ?2, player_b_name = ?3, wins = ?4, losses = ?5, ties = ?6, recent_results = ?7, current_streak_player = ?8, current_streak_count = ?9, longest_streak_player = ?10, longest_streak_count = ?11, belt_holder = ?12, total_matches = ?13, first_match_at = ?14, last_match_at = ?15, version = version + 1, updated_at = CURRENT_TIMESTAMP WHERE pair_key = ?1 AND version = ?16";

    let updated = conn.execute(
        sql,
        params![
            rivalry.pair_key,
            rivalry.player_a.display_name,
            rivalry.player_b.display_name,
            rivalry.record.wins,
            rivalry.record.losses,
            rivalry.record.ties,
            serde_json::to_string(&rivalry.recent_results)?,
            rivalry.current_streak.player_id,
            rivalry.current_streak.count,
            rivalry.longest_streak.player_id,
            rivalry.longest_streak.count,
            rivalry.belt_holder,
            rivalry.total_matches,
            rivalry.first_match_at,
            rivalry.last_match_at,
            expected_version
        ],
    )?;

    if updated == 0 {
        return Err(conflict(&rivalry.pair_key));
    }
    Ok(())
}

pub fn is_applied(conn: &Connection, pair_key: &str, event_id: &str) -> LedgerResult<bool> {
    let sql = "SELECT 1 FROM rivalry_applications WHERE pair_key = ?1 AND event_id = ?2";

    let found: Option<i64> = conn
        .query_row(sql, params![pair_key, event_id], |row| row.get(0))
        .optional()?;
    Ok(found.is_some())
}

pub fn mark_applied(conn: &Connection, pair_key: &str, event_id: &str) -> LedgerResult<()> {
    conn.execute(
        "INSERT INTO rivalry_applications (pair_key, event_id) VALUES (?1, ?2)",
        params![pair_key, event_id],
    )?;
    Ok(())
}

fn conflict(pair_key: &str) -> LedgerError {
    LedgerError::Conflict(format!("rivalries/{}", pair_key))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::get_connection;
    use crate::database::setup::test_support::temp_pool;
    use crate::rivalry::rules::tests::play;

    #[test]
    fn test_rivalry_round_trips_through_storage() {
        let pool = temp_pool("rivalries_store");
        let conn = get_connection(&pool).unwrap();
        let rivalry = play("AABT");

        insert_rivalry(&conn, &rivalry).unwrap();
        let stored = find_by_key(&conn, &rivalry.pair_key).unwrap().unwrap();
        assert_eq!(stored, rivalry);
        assert_eq!(list_for_player(&conn, "b").unwrap().len(), 1);
        assert!(list_for_player(&conn, "c").unwrap().is_empty());
    }

    #[test]
    fn test_update_requires_matching_version() {
        let pool = temp_pool("rivalries_cas");
        let conn = get_connection(&pool).unwrap();
        let rivalry = play("A");
        insert_rivalry(&conn, &rivalry).unwrap();

        let next = play("AB");
        update_rivalry(&conn, &next, 0).unwrap();
        let stale = update_rivalry(&conn, &next, 0);
        assert!(matches!(stale, Err(LedgerError::Conflict(_))));

        let stored = find_by_key(&conn, &next.pair_key).unwrap().unwrap();
        assert_eq!(stored.version, 1);
        assert_eq!(stored.total_matches, 2);
    }

    #[test]
    fn test_duplicate_insert_is_a_conflict() {
        let pool = temp_pool("rivalries_dup");
        let conn = get_connection(&pool).unwrap();
        let rivalry = play("A");
        insert_rivalry(&conn, &rivalry).unwrap();
        assert!(matches!(insert_rivalry(&conn, &rivalry), Err(LedgerError::Conflict(_))));
    }

    #[test]
    fn test_application_markers() {
        let pool = temp_pool("rivalries_marker");
        let conn = get_connection(&pool).unwrap();
        assert!(!is_applied(&conn, "a_b", "e1").unwrap());
        mark_applied(&conn, "a_b", "e1").unwrap();
        assert!(is_applied(&conn, "a_b", "e1").unwrap());
        assert!(!is_applied(&conn, "a_b", "e2").unwrap());
    }
}
