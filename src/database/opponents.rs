use rusqlite::{params, Connection, OptionalExtension};

use crate::errors::LedgerResult;

/// Bumps how many rounds `player_id` has shared with `opponent_id` and
/// returns the new count.
pub fn increment_shared_rounds(
    conn: &Connection,
    player_id: &str,
    opponent_id: &str,
) -> LedgerResult<u32> {
    let sql = "INSERT INTO opponent_rounds (player_id, opponent_id, rounds_shared) VALUES (?1, ?2, 1) ON CONFLICT(player_id, opponent_id) DO UPDATE SET rounds_shared = rounds_shared + 1 RETURNING rounds_shared";

    let count = conn.query_row(sql, params![player_id, opponent_id], |row| row.get(0))?;
    Ok(count)
}

pub fn shared_rounds(conn: &Connection, player_id: &str, opponent_id: &str) -> LedgerResult<u32> {
    let sql = "SELECT rounds_shared FROM opponent_rounds WHERE player_id = ?1 AND opponent_id = ?2";

    let count = conn
        .query_row(sql, params![player_id, opponent_id], |row| row.get(0))
        .optional()?;
    Ok(count.unwrap_or(0))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::get_connection;
    use crate::database::setup::test_support::temp_pool;

    #[test]
    fn test_counters_are_directional_and_accumulate() {
        let pool = temp_pool("opponents");
        let conn = get_connection(&pool).unwrap();

        assert_eq!(increment_shared_rounds(&conn, "a", "b").unwrap(), 1);
        assert_eq!(increment_shared_rounds(&conn, "a", "b").unwrap(), 2);
        assert_eq!(increment_shared_rounds(&conn, "b", "a").unwrap(), 1);

        assert_eq!(shared_rounds(&conn, "a", "b").unwrap(), 2);
        assert_eq!(shared_rounds(&conn, "a", "z").unwrap(), 0);
    }
}
