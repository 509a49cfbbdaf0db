use rusqlite::{params, Connection, OptionalExtension};

use super::models::json_column;
use crate::domain::{ScoringMode, SeriesSpec};
use crate::errors::LedgerResult;
use crate::standings::StandingsSnapshot;

/// Registers a series. Returns `false` if it already existed.
pub fn insert_series(conn: &Connection, series: &SeriesSpec) -> LedgerResult<bool> {
    let sql = "INSERT INTO series (series_id, name, scoring_mode, total_rounds, roster, points_by_rank) VALUES (?1, ?2, ?3, ?4, ?5, ?6) ON CONFLICT(series_id) DO NOTHING";

    let inserted = conn.execute(
        sql,
        params![
            series.series_id,
            series.name,
            series.scoring_mode.as_str(),
            series.total_rounds,
            serde_json::to_string(&series.roster)?,
            serde_json::to_string(&series.points_by_rank)?
        ],
    )?;

    Ok(inserted > 0)
}

fn parse_series_row(row: &rusqlite::Row) -> rusqlite::Result<SeriesSpec> {
    let mode: String = row.get(2)?;
    let scoring_mode = ScoringMode::parse(&mode).ok_or_else(|| {
        rusqlite::Error::FromSqlConversionFailure(
            2,
            rusqlite::types::Type::Text,
            format!("unknown scoring mode {}", mode).into(),
        )
    })?;

    Ok(SeriesSpec {
        series_id: row.get(0)?,
        name: row.get(1)?,
        scoring_mode,
        total_rounds: row.get(3)?,
        roster: json_column(row, 4)?,
        points_by_rank: json_column(row, 5)?,
    })
}

pub fn find_by_id(conn: &Connection, series_id: &str) -> LedgerResult<Option<SeriesSpec>> {
    let sql = "SELECT series_id, name, scoring_mode, total_rounds, roster, points_by_rank FROM series WHERE series_id = ?1";

    let series = conn
        .query_row(sql, params![series_id], parse_series_row)
        .optional()?;
    Ok(series)
}

/// Replaces the stored table with a freshly computed one
pub fn store_standings(conn: &Connection, snapshot: &StandingsSnapshot) -> LedgerResult<()> {
    let sql = "INSERT INTO series_standings (series_id, round_index, standings, computed_at) VALUES (?1, ?2, ?3, ?4) ON CONFLICT(series_id) DO UPDATE SET round_index = excluded.round_index, standings = excluded.standings, computed_at = excluded.computed_at";

    conn.execute(
        sql,
        params![
            snapshot.series_id,
            snapshot.round_index,
            serde_json::to_string(snapshot)?,
            snapshot.computed_at
        ],
    )?;
    Ok(())
}

pub fn latest_standings(
    conn: &Connection,
    series_id: &str,
) -> LedgerResult<Option<StandingsSnapshot>> {
    let sql = "SELECT standings FROM series_standings WHERE series_id = ?1";

    let snapshot = conn
        .query_row(sql, params![series_id], |row| json_column(row, 0))
        .optional()?;
    Ok(snapshot)
}
