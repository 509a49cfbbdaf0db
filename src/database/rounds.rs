use rusqlite::{params, Connection, OptionalExtension};

use super::models::json_column;
use crate::domain::{Round, RoundStatus};
use crate::errors::LedgerResult;

/// Stores a finished round. An existing round is never overwritten.
pub fn insert_round(conn: &Connection, round: &Round) -> LedgerResult<bool> {
    let sql = "INSERT INTO rounds (round_id, event_id, group_id, status, context, players) VALUES (?1, ?2, ?3, ?4, ?5, ?6) ON CONFLICT(round_id) DO NOTHING";

    let inserted = conn.execute(
        sql,
        params![
            round.round_id,
            round.event_id,
            round.group_id,
            round.status.as_str(),
            serde_json::to_string(&round.context)?,
            serde_json::to_string(&round.players)?
        ],
    )?;

    Ok(inserted > 0)
}

fn parse_round_row(row: &rusqlite::Row) -> rusqlite::Result<Round> {
    let status: String = row.get(3)?;
    let status = RoundStatus::parse(&status).ok_or_else(|| {
        rusqlite::Error::FromSqlConversionFailure(
            3,
            rusqlite::types::Type::Text,
            format!("unknown round status {}", status).into(),
        )
    })?;

    Ok(Round {
        round_id: row.get(0)?,
        event_id: row.get(1)?,
        group_id: row.get(2)?,
        status,
        context: json_column(row, 4)?,
        players: json_column(row, 5)?,
    })
}

pub fn find_by_id(conn: &Connection, round_id: &str) -> LedgerResult<Option<Round>> {
    let sql = "SELECT round_id, event_id, group_id, status, context, players FROM rounds WHERE round_id = ?1";

    let round = conn
        .query_row(sql, params![round_id], parse_round_row)
        .optional()?;
    Ok(round)
}

/// The rounds that completed each group of an event, in group order
pub fn list_for_event(conn: &Connection, event_id: &str) -> LedgerResult<Vec<Round>> {
    let sql = "
        SELECT r.round_id, r.event_id, r.group_id, r.status, r.context, r.players
        FROM rounds r
        JOIN event_groups g ON g.event_id = r.event_id AND g.round_ref = r.round_id
        WHERE r.event_id = ?1
        ORDER BY g.position
    ";

    let mut stmt = conn.prepare(sql)?;
    let rows = stmt
        .query_map(params![event_id], parse_round_row)?
        .collect::<rusqlite::Result<Vec<_>>>()?;

    Ok(rows)
}
