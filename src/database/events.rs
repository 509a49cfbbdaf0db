use chrono::Utc;
use log::debug;
use rusqlite::{params, Connection, OptionalExtension, TransactionBehavior};

use super::models::{json_column, optional_json_column, BarrierState, EventRecord, GroupRecord};
use super::{rounds, series};
use crate::domain::{EventSpec, EventStatus, GroupStatus, LeaderboardEntry, Round};
use crate::errors::{LedgerError, LedgerResult};

const EVENT_COLUMNS: &str = "event_id, name, status, total_groups, completed_groups, final_leaderboard, rivalries_processed, series_id, round_index, version, finalized_at";

/// Registers an event and its groups. Returns `false` if it already existed.
/// An event tied to a series must name a registered series and one of its
/// rounds.
pub fn insert_event(conn: &mut Connection, spec: &EventSpec) -> LedgerResult<bool> {
    let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

    if let Some(series_id) = &spec.series_id {
        validate_series_round(&tx, spec, series_id)?;
    }

    let inserted = tx.execute(
        "INSERT INTO events (event_id, name, total_groups, series_id, round_index) VALUES (?1, ?2, ?3, ?4, ?5) ON CONFLICT(event_id) DO NOTHING",
        params![
            spec.event_id,
            spec.name,
            spec.groups.len() as u32,
            spec.series_id,
            spec.round_index
        ],
    )?;
    if inserted == 0 {
        return Ok(false);
    }

    for (position, group) in spec.groups.iter().enumerate() {
        tx.execute(
            "INSERT INTO event_groups (event_id, group_id, position, player_ids) VALUES (?1, ?2, ?3, ?4)",
            params![
                spec.event_id,
                group.group_id,
                position as u32,
                serde_json::to_string(&group.player_ids)?
            ],
        )?;
    }

    tx.commit()?;
    Ok(true)
}

fn validate_series_round(conn: &Connection, spec: &EventSpec, series_id: &str) -> LedgerResult<()> {
    let series = series::find_by_id(conn, series_id)?
        .ok_or_else(|| LedgerError::SeriesNotFound(series_id.to_string()))?;

    match spec.round_index {
        Some(idx) if idx < series.total_rounds => Ok(()),
        round_index => Err(LedgerError::InvalidRoundIndex {
            event_id: spec.event_id.clone(),
            series_id: series_id.to_string(),
            round_index,
            total_rounds: series.total_rounds,
        }),
    }
}

pub fn find_event(conn: &Connection, event_id: &str) -> LedgerResult<Option<EventRecord>> {
    let Some(mut event) = find_event_row(conn, event_id)? else {
        return Ok(None);
    };
    event.groups = list_groups(conn, event_id)?;
    Ok(Some(event))
}

fn find_event_row(conn: &Connection, event_id: &str) -> LedgerResult<Option<EventRecord>> {
    let sql = format!("SELECT {} FROM events WHERE event_id = ?1", EVENT_COLUMNS);
    let event = conn
        .query_row(&sql, params![event_id], parse_event_row)
        .optional()?;
    Ok(event)
}

fn parse_event_row(row: &rusqlite::Row) -> rusqlite::Result<EventRecord> {
    let status: String = row.get(2)?;
    Ok(EventRecord {
        event_id: row.get(0)?,
        name: row.get(1)?,
        status: EventStatus::parse(&status),
        total_groups: row.get(3)?,
        completed_groups: row.get(4)?,
        final_leaderboard: optional_json_column(row, 5)?,
        rivalries_processed: row.get(6)?,
        series_id: row.get(7)?,
        round_index: row.get(8)?,
        version: row.get(9)?,
        finalized_at: row.get(10)?,
        groups: Vec::new(),
    })
}

pub fn list_groups(conn: &Connection, event_id: &str) -> LedgerResult<Vec<GroupRecord>> {
    let sql = "SELECT group_id, position, player_ids, status, round_ref FROM event_groups WHERE event_id = ?1 ORDER BY position";

    let mut stmt = conn.prepare(sql)?;
    let rows = stmt
        .query_map(params![event_id], parse_group_row)?
        .collect::<rusqlite::Result<Vec<_>>>()?;

    Ok(rows)
}

fn find_group(
    conn: &Connection,
    event_id: &str,
    group_id: &str,
) -> LedgerResult<Option<GroupRecord>> {
    let sql = "SELECT group_id, position, player_ids, status, round_ref FROM event_groups WHERE event_id = ?1 AND group_id = ?2";

    let group = conn
        .query_row(sql, params![event_id, group_id], parse_group_row)
        .optional()?;
    Ok(group)
}

fn parse_group_row(row: &rusqlite::Row) -> rusqlite::Result<GroupRecord> {
    let status: String = row.get(3)?;
    Ok(GroupRecord {
        group_id: row.get(0)?,
        position: row.get(1)?,
        player_ids: json_column(row, 2)?,
        status: GroupStatus::parse(&status),
        round_ref: row.get(4)?,
    })
}

/// The completion barrier.
///
/// Stores the round, marks its group complete and bumps the event's
/// completed-group counter in one transaction. The counter update is
/// conditional on the version read at the start, so a concurrent writer
/// turns into `LedgerError::Conflict` instead of a lost increment. A group
/// that is already complete is reported back unchanged.
pub fn complete_group(conn: &mut Connection, round: &Round) -> LedgerResult<BarrierState> {
    let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

    let event = find_event_row(&tx, &round.event_id)?
        .ok_or_else(|| LedgerError::EventNotFound(round.event_id.clone()))?;
    let group = find_group(&tx, &round.event_id, &round.group_id)?.ok_or_else(|| {
        LedgerError::GroupNotInEvent {
            event_id: round.event_id.clone(),
            group_id: round.group_id.clone(),
        }
    })?;

    if group.status == GroupStatus::Complete {
        debug!(
            "Group {} of event {} already complete; duplicate signal ignored",
            round.group_id, round.event_id
        );
        return Ok(BarrierState {
            completed_groups: event.completed_groups,
            total_groups: event.total_groups,
            newly_completed: false,
        });
    }

    rounds::insert_round(&tx, round)?;

    let marked = tx.execute(
        "UPDATE event_groups SET status = 'complete', round_ref = ?3 WHERE event_id = ?1 AND group_id = ?2 AND status = 'pending'",
        params![round.event_id, round.group_id, round.round_id],
    )?;
    if marked == 0 {
        return Err(conflict(&round.event_id));
    }

    let bumped = tx.execute(
        "UPDATE events SET completed_groups = completed_groups + 1, version = version + 1 WHERE event_id = ?1 AND version = ?2 AND completed_groups < total_groups",
        params![round.event_id, event.version],
    )?;
    if bumped == 0 {
        return Err(conflict(&round.event_id));
    }

    tx.commit()?;

    Ok(BarrierState {
        completed_groups: event.completed_groups + 1,
        total_groups: event.total_groups,
        newly_completed: true,
    })
}

/// Flips the event to `complete` and stores its leaderboard.
///
/// Returns `true` only for the caller that performed the transition; a
/// caller that finds the event already complete gets `false`.
pub fn claim_finalization(
    conn: &mut Connection,
    event_id: &str,
    expected_version: i64,
    leaderboard: &[LeaderboardEntry],
) -> LedgerResult<bool> {
    let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

    let updated = tx.execute(
        "UPDATE events SET status = 'complete', final_leaderboard = ?2, finalized_at = ?3, version = version + 1 WHERE event_id = ?1 AND version = ?4 AND status = 'pending' AND completed_groups = total_groups",
        params![
            event_id,
            serde_json::to_string(leaderboard)?,
            Utc::now(),
            expected_version
        ],
    )?;

    if updated == 0 {
        let event = find_event_row(&tx, event_id)?
            .ok_or_else(|| LedgerError::EventNotFound(event_id.to_string()))?;
        return if event.is_complete() {
            Ok(false)
        } else {
            Err(conflict(event_id))
        };
    }

    tx.commit()?;
    Ok(true)
}

pub fn mark_rivalries_processed(conn: &Connection, event_id: &str) -> LedgerResult<()> {
    conn.execute(
        "UPDATE events SET rivalries_processed = 1, version = version + 1 WHERE event_id = ?1",
        params![event_id],
    )?;
    Ok(())
}

/// Final leaderboards of a series' completed events, by round index
pub fn list_finalized_for_series(
    conn: &Connection,
    series_id: &str,
) -> LedgerResult<Vec<(u32, Vec<LeaderboardEntry>)>> {
    let sql = "SELECT round_index, final_leaderboard FROM events WHERE series_id = ?1 AND status = 'complete' AND round_index IS NOT NULL AND final_leaderboard IS NOT NULL ORDER BY round_index, finalized_at";

    let mut stmt = conn.prepare(sql)?;
    let rows: Vec<(u32, Vec<LeaderboardEntry>)> = stmt
        .query_map(params![series_id], |row| Ok((row.get(0)?, json_column(row, 1)?)))?
        .collect::<rusqlite::Result<Vec<_>>>()?;

    Ok(rows)
}

fn conflict(event_id: &str) -> LedgerError {
    LedgerError::Conflict(format!("events/{}", event_id))
}
