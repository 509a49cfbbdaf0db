use anyhow::{Context, Result};
use log::info;
use rusqlite::Connection;

const TABLES: &[&str] = &[
    "feed_card_quota",
    "series_standings",
    "series",
    "rivalry_applications",
    "opponent_rounds",
    "rivalries",
    "rounds",
    "event_groups",
    "events",
];

/// Drops every ledger table and recreates the schema
pub fn reset_database(conn: &Connection) -> Result<()> {
    for table in TABLES {
        execute_sql(conn, &format!("DROP TABLE IF EXISTS {}", table))
            .with_context(|| format!("Failed to drop table {}", table))?;
    }

    ensure_schema(conn)?;
    info!("Database schema reset successfully");
    Ok(())
}

/// Creates any missing tables and indexes; existing data is kept
pub fn ensure_schema(conn: &Connection) -> Result<()> {
    let schema_sql = include_str!("schema.sql");
    let statements = split_sql_statements(schema_sql);

    for (idx, statement) in statements.iter().enumerate() {
        execute_sql(conn, statement)
            .with_context(|| format!("Failed to execute statement {}", idx + 1))?;
    }

    Ok(())
}

fn split_sql_statements(sql: &str) -> Vec<String> {
    sql.split(';')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

fn execute_sql(conn: &Connection, sql: &str) -> Result<()> {
    conn.execute(sql, [])
        .context("Failed to execute SQL statement")
        .map(|_| ())
}
