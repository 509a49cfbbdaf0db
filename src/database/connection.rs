use std::thread;
use std::time::Duration;

use anyhow::{Context, Result};
use log::warn;
use r2d2_sqlite::SqliteConnectionManager;

use crate::config::settings::DatabaseSettings;
use crate::errors::LedgerError;

pub type DbPool = r2d2::Pool<SqliteConnectionManager>;
pub type DbConn = r2d2::PooledConnection<SqliteConnectionManager>;

pub fn create_pool(settings: &DatabaseSettings) -> Result<DbPool> {
    let manager = build_manager(settings);
    build_pool(manager, settings.pool_size)
}

fn build_manager(settings: &DatabaseSettings) -> SqliteConnectionManager {
    let busy_timeout = Duration::from_millis(settings.busy_timeout_ms);
    SqliteConnectionManager::file(&settings.path).with_init(move |conn| {
        conn.busy_timeout(busy_timeout)?;
        conn.execute_batch("PRAGMA foreign_keys = ON;")
    })
}

fn build_pool(manager: SqliteConnectionManager, size: u32) -> Result<DbPool> {
    r2d2::Pool::builder()
        .max_size(size)
        .build(manager)
        .context("Failed to create database connection pool")
}

pub fn get_connection(pool: &DbPool) -> Result<DbConn> {
    pool.get()
        .context("Failed to get database connection from pool")
}

/// Runs a read-modify-write until it applies, it fails for a reason other
/// than a conflict, or `max_attempts` is used up.
pub fn with_retry<T, F>(max_attempts: u32, label: &str, mut operation: F) -> Result<T, LedgerError>
where
    F: FnMut() -> Result<T, LedgerError>,
{
    let attempts = max_attempts.max(1);
    let mut attempt = 1;

    loop {
        match operation() {
            Ok(value) => return Ok(value),
            Err(err) if err.is_retryable() && attempt < attempts => {
                warn!("{} attempt {}/{} failed: {}; retrying", label, attempt, attempts, err);
                thread::sleep(backoff(attempt));
                attempt += 1;
            }
            Err(err) if err.is_retryable() => {
                return Err(LedgerError::RetriesExhausted {
                    attempts,
                    last: Box::new(err),
                });
            }
            Err(err) => return Err(err),
        }
    }
}

fn backoff(attempt: u32) -> Duration {
    Duration::from_millis(5 * 2u64.pow(attempt.min(6)))
}
