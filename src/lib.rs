pub mod api;
pub mod cli;
pub mod config;
pub mod database;
pub mod display;
pub mod domain;
pub mod errors;
pub mod leaderboard;
pub mod rivalry;
pub mod services;
pub mod standings;

use std::path::Path;

use anyhow::{Context, Result};
use clap::Parser;
use cli::Cli;

use crate::cli::Command;
use crate::config::settings::AppConfig;
use crate::services::ingestion::IngestionService;
use crate::services::server::ServerService;

pub fn interpret() -> Command {
    let cli = Cli::parse();
    cli.command
}

pub fn handle_serve(port: u16) -> Result<()> {
    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(async {
        let config = AppConfig::new();
        let service = ServerService::new(port, config);
        service.run().await
    })
}

pub fn handle_init() -> Result<()> {
    let config = AppConfig::new();
    let pool = database::create_pool(&config.database)?;
    let conn = database::get_connection(&pool)?;
    database::setup::reset_database(&conn)
}

pub fn handle_ingest(path: &Path) -> Result<()> {
    let config = AppConfig::new();
    let service = IngestionService::new(config)?;
    service.run(path)
}

pub fn handle_leaderboard(event_id: &str) -> Result<()> {
    let conn = open_connection()?;
    let event = database::events::find_event(&conn, event_id)?
        .with_context(|| format!("Event {} not found", event_id))?;
    display::print_event(&event);
    Ok(())
}

pub fn handle_standings(series_id: &str) -> Result<()> {
    let conn = open_connection()?;
    let snapshot = database::series::latest_standings(&conn, series_id)?
        .with_context(|| format!("No standings computed yet for series {}", series_id))?;
    display::print_standings(&snapshot);
    Ok(())
}

pub fn handle_rivalry(player_a: &str, player_b: &str) -> Result<()> {
    let conn = open_connection()?;
    let key = rivalry::pair_key(player_a, player_b);
    let found = database::rivalries::find_by_key(&conn, &key)?
        .with_context(|| format!("No rivalry between {} and {}", player_a, player_b))?;
    display::print_rivalry(&found);
    Ok(())
}

fn open_connection() -> Result<database::DbConn> {
    let config = AppConfig::new();
    let pool = database::create_pool(&config.database)?;
    let conn = database::get_connection(&pool)?;
    database::setup::ensure_schema(&conn)?;
    Ok(conn)
}
