use anyhow::Result;

use outing_ledger::cli::Command;
use outing_ledger::{
    handle_ingest, handle_init, handle_leaderboard, handle_rivalry, handle_serve,
    handle_standings, interpret,
};

fn main() {
    setup_logging();
    parse_and_execute().unwrap_or_else(|e| {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    });
}

fn setup_logging() {
    sensible_env_logger::init!();
}

fn parse_and_execute() -> Result<()> {
    let command = interpret();
    execute_command(&command)
}

fn execute_command(command: &Command) -> Result<()> {
    match command {
        Command::Serve { port } => handle_serve(*port),
        Command::Init => handle_init(),
        Command::Ingest { path } => handle_ingest(path),
        Command::Leaderboard { event_id } => handle_leaderboard(event_id),
        Command::Standings { series_id } => handle_standings(series_id),
        Command::Rivalry { player_a, player_b } => handle_rivalry(player_a, player_b),
    }
}
