use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "outing-ledger: leaderboards, rivalries and standings for golf outings"
)]
pub struct Cli {
    /// Command
    #[clap(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
#[clap(rename_all = "lower_case")]
pub enum Command {
    /// Start the ledger server
    Serve {
        /// Port number (optional, defaults to 3000)
        #[arg(short, long, default_value_t = 3000)]
        port: u16,
    },
    /// Drop and recreate the database schema
    Init,
    /// Register series/events and replay round deliveries from a JSON batch file
    Ingest {
        /// Path to the batch file
        path: PathBuf,
    },
    /// Print the final leaderboard of an event
    Leaderboard {
        /// Event identifier
        event_id: String,
    },
    /// Print the latest standings of a series
    Standings {
        /// Series identifier
        series_id: String,
    },
    /// Print the rivalry between two players (order does not matter)
    Rivalry {
        player_a: String,
        player_b: String,
    },
}
