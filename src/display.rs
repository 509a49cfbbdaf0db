use colored::Colorize;

use crate::database::EventRecord;
use crate::domain::LeaderboardEntry;
use crate::rivalry::Rivalry;
use crate::standings::{Standing, StandingsSnapshot};

pub fn print_event(event: &EventRecord) {
    println!(
        "{} {} ({}/{} groups, {})",
        event.name.bold(),
        format!("[{}]", event.event_id).dimmed(),
        event.completed_groups,
        event.total_groups,
        event.status.as_str()
    );

    match &event.final_leaderboard {
        Some(board) => print_leaderboard(board),
        None => println!("{}", "Leaderboard not final yet".yellow()),
    }
}

fn print_leaderboard(board: &[LeaderboardEntry]) {
    println!(
        "{:>4}  {:<24} {:>5} {:>5} {:>5} {:>5}",
        "Pos", "Player", "Net", "Gross", "Par", "Holes"
    );

    for entry in board {
        let name = if entry.on_platform {
            entry.display_name.normal()
        } else {
            entry.display_name.dimmed()
        };
        let line = format!(
            "{:>4}  {:<24} {:>5} {:>5} {:>5} {:>5}",
            entry.rank,
            name,
            entry.net,
            entry.gross,
            format_to_par(entry.to_par),
            entry.holes_completed
        );

        if entry.rank == 1 {
            println!("{}", line.green().bold());
        } else {
            println!("{}", line);
        }
    }
}

fn format_to_par(to_par: i32) -> String {
    match to_par {
        0 => "E".to_string(),
        n if n > 0 => format!("+{}", n),
        n => n.to_string(),
    }
}

pub fn print_standings(snapshot: &StandingsSnapshot) {
    println!(
        "{} after round {} ({})",
        snapshot.series_id.bold(),
        snapshot.round_index + 1,
        snapshot.scoring_mode.as_str()
    );

    for standing in &snapshot.standings {
        println!("{}", standing_line(standing));
    }
}

fn standing_line(standing: &Standing) -> String {
    let rank = standing
        .rank
        .map(|r| r.to_string())
        .unwrap_or_else(|| "-".to_string());
    let rounds: Vec<String> = standing
        .round_scores
        .iter()
        .map(|score| score.map(|s| s.to_string()).unwrap_or_else(|| "·".to_string()))
        .collect();
    let total = standing
        .total
        .map(|t| t.to_string())
        .unwrap_or_else(|| "-".to_string());

    let line = format!(
        "{:>4}  {:<24} {:>7}  {}",
        rank,
        standing.display_name,
        total,
        rounds.join(" ")
    );

    if standing.has_played() {
        line
    } else {
        line.dimmed().to_string()
    }
}

pub fn print_rivalry(rivalry: &Rivalry) {
    println!(
        "{} vs {}: {}",
        rivalry.player_a.display_name.bold(),
        rivalry.player_b.display_name.bold(),
        rivalry.score_line().cyan()
    );

    if let Some(leader) = rivalry.leader() {
        println!("  Leader: {}", leader.display_name.green());
    } else {
        println!("  {}", "All square".yellow());
    }

    if let Some(holder) = &rivalry.belt_holder {
        println!("  Belt: {}", rivalry.name_of(holder));
    }

    if let Some(player) = &rivalry.current_streak.player_id {
        println!(
            "  Streak: {} x{} (longest {})",
            rivalry.name_of(player),
            rivalry.current_streak.count,
            rivalry.longest_streak.count
        );
    }

    println!(
        "  {} matches, {} to {}",
        rivalry.total_matches,
        rivalry.first_match_at.format("%Y-%m-%d"),
        rivalry.last_match_at.format("%Y-%m-%d")
    );

    for result in &rivalry.recent_results {
        let outcome = match &result.winner {
            Some(winner) => format!("{} won", rivalry.name_of(winner)),
            None => "tied".to_string(),
        };
        println!(
            "    {}  {:<20} {:>3}-{:<3} {}",
            result.played_at.format("%Y-%m-%d"),
            result.course,
            result.player_a_net,
            result.player_b_net,
            outcome
        );
    }
}
