//! Leaderboard commands for CLI.

use std::path::Path;

use clap::Subcommand;
use focushive_core::{Leaderboard, Result};

#[derive(Subcommand)]
pub enum LeaderboardAction {
    /// Show the top of the leaderboard
    Show {
        /// How many rows to show
        #[arg(long, default_value_t = 10)]
        limit: usize,
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },
}

pub fn run(action: LeaderboardAction, data_dir: Option<&Path>) -> Result<()> {
    let board = Leaderboard::load(super::open_store(data_dir)?)?;

    match action {
        LeaderboardAction::Show { limit, json } => {
            let top = board.top(limit);
            if json {
                println!("{}", serde_json::to_string_pretty(&top)?);
            } else if top.is_empty() {
                println!("No completed sessions yet.");
            } else {
                for (i, record) in top.iter().enumerate() {
                    let unit = if record.completed_sessions == 1 {
                        "session"
                    } else {
                        "sessions"
                    };
                    println!(
                        "{}. {}: {} {}",
                        i + 1,
                        record.display_name,
                        record.completed_sessions,
                        unit
                    );
                }
            }
        }
    }
    Ok(())
}
