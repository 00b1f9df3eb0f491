use std::path::PathBuf;

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "focushive-cli", version, about = "Focushive CLI")]
struct Cli {
    /// Data directory override (default: ~/.config/focushive)
    #[arg(long, global = true, value_name = "DIR")]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Interactive chat console hosting a hive
    Chat(commands::chat::ChatArgs),
    /// Task list management
    Task {
        #[command(subcommand)]
        action: commands::task::TaskAction,
    },
    /// Leaderboard queries
    Leaderboard {
        #[command(subcommand)]
        action: commands::leaderboard::LeaderboardAction,
    },
    /// Daily report controls
    Report {
        #[command(subcommand)]
        action: commands::report::ReportAction,
    },
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
}

fn main() {
    init_tracing();

    let cli = Cli::parse();
    let data_dir = cli.data_dir.as_deref();
    let result = match cli.command {
        Commands::Chat(args) => commands::chat::run(args, data_dir),
        Commands::Task { action } => commands::task::run(action, data_dir),
        Commands::Leaderboard { action } => commands::leaderboard::run(action, data_dir),
        Commands::Report { action } => commands::report::run(action, data_dir),
        Commands::Config { action } => commands::config::run(action, data_dir),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

fn init_tracing() {
    // FOCUSHIVE_LOG=debug (etc.) turns diagnostics up; the default keeps
    // the chat console clear of log noise.
    let filter = tracing_subscriber::EnvFilter::try_from_env("FOCUSHIVE_LOG")
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}
