//! Interactive chat console hosting a hive.
//!
//! Reads `name: command` lines from stdin and relays them to the session
//! manager, the way a chat bot relays messages from a channel. All
//! announcements go through the configured notifier, so the console and a
//! webhook-backed channel see the same traffic. The daily report scheduler
//! runs for as long as the console is open.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use clap::Args;
use focushive_core::{
    ConsoleNotifier, FanoutNotifier, Leaderboard, Notifier, ReportScheduler, Result,
    SessionManager, StaticDirectory, TaskList, WebhookNotifier,
};
use tokio::io::AsyncBufReadExt;
use tracing::info;

#[derive(Args)]
pub struct ChatArgs {
    /// Channel announcements go to
    #[arg(long, default_value = "general")]
    pub channel: String,

    /// Discord-compatible webhook URL announcements are mirrored to
    #[arg(long)]
    pub webhook: Option<String>,

    /// Countdown tick length in seconds (default: 60)
    #[arg(long, value_name = "SECS")]
    pub tick_secs: Option<u64>,
}

const HELP: &str = "\
Commands (say `name: command`):
  start [minutes]    begin a focus session
  break [minutes]    begin a break
  join               join the running session
  status             show the countdown
  stop               end the session early, no credit
  addtask <text>     add to your task list
  viewtasks          list your tasks
  deletetask <n>     remove your task number n
  leaderboard        top completed sessions
  help               this list
  quit               close the console";

pub fn run(args: ChatArgs, data_dir: Option<&Path>) -> Result<()> {
    tokio::runtime::Runtime::new()?.block_on(chat_loop(args, data_dir))
}

struct Hive {
    manager: SessionManager,
    tasks: Arc<TaskList>,
    leaderboard: Arc<Leaderboard>,
    channel: String,
}

async fn chat_loop(args: ChatArgs, data_dir: Option<&Path>) -> Result<()> {
    let store = super::open_store(data_dir)?;
    let config = super::load_config(data_dir)?;

    let mut session_config = config.session.clone();
    if let Some(secs) = args.tick_secs {
        session_config.tick = Duration::from_secs(secs.max(1));
    }

    let console: Arc<dyn Notifier> = Arc::new(ConsoleNotifier::new());
    let notifier: Arc<dyn Notifier> = match &args.webhook {
        Some(url) => {
            info!(url, "mirroring announcements to webhook");
            let sinks: Vec<Arc<dyn Notifier>> =
                vec![console, Arc::new(WebhookNotifier::new(url.clone()))];
            Arc::new(FanoutNotifier::new(sinks))
        }
        None => console,
    };

    let leaderboard = Arc::new(Leaderboard::load(store.clone())?);
    let tasks = Arc::new(TaskList::load(store)?);
    let manager = SessionManager::new(leaderboard.clone(), notifier.clone(), session_config);

    let mut directory = StaticDirectory::new();
    directory.add_group("hive");
    directory.set_report_channel("hive", &args.channel);
    let scheduler = Arc::new(ReportScheduler::new(
        tasks.clone(),
        notifier,
        Arc::new(directory),
        config.report.clone(),
    ));
    let report_task = scheduler.spawn();

    let hive = Hive {
        manager,
        tasks,
        leaderboard,
        channel: args.channel.clone(),
    };

    println!(
        "focushive console on #{}. Lines are `name: command`; `help` lists commands, `quit` leaves.",
        args.channel
    );

    let mut lines = tokio::io::BufReader::new(tokio::io::stdin()).lines();
    loop {
        tokio::select! {
            line = lines.next_line() => {
                match line? {
                    Some(line) => {
                        if !handle_line(&hive, &line).await {
                            break;
                        }
                    }
                    None => break,
                }
            }
            _ = tokio::signal::ctrl_c() => {
                println!();
                break;
            }
        }
    }

    report_task.abort();
    Ok(())
}

/// Returns false when the console should close.
async fn handle_line(hive: &Hive, line: &str) -> bool {
    let line = line.trim();
    if line.is_empty() {
        return true;
    }
    match line {
        "quit" | "exit" => return false,
        "help" => {
            println!("{HELP}");
            return true;
        }
        _ => {}
    }

    match parse_line(line) {
        Some((speaker, input)) => handle_command(hive, &speaker, &input).await,
        None => println!("Say `name: command`, e.g. `ada: start 25`. `help` lists commands."),
    }
    true
}

async fn handle_command(hive: &Hive, speaker: &str, input: &str) {
    let (verb, rest) = match input.split_once(char::is_whitespace) {
        Some((verb, rest)) => (verb, rest.trim()),
        None => (input, ""),
    };

    match verb.to_lowercase().as_str() {
        "start" => match parse_minutes(rest, "start") {
            Ok(minutes) => {
                if let Err(e) = hive.manager.start(speaker, speaker, &hive.channel, minutes).await {
                    println!("⚠️  {e}");
                }
            }
            Err(usage) => println!("{usage}"),
        },
        "break" => match parse_minutes(rest, "break") {
            Ok(minutes) => {
                if let Err(e) = hive
                    .manager
                    .start_break(speaker, speaker, &hive.channel, minutes)
                    .await
                {
                    println!("⚠️  {e}");
                }
            }
            Err(usage) => println!("{usage}"),
        },
        "join" => {
            if let Err(e) = hive.manager.join(speaker, speaker).await {
                println!("⚠️  {e}");
            }
        }
        "status" => {
            let view = hive.manager.status();
            if view.active {
                let kind = view.kind.map(|k| k.to_string()).unwrap_or_default();
                println!(
                    "⏳ {kind} session, {} remaining. In: {}",
                    view.remaining,
                    view.participants.join(", ")
                );
            } else {
                println!("No session right now. `start` one?");
            }
        }
        "stop" => {
            if let Err(e) = hive.manager.stop().await {
                println!("⚠️  {e}");
            }
        }
        "addtask" => match hive.tasks.add(speaker, rest) {
            Ok(number) => println!("📝 Added task #{number}: {rest}"),
            Err(e) => println!("⚠️  {e}"),
        },
        "viewtasks" => {
            let entries = hive.tasks.list(speaker);
            if entries.is_empty() {
                println!("{speaker} has no tasks.");
            } else {
                for entry in entries {
                    println!("{}. {}", entry.index, entry.text);
                }
            }
        }
        "deletetask" => match rest.parse::<usize>() {
            Ok(index) => match hive.tasks.delete_at(speaker, index) {
                Ok(removed) => println!("🗑  Removed task #{index}: {removed}"),
                Err(e) => println!("⚠️  {e}"),
            },
            Err(_) => println!("usage: deletetask <number>"),
        },
        "leaderboard" => {
            let top = hive.leaderboard.top(10);
            if top.is_empty() {
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
        other => println!("Unknown command `{other}`. Type `help` for the list."),
    }
}

/// Splits a chat line into speaker and command at the first colon.
fn parse_line(line: &str) -> Option<(String, String)> {
    let (speaker, rest) = line.split_once(':')?;
    let speaker = speaker.trim();
    let rest = rest.trim();
    if speaker.is_empty() || rest.is_empty() {
        return None;
    }
    Some((speaker.to_string(), rest.to_string()))
}

fn parse_minutes(rest: &str, verb: &str) -> Result<Option<i64>, String> {
    if rest.is_empty() {
        return Ok(None);
    }
    rest.split_whitespace()
        .next()
        .unwrap_or("")
        .parse::<i64>()
        .map(Some)
        .map_err(|_| format!("usage: {verb} [minutes]"))
}
