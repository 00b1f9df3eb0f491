//! Task list commands for CLI.

use std::path::Path;

use clap::Subcommand;
use focushive_core::{Result, TaskList};

#[derive(Subcommand)]
pub enum TaskAction {
    /// Add a task to a user's list
    Add {
        /// User the task belongs to
        #[arg(long)]
        user: String,
        /// Task text
        text: String,
    },
    /// List a user's tasks
    List {
        /// User whose tasks to show
        #[arg(long)]
        user: String,
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },
    /// Delete a task by its number
    Delete {
        /// User the task belongs to
        #[arg(long)]
        user: String,
        /// 1-based task number
        index: usize,
    },
}

pub fn run(action: TaskAction, data_dir: Option<&Path>) -> Result<()> {
    let tasks = TaskList::load(super::open_store(data_dir)?)?;

    match action {
        TaskAction::Add { user, text } => {
            let number = tasks.add(&user, &text)?;
            println!("Added task #{number} for {user}: {}", text.trim());
        }
        TaskAction::List { user, json } => {
            let entries = tasks.list(&user);
            if json {
                println!("{}", serde_json::to_string_pretty(&entries)?);
            } else if entries.is_empty() {
                println!("{user} has no tasks.");
            } else {
                for entry in entries {
                    println!("{}. {}", entry.index, entry.text);
                }
            }
        }
        TaskAction::Delete { user, index } => {
            let removed = tasks.delete_at(&user, index)?;
            println!("Removed task #{index} for {user}: {removed}");
        }
    }
    Ok(())
}
