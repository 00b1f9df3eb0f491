//! Daily report commands for CLI.

use std::path::Path;
use std::sync::Arc;

use chrono::Local;
use clap::Subcommand;
use focushive_core::{
    ConsoleNotifier, Notifier, ReportScheduler, Result, StaticDirectory, TaskList, WebhookNotifier,
};

#[derive(Subcommand)]
pub enum ReportAction {
    /// Build today's report and deliver it now
    Now {
        /// Channel the report is delivered to
        #[arg(long, default_value = "daily-reports")]
        channel: String,
        /// Discord-compatible webhook URL to deliver through
        #[arg(long)]
        webhook: Option<String>,
    },
    /// Show when the next scheduled report will run
    Next,
}

pub fn run(action: ReportAction, data_dir: Option<&Path>) -> Result<()> {
    match action {
        ReportAction::Now { channel, webhook } => {
            let store = super::open_store(data_dir)?;
            let config = super::load_config(data_dir)?;
            let tasks = Arc::new(TaskList::load(store)?);
            let notifier: Arc<dyn Notifier> = match webhook {
                Some(url) => Arc::new(WebhookNotifier::new(url)),
                None => Arc::new(ConsoleNotifier::new()),
            };

            let mut directory = StaticDirectory::new();
            directory.add_group("hive");
            directory.set_report_channel("hive", channel);

            let scheduler =
                ReportScheduler::new(tasks, notifier, Arc::new(directory), config.report);
            tokio::runtime::Runtime::new()?.block_on(scheduler.run_once());
        }
        ReportAction::Next => {
            let config = super::load_config(data_dir)?;
            let delay = config.report.next_run_delay(Local::now());
            let total_mins = delay.as_secs() / 60;
            println!(
                "Next daily report in {}h {:02}m (at {:02}:{:02} local time).",
                total_mins / 60,
                total_mins % 60,
                config.report.hour,
                config.report.minute
            );
        }
    }
    Ok(())
}
