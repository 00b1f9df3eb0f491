//! Daily report scheduling.
//!
//! Once a day, at a configured local time, every group with a report
//! channel gets a summary of everyone's open tasks. The scheduler sleeps
//! until the next occurrence of that time rather than polling, so the
//! report fires at the configured minute no matter when the process
//! started.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Local, NaiveTime};
use serde::{Deserialize, Serialize};
use tokio::task::JoinHandle;
use tokio::time::sleep;
use tracing::{debug, info};

use crate::notify::{Directory, Notifier};
use crate::tasklist::TaskList;

/// When the daily report goes out, in local time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportConfig {
    /// Hour of day (0-23)
    #[serde(default = "default_report_hour")]
    pub hour: u32,

    /// Minute within the hour
    #[serde(default)]
    pub minute: u32,
}

fn default_report_hour() -> u32 {
    22
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            hour: default_report_hour(),
            minute: 0,
        }
    }
}

impl ReportConfig {
    /// Time until the next occurrence of the configured local time.
    ///
    /// If `now` is exactly on the mark the report is considered sent and
    /// the next run is a day away.
    pub fn next_run_delay(&self, now: DateTime<Local>) -> Duration {
        let target = NaiveTime::from_hms_opt(self.hour.min(23), self.minute.min(59), 0)
            .unwrap_or(NaiveTime::MIN);
        let mut candidate = now.date_naive().and_time(target);
        if candidate <= now.naive_local() {
            candidate += chrono::Duration::days(1);
        }
        (candidate - now.naive_local())
            .to_std()
            .unwrap_or(Duration::from_secs(60))
    }
}

/// Sends the daily open-task summary to every group's report channel.
pub struct ReportScheduler {
    tasks: Arc<TaskList>,
    notifier: Arc<dyn Notifier>,
    directory: Arc<dyn Directory>,
    config: ReportConfig,
}

impl ReportScheduler {
    pub fn new(
        tasks: Arc<TaskList>,
        notifier: Arc<dyn Notifier>,
        directory: Arc<dyn Directory>,
        config: ReportConfig,
    ) -> Self {
        Self {
            tasks,
            notifier,
            directory,
            config,
        }
    }

    /// Spawns the scheduler loop. Drop or abort the handle to stop it.
    pub fn spawn(self: Arc<Self>) -> JoinHandle<()> {
        tokio::spawn(async move {
            info!(
                hour = self.config.hour,
                minute = self.config.minute,
                "daily report scheduler running"
            );
            loop {
                let delay = self.config.next_run_delay(Local::now());
                debug!(seconds = delay.as_secs(), "next daily report scheduled");
                sleep(delay).await;
                self.run_once().await;
            }
        })
    }

    /// Builds today's report and delivers it to every group that has a
    /// report channel. Groups without one are skipped; so is the whole
    /// run when nobody has open tasks.
    pub async fn run_once(&self) {
        let text = match self.compose() {
            Some(text) => text,
            None => {
                debug!("no open tasks, skipping daily report");
                return;
            }
        };
        for group in self.directory.groups() {
            match self.directory.report_channel(&group) {
                Some(channel) => self.notifier.notify(&channel, &text).await,
                None => debug!(%group, "group has no report channel, skipping"),
            }
        }
    }

    fn compose(&self) -> Option<String> {
        // One snapshot covers users and their texts together, so nothing
        // deleted mid-compose can leave a bare "name:" line.
        let open = self.tasks.open_tasks();
        if open.is_empty() {
            return None;
        }

        let mut text = String::from("📋 Daily focus report. Open tasks:");
        for (user, texts) in open {
            let name = self
                .directory
                .display_name(&user)
                .unwrap_or_else(|| user.clone());
            text.push_str(&format!("\n{name}: {}", texts.join(", ")));
        }
        Some(text)
    }
}
