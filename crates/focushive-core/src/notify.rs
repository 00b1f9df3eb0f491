//! Outbound notification contract and chat-space lookups.
//!
//! The session manager and report scheduler announce everything through
//! [`Notifier`]; the chat platform behind it is not this crate's concern.
//! Delivery is fire-and-forget: failures are logged, never propagated back
//! into the session lifecycle.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::json;
use tracing::warn;

/// Chat-platform user identifier.
pub type UserId = String;

/// Channel a notification is delivered to.
pub type ChannelId = String;

/// A served chat group (guild/server/workspace).
pub type GroupId = String;

/// Sends text to a channel. Fire-and-forget.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, channel: &str, text: &str);
}

/// Chat-space directory lookups the core does not implement itself.
///
/// The report scheduler uses this to resolve display names and per-group
/// report channels; a `None` means "skip and continue".
pub trait Directory: Send + Sync {
    fn display_name(&self, user: &str) -> Option<String>;

    /// Groups the daily report serves.
    fn groups(&self) -> Vec<GroupId>;

    /// The designated report channel for a group, if it has one.
    fn report_channel(&self, group: &str) -> Option<ChannelId>;
}

/// Prints notifications as chat lines on stdout.
#[derive(Default)]
pub struct ConsoleNotifier;

impl ConsoleNotifier {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Notifier for ConsoleNotifier {
    async fn notify(&self, channel: &str, text: &str) {
        println!("[#{channel}] {text}");
    }
}

/// Posts notifications to a Discord-compatible webhook.
///
/// Delivery failures are logged and swallowed; no caller sees them. All
/// session notifications happen outside the manager's lock, so waiting on
/// the request here never blocks a state change.
pub struct WebhookNotifier {
    client: reqwest::Client,
    url: String,
}

impl WebhookNotifier {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            url: url.into(),
        }
    }
}

#[async_trait]
impl Notifier for WebhookNotifier {
    async fn notify(&self, channel: &str, text: &str) {
        let body = json!({ "content": format!("[#{channel}] {text}") });
        match self.client.post(&self.url).json(&body).send().await {
            Ok(resp) if resp.status().is_success() => {}
            Ok(resp) => {
                warn!(status = %resp.status(), "webhook delivery rejected");
            }
            Err(e) => {
                warn!(error = %e, "webhook delivery failed");
            }
        }
    }
}

/// Fans every notification out to a set of sinks, in order.
///
/// The chat console uses this to keep printing locally while a webhook
/// carries the same announcements to a real channel.
pub struct FanoutNotifier {
    sinks: Vec<Arc<dyn Notifier>>,
}

impl FanoutNotifier {
    pub fn new(sinks: Vec<Arc<dyn Notifier>>) -> Self {
        Self { sinks }
    }
}

#[async_trait]
impl Notifier for FanoutNotifier {
    async fn notify(&self, channel: &str, text: &str) {
        for sink in &self.sinks {
            sink.notify(channel, text).await;
        }
    }
}

/// Fixed directory built up-front; enough for the console chat and tests.
#[derive(Default)]
pub struct StaticDirectory {
    names: HashMap<UserId, String>,
    groups: Vec<GroupId>,
    report_channels: HashMap<GroupId, ChannelId>,
}

impl StaticDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_group(&mut self, group: impl Into<GroupId>) {
        self.groups.push(group.into());
    }

    pub fn set_report_channel(&mut self, group: impl Into<GroupId>, channel: impl Into<ChannelId>) {
        self.report_channels.insert(group.into(), channel.into());
    }

    pub fn add_user(&mut self, id: impl Into<UserId>, name: impl Into<String>) {
        self.names.insert(id.into(), name.into());
    }
}

impl Directory for StaticDirectory {
    fn display_name(&self, user: &str) -> Option<String> {
        self.names.get(user).cloned()
    }

    fn groups(&self) -> Vec<GroupId> {
        self.groups.clone()
    }

    fn report_channel(&self, group: &str) -> Option<ChannelId> {
        self.report_channels.get(group).cloned()
    }
}
