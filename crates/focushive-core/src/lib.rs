//! # Focushive Core Library
//!
//! This library provides the core logic for focushive, a group focus-session
//! coordinator for a shared chat space. One session runs at a time; everyone
//! who joins before the countdown ends is credited on a persistent
//! leaderboard, and a daily report reminds each chat group of everyone's
//! still-open tasks at a fixed local time.
//!
//! ## Architecture
//!
//! - **Sessions**: a mutex-guarded state machine whose spawned countdown
//!   task announces progress once per minute and settles credit at zero
//! - **Storage**: whole-document JSON key-value persistence plus TOML-based
//!   configuration
//! - **Notifications**: a fire-and-forget [`Notifier`] trait with console
//!   and Discord-compatible webhook implementations
//! - **Reports**: a scheduler that sleeps until the configured local time
//!   and delivers a daily summary per group
//!
//! ## Key Components
//!
//! - [`SessionManager`]: session lifecycle and countdown
//! - [`Leaderboard`]: completed-session counts per user
//! - [`TaskList`]: per-user open task lists
//! - [`ReportScheduler`]: daily report delivery
//! - [`JsonFileStore`]: on-disk persistence

pub mod session;
pub mod leaderboard;
pub mod tasklist;
pub mod report;
pub mod notify;
pub mod store;
pub mod config;
pub mod error;

pub use session::{Participant, SessionConfig, SessionKind, SessionManager, SessionView};
pub use leaderboard::{Leaderboard, LeaderboardRecord};
pub use tasklist::{TaskEntry, TaskList};
pub use report::{ReportConfig, ReportScheduler};
pub use notify::{
    ChannelId, ConsoleNotifier, Directory, FanoutNotifier, GroupId, Notifier, StaticDirectory,
    UserId, WebhookNotifier,
};
pub use store::{data_dir, JsonFileStore, MemoryStore, Store};
pub use config::HiveConfig;
pub use error::{ConfigError, CoreError, Result, SessionError, StoreError, TaskError};
