//! Core error types for focushive-core.
//!
//! This module defines the error hierarchy using thiserror. Each concern
//! keeps its own enum so callers can match precisely; everything converts
//! into [`CoreError`] at the boundary.

use std::path::PathBuf;
use thiserror::Error;

pub use crate::store::StoreError;

/// Core error type for focushive-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Session lifecycle errors
    #[error("Session error: {0}")]
    Session(#[from] SessionError),

    /// Task list errors
    #[error("Task error: {0}")]
    Task(#[from] TaskError),

    /// Persistence errors
    #[error("Storage error: {0}")]
    Store(#[from] StoreError),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic errors with context
    #[error("{0}")]
    Custom(String),
}

/// Session lifecycle errors.
///
/// These are expected rejections, not faults: the chat surface relays the
/// message to the user and the current session (if any) is untouched.
#[derive(Error, Debug)]
pub enum SessionError {
    /// A start request while a session is running
    #[error("A session is already running")]
    AlreadyRunning,

    /// Join/status/stop with nothing running
    #[error("No session is currently active")]
    NoActiveSession,

    /// Joining the same session twice
    #[error("{0} has already joined this session")]
    AlreadyJoined(String),

    /// Duration outside the accepted range
    #[error("Invalid duration: {minutes} minutes (must be between 1 and {max})")]
    InvalidDuration { minutes: i64, max: i64 },
}

/// Task list errors.
#[derive(Error, Debug)]
pub enum TaskError {
    /// Adding a task with no text
    #[error("Task text cannot be empty")]
    EmptyText,

    /// Deleting a task number the user does not have
    #[error("Task {index} does not exist (you have {len} tasks)")]
    InvalidIndex { index: usize, len: usize },

    /// Writing the task list back failed
    #[error("Storage error: {0}")]
    Store(#[from] StoreError),
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Data directory could not be prepared
    #[error("Data directory unavailable: {0}")]
    DataDir(#[from] StoreError),

    /// Failed to load configuration
    #[error("Failed to load configuration from {}: {message}", .path.display())]
    LoadFailed { path: PathBuf, message: String },

    /// Failed to save configuration
    #[error("Failed to save configuration to {}: {message}", .path.display())]
    SaveFailed { path: PathBuf, message: String },

    /// Failed to parse configuration
    #[error("Failed to parse configuration: {0}")]
    ParseFailed(String),
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;
