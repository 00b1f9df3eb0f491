//! Durable key-value persistence for leaderboard and task-list documents.
//!
//! The rest of the crate never touches the disk directly: repositories
//! serialize their state to a JSON document string and hand it to a
//! [`Store`] under a well-known key. Every mutation rewrites the whole
//! document; there is no incremental or append format.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use thiserror::Error;

/// Errors raised by a store or by document (de)serialization.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("document error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Opaque durable key-value storage for whole documents.
///
/// Implementations must be safe to call from concurrent command handlers;
/// callers serialize their own read-modify-write cycles around it.
pub trait Store: Send + Sync {
    /// Fetch the document stored under `key`, or `None` if absent.
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    /// Replace the document stored under `key` in full.
    fn put(&self, key: &str, document: &str) -> Result<(), StoreError>;
}

/// Returns `~/.config/focushive[-dev]/` based on FOCUSHIVE_ENV.
///
/// Set FOCUSHIVE_ENV=dev to keep development data away from real data.
///
/// # Errors
/// Returns an error if the directory cannot be created.
pub fn data_dir() -> Result<PathBuf, StoreError> {
    let base_dir = dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config");

    let env = std::env::var("FOCUSHIVE_ENV").unwrap_or_else(|_| "production".to_string());

    let dir = if env == "dev" {
        base_dir.join("focushive-dev")
    } else {
        base_dir.join("focushive")
    };

    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}

/// File-backed store: one `<key>.json` file per key under a directory.
pub struct JsonFileStore {
    dir: PathBuf,
    /// Guards the rewrite so two handles to the same directory never
    /// interleave a partial write for the same key.
    write_lock: Mutex<()>,
}

impl JsonFileStore {
    /// Open a store rooted at `dir`, creating the directory if needed.
    ///
    /// # Errors
    /// Returns an error if the directory cannot be created.
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir)?;
        Ok(Self {
            dir,
            write_lock: Mutex::new(()),
        })
    }

    /// Open a store under the default data directory.
    ///
    /// # Errors
    /// Returns an error if the data directory cannot be created.
    pub fn open_default() -> Result<Self, StoreError> {
        Self::open(data_dir()?)
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

impl Store for JsonFileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        match std::fs::read_to_string(self.path_for(key)) {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn put(&self, key: &str, document: &str) -> Result<(), StoreError> {
        let _guard = self.write_lock.lock().unwrap_or_else(|e| e.into_inner());
        std::fs::write(self.path_for(key), document)?;
        Ok(())
    }
}

/// In-memory store for tests and ephemeral chat sessions.
///
/// `set_fail_puts(true)` makes every subsequent `put` fail, which is how the
/// best-effort persistence policy is exercised in tests.
#[derive(Default)]
pub struct MemoryStore {
    map: Mutex<HashMap<String, String>>,
    fail_puts: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_fail_puts(&self, fail: bool) {
        self.fail_puts.store(fail, Ordering::SeqCst);
    }
}

impl Store for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let map = self.map.lock().unwrap_or_else(|e| e.into_inner());
        Ok(map.get(key).cloned())
    }

    fn put(&self, key: &str, document: &str) -> Result<(), StoreError> {
        if self.fail_puts.load(Ordering::SeqCst) {
            return Err(StoreError::Io(std::io::Error::other(
                "injected put failure",
            )));
        }
        let mut map = self.map.lock().unwrap_or_else(|e| e.into_inner());
        map.insert(key.to_string(), document.to_string());
        Ok(())
    }
}
