//! Per-user task lists.
//!
//! Each user keeps an ordered list of free-text tasks, numbered from 1 in
//! the order they were added. Every mutation writes the whole document back
//! to the store before returning, so a storage failure is visible to the
//! caller immediately.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

use crate::error::TaskError;
use crate::notify::UserId;
use crate::store::{Store, StoreError};

/// Store key the task document lives under.
pub const TASKS_KEY: &str = "tasks";

/// One task as shown to the user: its 1-based number and text.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct TaskEntry {
    pub index: usize,
    pub text: String,
}

/// Shared task list handle.
pub struct TaskList {
    tasks: Mutex<BTreeMap<UserId, Vec<String>>>,
    store: Arc<dyn Store>,
}

impl TaskList {
    /// Loads the task document, or starts empty if none exists yet.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be read or the document does
    /// not parse.
    pub fn load(store: Arc<dyn Store>) -> Result<Self, StoreError> {
        let tasks = match store.get(TASKS_KEY)? {
            Some(doc) => serde_json::from_str(&doc)?,
            None => BTreeMap::new(),
        };
        Ok(Self {
            tasks: Mutex::new(tasks),
            store,
        })
    }

    /// Appends a task to `user`'s list and returns its number.
    ///
    /// # Errors
    ///
    /// Rejects empty (or whitespace-only) text, and surfaces a failed
    /// write-back. The in-memory list keeps the task either way; the next
    /// successful write carries it.
    pub fn add(&self, user: &str, text: &str) -> Result<usize, TaskError> {
        let text = text.trim();
        if text.is_empty() {
            return Err(TaskError::EmptyText);
        }

        let mut tasks = self.tasks.lock().unwrap_or_else(|e| e.into_inner());
        let list = tasks.entry(user.to_string()).or_default();
        list.push(text.to_string());
        let number = list.len();

        persist(&self.store, &tasks)?;
        Ok(number)
    }

    /// `user`'s tasks in the order they were added, numbered from 1.
    pub fn list(&self, user: &str) -> Vec<TaskEntry> {
        let tasks = self.tasks.lock().unwrap_or_else(|e| e.into_inner());
        tasks
            .get(user)
            .map(|list| {
                list.iter()
                    .enumerate()
                    .map(|(i, text)| TaskEntry {
                        index: i + 1,
                        text: text.clone(),
                    })
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Removes task number `index` (1-based) from `user`'s list and returns
    /// its text.
    ///
    /// # Errors
    ///
    /// Rejects numbers outside `1..=len`, and surfaces a failed write-back.
    pub fn delete_at(&self, user: &str, index: usize) -> Result<String, TaskError> {
        let mut tasks = self.tasks.lock().unwrap_or_else(|e| e.into_inner());
        let list = match tasks.get_mut(user) {
            Some(list) if index >= 1 && index <= list.len() => list,
            other => {
                let len = other.map(|l| l.len()).unwrap_or(0);
                return Err(TaskError::InvalidIndex { index, len });
            }
        };
        let removed = list.remove(index - 1);
        if list.is_empty() {
            tasks.remove(user);
        }

        persist(&self.store, &tasks)?;
        Ok(removed)
    }

    /// Every non-empty list in one snapshot, keyed by user in stable
    /// (sorted) order. Taken under a single lock acquisition, so a list a
    /// concurrent delete just emptied never shows up half-gone.
    pub fn open_tasks(&self) -> Vec<(UserId, Vec<String>)> {
        let tasks = self.tasks.lock().unwrap_or_else(|e| e.into_inner());
        tasks
            .iter()
            .filter(|(_, list)| !list.is_empty())
            .map(|(user, list)| (user.clone(), list.clone()))
            .collect()
    }
}

fn persist(store: &Arc<dyn Store>, tasks: &BTreeMap<UserId, Vec<String>>) -> Result<(), StoreError> {
    let doc = serde_json::to_string_pretty(tasks)?;
    store.put(TASKS_KEY, &doc)
}
