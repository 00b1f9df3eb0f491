//! Completed-session leaderboard.
//!
//! Counts finished focus sessions per user. Records live in memory and are
//! written back to the store as one JSON document after each credit batch;
//! a failed write leaves the in-memory tally intact so a later write can
//! catch the document up.

use std::sync::{Arc, Mutex};

use serde::{Deserialize, Serialize};

use crate::notify::UserId;
use crate::session::Participant;
use crate::store::{Store, StoreError};

/// Store key the leaderboard document lives under.
pub const LEADERBOARD_KEY: &str = "leaderboard";

/// One user's row on the leaderboard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaderboardRecord {
    pub user_id: UserId,
    pub display_name: String,
    pub completed_sessions: u64,
}

/// Shared leaderboard handle.
pub struct Leaderboard {
    records: Mutex<Vec<LeaderboardRecord>>,
    store: Arc<dyn Store>,
}

impl Leaderboard {
    /// Loads the leaderboard document, or starts empty if none exists yet.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be read or the document does
    /// not parse.
    pub fn load(store: Arc<dyn Store>) -> Result<Self, StoreError> {
        let records = match store.get(LEADERBOARD_KEY)? {
            Some(doc) => serde_json::from_str(&doc)?,
            None => Vec::new(),
        };
        Ok(Self {
            records: Mutex::new(records),
            store,
        })
    }

    /// Credits one completed focus session to every participant, then writes
    /// the whole document back once.
    ///
    /// The in-memory increment happens before the write, so a persistence
    /// failure never loses the credit; the next successful write carries it.
    ///
    /// # Errors
    ///
    /// Returns an error if the write-back fails.
    pub fn credit(&self, participants: &[Participant]) -> Result<(), StoreError> {
        if participants.is_empty() {
            return Ok(());
        }

        let mut records = self.records.lock().unwrap_or_else(|e| e.into_inner());
        for p in participants {
            match records.iter_mut().find(|r| r.user_id == p.id) {
                Some(record) => {
                    record.completed_sessions += 1;
                    record.display_name = p.name.clone();
                }
                None => records.push(LeaderboardRecord {
                    user_id: p.id.clone(),
                    display_name: p.name.clone(),
                    completed_sessions: 1,
                }),
            }
        }

        let doc = serde_json::to_string_pretty(&*records)?;
        self.store.put(LEADERBOARD_KEY, &doc)
    }

    /// The top `n` records, most completed sessions first. Ties keep their
    /// record order, so earlier entrants stay ahead.
    pub fn top(&self, n: usize) -> Vec<LeaderboardRecord> {
        let records = self.records.lock().unwrap_or_else(|e| e.into_inner());
        let mut sorted = records.clone();
        sorted.sort_by(|a, b| b.completed_sessions.cmp(&a.completed_sessions));
        sorted.truncate(n);
        sorted
    }

    /// Completed-session count for one user; zero if they have no row.
    pub fn count(&self, user: &str) -> u64 {
        let records = self.records.lock().unwrap_or_else(|e| e.into_inner());
        records
            .iter()
            .find(|r| r.user_id == user)
            .map(|r| r.completed_sessions)
            .unwrap_or(0)
    }
}
