//! Group focus-session lifecycle.
//!
//! One session runs at a time per manager. Starting a session spawns a
//! countdown task that announces progress once per minute and, when a focus
//! session runs out, credits every participant on the leaderboard. The
//! manager's mutex is never held across an await; the countdown task checks
//! the session id on every pass so a stopped or superseded session cannot
//! be touched by a stale ticker.

use std::fmt;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::task::JoinHandle;
use tokio::time::sleep;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::error::SessionError;
use crate::leaderboard::Leaderboard;
use crate::notify::{ChannelId, Notifier, UserId};

/// What a session counts down for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionKind {
    Focus,
    Break,
}

impl fmt::Display for SessionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionKind::Focus => write!(f, "focus"),
            SessionKind::Break => write!(f, "break"),
        }
    }
}

/// Someone counted into the running session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Participant {
    /// Chat-platform user id
    pub id: UserId,

    /// Display name used in announcements
    pub name: String,
}

/// The one running session. Lives only in memory; a restart forgets it.
#[derive(Debug, Clone)]
struct ActiveSession {
    id: Uuid,
    kind: SessionKind,
    channel: ChannelId,
    remaining_secs: u64,
    participants: Vec<Participant>,
}

/// Snapshot of session state for status replies.
#[derive(Debug, Clone, Serialize)]
pub struct SessionView {
    /// Whether a session is running
    pub active: bool,

    /// Kind of the running session, if any
    pub kind: Option<SessionKind>,

    /// Remaining time as MM:SS
    pub remaining: String,

    /// Display names of everyone in the session
    pub participants: Vec<String>,
}

impl SessionView {
    pub fn idle() -> Self {
        Self {
            active: false,
            kind: None,
            remaining: "00:00".to_string(),
            participants: Vec::new(),
        }
    }
}

/// Tunable session durations.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Default focus length in minutes
    #[serde(default = "default_focus_minutes")]
    pub focus_minutes: i64,

    /// Default break length in minutes
    #[serde(default = "default_break_minutes")]
    pub break_minutes: i64,

    /// Longest duration a start request may ask for
    #[serde(default = "default_max_minutes")]
    pub max_minutes: i64,

    /// Real-time length of one 60-second countdown step. Shortened in tests
    /// so a session plays out in milliseconds.
    #[serde(skip, default = "default_tick")]
    pub tick: Duration,
}

fn default_focus_minutes() -> i64 {
    25
}

fn default_break_minutes() -> i64 {
    5
}

fn default_max_minutes() -> i64 {
    1440
}

fn default_tick() -> Duration {
    Duration::from_secs(60)
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            focus_minutes: default_focus_minutes(),
            break_minutes: default_break_minutes(),
            max_minutes: default_max_minutes(),
            tick: default_tick(),
        }
    }
}

struct ManagerState {
    current: Option<ActiveSession>,
    ticker: Option<JoinHandle<()>>,
}

/// Coordinates the group session for one chat space.
pub struct SessionManager {
    state: Arc<Mutex<ManagerState>>,
    leaderboard: Arc<Leaderboard>,
    notifier: Arc<dyn Notifier>,
    config: SessionConfig,
}

impl SessionManager {
    pub fn new(
        leaderboard: Arc<Leaderboard>,
        notifier: Arc<dyn Notifier>,
        config: SessionConfig,
    ) -> Self {
        Self {
            state: Arc::new(Mutex::new(ManagerState {
                current: None,
                ticker: None,
            })),
            leaderboard,
            notifier,
            config,
        }
    }

    /// Starts a focus session with `user` as the first participant.
    ///
    /// # Errors
    ///
    /// Rejects the request if a session is already running (the running one
    /// is untouched) or if `minutes` falls outside `1..=max_minutes`.
    pub async fn start(
        &self,
        user: &str,
        name: &str,
        channel: &str,
        minutes: Option<i64>,
    ) -> Result<(), SessionError> {
        self.begin(SessionKind::Focus, user, name, channel, minutes)
            .await
    }

    /// Starts a break. Same rules as [`start`](Self::start), but finishing
    /// one earns nobody any credit.
    pub async fn start_break(
        &self,
        user: &str,
        name: &str,
        channel: &str,
        minutes: Option<i64>,
    ) -> Result<(), SessionError> {
        self.begin(SessionKind::Break, user, name, channel, minutes)
            .await
    }

    async fn begin(
        &self,
        kind: SessionKind,
        user: &str,
        name: &str,
        channel: &str,
        minutes: Option<i64>,
    ) -> Result<(), SessionError> {
        let minutes = minutes.unwrap_or(match kind {
            SessionKind::Focus => self.config.focus_minutes,
            SessionKind::Break => self.config.break_minutes,
        });
        if minutes < 1 || minutes > self.config.max_minutes {
            return Err(SessionError::InvalidDuration {
                minutes,
                max: self.config.max_minutes,
            });
        }
        // max_minutes is whatever the config file says; the seconds still
        // have to fit in a u64.
        let remaining_secs = u64::try_from(minutes)
            .ok()
            .and_then(|m| m.checked_mul(60))
            .ok_or(SessionError::InvalidDuration {
                minutes,
                max: self.config.max_minutes,
            })?;

        let session_id = Uuid::new_v4();
        {
            let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
            if state.current.is_some() {
                return Err(SessionError::AlreadyRunning);
            }
            if let Some(stale) = state.ticker.take() {
                stale.abort();
            }
            state.current = Some(ActiveSession {
                id: session_id,
                kind,
                channel: channel.to_string(),
                remaining_secs,
                participants: vec![Participant {
                    id: user.to_string(),
                    name: name.to_string(),
                }],
            });
        }
        debug!(session = %session_id, %kind, minutes, "session started");

        let text = match kind {
            SessionKind::Focus => {
                format!("🍅 {name} started a {minutes}-minute focus session! Type `join` to join in.")
            }
            SessionKind::Break => {
                format!("☕ {name} started a {minutes}-minute break. Step away from the keyboard!")
            }
        };
        self.notifier.notify(channel, &text).await;

        // The announcement went out before the first tick can. Don't spawn
        // the ticker if the session was stopped while we were sending.
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        if state.current.as_ref().map(|s| s.id) == Some(session_id) {
            state.ticker = Some(tokio::spawn(run_countdown(
                self.state.clone(),
                self.notifier.clone(),
                self.leaderboard.clone(),
                self.config.tick,
                session_id,
            )));
        }
        Ok(())
    }

    /// Adds `user` to the running session.
    ///
    /// # Errors
    ///
    /// Rejects the request if nothing is running or `user` is already in.
    pub async fn join(&self, user: &str, name: &str) -> Result<(), SessionError> {
        let channel = {
            let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
            let session = state.current.as_mut().ok_or(SessionError::NoActiveSession)?;
            if session.participants.iter().any(|p| p.id == user) {
                return Err(SessionError::AlreadyJoined(name.to_string()));
            }
            session.participants.push(Participant {
                id: user.to_string(),
                name: name.to_string(),
            });
            session.channel.clone()
        };
        self.notifier
            .notify(&channel, &format!("🙌 {name} joined the session!"))
            .await;
        Ok(())
    }

    /// Snapshot of the running session, or the idle view.
    pub fn status(&self) -> SessionView {
        let state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        match state.current.as_ref() {
            Some(session) => SessionView {
                active: true,
                kind: Some(session.kind),
                remaining: format_mmss(session.remaining_secs),
                participants: session.participants.iter().map(|p| p.name.clone()).collect(),
            },
            None => SessionView::idle(),
        }
    }

    /// Stops the running session without crediting anyone.
    ///
    /// # Errors
    ///
    /// Rejects the request if nothing is running.
    pub async fn stop(&self) -> Result<(), SessionError> {
        let (channel, ticker) = {
            let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
            match state.current.take() {
                Some(session) => (session.channel, state.ticker.take()),
                None => return Err(SessionError::NoActiveSession),
            }
        };
        if let Some(handle) = ticker {
            handle.abort();
        }
        self.notifier.notify(&channel, "🛑 Session stopped.").await;
        Ok(())
    }
}

/// Counts one session down to zero, then settles it.
///
/// Every pass re-checks that the session with `session_id` is still current;
/// if it is not, the task exits without touching anything. The final step is
/// clamped to whatever remains of the last minute, so `remaining` lands on
/// zero exactly.
async fn run_countdown(
    state: Arc<Mutex<ManagerState>>,
    notifier: Arc<dyn Notifier>,
    leaderboard: Arc<Leaderboard>,
    tick: Duration,
    session_id: Uuid,
) {
    loop {
        let (channel, remaining) = {
            let state = state.lock().unwrap_or_else(|e| e.into_inner());
            match state.current.as_ref() {
                Some(s) if s.id == session_id => (s.channel.clone(), s.remaining_secs),
                _ => return,
            }
        };
        if remaining == 0 {
            break;
        }

        notifier
            .notify(&channel, &format!("⏳ Time remaining: {}", format_mmss(remaining)))
            .await;

        let step = step_for(remaining);
        sleep(step_delay(tick, step)).await;

        {
            let mut state = state.lock().unwrap_or_else(|e| e.into_inner());
            match state.current.as_mut() {
                Some(s) if s.id == session_id => {
                    s.remaining_secs = s.remaining_secs.saturating_sub(step);
                }
                _ => return,
            }
        }
    }

    // Settle: pull the session out under the lock, then announce and credit
    // outside it. Anyone joining after this point is into the next session.
    let finished = {
        let mut state = state.lock().unwrap_or_else(|e| e.into_inner());
        match state.current.take() {
            Some(s) if s.id == session_id => {
                state.ticker = None;
                s
            }
            other => {
                state.current = other;
                return;
            }
        }
    };

    let names: Vec<&str> = finished.participants.iter().map(|p| p.name.as_str()).collect();
    match finished.kind {
        SessionKind::Focus => {
            notifier
                .notify(
                    &finished.channel,
                    &format!("✅ Focus session complete! Great work, {}!", names.join(", ")),
                )
                .await;
            if let Err(e) = leaderboard.credit(&finished.participants) {
                warn!(error = %e, "failed to persist leaderboard credit");
            }
        }
        SessionKind::Break => {
            notifier
                .notify(&finished.channel, "✅ Break's over. Back to focus!")
                .await;
        }
    }
}

/// Formats whole seconds as MM:SS.
pub fn format_mmss(secs: u64) -> String {
    format!("{:02}:{:02}", secs / 60, secs % 60)
}

/// One countdown step: a full minute, or whatever remains of the last one.
pub fn step_for(remaining_secs: u64) -> u64 {
    remaining_secs.min(60)
}

// One step covers `step` session-seconds; at the default tick those pass in
// real time.
fn step_delay(tick: Duration, step: u64) -> Duration {
    tick.mul_f64(step as f64 / 60.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn formats_minutes_and_seconds() {
        assert_eq!(format_mmss(0), "00:00");
        assert_eq!(format_mmss(59), "00:59");
        assert_eq!(format_mmss(60), "01:00");
        assert_eq!(format_mmss(1500), "25:00");
        assert_eq!(format_mmss(3599), "59:59");
    }

    #[test]
    fn step_is_a_minute_or_the_remainder() {
        assert_eq!(step_for(3600), 60);
        assert_eq!(step_for(61), 60);
        assert_eq!(step_for(60), 60);
        assert_eq!(step_for(37), 37);
        assert_eq!(step_for(1), 1);
    }

    #[test]
    fn idle_view_is_zeroed() {
        let view = SessionView::idle();
        assert!(!view.active);
        assert!(view.kind.is_none());
        assert_eq!(view.remaining, "00:00");
        assert!(view.participants.is_empty());
    }

    #[test]
    fn config_defaults_match_classic_pomodoro() {
        let config = SessionConfig::default();
        assert_eq!(config.focus_minutes, 25);
        assert_eq!(config.break_minutes, 5);
        assert_eq!(config.max_minutes, 1440);
        assert_eq!(config.tick, Duration::from_secs(60));
    }

    #[test]
    fn step_delay_scales_partial_steps() {
        let tick = Duration::from_secs(60);
        assert_eq!(step_delay(tick, 60), Duration::from_secs(60));
        assert_eq!(step_delay(tick, 30), Duration::from_secs(30));

        let fast = Duration::from_millis(10);
        assert_eq!(step_delay(fast, 30), Duration::from_millis(5));
    }

    proptest! {
        // The countdown must land on zero exactly: every step is a full
        // minute except possibly the last, and the steps add back up to
        // the total.
        #[test]
        fn countdown_steps_cover_the_duration_exactly(total_secs in 1u64..=86_400) {
            let mut remaining = total_secs;
            let mut steps = Vec::new();
            while remaining > 0 {
                let step = step_for(remaining);
                prop_assert!((1..=60).contains(&step));
                steps.push(step);
                remaining -= step;
            }
            prop_assert_eq!(steps.iter().sum::<u64>(), total_secs);
            for step in &steps[..steps.len() - 1] {
                prop_assert_eq!(*step, 60);
            }
        }
    }
}
