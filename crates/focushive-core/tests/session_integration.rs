//! Integration tests for the group session lifecycle.
//!
//! These run real countdowns with a millisecond tick, so a "25-minute"
//! session plays out in a fraction of a second while keeping the exact
//! minute-step semantics of the production clock.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use focushive_core::{
    Leaderboard, MemoryStore, Notifier, SessionConfig, SessionError, SessionKind, SessionManager,
};

/// Real-time length of one 60-second countdown step in these tests.
const TICK: Duration = Duration::from_millis(10);

/// Captures notifications in arrival order.
struct SpyNotifier {
    sent: Mutex<Vec<(String, String)>>,
}

impl SpyNotifier {
    fn new() -> Arc<Self> {
        Arc::new(Self {
            sent: Mutex::new(Vec::new()),
        })
    }

    fn texts(&self) -> Vec<String> {
        self.sent.lock().unwrap().iter().map(|(_, t)| t.clone()).collect()
    }
}

#[async_trait]
impl Notifier for SpyNotifier {
    async fn notify(&self, channel: &str, text: &str) {
        self.sent
            .lock()
            .unwrap()
            .push((channel.to_string(), text.to_string()));
    }
}

fn fast_manager(
    store: Arc<MemoryStore>,
    notifier: Arc<SpyNotifier>,
) -> (Arc<Leaderboard>, SessionManager) {
    let leaderboard = Arc::new(Leaderboard::load(store).unwrap());
    let config = SessionConfig {
        tick: TICK,
        ..SessionConfig::default()
    };
    let manager = SessionManager::new(leaderboard.clone(), notifier, config);
    (leaderboard, manager)
}

/// Manager whose countdown never advances within a test. Used when a test
/// only exercises the command surface, not completion.
fn slow_manager(
    store: Arc<MemoryStore>,
    notifier: Arc<SpyNotifier>,
) -> (Arc<Leaderboard>, SessionManager) {
    let leaderboard = Arc::new(Leaderboard::load(store).unwrap());
    let manager = SessionManager::new(leaderboard.clone(), notifier, SessionConfig::default());
    (leaderboard, manager)
}

async fn wait_until(what: &str, mut cond: impl FnMut() -> bool) {
    for _ in 0..500 {
        if cond() {
            return;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    panic!("timed out waiting for: {what}");
}

#[tokio::test]
async fn test_completed_focus_session_credits_every_participant() {
    let notifier = SpyNotifier::new();
    let (leaderboard, manager) = fast_manager(Arc::new(MemoryStore::new()), notifier.clone());

    manager.start("u1", "Ada", "general", Some(1)).await.unwrap();
    manager.join("u2", "Grace").await.unwrap();

    wait_until("both participants credited", || {
        leaderboard.count("u1") == 1 && leaderboard.count("u2") == 1
    })
    .await;

    assert!(!manager.status().active);

    let texts = notifier.texts();
    assert!(texts[0].contains("Ada started a 1-minute focus session"));
    assert!(texts.iter().any(|t| t.contains("Grace joined")));
    assert!(texts.iter().any(|t| t.contains("Time remaining: 01:00")));
    let done = texts.iter().find(|t| t.contains("Focus session complete")).unwrap();
    assert!(done.contains("Ada"));
    assert!(done.contains("Grace"));
}

#[tokio::test]
async fn test_stopped_session_earns_no_credit() {
    let notifier = SpyNotifier::new();
    let (leaderboard, manager) = fast_manager(Arc::new(MemoryStore::new()), notifier.clone());

    // 25 steps of runway; stop lands a few ticks in.
    manager.start("u1", "Ada", "general", Some(25)).await.unwrap();
    manager.join("u2", "Grace").await.unwrap();
    tokio::time::sleep(TICK * 3).await;
    manager.stop().await.unwrap();

    assert!(!manager.status().active);

    // Wait out the entire runway the session would have had; a ticker that
    // survived the stop would settle and credit within this window.
    tokio::time::sleep(TICK * 30).await;

    assert_eq!(leaderboard.count("u1"), 0);
    assert_eq!(leaderboard.count("u2"), 0);

    let texts = notifier.texts();
    assert!(texts.iter().any(|t| t.contains("Session stopped")));
    assert!(!texts.iter().any(|t| t.contains("Focus session complete")));
}

#[tokio::test]
async fn test_second_start_is_rejected_and_leaves_the_running_session_alone() {
    let notifier = SpyNotifier::new();
    let (_leaderboard, manager) = slow_manager(Arc::new(MemoryStore::new()), notifier.clone());

    manager.start("u1", "Ada", "general", Some(25)).await.unwrap();

    let err = manager.start("u2", "Grace", "general", Some(10)).await.unwrap_err();
    assert!(matches!(err, SessionError::AlreadyRunning));
    let err = manager.start_break("u2", "Grace", "general", None).await.unwrap_err();
    assert!(matches!(err, SessionError::AlreadyRunning));

    let view = manager.status();
    assert!(view.active);
    assert_eq!(view.kind, Some(SessionKind::Focus));
    assert_eq!(view.remaining, "25:00");
    assert_eq!(view.participants, vec!["Ada".to_string()]);

    // Only Ada's start announcement went out.
    let starts = notifier
        .texts()
        .iter()
        .filter(|t| t.contains("started a"))
        .count();
    assert_eq!(starts, 1);
}

#[tokio::test]
async fn test_join_needs_a_running_session_and_rejects_repeats() {
    let notifier = SpyNotifier::new();
    let (_leaderboard, manager) = slow_manager(Arc::new(MemoryStore::new()), notifier);

    let err = manager.join("u2", "Grace").await.unwrap_err();
    assert!(matches!(err, SessionError::NoActiveSession));

    manager.start("u1", "Ada", "general", None).await.unwrap();
    manager.join("u2", "Grace").await.unwrap();

    let err = manager.join("u2", "Grace").await.unwrap_err();
    assert!(matches!(err, SessionError::AlreadyJoined(name) if name == "Grace"));

    // The starter is a participant from the beginning.
    let err = manager.join("u1", "Ada").await.unwrap_err();
    assert!(matches!(err, SessionError::AlreadyJoined(_)));

    assert_eq!(
        manager.status().participants,
        vec!["Ada".to_string(), "Grace".to_string()]
    );
}

#[tokio::test]
async fn test_idle_manager_reports_idle_and_rejects_stop() {
    let notifier = SpyNotifier::new();
    let (_leaderboard, manager) = slow_manager(Arc::new(MemoryStore::new()), notifier);

    let view = manager.status();
    assert!(!view.active);
    assert_eq!(view.remaining, "00:00");
    assert!(view.participants.is_empty());

    let err = manager.stop().await.unwrap_err();
    assert!(matches!(err, SessionError::NoActiveSession));
}

#[tokio::test]
async fn test_durations_outside_the_window_are_rejected() {
    let notifier = SpyNotifier::new();
    let (_leaderboard, manager) = slow_manager(Arc::new(MemoryStore::new()), notifier.clone());

    for minutes in [0, -5, 1441] {
        let err = manager
            .start("u1", "Ada", "general", Some(minutes))
            .await
            .unwrap_err();
        assert!(matches!(err, SessionError::InvalidDuration { minutes: m, max: 1440 } if m == minutes));
    }

    assert!(!manager.status().active);
    assert!(notifier.texts().is_empty());
}

#[tokio::test]
async fn test_absurd_config_limit_cannot_overflow_the_countdown() {
    let notifier = SpyNotifier::new();
    let leaderboard = Arc::new(Leaderboard::load(Arc::new(MemoryStore::new())).unwrap());
    let config = SessionConfig {
        max_minutes: i64::MAX,
        ..SessionConfig::default()
    };
    let manager = SessionManager::new(leaderboard, notifier.clone(), config);

    // Passes the configured limit but has no u64 seconds representation.
    let err = manager
        .start("u1", "Ada", "general", Some(i64::MAX))
        .await
        .unwrap_err();
    assert!(matches!(err, SessionError::InvalidDuration { .. }));
    assert!(!manager.status().active);
    assert!(notifier.texts().is_empty());

    // A large but representable duration still starts.
    manager.start("u1", "Ada", "general", Some(1440)).await.unwrap();
    assert_eq!(manager.status().remaining, "1440:00");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_starts_admit_exactly_one() {
    let notifier = SpyNotifier::new();
    let (_leaderboard, manager) = slow_manager(Arc::new(MemoryStore::new()), notifier);
    let manager = Arc::new(manager);

    let mut handles = Vec::new();
    for i in 0..8 {
        let manager = manager.clone();
        handles.push(tokio::spawn(async move {
            manager
                .start(&format!("u{i}"), &format!("User{i}"), "general", Some(25))
                .await
                .is_ok()
        }));
    }

    let mut wins = 0;
    for handle in handles {
        if handle.await.unwrap() {
            wins += 1;
        }
    }

    assert_eq!(wins, 1);
    let view = manager.status();
    assert!(view.active);
    assert_eq!(view.participants.len(), 1);
}

#[tokio::test]
async fn test_break_finishes_without_crediting_anyone() {
    let notifier = SpyNotifier::new();
    let (leaderboard, manager) = fast_manager(Arc::new(MemoryStore::new()), notifier.clone());

    manager.start_break("u1", "Ada", "general", Some(1)).await.unwrap();
    assert_eq!(manager.status().kind, Some(SessionKind::Break));

    wait_until("break to finish", || {
        notifier.texts().iter().any(|t| t.contains("Break's over"))
    })
    .await;

    assert!(!manager.status().active);
    assert_eq!(leaderboard.count("u1"), 0);

    let texts = notifier.texts();
    assert!(texts[0].contains("1-minute break"));
    assert!(!texts.iter().any(|t| t.contains("Focus session complete")));
}

#[tokio::test]
async fn test_session_completes_even_when_the_leaderboard_write_fails() {
    let store = Arc::new(MemoryStore::new());
    let notifier = SpyNotifier::new();
    let (leaderboard, manager) = fast_manager(store.clone(), notifier.clone());

    store.set_fail_puts(true);
    manager.start("u1", "Ada", "general", Some(1)).await.unwrap();

    wait_until("completion announcement", || {
        notifier.texts().iter().any(|t| t.contains("Focus session complete"))
    })
    .await;

    assert!(!manager.status().active);
    // The credit lands in memory even though the write-back failed.
    wait_until("in-memory credit", || leaderboard.count("u1") == 1).await;
}

#[tokio::test]
async fn test_a_new_session_can_start_after_the_last_one_ends() {
    let notifier = SpyNotifier::new();
    let (leaderboard, manager) = fast_manager(Arc::new(MemoryStore::new()), notifier.clone());

    manager.start("u1", "Ada", "general", Some(1)).await.unwrap();
    wait_until("first credit", || leaderboard.count("u1") == 1).await;

    manager.start("u2", "Grace", "general", Some(1)).await.unwrap();
    wait_until("second credit", || leaderboard.count("u2") == 1).await;

    // Ada was not in the second session.
    assert_eq!(leaderboard.count("u1"), 1);
}
