// ============================================
// File: crates/nodepulse-agent/src/lifecycle/state.rs
// ============================================
//! # Lifecycle State
//!
//! ## Creation Reason
//! Holds the counters, the current remote session and the lifecycle phase
//! shared between the bootstrap and the periodic tasks.
//!
//! ## Main Functionality
//! - `LifecycleState`: mutex-guarded shared state
//! - `Counters`, `SessionState`: plain values handed out as copies
//! - `StatsSnapshot`: everything the stats report needs, plus uptime
//!
//! ## ⚠️ Important Note for Next Developer
//! - Lock order is counters, then session, then phase
//! - Never hold a lock across an `.await`
//! - Ping / refresh counts only ever grow
//!
//! ## Last Modified
//! v0.1.0 - Initial lifecycle state

use std::time::Duration;

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use tokio::time::Instant;

use nodepulse_client::{StartedSession, StatusSnapshot};
use nodepulse_common::SessionId;

// ============================================
// LifecyclePhase
// ============================================

/// Where the lifecycle currently stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LifecyclePhase {
    /// Nothing attempted yet.
    #[default]
    Uninitialized,
    /// Bootstrap sequence in progress.
    Bootstrapping,
    /// Periodic tasks running.
    Active,
    /// Waiting before the next bootstrap attempt.
    Restarting,
}

// ============================================
// SessionState
// ============================================

/// The remote session as last observed.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionState {
    /// Identifier assigned by the remote.
    pub session_id: SessionId,
    /// When the session started.
    pub started_at: DateTime<Utc>,
    /// Connection flag from the last status check.
    pub is_connected: bool,
    /// Today's reward from the last status check.
    pub today_reward: f64,
    /// Total reward from the last status check.
    pub total_reward: f64,
}

impl SessionState {
    /// Builds a fresh session state from a start-session result.
    #[must_use]
    pub fn from_started(started: &StartedSession) -> Self {
        Self {
            session_id: started.session_id.clone(),
            started_at: started.started_at,
            is_connected: false,
            today_reward: 0.0,
            total_reward: 0.0,
        }
    }

    /// Refreshes the fields owned by status checks.
    pub fn observe(&mut self, status: &StatusSnapshot) {
        self.is_connected = status.is_connected;
        self.today_reward = status.today_reward;
        self.total_reward = status.total_reward;
    }
}

// ============================================
// Counters
// ============================================

/// Process-wide accumulators.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Counters {
    /// Pings attempted by the periodic task and the bootstrap.
    pub total_pings: u64,
    /// Pings acknowledged by the remote.
    pub successful_pings: u64,
    /// Pings that failed.
    pub failed_pings: u64,
    /// Successful start-session calls.
    pub session_refreshes: u64,
    /// Today's reward from the last status check.
    pub today_reward: f64,
    /// Total reward from the last status check.
    pub total_reward: f64,
}

/// Point-in-time view for reporting.
#[derive(Debug, Clone)]
pub struct StatsSnapshot {
    /// Counter values.
    pub counters: Counters,
    /// Time since process start.
    pub uptime: Duration,
    /// Wall-clock process start.
    pub started_at: DateTime<Utc>,
    /// Current session, if one was ever started.
    pub session: Option<SessionState>,
    /// Current phase.
    pub phase: LifecyclePhase,
}

// ============================================
// LifecycleState
// ============================================

/// Shared lifecycle state.
#[derive(Debug)]
pub struct LifecycleState {
    started: Instant,
    started_at: DateTime<Utc>,
    counters: Mutex<Counters>,
    session: Mutex<Option<SessionState>>,
    phase: Mutex<LifecyclePhase>,
}

impl LifecycleState {
    /// Creates state with the start time set to now.
    #[must_use]
    pub fn new() -> Self {
        Self {
            started: Instant::now(),
            started_at: Utc::now(),
            counters: Mutex::new(Counters::default()),
            session: Mutex::new(None),
            phase: Mutex::new(LifecyclePhase::Uninitialized),
        }
    }

    /// Records one ping outcome.
    pub fn record_ping(&self, success: bool) {
        let mut counters = self.counters.lock();
        counters.total_pings += 1;
        if success {
            counters.successful_pings += 1;
        } else {
            counters.failed_pings += 1;
        }
    }

    /// Applies a successful status check.
    pub fn apply_status(&self, status: &StatusSnapshot) {
        let mut counters = self.counters.lock();
        counters.today_reward = status.today_reward;
        counters.total_reward = status.total_reward;

        if let Some(session) = self.session.lock().as_mut() {
            session.observe(status);
        }
    }

    /// Replaces the current session after a successful start-session.
    pub fn replace_session(&self, started: &StartedSession) -> SessionState {
        let mut counters = self.counters.lock();
        let mut session = self.session.lock();

        let mut next = SessionState::from_started(started);
        if let Some(previous) = session.as_ref() {
            next.is_connected = previous.is_connected;
            next.today_reward = previous.today_reward;
            next.total_reward = previous.total_reward;
        }

        counters.session_refreshes += 1;
        *session = Some(next.clone());
        next
    }

    /// Commits the staged results of a complete bootstrap in one step.
    pub fn commit_bootstrap(&self, status: &StatusSnapshot, started: &StartedSession) {
        let mut counters = self.counters.lock();
        let mut session = self.session.lock();

        let mut next = SessionState::from_started(started);
        next.observe(status);

        counters.today_reward = status.today_reward;
        counters.total_reward = status.total_reward;
        counters.session_refreshes += 1;
        counters.total_pings += 1;
        counters.successful_pings += 1;
        *session = Some(next);

        *self.phase.lock() = LifecyclePhase::Active;
    }

    /// Current counter values.
    #[must_use]
    pub fn counters(&self) -> Counters {
        *self.counters.lock()
    }

    /// Current session, if any.
    #[must_use]
    pub fn session(&self) -> Option<SessionState> {
        self.session.lock().clone()
    }

    /// Current phase.
    #[must_use]
    pub fn phase(&self) -> LifecyclePhase {
        *self.phase.lock()
    }

    /// Moves to `phase`.
    pub fn set_phase(&self, phase: LifecyclePhase) {
        *self.phase.lock() = phase;
    }

    /// Time since process start.
    #[must_use]
    pub fn uptime(&self) -> Duration {
        self.started.elapsed()
    }

    /// Takes a consistent snapshot for reporting.
    #[must_use]
    pub fn snapshot(&self) -> StatsSnapshot {
        let counters = self.counters.lock();
        let session = self.session.lock();
        let phase = *self.phase.lock();

        StatsSnapshot {
            counters: *counters,
            uptime: self.uptime(),
            started_at: self.started_at,
            session: session.clone(),
            phase,
        }
    }
}

impl Default for LifecycleState {
    fn default() -> Self {
        Self::new()
    }
}
