// ============================================
// File: crates/nodepulse-agent/src/lifecycle/tasks.rs
// ============================================
//! # Periodic Tasks
//!
//! ## Creation Reason
//! The three background tasks of an active node: ping, status check and
//! session refresh.
//!
//! ## Main Functionality
//! - `TaskContext`: one iteration of each task, reusable from tests
//! - `spawn_periodic`: interval loop with shutdown handling
//! - `session_age`: age of the most recent remote session
//!
//! ## ⚠️ Important Note for Next Developer
//! - Task failures are logged and absorbed; nothing escalates
//! - The first tick fires one full period after spawn
//! - A handler that is running finishes before shutdown is observed
//!
//! ## Last Modified
//! v0.1.0 - Initial periodic tasks

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::{debug, info};

use nodepulse_client::{NodeApi, StatusSnapshot};
use nodepulse_common::time::whole_seconds_between;

use super::state::LifecycleState;
use crate::error::{AgentError, Result};
use crate::report::Reporter;

/// Age in whole seconds of the most recent session in `status`.
///
/// # Errors
/// `EmptySessionList` when the remote holds no session.
pub fn session_age(status: &StatusSnapshot, now: DateTime<Utc>) -> Result<u64> {
    status
        .last_session()
        .map(|session| whole_seconds_between(session.start_at, now))
        .ok_or(AgentError::EmptySessionList)
}

// ============================================
// TaskContext
// ============================================

/// Everything a periodic task needs.
#[derive(Clone)]
pub struct TaskContext {
    /// Remote API.
    pub api: Arc<dyn NodeApi>,
    /// Shared lifecycle state.
    pub state: Arc<LifecycleState>,
    /// Log presenter.
    pub reporter: Reporter,
}

impl TaskContext {
    /// Sends one ping and records the outcome.
    pub async fn ping_once(&self) {
        match self.api.send_ping().await {
            Ok(ack) => {
                self.state.record_ping(true);
                debug!(
                    pings_reported = ack.total_pings_reported,
                    "Ping successful"
                );
            }
            Err(e) => {
                self.state.record_ping(false);
                self.reporter.client_failure("Ping", &e);
            }
        }
    }

    /// Fetches status, updates rewards and reports.
    pub async fn status_once(&self) {
        let status = match self.api.fetch_status().await {
            Ok(status) => status,
            Err(e) => {
                self.reporter.client_failure("Status check", &e);
                return;
            }
        };

        let age = match session_age(&status, Utc::now()) {
            Ok(age) => age,
            Err(e) => {
                self.reporter.agent_failure("Status check", &e);
                return;
            }
        };

        self.state.apply_status(&status);
        self.reporter.status(&status, Some(age));
        self.reporter.stats(&self.state.snapshot());
    }

    /// Starts a new session, replacing the current one.
    pub async fn refresh_once(&self) {
        match self.api.start_session().await {
            Ok(started) => {
                let session = self.state.replace_session(&started);
                info!(session_id = %session.session_id, "Session refreshed");
            }
            Err(e) => self.reporter.client_failure("Session refresh", &e),
        }
    }
}

impl std::fmt::Debug for TaskContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TaskContext")
            .field("state", &self.state)
            .field("reporter", &self.reporter)
            .finish_non_exhaustive()
    }
}

// ============================================
// Spawning
// ============================================

/// Spawns a task running `handler` every `period` until shutdown.
pub fn spawn_periodic<F, Fut>(
    name: &'static str,
    period: Duration,
    mut shutdown_rx: broadcast::Receiver<()>,
    handler: F,
) -> JoinHandle<()>
where
    F: Fn() -> Fut + Send + 'static,
    Fut: Future<Output = ()> + Send + 'static,
{
    tokio::spawn(async move {
        let mut ticker = interval_at(Instant::now() + period, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        info!("{} task started ({}s)", name, period.as_secs());

        loop {
            tokio::select! {
                _ = shutdown_rx.recv() => {
                    debug!("{} task received shutdown signal", name);
                    break;
                }
                _ = ticker.tick() => {
                    handler().await;
                }
            }
        }

        debug!("{} task exiting", name);
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use nodepulse_client::{ApiOperation, ClientError, MockNodeApi, RemoteSession};

    fn context(api: Arc<MockNodeApi>) -> TaskContext {
        TaskContext {
            api,
            state: Arc::new(LifecycleState::new()),
            reporter: Reporter::default(),
        }
    }

    fn status_with_session(start_at: DateTime<Utc>) -> StatusSnapshot {
        StatusSnapshot {
            is_connected: true,
            today_reward: 3.5,
            total_reward: 99.0,
            client_version_reported: Some("0.1.7".to_string()),
            sessions: vec![RemoteSession {
                id: None,
                start_at,
                end_at: None,
            }],
        }
    }

    #[test]
    fn test_session_age_whole_seconds() {
        let t0 = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let now = t0 + chrono::Duration::milliseconds(3_725_900);

        let age = session_age(&status_with_session(t0), now).unwrap();
        assert_eq!(age, 3725);
    }

    #[test]
    fn test_session_age_empty() {
        let mut status = status_with_session(Utc::now());
        status.sessions.clear();

        let err = session_age(&status, Utc::now()).unwrap_err();
        assert!(matches!(err, AgentError::EmptySessionList));
    }

    #[tokio::test]
    async fn test_ping_success_and_failure() {
        let api = Arc::new(MockNodeApi::new());
        api.push_ping(Err(ClientError::remote(
            ApiOperation::Ping,
            403,
            "Cloudflare Ray ID: XYZ123<",
        )));
        let ctx = context(Arc::clone(&api));

        ctx.ping_once().await;
        ctx.ping_once().await;

        let counters = ctx.state.counters();
        assert_eq!(counters.total_pings, 2);
        assert_eq!(counters.successful_pings, 1);
        assert_eq!(counters.failed_pings, 1);
    }

    #[tokio::test]
    async fn test_status_updates_rewards() {
        let api = Arc::new(MockNodeApi::new());
        api.push_status(Ok(status_with_session(Utc::now())));
        let ctx = context(api);

        ctx.status_once().await;

        let counters = ctx.state.counters();
        assert_eq!(counters.today_reward, 3.5);
        assert_eq!(counters.total_reward, 99.0);
    }

    #[tokio::test]
    async fn test_status_empty_sessions_leaves_counters() {
        let api = Arc::new(MockNodeApi::new());
        let mut status = status_with_session(Utc::now());
        status.sessions.clear();
        api.push_status(Ok(status));
        let ctx = context(api);

        ctx.status_once().await;

        assert_eq!(ctx.state.counters().total_reward, 0.0);
    }

    #[tokio::test]
    async fn test_refresh_failure_keeps_session() {
        let api = Arc::new(MockNodeApi::new());
        let ctx = context(Arc::clone(&api));

        ctx.refresh_once().await;
        api.push_start_session(Err(ClientError::remote(
            ApiOperation::StartSession,
            500,
            "oops",
        )));
        ctx.refresh_once().await;

        let session = ctx.state.session().unwrap();
        assert_eq!(session.session_id.as_str(), "session-1");
        assert_eq!(ctx.state.counters().session_refreshes, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_spawn_periodic_first_tick_after_period() {
        let api = Arc::new(MockNodeApi::new());
        let ctx = context(Arc::clone(&api));
        let (shutdown_tx, _) = broadcast::channel(1);

        let task_ctx = ctx.clone();
        let handle = spawn_periodic(
            "ping",
            Duration::from_secs(60),
            shutdown_tx.subscribe(),
            move || {
                let ctx = task_ctx.clone();
                async move { ctx.ping_once().await }
            },
        );

        tokio::time::sleep(Duration::from_secs(59)).await;
        assert_eq!(api.calls(ApiOperation::Ping), 0);

        tokio::time::sleep(Duration::from_secs(2)).await;
        assert_eq!(api.calls(ApiOperation::Ping), 1);

        shutdown_tx.send(()).unwrap();
        handle.await.unwrap();
    }
}
