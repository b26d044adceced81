// ============================================
// File: crates/nodepulse-agent/src/lifecycle/scheduler.rs
// ============================================
//! # Lifecycle Scheduler
//!
//! ## Creation Reason
//! Runs the bootstrap sequence and owns the periodic tasks of an active
//! node.
//!
//! ## Main Functionality
//! - `bootstrap`: status, register, start-session, ping, then commit
//! - `activate`: spawns the ping, status and refresh tasks
//! - `stop`: waits for the tasks within a grace period
//!
//! ## Bootstrap Flow
//! ```text
//! fetch_status ──► register_node ──► start_session ──► send_ping
//!      │                │                  │               │
//!      └────────────────┴─── any error ────┴───────────────┘
//!                              │                           │
//!                        phase = Restarting         commit + Active
//! ```
//!
//! ## ⚠️ Important Note for Next Developer
//! - Nothing is written to `LifecycleState` until all four steps succeed
//! - An empty session list is fine during bootstrap (fresh nodes). The
//!   browser extension this replaces read `sessions[last].startAt`
//!   unconditionally and restarted on an empty list; here only the
//!   periodic status check treats it as a failure
//! - `stop` shares one grace deadline across all tasks
//!
//! ## Last Modified
//! v0.1.0 - Initial scheduler implementation

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{debug, info, warn};

use nodepulse_client::NodeApi;
use nodepulse_common::NodeId;

use super::state::{LifecyclePhase, LifecycleState};
use super::tasks::{session_age, spawn_periodic, TaskContext};
use crate::config::ScheduleConfig;
use crate::error::Result;
use crate::report::Reporter;

/// Bootstraps the node and drives the periodic tasks.
pub struct Scheduler {
    api: Arc<dyn NodeApi>,
    node_id: NodeId,
    state: Arc<LifecycleState>,
    reporter: Reporter,
    schedule: ScheduleConfig,
    tasks: Vec<(&'static str, JoinHandle<()>)>,
}

impl Scheduler {
    /// Creates a scheduler with fresh state.
    pub fn new(
        api: Arc<dyn NodeApi>,
        node_id: NodeId,
        reporter: Reporter,
        schedule: ScheduleConfig,
    ) -> Self {
        Self {
            api,
            node_id,
            state: Arc::new(LifecycleState::new()),
            reporter,
            schedule,
            tasks: Vec::new(),
        }
    }

    /// Shared lifecycle state.
    #[must_use]
    pub fn state(&self) -> Arc<LifecycleState> {
        Arc::clone(&self.state)
    }

    /// Returns true while periodic tasks are running.
    #[must_use]
    pub fn is_active(&self) -> bool {
        !self.tasks.is_empty()
    }

    /// Runs the bootstrap sequence.
    ///
    /// # Errors
    /// Returns the first failing step; shared state is left untouched.
    pub async fn bootstrap(&self) -> Result<()> {
        self.state.set_phase(LifecyclePhase::Bootstrapping);

        let result = self.run_bootstrap().await;
        if result.is_err() {
            self.state.set_phase(LifecyclePhase::Restarting);
        }
        result
    }

    async fn run_bootstrap(&self) -> Result<()> {
        let status = self.api.fetch_status().await?;
        let age = session_age(&status, Utc::now()).ok();
        self.reporter.status(&status, age);

        info!("Registering node {}...", self.node_id.short());
        self.api.register_node().await?;
        info!("Node registered successfully");

        info!("Starting session...");
        let started = self.api.start_session().await?;
        info!(session_id = %started.session_id, "Session started");

        self.api.send_ping().await?;
        debug!("Initial ping successful");

        self.state.commit_bootstrap(&status, &started);
        Ok(())
    }

    /// Spawns the periodic tasks.
    pub fn activate(&mut self, shutdown_tx: &broadcast::Sender<()>) {
        let ctx = TaskContext {
            api: Arc::clone(&self.api),
            state: Arc::clone(&self.state),
            reporter: self.reporter.clone(),
        };

        let ping_ctx = ctx.clone();
        let ping = spawn_periodic(
            "Ping",
            self.schedule.ping_interval(),
            shutdown_tx.subscribe(),
            move || {
                let ctx = ping_ctx.clone();
                async move { ctx.ping_once().await }
            },
        );
        self.tasks.push(("ping", ping));

        let status_ctx = ctx.clone();
        let status = spawn_periodic(
            "Status",
            self.schedule.status_interval(),
            shutdown_tx.subscribe(),
            move || {
                let ctx = status_ctx.clone();
                async move { ctx.status_once().await }
            },
        );
        self.tasks.push(("status", status));

        let refresh = spawn_periodic(
            "Session refresh",
            self.schedule.session_refresh_interval(),
            shutdown_tx.subscribe(),
            move || {
                let ctx = ctx.clone();
                async move { ctx.refresh_once().await }
            },
        );
        self.tasks.push(("session-refresh", refresh));

        info!("Node lifecycle active");
    }

    /// Waits for the periodic tasks; the shutdown signal must already be sent.
    ///
    /// `grace` bounds the whole wait, not each task.
    pub async fn stop(&mut self, grace: Duration) {
        let deadline = Instant::now() + grace;
        for (name, mut task) in self.tasks.drain(..) {
            match tokio::time::timeout_at(deadline, &mut task).await {
                Ok(Ok(())) => debug!("Task '{}' completed", name),
                Ok(Err(e)) => warn!("Task '{}' failed: {}", name, e),
                Err(_) => {
                    warn!("Task '{}' timed out during shutdown", name);
                    task.abort();
                }
            }
        }
    }
}

impl std::fmt::Debug for Scheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Scheduler")
            .field("node_id", &self.node_id)
            .field("state", &self.state)
            .field("tasks", &self.tasks.len())
            .finish_non_exhaustive()
    }
}
