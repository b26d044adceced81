// ============================================
// File: crates/nodepulse-agent/src/supervisor.rs
// ============================================
//! # Supervisor
//!
//! ## Creation Reason
//! Keeps the node alive: runs the bootstrap until it succeeds, then holds
//! the active lifecycle until shutdown is requested.
//!
//! ## Main Functionality
//! - Unbounded bootstrap retries with a fixed delay
//! - Shutdown broadcast to every periodic task
//! - Final statistics report on exit
//!
//! ## Shutdown Flow
//! ```text
//! ShutdownHandle::shutdown()
//!     │ flag = true, broadcast ()
//!     ▼
//! tasks finish in-flight exchange ──► stop(grace) ──► final stats
//! ```
//!
//! ## ⚠️ Important Note for Next Developer
//! - The restart delay does not grow and there is no attempt cap
//! - Subscribe before checking the flag, or a shutdown can be missed
//! - Tasks spawned after a shutdown was broadcast never see it, so the
//!   flag is checked again around `activate`
//!
//! ## Last Modified
//! v0.1.0 - Initial supervisor implementation

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::broadcast;
use tracing::{debug, info, warn};

use crate::lifecycle::{Scheduler, StatsSnapshot};
use crate::report::Reporter;

// ============================================
// ShutdownHandle
// ============================================

/// Requests a supervisor shutdown from another task.
#[derive(Debug, Clone)]
pub struct ShutdownHandle {
    flag: Arc<AtomicBool>,
    tx: broadcast::Sender<()>,
}

impl ShutdownHandle {
    /// Signals shutdown.
    pub fn shutdown(&self) {
        self.flag.store(true, Ordering::SeqCst);
        let _ = self.tx.send(());
    }

    /// Returns true once shutdown was requested.
    #[must_use]
    pub fn is_shutdown(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }
}

// ============================================
// Supervisor
// ============================================

/// Restart loop around the lifecycle scheduler.
#[derive(Debug)]
pub struct Supervisor {
    scheduler: Scheduler,
    reporter: Reporter,
    restart_delay: Duration,
    shutdown_grace: Duration,
    shutdown: Arc<AtomicBool>,
    shutdown_tx: broadcast::Sender<()>,
}

impl Supervisor {
    /// Creates a supervisor.
    pub fn new(
        scheduler: Scheduler,
        reporter: Reporter,
        restart_delay: Duration,
        shutdown_grace: Duration,
    ) -> Self {
        let (shutdown_tx, _) = broadcast::channel(4);

        Self {
            scheduler,
            reporter,
            restart_delay,
            shutdown_grace,
            shutdown: Arc::new(AtomicBool::new(false)),
            shutdown_tx,
        }
    }

    /// Handle used to stop `run`.
    #[must_use]
    pub fn shutdown_handle(&self) -> ShutdownHandle {
        ShutdownHandle {
            flag: Arc::clone(&self.shutdown),
            tx: self.shutdown_tx.clone(),
        }
    }

    /// Runs until shutdown and returns the final statistics.
    pub async fn run(mut self) -> StatsSnapshot {
        let mut shutdown_rx = self.shutdown_tx.subscribe();
        let mut attempt: u64 = 0;

        while !self.shutdown.load(Ordering::SeqCst) {
            attempt += 1;
            debug!(attempt, "Starting bootstrap");

            match self.scheduler.bootstrap().await {
                Ok(()) => {
                    info!("Bootstrap complete");
                    if self.shutdown.load(Ordering::SeqCst) {
                        break;
                    }

                    self.scheduler.activate(&self.shutdown_tx);
                    if self.shutdown.load(Ordering::SeqCst) {
                        // Tasks subscribed after the original signal went out
                        let _ = self.shutdown_tx.send(());
                    } else {
                        let _ = shutdown_rx.recv().await;
                    }
                    break;
                }
                Err(e) => {
                    self.reporter.agent_failure("Bootstrap", &e);
                    warn!("Restarting in {} seconds...", self.restart_delay.as_secs());

                    tokio::select! {
                        _ = shutdown_rx.recv() => break,
                        _ = tokio::time::sleep(self.restart_delay) => {}
                    }
                }
            }
        }

        info!("Shutting down gracefully...");
        self.scheduler.stop(self.shutdown_grace).await;

        let stats = self.scheduler.state().snapshot();
        self.reporter.stats(&stats);
        info!("Shutdown complete");
        stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ScheduleConfig;
    use crate::lifecycle::LifecyclePhase;
    use async_trait::async_trait;
    use nodepulse_client::{
        ApiOperation, ClientError, MockNodeApi, NodeApi, PingAck, RegistrationAck,
        StartedSession, StatusSnapshot,
    };
    use nodepulse_common::NodeId;

    fn supervisor(api: Arc<MockNodeApi>) -> Supervisor {
        let scheduler = Scheduler::new(
            api,
            NodeId::new("12D3KooWsupervisor").unwrap(),
            Reporter::default(),
            ScheduleConfig::default(),
        );
        Supervisor::new(
            scheduler,
            Reporter::default(),
            Duration::from_secs(5),
            Duration::from_secs(30),
        )
    }

    #[tokio::test(start_paused = true)]
    async fn test_restarts_until_bootstrap_succeeds() {
        let api = Arc::new(MockNodeApi::new());
        api.push_status(Err(ClientError::transport(ApiOperation::Status, "reset")));
        api.push_status(Err(ClientError::transport(ApiOperation::Status, "reset")));
        let supervisor = supervisor(Arc::clone(&api));
        let handle = supervisor.shutdown_handle();

        let run = tokio::spawn(supervisor.run());
        tokio::time::sleep(Duration::from_secs(11)).await;
        assert_eq!(api.calls(ApiOperation::Status), 3);
        assert_eq!(api.calls(ApiOperation::Register), 1);

        handle.shutdown();
        let stats = run.await.unwrap();
        assert_eq!(stats.phase, LifecyclePhase::Active);
        assert_eq!(stats.counters.total_pings, 1);
        assert_eq!(stats.session.unwrap().session_id.as_str(), "session-1");
    }

    struct SlowRegister {
        inner: MockNodeApi,
        delay: Duration,
    }

    #[async_trait]
    impl NodeApi for SlowRegister {
        async fn fetch_status(&self) -> nodepulse_client::Result<StatusSnapshot> {
            self.inner.fetch_status().await
        }

        async fn register_node(&self) -> nodepulse_client::Result<RegistrationAck> {
            tokio::time::sleep(self.delay).await;
            self.inner.register_node().await
        }

        async fn start_session(&self) -> nodepulse_client::Result<StartedSession> {
            self.inner.start_session().await
        }

        async fn send_ping(&self) -> nodepulse_client::Result<PingAck> {
            self.inner.send_ping().await
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_shutdown_during_bootstrap_exits_promptly() {
        let api = Arc::new(SlowRegister {
            inner: MockNodeApi::new(),
            delay: Duration::from_secs(2),
        });
        let scheduler = Scheduler::new(
            Arc::clone(&api) as Arc<dyn NodeApi>,
            NodeId::new("12D3KooWsupervisor").unwrap(),
            Reporter::default(),
            ScheduleConfig::default(),
        );
        let supervisor = Supervisor::new(
            scheduler,
            Reporter::default(),
            Duration::from_secs(5),
            Duration::from_secs(30),
        );
        let handle = supervisor.shutdown_handle();

        let run = tokio::spawn(supervisor.run());
        tokio::time::sleep(Duration::from_secs(1)).await;
        let requested = tokio::time::Instant::now();
        handle.shutdown();

        let stats = run.await.unwrap();
        assert!(requested.elapsed() < Duration::from_secs(5));
        // The in-flight bootstrap still completes
        assert_eq!(stats.counters.total_pings, 1);
        assert_eq!(api.inner.calls(ApiOperation::Ping), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_shutdown_interrupts_restart_delay() {
        let api = Arc::new(MockNodeApi::new());
        api.push_register(Err(ClientError::remote(ApiOperation::Register, 502, "")));
        let supervisor = supervisor(Arc::clone(&api));
        let handle = supervisor.shutdown_handle();

        let run = tokio::spawn(supervisor.run());
        tokio::time::sleep(Duration::from_secs(1)).await;
        handle.shutdown();

        let stats = run.await.unwrap();
        assert!(handle.is_shutdown());
        assert_eq!(stats.phase, LifecyclePhase::Restarting);
        assert!(stats.session.is_none());
        assert_eq!(api.calls(ApiOperation::Register), 1);
    }

    #[tokio::test]
    async fn test_shutdown_before_run() {
        let api = Arc::new(MockNodeApi::new());
        let supervisor = supervisor(Arc::clone(&api));
        supervisor.shutdown_handle().shutdown();

        let stats = supervisor.run().await;
        assert_eq!(stats.phase, LifecyclePhase::Uninitialized);
        assert_eq!(api.calls(ApiOperation::Status), 0);
    }
}
