// ============================================
// File: crates/nodepulse-client/src/mock.rs
// ============================================
//! # Mock Node API Implementation
//!
//! ## Creation Reason
//! Provides a scripted `NodeApi` for testing the lifecycle scheduler and
//! supervisor without a network.
//!
//! ## Main Functionality
//! - Per-operation response queues (`push_*`)
//! - Canned successes once a queue is empty
//! - Per-operation call counters for verification
//! - Start-session hands out `session-1`, `session-2`, ... by default
//!
//! ## Usage in Tests
//! ```ignore
//! let api = MockNodeApi::new();
//! api.push_ping(Err(ClientError::remote(ApiOperation::Ping, 500, "")));
//! assert!(api.send_ping().await.is_err());
//! assert!(api.send_ping().await.is_ok());
//! assert_eq!(api.calls(ApiOperation::Ping), 2);
//! ```
//!
//! ## ⚠️ Important Note for Next Developer
//! - This is for testing only - enable with the `mock` feature
//!
//! ## Last Modified
//! v0.1.0 - Initial mock implementation

use std::collections::{HashMap, VecDeque};

use async_trait::async_trait;
use chrono::Utc;
use parking_lot::Mutex;

use nodepulse_common::SessionId;

use crate::error::Result;
use crate::models::{
    ApiOperation, PingAck, RegistrationAck, StartedSession, StatusSnapshot,
};
use crate::traits::NodeApi;

/// Scripted in-memory `NodeApi`.
#[derive(Default)]
pub struct MockNodeApi {
    status: Mutex<VecDeque<Result<StatusSnapshot>>>,
    register: Mutex<VecDeque<Result<RegistrationAck>>>,
    start_session: Mutex<VecDeque<Result<StartedSession>>>,
    ping: Mutex<VecDeque<Result<PingAck>>>,
    default_status: Mutex<Option<StatusSnapshot>>,
    calls: Mutex<HashMap<ApiOperation, usize>>,
    sessions_started: Mutex<u64>,
}

impl MockNodeApi {
    /// Creates a mock that succeeds on every call.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues the next `fetch_status` result.
    pub fn push_status(&self, result: Result<StatusSnapshot>) {
        self.status.lock().push_back(result);
    }

    /// Queues the next `register_node` result.
    pub fn push_register(&self, result: Result<RegistrationAck>) {
        self.register.lock().push_back(result);
    }

    /// Queues the next `start_session` result.
    pub fn push_start_session(&self, result: Result<StartedSession>) {
        self.start_session.lock().push_back(result);
    }

    /// Queues the next `send_ping` result.
    pub fn push_ping(&self, result: Result<PingAck>) {
        self.ping.lock().push_back(result);
    }

    /// Sets the status returned once the status queue is empty.
    pub fn set_default_status(&self, status: StatusSnapshot) {
        *self.default_status.lock() = Some(status);
    }

    /// Number of times `operation` was invoked.
    #[must_use]
    pub fn calls(&self, operation: ApiOperation) -> usize {
        self.calls.lock().get(&operation).copied().unwrap_or(0)
    }

    fn record(&self, operation: ApiOperation) {
        *self.calls.lock().entry(operation).or_insert(0) += 1;
    }

    fn next_session(&self) -> StartedSession {
        let mut started = self.sessions_started.lock();
        *started += 1;
        StartedSession {
            session_id: SessionId::new(format!("session-{}", *started)),
            started_at: Utc::now(),
        }
    }
}

#[async_trait]
impl NodeApi for MockNodeApi {
    async fn fetch_status(&self) -> Result<StatusSnapshot> {
        self.record(ApiOperation::Status);
        if let Some(result) = self.status.lock().pop_front() {
            return result;
        }
        Ok(self.default_status.lock().clone().unwrap_or(StatusSnapshot {
            is_connected: true,
            today_reward: 0.0,
            total_reward: 0.0,
            client_version_reported: None,
            sessions: Vec::new(),
        }))
    }

    async fn register_node(&self) -> Result<RegistrationAck> {
        self.record(ApiOperation::Register);
        let queued = self.register.lock().pop_front();
        queued.unwrap_or(Ok(RegistrationAck {
            raw: serde_json::Value::Null,
        }))
    }

    async fn start_session(&self) -> Result<StartedSession> {
        self.record(ApiOperation::StartSession);
        let queued = self.start_session.lock().pop_front();
        match queued {
            Some(result) => result,
            None => Ok(self.next_session()),
        }
    }

    async fn send_ping(&self) -> Result<PingAck> {
        self.record(ApiOperation::Ping);
        let queued = self.ping.lock().pop_front();
        queued.unwrap_or(Ok(PingAck {
            total_pings_reported: self.calls(ApiOperation::Ping),
        }))
    }
}

impl std::fmt::Debug for MockNodeApi {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MockNodeApi")
            .field("calls", &*self.calls.lock())
            .finish()
    }
}

// ============================================
// Tests
// ============================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ClientError;

    #[tokio::test]
    async fn test_mock_defaults_succeed() {
        let api = MockNodeApi::new();

        assert!(api.fetch_status().await.is_ok());
        assert!(api.register_node().await.is_ok());
        assert_eq!(api.send_ping().await.unwrap().total_pings_reported, 1);
        assert_eq!(api.calls(ApiOperation::Status), 1);
        assert_eq!(api.calls(ApiOperation::StartSession), 0);
    }

    #[tokio::test]
    async fn test_mock_scripted_then_default() {
        let api = MockNodeApi::new();
        api.push_ping(Err(ClientError::remote(ApiOperation::Ping, 500, "boom")));

        assert!(api.send_ping().await.is_err());
        assert!(api.send_ping().await.is_ok());
        assert_eq!(api.calls(ApiOperation::Ping), 2);
    }

    #[tokio::test]
    async fn test_mock_session_ids_advance() {
        let api = MockNodeApi::new();

        let first = api.start_session().await.unwrap();
        let second = api.start_session().await.unwrap();

        assert_eq!(first.session_id.as_str(), "session-1");
        assert_eq!(second.session_id.as_str(), "session-2");
    }
}
