// ============================================
// File: crates/nodepulse-client/src/traits.rs
// ============================================
//! # Remote Session Client Trait
//!
//! ## Creation Reason
//! Abstracts the four remote exchanges so the lifecycle scheduler can be
//! driven by the real HTTP client in production and by a scripted mock
//! in tests.
//!
//! ## Design Philosophy
//! - Async-first design with `async_trait`
//! - Object safe: the agent holds an `Arc<dyn NodeApi>`
//! - One call = one request/response exchange, no internal retries
//!
//! ## ⚠️ Important Note for Next Developer
//! - Implementations are bound to a single `NodeIdentity` at construction
//! - Implementations must be Send + Sync for use in spawned tasks
//!
//! ## Last Modified
//! v0.1.0 - Initial trait definition

use async_trait::async_trait;

use crate::error::Result;
use crate::models::{PingAck, RegistrationAck, StartedSession, StatusSnapshot};

/// Remote operations available for the configured node.
///
/// # Errors
/// Every method fails with `ClientError::Remote` on a non-2xx response and
/// with `ClientError::Transport`/`Timeout` when no response arrives.
///
/// # Example
/// ```ignore
/// async fn heartbeat(api: &dyn NodeApi) -> Result<usize> {
///     let ack = api.send_ping().await?;
///     Ok(ack.total_pings_reported)
/// }
/// ```
#[async_trait]
pub trait NodeApi: Send + Sync {
    /// Fetches the node status and session history (`GET`).
    async fn fetch_status(&self) -> Result<StatusSnapshot>;

    /// Registers the node's hardware id. Safe to repeat.
    async fn register_node(&self) -> Result<RegistrationAck>;

    /// Starts a new session stamped with the current time.
    async fn start_session(&self) -> Result<StartedSession>;

    /// Sends one heartbeat stamped with the current time.
    async fn send_ping(&self) -> Result<PingAck>;
}
