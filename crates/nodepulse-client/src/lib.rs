// ============================================
// File: crates/nodepulse-client/src/lib.rs
// ============================================
//! # nodepulse Client - Remote Session Client
//!
//! ## Creation Reason
//! Isolates every exchange with the remote node service behind one trait,
//! together with the classifier that interprets failed exchanges.
//!
//! ## Main Functionality
//! - [`traits`]: `NodeApi` (status, register, start-session, ping)
//! - [`http`]: `HttpNodeApi`, the `reqwest` implementation
//! - [`models`]: Wire request/response types
//! - [`classify`]: Rate-block vs generic failure classification
//! - [`error`]: `ClientError` taxonomy
//! - `mock`: Scripted `MockNodeApi` (feature `mock`)
//!
//! ## Architecture
//! ```text
//! ┌────────────────────────────────────────────────────┐
//! │                 Lifecycle Scheduler                │
//! └───────────────┬───────────────────────┬────────────┘
//!                 │ NodeApi               │ classify()
//!                 ▼                       ▼
//! ┌───────────────────────┐   ┌────────────────────────┐
//! │      HttpNodeApi      │   │  FailureClassification │
//! │ (reqwest, JSON, auth) │   │  RateBlocked | Generic │
//! └───────────┬───────────┘   └────────────────────────┘
//!             ▼
//!   {base}/nodes/{node_id}[/start-session|/ping]
//! ```
//!
//! ## ⚠️ Important Note for Next Developer
//! - Always go through the trait; the scheduler never sees `reqwest`
//! - No retries here: retry policy belongs to the agent
//!
//! ## Last Modified
//! v0.1.0 - Initial client implementation

#![warn(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]

pub mod classify;
pub mod error;
pub mod http;
pub mod models;
pub mod traits;

#[cfg(any(test, feature = "mock"))]
pub mod mock;

// Re-export primary types
pub use classify::{classify, FailureClassification};
pub use error::{ClientError, Result};
pub use http::{ClientOptions, HttpNodeApi};
pub use models::{
    ApiOperation, PingAck, RegistrationAck, RemoteSession, StartedSession, StatusSnapshot,
};
pub use traits::NodeApi;

#[cfg(any(test, feature = "mock"))]
pub use mock::MockNodeApi;
