// ============================================
// File: crates/nodepulse-agent/src/lib.rs
// ============================================
//! # nodepulse Agent Library
//!
//! ## Creation Reason
//! Keeps a node's remote session alive: bootstraps the node, pings,
//! checks status and refreshes the session on fixed schedules, and
//! restarts the bootstrap whenever it fails.
//!
//! ## Main Functionality
//!
//! ### Modules
//! - [`config`]: TOML configuration and identity resolution
//! - [`lifecycle`]: Bootstrap, periodic tasks, shared state
//! - [`supervisor`]: Restart loop and graceful shutdown
//! - [`report`]: Status / statistics / failure log output
//! - [`error`]: Agent error types
//!
//! ## Architecture Overview
//! ```text
//! ┌───────────────────────────────────────────────────────┐
//! │                      Supervisor                       │
//! │   bootstrap ──fail──► wait restart_delay ──► retry    │
//! └──────────────────────────┬────────────────────────────┘
//!                            │ ok
//!                            ▼
//! ┌───────────────────────────────────────────────────────┐
//! │                  Lifecycle Scheduler                  │
//! │  ┌──────────┐     ┌──────────┐     ┌───────────────┐  │
//! │  │ Ping 60s │     │Status120s│     │ Refresh 300s  │  │
//! │  └────┬─────┘     └────┬─────┘     └──────┬────────┘  │
//! │       └────────────────┼──────────────────┘           │
//! │                        ▼                              │
//! │                 LifecycleState                        │
//! └────────────────────────┬──────────────────────────────┘
//!                          ▼
//!                   NodeApi (HTTP)
//! ```
//!
//! ## ⚠️ Important Note for Next Developer
//! - Only configuration errors are fatal; everything else is retried
//! - Periodic task failures never reach the supervisor
//!
//! ## Last Modified
//! v0.1.0 - Initial agent library

#![warn(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]

pub mod config;
pub mod error;
pub mod lifecycle;
pub mod report;
pub mod supervisor;

// Re-export primary types
pub use config::AgentConfig;
pub use error::{AgentError, Result};
pub use lifecycle::{LifecyclePhase, Scheduler, StatsSnapshot};
pub use report::Reporter;
pub use supervisor::{ShutdownHandle, Supervisor};
