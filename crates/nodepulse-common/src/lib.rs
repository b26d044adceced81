// ============================================
// File: crates/nodepulse-common/src/lib.rs
// ============================================
//! # nodepulse Common - Shared Types Library
//!
//! ## Creation Reason
//! Provides the identifiers, node identity and time helpers shared by the
//! remote session client and the lifecycle agent.
//!
//! ## Main Functionality
//! - [`types`]: `NodeId`, `SessionId`, `AuthToken`, `NodeIdentity`
//! - [`time`]: ISO-8601 timestamps, whole-second ages, duration formatting
//! - [`error`]: Common error type and result alias
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────┐
//! │                 nodepulse-agent                     │
//! │                       │                             │
//! │                       ▼                             │
//! │                nodepulse-client                     │
//! │                       │                             │
//! │                       ▼                             │
//! │                nodepulse-common  ◄── You are here   │
//! └─────────────────────────────────────────────────────┘
//! ```
//!
//! ## ⚠️ Important Note for Next Developer
//! - This crate is the foundation - changes affect everything
//! - `AuthToken` must never be printed; its `Debug` is redacted
//!
//! ## Last Modified
//! v0.1.0 - Initial implementation

#![warn(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]

pub mod error;
pub mod time;
pub mod types;

// Re-export commonly used items at crate root
pub use error::{CommonError, Result};
pub use types::{AuthToken, NodeId, NodeIdentity, SessionId};
