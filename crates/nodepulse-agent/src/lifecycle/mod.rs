// ============================================
// File: crates/nodepulse-agent/src/lifecycle/mod.rs
// ============================================
//! # Node Lifecycle
//!
//! Bootstrap sequence, periodic tasks and the state they share.
//!
//! Main Components:
//!   - Scheduler: bootstrap + task ownership
//!   - TaskContext: ping / status / refresh iterations
//!   - LifecycleState: counters, current session, phase
//!
//! Last Modified: v0.1.0 - Initial lifecycle module
// ============================================

mod scheduler;
mod state;
mod tasks;

pub use scheduler::Scheduler;
pub use state::{Counters, LifecyclePhase, LifecycleState, SessionState, StatsSnapshot};
pub use tasks::{session_age, spawn_periodic, TaskContext};
