// ============================================
// File: crates/nodepulse-client/src/classify.rs
// ============================================
//! # Failure Classifier
//!
//! ## Creation Reason
//! The remote service sits behind an edge provider that answers abusive
//! clients with a 403 HTML page instead of the API's own errors. Those
//! pages carry a "Ray ID" the operator needs when asking for an unblock,
//! so they are reported apart from every other failure.
//!
//! ## Classification Rules
//! ```text
//! Remote { status: 403, body contains "Cloudflare" }
//!     → RateBlocked { diagnostic_id: capture of /Ray ID: (.*?)</ or "Unknown" }
//! anything else
//!     → Generic { message: error.to_string() }
//! ```
//!
//! ## ⚠️ Important Note for Next Developer
//! - Classification is for reporting only; callers must not branch on it
//!   beyond choosing log text
//! - Never panics, whatever the body looks like
//!
//! ## Last Modified
//! v0.1.0 - Initial classifier

use std::fmt;
use std::sync::OnceLock;

use regex::Regex;

use crate::error::ClientError;

/// Marker text identifying an edge-provider block page.
pub const EDGE_BLOCK_MARKER: &str = "Cloudflare";

/// Diagnostic id used when the block page carries none.
pub const UNKNOWN_DIAGNOSTIC_ID: &str = "Unknown";

/// Operator hint attached to rate blocks.
pub const RATE_BLOCK_HINT: &str = "Use a VPN or wait 24 hours";

const STATUS_FORBIDDEN: u16 = 403;

/// Outcome of classifying one failed exchange.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureClassification {
    /// The edge provider blocked this IP.
    RateBlocked {
        /// Ray ID from the block page, or `"Unknown"`.
        diagnostic_id: String,
    },
    /// Any other failure.
    Generic {
        /// Human-readable description of the failure.
        message: String,
    },
}

impl FailureClassification {
    /// Returns `true` for edge-provider blocks.
    #[must_use]
    pub const fn is_rate_blocked(&self) -> bool {
        matches!(self, Self::RateBlocked { .. })
    }

    /// Suggested operator action, if any.
    #[must_use]
    pub const fn remediation_hint(&self) -> Option<&'static str> {
        match self {
            Self::RateBlocked { .. } => Some(RATE_BLOCK_HINT),
            Self::Generic { .. } => None,
        }
    }
}

impl fmt::Display for FailureClassification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::RateBlocked { diagnostic_id } => {
                write!(f, "IP address blocked by {EDGE_BLOCK_MARKER} (Ray ID: {diagnostic_id})")
            }
            Self::Generic { message } => f.write_str(message),
        }
    }
}

/// Classifies a failed exchange.
#[must_use]
pub fn classify(error: &ClientError) -> FailureClassification {
    match error {
        ClientError::Remote { status, body, .. }
            if *status == STATUS_FORBIDDEN && body.contains(EDGE_BLOCK_MARKER) =>
        {
            FailureClassification::RateBlocked {
                diagnostic_id: extract_ray_id(body)
                    .unwrap_or(UNKNOWN_DIAGNOSTIC_ID)
                    .to_string(),
            }
        }
        other => FailureClassification::Generic {
            message: other.to_string(),
        },
    }
}

/// Finds `Ray ID: <token><` on a single line and returns a non-empty token.
fn extract_ray_id(body: &str) -> Option<&str> {
    static RAY_ID: OnceLock<Option<Regex>> = OnceLock::new();

    let pattern = RAY_ID
        .get_or_init(|| Regex::new(r"Ray ID: (.*?)<").ok())
        .as_ref()?;

    pattern
        .captures(body)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
        .filter(|token| !token.is_empty())
}

// ============================================
// Tests
// ============================================
