// ============================================
// File: crates/nodepulse-client/src/error.rs
// ============================================
//! # Client Error Types
//!
//! ## Creation Reason
//! Defines the failure taxonomy of a single remote exchange. The
//! classifier and the lifecycle scheduler branch on these variants.
//!
//! ## Error Categories
//! 1. **Transport**: no response received (DNS, reset, timeout)
//! 2. **Remote**: non-2xx response, status and raw body preserved
//! 3. **Decode**: 2xx response whose body breaks the wire contract
//! 4. **Setup**: client construction failures (headers, TLS)
//!
//! ## ⚠️ Important Note for Next Developer
//! - `Remote::body` is kept verbatim; the classifier searches it for the
//!   edge-provider block marker
//! - Never put the auth token into an error message
//!
//! ## Last Modified
//! v0.1.0 - Initial error definitions

use thiserror::Error;

use crate::models::ApiOperation;

// ============================================
// Result Type Alias
// ============================================

/// Result type for client operations.
pub type Result<T> = std::result::Result<T, ClientError>;

// ============================================
// ClientError
// ============================================

/// Failure of one remote exchange.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ClientError {
    // ========================================
    // Exchange Errors
    // ========================================

    /// Connection-level failure; no response was received.
    #[error("{operation} request failed: {reason}")]
    Transport {
        /// Which remote operation was running
        operation: ApiOperation,
        /// Why the request failed
        reason: String,
    },

    /// The per-call timeout elapsed before a response arrived.
    #[error("{operation} request timed out")]
    Timeout {
        /// Which remote operation was running
        operation: ApiOperation,
    },

    /// The remote answered with a non-2xx status.
    #[error("{operation} request failed with status code {status}")]
    Remote {
        /// Which remote operation was running
        operation: ApiOperation,
        /// HTTP status code
        status: u16,
        /// Raw response body
        body: String,
    },

    /// A 2xx body did not match the expected shape.
    #[error("{operation} response could not be decoded: {reason}")]
    Decode {
        /// Which remote operation was running
        operation: ApiOperation,
        /// Decoder message
        reason: String,
    },

    // ========================================
    // Setup Errors
    // ========================================

    /// A header value could not be built from the identity.
    #[error("Invalid value for header '{name}'")]
    InvalidHeader {
        /// Header name
        name: &'static str,
    },

    /// The HTTP client could not be constructed.
    #[error("Failed to build HTTP client: {reason}")]
    Build {
        /// Why the builder failed
        reason: String,
    },
}

impl ClientError {
    // ========================================
    // Convenience Constructors
    // ========================================

    /// Creates a `Remote` error.
    pub fn remote(operation: ApiOperation, status: u16, body: impl Into<String>) -> Self {
        Self::Remote {
            operation,
            status,
            body: body.into(),
        }
    }

    /// Creates a `Transport` error.
    pub fn transport(operation: ApiOperation, reason: impl Into<String>) -> Self {
        Self::Transport {
            operation,
            reason: reason.into(),
        }
    }

    /// Creates a `Decode` error.
    pub fn decode(operation: ApiOperation, reason: impl Into<String>) -> Self {
        Self::Decode {
            operation,
            reason: reason.into(),
        }
    }

    /// Maps a `reqwest` send failure onto `Timeout` or `Transport`.
    pub(crate) fn from_send(operation: ApiOperation, err: &reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout { operation }
        } else {
            Self::transport(operation, err.to_string())
        }
    }

    // ========================================
    // Accessors
    // ========================================

    /// Returns the operation that failed, if the error came from an exchange.
    #[must_use]
    pub const fn operation(&self) -> Option<ApiOperation> {
        match self {
            Self::Transport { operation, .. }
            | Self::Timeout { operation }
            | Self::Remote { operation, .. }
            | Self::Decode { operation, .. } => Some(*operation),
            Self::InvalidHeader { .. } | Self::Build { .. } => None,
        }
    }

    /// Returns the HTTP status for `Remote` errors.
    #[must_use]
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::Remote { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Returns the raw response body for `Remote` errors.
    #[must_use]
    pub fn body(&self) -> Option<&str> {
        match self {
            Self::Remote { body, .. } => Some(body),
            _ => None,
        }
    }

    /// Returns `true` if no response was received.
    #[must_use]
    pub const fn is_transport(&self) -> bool {
        matches!(self, Self::Transport { .. } | Self::Timeout { .. })
    }
}

// ============================================
// Tests
// ============================================
