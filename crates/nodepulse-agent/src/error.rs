// ============================================
// File: crates/nodepulse-agent/src/error.rs
// ============================================
//! # Agent Error Types
//!
//! ## Main Functionality
//! - `AgentError`: configuration, lifecycle and wrapped client errors
//! - `Result<T>`: Type alias using `AgentError`
//! - `AgentError::classify`: reporting classification for any agent error
//!
//! ## ⚠️ Important Note for Next Developer
//! - Only configuration errors are fatal; everything raised after the
//!   supervisor starts is recovered by a restart or absorbed by a task
//!
//! ## Last Modified
//! v0.1.0 - Initial agent error definitions

use thiserror::Error;

use nodepulse_client::{classify, ClientError, FailureClassification};
use nodepulse_common::CommonError;

/// Result type for agent operations.
pub type Result<T> = std::result::Result<T, AgentError>;

/// Agent error types.
#[derive(Error, Debug)]
pub enum AgentError {
    #[error("Failed to load configuration from '{path}': {reason}")]
    ConfigLoad {
        path: String,
        reason: String,
    },

    #[error("Invalid configuration: {field} - {reason}")]
    ConfigInvalid {
        field: String,
        reason: String,
    },

    #[error("Missing required configuration: {field}")]
    ConfigMissing {
        field: String,
    },

    #[error("Node status contains no sessions")]
    EmptySessionList,

    #[error(transparent)]
    Client(#[from] ClientError),

    #[error(transparent)]
    Common(#[from] CommonError),
}

impl AgentError {
    pub fn config_load(path: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::ConfigLoad {
            path: path.into(),
            reason: reason.into(),
        }
    }

    pub fn config_invalid(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::ConfigInvalid {
            field: field.into(),
            reason: reason.into(),
        }
    }

    pub fn config_missing(field: impl Into<String>) -> Self {
        Self::ConfigMissing {
            field: field.into(),
        }
    }

    #[must_use]
    pub const fn is_config_error(&self) -> bool {
        matches!(
            self,
            Self::ConfigLoad { .. } | Self::ConfigInvalid { .. } | Self::ConfigMissing { .. }
        )
    }

    /// Errors that end the process instead of triggering a restart.
    #[must_use]
    pub const fn is_fatal(&self) -> bool {
        self.is_config_error()
    }

    /// Returns the underlying client error, if any.
    #[must_use]
    pub const fn client_error(&self) -> Option<&ClientError> {
        match self {
            Self::Client(e) => Some(e),
            _ => None,
        }
    }

    /// Classifies the error for reporting.
    #[must_use]
    pub fn classify(&self) -> FailureClassification {
        match self {
            Self::Client(e) => classify(e),
            other => FailureClassification::Generic {
                message: other.to_string(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nodepulse_client::ApiOperation;

    #[test]
    fn test_error_display() {
        let err = AgentError::config_load("/etc/nodepulse.toml", "file not found");
        assert!(err.to_string().contains("/etc/nodepulse.toml"));
    }

    #[test]
    fn test_error_classification() {
        let config_err = AgentError::config_invalid("schedule.ping_interval_secs", "must be > 0");
        assert!(config_err.is_config_error());
        assert!(config_err.is_fatal());

        let client_err: AgentError =
            ClientError::remote(ApiOperation::Register, 403, "Cloudflare Ray ID: R1<").into();
        assert!(!client_err.is_fatal());
        assert!(client_err.classify().is_rate_blocked());
        assert!(client_err.client_error().is_some());

        let empty = AgentError::EmptySessionList;
        assert_eq!(
            empty.classify(),
            FailureClassification::Generic {
                message: "Node status contains no sessions".to_string()
            }
        );
    }
}
