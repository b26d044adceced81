// ============================================
// File: crates/nodepulse-common/src/types.rs
// ============================================
//! # Core Type Definitions
//!
//! ## Creation Reason
//! Centralizes the identifiers exchanged with the remote node service so the
//! client and the agent never pass bare strings around.
//!
//! ## Main Functionality
//! - `NodeId`: Remote node identifier (path segment of every request)
//! - `SessionId`: Identifier the remote assigns on start-session
//! - `AuthToken`: Bearer credential, zeroized on drop
//! - `NodeIdentity`: Immutable identity bundle loaded once at startup
//!
//! ## ⚠️ Important Note for Next Developer
//! - `AuthToken` has a manual `Drop` that zeroizes the buffer
//! - `Debug` for `AuthToken` and `NodeIdentity` never shows the token
//! - The legacy identity file uses camelCase keys and calls the client
//!   version plain `version`
//!
//! ## Last Modified
//! v0.1.0 - Initial type definitions

use std::fmt;

use serde::{Deserialize, Serialize};
use zeroize::Zeroize;

use crate::error::{CommonError, Result};

/// Number of characters shown by [`NodeId::short`].
pub const NODE_ID_SHORT_LEN: usize = 16;

// ============================================
// NodeId
// ============================================

/// Opaque identifier of the registered node.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(String);

impl NodeId {
    /// Wraps a node identifier, rejecting empty values.
    pub fn new(id: impl Into<String>) -> Result<Self> {
        let id = id.into();
        if id.trim().is_empty() {
            return Err(CommonError::invalid_input("node_id", "cannot be empty"));
        }
        Ok(Self(id))
    }

    /// Returns the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns the first 16 characters, used in log lines.
    #[must_use]
    pub fn short(&self) -> String {
        self.0.chars().take(NODE_ID_SHORT_LEN).collect()
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ============================================
// SessionId
// ============================================

/// Identifier of a remote session, as returned in the `_id` field.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(String);

impl SessionId {
    /// Wraps a session identifier.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for SessionId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

// ============================================
// AuthToken
// ============================================

/// Bearer credential used in the `Authorization` header.
#[derive(Clone, PartialEq, Eq)]
pub struct AuthToken(String);

// Wipe the credential from memory once the identity goes away
impl Drop for AuthToken {
    fn drop(&mut self) {
        self.0.zeroize();
    }
}

impl AuthToken {
    /// Wraps a bearer token, rejecting empty values.
    pub fn new(token: impl Into<String>) -> Result<Self> {
        let token = token.into();
        if token.trim().is_empty() {
            return Err(CommonError::invalid_input("auth_token", "cannot be empty"));
        }
        Ok(Self(token))
    }

    /// Exposes the raw token. Only the HTTP layer should call this.
    #[must_use]
    pub fn expose(&self) -> &str {
        &self.0
    }

    /// Formats the value of the `Authorization` header.
    #[must_use]
    pub fn bearer(&self) -> String {
        format!("Bearer {}", self.0)
    }
}

impl fmt::Debug for AuthToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AuthToken(<redacted>)")
    }
}

// ============================================
// NodeIdentity
// ============================================

/// Identity of the single node managed by this process.
///
/// Built once before any remote call and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeIdentity {
    /// Remote node identifier.
    pub node_id: NodeId,
    /// Hardware identifier reported on registration.
    pub hardware_id: String,
    /// Bearer credential.
    pub auth_token: AuthToken,
    /// Version tag sent with every request.
    pub client_version: String,
}

/// On-disk layout of the legacy `config.json` identity file.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LegacyIdentityFile {
    node_id: String,
    hardware_id: String,
    auth_token: String,
    version: String,
}

impl NodeIdentity {
    /// Builds an identity, validating that every field is present.
    pub fn new(
        node_id: impl Into<String>,
        hardware_id: impl Into<String>,
        auth_token: impl Into<String>,
        client_version: impl Into<String>,
    ) -> Result<Self> {
        let hardware_id = hardware_id.into();
        if hardware_id.trim().is_empty() {
            return Err(CommonError::invalid_input("hardware_id", "cannot be empty"));
        }
        let client_version = client_version.into();
        if client_version.trim().is_empty() {
            return Err(CommonError::invalid_input("client_version", "cannot be empty"));
        }

        Ok(Self {
            node_id: NodeId::new(node_id)?,
            hardware_id,
            auth_token: AuthToken::new(auth_token)?,
            client_version,
        })
    }

    /// Parses the legacy JSON identity file
    /// (`{"nodeId", "hardwareId", "authToken", "version"}`).
    pub fn from_legacy_json(content: &str) -> Result<Self> {
        let file: LegacyIdentityFile = serde_json::from_str(content)
            .map_err(|e| CommonError::decoding("legacy identity file", e.to_string()))?;
        Self::new(file.node_id, file.hardware_id, file.auth_token, file.version)
    }
}

// ============================================
// Tests
// ============================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_node_id_short() {
        let id = NodeId::new("12D3KooWabcdefghijklmnopqrstuvwxyz").unwrap();
        assert_eq!(id.short(), "12D3KooWabcdefgh");

        let tiny = NodeId::new("abc").unwrap();
        assert_eq!(tiny.short(), "abc");
    }

    #[test]
    fn test_empty_node_id_rejected() {
        assert!(NodeId::new("   ").is_err());
    }

    #[test]
    fn test_auth_token_redacted() {
        let token = AuthToken::new("super-secret").unwrap();
        assert_eq!(token.bearer(), "Bearer super-secret");
        assert!(!format!("{token:?}").contains("super-secret"));
    }

    #[test]
    fn test_identity_debug_hides_token() {
        let identity = NodeIdentity::new("node", "hw", "super-secret", "0.1.7").unwrap();
        let debug = format!("{identity:?}");
        assert!(debug.contains("node"));
        assert!(!debug.contains("super-secret"));
    }

    #[test]
    fn test_legacy_json_identity() {
        let json = r#"{
            "nodeId": "12D3KooWnode",
            "hardwareId": "e3b0c44298fc",
            "authToken": "eyJhbGciOi",
            "version": "0.1.7"
        }"#;

        let identity = NodeIdentity::from_legacy_json(json).unwrap();
        assert_eq!(identity.node_id.as_str(), "12D3KooWnode");
        assert_eq!(identity.hardware_id, "e3b0c44298fc");
        assert_eq!(identity.auth_token.expose(), "eyJhbGciOi");
        assert_eq!(identity.client_version, "0.1.7");
    }

    #[test]
    fn test_legacy_json_missing_field() {
        let json = r#"{"nodeId": "n", "hardwareId": "h", "version": "1"}"#;
        let err = NodeIdentity::from_legacy_json(json).unwrap_err();
        assert!(matches!(err, CommonError::Decoding { .. }));
    }

    #[test]
    fn test_identity_rejects_blank_fields() {
        assert!(NodeIdentity::new("node", "", "token", "1").is_err());
        assert!(NodeIdentity::new("node", "hw", "", "1").is_err());
        assert!(NodeIdentity::new("node", "hw", "token", " ").is_err());
    }
}
