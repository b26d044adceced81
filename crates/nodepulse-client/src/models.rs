// ============================================
// File: crates/nodepulse-client/src/models.rs
// ============================================
//! Purpose: Wire models for the remote node service
//!
//! Main Data Structures:
//!   - RegisterRequest / RegistrationAck: node registration
//!   - StartSessionRequest / StartedSession: session start and refresh
//!   - PingRequest / PingAck: heartbeat
//!   - StatusSnapshot / RemoteSession: node status and session history
//!
//! ⚠️ Important Note for Next Developer:
//!   - Request bodies use camelCase keys; registration and start-session
//!     send `extensionVersion`, ping sends plain `version`
//!   - Reward figures may be missing or null in the status body; both
//!     read as 0
//!   - `sessions` is ordered oldest first; the last entry is the live one
//! ============================================

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use nodepulse_common::SessionId;

// ============================================
// ApiOperation
// ============================================

/// The four exchanges the remote service supports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ApiOperation {
    /// `GET /nodes/{id}`
    Status,
    /// `POST /nodes/{id}`
    Register,
    /// `POST /nodes/{id}/start-session`
    StartSession,
    /// `POST /nodes/{id}/ping`
    Ping,
}

impl ApiOperation {
    /// Path suffix appended to `/nodes/{id}`.
    #[must_use]
    pub const fn path_suffix(self) -> &'static str {
        match self {
            Self::Status | Self::Register => "",
            Self::StartSession => "/start-session",
            Self::Ping => "/ping",
        }
    }
}

impl fmt::Display for ApiOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Status => "status",
            Self::Register => "register",
            Self::StartSession => "start-session",
            Self::Ping => "ping",
        };
        f.write_str(name)
    }
}

// ============================================
// Requests
// ============================================

/// Body of the registration request.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    /// Hardware identifier of this machine.
    pub hardware_id: String,
    /// Client version tag.
    pub extension_version: String,
}

/// Body of the start-session request.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StartSessionRequest {
    /// ISO-8601 start time.
    pub start_at: String,
    /// Client version tag.
    pub extension_version: String,
}

/// Body of the ping request.
#[derive(Debug, Clone, Serialize)]
pub struct PingRequest {
    /// ISO-8601 send time.
    pub timestamp: String,
    /// Client version tag.
    pub version: String,
}

// ============================================
// Responses
// ============================================

/// Acknowledgement of a registration. The payload is not interpreted.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(transparent)]
pub struct RegistrationAck {
    /// Raw response body.
    pub raw: serde_json::Value,
}

/// Raw start-session response.
#[derive(Debug, Deserialize)]
pub(crate) struct StartSessionResponse {
    #[serde(rename = "_id")]
    pub id: SessionId,
    #[serde(rename = "startAt", default)]
    pub start_at: Option<DateTime<Utc>>,
}

/// A session freshly opened by start-session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StartedSession {
    /// Identifier assigned by the remote.
    pub session_id: SessionId,
    /// Start time echoed by the remote, or the time we sent.
    pub started_at: DateTime<Utc>,
}

/// Raw ping response.
#[derive(Debug, Deserialize)]
pub(crate) struct PingResponse {
    #[serde(default)]
    pub pings: Option<Vec<serde_json::Value>>,
}

/// Acknowledgement of a ping.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PingAck {
    /// Length of the `pings` array the remote returned.
    pub total_pings_reported: usize,
}

impl From<PingResponse> for PingAck {
    fn from(response: PingResponse) -> Self {
        Self {
            total_pings_reported: response.pings.map_or(0, |p| p.len()),
        }
    }
}

/// One entry of the remote session history.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteSession {
    /// Remote identifier, when present.
    #[serde(rename = "_id", default)]
    pub id: Option<SessionId>,
    /// When the session started.
    pub start_at: DateTime<Utc>,
    /// When the session ended, if it did.
    #[serde(default)]
    pub end_at: Option<DateTime<Utc>>,
}

/// Node status as reported by `GET /nodes/{id}`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusSnapshot {
    /// Whether the remote considers the node connected.
    #[serde(default)]
    pub is_connected: bool,
    /// Reward accrued today.
    #[serde(default, deserialize_with = "null_as_zero")]
    pub today_reward: f64,
    /// Reward accrued overall.
    #[serde(default, deserialize_with = "null_as_zero")]
    pub total_reward: f64,
    /// Client version the remote has on record.
    #[serde(rename = "extensionVersion", default)]
    pub client_version_reported: Option<String>,
    /// Session history, oldest first.
    #[serde(default)]
    pub sessions: Vec<RemoteSession>,
}

impl StatusSnapshot {
    /// Returns the most recently started session.
    #[must_use]
    pub fn last_session(&self) -> Option<&RemoteSession> {
        self.sessions.last()
    }
}

fn null_as_zero<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<f64>::deserialize(deserializer)?.unwrap_or(0.0))
}

// ============================================
// Tests
// ============================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_snapshot_parse() {
        let json = r#"{
            "_id": "node-doc",
            "isConnected": true,
            "todayReward": 1.5,
            "totalReward": 10.25,
            "extensionVersion": "0.1.7",
            "sessions": [
                {"_id": "s1", "startAt": "2024-03-09T07:00:00.000Z", "endAt": "2024-03-09T08:00:00.000Z"},
                {"_id": "s2", "startAt": "2024-03-09T09:00:00.000Z"}
            ]
        }"#;

        let status: StatusSnapshot = serde_json::from_str(json).unwrap();
        assert!(status.is_connected);
        assert!((status.today_reward - 1.5).abs() < f64::EPSILON);
        assert!((status.total_reward - 10.25).abs() < f64::EPSILON);
        assert_eq!(status.client_version_reported.as_deref(), Some("0.1.7"));

        let last = status.last_session().unwrap();
        assert_eq!(last.id, Some(SessionId::new("s2")));
        assert!(last.end_at.is_none());
    }

    #[test]
    fn test_status_snapshot_defaults() {
        let status: StatusSnapshot =
            serde_json::from_str(r#"{"todayReward": null}"#).unwrap();
        assert!(!status.is_connected);
        assert_eq!(status.today_reward, 0.0);
        assert_eq!(status.total_reward, 0.0);
        assert!(status.last_session().is_none());
    }

    #[test]
    fn test_request_field_names() {
        let register = serde_json::to_value(RegisterRequest {
            hardware_id: "hw".into(),
            extension_version: "0.1.7".into(),
        })
        .unwrap();
        assert_eq!(register["hardwareId"], "hw");
        assert_eq!(register["extensionVersion"], "0.1.7");

        let ping = serde_json::to_value(PingRequest {
            timestamp: "2024-03-09T07:00:00.000Z".into(),
            version: "0.1.7".into(),
        })
        .unwrap();
        assert_eq!(ping["version"], "0.1.7");
        assert!(ping.get("extensionVersion").is_none());
    }

    #[test]
    fn test_ping_ack_counts() {
        let response: PingResponse =
            serde_json::from_str(r#"{"pings": [{}, {}, {}]}"#).unwrap();
        assert_eq!(PingAck::from(response).total_pings_reported, 3);

        let response: PingResponse = serde_json::from_str("{}").unwrap();
        assert_eq!(PingAck::from(response).total_pings_reported, 0);
    }

    #[test]
    fn test_operation_paths() {
        assert_eq!(ApiOperation::Status.path_suffix(), "");
        assert_eq!(ApiOperation::StartSession.path_suffix(), "/start-session");
        assert_eq!(ApiOperation::Ping.to_string(), "ping");
    }
}
