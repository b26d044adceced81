// ============================================
// File: crates/nodepulse-agent/src/config.rs
// ============================================
//! # Agent Configuration
//!
//! ## Creation Reason
//! Provides configuration management for the nodepulse agent, loaded from
//! a TOML file, with the node identity either inline or in the legacy
//! JSON identity file.
//!
//! ## Configuration Sections
//! - `node`: identity (inline fields or `identity_file`)
//! - `api`: remote base URL, request timeout, browser headers
//! - `schedule`: ping/status/refresh periods, restart delay, shutdown grace
//! - `logging`: log level, raw error body dumps
//!
//! ## Example Configuration
//! ```toml
//! [node]
//! node_id = "12D3KooW..."
//! hardware_id = "e3b0c442..."
//! auth_token = "eyJhbGciOi..."
//! client_version = "0.1.7"
//!
//! [api]
//! base_url = "https://gateway-run.bls.dev/api/v1"
//! request_timeout_secs = 30
//!
//! [schedule]
//! ping_interval_secs = 60
//! status_interval_secs = 120
//! session_refresh_interval_secs = 300
//! restart_delay_secs = 5
//! ```
//!
//! ## ⚠️ Important Note for Next Developer
//! - Every section has defaults; only the identity is mandatory
//! - A missing or broken identity is fatal before the supervisor starts
//! - With no identity configured at all, `./config.json` is read if present
//!
//! ## Last Modified
//! v0.1.0 - Initial configuration implementation

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::info;

use nodepulse_client::http::{DEFAULT_API_BASE, DEFAULT_REQUEST_TIMEOUT};
use nodepulse_client::ClientOptions;
use nodepulse_common::NodeIdentity;

use crate::error::{AgentError, Result};

// ============================================
// AgentConfig
// ============================================

/// Main agent configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AgentConfig {
    /// Node identity.
    #[serde(default)]
    pub node: NodeConfig,

    /// Remote API settings.
    #[serde(default)]
    pub api: ApiConfig,

    /// Periodic task timing.
    #[serde(default)]
    pub schedule: ScheduleConfig,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl AgentConfig {
    /// Loads configuration from a TOML file.
    ///
    /// # Errors
    /// Returns error if file cannot be read, parsed or validated.
    pub async fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let path_str = path.display().to_string();

        info!("Loading configuration from: {}", path_str);

        let content = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| AgentError::config_load(&path_str, e.to_string()))?;

        let config: Self = toml::from_str(&content)
            .map_err(|e| AgentError::config_load(&path_str, e.to_string()))?;

        config.validate()?;

        info!("Configuration loaded successfully");
        Ok(config)
    }

    /// Parses configuration from a string (useful for testing).
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content)
            .map_err(|e| AgentError::config_load("<string>", e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<()> {
        self.api.validate()?;
        self.schedule.validate()?;
        Ok(())
    }

    /// Resolves the node identity.
    ///
    /// Precedence: `identity_override` (CLI), `node.identity_file`, the
    /// inline `node` fields, then `./config.json` when no inline field is
    /// set and that file exists.
    ///
    /// # Errors
    /// Returns a configuration error if no complete identity is available.
    pub async fn resolve_identity(&self, identity_override: Option<&Path>) -> Result<NodeIdentity> {
        self.resolve_identity_with(identity_override, Path::new(LEGACY_IDENTITY_FILE))
            .await
    }

    async fn resolve_identity_with(
        &self,
        identity_override: Option<&Path>,
        legacy_file: &Path,
    ) -> Result<NodeIdentity> {
        if let Some(path) = identity_override.or(self.node.identity_file.as_deref()) {
            return load_identity_file(path).await;
        }
        if self.node.is_empty() && tokio::fs::try_exists(legacy_file).await.unwrap_or(false) {
            info!("Using legacy identity file: {}", legacy_file.display());
            return load_identity_file(legacy_file).await;
        }
        self.node.inline_identity()
    }
}

/// Identity file picked up from the working directory when nothing else
/// names an identity.
pub const LEGACY_IDENTITY_FILE: &str = "config.json";

/// Reads a legacy `{nodeId, hardwareId, authToken, version}` JSON file.
pub async fn load_identity_file(path: &Path) -> Result<NodeIdentity> {
    let path_str = path.display().to_string();
    let content = tokio::fs::read_to_string(path)
        .await
        .map_err(|e| AgentError::config_load(&path_str, e.to_string()))?;

    NodeIdentity::from_legacy_json(&content)
        .map_err(|e| AgentError::config_load(&path_str, e.to_string()))
}

// ============================================
// NodeConfig
// ============================================

/// Identity section.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NodeConfig {
    /// Remote node identifier.
    #[serde(default)]
    pub node_id: Option<String>,

    /// Hardware identifier.
    #[serde(default)]
    pub hardware_id: Option<String>,

    /// Bearer token.
    #[serde(default)]
    pub auth_token: Option<String>,

    /// Version tag sent with every request.
    #[serde(default)]
    pub client_version: Option<String>,

    /// Legacy JSON identity file, used instead of the inline fields.
    #[serde(default)]
    pub identity_file: Option<PathBuf>,
}

impl NodeConfig {
    fn is_empty(&self) -> bool {
        self.node_id.is_none()
            && self.hardware_id.is_none()
            && self.auth_token.is_none()
            && self.client_version.is_none()
    }

    fn inline_identity(&self) -> Result<NodeIdentity> {
        let field = |value: &Option<String>, name: &str| {
            value
                .clone()
                .ok_or_else(|| AgentError::config_missing(format!("node.{name}")))
        };

        let identity = NodeIdentity::new(
            field(&self.node_id, "node_id")?,
            field(&self.hardware_id, "hardware_id")?,
            field(&self.auth_token, "auth_token")?,
            field(&self.client_version, "client_version")?,
        )
        .map_err(|e| AgentError::config_invalid("node", e.to_string()))?;

        Ok(identity)
    }
}

// ============================================
// ApiConfig
// ============================================

/// Remote API section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// API root, without the `/nodes` segment.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Per-request timeout in seconds.
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,

    /// Send a browser user agent and no-cache headers.
    #[serde(default = "default_browser_headers")]
    pub browser_headers: bool,
}

fn default_base_url() -> String {
    DEFAULT_API_BASE.to_string()
}

fn default_request_timeout() -> u64 {
    DEFAULT_REQUEST_TIMEOUT.as_secs()
}

fn default_browser_headers() -> bool {
    true
}

impl ApiConfig {
    fn validate(&self) -> Result<()> {
        if !(self.base_url.starts_with("http://") || self.base_url.starts_with("https://")) {
            return Err(AgentError::config_invalid(
                "api.base_url",
                "must be an http(s) URL",
            ));
        }
        if self.request_timeout_secs == 0 {
            return Err(AgentError::config_invalid(
                "api.request_timeout_secs",
                "must be greater than 0",
            ));
        }
        Ok(())
    }

    /// Converts to client options.
    #[must_use]
    pub fn client_options(&self) -> ClientOptions {
        ClientOptions {
            base_url: self.base_url.clone(),
            request_timeout: Duration::from_secs(self.request_timeout_secs),
            browser_headers: self.browser_headers,
        }
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            request_timeout_secs: default_request_timeout(),
            browser_headers: default_browser_headers(),
        }
    }
}

// ============================================
// ScheduleConfig
// ============================================

/// Timing of the lifecycle.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleConfig {
    /// Ping period in seconds.
    #[serde(default = "default_ping_interval")]
    pub ping_interval_secs: u64,

    /// Status-check period in seconds.
    #[serde(default = "default_status_interval")]
    pub status_interval_secs: u64,

    /// Session-refresh period in seconds.
    #[serde(default = "default_session_refresh_interval")]
    pub session_refresh_interval_secs: u64,

    /// Pause before re-running a failed bootstrap, in seconds.
    #[serde(default = "default_restart_delay")]
    pub restart_delay_secs: u64,

    /// How long shutdown waits for in-flight exchanges, in seconds.
    #[serde(default = "default_shutdown_grace")]
    pub shutdown_grace_secs: u64,
}

fn default_ping_interval() -> u64 {
    60
}

fn default_status_interval() -> u64 {
    120
}

fn default_session_refresh_interval() -> u64 {
    300
}

fn default_restart_delay() -> u64 {
    5
}

fn default_shutdown_grace() -> u64 {
    30
}

impl ScheduleConfig {
    fn validate(&self) -> Result<()> {
        let periods = [
            ("schedule.ping_interval_secs", self.ping_interval_secs),
            ("schedule.status_interval_secs", self.status_interval_secs),
            ("schedule.session_refresh_interval_secs", self.session_refresh_interval_secs),
            ("schedule.restart_delay_secs", self.restart_delay_secs),
        ];
        for (field, value) in periods {
            if value == 0 {
                return Err(AgentError::config_invalid(field, "must be greater than 0"));
            }
        }
        Ok(())
    }

    /// Ping period.
    #[must_use]
    pub fn ping_interval(&self) -> Duration {
        Duration::from_secs(self.ping_interval_secs)
    }

    /// Status-check period.
    #[must_use]
    pub fn status_interval(&self) -> Duration {
        Duration::from_secs(self.status_interval_secs)
    }

    /// Session-refresh period.
    #[must_use]
    pub fn session_refresh_interval(&self) -> Duration {
        Duration::from_secs(self.session_refresh_interval_secs)
    }

    /// Delay between bootstrap attempts.
    #[must_use]
    pub fn restart_delay(&self) -> Duration {
        Duration::from_secs(self.restart_delay_secs)
    }

    /// Shutdown grace period.
    #[must_use]
    pub fn shutdown_grace(&self) -> Duration {
        Duration::from_secs(self.shutdown_grace_secs)
    }
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            ping_interval_secs: default_ping_interval(),
            status_interval_secs: default_status_interval(),
            session_refresh_interval_secs: default_session_refresh_interval(),
            restart_delay_secs: default_restart_delay(),
            shutdown_grace_secs: default_shutdown_grace(),
        }
    }
}

// ============================================
// LoggingConfig
// ============================================

/// Logging configuration section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log raw response bodies of failed exchanges.
    #[serde(default)]
    pub dump_error_bodies: bool,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            dump_error_bodies: false,
        }
    }
}

// ============================================
// Tests
// ============================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AgentConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.schedule.ping_interval(), Duration::from_secs(60));
        assert_eq!(config.schedule.status_interval(), Duration::from_secs(120));
        assert_eq!(config.schedule.session_refresh_interval(), Duration::from_secs(300));
        assert_eq!(config.schedule.restart_delay(), Duration::from_secs(5));
        assert_eq!(config.api.base_url, "https://gateway-run.bls.dev/api/v1");
        assert!(config.api.browser_headers);
    }

    #[test]
    fn test_full_config_format() {
        let toml = r#"
            [node]
            node_id = "12D3KooWnode"
            hardware_id = "hw"
            auth_token = "token"
            client_version = "0.1.7"

            [api]
            base_url = "https://example.test/api/v1"
            request_timeout_secs = 15
            browser_headers = false

            [schedule]
            ping_interval_secs = 30

            [logging]
            level = "debug"
            dump_error_bodies = true
        "#;

        let config = AgentConfig::from_toml_str(toml).unwrap();
        assert_eq!(config.api.request_timeout_secs, 15);
        assert!(!config.api.browser_headers);
        assert_eq!(config.schedule.ping_interval_secs, 30);
        assert_eq!(config.schedule.status_interval_secs, 120);
        assert!(config.logging.dump_error_bodies);

        let options = config.api.client_options();
        assert_eq!(options.request_timeout, Duration::from_secs(15));
        assert!(!options.browser_headers);
    }

    #[test]
    fn test_zero_interval_rejected() {
        let toml = r#"
            [schedule]
            status_interval_secs = 0
        "#;

        let err = AgentConfig::from_toml_str(toml).unwrap_err();
        assert!(err.is_config_error());
        assert!(err.to_string().contains("status_interval_secs"));
    }

    #[test]
    fn test_bad_base_url_rejected() {
        let toml = r#"
            [api]
            base_url = "gateway-run.bls.dev"
        "#;
        assert!(AgentConfig::from_toml_str(toml).is_err());
    }

    #[tokio::test]
    async fn test_inline_identity() {
        let toml = r#"
            [node]
            node_id = "12D3KooWnode"
            hardware_id = "hw"
            auth_token = "token"
            client_version = "0.1.7"
        "#;

        let config = AgentConfig::from_toml_str(toml).unwrap();
        let identity = config.resolve_identity(None).await.unwrap();
        assert_eq!(identity.node_id.as_str(), "12D3KooWnode");
        assert_eq!(identity.client_version, "0.1.7");
    }

    #[tokio::test]
    async fn test_missing_identity_field() {
        let toml = r#"
            [node]
            node_id = "12D3KooWnode"
            hardware_id = "hw"
        "#;

        let config = AgentConfig::from_toml_str(toml).unwrap();
        let err = config.resolve_identity(None).await.unwrap_err();
        assert!(matches!(err, AgentError::ConfigMissing { ref field } if field == "node.auth_token"));
        assert!(err.is_fatal());
    }

    #[tokio::test]
    async fn test_identity_file_override() {
        let path = std::env::temp_dir().join(format!(
            "nodepulse-identity-{}.json",
            std::process::id()
        ));
        tokio::fs::write(
            &path,
            r#"{"nodeId":"from-file","hardwareId":"hw","authToken":"t","version":"0.1.7"}"#,
        )
        .await
        .unwrap();

        let config = AgentConfig::default();
        let identity = config.resolve_identity(Some(&path)).await.unwrap();
        assert_eq!(identity.node_id.as_str(), "from-file");

        tokio::fs::remove_file(&path).await.unwrap();
    }

    #[tokio::test]
    async fn test_legacy_identity_fallback() {
        let dir = std::env::temp_dir();
        let present = dir.join(format!("nodepulse-legacy-{}.json", std::process::id()));
        tokio::fs::write(
            &present,
            r#"{"nodeId":"legacy-node","hardwareId":"hw","authToken":"t","version":"0.1.7"}"#,
        )
        .await
        .unwrap();

        let config = AgentConfig::default();
        let identity = config.resolve_identity_with(None, &present).await.unwrap();
        assert_eq!(identity.node_id.as_str(), "legacy-node");

        // Inline fields win over the working-directory file
        let inline = AgentConfig::from_toml_str(
            r#"
            [node]
            node_id = "inline-node"
            hardware_id = "hw"
            auth_token = "token"
            client_version = "0.1.7"
        "#,
        )
        .unwrap();
        let identity = inline.resolve_identity_with(None, &present).await.unwrap();
        assert_eq!(identity.node_id.as_str(), "inline-node");

        tokio::fs::remove_file(&present).await.unwrap();

        let err = config.resolve_identity_with(None, &present).await.unwrap_err();
        assert!(matches!(err, AgentError::ConfigMissing { .. }));
    }

    #[tokio::test]
    async fn test_missing_identity_file() {
        let config = AgentConfig::default();
        let err = config
            .resolve_identity(Some(Path::new("/nonexistent/nodepulse/config.json")))
            .await
            .unwrap_err();
        assert!(matches!(err, AgentError::ConfigLoad { .. }));
    }
}
