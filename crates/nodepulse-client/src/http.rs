// ============================================
// File: crates/nodepulse-client/src/http.rs
// ============================================
//! # HTTP Node API Client
//!
//! ## Creation Reason
//! `NodeApi` implementation over `reqwest`, talking JSON to
//! `{base_url}/nodes/{node_id}`.
//!
//! ## Request Headers
//! ```text
//! Authorization:        Bearer <auth_token>
//! X-Extension-Version:  <client_version>
//!
//! With browser_headers = true, additionally:
//! User-Agent, Accept, Accept-Language,
//! Cache-Control: no-cache, Pragma: no-cache
//! ```
//!
//! ## ⚠️ Important Note for Next Developer
//! - Headers are installed once as client defaults, not per request
//! - Non-2xx bodies are read as text and kept for the failure classifier
//! - An empty 2xx body decodes as JSON `null`
//!
//! ## Last Modified
//! v0.1.0 - Initial HTTP client

use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use reqwest::header::{
    HeaderMap, HeaderName, HeaderValue, ACCEPT, ACCEPT_LANGUAGE, AUTHORIZATION, CACHE_CONTROL,
    PRAGMA, USER_AGENT,
};
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use tracing::{debug, trace};

use nodepulse_common::time::iso_timestamp;
use nodepulse_common::NodeIdentity;

use crate::error::{ClientError, Result};
use crate::models::{
    ApiOperation, PingAck, PingRequest, PingResponse, RegisterRequest, RegistrationAck,
    StartSessionRequest, StartSessionResponse, StartedSession, StatusSnapshot,
};
use crate::traits::NodeApi;

// ============================================
// Constants
// ============================================

/// Default API root of the remote node service.
pub const DEFAULT_API_BASE: &str = "https://gateway-run.bls.dev/api/v1";

/// Default per-request timeout.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Version header understood by the remote service.
pub const VERSION_HEADER: &str = "x-extension-version";

/// User agent sent when browser headers are enabled.
pub const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
    AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

// ============================================
// ClientOptions
// ============================================

/// Knobs for [`HttpNodeApi`].
#[derive(Debug, Clone)]
pub struct ClientOptions {
    /// API root, without the `/nodes` segment.
    pub base_url: String,
    /// Per-request timeout.
    pub request_timeout: Duration,
    /// Send a browser user agent and no-cache headers.
    pub browser_headers: bool,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_API_BASE.to_string(),
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            browser_headers: true,
        }
    }
}

// ============================================
// HttpNodeApi
// ============================================

/// HTTP client bound to one node identity.
pub struct HttpNodeApi {
    http: Client,
    identity: NodeIdentity,
    node_url: String,
}

impl HttpNodeApi {
    /// Creates a client for `identity`.
    ///
    /// # Errors
    /// Returns `InvalidHeader` if the token or version cannot be sent as a
    /// header value, `Build` if the TLS backend fails to initialise.
    pub fn new(identity: NodeIdentity, options: &ClientOptions) -> Result<Self> {
        let headers = default_headers(&identity, options.browser_headers)?;
        let http = Client::builder()
            .timeout(options.request_timeout)
            .default_headers(headers)
            .build()
            .map_err(|e| ClientError::Build {
                reason: e.to_string(),
            })?;

        let node_url = format!(
            "{}/nodes/{}",
            options.base_url.trim_end_matches('/'),
            identity.node_id
        );

        Ok(Self {
            http,
            identity,
            node_url,
        })
    }

    fn url(&self, operation: ApiOperation) -> String {
        format!("{}{}", self.node_url, operation.path_suffix())
    }

    /// Sends one request and decodes a 2xx body into `T`.
    async fn execute<T: DeserializeOwned>(
        &self,
        operation: ApiOperation,
        request: RequestBuilder,
    ) -> Result<T> {
        debug!(%operation, "Sending request");

        let response = request
            .send()
            .await
            .map_err(|e| ClientError::from_send(operation, &e))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| ClientError::from_send(operation, &e))?;

        if !status.is_success() {
            return Err(ClientError::remote(operation, status.as_u16(), body));
        }

        trace!(%operation, body_len = body.len(), "Response received");

        let text = if body.trim().is_empty() { "null" } else { body.as_str() };
        serde_json::from_str(text).map_err(|e| ClientError::decode(operation, e.to_string()))
    }
}

#[async_trait]
impl NodeApi for HttpNodeApi {
    async fn fetch_status(&self) -> Result<StatusSnapshot> {
        let op = ApiOperation::Status;
        self.execute(op, self.http.get(self.url(op))).await
    }

    async fn register_node(&self) -> Result<RegistrationAck> {
        let op = ApiOperation::Register;
        let body = RegisterRequest {
            hardware_id: self.identity.hardware_id.clone(),
            extension_version: self.identity.client_version.clone(),
        };
        self.execute(op, self.http.post(self.url(op)).json(&body)).await
    }

    async fn start_session(&self) -> Result<StartedSession> {
        let op = ApiOperation::StartSession;
        let sent_at = Utc::now();
        let body = StartSessionRequest {
            start_at: iso_timestamp(sent_at),
            extension_version: self.identity.client_version.clone(),
        };
        let response: StartSessionResponse =
            self.execute(op, self.http.post(self.url(op)).json(&body)).await?;

        Ok(StartedSession {
            session_id: response.id,
            started_at: response.start_at.unwrap_or(sent_at),
        })
    }

    async fn send_ping(&self) -> Result<PingAck> {
        let op = ApiOperation::Ping;
        let body = PingRequest {
            timestamp: iso_timestamp(Utc::now()),
            version: self.identity.client_version.clone(),
        };
        let response: PingResponse =
            self.execute(op, self.http.post(self.url(op)).json(&body)).await?;
        Ok(response.into())
    }
}

impl std::fmt::Debug for HttpNodeApi {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpNodeApi")
            .field("node_url", &self.node_url)
            .finish()
    }
}

/// Builds the headers attached to every request.
fn default_headers(identity: &NodeIdentity, browser_headers: bool) -> Result<HeaderMap> {
    let mut headers = HeaderMap::new();

    let mut auth = HeaderValue::from_str(&identity.auth_token.bearer())
        .map_err(|_| ClientError::InvalidHeader { name: "authorization" })?;
    auth.set_sensitive(true);
    headers.insert(AUTHORIZATION, auth);

    let version = HeaderValue::from_str(&identity.client_version)
        .map_err(|_| ClientError::InvalidHeader { name: VERSION_HEADER })?;
    headers.insert(HeaderName::from_static(VERSION_HEADER), version);

    if browser_headers {
        headers.insert(USER_AGENT, HeaderValue::from_static(BROWSER_USER_AGENT));
        headers.insert(ACCEPT, HeaderValue::from_static("application/json, text/plain, */*"));
        headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("en-US,en;q=0.9"));
        headers.insert(CACHE_CONTROL, HeaderValue::from_static("no-cache"));
        headers.insert(PRAGMA, HeaderValue::from_static("no-cache"));
    }

    Ok(headers)
}

// ============================================
// Tests
// ============================================
