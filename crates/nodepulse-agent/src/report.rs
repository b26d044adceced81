// ============================================
// File: crates/nodepulse-agent/src/report.rs
// ============================================
//! # Reporter
//!
//! ## Creation Reason
//! Turns status snapshots, statistics and failures into the log lines an
//! operator watches.
//!
//! ## Main Functionality
//! - `Reporter::status`: framed node status block
//! - `Reporter::stats`: framed uptime / counters block
//! - `Reporter::client_failure` / `agent_failure`: one line per failure,
//!   plus Ray ID and remediation hint for rate blocks
//!
//! ## ⚠️ Important Note for Next Developer
//! - Output only, never mutates state
//! - Raw response bodies go to `debug!` and only with `dump_error_bodies`
//!
//! ## Last Modified
//! v0.1.0 - Initial reporter implementation

use tracing::{debug, error, info};

use nodepulse_client::{classify, ClientError, FailureClassification, StatusSnapshot};
use nodepulse_common::time::{format_duration, format_secs};

use crate::error::AgentError;
use crate::lifecycle::StatsSnapshot;

const RULE: &str = "==================================================";

/// Formats a reward figure with two decimals.
#[must_use]
pub fn format_reward(value: f64) -> String {
    format!("{value:.2}")
}

/// Log presenter for the lifecycle.
#[derive(Debug, Clone, Default)]
pub struct Reporter {
    dump_error_bodies: bool,
}

impl Reporter {
    /// Creates a reporter.
    #[must_use]
    pub const fn new(dump_error_bodies: bool) -> Self {
        Self { dump_error_bodies }
    }

    /// Reports a failed remote exchange.
    pub fn client_failure(&self, context: &str, err: &ClientError) {
        self.classification(context, &classify(err));
        if self.dump_error_bodies {
            if let Some(body) = err.body() {
                debug!(status = ?err.status(), "{} response body: {}", context, body);
            }
        }
    }

    /// Reports a failure surfaced by the agent.
    pub fn agent_failure(&self, context: &str, err: &AgentError) {
        match err.client_error() {
            Some(client_err) => self.client_failure(context, client_err),
            None => self.classification(context, &err.classify()),
        }
    }

    fn classification(&self, context: &str, classification: &FailureClassification) {
        match classification {
            FailureClassification::RateBlocked { diagnostic_id } => {
                error!("{} failed: IP address blocked by Cloudflare", context);
                error!("Ray ID: {}", diagnostic_id);
                if let Some(hint) = classification.remediation_hint() {
                    error!("Solution: {}", hint);
                }
            }
            FailureClassification::Generic { message } => {
                error!("{} failed: {}", context, message);
            }
        }
    }

    /// Reports a node status snapshot. `session_age_secs` is `None` when
    /// the remote holds no session yet.
    pub fn status(&self, status: &StatusSnapshot, session_age_secs: Option<u64>) {
        let connection = if status.is_connected {
            "Connected"
        } else {
            "Disconnected"
        };
        let version = status.client_version_reported.as_deref().unwrap_or("unknown");
        let age = session_age_secs.map_or_else(|| "n/a".to_string(), format_secs);

        info!("{}", RULE);
        info!("Node Status");
        info!("{}", RULE);
        info!("Connection:      {}", connection);
        info!("Today's Reward:  {}", format_reward(status.today_reward));
        info!("Total Reward:    {}", format_reward(status.total_reward));
        info!("Node Version:    {}", version);
        info!("Session Age:     {}", age);
        info!("{}", RULE);
    }

    /// Reports the process statistics.
    pub fn stats(&self, stats: &StatsSnapshot) {
        let counters = &stats.counters;
        let session = stats
            .session
            .as_ref()
            .map_or_else(|| "none".to_string(), |s| s.session_id.to_string());

        info!("{}", RULE);
        info!("Statistics");
        info!("{}", RULE);
        info!("Uptime:            {}", format_duration(stats.uptime));
        info!("Phase:             {:?}", stats.phase);
        info!("Session:           {}", session);
        info!("Total Pings:       {}", counters.total_pings);
        info!("Successful Pings:  {}", counters.successful_pings);
        info!("Failed Pings:      {}", counters.failed_pings);
        info!("Session Refreshes: {}", counters.session_refreshes);
        info!("Today's Reward:    {}", format_reward(counters.today_reward));
        info!("Total Reward:      {}", format_reward(counters.total_reward));
        info!("{}", RULE);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nodepulse_client::ApiOperation;

    #[test]
    fn test_format_reward() {
        assert_eq!(format_reward(0.0), "0.00");
        assert_eq!(format_reward(12.345), "12.35");
        assert_eq!(format_reward(7.0), "7.00");
    }

    #[test]
    fn test_failure_reports_do_not_panic() {
        let reporter = Reporter::new(true);
        let blocked = ClientError::remote(
            ApiOperation::Ping,
            403,
            "<html>Cloudflare Ray ID: abc<br></html>",
        );
        reporter.client_failure("Ping", &blocked);
        reporter.agent_failure("Status check", &AgentError::EmptySessionList);
        reporter.agent_failure("Bootstrap", &AgentError::Client(blocked));
    }
}
