//! Diagnostics configuration.
//!
//! Defaults are overlaid with environment variables, then with command-line
//! flags in `main`.

use crate::cli::normalize_url;
use label_assessment::AssessmentConfig;
use std::time::Duration;
use tracing::warn;

/// User agent sent to labelers and PDSes.
pub const DEFAULT_USER_AGENT: &str = "github:FlippingBinary/atproto-labeler-diagnostics";
/// PDS queried for the labeler service record.
pub const DEFAULT_PDS: &str = "https://bsky.social";
/// Overall deadline for each transport.
pub const DEFAULT_RESULT_TIMEOUT: Duration = Duration::from_secs(15);

#[derive(Debug, Clone)]
pub struct DiagnosticsConfig {
    pub user_agent: String,
    /// Always an http(s) URL.
    pub pds: String,
    pub result_timeout: Duration,
    pub engine: AssessmentConfig,
}

impl Default for DiagnosticsConfig {
    fn default() -> Self {
        Self {
            user_agent: DEFAULT_USER_AGENT.to_string(),
            pds: DEFAULT_PDS.to_string(),
            result_timeout: DEFAULT_RESULT_TIMEOUT,
            engine: AssessmentConfig::default(),
        }
    }
}

impl DiagnosticsConfig {
    /// Load configuration from the process environment.
    pub fn from_env() -> Self {
        Self::from_vars(|key| std::env::var(key).ok())
    }

    /// Load configuration from an arbitrary variable source.
    pub fn from_vars(var: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(agent) = var("USER_AGENT").filter(|a| !a.is_empty()) {
            config.user_agent = agent;
        }

        if let Some(pds) = var("ATPROTO_PDS") {
            match normalize_url(&pds) {
                Ok(url) => config.pds = url.to_string(),
                Err(e) => warn!(value = %pds, "Ignoring ATPROTO_PDS: {}", e),
            }
        }

        if let Some(secs) = var("LABELER_RESULT_TIMEOUT_SECS") {
            match secs.parse::<u64>() {
                Ok(s) if s > 0 => config.result_timeout = Duration::from_secs(s),
                _ => warn!(value = %secs, "LABELER_RESULT_TIMEOUT_SECS must be a positive integer"),
            }
        }

        config
    }
}
