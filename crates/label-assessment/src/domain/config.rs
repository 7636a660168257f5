//! Engine configuration.

use std::time::Duration;

/// Tunables shared by both pipelines.
#[derive(Debug, Clone)]
pub struct AssessmentConfig {
    /// Quiet period after which a subscription is considered drained.
    pub inactivity_window: Duration,
    /// Default result-count ceiling for subscriptions.
    pub subscribe_limit: u64,
    /// Default page size for queries.
    pub query_limit: u32,
    /// Default starting cursor for both pipelines.
    pub cursor: u64,
    /// Default subject patterns for queries.
    pub uri_patterns: Vec<String>,
    /// Per-request timeout of the HTTP client.
    pub request_timeout: Duration,
}

impl Default for AssessmentConfig {
    fn default() -> Self {
        Self {
            inactivity_window: Duration::from_secs(1),
            subscribe_limit: 250,
            query_limit: 10,
            cursor: 0,
            uri_patterns: vec!["*".to_string()],
            request_timeout: Duration::from_secs(10),
        }
    }
}
