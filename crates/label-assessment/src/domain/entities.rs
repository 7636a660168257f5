//! # Domain Entities
//!
//! Requests into the two pipelines and the outcome of a subscription run.

use super::abort::AbortCause;
use super::assessment::Assessment;
use super::config::AssessmentConfig;
use super::errors::TransportError;
use reqwest::Url;
use std::collections::BTreeSet;

/// Label values a labeler has declared it will use.
pub type PolicySet = BTreeSet<String>;

/// Input to the query pipeline.
#[derive(Debug, Clone)]
pub struct QueryRequest {
    /// Labeler service endpoint (http/https).
    pub endpoint: Url,
    /// Position to start the page from.
    pub cursor: u64,
    /// Page size.
    pub limit: u32,
    /// Glob-style subject patterns, e.g. `*`.
    pub uri_patterns: Vec<String>,
    /// Registered label values; `None` skips the membership check.
    pub policies: Option<PolicySet>,
    /// `did:key` used to verify signatures.
    pub key: Option<String>,
    pub user_agent: String,
}

impl QueryRequest {
    /// A request with cursor, page size and patterns taken from `config`.
    pub fn new(endpoint: Url, user_agent: impl Into<String>, config: &AssessmentConfig) -> Self {
        Self {
            endpoint,
            cursor: config.cursor,
            limit: config.query_limit,
            uri_patterns: config.uri_patterns.clone(),
            policies: None,
            key: None,
            user_agent: user_agent.into(),
        }
    }
}

/// Input to the subscription pipeline.
#[derive(Debug, Clone)]
pub struct SubscribeRequest {
    /// Labeler stream endpoint (ws/wss).
    pub endpoint: Url,
    /// Sequence number to replay from.
    pub cursor: u64,
    /// Stop once this many labels have been counted.
    pub limit: u64,
    pub policies: Option<PolicySet>,
    pub key: Option<String>,
    pub user_agent: String,
}

impl SubscribeRequest {
    /// A request with cursor and ceiling taken from `config`.
    pub fn new(endpoint: Url, user_agent: impl Into<String>, config: &AssessmentConfig) -> Self {
        Self {
            endpoint,
            cursor: config.cursor,
            limit: config.subscribe_limit,
            policies: None,
            key: None,
            user_agent: user_agent.into(),
        }
    }
}

/// How a subscription stream ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamTermination {
    /// Cancelled through the abort signal.
    Aborted(AbortCause),
    /// The server closed the stream.
    Closed,
    /// The transport failed.
    Failed(TransportError),
}

impl StreamTermination {
    /// The fatal cause, if this termination is not a normal closure.
    pub fn fatal_error(&self) -> Option<TransportError> {
        match self {
            StreamTermination::Aborted(cause) if cause.is_normal_closure() => None,
            StreamTermination::Aborted(cause) => Some(TransportError::Aborted(cause.to_string())),
            StreamTermination::Closed => None,
            StreamTermination::Failed(err) => Some(err.clone()),
        }
    }
}

/// Result of a subscription run that produced an assessment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubscriptionOutcome {
    pub assessment: Assessment,
    pub termination: StreamTermination,
}
