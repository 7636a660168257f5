//! XRPC query client over HTTP.

use super::{xrpc_url, QUERY_LABELS_NSID};
use crate::domain::entities::QueryRequest;
use crate::domain::errors::TransportError;
use crate::ports::outbound::{LabelQueryClient, QueryLabelsPage};
use reqwest::header::USER_AGENT;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

/// Output schema of `queryLabels`.
#[derive(Debug, Deserialize)]
struct QueryLabelsOutput {
    #[serde(default)]
    cursor: Option<String>,
    labels: Vec<serde_json::Value>,
}

/// XRPC error body.
#[derive(Debug, Deserialize)]
struct XrpcErrorBody {
    error: String,
    #[serde(default)]
    message: Option<String>,
}

/// `queryLabels` over HTTP(S).
#[derive(Debug, Clone)]
pub struct XrpcQueryClient {
    client: Client,
}

impl XrpcQueryClient {
    /// Create a client whose requests time out after `request_timeout`.
    pub fn new(request_timeout: Duration) -> Result<Self, TransportError> {
        let client = Client::builder()
            .timeout(request_timeout)
            .build()
            .map_err(|e| TransportError::Request(e.to_string()))?;
        Ok(Self { client })
    }

    /// Wrap an existing client.
    pub fn with_client(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait::async_trait]
impl LabelQueryClient for XrpcQueryClient {
    async fn query_labels(&self, request: &QueryRequest) -> Result<QueryLabelsPage, TransportError> {
        let url = xrpc_url(&request.endpoint, QUERY_LABELS_NSID)?;

        let mut params: Vec<(&str, String)> = request
            .uri_patterns
            .iter()
            .map(|pattern| ("uriPatterns", pattern.clone()))
            .collect();
        params.push(("cursor", request.cursor.to_string()));
        params.push(("limit", request.limit.to_string()));

        debug!(%url, "Requesting label page");
        let response = self
            .client
            .get(url)
            .query(&params)
            .header(USER_AGENT, request.user_agent.as_str())
            .send()
            .await
            .map_err(|e| TransportError::Request(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = match response.text().await {
                Ok(body) => body,
                Err(e) => {
                    debug!(error = %e, %status, "Failed to read error body");
                    String::new()
                }
            };
            let detail = match serde_json::from_str::<XrpcErrorBody>(&body) {
                Ok(XrpcErrorBody {
                    error,
                    message: Some(message),
                }) => format!("{}: {}", error, message),
                Ok(XrpcErrorBody { error, message: None }) => error,
                Err(_) => status
                    .canonical_reason()
                    .unwrap_or("request failed")
                    .to_string(),
            };
            return Err(TransportError::Request(format!(
                "{} ({})",
                detail,
                status.as_u16()
            )));
        }

        let output: QueryLabelsOutput = response
            .json()
            .await
            .map_err(|e| TransportError::InvalidResponse(e.to_string()))?;

        Ok(QueryLabelsPage {
            cursor: output.cursor,
            labels: output.labels,
        })
    }
}
