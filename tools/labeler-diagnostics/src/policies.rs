//! Label policy lookup.
//!
//! A labeler declares the values it uses in its `app.bsky.labeler.service`
//! record. The record is read from the labeler's PDS with
//! `com.atproto.repo.listRecords`.

use label_assessment::adapters::xrpc_url;
use label_assessment::{PolicySet, TransportError};
use reqwest::header::USER_AGENT;
use reqwest::{Client, Url};
use serde::Deserialize;
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

/// Collection holding the labeler service record.
pub const LABELER_SERVICE_COLLECTION: &str = "app.bsky.labeler.service";
/// Method used to list records in a collection.
pub const LIST_RECORDS_NSID: &str = "com.atproto.repo.listRecords";

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PolicyError {
    #[error("{0}")]
    Transport(#[from] TransportError),
    #[error("Labeler service record missing")]
    Missing,
    #[error("Labeler service record failed validation")]
    Invalid,
}

#[derive(Debug, Deserialize)]
struct ListRecordsOutput {
    records: Vec<RecordEntry>,
}

#[derive(Debug, Deserialize)]
struct RecordEntry {
    value: serde_json::Value,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LabelerServiceRecord {
    policies: LabelerPolicies,
    created_at: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LabelerPolicies {
    label_values: Vec<String>,
}

/// Extract the policy set from the first labeler service record.
///
/// Records of other types are skipped. The first service record decides the
/// outcome: it either validates or fails the lookup.
pub fn policies_from_records(records: &[serde_json::Value]) -> Result<PolicySet, PolicyError> {
    let record = records
        .iter()
        .find(|value| {
            value.get("$type").and_then(|t| t.as_str()) == Some(LABELER_SERVICE_COLLECTION)
        })
        .ok_or(PolicyError::Missing)?;

    let record: LabelerServiceRecord =
        serde_json::from_value(record.clone()).map_err(|_| PolicyError::Invalid)?;
    chrono::DateTime::parse_from_rfc3339(&record.created_at).map_err(|_| PolicyError::Invalid)?;

    Ok(record.policies.label_values.into_iter().collect())
}

/// Reads labeler service records from a PDS.
#[derive(Debug, Clone)]
pub struct PolicyClient {
    client: Client,
}

impl PolicyClient {
    pub fn new(request_timeout: Duration) -> Result<Self, PolicyError> {
        let client = Client::builder()
            .timeout(request_timeout)
            .build()
            .map_err(|e| TransportError::Request(e.to_string()))?;
        Ok(Self { client })
    }

    /// Look up the policy set `did` has published on `pds`.
    pub async fn resolve_policies(
        &self,
        pds: &Url,
        did: &str,
        user_agent: &str,
    ) -> Result<PolicySet, PolicyError> {
        let url = xrpc_url(pds, LIST_RECORDS_NSID)?;
        debug!(%url, did, "Listing labeler service records");

        let response = self
            .client
            .get(url)
            .query(&[("repo", did), ("collection", LABELER_SERVICE_COLLECTION)])
            .header(USER_AGENT, user_agent)
            .send()
            .await
            .and_then(|response| response.error_for_status())
            .map_err(|e| TransportError::Request(e.to_string()))?;

        let output: ListRecordsOutput = response
            .json()
            .await
            .map_err(|e| TransportError::InvalidResponse(e.to_string()))?;

        let values: Vec<serde_json::Value> =
            output.records.into_iter().map(|entry| entry.value).collect();
        policies_from_records(&values)
    }
}
