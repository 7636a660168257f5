//! # Outbound Ports (Driven Ports / SPI)
//!
//! Transports the pipelines depend on. Adapters for XRPC over HTTP and
//! WebSocket live in [`crate::adapters`]; tests substitute in-memory fakes.

use crate::domain::entities::{QueryRequest, SubscribeRequest};
use crate::domain::errors::TransportError;
use futures_util::Stream;
use std::pin::Pin;

/// One page of a `queryLabels` response.
///
/// Labels are left undecoded: structural validation is the pipeline's job.
#[derive(Debug, Clone, Default)]
pub struct QueryLabelsPage {
    /// Continuation cursor for the next page.
    pub cursor: Option<String>,
    pub labels: Vec<serde_json::Value>,
}

/// Raw event-stream frames in arrival order.
pub type FrameStream = Pin<Box<dyn Stream<Item = Result<Vec<u8>, TransportError>> + Send>>;

/// Request/response access to `com.atproto.label.queryLabels`.
#[async_trait::async_trait]
pub trait LabelQueryClient: Send + Sync {
    /// Fetch a single page.
    ///
    /// # Errors
    /// Any transport-level rejection, including error statuses and
    /// bodies that are not a label page.
    async fn query_labels(&self, request: &QueryRequest) -> Result<QueryLabelsPage, TransportError>;
}

/// Streaming access to `com.atproto.label.subscribeLabels`.
#[async_trait::async_trait]
pub trait LabelStreamClient: Send + Sync {
    /// Open the stream. The returned stream ends when the server closes it.
    ///
    /// # Errors
    /// * `TransportError::Connect` - the session could not be established
    async fn subscribe_labels(&self, request: &SubscribeRequest)
        -> Result<FrameStream, TransportError>;
}
