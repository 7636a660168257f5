//! # Adapters Module
//!
//! XRPC transports implementing the outbound ports.

pub mod http;
pub mod stream;

pub use http::XrpcQueryClient;
pub use stream::XrpcStreamClient;

use crate::domain::errors::TransportError;
use reqwest::Url;

/// Method identifier of the label query endpoint.
pub const QUERY_LABELS_NSID: &str = "com.atproto.label.queryLabels";
/// Method identifier of the label subscription endpoint.
pub const SUBSCRIBE_LABELS_NSID: &str = "com.atproto.label.subscribeLabels";

/// `{endpoint origin}/xrpc/{nsid}`. Any path on the endpoint is replaced.
pub fn xrpc_url(endpoint: &Url, nsid: &str) -> Result<Url, TransportError> {
    endpoint
        .join(&format!("/xrpc/{}", nsid))
        .map_err(|e| TransportError::InvalidEndpoint(format!("{}: {}", endpoint, e)))
}
