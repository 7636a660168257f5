//! XRPC event-stream client over WebSocket.

use super::{xrpc_url, SUBSCRIBE_LABELS_NSID};
use crate::domain::entities::SubscribeRequest;
use crate::domain::errors::TransportError;
use crate::ports::outbound::{FrameStream, LabelStreamClient};
use futures_util::StreamExt;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::client::IntoClientRequest;
use tokio_tungstenite::tungstenite::http::header::{HeaderValue, USER_AGENT};
use tokio_tungstenite::tungstenite::Message;
use tracing::{debug, info};

/// `subscribeLabels` over WebSocket (ws/wss).
#[derive(Debug, Clone, Default)]
pub struct XrpcStreamClient;

impl XrpcStreamClient {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait::async_trait]
impl LabelStreamClient for XrpcStreamClient {
    async fn subscribe_labels(
        &self,
        request: &SubscribeRequest,
    ) -> Result<FrameStream, TransportError> {
        let mut url = xrpc_url(&request.endpoint, SUBSCRIBE_LABELS_NSID)?;
        url.query_pairs_mut()
            .append_pair("cursor", &request.cursor.to_string());

        let mut ws_request = url
            .as_str()
            .into_client_request()
            .map_err(|e| TransportError::InvalidEndpoint(e.to_string()))?;
        let agent = HeaderValue::from_str(&request.user_agent)
            .map_err(|e| TransportError::InvalidEndpoint(format!("user agent: {}", e)))?;
        ws_request.headers_mut().insert(USER_AGENT, agent);

        let (socket, _response) = connect_async(ws_request)
            .await
            .map_err(|e| TransportError::Connect(e.to_string()))?;
        info!(%url, "Label stream connected");

        // Control frames are answered by tungstenite; only payloads reach the
        // pipeline. Text payloads are passed through and fail frame decoding.
        let frames = socket.filter_map(|message| async move {
            match message {
                Ok(Message::Binary(bytes)) => Some(Ok(bytes.to_vec())),
                Ok(Message::Text(text)) => Some(Ok(text.as_str().as_bytes().to_vec())),
                Ok(Message::Close(frame)) => {
                    debug!(?frame, "Label stream closed by server");
                    None
                }
                Ok(_) => None,
                Err(e) => Some(Err(TransportError::Stream(e.to_string()))),
            }
        });

        Ok(Box::pin(frames))
    }
}
