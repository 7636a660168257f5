//! # Test Fixtures
//!
//! Signed labels, event-stream frames and a loopback labeler that serves
//! `queryLabels`, `subscribeLabels` and `listRecords` on one port.

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::{RawQuery, State};
use axum::http::header::USER_AGENT;
use axum::http::{HeaderMap, StatusCode};
use axum::response::Response;
use axum::routing::get;
use axum::{Json, Router};
use base64::Engine;
use indexmap::IndexMap;
use k256::ecdsa::signature::Signer;
use label_assessment::domain::envelope::{
    encode_frame, ErrorFrame, FrameHeader, InfoMessage, LabelsMessage, OP_ERROR, OP_MESSAGE,
    TYPE_INFO, TYPE_LABELS,
};
use label_assessment::{reduce, Label};
use reqwest::Url;
use serde_json::{json, Value};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::net::TcpListener;

// =============================================================================
// KEYS AND LABELS
// =============================================================================

pub const LABELER_DID: &str = "did:plc:ar7c4by46qjdydhdevvrndac";

const SECP256K1_CODEC: [u8; 2] = [0xe7, 0x01];
const P256_CODEC: [u8; 2] = [0x80, 0x24];

/// Fixed secp256k1 labeler key.
pub fn labeler_key() -> k256::ecdsa::SigningKey {
    k256::ecdsa::SigningKey::from_slice(&[7u8; 32]).expect("valid scalar")
}

pub fn did_key_k256(key: &k256::ecdsa::SigningKey) -> String {
    let mut bytes = SECP256K1_CODEC.to_vec();
    bytes.extend_from_slice(key.verifying_key().to_encoded_point(true).as_bytes());
    format!("did:key:z{}", bs58::encode(bytes).into_string())
}

pub fn random_p256_key() -> p256::ecdsa::SigningKey {
    p256::ecdsa::SigningKey::random(&mut rand::thread_rng())
}

pub fn did_key_p256(key: &p256::ecdsa::SigningKey) -> String {
    let mut bytes = P256_CODEC.to_vec();
    bytes.extend_from_slice(key.verifying_key().to_encoded_point(true).as_bytes());
    format!("did:key:z{}", bs58::encode(bytes).into_string())
}

/// An unsigned label numbered `n`.
pub fn label(val: &str, n: usize) -> Label {
    Label {
        ver: Some(1),
        src: LABELER_DID.into(),
        uri: format!("at://did:plc:alice/app.bsky.feed.post/3l{}", n),
        cid: None,
        val: val.into(),
        neg: None,
        cts: "2024-11-05T09:30:00.000Z".into(),
        exp: None,
        sig: None,
        overflow: IndexMap::new(),
    }
}

pub fn sign_k256(mut label: Label, key: &k256::ecdsa::SigningKey) -> Label {
    let message = reduce(&label).canonical_bytes().expect("encodable");
    let sig: k256::ecdsa::Signature = key.sign(&message);
    label.sig = Some(sig.to_bytes().to_vec());
    label
}

pub fn sign_p256(mut label: Label, key: &p256::ecdsa::SigningKey) -> Label {
    let message = reduce(&label).canonical_bytes().expect("encodable");
    let sig: p256::ecdsa::Signature = key.sign(&message);
    let sig = sig.normalize_s().unwrap_or(sig);
    label.sig = Some(sig.to_bytes().to_vec());
    label
}

/// A label signed with [`labeler_key`].
pub fn signed(val: &str, n: usize) -> Label {
    sign_k256(label(val, n), &labeler_key())
}

/// The `queryLabels` JSON form of a label. Overflow fields are not carried.
pub fn to_json(label: &Label) -> Value {
    let mut value = json!({
        "src": label.src,
        "uri": label.uri,
        "val": label.val,
        "cts": label.cts,
    });
    if let Some(ver) = label.ver {
        value["ver"] = json!(ver);
    }
    if let Some(cid) = &label.cid {
        value["cid"] = json!(cid);
    }
    if let Some(neg) = label.neg {
        value["neg"] = json!(neg);
    }
    if let Some(exp) = &label.exp {
        value["exp"] = json!(exp);
    }
    if let Some(sig) = &label.sig {
        value["sig"] = json!({
            "$bytes": base64::engine::general_purpose::STANDARD_NO_PAD.encode(sig)
        });
    }
    value
}

pub fn query_body(labels: &[Label]) -> Value {
    json!({
        "cursor": labels.len().to_string(),
        "labels": labels.iter().map(to_json).collect::<Vec<_>>(),
    })
}

// =============================================================================
// FRAMES
// =============================================================================

pub fn labels_frame(seq: i64, labels: Vec<Label>) -> Vec<u8> {
    let header = FrameHeader {
        op: OP_MESSAGE,
        t: Some(TYPE_LABELS.into()),
    };
    encode_frame(&header, &LabelsMessage { seq, labels }).expect("encodable")
}

pub fn info_frame(name: &str, message: &str) -> Vec<u8> {
    let header = FrameHeader {
        op: OP_MESSAGE,
        t: Some(TYPE_INFO.into()),
    };
    let body = InfoMessage {
        name: name.into(),
        message: Some(message.into()),
    };
    encode_frame(&header, &body).expect("encodable")
}

pub fn error_frame(error: &str, message: &str) -> Vec<u8> {
    let header = FrameHeader {
        op: OP_ERROR,
        t: None,
    };
    let body = ErrorFrame {
        error: error.into(),
        message: Some(message.into()),
    };
    encode_frame(&header, &body).expect("encodable")
}

/// A well-formed message frame of a type the subscription does not define.
pub fn unknown_frame(t: &str) -> Vec<u8> {
    let header = FrameHeader {
        op: OP_MESSAGE,
        t: Some(t.into()),
    };
    encode_frame(&header, &json!({ "seq": 1, "did": LABELER_DID })).expect("encodable")
}

/// One frame per label, numbered from 1.
pub fn single_label_frames(labels: Vec<Label>) -> Vec<StreamEvent> {
    labels
        .into_iter()
        .enumerate()
        .map(|(i, label)| StreamEvent::Frame(labels_frame(i as i64 + 1, vec![label])))
        .collect()
}

// =============================================================================
// LOOPBACK LABELER
// =============================================================================

/// One step of the scripted subscription.
#[derive(Debug, Clone)]
pub enum StreamEvent {
    Frame(Vec<u8>),
    Text(String),
    Pause(Duration),
    Close,
}

/// How the loopback labeler answers.
#[derive(Debug, Clone)]
pub struct LabelerBehavior {
    pub query_status: StatusCode,
    pub query_body: Value,
    pub records_body: Value,
    /// Played to each subscriber. Without a trailing `Close` the socket is
    /// held open until the client leaves.
    pub stream: Vec<StreamEvent>,
}

impl Default for LabelerBehavior {
    fn default() -> Self {
        Self {
            query_status: StatusCode::OK,
            query_body: query_body(&[]),
            records_body: json!({ "records": [] }),
            stream: Vec::new(),
        }
    }
}

/// A request seen by the loopback labeler.
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: &'static str,
    pub query: String,
    pub user_agent: Option<String>,
}

struct LabelerState {
    behavior: LabelerBehavior,
    requests: Mutex<Vec<RecordedRequest>>,
}

impl LabelerState {
    fn record(&self, method: &'static str, query: Option<String>, headers: &HeaderMap) {
        let user_agent = headers
            .get(USER_AGENT)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string);
        self.requests.lock().expect("lock").push(RecordedRequest {
            method,
            query: query.unwrap_or_default(),
            user_agent,
        });
    }
}

/// A running loopback labeler.
pub struct LabelerServer {
    /// `http://127.0.0.1:<port>/`
    pub endpoint: Url,
    state: Arc<LabelerState>,
}

impl LabelerServer {
    pub async fn spawn(behavior: LabelerBehavior) -> Self {
        let state = Arc::new(LabelerState {
            behavior,
            requests: Mutex::new(Vec::new()),
        });
        let app = Router::new()
            .route("/xrpc/com.atproto.label.queryLabels", get(query_labels))
            .route("/xrpc/com.atproto.label.subscribeLabels", get(subscribe_labels))
            .route("/xrpc/com.atproto.repo.listRecords", get(list_records))
            .with_state(state.clone());

        let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
        let addr = listener.local_addr().expect("local addr");
        tokio::spawn(async move {
            axum::serve(listener, app).await.expect("serve");
        });

        Self {
            endpoint: Url::parse(&format!("http://{}/", addr)).expect("url"),
            state,
        }
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.state.requests.lock().expect("lock").clone()
    }
}

/// An http endpoint nothing listens on.
pub fn closed_endpoint() -> Url {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("bind");
    let addr = listener.local_addr().expect("local addr");
    drop(listener);
    Url::parse(&format!("http://{}/", addr)).expect("url")
}

async fn query_labels(
    State(state): State<Arc<LabelerState>>,
    RawQuery(query): RawQuery,
    headers: HeaderMap,
) -> (StatusCode, Json<Value>) {
    state.record("queryLabels", query, &headers);
    (
        state.behavior.query_status,
        Json(state.behavior.query_body.clone()),
    )
}

async fn list_records(
    State(state): State<Arc<LabelerState>>,
    RawQuery(query): RawQuery,
    headers: HeaderMap,
) -> Json<Value> {
    state.record("listRecords", query, &headers);
    Json(state.behavior.records_body.clone())
}

async fn subscribe_labels(
    State(state): State<Arc<LabelerState>>,
    RawQuery(query): RawQuery,
    headers: HeaderMap,
    ws: WebSocketUpgrade,
) -> Response {
    state.record("subscribeLabels", query, &headers);
    let script = state.behavior.stream.clone();
    ws.on_upgrade(move |socket| play(socket, script))
}

async fn play(mut socket: WebSocket, script: Vec<StreamEvent>) {
    for event in script {
        let sent = match event {
            StreamEvent::Frame(bytes) => socket.send(Message::Binary(bytes)).await,
            StreamEvent::Text(text) => socket.send(Message::Text(text)).await,
            StreamEvent::Pause(duration) => {
                tokio::time::sleep(duration).await;
                Ok(())
            }
            StreamEvent::Close => {
                let _ = socket.send(Message::Close(None)).await;
                break;
            }
        };
        if sent.is_err() {
            return;
        }
    }
    // Hold the socket until the client goes away.
    while let Some(Ok(_)) = socket.recv().await {}
}

/// An endpoint answering one request with `status` and a body cut short of
/// its declared length.
pub async fn truncated_error_endpoint(status: &str) -> Url {
    use tokio::io::{AsyncReadExt, AsyncWriteExt};

    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("local addr");
    let response = format!(
        "HTTP/1.1 {}\r\ncontent-type: application/json\r\ncontent-length: 100\r\n\r\n{{\"error\"",
        status
    );
    tokio::spawn(async move {
        if let Ok((mut socket, _)) = listener.accept().await {
            let mut request = [0u8; 4096];
            let _ = socket.read(&mut request).await;
            let _ = socket.write_all(response.as_bytes()).await;
            let _ = socket.shutdown().await;
        }
    });
    Url::parse(&format!("http://{}/", addr)).expect("url")
}
