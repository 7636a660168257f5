//! # Event-Stream Envelope
//!
//! Decoding and validation of `com.atproto.label.subscribeLabels` frames.
//!
//! ## Frame layout
//!
//! Each binary WebSocket message holds two concatenated DAG-CBOR values:
//!
//! ```text
//! ┌──────────────────────┬──────────────────────────────┐
//! │ header {op, t?}      │ body                         │
//! └──────────────────────┴──────────────────────────────┘
//!   op =  1, t = "#labels"  →  {seq, labels: [Label]}
//!   op =  1, t = "#info"    →  {name, message?}
//!   op = -1                 →  {error, message?}   (fatal)
//! ```

use super::errors::EnvelopeError;
use super::label::{validate_label, Label};
use ciborium::Value;
use serde::{Deserialize, Serialize};

/// Header `op` of a regular message frame.
pub const OP_MESSAGE: i64 = 1;
/// Header `op` of an error frame.
pub const OP_ERROR: i64 = -1;

/// Message type of a label batch.
pub const TYPE_LABELS: &str = "#labels";
/// Message type of an informational notice.
pub const TYPE_INFO: &str = "#info";

/// Frame header.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrameHeader {
    pub op: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub t: Option<String>,
}

/// A batch of labels.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabelsMessage {
    pub seq: i64,
    pub labels: Vec<Label>,
}

/// An informational notice from the server, e.g. `OutdatedCursor`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InfoMessage {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Body of an error frame.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorFrame {
    pub error: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// The message kinds a label subscription emits.
///
/// The message union is open: a type this engine does not know is carried as
/// `Unknown` with its name and its body left unread.
#[derive(Debug, Clone, PartialEq)]
pub enum SubscriptionMessage {
    Labels(LabelsMessage),
    Info(InfoMessage),
    Unknown(String),
}

/// A validated frame.
#[derive(Debug, Clone, PartialEq)]
pub enum Frame {
    Message(SubscriptionMessage),
    Error(ErrorFrame),
}

/// Decode one frame and validate it against the subscription schema.
///
/// Every label in a `#labels` message must pass structural validation for the
/// frame to be accepted.
pub fn decode_frame(bytes: &[u8]) -> Result<Frame, EnvelopeError> {
    let mut rest = bytes;
    let header: FrameHeader = ciborium::de::from_reader(&mut rest)
        .map_err(|e| EnvelopeError::Undecodable(format!("header: {}", e)))?;
    let body: Value = ciborium::de::from_reader(&mut rest)
        .map_err(|e| EnvelopeError::Undecodable(format!("body: {}", e)))?;
    if !rest.is_empty() {
        return Err(EnvelopeError::Undecodable(format!(
            "{} trailing bytes after body",
            rest.len()
        )));
    }

    match header.op {
        OP_ERROR => body
            .deserialized::<ErrorFrame>()
            .map(Frame::Error)
            .map_err(|e| invalid_body("error", e)),
        OP_MESSAGE => {
            let kind = header.t.ok_or(EnvelopeError::MissingType)?;
            match kind.as_str() {
                TYPE_LABELS => {
                    let message = body
                        .deserialized::<LabelsMessage>()
                        .map_err(|e| invalid_body("labels", e))?;
                    for (index, label) in message.labels.iter().enumerate() {
                        validate_label(label)
                            .map_err(|source| EnvelopeError::InvalidLabel { index, source })?;
                    }
                    Ok(Frame::Message(SubscriptionMessage::Labels(message)))
                }
                TYPE_INFO => body
                    .deserialized::<InfoMessage>()
                    .map(|info| Frame::Message(SubscriptionMessage::Info(info)))
                    .map_err(|e| invalid_body("info", e)),
                _ => Ok(Frame::Message(SubscriptionMessage::Unknown(kind))),
            }
        }
        other => Err(EnvelopeError::UnknownOperation(other)),
    }
}

/// Encode a header and body as one frame.
pub fn encode_frame<B: Serialize>(
    header: &FrameHeader,
    body: &B,
) -> Result<Vec<u8>, ciborium::ser::Error<std::io::Error>> {
    let mut bytes = Vec::new();
    ciborium::ser::into_writer(header, &mut bytes)?;
    ciborium::ser::into_writer(body, &mut bytes)?;
    Ok(bytes)
}

fn invalid_body(kind: &'static str, err: impl std::fmt::Display) -> EnvelopeError {
    EnvelopeError::InvalidBody {
        kind,
        reason: err.to_string(),
    }
}
