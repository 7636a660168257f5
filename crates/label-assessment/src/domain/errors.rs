//! # Assessment Errors
//!
//! Error types for every layer of the engine. Per-item failures
//! (`LabelValidationError`, `EnvelopeError`, `VerificationError`) are absorbed
//! into an [`Assessment`](super::assessment::Assessment) as flags. Only
//! [`AssessmentError`] ever reaches the caller.

use super::assessment::FlagTally;
use std::fmt;
use thiserror::Error;

/// A label record failed structural validation against the label schema.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum LabelValidationError {
    /// The record could not be decoded into the label shape at all.
    #[error("Malformed label record: {0}")]
    Malformed(String),

    /// A field is present but does not satisfy its schema constraint.
    #[error("Label field `{field}` is invalid: {reason}")]
    InvalidField {
        field: &'static str,
        reason: String,
    },
}

impl LabelValidationError {
    pub(crate) fn field(field: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidField {
            field,
            reason: reason.into(),
        }
    }
}

/// A streamed frame failed envelope validation.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum EnvelopeError {
    /// The frame bytes are not two concatenated CBOR values.
    #[error("Undecodable frame: {0}")]
    Undecodable(String),

    /// The header carries an operation this protocol does not define.
    #[error("Unknown frame operation {0}")]
    UnknownOperation(i64),

    /// A message frame arrived without a message type.
    #[error("Message frame has no type")]
    MissingType,

    /// The body does not match the schema for its message type.
    #[error("Invalid {kind} body: {reason}")]
    InvalidBody { kind: &'static str, reason: String },

    /// A label inside a `#labels` message failed structural validation.
    #[error("Invalid label at index {index}: {source}")]
    InvalidLabel {
        index: usize,
        #[source]
        source: LabelValidationError,
    },
}

/// Signature verification could not run to completion.
///
/// This is distinct from a signature that simply does not verify, which is a
/// successful `Ok(false)` outcome.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum VerificationError {
    /// The validation key string is not a supported `did:key`.
    #[error("Invalid validation key: {0}")]
    InvalidKey(String),

    /// The key uses a multicodec this engine cannot verify with.
    #[error("Unsupported key type (multicodec prefix {0:#06x})")]
    UnsupportedKeyType(u16),

    /// The signature bytes are not a 64-byte compact ECDSA signature.
    #[error("Invalid signature encoding: {0}")]
    InvalidSignature(String),

    /// Canonical encoding of the signable label failed.
    #[error("Canonical encoding failed: {0}")]
    Encoding(String),
}

/// Failure of a transport (HTTP request or event stream).
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TransportError {
    /// The endpoint URL could not be turned into a request target.
    #[error("Invalid endpoint: {0}")]
    InvalidEndpoint(String),

    /// The request could not be sent or the server answered with an error status.
    #[error("{0}")]
    Request(String),

    /// The response body did not match the expected output shape.
    #[error("Unexpected response: {0}")]
    InvalidResponse(String),

    /// The stream connection could not be established.
    #[error("{0}")]
    Connect(String),

    /// The stream broke after it was established.
    #[error("{0}")]
    Stream(String),

    /// The server sent an error frame.
    #[error("{error}: {message}")]
    Remote { error: String, message: String },

    /// The stream was cancelled by an external abort.
    #[error("{0}")]
    Aborted(String),
}

/// Terminal outcome of a pipeline run that produced no usable assessment.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AssessmentError {
    /// The query endpoint rejected the single page request.
    #[error("Query endpoint rejected request: {0}")]
    QueryTransport(#[source] TransportError),

    /// Input was consumed but not a single label passed.
    #[error("{0}")]
    NoPassingLabels(NoPassingLabels),

    /// The inactivity timer fired before any label was counted.
    #[error("Timeout occurred before finding any labels")]
    NoLabelsBeforeTimeout,

    /// The stream terminated fatally before any label was counted.
    #[error("{0}")]
    StreamTransport(#[source] TransportError),
}

/// Every flag raised during a run that ended with zero passes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoPassingLabels {
    pub flags: FlagTally,
}

impl fmt::Display for NoPassingLabels {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.flags.is_empty() {
            return write!(f, "No labels.");
        }
        let entries: Vec<String> = self
            .flags
            .iter()
            .map(|(flag, count)| format!("{} (x{})", flag, count))
            .collect();
        write!(f, "No passing labels. {}.", entries.join(". "))
    }
}
