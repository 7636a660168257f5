//! # Label Assessment Engine
//!
//! Audits an AT Protocol labeler: fetches or streams its labels, rebuilds the
//! signed payload of each one, verifies the signature against the labeler's
//! key and checks the value against its declared policy set.
//!
//! ## Architecture
//!
//! This crate follows hexagonal architecture:
//! - **Domain Layer** (`domain/`): Labels, canonical encoding, signatures, accounting
//! - **Ports Layer** (`ports/`): The pipeline API and the transports it needs
//! - **Adapters Layer** (`adapters/`): XRPC over HTTP and WebSocket
//! - **Service Layer** (`service/`): The query and subscription pipelines
//!
//! ## Pipelines
//!
//! | Pipeline | Transport | Ends when |
//! |----------|-----------|-----------|
//! | Query | `com.atproto.label.queryLabels` | the single page is assessed |
//! | Subscription | `com.atproto.label.subscribeLabels` | inactivity, count ceiling, close or abort |
//!
//! Both produce an [`Assessment`] or a terminal [`AssessmentError`].
//!
//! ## Security Notes
//!
//! - **Malleability**: high-S signatures are rejected on both curves
//! - **Canonical form**: only `src, uri, val, cts` and the optional fields the
//!   label actually carried are signed; overflow fields never are

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod service;

// Re-export public API
pub use adapters::{XrpcQueryClient, XrpcStreamClient};
pub use domain::abort::{AbortCause, AbortController, AbortSignal};
pub use domain::assessment::{Assessment, FlagTally};
pub use domain::config::AssessmentConfig;
pub use domain::entities::{
    PolicySet, QueryRequest, StreamTermination, SubscribeRequest, SubscriptionOutcome,
};
pub use domain::envelope::{decode_frame, Frame, SubscriptionMessage};
pub use domain::errors::{
    AssessmentError, EnvelopeError, LabelValidationError, NoPassingLabels, TransportError,
    VerificationError,
};
pub use domain::flags::Flag;
pub use domain::label::{validate_label, Label};
pub use domain::signable::{reduce, SignableLabel};
pub use domain::signature::{verify_label_signature, ValidationKey};
pub use ports::inbound::LabelAssessmentApi;
pub use ports::outbound::{FrameStream, LabelQueryClient, LabelStreamClient, QueryLabelsPage};
pub use service::LabelAssessmentService;
