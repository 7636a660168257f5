//! # Inbound Ports (Driving Ports / API)
//!
//! The two assessment pipelines as seen by an orchestrator.

use crate::domain::abort::AbortController;
use crate::domain::assessment::Assessment;
use crate::domain::entities::{QueryRequest, SubscribeRequest, SubscriptionOutcome};
use crate::domain::errors::AssessmentError;

/// Label Assessment API.
///
/// The pipelines share no state, so both may run concurrently against the
/// same endpoint.
#[async_trait::async_trait]
pub trait LabelAssessmentApi: Send + Sync {
    /// Fetch one page of labels and assess each of them.
    ///
    /// # Errors
    /// * `AssessmentError::QueryTransport` - the request was rejected
    /// * `AssessmentError::NoPassingLabels` - no label passed
    async fn query_labels(&self, request: QueryRequest) -> Result<Assessment, AssessmentError>;

    /// Consume the label stream until it goes quiet, reaches `request.limit`,
    /// or `abort` fires.
    ///
    /// `abort` is shared with the caller. The pipeline aborts it itself on
    /// inactivity or when the ceiling is reached; an abort from the caller
    /// is treated as a fatal termination.
    ///
    /// # Errors
    /// * `AssessmentError::NoLabelsBeforeTimeout` - the stream stayed silent
    /// * `AssessmentError::StreamTransport` - fatal termination before any label
    /// * `AssessmentError::NoPassingLabels` - labels arrived but none passed
    async fn subscribe_labels(
        &self,
        request: SubscribeRequest,
        abort: AbortController,
    ) -> Result<SubscriptionOutcome, AssessmentError>;
}
