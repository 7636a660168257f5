//! Query pipeline: one page of labels over request/response.

use super::inspect::{LabelInspector, UnsignedLabelPolicy};
use super::require_pass;
use crate::domain::assessment::Assessment;
use crate::domain::entities::QueryRequest;
use crate::domain::errors::AssessmentError;
use crate::domain::label::Label;
use crate::ports::outbound::LabelQueryClient;
use tracing::{debug, info};

/// Fetch one page and assess every structurally valid label on it.
///
/// Labels that fail structural validation are skipped without being counted.
pub(crate) async fn run<Q: LabelQueryClient + ?Sized>(
    client: &Q,
    request: &QueryRequest,
) -> Result<Assessment, AssessmentError> {
    let page = client
        .query_labels(request)
        .await
        .map_err(AssessmentError::QueryTransport)?;
    info!(
        endpoint = %request.endpoint,
        count = page.labels.len(),
        "Received label page"
    );

    let inspector = LabelInspector::new(
        request.key.as_deref(),
        request.policies.as_ref(),
        UnsignedLabelPolicy::AlwaysFlag,
    );
    let mut assessment = Assessment::new();

    for (index, raw) in page.labels.into_iter().enumerate() {
        match Label::from_json(raw) {
            Ok(label) => inspector.inspect(&label, &mut assessment),
            Err(e) => debug!(index, error = %e, "Skipping malformed label"),
        }
    }

    require_pass(assessment)
}

