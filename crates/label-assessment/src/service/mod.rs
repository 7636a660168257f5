//! # Label Assessment Service
//!
//! Application service implementing [`LabelAssessmentApi`].
//!
//! ## Architecture
//!
//! - Implements the inbound port (`LabelAssessmentApi`)
//! - Uses the outbound ports (`LabelQueryClient`, `LabelStreamClient`) for I/O
//! - Delegates canonicalization, verification and accounting to the domain layer
//!
//! Each pipeline call owns its own `Assessment`; the service itself holds no
//! mutable state.

mod inspect;
mod query;
mod subscribe;


use crate::domain::abort::AbortController;
use crate::domain::assessment::Assessment;
use crate::domain::config::AssessmentConfig;
use crate::domain::entities::{QueryRequest, SubscribeRequest, SubscriptionOutcome};
use crate::domain::errors::{AssessmentError, NoPassingLabels};
use crate::ports::inbound::LabelAssessmentApi;
use crate::ports::outbound::{LabelQueryClient, LabelStreamClient};

/// Label Assessment Service.
pub struct LabelAssessmentService<Q, S>
where
    Q: LabelQueryClient,
    S: LabelStreamClient,
{
    query_client: Q,
    stream_client: S,
    config: AssessmentConfig,
}

impl<Q, S> LabelAssessmentService<Q, S>
where
    Q: LabelQueryClient,
    S: LabelStreamClient,
{
    /// Create a new service.
    ///
    /// # Arguments
    /// * `query_client` - Transport for `queryLabels`
    /// * `stream_client` - Transport for `subscribeLabels`
    /// * `config` - Engine tunables
    pub fn new(query_client: Q, stream_client: S, config: AssessmentConfig) -> Self {
        Self {
            query_client,
            stream_client,
            config,
        }
    }

    pub fn config(&self) -> &AssessmentConfig {
        &self.config
    }
}

#[async_trait::async_trait]
impl<Q, S> LabelAssessmentApi for LabelAssessmentService<Q, S>
where
    Q: LabelQueryClient,
    S: LabelStreamClient,
{
    async fn query_labels(&self, request: QueryRequest) -> Result<Assessment, AssessmentError> {
        query::run(&self.query_client, &request).await
    }

    async fn subscribe_labels(
        &self,
        request: SubscribeRequest,
        abort: AbortController,
    ) -> Result<SubscriptionOutcome, AssessmentError> {
        subscribe::run(
            &self.stream_client,
            &request,
            &abort,
            self.config.inactivity_window,
        )
        .await
    }
}

/// Reject an assessment without a single pass.
fn require_pass(assessment: Assessment) -> Result<Assessment, AssessmentError> {
    if assessment.passed() == 0 {
        return Err(AssessmentError::NoPassingLabels(NoPassingLabels {
            flags: assessment.flags().clone(),
        }));
    }
    Ok(assessment)
}
