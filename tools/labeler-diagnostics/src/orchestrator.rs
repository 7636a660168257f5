//! # Orchestrator
//!
//! Runs both pipelines against one labeler endpoint, concurrently, each under
//! an overall deadline.
//!
//! ```text
//!            ┌──► queryLabels      (http/https) ──► TransportReport
//! RunPlan ───┤
//!            └──► subscribeLabels  (ws/wss)     ──► TransportReport
//! ```

use label_assessment::{
    AbortCause, AbortController, Assessment, AssessmentConfig, LabelAssessmentApi, PolicySet,
    QueryRequest, SubscribeRequest, TransportError,
};
use reqwest::Url;
use std::time::Duration;
use tracing::{debug, info};

/// Failure text when a transport misses the deadline.
pub const DEADLINE_EXPIRED: &str = "Timeout expired waiting for results";

/// Transport names as shown to the user.
pub const QUERY_TRANSPORT: &str = "queryLabels";
pub const SUBSCRIBE_TRANSPORT: &str = "subscribeLabels";

/// Everything needed to test one endpoint.
#[derive(Debug, Clone)]
pub struct RunPlan {
    /// Labeler service endpoint (http/https).
    pub endpoint: Url,
    pub key: Option<String>,
    pub policies: Option<PolicySet>,
    pub user_agent: String,
    /// Count ceiling for both pipelines.
    pub depth: u64,
    /// Overall deadline per transport.
    pub deadline: Duration,
    pub run_query: bool,
    pub run_subscribe: bool,
}

impl RunPlan {
    fn query_request(&self, engine: &AssessmentConfig) -> QueryRequest {
        let mut request = QueryRequest::new(self.endpoint.clone(), &self.user_agent, engine);
        request.limit = u32::try_from(self.depth).unwrap_or(u32::MAX);
        request.key = self.key.clone();
        request.policies = self.policies.clone();
        request
    }

    fn subscribe_request(&self, engine: &AssessmentConfig) -> Result<SubscribeRequest, TransportError> {
        let mut request =
            SubscribeRequest::new(stream_endpoint(&self.endpoint)?, &self.user_agent, engine);
        request.limit = self.depth;
        request.key = self.key.clone();
        request.policies = self.policies.clone();
        Ok(request)
    }
}

/// Outcome of one transport: an assessment or the failure text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportReport {
    pub name: &'static str,
    pub outcome: Result<Assessment, String>,
}

/// Outcomes of every transport that ran, in display order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DiagnosticsReport {
    pub transports: Vec<TransportReport>,
}

/// Map an http(s) endpoint to its ws(s) counterpart.
pub fn stream_endpoint(endpoint: &Url) -> Result<Url, TransportError> {
    let scheme = match endpoint.scheme() {
        "http" => "ws",
        "https" => "wss",
        other => {
            return Err(TransportError::InvalidEndpoint(format!(
                "unsupported scheme {}",
                other
            )))
        }
    };
    let mut url = endpoint.clone();
    url.set_scheme(scheme)
        .map_err(|_| TransportError::InvalidEndpoint(endpoint.to_string()))?;
    Ok(url)
}

/// Run the planned transports concurrently.
pub async fn run<A: LabelAssessmentApi + ?Sized>(
    api: &A,
    plan: &RunPlan,
    engine: &AssessmentConfig,
) -> DiagnosticsReport {
    let query = async {
        if plan.run_query {
            Some(run_query(api, plan, engine).await)
        } else {
            None
        }
    };
    let subscribe = async {
        if plan.run_subscribe {
            Some(run_subscribe(api, plan, engine).await)
        } else {
            None
        }
    };

    let (query, subscribe) = tokio::join!(query, subscribe);
    DiagnosticsReport {
        transports: query.into_iter().chain(subscribe).collect(),
    }
}

async fn run_query<A: LabelAssessmentApi + ?Sized>(
    api: &A,
    plan: &RunPlan,
    engine: &AssessmentConfig,
) -> TransportReport {
    let request = plan.query_request(engine);
    info!(endpoint = %request.endpoint, "Testing queryLabels");

    let outcome = match tokio::time::timeout(plan.deadline, api.query_labels(request)).await {
        Ok(result) => result.map_err(|e| e.to_string()),
        Err(_) => Err(DEADLINE_EXPIRED.to_string()),
    };
    TransportReport {
        name: QUERY_TRANSPORT,
        outcome,
    }
}

async fn run_subscribe<A: LabelAssessmentApi + ?Sized>(
    api: &A,
    plan: &RunPlan,
    engine: &AssessmentConfig,
) -> TransportReport {
    let request = match plan.subscribe_request(engine) {
        Ok(request) => request,
        Err(e) => {
            return TransportReport {
                name: SUBSCRIBE_TRANSPORT,
                outcome: Err(e.to_string()),
            }
        }
    };
    info!(endpoint = %request.endpoint, "Testing subscribeLabels");

    let abort = AbortController::new();
    let subscription = api.subscribe_labels(request, abort.clone());
    tokio::pin!(subscription);

    let result = tokio::select! {
        result = &mut subscription => result,
        () = tokio::time::sleep(plan.deadline) => {
            debug!("Subscription deadline expired");
            abort.abort(AbortCause::External(DEADLINE_EXPIRED.to_string()));
            subscription.await
        }
    };

    TransportReport {
        name: SUBSCRIBE_TRANSPORT,
        outcome: result
            .map(|outcome| outcome.assessment)
            .map_err(|e| e.to_string()),
    }
}
