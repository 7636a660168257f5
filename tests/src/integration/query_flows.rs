//! queryLabels over HTTP against the loopback labeler.

use crate::fixtures::*;
use axum::http::StatusCode;
use label_assessment::{
    AssessmentConfig, AssessmentError, LabelAssessmentApi, LabelAssessmentService, PolicySet,
    QueryRequest, XrpcQueryClient, XrpcStreamClient,
};
use serde_json::json;
use std::time::Duration;

const AGENT: &str = "labeler-tests/0.1";

fn service() -> LabelAssessmentService<XrpcQueryClient, XrpcStreamClient> {
    let config = AssessmentConfig::default();
    LabelAssessmentService::new(
        XrpcQueryClient::new(Duration::from_secs(5)).expect("client"),
        XrpcStreamClient::new(),
        config,
    )
}

fn request(server: &LabelerServer, key: Option<String>, policies: Option<&[&str]>) -> QueryRequest {
    let mut request =
        QueryRequest::new(server.endpoint.clone(), AGENT, &AssessmentConfig::default());
    request.key = key;
    request.policies =
        policies.map(|values| values.iter().map(|v| v.to_string()).collect::<PolicySet>());
    request
}

async fn serve(labels: &[label_assessment::Label]) -> LabelerServer {
    LabelerServer::spawn(LabelerBehavior {
        query_body: query_body(labels),
        ..LabelerBehavior::default()
    })
    .await
}

#[tokio::test]
async fn test_all_valid_labels_pass() {
    let server = serve(&[signed("nudity", 1), signed("nudity", 2), signed("gore", 3)]).await;
    let key = did_key_k256(&labeler_key());

    let assessment = service()
        .query_labels(request(&server, Some(key), None))
        .await
        .expect("assessment");

    assert_eq!(assessment.total(), 3);
    assert_eq!(assessment.passed(), 3);
    assert!(assessment.flags().is_empty());
}

#[tokio::test]
async fn test_unregistered_value_is_flagged() {
    let server = serve(&[signed("nudity", 1), signed("spam", 2)]).await;
    let key = did_key_k256(&labeler_key());

    let assessment = service()
        .query_labels(request(&server, Some(key), Some(&["nudity"])))
        .await
        .expect("assessment");

    assert_eq!(assessment.total(), 2);
    assert_eq!(assessment.passed(), 1);
    assert_eq!(
        assessment.flags().get("Label assigned an unregistered value spam"),
        1
    );
    assert_eq!(assessment.flags().len(), 1);
}

#[tokio::test]
async fn test_empty_page_fails_with_no_labels() {
    let server = serve(&[]).await;

    let err = service()
        .query_labels(request(&server, None, None))
        .await
        .unwrap_err();

    assert!(matches!(err, AssessmentError::NoPassingLabels(_)));
    assert_eq!(err.to_string(), "No labels.");
}

#[tokio::test]
async fn test_request_carries_patterns_cursor_limit_and_agent() {
    let server = serve(&[signed("nudity", 1)]).await;
    let key = did_key_k256(&labeler_key());

    let mut request = request(&server, Some(key), None);
    request.limit = 25;
    service().query_labels(request).await.expect("assessment");

    let seen = server.requests();
    assert_eq!(seen.len(), 1);
    assert_eq!(seen[0].method, "queryLabels");
    assert_eq!(seen[0].query, "uriPatterns=*&cursor=0&limit=25");
    assert_eq!(seen[0].user_agent.as_deref(), Some(AGENT));
}

#[tokio::test]
async fn test_xrpc_error_body_is_reported() {
    let server = LabelerServer::spawn(LabelerBehavior {
        query_status: StatusCode::BAD_REQUEST,
        query_body: json!({ "error": "InvalidRequest", "message": "bad cursor" }),
        ..LabelerBehavior::default()
    })
    .await;

    let err = service()
        .query_labels(request(&server, None, None))
        .await
        .unwrap_err();

    assert!(matches!(err, AssessmentError::QueryTransport(_)));
    assert_eq!(
        err.to_string(),
        "Query endpoint rejected request: InvalidRequest: bad cursor (400)"
    );
}

#[tokio::test]
async fn test_unreachable_endpoint_is_a_transport_failure() {
    let request = QueryRequest::new(closed_endpoint(), AGENT, &AssessmentConfig::default());

    let err = service().query_labels(request).await.unwrap_err();
    assert!(matches!(err, AssessmentError::QueryTransport(_)));
}

#[tokio::test]
async fn test_p256_labeler_verifies() {
    let key = random_p256_key();
    let labels = vec![
        sign_p256(label("nudity", 1), &key),
        sign_p256(label("porn", 2), &key),
    ];
    let server = serve(&labels).await;

    let assessment = service()
        .query_labels(request(&server, Some(did_key_p256(&key)), None))
        .await
        .expect("assessment");

    assert_eq!(assessment.passed(), 2);
    assert!(assessment.flags().is_empty());
}

#[tokio::test]
async fn test_tampered_and_unsigned_labels_are_flagged() {
    let mut tampered = signed("nudity", 1);
    tampered.val = "gore".into();
    let server = serve(&[signed("nudity", 2), tampered, label("nudity", 3)]).await;
    let key = did_key_k256(&labeler_key());

    let assessment = service()
        .query_labels(request(&server, Some(key), None))
        .await
        .expect("assessment");

    assert_eq!(assessment.total(), 3);
    assert_eq!(assessment.passed(), 1);
    assert_eq!(
        assessment
            .flags()
            .get("Invalid signature on label with only standard fields"),
        1
    );
    assert_eq!(assessment.flags().get("Label used no signature"), 1);
}

#[tokio::test]
async fn test_wrong_key_fails_every_label() {
    let server = serve(&[signed("nudity", 1), signed("nudity", 2)]).await;
    let stranger = did_key_p256(&random_p256_key());

    let err = service()
        .query_labels(request(&server, Some(stranger), None))
        .await
        .unwrap_err();

    assert_eq!(
        err.to_string(),
        "No passing labels. Invalid signature on label with only standard fields (x2)."
    );
}

#[tokio::test]
async fn test_signed_labels_without_key_skip_validation() {
    let server = serve(&[signed("nudity", 1)]).await;

    let err = service()
        .query_labels(request(&server, None, None))
        .await
        .unwrap_err();

    assert_eq!(
        err.to_string(),
        "No passing labels. Skipped label signature validation (x1)."
    );
}

#[tokio::test]
async fn test_truncated_error_body_falls_back_to_status() {
    let endpoint = truncated_error_endpoint("502 Bad Gateway").await;
    let request = QueryRequest::new(endpoint, AGENT, &AssessmentConfig::default());

    let err = service().query_labels(request).await.unwrap_err();

    assert_eq!(
        err.to_string(),
        "Query endpoint rejected request: Bad Gateway (502)"
    );
}
