use std::sync::Arc;

use api::context::AppContext;
use api::router::build_router;
use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use mitigation_condition::MockIsimClient;
use mitigation_executor::actuator::MockActuator;
use mitigation_graph::ScoringConfig;
use mitigation_ingest::IngestCore;
use mitigation_store::StateStore;
use tower::ServiceExt;

async fn test_context() -> Arc<AppContext> {
    let store = StateStore::in_memory().await.unwrap();
    let isim = Arc::new(MockIsimClient::default());
    let actuator = Arc::new(MockActuator::ok(serde_json::json!({})));
    let ingest = IngestCore::new(store.clone(), isim.clone(), actuator.clone(), ScoringConfig::default(), 8);
    Arc::new(AppContext { store, isim, actuator, ingest })
}

#[tokio::test]
async fn version_reports_crate_metadata() {
    let app = build_router(test_context().await);
    let response = app
        .oneshot(Request::builder().uri("/version").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert!(json["version"].as_str().unwrap().starts_with('v'));
}

#[tokio::test]
async fn unknown_condition_id_is_404_with_empty_body() {
    let app = build_router(test_context().await);
    let response = app
        .oneshot(Request::builder().uri("/condition?id=9999").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json, serde_json::json!({}));
}

#[tokio::test]
async fn posting_an_alert_returns_200() {
    let app = build_router(test_context().await);
    let body = serde_json::json!({"rule": {"mitre": {"id": ["T1059"]}}});
    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/alert")
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn malformed_condition_body_is_400_with_error_envelope() {
    let app = build_router(test_context().await);
    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/condition")
                .header("content-type", "application/json")
                .body(Body::from("{not json"))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert!(json["error"].is_string());
}
