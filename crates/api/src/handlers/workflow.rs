use std::sync::Arc;

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::Json;
use mitigation_common::Workflow;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::context::AppContext;
use crate::extract::AppJson;

#[derive(Deserialize)]
pub struct IdQuery {
    id: i64,
}

/// `GET /workflow?id=` — the workflow definition, or `404` with `{}`.
pub async fn get_workflow(
    State(ctx): State<Arc<AppContext>>,
    Query(q): Query<IdQuery>,
) -> (StatusCode, Json<Value>) {
    match ctx.store.retrieve_workflow(q.id).await {
        Ok(Some(workflow)) => (StatusCode::OK, Json(serde_json::to_value(workflow).unwrap_or(json!({})))),
        Ok(None) => (StatusCode::NOT_FOUND, Json(json!({}))),
        Err(err) => {
            tracing::error!(error = %err, "failed to retrieve workflow");
            (StatusCode::INTERNAL_SERVER_ERROR, Json(json!({"error": err.to_string()})))
        }
    }
}

/// `POST /workflow` — persists the workflow definition.
pub async fn post_workflow(
    State(ctx): State<Arc<AppContext>>,
    AppJson(workflow): AppJson<Workflow>,
) -> (StatusCode, Json<Value>) {
    match ctx.store.store_workflow(&workflow).await {
        Ok(()) => (StatusCode::OK, Json(json!({"status": "stored"}))),
        Err(err) => {
            tracing::error!(error = %err, "failed to store workflow");
            (StatusCode::INTERNAL_SERVER_ERROR, Json(json!({"error": err.to_string()})))
        }
    }
}
