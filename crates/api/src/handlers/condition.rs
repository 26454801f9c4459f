use std::sync::Arc;

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::Json;
use mitigation_common::Condition;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::context::AppContext;
use crate::extract::AppJson;

#[derive(Deserialize)]
pub struct IdQuery {
    id: i64,
}

/// `GET /condition?id=` — the condition object, or `404` with `{}`.
pub async fn get_condition(
    State(ctx): State<Arc<AppContext>>,
    Query(q): Query<IdQuery>,
) -> (StatusCode, Json<Value>) {
    match ctx.store.retrieve_condition(q.id).await {
        Ok(Some(condition)) => (StatusCode::OK, Json(serde_json::to_value(condition).unwrap_or(json!({})))),
        Ok(None) => (StatusCode::NOT_FOUND, Json(json!({}))),
        Err(err) => {
            tracing::error!(error = %err, "failed to retrieve condition");
            (StatusCode::INTERNAL_SERVER_ERROR, Json(json!({"error": err.to_string()})))
        }
    }
}

/// `POST /condition` — persists the condition; a body that fails to
/// deserialize yields `400`, never a panic.
pub async fn post_condition(
    State(ctx): State<Arc<AppContext>>,
    AppJson(condition): AppJson<Condition>,
) -> (StatusCode, Json<Value>) {
    match ctx.store.store_condition(&condition).await {
        Ok(()) => (StatusCode::OK, Json(json!({"status": "stored"}))),
        Err(err) => {
            tracing::error!(error = %err, "failed to store condition");
            (StatusCode::INTERNAL_SERVER_ERROR, Json(json!({"error": err.to_string()})))
        }
    }
}
