use std::sync::Arc;

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::Json;
use mitigation_common::AttackNode;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::context::AppContext;
use crate::extract::AppJson;

#[derive(Deserialize)]
pub struct IdQuery {
    id: i64,
}

/// `GET /node?id=` — the attack node, or `404` with `{}`.
pub async fn get_node(
    State(ctx): State<Arc<AppContext>>,
    Query(q): Query<IdQuery>,
) -> (StatusCode, Json<Value>) {
    match ctx.store.retrieve_node(q.id).await {
        Ok(Some(node)) => (StatusCode::OK, Json(serde_json::to_value(node).unwrap_or(json!({})))),
        Ok(None) => (StatusCode::NOT_FOUND, Json(json!({}))),
        Err(err) => {
            tracing::error!(error = %err, "failed to retrieve node");
            (StatusCode::INTERNAL_SERVER_ERROR, Json(json!({"error": err.to_string()})))
        }
    }
}

/// `POST /node` — persists the attack node.
pub async fn post_node(
    State(ctx): State<Arc<AppContext>>,
    AppJson(node): AppJson<AttackNode>,
) -> (StatusCode, Json<Value>) {
    match ctx.store.store_node(&node).await {
        Ok(()) => (StatusCode::OK, Json(json!({"status": "stored"}))),
        Err(err) => {
            tracing::error!(error = %err, "failed to store node");
            (StatusCode::INTERNAL_SERVER_ERROR, Json(json!({"error": err.to_string()})))
        }
    }
}
