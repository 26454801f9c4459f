use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use crate::context::AppContext;
use crate::extract::AppJson;

/// `POST /alert` — the raw alert is pushed straight into the ingest
/// pipeline; the same path a bus message takes (spec §6).
pub async fn post_alert(State(ctx): State<Arc<AppContext>>, AppJson(raw): AppJson<serde_json::Value>) -> Response {
    match ctx.ingest.ingest(raw).await {
        Ok(report) => {
            if report.dropped {
                tracing::warn!("alert dropped as malformed");
            }
            StatusCode::OK.into_response()
        }
        Err(err) => {
            tracing::error!(error = %err, "ingest failed");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}
