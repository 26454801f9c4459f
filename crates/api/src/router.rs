use std::sync::Arc;

use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::context::AppContext;
use crate::handlers;

/// Builds the admin HTTP API router (spec §6). Separated from `main` so it
/// can be exercised directly in tests without binding a socket.
pub fn build_router(ctx: Arc<AppContext>) -> Router {
    Router::new()
        .route("/version", get(handlers::version::version))
        .route("/alert", post(handlers::alert::post_alert))
        .route(
            "/condition",
            get(handlers::condition::get_condition).post(handlers::condition::post_condition),
        )
        .route("/node", get(handlers::node::get_node).post(handlers::node::post_node))
        .route(
            "/workflow",
            get(handlers::workflow::get_workflow).post(handlers::workflow::post_workflow),
        )
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(ctx)
}
