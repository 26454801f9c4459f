use axum::Json;
use serde::Serialize;

#[derive(Serialize)]
pub struct VersionResponse {
    version: String,
    major: u32,
    minor: u32,
}

/// `GET /version` — derived from crate metadata, never hand-maintained.
pub async fn version() -> Json<VersionResponse> {
    const RAW: &str = env!("CARGO_PKG_VERSION");
    let mut parts = RAW.split('.');
    let major: u32 = parts.next().and_then(|p| p.parse().ok()).unwrap_or(0);
    let minor: u32 = parts.next().and_then(|p| p.parse().ok()).unwrap_or(0);
    Json(VersionResponse { version: format!("v{RAW}"), major, minor })
}
