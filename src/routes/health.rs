//! Liveness endpoint
//!
//! Always 200 while the process is serving; `database` reports whether a
//! MongoDB connection was established at startup.

use hyper::{Response, StatusCode};
use serde::Serialize;
use utoipa::ToSchema;

use crate::routes::response::{json_response, FullBody};
use crate::server::AppState;

#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    /// Seconds since the server state was built
    pub uptime: u64,
    pub database: bool,
    pub timestamp: String,
}

#[utoipa::path(
    get,
    path = "/health",
    tag = "system",
    responses((status = 200, description = "Server is up", body = HealthResponse))
)]
pub fn health_check(state: &AppState) -> Response<FullBody> {
    json_response(
        StatusCode::OK,
        &HealthResponse {
            status: "ok".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            uptime: state.started_at.elapsed().as_secs(),
            database: state.db.is_some(),
            timestamp: chrono::Utc::now().to_rfc3339(),
        },
    )
}
