//! GET /statistics (admin only)

use hyper::{Response, StatusCode};

use crate::routes::response::{json_response, ErrorResponse, FullBody};
use crate::server::AppState;
use crate::services::{collect_statistics, Statistics};
use crate::types::UkmError;

#[utoipa::path(
    get,
    path = "/statistics",
    tag = "statistics",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Dashboard totals and breakdowns", body = Statistics),
        (status = 403, description = "Admin only", body = ErrorResponse),
        (status = 503, description = "Database not available", body = ErrorResponse)
    )
)]
pub async fn handle_statistics(state: &AppState) -> Result<Response<FullBody>, UkmError> {
    let stats = collect_statistics(state.db()?).await?;
    Ok(json_response(StatusCode::OK, &stats))
}
