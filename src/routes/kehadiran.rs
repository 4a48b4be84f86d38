//! Kehadiran (attendance) routes
//!
//! Members may list, read and record attendance; a member's record is always
//! written against their own account. Updates and deletes are for admins.

use bytes::Bytes;
use hyper::body::Body;
use hyper::{Request, Response};

use crate::auth::Claims;
use crate::db::schemas::Kehadiran;
use crate::routes::crud;
use crate::routes::response::{ErrorResponse, FullBody, MessageResponse};
use crate::server::AppState;
use crate::types::UkmError;

#[utoipa::path(
    get,
    path = "/kehadiran",
    tag = "kehadiran",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Every attendance record", body = [Kehadiran]),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse)
    )
)]
pub async fn list_kehadiran(state: &AppState) -> Result<Response<FullBody>, UkmError> {
    crud::list(state.stores()?.kehadiran.as_ref()).await
}

#[utoipa::path(
    get,
    path = "/kehadiran/{id}",
    tag = "kehadiran",
    security(("bearer_auth" = [])),
    params(("id" = String, Path, description = "Kehadiran ObjectId (hex)")),
    responses(
        (status = 200, description = "The attendance record", body = Kehadiran),
        (status = 404, description = "Kehadiran not found", body = ErrorResponse)
    )
)]
pub async fn get_kehadiran(state: &AppState, id: &str) -> Result<Response<FullBody>, UkmError> {
    crud::get(state.stores()?.kehadiran.as_ref(), id).await
}

#[utoipa::path(
    post,
    path = "/kehadiran",
    tag = "kehadiran",
    security(("bearer_auth" = [])),
    request_body = Kehadiran,
    responses(
        (status = 201, description = "Recorded attendance", body = Kehadiran),
        (status = 400, description = "Validation failed", body = ErrorResponse)
    )
)]
pub async fn create_kehadiran<B>(
    state: &AppState,
    caller: &Claims,
    req: Request<B>,
) -> Result<Response<FullBody>, UkmError>
where
    B: Body<Data = Bytes>,
    B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    crud::create(state.stores()?.kehadiran.as_ref(), caller, req).await
}

#[utoipa::path(
    put,
    path = "/kehadiran/{id}",
    tag = "kehadiran",
    security(("bearer_auth" = [])),
    params(("id" = String, Path, description = "Kehadiran ObjectId (hex)")),
    request_body = Kehadiran,
    responses(
        (status = 200, description = "Kehadiran updated", body = MessageResponse),
        (status = 404, description = "Kehadiran not found", body = ErrorResponse)
    )
)]
pub async fn update_kehadiran<B>(
    state: &AppState,
    id: &str,
    req: Request<B>,
) -> Result<Response<FullBody>, UkmError>
where
    B: Body<Data = Bytes>,
    B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    crud::update(state.stores()?.kehadiran.as_ref(), id, req).await
}

#[utoipa::path(
    delete,
    path = "/kehadiran/{id}",
    tag = "kehadiran",
    security(("bearer_auth" = [])),
    params(("id" = String, Path, description = "Kehadiran ObjectId (hex)")),
    responses(
        (status = 200, description = "Kehadiran deleted", body = MessageResponse),
        (status = 404, description = "Kehadiran not found", body = ErrorResponse)
    )
)]
pub async fn delete_kehadiran(state: &AppState, id: &str) -> Result<Response<FullBody>, UkmError> {
    crud::delete(state.stores()?.kehadiran.as_ref(), id).await
}
