//! Kegiatan routes
//!
//! - `GET /kegiatan`, `GET /kegiatan/{id}` for any signed-in user
//! - `POST`, `PUT`, `DELETE` for admins

use bytes::Bytes;
use hyper::body::Body;
use hyper::{Request, Response};

use crate::auth::Claims;
use crate::db::schemas::Kegiatan;
use crate::routes::crud;
use crate::routes::response::{ErrorResponse, FullBody, MessageResponse};
use crate::server::AppState;
use crate::types::UkmError;

#[utoipa::path(
    get,
    path = "/kegiatan",
    tag = "kegiatan",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Every kegiatan, each with its hex `id`", body = [Kegiatan]),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse)
    )
)]
pub async fn list_kegiatan(state: &AppState) -> Result<Response<FullBody>, UkmError> {
    crud::list(state.stores()?.kegiatan.as_ref()).await
}

#[utoipa::path(
    get,
    path = "/kegiatan/{id}",
    tag = "kegiatan",
    security(("bearer_auth" = [])),
    params(("id" = String, Path, description = "Kegiatan ObjectId (hex)")),
    responses(
        (status = 200, description = "The kegiatan", body = Kegiatan),
        (status = 400, description = "Invalid ID", body = ErrorResponse),
        (status = 404, description = "Kegiatan not found", body = ErrorResponse)
    )
)]
pub async fn get_kegiatan(state: &AppState, id: &str) -> Result<Response<FullBody>, UkmError> {
    crud::get(state.stores()?.kegiatan.as_ref(), id).await
}

/// `created_by` defaults to the caller
#[utoipa::path(
    post,
    path = "/kegiatan",
    tag = "kegiatan",
    security(("bearer_auth" = [])),
    request_body = Kegiatan,
    responses(
        (status = 201, description = "Created kegiatan", body = Kegiatan),
        (status = 400, description = "Validation failed", body = ErrorResponse),
        (status = 403, description = "Admin only", body = ErrorResponse)
    )
)]
pub async fn create_kegiatan<B>(
    state: &AppState,
    caller: &Claims,
    req: Request<B>,
) -> Result<Response<FullBody>, UkmError>
where
    B: Body<Data = Bytes>,
    B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    crud::create(state.stores()?.kegiatan.as_ref(), caller, req).await
}

/// Omitting `created_by` keeps the stored creator
#[utoipa::path(
    put,
    path = "/kegiatan/{id}",
    tag = "kegiatan",
    security(("bearer_auth" = [])),
    params(("id" = String, Path, description = "Kegiatan ObjectId (hex)")),
    request_body = Kegiatan,
    responses(
        (status = 200, description = "Kegiatan updated", body = MessageResponse),
        (status = 400, description = "Validation failed", body = ErrorResponse),
        (status = 404, description = "Kegiatan not found", body = ErrorResponse)
    )
)]
pub async fn update_kegiatan<B>(
    state: &AppState,
    id: &str,
    req: Request<B>,
) -> Result<Response<FullBody>, UkmError>
where
    B: Body<Data = Bytes>,
    B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    crud::update(state.stores()?.kegiatan.as_ref(), id, req).await
}

#[utoipa::path(
    delete,
    path = "/kegiatan/{id}",
    tag = "kegiatan",
    security(("bearer_auth" = [])),
    params(("id" = String, Path, description = "Kegiatan ObjectId (hex)")),
    responses(
        (status = 200, description = "Kegiatan deleted", body = MessageResponse),
        (status = 404, description = "Kegiatan not found", body = ErrorResponse)
    )
)]
pub async fn delete_kegiatan(state: &AppState, id: &str) -> Result<Response<FullBody>, UkmError> {
    crud::delete(state.stores()?.kegiatan.as_ref(), id).await
}
