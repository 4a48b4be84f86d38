//! Kategori routes. The list is public so the registration form can offer it.

use bytes::Bytes;
use hyper::body::Body;
use hyper::{Request, Response};

use crate::auth::Claims;
use crate::db::schemas::Kategori;
use crate::routes::crud;
use crate::routes::response::{ErrorResponse, FullBody, MessageResponse};
use crate::server::AppState;
use crate::types::UkmError;

#[utoipa::path(
    get,
    path = "/kategori",
    tag = "kategori",
    responses((status = 200, description = "Every kategori", body = [Kategori]))
)]
pub async fn list_kategori(state: &AppState) -> Result<Response<FullBody>, UkmError> {
    crud::list(state.stores()?.kategori.as_ref()).await
}

#[utoipa::path(
    get,
    path = "/kategori/{id}",
    tag = "kategori",
    security(("bearer_auth" = [])),
    params(("id" = String, Path, description = "Kategori ObjectId (hex)")),
    responses(
        (status = 200, description = "The kategori", body = Kategori),
        (status = 404, description = "Kategori not found", body = ErrorResponse)
    )
)]
pub async fn get_kategori(state: &AppState, id: &str) -> Result<Response<FullBody>, UkmError> {
    crud::get(state.stores()?.kategori.as_ref(), id).await
}

#[utoipa::path(
    post,
    path = "/kategori",
    tag = "kategori",
    security(("bearer_auth" = [])),
    request_body = Kategori,
    responses(
        (status = 201, description = "Created kategori", body = Kategori),
        (status = 400, description = "Validation failed", body = ErrorResponse)
    )
)]
pub async fn create_kategori<B>(
    state: &AppState,
    caller: &Claims,
    req: Request<B>,
) -> Result<Response<FullBody>, UkmError>
where
    B: Body<Data = Bytes>,
    B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    crud::create(state.stores()?.kategori.as_ref(), caller, req).await
}

#[utoipa::path(
    put,
    path = "/kategori/{id}",
    tag = "kategori",
    security(("bearer_auth" = [])),
    params(("id" = String, Path, description = "Kategori ObjectId (hex)")),
    request_body = Kategori,
    responses(
        (status = 200, description = "Kategori updated", body = MessageResponse),
        (status = 404, description = "Kategori not found", body = ErrorResponse)
    )
)]
pub async fn update_kategori<B>(
    state: &AppState,
    id: &str,
    req: Request<B>,
) -> Result<Response<FullBody>, UkmError>
where
    B: Body<Data = Bytes>,
    B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    crud::update(state.stores()?.kategori.as_ref(), id, req).await
}

#[utoipa::path(
    delete,
    path = "/kategori/{id}",
    tag = "kategori",
    security(("bearer_auth" = [])),
    params(("id" = String, Path, description = "Kategori ObjectId (hex)")),
    responses(
        (status = 200, description = "Kategori deleted", body = MessageResponse),
        (status = 404, description = "Kategori not found", body = ErrorResponse)
    )
)]
pub async fn delete_kategori(state: &AppState, id: &str) -> Result<Response<FullBody>, UkmError> {
    crud::delete(state.stores()?.kategori.as_ref(), id).await
}
