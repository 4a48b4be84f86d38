//! User account management (admin only)
//!
//! Passwords go in, digests are stored, and neither ever comes back out:
//! every response is built from [`UserView`].

use bson::{doc, Document};
use bytes::Bytes;
use hyper::body::Body;
use hyper::{Request, Response, StatusCode};
use serde::Deserialize;
use tracing::info;
use utoipa::ToSchema;

use crate::auth::{hash_password_blocking, Role};
use crate::db::mongo::parse_object_id;
use crate::db::on_duplicate;
use crate::db::schemas::{UserDoc, UserView};
use crate::routes::response::{
    json_response, message_response, parse_json_body, ErrorResponse, FullBody, MessageResponse,
};
use crate::server::AppState;
use crate::types::UkmError;
use crate::validation::{
    validate_email, validate_length, validate_min_length, validate_one_of, validate_required,
    ValidationResult, NAMA_MAX_LEN, NAMA_MIN_LEN, PASSWORD_MIN_LEN,
};

#[derive(Debug, Deserialize, Default, ToSchema)]
#[serde(default)]
pub struct UserRequest {
    pub nama: String,
    pub email: String,
    pub password: String,
    pub role: String,
    pub ukm: String,
}

impl UserRequest {
    fn validate_profile(&self) -> ValidationResult {
        validate_length("nama", &self.nama, NAMA_MIN_LEN, NAMA_MAX_LEN)?;
        validate_email("email", &self.email)?;
        validate_one_of("role", &self.role, &Role::ALL)?;
        validate_required("ukm", &self.ukm)
    }

    fn validate_create(&self) -> ValidationResult {
        self.validate_profile()?;
        validate_min_length("password", &self.password, PASSWORD_MIN_LEN)
    }

    /// On update the password is optional; an empty one keeps the stored digest.
    fn validate_update(&self) -> ValidationResult {
        self.validate_profile()?;
        if !self.password.is_empty() {
            validate_min_length("password", &self.password, PASSWORD_MIN_LEN)?;
        }
        Ok(())
    }

    fn role(&self) -> Result<Role, UkmError> {
        self.role.parse().map_err(UkmError::BadRequest)
    }
}

const EMAIL_TAKEN: &str = "Email already exists";

fn user_not_found() -> UkmError {
    UkmError::NotFound("User not found".into())
}

/// GET /users
#[utoipa::path(
    get,
    path = "/users",
    tag = "users",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Every account, without password digests", body = [UserView]),
        (status = 403, description = "Admin only", body = ErrorResponse)
    )
)]
pub async fn list_users(state: &AppState) -> Result<Response<FullBody>, UkmError> {
    let users = state.stores()?.users.find_many(doc! {}).await?;
    let views: Vec<UserView> = users.iter().map(UserDoc::view).collect();
    Ok(json_response(StatusCode::OK, &views))
}

/// GET /users/{id}
#[utoipa::path(
    get,
    path = "/users/{id}",
    tag = "users",
    security(("bearer_auth" = [])),
    params(("id" = String, Path, description = "User ObjectId (hex)")),
    responses(
        (status = 200, description = "The account", body = UserView),
        (status = 404, description = "User not found", body = ErrorResponse)
    )
)]
pub async fn get_user(state: &AppState, id: &str) -> Result<Response<FullBody>, UkmError> {
    let users = &state.stores()?.users;
    let id = parse_object_id(id)?;

    let user = users.find_by_id(id).await?.ok_or_else(user_not_found)?;

    Ok(json_response(StatusCode::OK, &user.view()))
}

/// POST /users
#[utoipa::path(
    post,
    path = "/users",
    tag = "users",
    security(("bearer_auth" = [])),
    request_body = UserRequest,
    responses(
        (status = 201, description = "Created account", body = UserView),
        (status = 400, description = "Validation failed or email already exists", body = ErrorResponse)
    )
)]
pub async fn create_user<B>(state: &AppState, req: Request<B>) -> Result<Response<FullBody>, UkmError>
where
    B: Body<Data = Bytes>,
    B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    let users = &state.stores()?.users;
    let body: UserRequest = parse_json_body(req).await?;
    body.validate_create()?;
    let role = body.role()?;

    if users.find_one(doc! { "email": &body.email }).await?.is_some() {
        return Err(UkmError::BadRequest(EMAIL_TAKEN.into()));
    }

    let password_hash = hash_password_blocking(body.password).await?;
    let mut user = UserDoc::new(body.nama, body.email, password_hash, role, body.ukm);
    let id = users
        .insert_one(user.clone())
        .await
        .map_err(on_duplicate(EMAIL_TAKEN))?;
    user._id = Some(id);

    info!("Created {} account {} ({})", role, user.email, id);
    Ok(json_response(StatusCode::CREATED, &user.view()))
}

/// PUT /users/{id}
///
/// An empty password keeps the stored digest.
#[utoipa::path(
    put,
    path = "/users/{id}",
    tag = "users",
    security(("bearer_auth" = [])),
    params(("id" = String, Path, description = "User ObjectId (hex)")),
    request_body = UserRequest,
    responses(
        (status = 200, description = "User updated successfully", body = MessageResponse),
        (status = 400, description = "Validation failed or email already exists", body = ErrorResponse),
        (status = 404, description = "User not found", body = ErrorResponse)
    )
)]
pub async fn update_user<B>(
    state: &AppState,
    id: &str,
    req: Request<B>,
) -> Result<Response<FullBody>, UkmError>
where
    B: Body<Data = Bytes>,
    B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    let users = &state.stores()?.users;
    let id = parse_object_id(id)?;
    let body: UserRequest = parse_json_body(req).await?;
    body.validate_update()?;
    let role = body.role()?;

    let taken = users
        .find_one(doc! { "email": &body.email, "_id": { "$ne": id } })
        .await?;
    if taken.is_some() {
        return Err(UkmError::BadRequest(EMAIL_TAKEN.into()));
    }

    let mut fields: Document = doc! {
        "nama": &body.nama,
        "email": &body.email,
        "role": role.as_str(),
        "ukm": &body.ukm,
    };

    if !body.password.is_empty() {
        fields.insert("password", hash_password_blocking(body.password).await?);
    }

    let matched = users
        .set_fields(id, fields)
        .await
        .map_err(on_duplicate(EMAIL_TAKEN))?;
    if !matched {
        return Err(user_not_found());
    }

    Ok(message_response(StatusCode::OK, "User updated successfully"))
}

/// DELETE /users/{id}
#[utoipa::path(
    delete,
    path = "/users/{id}",
    tag = "users",
    security(("bearer_auth" = [])),
    params(("id" = String, Path, description = "User ObjectId (hex)")),
    responses(
        (status = 200, description = "User deleted successfully", body = MessageResponse),
        (status = 404, description = "User not found", body = ErrorResponse)
    )
)]
pub async fn delete_user(state: &AppState, id: &str) -> Result<Response<FullBody>, UkmError> {
    let users = &state.stores()?.users;
    let id = parse_object_id(id)?;

    if !users.delete_by_id(id).await? {
        return Err(user_not_found());
    }

    info!("Deleted user {}", id);
    Ok(message_response(StatusCode::OK, "User deleted successfully"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> UserRequest {
        UserRequest {
            nama: "Sari".into(),
            email: "sari@ukm.com".into(),
            password: "rahasia".into(),
            role: "member".into(),
            ukm: "UKM Tari".into(),
        }
    }

    #[test]
    fn test_create_requires_password() {
        let mut body = request();
        assert!(body.validate_create().is_ok());

        body.password.clear();
        assert_eq!(body.validate_create().unwrap_err().field, "password");
    }

    #[test]
    fn test_update_password_is_optional() {
        let mut body = request();
        body.password.clear();
        assert!(body.validate_update().is_ok());

        body.password = "123".into();
        assert_eq!(body.validate_update().unwrap_err().field, "password");
    }

    #[test]
    fn test_role_must_be_known() {
        let mut body = request();
        body.role = "superadmin".into();
        let err = body.validate_create().unwrap_err();
        assert_eq!(err.field, "role");
        assert_eq!(err.message, "must be one of: admin, member");

        body.role = "admin".into();
        assert_eq!(body.role().unwrap(), Role::Admin);
    }
}
