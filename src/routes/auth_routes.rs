//! Registration, login and current-identity routes
//!
//! - `POST /register` creates a member account
//! - `POST /login` exchanges email and password for a 24h token
//! - `GET /me` echoes the caller's verified claims

use bson::doc;
use bytes::Bytes;
use hyper::body::Body;
use hyper::{Request, Response, StatusCode};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use utoipa::ToSchema;

use crate::auth::{
    hash_password_blocking, unix_now, verify_password_blocking, Claims, Role, StoredAccount,
    TOKEN_TTL_SECONDS,
};
use crate::db::on_duplicate;
use crate::db::schemas::UserDoc;
use crate::routes::response::{
    json_response, message_response, parse_json_body, ErrorResponse, FullBody, MessageResponse,
};
use crate::server::AppState;
use crate::types::UkmError;
use crate::validation::{
    validate_email, validate_length, validate_min_length, validate_required, ValidationResult,
    NAMA_MAX_LEN, NAMA_MIN_LEN, PASSWORD_MIN_LEN,
};

const INVALID_LOGIN: &str = "Invalid email or password";
const EMAIL_REGISTERED: &str = "Email already registered";

#[derive(Debug, Deserialize, Default, ToSchema)]
#[serde(default)]
pub struct RegisterRequest {
    pub nama: String,
    pub email: String,
    pub password: String,
    pub ukm: String,
}

impl RegisterRequest {
    fn validate(&self) -> ValidationResult {
        validate_length("nama", &self.nama, NAMA_MIN_LEN, NAMA_MAX_LEN)?;
        validate_email("email", &self.email)?;
        validate_min_length("password", &self.password, PASSWORD_MIN_LEN)?;
        validate_required("ukm", &self.ukm)
    }
}

#[derive(Debug, Deserialize, Default, ToSchema)]
#[serde(default)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

impl LoginRequest {
    fn validate(&self) -> ValidationResult {
        validate_required("email", &self.email)?;
        validate_email("email", &self.email)?;
        validate_required("password", &self.password)?;
        validate_min_length("password", &self.password, PASSWORD_MIN_LEN)
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct LoginUser {
    pub id: String,
    pub name: String,
    pub email: String,
    pub role: Role,
    pub ukm: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct LoginResponse {
    pub token: String,
    /// Unix seconds
    pub expires_at: u64,
    pub user: LoginUser,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct MeResponse {
    pub id: String,
    pub email: String,
    pub role: Role,
    pub expires_at: u64,
}

/// POST /register
///
/// The role of a self-registered account is always `member`; admins are
/// created through `POST /users` or the startup seed.
#[utoipa::path(
    post,
    path = "/register",
    tag = "auth",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "User registered successfully", body = MessageResponse),
        (status = 400, description = "Validation failed, email taken or unknown ukm", body = ErrorResponse)
    )
)]
pub async fn handle_register<B>(state: &AppState, req: Request<B>) -> Result<Response<FullBody>, UkmError>
where
    B: Body<Data = Bytes>,
    B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    let stores = state.stores()?;
    let body: RegisterRequest = parse_json_body(req).await?;
    body.validate()?;

    if stores.users.find_one(doc! { "email": &body.email }).await?.is_some() {
        return Err(UkmError::BadRequest(EMAIL_REGISTERED.into()));
    }

    if stores
        .kategori
        .find_one(doc! { "nama_kategori": &body.ukm })
        .await?
        .is_none()
    {
        return Err(UkmError::BadRequest(
            "ukm: must match an existing kategori".into(),
        ));
    }

    let password_hash = hash_password_blocking(body.password).await?;
    let user = UserDoc::new(body.nama, body.email, password_hash, Role::Member, body.ukm);
    let email = user.email.clone();
    let id = stores
        .users
        .insert_one(user)
        .await
        .map_err(on_duplicate(EMAIL_REGISTERED))?;

    info!("Registered member {} ({})", email, id);
    Ok(message_response(StatusCode::CREATED, "User registered successfully"))
}

/// POST /login
#[utoipa::path(
    post,
    path = "/login",
    tag = "auth",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Signed token and the account", body = LoginResponse),
        (status = 400, description = "Validation failed", body = ErrorResponse),
        (status = 401, description = "Invalid email or password", body = ErrorResponse)
    )
)]
pub async fn handle_login<B>(state: &AppState, req: Request<B>) -> Result<Response<FullBody>, UkmError>
where
    B: Body<Data = Bytes>,
    B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    let store = state.credentials()?;
    let body: LoginRequest = parse_json_body(req).await?;
    body.validate()?;

    let account: StoredAccount = match store.find_by_email(&body.email).await? {
        Some(account) => account,
        None => {
            debug!("Login failed: unknown email");
            return Err(UkmError::Unauthorized(INVALID_LOGIN.into()));
        }
    };

    if !verify_password_blocking(body.password, account.password_hash.clone()).await? {
        debug!("Login failed: wrong password for {}", account.subject_id);
        return Err(UkmError::Unauthorized(INVALID_LOGIN.into()));
    }

    let issued_at = unix_now()?;
    let token = state
        .tokens
        .issue_at(&account.subject_id, &account.email, account.role, issued_at)?;

    info!("User {} logged in as {}", account.subject_id, account.role);

    Ok(json_response(
        StatusCode::OK,
        &LoginResponse {
            token,
            expires_at: issued_at + TOKEN_TTL_SECONDS,
            user: LoginUser {
                id: account.subject_id,
                name: account.nama,
                email: account.email,
                role: account.role,
                ukm: account.ukm,
            },
        },
    ))
}

/// GET /me
#[utoipa::path(
    get,
    path = "/me",
    tag = "auth",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "The caller's verified claims", body = MeResponse),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse)
    )
)]
pub fn handle_me(claims: &Claims) -> Response<FullBody> {
    json_response(
        StatusCode::OK,
        &MeResponse {
            id: claims.subject_id.clone(),
            email: claims.email.clone(),
            role: claims.role,
            expires_at: claims.exp,
        },
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_validation() {
        let mut body = RegisterRequest {
            nama: "Rina Wulandari".into(),
            email: "rina@kampus.ac.id".into(),
            password: "rahasia".into(),
            ukm: "UKM Musik".into(),
        };
        assert!(body.validate().is_ok());

        body.password = "12345".into();
        assert_eq!(body.validate().unwrap_err().field, "password");

        body.password = "123456".into();
        body.nama = "R".into();
        assert_eq!(body.validate().unwrap_err().field, "nama");

        body.nama = "Rina".into();
        body.email = "rina".into();
        assert_eq!(body.validate().unwrap_err().field, "email");

        body.email = "rina@kampus.ac.id".into();
        body.ukm = " ".into();
        assert_eq!(body.validate().unwrap_err().field, "ukm");
    }

    #[test]
    fn test_register_ignores_role_field() {
        let body: RegisterRequest = serde_json::from_value(serde_json::json!({
            "nama": "Budi",
            "email": "budi@ukm.com",
            "password": "rahasia",
            "ukm": "UKM Futsal",
            "role": "admin"
        }))
        .unwrap();
        assert_eq!(body.email, "budi@ukm.com");
    }

    #[test]
    fn test_login_requires_both_fields() {
        let body = LoginRequest {
            email: "admin@ukm.com".into(),
            password: String::new(),
        };
        assert_eq!(body.validate().unwrap_err().field, "password");
    }

    #[test]
    fn test_login_checks_email_format_and_password_length() {
        let mut body = LoginRequest {
            email: "admin".into(),
            password: "admin123".into(),
        };
        let err = body.validate().unwrap_err();
        assert_eq!(err.field, "email");

        body.email = "admin@ukm.com".into();
        body.password = "12345".into();
        assert_eq!(body.validate().unwrap_err().field, "password");

        body.password = "123456".into();
        assert!(body.validate().is_ok());
    }
}
