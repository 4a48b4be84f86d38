//! Error types for the UKM backend
//!
//! Every error knows its HTTP status and the message that is safe to show a
//! client. Internal details stay in the `Display` output, which only goes to logs.

use hyper::StatusCode;

use crate::auth::AuthError;
use crate::validation::ValidationError;

/// Main error type for UKM backend operations
#[derive(Debug, thiserror::Error)]
pub enum UkmError {
    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// A unique index rejected the write
    #[error("Duplicate key: {0}")]
    DuplicateKey(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Service unavailable: {0}")]
    Unavailable(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("HTTP error: {0}")]
    Http(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Authentication error: {0}")]
    Auth(#[from] AuthError),
}

impl UkmError {
    /// Convert error to HTTP status code
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::DuplicateKey(_) => StatusCode::BAD_REQUEST,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            Self::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Http(_) => StatusCode::BAD_REQUEST,
            Self::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Auth(err) => err.status_code(),
        }
    }

    /// Message returned in the `{"error": ...}` body.
    ///
    /// Database, internal and configuration failures collapse to a generic
    /// message; auth failures defer to [`AuthError::public_message`].
    pub fn public_message(&self) -> String {
        match self {
            Self::BadRequest(msg)
            | Self::Unauthorized(msg)
            | Self::NotFound(msg)
            | Self::Unavailable(msg)
            | Self::Http(msg) => msg.clone(),
            Self::DuplicateKey(_) => "Duplicate value".to_string(),
            Self::Database(_) => "Database error".to_string(),
            Self::Internal(_) | Self::Config(_) => "Internal server error".to_string(),
            Self::Auth(err) => err.public_message().to_string(),
        }
    }
}

impl From<std::io::Error> for UkmError {
    fn from(err: std::io::Error) -> Self {
        Self::Internal(err.to_string())
    }
}

/// MongoDB server code for a unique index violation
const DUPLICATE_KEY_CODE: i32 = 11000;

impl From<mongodb::error::Error> for UkmError {
    fn from(err: mongodb::error::Error) -> Self {
        use mongodb::error::{ErrorKind, WriteFailure};

        match err.kind.as_ref() {
            ErrorKind::Write(WriteFailure::WriteError(write)) if write.code == DUPLICATE_KEY_CODE => {
                Self::DuplicateKey(write.message.clone())
            }
            _ => Self::Database(err.to_string()),
        }
    }
}

impl From<bson::ser::Error> for UkmError {
    fn from(err: bson::ser::Error) -> Self {
        Self::Internal(format!("BSON encoding failed: {}", err))
    }
}

impl From<ValidationError> for UkmError {
    fn from(err: ValidationError) -> Self {
        Self::BadRequest(err.to_string())
    }
}
