//! Failure taxonomy for the authentication and authorization gates

use hyper::StatusCode;

/// Why a request was refused by a gate, or why a credential operation failed.
///
/// The variants are precise for logging. Clients only ever see
/// [`AuthError::public_message`], which does not distinguish a forged token from an
/// expired or garbled one.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AuthError {
    #[error("missing or malformed Authorization header")]
    MissingCredential,

    #[error("token could not be parsed")]
    Malformed,

    #[error("token signature does not match")]
    InvalidSignature,

    #[error("token has expired")]
    Expired,

    #[error("no authenticated identity on request")]
    Unauthenticated,

    #[error("role is not permitted for this route")]
    Forbidden,

    #[error("password hashing failed: {0}")]
    HashingFailure(String),
}

impl AuthError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Forbidden => StatusCode::FORBIDDEN,
            Self::HashingFailure(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::MissingCredential
            | Self::Malformed
            | Self::InvalidSignature
            | Self::Expired
            | Self::Unauthenticated => StatusCode::UNAUTHORIZED,
        }
    }

    pub fn public_message(&self) -> &'static str {
        match self {
            Self::Forbidden => "Admin only",
            Self::HashingFailure(_) => "Internal server error",
            Self::MissingCredential
            | Self::Malformed
            | Self::InvalidSignature
            | Self::Expired
            | Self::Unauthenticated => "Unauthorized",
        }
    }
}
