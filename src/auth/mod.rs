//! Authentication and authorization for the UKM backend
//!
//! Provides:
//! - Password hashing with Argon2
//! - JWT token issuance and verification
//! - Roles, permission levels and the operation access table
//! - The authentication and authorization gates

pub mod credentials;
pub mod error;
pub mod gate;
pub mod jwt;
pub mod password;
pub mod permissions;

pub use credentials::{CredentialStore, UserCredentialStore, StoredAccount};
pub use error::AuthError;
pub use gate::{identity, AuthenticationGate, AuthorizationGate, Gates};
pub use jwt::{extract_bearer_token, unix_now, Claims, TokenService, TOKEN_TTL_SECONDS};
pub use password::{hash_password, hash_password_blocking, verify_password, verify_password_blocking};
pub use permissions::{Operation, PermissionLevel, Role};
