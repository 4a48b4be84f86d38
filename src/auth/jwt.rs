//! JWT issuance and verification
//!
//! Security notes:
//! - Tokens are signed with HS256 (HMAC-SHA256)
//! - Every token lives exactly 24 hours; there is no refresh and no revocation
//! - The secret comes from configuration at startup and must be at least 32 bytes

use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::{SystemTime, UNIX_EPOCH};

use crate::auth::{AuthError, Role};
use crate::types::UkmError;

/// Fixed token lifetime
pub const TOKEN_TTL_SECONDS: u64 = 24 * 60 * 60;

pub const MIN_SECRET_LEN: usize = 32;

/// Payload stored in JWT token
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// User document id (ObjectId hex)
    #[serde(rename = "sub")]
    pub subject_id: String,
    pub email: String,
    pub role: Role,
    /// Issued at (Unix timestamp)
    pub iat: u64,
    /// Expiration time (Unix timestamp)
    pub exp: u64,
}

impl Claims {
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

/// Issues and verifies identity tokens with one process-wide secret
#[derive(Clone)]
pub struct TokenService {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
}

impl fmt::Debug for TokenService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenService").finish_non_exhaustive()
    }
}

impl TokenService {
    /// Create a token service from the signing secret
    ///
    /// Returns an error if the secret is empty or too short
    pub fn new(secret: &str) -> Result<Self, UkmError> {
        if secret.is_empty() {
            return Err(UkmError::Config("JWT_SECRET is required".into()));
        }

        if secret.len() < MIN_SECRET_LEN {
            return Err(UkmError::Config(format!(
                "JWT_SECRET must be at least {} characters",
                MIN_SECRET_LEN
            )));
        }

        // Expiry is checked by hand so the boundary is strict and the clock injectable.
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        validation.leeway = 0;

        Ok(Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            validation,
        })
    }

    /// Issue a token valid for [`TOKEN_TTL_SECONDS`] from now
    pub fn issue(&self, subject_id: &str, email: &str, role: Role) -> Result<String, UkmError> {
        self.issue_at(subject_id, email, role, unix_now()?)
    }

    pub fn issue_at(
        &self,
        subject_id: &str,
        email: &str,
        role: Role,
        issued_at: u64,
    ) -> Result<String, UkmError> {
        let claims = Claims {
            subject_id: subject_id.to_string(),
            email: email.to_string(),
            role,
            iat: issued_at,
            exp: issued_at + TOKEN_TTL_SECONDS,
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|e| UkmError::Internal(format!("Failed to generate token: {}", e)))
    }

    /// Verify and decode a token against the current time
    pub fn verify(&self, token: &str) -> Result<Claims, AuthError> {
        let now = unix_now().map_err(|_| AuthError::Expired)?;
        self.verify_at(token, now)
    }

    /// Verify and decode a token as if the current time were `now`
    pub fn verify_at(&self, token: &str, now: u64) -> Result<Claims, AuthError> {
        use jsonwebtoken::errors::ErrorKind;

        let data = decode::<Claims>(token, &self.decoding, &self.validation).map_err(|err| {
            match err.kind() {
                ErrorKind::InvalidSignature => AuthError::InvalidSignature,
                ErrorKind::ExpiredSignature => AuthError::Expired,
                _ => AuthError::Malformed,
            }
        })?;

        if now >= data.claims.exp {
            return Err(AuthError::Expired);
        }

        Ok(data.claims)
    }
}

/// Current Unix time in seconds
pub fn unix_now() -> Result<u64, UkmError> {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .map_err(|e| UkmError::Internal(format!("System time error: {}", e)))
}

/// Extract the token from an `Authorization: Bearer <token>` header value.
pub fn extract_bearer_token(auth_header: Option<&str>) -> Option<&str> {
    let header = auth_header?.trim();
    let (scheme, token) = header.split_once(' ')?;

    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }

    let token = token.trim();
    if token.is_empty() || token.contains(' ') {
        return None;
    }

    Some(token)
}

#[cfg(test)]
mod tests {
    use super::*;
    use base64::engine::general_purpose::URL_SAFE_NO_PAD;
    use base64::Engine;

    const SECRET: &str = "test-secret-that-is-at-least-32-characters-long";

    fn test_service() -> TokenService {
        TokenService::new(SECRET).unwrap()
    }

    fn flip_signature_bit(token: &str) -> String {
        let (message, signature) = token.rsplit_once('.').unwrap();
        let mut bytes = URL_SAFE_NO_PAD.decode(signature).unwrap();
        bytes[0] ^= 0x01;
        format!("{}.{}", message, URL_SAFE_NO_PAD.encode(bytes))
    }

    #[test]
    fn test_issue_and_verify_round_trip() {
        let service = test_service();

        let token = service
            .issue("665f1c2ab0d4e3a1f0c9b871", "rina@kampus.ac.id", Role::Member)
            .unwrap();
        assert_eq!(token.split('.').count(), 3);

        let claims = service.verify(&token).unwrap();
        assert_eq!(claims.subject_id, "665f1c2ab0d4e3a1f0c9b871");
        assert_eq!(claims.email, "rina@kampus.ac.id");
        assert_eq!(claims.role, Role::Member);
        assert_eq!(claims.exp - claims.iat, TOKEN_TTL_SECONDS);
    }

    #[test]
    fn test_expiry_boundary_is_strict() {
        let service = test_service();
        let issued_at = 1_700_000_000;
        let token = service
            .issue_at("id-1", "admin@ukm.com", Role::Admin, issued_at)
            .unwrap();

        assert!(service.verify_at(&token, issued_at).is_ok());
        assert!(service.verify_at(&token, issued_at + TOKEN_TTL_SECONDS - 1).is_ok());
        assert_eq!(
            service.verify_at(&token, issued_at + TOKEN_TTL_SECONDS),
            Err(AuthError::Expired)
        );
        assert_eq!(
            service.verify_at(&token, issued_at + TOKEN_TTL_SECONDS + 1),
            Err(AuthError::Expired)
        );
    }

    #[test]
    fn test_expired_against_wall_clock() {
        let service = test_service();
        let long_ago = unix_now().unwrap() - TOKEN_TTL_SECONDS - 5;
        let token = service
            .issue_at("id-1", "admin@ukm.com", Role::Admin, long_ago)
            .unwrap();

        assert_eq!(service.verify(&token), Err(AuthError::Expired));
    }

    #[test]
    fn test_flipped_signature_bit() {
        let service = test_service();
        let token = service.issue("id-1", "admin@ukm.com", Role::Admin).unwrap();

        let tampered = flip_signature_bit(&token);
        assert_ne!(tampered, token);
        assert_eq!(service.verify(&tampered), Err(AuthError::InvalidSignature));
    }

    #[test]
    fn test_wrong_secret() {
        let issuer = test_service();
        let other = TokenService::new("different-secret-that-is-at-least-32-characters").unwrap();

        let token = issuer.issue("id-1", "admin@ukm.com", Role::Admin).unwrap();
        assert_eq!(other.verify(&token), Err(AuthError::InvalidSignature));
    }

    #[test]
    fn test_malformed_tokens() {
        let service = test_service();

        assert_eq!(service.verify("invalid-token"), Err(AuthError::Malformed));
        assert_eq!(service.verify(""), Err(AuthError::Malformed));
        assert_eq!(service.verify("a.b.c"), Err(AuthError::Malformed));
    }

    #[test]
    fn test_other_algorithm_rejected() {
        let service = test_service();
        let claims = Claims {
            subject_id: "id-1".into(),
            email: "admin@ukm.com".into(),
            role: Role::Admin,
            iat: unix_now().unwrap(),
            exp: unix_now().unwrap() + 60,
        };
        let token = encode(
            &Header::new(Algorithm::HS512),
            &claims,
            &EncodingKey::from_secret(SECRET.as_bytes()),
        )
        .unwrap();

        assert!(service.verify(&token).is_err());
    }

    #[test]
    fn test_secret_validation() {
        assert!(matches!(TokenService::new(""), Err(UkmError::Config(_))));
        assert!(matches!(TokenService::new("short"), Err(UkmError::Config(_))));
        assert!(TokenService::new("this-secret-is-at-least-32-chars-long").is_ok());
    }

    #[test]
    fn test_extract_bearer_token() {
        assert_eq!(extract_bearer_token(Some("Bearer abc123")), Some("abc123"));
        assert_eq!(extract_bearer_token(Some("bearer abc123")), Some("abc123"));

        assert_eq!(extract_bearer_token(None), None);
        assert_eq!(extract_bearer_token(Some("")), None);
        assert_eq!(extract_bearer_token(Some("Bearer ")), None);
        assert_eq!(extract_bearer_token(Some("abc123")), None);
        assert_eq!(extract_bearer_token(Some("Basic abc123")), None);
        assert_eq!(extract_bearer_token(Some("Bearer abc 123")), None);
    }
}
