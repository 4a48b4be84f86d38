//! Request gates
//!
//! The authentication gate turns a bearer token into [`Claims`] stored in the
//! request's extensions. The authorization gate reads them back and checks the
//! role. Routes go through [`Gates::admit`], which always runs the two in that
//! order.

use hyper::header::AUTHORIZATION;
use hyper::Request;
use std::sync::Arc;
use tracing::debug;

use crate::auth::{extract_bearer_token, AuthError, Claims, PermissionLevel, Role, TokenService};

/// Claims published by the authentication gate for this request, if any.
pub fn identity<B>(req: &Request<B>) -> Option<&Claims> {
    req.extensions().get::<Claims>()
}

/// Requires a valid bearer token
#[derive(Debug, Clone)]
pub struct AuthenticationGate {
    tokens: Arc<TokenService>,
}

impl AuthenticationGate {
    pub fn new(tokens: Arc<TokenService>) -> Self {
        Self { tokens }
    }

    /// Verify the bearer token and attach its claims to the request
    pub fn authenticate<B>(&self, req: &mut Request<B>) -> Result<Claims, AuthError> {
        let header = req
            .headers()
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok());

        let token = extract_bearer_token(header).ok_or(AuthError::MissingCredential)?;
        let claims = self.tokens.verify(token)?;

        debug!(sub = %claims.subject_id, role = %claims.role, "Request authenticated");
        req.extensions_mut().insert(claims.clone());

        Ok(claims)
    }
}

/// Requires the authenticated identity to hold a given role
#[derive(Debug, Clone, Copy)]
pub struct AuthorizationGate {
    required: Role,
}

impl AuthorizationGate {
    pub fn new(required: Role) -> Self {
        Self { required }
    }

    pub fn admin() -> Self {
        Self::new(Role::Admin)
    }

    /// Fails closed: a request that never passed authentication is rejected as 401.
    pub fn authorize<'r, B>(&self, req: &'r Request<B>) -> Result<&'r Claims, AuthError> {
        let claims = identity(req).ok_or(AuthError::Unauthenticated)?;

        if claims.role != self.required {
            return Err(AuthError::Forbidden);
        }

        Ok(claims)
    }
}

/// Both gates, composed in the only order they are allowed to run
#[derive(Debug, Clone)]
pub struct Gates {
    authentication: AuthenticationGate,
    authorization: AuthorizationGate,
}

impl Gates {
    pub fn new(tokens: Arc<TokenService>) -> Self {
        Self {
            authentication: AuthenticationGate::new(tokens),
            authorization: AuthorizationGate::admin(),
        }
    }

    /// Admit a request at the given level.
    ///
    /// Returns the published claims for protected levels and `None` for public routes.
    pub fn admit<B>(
        &self,
        level: PermissionLevel,
        req: &mut Request<B>,
    ) -> Result<Option<Claims>, AuthError> {
        match level {
            PermissionLevel::Public => Ok(None),
            PermissionLevel::Authenticated => self.authentication.authenticate(req).map(Some),
            PermissionLevel::Admin => {
                self.authentication.authenticate(req)?;
                self.authorization.authorize(req).cloned().map(Some)
            }
        }
    }
}
