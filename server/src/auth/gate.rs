//! Per-request authorization decision.
//!
//! 1. `GET` is always allowed.
//! 2. Anything else needs `Authorization: <scheme> <token>`.
//! 3. The token must verify; the reason for a failure is logged, not returned.
//! 4. `Admin` may use every verb.
//! 5. Otherwise `POST` needs `Add`, `PUT`/`DELETE` need `Edit`, and every
//!    other verb is refused.

use std::sync::Arc;

use hyper::Method;
use hyper::header::{AUTHORIZATION, HeaderMap, HeaderValue};
use tracing::{debug, warn};

use shared::types::{Role, RoleSet};

use crate::auth::error::AuthError;
use crate::auth::TokenVerifier;

/// The verbs the policy distinguishes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Verb {
    Read,
    Create,
    Modify,
    Other,
}

impl From<&Method> for Verb {
    fn from(method: &Method) -> Self {
        match *method {
            Method::GET => Verb::Read,
            Method::POST => Verb::Create,
            Method::PUT | Method::DELETE => Verb::Modify,
            _ => Verb::Other,
        }
    }
}

/// Extract the credential from an `Authorization` header value.
///
/// The value must be exactly two non-empty fields separated by a single
/// space. The scheme is not interpreted.
pub fn bearer_credential(header: Option<&HeaderValue>) -> Result<&str, AuthError> {
    let value = header
        .ok_or(AuthError::MalformedAuthHeader)?
        .to_str()
        .map_err(|_| AuthError::MalformedAuthHeader)?;

    match value.split(' ').collect::<Vec<_>>()[..] {
        [scheme, token] if !scheme.is_empty() && !token.is_empty() => Ok(token),
        _ => Err(AuthError::MalformedAuthHeader),
    }
}

/// Decide whether `roles` may perform `method`.
pub fn authorize(method: &Method, roles: RoleSet) -> Result<(), AuthError> {
    let verb = Verb::from(method);
    if verb == Verb::Read || roles.contains(Role::Admin) {
        return Ok(());
    }

    let required = match verb {
        Verb::Read => return Ok(()),
        Verb::Create => Role::Add,
        Verb::Modify => Role::Edit,
        Verb::Other => return Err(AuthError::InsufficientRole),
    };

    if roles.contains(required) {
        Ok(())
    } else {
        Err(AuthError::InsufficientRole)
    }
}

/// Header parsing, token verification and [`authorize`] in one call.
#[derive(Debug, Clone)]
pub struct AuthGate {
    verifier: Arc<TokenVerifier>,
}

impl AuthGate {
    pub fn new(verifier: Arc<TokenVerifier>) -> Self {
        Self { verifier }
    }

    pub fn check(&self, method: &Method, headers: &HeaderMap) -> Result<(), AuthError> {
        if Verb::from(method) == Verb::Read {
            return Ok(());
        }

        let token = bearer_credential(headers.get(AUTHORIZATION)).inspect_err(|_| {
            warn!("Rejected {}: invalid Authorization header", method);
        })?;

        let roles = self.verifier.verify(token).inspect_err(|e| {
            warn!("Rejected {}: {}", method, e);
        })?;

        authorize(method, roles).inspect_err(|_| {
            warn!("Rejected {}: roles {} not sufficient", method, roles);
        })?;

        debug!("Allowed {} for roles {}", method, roles);
        Ok(())
    }
}
