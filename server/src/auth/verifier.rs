use std::sync::Arc;
use std::time::SystemTime;

use jsonwebtoken::errors::{Error as JwtError, ErrorKind};
use jsonwebtoken::{Algorithm, Validation};
use tracing::debug;

use shared::types::{RoleSet, TokenPayload};

use crate::auth::error::AuthError;
use crate::auth::{KeyManager, jwe, unix_seconds};

/// Opens tokens minted by [`crate::auth::TokenIssuer`] and returns the
/// embedded role set.
///
/// Order of checks: envelope structure, decryption, signature, payload
/// decoding, expiry. Roles are read only after the signature has verified,
/// and the clock is consulted only for an authenticated payload.
#[derive(Debug, Clone)]
pub struct TokenVerifier {
    keys: Arc<KeyManager>,
    validation: Validation,
}

impl TokenVerifier {
    pub fn new(keys: Arc<KeyManager>) -> Self {
        let mut validation = Validation::new(Algorithm::PS512);
        // Expiry is checked in `verify_at` against the caller's clock.
        validation.validate_exp = false;
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp", "iss", "sub"]);

        Self { keys, validation }
    }

    pub fn verify(&self, token: &str) -> Result<RoleSet, AuthError> {
        self.verify_at(token, SystemTime::now())
    }

    /// Verify `token` as if the current time were `now`.
    pub fn verify_at(&self, token: &str, now: SystemTime) -> Result<RoleSet, AuthError> {
        let nested = jwe::decrypt(token, self.keys.decryption_key())?;
        let nested = String::from_utf8(nested)
            .map_err(|_| AuthError::TokenParse("nested token is not UTF-8".into()))?;

        let data = jsonwebtoken::decode::<TokenPayload>(
            &nested,
            self.keys.verifying_key(),
            &self.validation,
        )
        .map_err(map_jwt_error)?;

        let payload = data.claims;
        let now = unix_seconds(now);
        if payload.claims.exp <= now {
            debug!(
                "Token for {} expired at {} (now {})",
                payload.claims.sub, payload.claims.exp, now
            );
            return Err(AuthError::TokenExpired);
        }

        Ok(payload.user.roles)
    }
}

fn map_jwt_error(err: JwtError) -> AuthError {
    match err.kind() {
        ErrorKind::InvalidSignature | ErrorKind::InvalidAlgorithm | ErrorKind::MissingAlgorithm => {
            AuthError::SignatureInvalid
        }
        _ => AuthError::TokenParse(err.to_string()),
    }
}
