use std::sync::Arc;
use std::time::{Duration, SystemTime};

use jsonwebtoken::{Algorithm, Header};
use tracing::{debug, warn};

use shared::types::{Claims, TokenPayload, TokenUser};

use crate::auth::error::AuthError;
use crate::auth::{CredentialStore, KeyManager, jwe, unix_seconds};

/// Authenticates username/password pairs and mints session tokens.
///
/// A token is a PS512-signed JWT carrying [`TokenPayload`], encrypted as a
/// compact JWE under the encryption key. Nothing is recorded server-side.
#[derive(Debug, Clone)]
pub struct TokenIssuer {
    credentials: Arc<CredentialStore>,
    keys: Arc<KeyManager>,
    issuer: String,
}

impl TokenIssuer {
    pub fn new(
        credentials: Arc<CredentialStore>,
        keys: Arc<KeyManager>,
        issuer: impl Into<String>,
    ) -> Self {
        Self {
            credentials,
            keys,
            issuer: issuer.into(),
        }
    }

    pub fn issuer(&self) -> &str {
        &self.issuer
    }

    /// Issue a token valid for `ttl` from now.
    ///
    /// `exp` is stored in whole seconds, rounded down, so the effective
    /// lifetime lies in `(ttl - 1s, ttl]` depending on the sub-second part of
    /// the issue time.
    pub fn issue(&self, username: &str, password: &str, ttl: Duration) -> Result<String, AuthError> {
        self.issue_at(username, password, ttl, SystemTime::now())
    }

    /// Issue a token as if the current time were `now`.
    pub fn issue_at(
        &self,
        username: &str,
        password: &str,
        ttl: Duration,
        now: SystemTime,
    ) -> Result<String, AuthError> {
        let user = self.credentials.lookup(username).ok_or_else(|| {
            warn!("Token requested for unknown user: {}", username);
            AuthError::UserNotFound
        })?;

        if !user.password_matches(password) {
            warn!("Invalid password for user: {}", username);
            return Err(AuthError::BadPassword);
        }

        let expiry = now
            .checked_add(ttl)
            .ok_or_else(|| AuthError::TokenBuild("ttl overflows the clock".into()))?;

        let payload = TokenPayload {
            claims: Claims {
                iss: self.issuer.clone(),
                sub: user.name.clone(),
                exp: unix_seconds(expiry),
            },
            user: TokenUser::new(user.name.clone(), user.roles),
        };

        let signed = jsonwebtoken::encode(
            &Header::new(Algorithm::PS512),
            &payload,
            self.keys.signing_key(),
        )
        .map_err(|e| AuthError::TokenBuild(format!("signing: {}", e)))?;

        let token = jwe::encrypt(signed.as_bytes(), self.keys.encryption_key())?;

        debug!(
            "Issued token for {} (roles {}, exp {})",
            payload.claims.sub, payload.user.roles, payload.claims.exp
        );

        Ok(token)
    }
}
