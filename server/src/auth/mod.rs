//! Session-token lifecycle and the authorization decision built on it.
//!
//! ```text
//! credentials ─► TokenIssuer ─► JWE(JWS(claims + user)) ─► client
//! client token + method ─► AuthGate ─► TokenVerifier ─► RoleSet ─► authorize
//! ```

pub mod credentials;
pub mod error;
pub mod gate;
pub mod issuer;
pub mod jwe;
pub mod keys;
pub mod verifier;

use std::time::{SystemTime, UNIX_EPOCH};

pub use credentials::{Credential, CredentialStore};
pub use error::AuthError;
pub use gate::{AuthGate, authorize, bearer_credential};
pub use issuer::TokenIssuer;
pub use keys::{KeyError, KeyManager};
pub use verifier::TokenVerifier;

/// Whole seconds since the Unix epoch; instants before it clamp to zero.
pub(crate) fn unix_seconds(at: SystemTime) -> u64 {
    at.duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}
