use serde::de::Deserializer;
use serde::ser::Serializer;
use serde::{Deserialize, Serialize};

use crate::types::role::RoleSet;

/// Registered claims carried by every session token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Fixed name of the issuing service.
    pub iss: String,

    /// Username the token was issued to.
    pub sub: String,

    /// Absolute expiry, Unix seconds. The token is valid while `exp > now`.
    pub exp: u64,
}

/// Placeholder for the password slot of the embedded user record.
///
/// Zero-sized: it always serializes as `""` and discards whatever string it
/// is decoded from, so a token payload has nowhere to hold a secret.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Redacted;

impl Serialize for Redacted {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str("")
    }
}

impl<'de> Deserialize<'de> for Redacted {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        String::deserialize(deserializer).map(|_| Redacted)
    }
}

/// User view embedded in the token: name and roles only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenUser {
    #[serde(rename = "Name")]
    pub name: String,

    #[serde(rename = "Pwd", default)]
    pub pwd: Redacted,

    #[serde(rename = "Roles")]
    pub roles: RoleSet,
}

impl TokenUser {
    pub fn new(name: impl Into<String>, roles: RoleSet) -> Self {
        Self {
            name: name.into(),
            pwd: Redacted,
            roles,
        }
    }
}

/// Complete signed payload: claims and user merged into one JSON object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenPayload {
    #[serde(flatten)]
    pub claims: Claims,

    #[serde(flatten)]
    pub user: TokenUser,
}
