use std::collections::HashMap;
use std::fmt;

use shared::types::RoleSet;
use shared::types::server_config::UserConfig;

/// A credential-store entry. Never serialized: the token carries a
/// [`shared::types::TokenUser`] built from `name` and `roles` only.
#[derive(Clone)]
pub struct Credential {
    pub name: String,
    password: String,
    pub roles: RoleSet,
}

impl Credential {
    pub fn new(name: impl Into<String>, password: impl Into<String>, roles: RoleSet) -> Self {
        Self {
            name: name.into(),
            password: password.into(),
            roles,
        }
    }

    pub fn password_matches(&self, candidate: &str) -> bool {
        self.password == candidate
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credential")
            .field("name", &self.name)
            .field("password", &"<redacted>")
            .field("roles", &self.roles)
            .finish()
    }
}

/// Read-only username → credential lookup.
#[derive(Debug, Clone, Default)]
pub struct CredentialStore {
    users: HashMap<String, Credential>,
}

impl CredentialStore {
    pub fn new(users: impl IntoIterator<Item = Credential>) -> Self {
        Self {
            users: users.into_iter().map(|u| (u.name.clone(), u)).collect(),
        }
    }

    pub fn from_config(users: &[UserConfig]) -> Self {
        Self::new(users.iter().map(|u| {
            Credential::new(
                u.name.clone(),
                u.password.clone(),
                u.roles.iter().copied().collect(),
            )
        }))
    }

    pub fn lookup(&self, username: &str) -> Option<&Credential> {
        self.users.get(username)
    }

    pub fn len(&self) -> usize {
        self.users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }
}
