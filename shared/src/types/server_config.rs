use serde::Deserialize;
use thiserror::Error;

use crate::types::role::Role;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),
}

// ---------------------------------------------------------------------------
// Config structs
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    #[serde(default = "default_bind")]
    pub bind: String,
    #[serde(default = "default_port")]
    pub port: u16,
    /// Per-request deadline enforced by the timeout layer.
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
    /// How long open connections may drain after Ctrl-C.
    #[serde(default = "default_shutdown_grace")]
    pub shutdown_grace_secs: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct PathsConfig {
    #[serde(default = "default_web_dir")]
    pub web_dir: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AuthConfig {
    /// Value of the `iss` claim.
    #[serde(default = "default_issuer")]
    pub issuer: String,
    /// Lifetime of tokens handed out by `/token`.
    #[serde(default = "default_token_ttl")]
    pub token_ttl_secs: u64,
    /// Modulus size for both RSA key pairs.
    ///
    /// **Hot-reload safe:** NO. Keys are generated once at startup and every
    /// token issued before a restart becomes undecryptable afterwards.
    #[serde(default = "default_key_bits")]
    pub key_bits: usize,
}

#[derive(Debug, Deserialize, Clone)]
pub struct PostsConfig {
    /// Number of sample posts created at startup.
    #[serde(default = "default_seed_count")]
    pub seed_count: usize,
}

/// One entry of the credential store.
///
/// Passwords are kept in cleartext, as the demo users always have been.
#[derive(Deserialize, Clone)]
pub struct UserConfig {
    pub name: String,
    pub password: String,
    pub roles: Vec<Role>,
}

impl std::fmt::Debug for UserConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UserConfig")
            .field("name", &self.name)
            .field("password", &"<redacted>")
            .field("roles", &self.roles)
            .finish()
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub paths: PathsConfig,
    #[serde(default)]
    pub auth: AuthConfig,
    #[serde(default)]
    pub posts: PostsConfig,
    #[serde(default)]
    pub users: Vec<UserConfig>,
}

// ---------------------------------------------------------------------------
// Defaults
// ---------------------------------------------------------------------------

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
            port: default_port(),
            request_timeout_secs: default_request_timeout(),
            shutdown_grace_secs: default_shutdown_grace(),
        }
    }
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            web_dir: default_web_dir(),
        }
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            issuer: default_issuer(),
            token_ttl_secs: default_token_ttl(),
            key_bits: default_key_bits(),
        }
    }
}

impl Default for PostsConfig {
    fn default() -> Self {
        Self {
            seed_count: default_seed_count(),
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            paths: PathsConfig::default(),
            auth: AuthConfig::default(),
            posts: PostsConfig::default(),
            users: Vec::new(),
        }
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

impl ServerConfig {
    /// Full bind address, e.g. `"127.0.0.1:8443"` or `"[::1]:8443"`
    pub fn addr(&self) -> String {
        if self.bind.contains(':') && !self.bind.starts_with('[') {
            format!("[{}]:{}", self.bind, self.port)
        } else {
            format!("{}:{}", self.bind, self.port)
        }
    }
}

impl AuthConfig {
    pub fn token_ttl(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.token_ttl_secs)
    }
}

/// Users created when the config file lists none.
pub fn default_users() -> Vec<UserConfig> {
    [("u0", Role::Admin), ("u1", Role::Edit), ("u2", Role::Add)]
        .into_iter()
        .map(|(name, role)| UserConfig {
            name: name.to_string(),
            password: name.to_string(),
            roles: vec![role],
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Serde defaults
// ---------------------------------------------------------------------------

pub fn default_bind() -> String {
    "127.0.0.1".to_string()
}

pub fn default_port() -> u16 {
    8443
}

pub fn default_request_timeout() -> u64 {
    10
}

pub fn default_shutdown_grace() -> u64 {
    10
}

pub fn default_web_dir() -> String {
    "webroot".to_string()
}

pub fn default_issuer() -> String {
    "restsrv".to_string()
}

pub fn default_token_ttl() -> u64 {
    60
}

pub fn default_key_bits() -> usize {
    2048
}

pub fn default_seed_count() -> usize {
    10
}
