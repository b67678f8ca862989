use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::info;

use shared::types::server_config::{AppConfig, default_users};

use crate::auth::{AuthGate, CredentialStore, KeyManager, TokenIssuer, TokenVerifier};
use crate::store::PostStore;

/// Everything a request handler needs, built once before the listener binds
/// and immutable afterwards (the post store synchronizes itself).
#[derive(Clone, Debug)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub issuer: Arc<TokenIssuer>,
    pub verifier: Arc<TokenVerifier>,
    pub posts: Arc<PostStore>,
}

impl AppState {
    /// Generate keys, load users and seed posts from `config`.
    ///
    /// Key generation failure is returned as an error; the caller must not
    /// start serving without keys.
    pub async fn new(config: AppConfig) -> Result<Self> {
        let keys = KeyManager::generate(config.auth.key_bits)
            .context("Failed to generate token keys")?;

        let state = Self::with_keys(config, Arc::new(keys)).await;
        info!(
            "Application state ready ({} posts)",
            state.posts.len().await
        );
        Ok(state)
    }

    /// Build state around existing keys.
    pub async fn with_keys(config: AppConfig, keys: Arc<KeyManager>) -> Self {
        let credentials = if config.users.is_empty() {
            info!("No users configured, loading default users");
            CredentialStore::from_config(&default_users())
        } else {
            CredentialStore::from_config(&config.users)
        };
        info!("Credential store holds {} users", credentials.len());

        let issuer = TokenIssuer::new(
            Arc::new(credentials),
            Arc::clone(&keys),
            config.auth.issuer.clone(),
        );
        let verifier = TokenVerifier::new(keys);
        let posts = PostStore::seeded(config.posts.seed_count).await;

        Self {
            config: Arc::new(config),
            issuer: Arc::new(issuer),
            verifier: Arc::new(verifier),
            posts: Arc::new(posts),
        }
    }

    pub fn gate(&self) -> AuthGate {
        AuthGate::new(Arc::clone(&self.verifier))
    }
}
