#![allow(dead_code)]

use std::sync::{Arc, OnceLock};

use restsrv::AppState;
use restsrv::auth::KeyManager;
use shared::types::server_config::AppConfig;

/// Key generation is slow, so each test binary shares one key set.
pub fn keys() -> Arc<KeyManager> {
    static KEYS: OnceLock<Arc<KeyManager>> = OnceLock::new();
    KEYS.get_or_init(|| Arc::new(KeyManager::generate(2048).expect("key generation")))
        .clone()
}

/// A second, unrelated key set for cross-key checks.
pub fn other_keys() -> Arc<KeyManager> {
    static KEYS: OnceLock<Arc<KeyManager>> = OnceLock::new();
    KEYS.get_or_init(|| Arc::new(KeyManager::generate(2048).expect("key generation")))
        .clone()
}

/// State over the default config: users u0/u1/u2 and ten seeded posts.
pub async fn state() -> AppState {
    state_with(AppConfig::default()).await
}

pub async fn state_with(config: AppConfig) -> AppState {
    AppState::with_keys(config, keys()).await
}
