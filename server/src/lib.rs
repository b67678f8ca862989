//! `restsrv`: a posts REST API whose mutating verbs are gated by stateless
//! session tokens (a PS512-signed JWT nested inside an RSA-OAEP/A128GCM JWE).

pub mod auth;
pub mod handlers;
pub mod state;
pub mod store;
pub mod tower_middle;

pub use handlers::http::Router;
pub use state::AppState;
