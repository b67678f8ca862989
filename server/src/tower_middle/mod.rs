/// Tower middleware module
///
/// This module contains Tower-based middleware layers for:
/// - Verb-level authorization (session tokens)
/// - Request timeouts
pub mod tower_auth_gate;
pub mod tower_timeout_handler;

pub use tower_auth_gate::{AuthGateLayer, AuthGateService};
pub use tower_timeout_handler::{TimeoutLayer, TimeoutService};
