//! Types shared between the `restsrv` server and its tests: the role
//! vocabulary, the token payload, post bodies, the JSON error envelope and the
//! application configuration.

pub mod config;
pub mod types;
