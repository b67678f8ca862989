use std::convert::Infallible;
use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};

use bytes::Bytes;
use http_body_util::combinators::BoxBody;
use hyper::{Request, Response, StatusCode};
use tower::{Layer, Service};

use crate::auth::{AuthError, AuthGate};
use crate::handlers::http::utils::{auth_error_json, error_json};

/// Tower layer for verb-level authorization
///
/// Wraps any service and runs the [`AuthGate`] decision before the request
/// reaches it. Denied requests never touch the inner service.
#[derive(Clone)]
pub struct AuthGateLayer {
    gate: AuthGate,
}

impl AuthGateLayer {
    pub fn new(gate: AuthGate) -> Self {
        Self { gate }
    }
}

impl<S> Layer<S> for AuthGateLayer {
    type Service = AuthGateService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        AuthGateService {
            inner,
            gate: self.gate.clone(),
        }
    }
}

/// The actual service that performs authorization
#[derive(Clone)]
pub struct AuthGateService<S> {
    inner: S,
    gate: AuthGate,
}

impl<S, ReqBody> Service<Request<ReqBody>> for AuthGateService<S>
where
    S: Service<Request<ReqBody>, Response = Response<BoxBody<Bytes, Infallible>>>
        + Clone
        + Send
        + 'static,
    S::Future: Send + 'static,
    ReqBody: Send + 'static,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, req: Request<ReqBody>) -> Self::Future {
        // Take the service that was driven to readiness, leave a clone behind
        let clone = self.inner.clone();
        let mut inner = std::mem::replace(&mut self.inner, clone);

        match self.gate.check(req.method(), req.headers()) {
            Ok(()) => Box::pin(inner.call(req)),
            Err(err) => {
                let response = deny(&err);
                Box::pin(async move { Ok(response) })
            }
        }
    }
}

/// Response for a refused request. Verification failures share one message
/// so callers cannot tell an expired token from a forged one.
pub fn deny(err: &AuthError) -> Response<BoxBody<Bytes, Infallible>> {
    match err {
        AuthError::MalformedAuthHeader => error_json(
            err.code(),
            "invalid Authorization header",
            StatusCode::BAD_REQUEST,
        ),
        AuthError::InsufficientRole => {
            error_json(err.code(), "access denied", StatusCode::UNAUTHORIZED)
        }
        err if err.is_verification_failure() => {
            error_json("UNAUTHORIZED", "unauthorized", StatusCode::UNAUTHORIZED)
        }
        err => auth_error_json(err),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verification_failures_share_one_response() {
        for err in [
            AuthError::TokenParse("bad".into()),
            AuthError::Decryption,
            AuthError::SignatureInvalid,
            AuthError::TokenExpired,
        ] {
            let response = deny(&err);
            assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        }
    }

    #[test]
    fn header_and_role_failures_are_distinct() {
        assert_eq!(deny(&AuthError::MalformedAuthHeader).status(), StatusCode::BAD_REQUEST);
        assert_eq!(deny(&AuthError::InsufficientRole).status(), StatusCode::UNAUTHORIZED);
    }
}
