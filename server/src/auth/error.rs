use hyper::StatusCode;
use thiserror::Error;

use shared::types::ErrorResponse;

/// Failures of issuance, verification and authorization.
///
/// Every variant is request-local: it maps to a 4xx (or, for `TokenBuild`,
/// a 500) response and leaves no state behind.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    #[error("user not found")]
    UserNotFound,

    #[error("incorrect password")]
    BadPassword,

    #[error("invalid Authorization header")]
    MalformedAuthHeader,

    #[error("malformed token: {0}")]
    TokenParse(String),

    #[error("token decryption failed")]
    Decryption,

    #[error("token signature invalid")]
    SignatureInvalid,

    #[error("token expired")]
    TokenExpired,

    #[error("access denied")]
    InsufficientRole,

    /// Signing or encryption failed while building a token.
    #[error("failed to build token: {0}")]
    TokenBuild(String),
}

impl AuthError {
    pub fn code(&self) -> &'static str {
        match self {
            Self::UserNotFound => "USER_NOT_FOUND",
            Self::BadPassword => "BAD_PASSWORD",
            Self::MalformedAuthHeader => "MALFORMED_AUTH_HEADER",
            Self::TokenParse(_) => "TOKEN_PARSE_ERROR",
            Self::Decryption => "DECRYPTION_ERROR",
            Self::SignatureInvalid => "SIGNATURE_INVALID",
            Self::TokenExpired => "TOKEN_EXPIRED",
            Self::InsufficientRole => "INSUFFICIENT_ROLE",
            Self::TokenBuild(_) => "INTERNAL_ERROR",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Self::MalformedAuthHeader => StatusCode::BAD_REQUEST,
            Self::TokenBuild(_) => StatusCode::INTERNAL_SERVER_ERROR,
            _ => StatusCode::UNAUTHORIZED,
        }
    }

    /// True for the errors produced while checking a presented token.
    pub fn is_verification_failure(&self) -> bool {
        matches!(
            self,
            Self::TokenParse(_) | Self::Decryption | Self::SignatureInvalid | Self::TokenExpired
        )
    }
}

impl From<&AuthError> for ErrorResponse {
    fn from(err: &AuthError) -> Self {
        ErrorResponse::new(err.code(), err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_body_carries_code_and_message() {
        let body = ErrorResponse::from(&AuthError::BadPassword);
        assert_eq!(body.status, ErrorResponse::STATUS);
        assert_eq!(body.code, "BAD_PASSWORD");
        assert_eq!(body.message, "incorrect password");
    }

    #[test]
    fn header_errors_are_bad_request() {
        assert_eq!(
            AuthError::MalformedAuthHeader.status(),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn credential_and_token_errors_are_unauthorized() {
        for err in [
            AuthError::UserNotFound,
            AuthError::BadPassword,
            AuthError::TokenParse("x".into()),
            AuthError::Decryption,
            AuthError::SignatureInvalid,
            AuthError::TokenExpired,
            AuthError::InsufficientRole,
        ] {
            assert_eq!(err.status(), StatusCode::UNAUTHORIZED, "{:?}", err);
            assert!(!err.code().is_empty());
        }
    }

    #[test]
    fn build_failures_are_server_errors() {
        let err = AuthError::TokenBuild("rng".into());
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(!err.is_verification_failure());
    }
}
