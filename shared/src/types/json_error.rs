use serde::{Deserialize, Serialize};

/// Body of every non-2xx JSON response:
/// `{"status":"error","code":"BAD_PASSWORD","message":"incorrect password"}`.
///
/// `code` is a stable machine-readable tag; `message` is for humans and may
/// change wording.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub status: String,
    pub code: String,
    pub message: String,
}

impl ErrorResponse {
    pub const STATUS: &'static str = "error";

    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            status: Self::STATUS.to_string(),
            code: code.into(),
            message: message.into(),
        }
    }
}
