//! Shared error type across mcpgate crates.

use thiserror::Error;

/// Client-facing error codes (stable API).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClientCode {
    /// Invalid input / malformed request or config.
    BadRequest,
    /// Authentication failed.
    AuthFailed,
    /// Authenticated but not permitted.
    NotAllowed,
    /// Tenant budget exhausted.
    RateLimited,
    /// Unsupported config version.
    UnsupportedVersion,
    /// Internal server error.
    Internal,
}

impl ClientCode {
    /// String representation used in JSON responses.
    pub fn as_str(self) -> &'static str {
        match self {
            ClientCode::BadRequest => "BAD_REQUEST",
            ClientCode::AuthFailed => "AUTH_FAILED",
            ClientCode::NotAllowed => "NOT_ALLOWED",
            ClientCode::RateLimited => "RATE_LIMITED",
            ClientCode::UnsupportedVersion => "UNSUPPORTED_VERSION",
            ClientCode::Internal => "INTERNAL",
        }
    }
}

/// Shared result type.
pub type Result<T> = std::result::Result<T, GateError>;

/// Unified error type used by core and gateway.
#[derive(Debug, Error)]
pub enum GateError {
    #[error("bad request: {0}")]
    BadRequest(String),
    #[error("auth failed: {0}")]
    AuthFailed(&'static str),
    #[error("not allowed: {0}")]
    NotAllowed(&'static str),
    #[error("rate limit exceeded")]
    RateLimited,
    #[error("unsupported config version")]
    UnsupportedVersion,
    #[error("internal: {0}")]
    Internal(String),
}

impl GateError {
    /// Map internal error to a stable client-facing code.
    pub fn client_code(&self) -> ClientCode {
        match self {
            GateError::BadRequest(_) => ClientCode::BadRequest,
            GateError::AuthFailed(_) => ClientCode::AuthFailed,
            GateError::NotAllowed(_) => ClientCode::NotAllowed,
            GateError::RateLimited => ClientCode::RateLimited,
            GateError::UnsupportedVersion => ClientCode::UnsupportedVersion,
            GateError::Internal(_) => ClientCode::Internal,
        }
    }
}
