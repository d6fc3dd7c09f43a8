//! Auth errors

use thiserror::Error;

/// Authentication errors
#[derive(Error, Debug)]
pub enum AuthError {
    /// Credential mismatch (wrong access key hash or admin password).
    ///
    /// Deliberately carries no detail about which stage diverged, so callers
    /// cannot distinguish "wrong key" from "wrong day" or "wrong password".
    #[error("invalid credentials")]
    InvalidCredentials,

    /// Token is malformed or its signature does not verify
    #[error("invalid token")]
    InvalidToken,

    /// Token signature verifies but the expiry has passed
    #[error("token expired")]
    TokenExpired,

    /// The key derivation could not complete (resource exhaustion).
    ///
    /// Fatal to the single verification attempt; never surfaced as a
    /// credential mismatch and never replaced by an empty hash.
    #[error("key derivation failed")]
    HashingFailed,

    /// Invalid construction input (e.g. signing secret too short)
    #[error("configuration error: {0}")]
    Configuration(String),

    /// Internal error
    #[error("internal error: {0}")]
    Internal(String),
}

impl AuthError {
    /// Get HTTP status code for this error
    pub fn status_code(&self) -> u16 {
        match self {
            Self::InvalidCredentials | Self::InvalidToken | Self::TokenExpired => 401,
            Self::HashingFailed | Self::Configuration(_) | Self::Internal(_) => 500,
        }
    }

    /// Get error code for API responses
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::InvalidCredentials => "INVALID_CREDENTIALS",
            Self::InvalidToken => "INVALID_TOKEN",
            Self::TokenExpired => "TOKEN_EXPIRED",
            Self::HashingFailed => "HASHING_FAILED",
            Self::Configuration(_) => "CONFIGURATION_ERROR",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }
}
