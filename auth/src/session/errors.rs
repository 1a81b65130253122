use thiserror::Error;

/// Error type for session token operations.
#[derive(Debug, Clone, Error)]
pub enum SessionTokenError {
    #[error("Failed to encode session token: {0}")]
    EncodingFailed(String),

    /// Verification failed: signature mismatch, malformed token, or
    /// expiry. Collapsed to one variant so callers fail closed without
    /// learning which check rejected the token.
    #[error("Session token is invalid or expired")]
    Invalid,
}
