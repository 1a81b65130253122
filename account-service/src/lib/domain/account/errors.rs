use thiserror::Error;

/// Error for UserId parsing failures
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum UserIdError {
    #[error("Invalid UUID format: {0}")]
    InvalidFormat(String),
}

/// Error for EmailAddress validation failures
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum EmailError {
    #[error("Invalid email format: {0}")]
    InvalidFormat(String),
}

/// Error for PhoneNumber validation failures
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PhoneNumberError {
    #[error("Phone number is empty")]
    Empty,

    #[error("Phone number too long: maximum {max} characters, got {actual}")]
    TooLong { max: usize, actual: usize },

    #[error("Phone number contains invalid characters")]
    InvalidCharacters,
}

/// Error for outbound notification delivery.
///
/// Delivery is best-effort throughout the credential lifecycle; the
/// service logs these and never propagates them to the caller.
#[derive(Debug, Clone, Error)]
pub enum NotifierError {
    #[error("Failed to build notification message: {0}")]
    Message(String),

    #[error("Failed to deliver notification: {0}")]
    Transport(String),
}

/// Top-level error for all credential-lifecycle operations.
///
/// Error messages never contain secret material: no plaintext
/// passwords, no hashes, no raw tokens, no signing keys.
#[derive(Debug, Clone, Error)]
pub enum AccountError {
    // Value object validation errors (automatically converted via #[from])
    #[error("Invalid user ID: {0}")]
    InvalidUserId(#[from] UserIdError),

    #[error("Invalid email: {0}")]
    InvalidEmail(#[from] EmailError),

    #[error("Invalid phone number: {0}")]
    InvalidPhoneNumber(#[from] PhoneNumberError),

    #[error("Missing required field: {0}")]
    MissingField(&'static str),

    // Domain-level errors
    #[error("Email already exists: {0}")]
    EmailAlreadyExists(String),

    #[error("Phone number already exists: {0}")]
    PhoneNumberAlreadyExists(String),

    /// Deliberately covers both "no such account" and "wrong password"
    /// so the response does not reveal which check failed.
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Please verify your account")]
    AccountNotVerified,

    #[error("Account is inactive")]
    AccountInactive,

    /// Covers mismatched, expired, and already-consumed tokens alike.
    #[error("Invalid or expired token")]
    InvalidOrExpiredToken,

    #[error("Account not found: {0}")]
    NotFound(String),

    // Infrastructure errors
    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Unknown error: {0}")]
    Unknown(String),
}
