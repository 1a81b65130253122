use std::fmt;
use std::str::FromStr;

use chrono::DateTime;
use chrono::Utc;
use uuid::Uuid;

use crate::account::errors::EmailError;
use crate::account::errors::PhoneNumberError;
use crate::account::errors::UserIdError;

/// Name of the role assigned to newly registered users. Resolved to a
/// [`RoleId`] at startup; never referenced by numeric literal.
pub const DEFAULT_ROLE_NAME: &str = "User";

/// User aggregate entity.
///
/// Carries the full credential-lifecycle state: login secret,
/// verification flags, and the inline verification/reset token pairs.
/// Created unverified and inactive; verify-email flips both flags
/// exactly once. The token pairs are independent and single-use: each
/// is cleared the moment it is consumed.
#[derive(Debug, Clone)]
pub struct User {
    pub id: UserId,
    pub email: EmailAddress,
    pub phone_number: PhoneNumber,
    pub name: String,
    pub last_name: String,
    pub address: String,
    pub location: String,
    pub password_hash: String,
    pub role_id: RoleId,
    pub verification_status: bool,
    pub is_active: bool,
    pub verification_token: Option<String>,
    pub verification_token_expires_at: Option<DateTime<Utc>>,
    pub reset_token: Option<String>,
    pub reset_token_expires_at: Option<DateTime<Utc>>,
    pub last_password_change: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

/// User unique identifier type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct UserId(pub Uuid);

impl UserId {
    /// Generate a new random user ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Parse a user ID from string.
    ///
    /// # Errors
    /// * `InvalidFormat` - String is not a valid UUID
    pub fn from_string(s: &str) -> Result<Self, UserIdError> {
        Uuid::parse_str(s)
            .map(UserId)
            .map_err(|e| UserIdError::InvalidFormat(e.to_string()))
    }
}

impl Default for UserId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Role unique identifier type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RoleId(pub i32);

impl fmt::Display for RoleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Role entity.
///
/// Referenced by `User.role_id`; users do not own roles. The seed set
/// {User, Admin, Moderator} is created idempotently by migration.
#[derive(Debug, Clone)]
pub struct Role {
    pub id: RoleId,
    pub name: String,
}

/// Email address type
///
/// Validates email format using RFC 5322 compliant parser.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailAddress(String);

impl EmailAddress {
    /// Create a new validated email address.
    ///
    /// # Errors
    /// * `InvalidFormat` - Email does not conform to RFC 5322
    pub fn new(email: String) -> Result<Self, EmailError> {
        email_address::EmailAddress::from_str(&email)
            .map(|_| EmailAddress(email))
            .map_err(|e| EmailError::InvalidFormat(e.to_string()))
    }

    /// Get email as string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EmailAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Phone number type
///
/// Ensures the number is non-empty, at most 32 characters, and made of
/// digits with optional `+`, spaces, hyphens, and parentheses.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhoneNumber(String);

impl PhoneNumber {
    const MAX_LENGTH: usize = 32;

    /// Create a new validated phone number.
    ///
    /// # Errors
    /// * `Empty` - Phone number is empty or whitespace
    /// * `TooLong` - Phone number longer than 32 characters
    /// * `InvalidCharacters` - Contains characters outside the allowed set
    pub fn new(phone_number: String) -> Result<Self, PhoneNumberError> {
        let trimmed = phone_number.trim();
        if trimmed.is_empty() {
            return Err(PhoneNumberError::Empty);
        }
        if trimmed.len() > Self::MAX_LENGTH {
            return Err(PhoneNumberError::TooLong {
                max: Self::MAX_LENGTH,
                actual: trimmed.len(),
            });
        }
        if !trimmed
            .chars()
            .all(|c| c.is_ascii_digit() || matches!(c, '+' | ' ' | '-' | '(' | ')'))
        {
            return Err(PhoneNumberError::InvalidCharacters);
        }
        Ok(Self(trimmed.to_string()))
    }

    /// Get phone number as string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PhoneNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Command to register a new account with domain types.
///
/// All fields are required; presence and format are validated by the
/// inbound layer before the command is constructed. The password is
/// plaintext here and hashed by the service.
#[derive(Debug)]
pub struct RegisterCommand {
    pub email: EmailAddress,
    pub password: String,
    pub name: String,
    pub last_name: String,
    pub phone_number: PhoneNumber,
    pub address: String,
    pub location: String,
}

/// Command to update an existing account.
///
/// Every field is optional; absent fields keep their stored value. A
/// supplied password arrives in plaintext and is re-hashed by the
/// service before persisting.
#[derive(Debug, Default)]
pub struct UpdateUserCommand {
    pub email: Option<EmailAddress>,
    pub password: Option<String>,
    pub name: Option<String>,
    pub last_name: Option<String>,
    pub phone_number: Option<PhoneNumber>,
    pub address: Option<String>,
    pub location: Option<String>,
    pub role_id: Option<RoleId>,
}
