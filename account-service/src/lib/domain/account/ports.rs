use async_trait::async_trait;
use chrono::DateTime;
use chrono::Utc;

use crate::account::errors::AccountError;
use crate::account::errors::NotifierError;
use crate::account::models::EmailAddress;
use crate::account::models::RegisterCommand;
use crate::account::models::UpdateUserCommand;
use crate::account::models::User;
use crate::account::models::UserId;

/// Port for credential-lifecycle operations.
#[async_trait]
pub trait AccountServicePort: Send + Sync + 'static {
    /// Register a new account in the unverified state.
    ///
    /// Hashes the password, attaches a verification token valid for
    /// 24 hours, persists the user with the default role, and sends a
    /// best-effort verification email. A failed send does not fail the
    /// registration.
    ///
    /// # Errors
    /// * `EmailAlreadyExists` - Email is already registered
    /// * `PhoneNumberAlreadyExists` - Phone number is already registered
    /// * `DatabaseError` - Persistence failed
    async fn register(&self, command: RegisterCommand) -> Result<User, AccountError>;

    /// Authenticate credentials and issue a session token.
    ///
    /// # Returns
    /// Signed session token, valid for 24 hours
    ///
    /// # Errors
    /// * `InvalidCredentials` - Unknown email or wrong password (indistinguishable)
    /// * `AccountNotVerified` - Email has not been verified yet
    /// * `AccountInactive` - Account is deactivated
    /// * `DatabaseError` - Lookup failed
    async fn login(&self, email: &str, password: &str) -> Result<String, AccountError>;

    /// Consume a verification token, activating the account.
    ///
    /// The token is single-use: it is cleared on success, so a second
    /// submission of the same token fails.
    ///
    /// # Errors
    /// * `InvalidOrExpiredToken` - Token unknown, expired, or already consumed
    /// * `DatabaseError` - Lookup or update failed
    async fn verify_email(&self, token: &str) -> Result<User, AccountError>;

    /// Start the password-reset flow for an email address.
    ///
    /// Always succeeds for unknown emails without persisting or
    /// sending anything, so the response cannot be used to enumerate
    /// accounts. For known emails a reset token valid for 1 hour is
    /// stored and a best-effort reset email is sent.
    ///
    /// # Errors
    /// * `DatabaseError` - Lookup or update failed
    async fn forgot_password(&self, email: &EmailAddress) -> Result<(), AccountError>;

    /// Consume a reset token, replacing the account password.
    ///
    /// Clears the reset token and stamps `last_password_change`.
    ///
    /// # Errors
    /// * `InvalidOrExpiredToken` - Token unknown, expired, or already consumed
    /// * `DatabaseError` - Lookup or update failed
    async fn reset_password(&self, token: &str, new_password: &str) -> Result<User, AccountError>;

    /// List every account.
    async fn list_users(&self) -> Result<Vec<User>, AccountError>;

    /// Retrieve a single account by identifier.
    ///
    /// # Errors
    /// * `NotFound` - No account with this id
    async fn get_user(&self, id: &UserId) -> Result<User, AccountError>;

    /// Create an account directly, bypassing the verification flow.
    ///
    /// Administrative path: the account comes out verified and active,
    /// with no verification token and no email sent.
    ///
    /// # Errors
    /// * `EmailAlreadyExists` - Email is already registered
    /// * `PhoneNumberAlreadyExists` - Phone number is already registered
    /// * `DatabaseError` - Persistence failed
    async fn create_user(&self, command: RegisterCommand) -> Result<User, AccountError>;

    /// Apply a partial update to an account.
    ///
    /// Absent command fields keep their stored value; a supplied
    /// password is re-hashed before persisting.
    ///
    /// # Errors
    /// * `NotFound` - No account with this id
    /// * `EmailAlreadyExists` / `PhoneNumberAlreadyExists` - New value collides
    /// * `DatabaseError` - Lookup or update failed
    async fn update_user(&self, id: &UserId, command: UpdateUserCommand)
        -> Result<User, AccountError>;

    /// Remove an account.
    ///
    /// # Errors
    /// * `NotFound` - No account with this id
    /// * `DatabaseError` - Delete failed
    async fn delete_user(&self, id: &UserId) -> Result<(), AccountError>;
}

/// Persistence operations for the user aggregate.
///
/// All lookups report not-found as `Ok(None)`, never as an error.
#[async_trait]
pub trait UserRepository: Send + Sync + 'static {
    /// Persist a new user.
    ///
    /// Must enforce the email and phone-number uniqueness invariants
    /// atomically at the storage layer; there is no separate existence
    /// check to race against.
    ///
    /// # Errors
    /// * `EmailAlreadyExists` - Email is already registered
    /// * `PhoneNumberAlreadyExists` - Phone number is already registered
    /// * `DatabaseError` - Persistence failed
    async fn create(&self, user: User) -> Result<User, AccountError>;

    /// Retrieve a user by identifier.
    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, AccountError>;

    /// Retrieve a user by email address.
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, AccountError>;

    /// Retrieve a user by phone number.
    async fn find_by_phone_number(&self, phone_number: &str) -> Result<Option<User>, AccountError>;

    /// Retrieve the user holding `token` as a verification token that
    /// has not expired at `not_expired_at`.
    async fn find_by_verification_token(
        &self,
        token: &str,
        not_expired_at: DateTime<Utc>,
    ) -> Result<Option<User>, AccountError>;

    /// Retrieve the user holding `token` as a reset token that has not
    /// expired at `not_expired_at`.
    async fn find_by_reset_token(
        &self,
        token: &str,
        not_expired_at: DateTime<Utc>,
    ) -> Result<Option<User>, AccountError>;

    /// Retrieve every user.
    async fn list_all(&self) -> Result<Vec<User>, AccountError>;

    /// Flip the user to verified and active, clearing the verification
    /// token pair. Touches only the verification columns, so it cannot
    /// clobber a reset token written concurrently.
    ///
    /// # Errors
    /// * `NotFound` - User does not exist
    /// * `DatabaseError` - Update failed
    async fn mark_verified(&self, id: &UserId) -> Result<User, AccountError>;

    /// Store a reset token and its expiry. Touches only the reset
    /// columns.
    ///
    /// # Errors
    /// * `NotFound` - User does not exist
    /// * `DatabaseError` - Update failed
    async fn store_reset_token(
        &self,
        id: &UserId,
        token: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<(), AccountError>;

    /// Replace the password hash, clearing the reset token pair and
    /// stamping the change time. Touches only the password and reset
    /// columns.
    ///
    /// # Errors
    /// * `NotFound` - User does not exist
    /// * `DatabaseError` - Update failed
    async fn replace_password(
        &self,
        id: &UserId,
        password_hash: &str,
        changed_at: DateTime<Utc>,
    ) -> Result<User, AccountError>;

    /// Write back a full user record.
    ///
    /// # Errors
    /// * `NotFound` - User does not exist
    /// * `EmailAlreadyExists` / `PhoneNumberAlreadyExists` - New value collides
    /// * `DatabaseError` - Update failed
    async fn update(&self, user: User) -> Result<User, AccountError>;

    /// Remove a user.
    ///
    /// # Errors
    /// * `NotFound` - User does not exist
    /// * `DatabaseError` - Delete failed
    async fn delete(&self, id: &UserId) -> Result<(), AccountError>;
}

/// Outbound notification capability (email delivery).
///
/// Fire-and-forget: the service treats failures as non-fatal.
#[async_trait]
pub trait Notifier: Send + Sync + 'static {
    /// Send a plain-text message to an address.
    async fn send(
        &self,
        to: &EmailAddress,
        subject: &str,
        body: &str,
    ) -> Result<(), NotifierError>;
}
