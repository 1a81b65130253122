use std::sync::Arc;

use async_trait::async_trait;
use auth::PasswordHasher;
use auth::SessionTokenIssuer;
use auth::TokenGenerator;
use chrono::Duration;
use chrono::Utc;

use crate::account::errors::AccountError;
use crate::account::models::EmailAddress;
use crate::account::models::RegisterCommand;
use crate::account::models::RoleId;
use crate::account::models::UpdateUserCommand;
use crate::account::models::User;
use crate::account::models::UserId;
use crate::account::ports::AccountServicePort;
use crate::account::ports::Notifier;
use crate::account::ports::UserRepository;

/// Verification links stay valid for 24 hours.
const VERIFICATION_TOKEN_TTL_HOURS: i64 = 24;

/// Reset links stay valid for 1 hour.
const RESET_TOKEN_TTL_HOURS: i64 = 1;

/// Credential-lifecycle service.
///
/// Orchestrates registration, email verification, login, and the
/// forgot/reset password flows over an injected repository and
/// notifier. Stateless between invocations; all shared dependencies
/// are read-only after construction.
pub struct AccountService<UR, N>
where
    UR: UserRepository,
    N: Notifier,
{
    repository: Arc<UR>,
    notifier: Arc<N>,
    password_hasher: PasswordHasher,
    token_generator: TokenGenerator,
    session_issuer: Arc<SessionTokenIssuer>,
    default_role_id: RoleId,
    public_url: String,
}

impl<UR, N> AccountService<UR, N>
where
    UR: UserRepository,
    N: Notifier,
{
    /// Create a new account service with injected dependencies.
    ///
    /// # Arguments
    /// * `repository` - User persistence implementation
    /// * `notifier` - Email delivery implementation
    /// * `session_issuer` - Session token issuer (shared with the process)
    /// * `default_role_id` - Role assigned to new users, resolved by name at startup
    /// * `public_url` - Base URL embedded in verification and reset links
    pub fn new(
        repository: Arc<UR>,
        notifier: Arc<N>,
        session_issuer: Arc<SessionTokenIssuer>,
        default_role_id: RoleId,
        public_url: String,
    ) -> Self {
        Self {
            repository,
            notifier,
            password_hasher: PasswordHasher::new(),
            token_generator: TokenGenerator::new(),
            session_issuer,
            default_role_id,
            public_url: public_url.trim_end_matches('/').to_string(),
        }
    }

    /// Hash a password on the blocking pool; Argon2 is CPU-bound and
    /// must not stall the async executor.
    async fn hash_password(&self, password: String) -> Result<String, AccountError> {
        let hasher = self.password_hasher.clone();
        tokio::task::spawn_blocking(move || hasher.hash(&password))
            .await
            .map_err(|e| AccountError::Unknown(format!("Hashing task failed: {}", e)))?
            .map_err(|e| AccountError::Unknown(format!("Password hashing failed: {}", e)))
    }

    /// Verify a password on the blocking pool.
    async fn password_matches(
        &self,
        password: String,
        stored_hash: String,
    ) -> Result<bool, AccountError> {
        let hasher = self.password_hasher.clone();
        tokio::task::spawn_blocking(move || hasher.verify(&password, &stored_hash))
            .await
            .map_err(|e| AccountError::Unknown(format!("Verification task failed: {}", e)))
    }

    /// Deliver an email, swallowing failures.
    ///
    /// One policy for the whole lifecycle: delivery is not an
    /// integrity-critical side effect, so a failed send is logged and
    /// the operation still succeeds.
    async fn notify_best_effort(&self, user_id: &UserId, to: &EmailAddress, subject: &str, body: &str) {
        if let Err(e) = self.notifier.send(to, subject, body).await {
            tracing::warn!(user_id = %user_id, error = %e, "Failed to send email notification");
        }
    }
}

#[async_trait]
impl<UR, N> AccountServicePort for AccountService<UR, N>
where
    UR: UserRepository,
    N: Notifier,
{
    async fn register(&self, command: RegisterCommand) -> Result<User, AccountError> {
        let password_hash = self.hash_password(command.password).await?;

        let verification_token = self.token_generator.generate();
        let now = Utc::now();

        let user = User {
            id: UserId::new(),
            email: command.email,
            phone_number: command.phone_number,
            name: command.name,
            last_name: command.last_name,
            address: command.address,
            location: command.location,
            password_hash,
            role_id: self.default_role_id,
            verification_status: false,
            is_active: false,
            verification_token: Some(verification_token.clone()),
            verification_token_expires_at: Some(
                now + Duration::hours(VERIFICATION_TOKEN_TTL_HOURS),
            ),
            reset_token: None,
            reset_token_expires_at: None,
            last_password_change: None,
            created_at: now,
        };

        // Uniqueness is enforced by the repository create itself:
        // no prior existence check to race against.
        let created = self.repository.create(user).await?;

        tracing::info!(user_id = %created.id, "Account registered");

        let link = format!("{}/api/auth/verify/{}", self.public_url, verification_token);
        let body = format!(
            "Hello {} {},\n\n\
             Thank you for registering. Please verify your account by opening the link below:\n\n\
             {}\n\n\
             This link will expire in {} hours.",
            created.name, created.last_name, link, VERIFICATION_TOKEN_TTL_HOURS
        );
        self.notify_best_effort(&created.id, &created.email, "Please verify your account", &body)
            .await;

        Ok(created)
    }

    async fn login(&self, email: &str, password: &str) -> Result<String, AccountError> {
        let user = self
            .repository
            .find_by_email(email)
            .await?
            .ok_or(AccountError::InvalidCredentials)?;

        let matches = self
            .password_matches(password.to_string(), user.password_hash.clone())
            .await?;
        if !matches {
            tracing::warn!(user_id = %user.id, "Login failed: password mismatch");
            return Err(AccountError::InvalidCredentials);
        }

        if !user.verification_status {
            return Err(AccountError::AccountNotVerified);
        }
        if !user.is_active {
            return Err(AccountError::AccountInactive);
        }

        let token = self
            .session_issuer
            .issue(user.id)
            .map_err(|e| AccountError::Unknown(format!("Session token issuance failed: {}", e)))?;

        tracing::info!(user_id = %user.id, "Login successful");

        Ok(token)
    }

    async fn verify_email(&self, token: &str) -> Result<User, AccountError> {
        let user = self
            .repository
            .find_by_verification_token(token, Utc::now())
            .await?
            .ok_or(AccountError::InvalidOrExpiredToken)?;

        // Scoped write: only the verification columns change, so a
        // concurrent reset-token write cannot be lost.
        let updated = self.repository.mark_verified(&user.id).await?;

        tracing::info!(user_id = %updated.id, "Account verified");

        Ok(updated)
    }

    async fn forgot_password(&self, email: &EmailAddress) -> Result<(), AccountError> {
        let user = match self.repository.find_by_email(email.as_str()).await? {
            Some(user) => user,
            None => {
                // No write, no send: the caller sees the same generic
                // response either way, so accounts cannot be enumerated.
                tracing::debug!("Password reset requested for unknown email");
                return Ok(());
            }
        };

        let reset_token = self.token_generator.generate();
        let expires_at = Utc::now() + Duration::hours(RESET_TOKEN_TTL_HOURS);

        self.repository
            .store_reset_token(&user.id, &reset_token, expires_at)
            .await?;

        tracing::info!(user_id = %user.id, "Password reset token stored");

        let link = format!(
            "{}/api/auth/reset-password/{}",
            self.public_url, reset_token
        );
        let body = format!(
            "You have requested a password reset.\n\n\
             Please open the link below to choose a new password:\n\n\
             {}\n\n\
             This link will expire in {} hour(s). If you did not request this, \
             you can ignore this message.",
            link, RESET_TOKEN_TTL_HOURS
        );
        self.notify_best_effort(&user.id, &user.email, "Password reset request", &body)
            .await;

        Ok(())
    }

    async fn reset_password(&self, token: &str, new_password: &str) -> Result<User, AccountError> {
        let user = self
            .repository
            .find_by_reset_token(token, Utc::now())
            .await?
            .ok_or(AccountError::InvalidOrExpiredToken)?;

        let password_hash = self.hash_password(new_password.to_string()).await?;

        let updated = self
            .repository
            .replace_password(&user.id, &password_hash, Utc::now())
            .await?;

        tracing::info!(user_id = %updated.id, "Password reset completed");

        Ok(updated)
    }

    async fn list_users(&self) -> Result<Vec<User>, AccountError> {
        self.repository.list_all().await
    }

    async fn get_user(&self, id: &UserId) -> Result<User, AccountError> {
        self.repository
            .find_by_id(id)
            .await?
            .ok_or(AccountError::NotFound(id.to_string()))
    }

    async fn create_user(&self, command: RegisterCommand) -> Result<User, AccountError> {
        let password_hash = self.hash_password(command.password).await?;

        let user = User {
            id: UserId::new(),
            email: command.email,
            phone_number: command.phone_number,
            name: command.name,
            last_name: command.last_name,
            address: command.address,
            location: command.location,
            password_hash,
            role_id: self.default_role_id,
            // Administrative creation: verified and active from the
            // start, no token pair, no verification email.
            verification_status: true,
            is_active: true,
            verification_token: None,
            verification_token_expires_at: None,
            reset_token: None,
            reset_token_expires_at: None,
            last_password_change: None,
            created_at: Utc::now(),
        };

        let created = self.repository.create(user).await?;

        tracing::info!(user_id = %created.id, "Account created directly");

        Ok(created)
    }

    async fn update_user(
        &self,
        id: &UserId,
        command: UpdateUserCommand,
    ) -> Result<User, AccountError> {
        let mut user = self
            .repository
            .find_by_id(id)
            .await?
            .ok_or(AccountError::NotFound(id.to_string()))?;

        if let Some(email) = command.email {
            user.email = email;
        }
        if let Some(phone_number) = command.phone_number {
            user.phone_number = phone_number;
        }
        if let Some(name) = command.name {
            user.name = name;
        }
        if let Some(last_name) = command.last_name {
            user.last_name = last_name;
        }
        if let Some(address) = command.address {
            user.address = address;
        }
        if let Some(location) = command.location {
            user.location = location;
        }
        if let Some(role_id) = command.role_id {
            user.role_id = role_id;
        }
        if let Some(password) = command.password {
            user.password_hash = self.hash_password(password).await?;
            user.last_password_change = Some(Utc::now());
        }

        let updated = self.repository.update(user).await?;

        tracing::info!(user_id = %updated.id, "Account updated");

        Ok(updated)
    }

    async fn delete_user(&self, id: &UserId) -> Result<(), AccountError> {
        self.repository.delete(id).await?;

        tracing::info!(user_id = %id, "Account deleted");

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use chrono::DateTime;
    use mockall::mock;
    use mockall::predicate::*;

    use super::*;
    use crate::account::errors::NotifierError;
    use crate::account::models::PhoneNumber;

    const TEST_SECRET: &[u8] = b"test-secret-key-for-jwt-signing-at-least-32-bytes";

    mock! {
        pub TestUserRepository {}

        #[async_trait]
        impl UserRepository for TestUserRepository {
            async fn create(&self, user: User) -> Result<User, AccountError>;
            async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, AccountError>;
            async fn find_by_email(&self, email: &str) -> Result<Option<User>, AccountError>;
            async fn find_by_phone_number(&self, phone_number: &str) -> Result<Option<User>, AccountError>;
            async fn find_by_verification_token(
                &self,
                token: &str,
                not_expired_at: DateTime<Utc>,
            ) -> Result<Option<User>, AccountError>;
            async fn find_by_reset_token(
                &self,
                token: &str,
                not_expired_at: DateTime<Utc>,
            ) -> Result<Option<User>, AccountError>;
            async fn list_all(&self) -> Result<Vec<User>, AccountError>;
            async fn mark_verified(&self, id: &UserId) -> Result<User, AccountError>;
            async fn store_reset_token(
                &self,
                id: &UserId,
                token: &str,
                expires_at: DateTime<Utc>,
            ) -> Result<(), AccountError>;
            async fn replace_password(
                &self,
                id: &UserId,
                password_hash: &str,
                changed_at: DateTime<Utc>,
            ) -> Result<User, AccountError>;
            async fn update(&self, user: User) -> Result<User, AccountError>;
            async fn delete(&self, id: &UserId) -> Result<(), AccountError>;
        }
    }

    mock! {
        pub TestNotifier {}

        #[async_trait]
        impl Notifier for TestNotifier {
            async fn send(
                &self,
                to: &EmailAddress,
                subject: &str,
                body: &str,
            ) -> Result<(), NotifierError>;
        }
    }

    fn service(
        repository: MockTestUserRepository,
        notifier: MockTestNotifier,
    ) -> AccountService<MockTestUserRepository, MockTestNotifier> {
        AccountService::new(
            Arc::new(repository),
            Arc::new(notifier),
            Arc::new(SessionTokenIssuer::new(TEST_SECRET)),
            RoleId(1),
            "http://localhost:3000".to_string(),
        )
    }

    fn register_command() -> RegisterCommand {
        RegisterCommand {
            email: EmailAddress::new("a@x.com".to_string()).unwrap(),
            password: "Secr3t!".to_string(),
            name: "A".to_string(),
            last_name: "B".to_string(),
            phone_number: PhoneNumber::new("555".to_string()).unwrap(),
            address: "Addr".to_string(),
            location: "Loc".to_string(),
        }
    }

    fn verified_user(password: &str) -> User {
        let hash = PasswordHasher::new().hash(password).unwrap();
        User {
            id: UserId::new(),
            email: EmailAddress::new("a@x.com".to_string()).unwrap(),
            phone_number: PhoneNumber::new("555".to_string()).unwrap(),
            name: "A".to_string(),
            last_name: "B".to_string(),
            address: "Addr".to_string(),
            location: "Loc".to_string(),
            password_hash: hash,
            role_id: RoleId(1),
            verification_status: true,
            is_active: true,
            verification_token: None,
            verification_token_expires_at: None,
            reset_token: None,
            reset_token_expires_at: None,
            last_password_change: None,
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_register_creates_unverified_user() {
        let mut repository = MockTestUserRepository::new();
        let mut notifier = MockTestNotifier::new();

        repository
            .expect_create()
            .withf(|user| {
                !user.verification_status
                    && !user.is_active
                    && user.password_hash.starts_with("$argon2")
                    && user.verification_token.as_deref().is_some_and(|t| t.len() == 64)
                    && user.verification_token_expires_at.is_some()
                    && user.reset_token.is_none()
            })
            .times(1)
            .returning(|user| Ok(user));

        notifier
            .expect_send()
            .withf(|to, subject, body| {
                to.as_str() == "a@x.com"
                    && subject == "Please verify your account"
                    && body.contains("/api/auth/verify/")
            })
            .times(1)
            .returning(|_, _, _| Ok(()));

        let service = service(repository, notifier);
        let user = service.register(register_command()).await.unwrap();

        assert!(!user.verification_status);
        assert!(!user.is_active);
        assert_eq!(user.role_id, RoleId(1));
        // Plaintext never stored
        assert_ne!(user.password_hash, "Secr3t!");
    }

    #[tokio::test]
    async fn test_register_duplicate_email() {
        let mut repository = MockTestUserRepository::new();
        let mut notifier = MockTestNotifier::new();

        repository
            .expect_create()
            .times(1)
            .returning(|user| Err(AccountError::EmailAlreadyExists(user.email.to_string())));

        // No email goes out when the write is rejected
        notifier.expect_send().times(0);

        let service = service(repository, notifier);
        let result = service.register(register_command()).await;

        assert!(matches!(result, Err(AccountError::EmailAlreadyExists(_))));
    }

    #[tokio::test]
    async fn test_register_duplicate_phone_number() {
        let mut repository = MockTestUserRepository::new();
        let mut notifier = MockTestNotifier::new();

        repository.expect_create().times(1).returning(|user| {
            Err(AccountError::PhoneNumberAlreadyExists(
                user.phone_number.to_string(),
            ))
        });
        notifier.expect_send().times(0);

        let service = service(repository, notifier);
        let result = service.register(register_command()).await;

        assert!(matches!(
            result,
            Err(AccountError::PhoneNumberAlreadyExists(_))
        ));
    }

    #[tokio::test]
    async fn test_register_succeeds_when_email_send_fails() {
        let mut repository = MockTestUserRepository::new();
        let mut notifier = MockTestNotifier::new();

        repository
            .expect_create()
            .times(1)
            .returning(|user| Ok(user));

        notifier
            .expect_send()
            .times(1)
            .returning(|_, _, _| Err(NotifierError::Transport("connection refused".to_string())));

        let service = service(repository, notifier);
        let result = service.register(register_command()).await;

        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_login_unknown_email() {
        let mut repository = MockTestUserRepository::new();
        let notifier = MockTestNotifier::new();

        repository
            .expect_find_by_email()
            .times(1)
            .returning(|_| Ok(None));

        let service = service(repository, notifier);
        let result = service.login("nobody@x.com", "whatever").await;

        assert!(matches!(result, Err(AccountError::InvalidCredentials)));
    }

    #[tokio::test]
    async fn test_login_wrong_password() {
        let mut repository = MockTestUserRepository::new();
        let notifier = MockTestNotifier::new();

        let user = verified_user("Secr3t!");
        repository
            .expect_find_by_email()
            .times(1)
            .returning(move |_| Ok(Some(user.clone())));

        let service = service(repository, notifier);
        let result = service.login("a@x.com", "wrong").await;

        // Same error as the unknown-email case
        assert!(matches!(result, Err(AccountError::InvalidCredentials)));
    }

    #[tokio::test]
    async fn test_login_unverified_account() {
        let mut repository = MockTestUserRepository::new();
        let notifier = MockTestNotifier::new();

        let mut user = verified_user("Secr3t!");
        user.verification_status = false;
        user.is_active = false;
        repository
            .expect_find_by_email()
            .times(1)
            .returning(move |_| Ok(Some(user.clone())));

        let service = service(repository, notifier);
        // Correct password, but the account was never verified
        let result = service.login("a@x.com", "Secr3t!").await;

        assert!(matches!(result, Err(AccountError::AccountNotVerified)));
    }

    #[tokio::test]
    async fn test_login_inactive_account() {
        let mut repository = MockTestUserRepository::new();
        let notifier = MockTestNotifier::new();

        let mut user = verified_user("Secr3t!");
        user.is_active = false;
        repository
            .expect_find_by_email()
            .times(1)
            .returning(move |_| Ok(Some(user.clone())));

        let service = service(repository, notifier);
        let result = service.login("a@x.com", "Secr3t!").await;

        assert!(matches!(result, Err(AccountError::AccountInactive)));
    }

    #[tokio::test]
    async fn test_login_success_issues_session_token() {
        let mut repository = MockTestUserRepository::new();
        let notifier = MockTestNotifier::new();

        let user = verified_user("Secr3t!");
        let user_id = user.id;
        repository
            .expect_find_by_email()
            .withf(|email| email == "a@x.com")
            .times(1)
            .returning(move |_| Ok(Some(user.clone())));

        let service = service(repository, notifier);
        let token = service.login("a@x.com", "Secr3t!").await.unwrap();

        let claims = SessionTokenIssuer::new(TEST_SECRET).verify(&token).unwrap();
        assert_eq!(claims.sub, user_id.to_string());
        assert_eq!(claims.exp - claims.iat, 24 * 60 * 60);
    }

    #[tokio::test]
    async fn test_verify_email_activates_and_clears_token() {
        let mut repository = MockTestUserRepository::new();
        let notifier = MockTestNotifier::new();

        let mut user = verified_user("Secr3t!");
        user.verification_status = false;
        user.is_active = false;
        user.verification_token = Some("sometoken".to_string());
        user.verification_token_expires_at = Some(Utc::now() + Duration::hours(1));
        let user_id = user.id;

        repository
            .expect_find_by_verification_token()
            .withf(|token, _| token == "sometoken")
            .times(1)
            .returning(move |_, _| Ok(Some(user.clone())));

        repository
            .expect_mark_verified()
            .withf(move |id| *id == user_id)
            .times(1)
            .returning(|id| {
                let mut user = verified_user("Secr3t!");
                user.id = *id;
                Ok(user)
            });

        let service = service(repository, notifier);
        let updated = service.verify_email("sometoken").await.unwrap();

        assert!(updated.verification_status);
        assert!(updated.is_active);
        assert!(updated.verification_token.is_none());
    }

    #[tokio::test]
    async fn test_verify_email_unknown_or_expired_token() {
        let mut repository = MockTestUserRepository::new();
        let notifier = MockTestNotifier::new();

        // Covers mismatch, expiry, and already-consumed tokens: the
        // repository lookup comes back empty for all three.
        repository
            .expect_find_by_verification_token()
            .times(1)
            .returning(|_, _| Ok(None));
        repository.expect_mark_verified().times(0);

        let service = service(repository, notifier);
        let result = service.verify_email("expired").await;

        assert!(matches!(result, Err(AccountError::InvalidOrExpiredToken)));
    }

    #[tokio::test]
    async fn test_forgot_password_unknown_email_writes_nothing() {
        let mut repository = MockTestUserRepository::new();
        let mut notifier = MockTestNotifier::new();

        repository
            .expect_find_by_email()
            .times(1)
            .returning(|_| Ok(None));
        repository.expect_store_reset_token().times(0);
        notifier.expect_send().times(0);

        let service = service(repository, notifier);
        let email = EmailAddress::new("nobody@x.com".to_string()).unwrap();

        // Same Ok result as the known-email path
        assert!(service.forgot_password(&email).await.is_ok());
    }

    #[tokio::test]
    async fn test_forgot_password_stores_token_and_sends_email() {
        let mut repository = MockTestUserRepository::new();
        let mut notifier = MockTestNotifier::new();

        let user = verified_user("Secr3t!");
        let user_id = user.id;
        repository
            .expect_find_by_email()
            .times(1)
            .returning(move |_| Ok(Some(user.clone())));

        repository
            .expect_store_reset_token()
            .withf(move |id, token, expires_at| {
                *id == user_id && token.len() == 64 && *expires_at > Utc::now()
            })
            .times(1)
            .returning(|_, _, _| Ok(()));

        notifier
            .expect_send()
            .withf(|to, subject, body| {
                to.as_str() == "a@x.com"
                    && subject == "Password reset request"
                    && body.contains("/api/auth/reset-password/")
            })
            .times(1)
            .returning(|_, _, _| Ok(()));

        let service = service(repository, notifier);
        let email = EmailAddress::new("a@x.com".to_string()).unwrap();

        assert!(service.forgot_password(&email).await.is_ok());
    }

    #[tokio::test]
    async fn test_forgot_password_succeeds_when_email_send_fails() {
        let mut repository = MockTestUserRepository::new();
        let mut notifier = MockTestNotifier::new();

        let user = verified_user("Secr3t!");
        repository
            .expect_find_by_email()
            .times(1)
            .returning(move |_| Ok(Some(user.clone())));
        repository
            .expect_store_reset_token()
            .times(1)
            .returning(|_, _, _| Ok(()));

        notifier
            .expect_send()
            .times(1)
            .returning(|_, _, _| Err(NotifierError::Transport("timeout".to_string())));

        let service = service(repository, notifier);
        let email = EmailAddress::new("a@x.com".to_string()).unwrap();

        // One policy everywhere: delivery failure never fails the operation
        assert!(service.forgot_password(&email).await.is_ok());
    }

    #[tokio::test]
    async fn test_reset_password_invalid_or_expired_token() {
        let mut repository = MockTestUserRepository::new();
        let notifier = MockTestNotifier::new();

        repository
            .expect_find_by_reset_token()
            .times(1)
            .returning(|_, _| Ok(None));
        repository.expect_replace_password().times(0);

        let service = service(repository, notifier);
        let result = service.reset_password("stale", "NewSecr3t!").await;

        assert!(matches!(result, Err(AccountError::InvalidOrExpiredToken)));
    }

    #[tokio::test]
    async fn test_reset_password_replaces_hash_and_clears_token() {
        let mut repository = MockTestUserRepository::new();
        let notifier = MockTestNotifier::new();

        let mut user = verified_user("OldSecr3t!");
        user.reset_token = Some("resettoken".to_string());
        user.reset_token_expires_at = Some(Utc::now() + Duration::minutes(30));
        let old_hash = user.password_hash.clone();
        let user_id = user.id;

        repository
            .expect_find_by_reset_token()
            .withf(|token, _| token == "resettoken")
            .times(1)
            .returning(move |_, _| Ok(Some(user.clone())));

        let old_hash_check = old_hash.clone();
        repository
            .expect_replace_password()
            .withf(move |id, password_hash, _| *id == user_id && password_hash != old_hash_check)
            .times(1)
            .returning(|id, password_hash, changed_at| {
                let mut user = verified_user("ignored");
                user.id = *id;
                user.password_hash = password_hash.to_string();
                user.last_password_change = Some(changed_at);
                Ok(user)
            });

        let service = service(repository, notifier);
        let updated = service
            .reset_password("resettoken", "NewSecr3t!")
            .await
            .unwrap();

        // Only the new password verifies against the stored hash
        let hasher = PasswordHasher::new();
        assert!(hasher.verify("NewSecr3t!", &updated.password_hash));
        assert!(!hasher.verify("OldSecr3t!", &updated.password_hash));
        assert_ne!(updated.password_hash, old_hash);
    }

    #[tokio::test]
    async fn test_list_users() {
        let mut repository = MockTestUserRepository::new();
        let notifier = MockTestNotifier::new();

        repository
            .expect_list_all()
            .times(1)
            .returning(|| Ok(vec![verified_user("Secr3t!"), verified_user("Other!")]));

        let service = service(repository, notifier);
        let users = service.list_users().await.unwrap();

        assert_eq!(users.len(), 2);
    }

    #[tokio::test]
    async fn test_get_user_not_found() {
        let mut repository = MockTestUserRepository::new();
        let notifier = MockTestNotifier::new();

        repository
            .expect_find_by_id()
            .times(1)
            .returning(|_| Ok(None));

        let service = service(repository, notifier);
        let result = service.get_user(&UserId::new()).await;

        assert!(matches!(result, Err(AccountError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_create_user_is_verified_and_active() {
        let mut repository = MockTestUserRepository::new();
        let mut notifier = MockTestNotifier::new();

        repository
            .expect_create()
            .withf(|user| {
                user.verification_status
                    && user.is_active
                    && user.verification_token.is_none()
                    && user.verification_token_expires_at.is_none()
                    && user.password_hash.starts_with("$argon2")
            })
            .times(1)
            .returning(|user| Ok(user));

        // Direct creation skips the verification email
        notifier.expect_send().times(0);

        let service = service(repository, notifier);
        let user = service.create_user(register_command()).await.unwrap();

        assert!(user.verification_status);
        assert!(user.is_active);
        assert_ne!(user.password_hash, "Secr3t!");
    }

    #[tokio::test]
    async fn test_update_user_keeps_absent_fields() {
        let mut repository = MockTestUserRepository::new();
        let notifier = MockTestNotifier::new();

        let user = verified_user("Secr3t!");
        let old_hash = user.password_hash.clone();
        repository
            .expect_find_by_id()
            .times(1)
            .returning(move |_| Ok(Some(user.clone())));

        let old_hash_check = old_hash.clone();
        repository
            .expect_update()
            .withf(move |user| {
                user.name == "Renamed"
                    && user.email.as_str() == "a@x.com"
                    && user.password_hash == old_hash_check
                    && user.last_password_change.is_none()
            })
            .times(1)
            .returning(|user| Ok(user));

        let service = service(repository, notifier);
        let command = UpdateUserCommand {
            name: Some("Renamed".to_string()),
            ..Default::default()
        };
        let updated = service.update_user(&UserId::new(), command).await.unwrap();

        assert_eq!(updated.name, "Renamed");
        assert_eq!(updated.password_hash, old_hash);
    }

    #[tokio::test]
    async fn test_update_user_rehashes_password() {
        let mut repository = MockTestUserRepository::new();
        let notifier = MockTestNotifier::new();

        let user = verified_user("OldSecr3t!");
        let old_hash = user.password_hash.clone();
        repository
            .expect_find_by_id()
            .times(1)
            .returning(move |_| Ok(Some(user.clone())));

        let old_hash_check = old_hash.clone();
        repository
            .expect_update()
            .withf(move |user| {
                user.password_hash != old_hash_check && user.last_password_change.is_some()
            })
            .times(1)
            .returning(|user| Ok(user));

        let service = service(repository, notifier);
        let command = UpdateUserCommand {
            password: Some("NewSecr3t!".to_string()),
            ..Default::default()
        };
        let updated = service.update_user(&UserId::new(), command).await.unwrap();

        let hasher = PasswordHasher::new();
        assert!(hasher.verify("NewSecr3t!", &updated.password_hash));
        assert!(!hasher.verify("OldSecr3t!", &updated.password_hash));
    }

    #[tokio::test]
    async fn test_update_user_not_found() {
        let mut repository = MockTestUserRepository::new();
        let notifier = MockTestNotifier::new();

        repository
            .expect_find_by_id()
            .times(1)
            .returning(|_| Ok(None));
        repository.expect_update().times(0);

        let service = service(repository, notifier);
        let result = service
            .update_user(&UserId::new(), UpdateUserCommand::default())
            .await;

        assert!(matches!(result, Err(AccountError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_delete_user() {
        let mut repository = MockTestUserRepository::new();
        let notifier = MockTestNotifier::new();

        repository.expect_delete().times(1).returning(|_| Ok(()));

        let service = service(repository, notifier);
        assert!(service.delete_user(&UserId::new()).await.is_ok());
    }
}
