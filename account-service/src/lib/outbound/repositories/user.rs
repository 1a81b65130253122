use async_trait::async_trait;
use chrono::DateTime;
use chrono::Utc;
use sqlx::PgPool;
use uuid::Uuid;

use crate::account::errors::AccountError;
use crate::account::models::EmailAddress;
use crate::account::models::PhoneNumber;
use crate::account::models::RoleId;
use crate::account::models::User;
use crate::account::models::UserId;
use crate::account::ports::UserRepository;

const SELECT_USER: &str = r#"
    SELECT id, email, phone_number, name, last_name, address, location,
           password_hash, role_id, verification_status, is_active,
           verification_token, verification_token_expires_at,
           reset_token, reset_token_expires_at,
           last_password_change, created_at
    FROM users
"#;

pub struct PostgresUserRepository {
    pool: PgPool,
}

impl PostgresUserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Raw row shape; converted into the domain entity after fetching.
#[derive(sqlx::FromRow)]
struct UserRow {
    id: Uuid,
    email: String,
    phone_number: String,
    name: String,
    last_name: String,
    address: String,
    location: String,
    password_hash: String,
    role_id: i32,
    verification_status: bool,
    is_active: bool,
    verification_token: Option<String>,
    verification_token_expires_at: Option<DateTime<Utc>>,
    reset_token: Option<String>,
    reset_token_expires_at: Option<DateTime<Utc>>,
    last_password_change: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
}

impl TryFrom<UserRow> for User {
    type Error = AccountError;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        Ok(User {
            id: UserId(row.id),
            email: EmailAddress::new(row.email)?,
            phone_number: PhoneNumber::new(row.phone_number)?,
            name: row.name,
            last_name: row.last_name,
            address: row.address,
            location: row.location,
            password_hash: row.password_hash,
            role_id: RoleId(row.role_id),
            verification_status: row.verification_status,
            is_active: row.is_active,
            verification_token: row.verification_token,
            verification_token_expires_at: row.verification_token_expires_at,
            reset_token: row.reset_token,
            reset_token_expires_at: row.reset_token_expires_at,
            last_password_change: row.last_password_change,
            created_at: row.created_at,
        })
    }
}

/// Map a unique-constraint violation to the matching conflict error.
fn map_unique_violation(e: sqlx::Error, user: &User) -> AccountError {
    if let Some(db_err) = e.as_database_error() {
        if db_err.is_unique_violation() {
            if db_err.constraint() == Some("users_email_key") {
                return AccountError::EmailAlreadyExists(user.email.as_str().to_string());
            }
            if db_err.constraint() == Some("users_phone_number_key") {
                return AccountError::PhoneNumberAlreadyExists(
                    user.phone_number.as_str().to_string(),
                );
            }
        }
    }
    AccountError::DatabaseError(e.to_string())
}

#[async_trait]
impl UserRepository for PostgresUserRepository {
    async fn create(&self, user: User) -> Result<User, AccountError> {
        sqlx::query(
            r#"
            INSERT INTO users (id, email, phone_number, name, last_name, address, location,
                               password_hash, role_id, verification_status, is_active,
                               verification_token, verification_token_expires_at,
                               reset_token, reset_token_expires_at,
                               last_password_change, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17)
            "#,
        )
        .bind(user.id.0)
        .bind(user.email.as_str())
        .bind(user.phone_number.as_str())
        .bind(&user.name)
        .bind(&user.last_name)
        .bind(&user.address)
        .bind(&user.location)
        .bind(&user.password_hash)
        .bind(user.role_id.0)
        .bind(user.verification_status)
        .bind(user.is_active)
        .bind(&user.verification_token)
        .bind(user.verification_token_expires_at)
        .bind(&user.reset_token)
        .bind(user.reset_token_expires_at)
        .bind(user.last_password_change)
        .bind(user.created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| map_unique_violation(e, &user))?;

        Ok(user)
    }

    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, AccountError> {
        let row = sqlx::query_as::<_, UserRow>(&format!("{} WHERE id = $1", SELECT_USER))
            .bind(id.0)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AccountError::DatabaseError(e.to_string()))?;

        row.map(User::try_from).transpose()
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, AccountError> {
        let row = sqlx::query_as::<_, UserRow>(&format!("{} WHERE email = $1", SELECT_USER))
            .bind(email)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AccountError::DatabaseError(e.to_string()))?;

        row.map(User::try_from).transpose()
    }

    async fn find_by_phone_number(&self, phone_number: &str) -> Result<Option<User>, AccountError> {
        let row = sqlx::query_as::<_, UserRow>(&format!("{} WHERE phone_number = $1", SELECT_USER))
            .bind(phone_number)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AccountError::DatabaseError(e.to_string()))?;

        row.map(User::try_from).transpose()
    }

    async fn find_by_verification_token(
        &self,
        token: &str,
        not_expired_at: DateTime<Utc>,
    ) -> Result<Option<User>, AccountError> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "{} WHERE verification_token = $1 AND verification_token_expires_at >= $2",
            SELECT_USER
        ))
        .bind(token)
        .bind(not_expired_at)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AccountError::DatabaseError(e.to_string()))?;

        row.map(User::try_from).transpose()
    }

    async fn find_by_reset_token(
        &self,
        token: &str,
        not_expired_at: DateTime<Utc>,
    ) -> Result<Option<User>, AccountError> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "{} WHERE reset_token = $1 AND reset_token_expires_at >= $2",
            SELECT_USER
        ))
        .bind(token)
        .bind(not_expired_at)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AccountError::DatabaseError(e.to_string()))?;

        row.map(User::try_from).transpose()
    }

    async fn list_all(&self) -> Result<Vec<User>, AccountError> {
        let rows = sqlx::query_as::<_, UserRow>(&format!("{} ORDER BY created_at", SELECT_USER))
            .fetch_all(&self.pool)
            .await
            .map_err(|e| AccountError::DatabaseError(e.to_string()))?;

        rows.into_iter().map(User::try_from).collect()
    }

    async fn mark_verified(&self, id: &UserId) -> Result<User, AccountError> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            UPDATE users
            SET verification_status = TRUE, is_active = TRUE,
                verification_token = NULL, verification_token_expires_at = NULL
            WHERE id = $1
            RETURNING id, email, phone_number, name, last_name, address, location,
                      password_hash, role_id, verification_status, is_active,
                      verification_token, verification_token_expires_at,
                      reset_token, reset_token_expires_at,
                      last_password_change, created_at
            "#,
        )
        .bind(id.0)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AccountError::DatabaseError(e.to_string()))?;

        row.map(User::try_from)
            .transpose()?
            .ok_or_else(|| AccountError::NotFound(id.to_string()))
    }

    async fn store_reset_token(
        &self,
        id: &UserId,
        token: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<(), AccountError> {
        let result = sqlx::query(
            "UPDATE users SET reset_token = $2, reset_token_expires_at = $3 WHERE id = $1",
        )
        .bind(id.0)
        .bind(token)
        .bind(expires_at)
        .execute(&self.pool)
        .await
        .map_err(|e| AccountError::DatabaseError(e.to_string()))?;

        if result.rows_affected() == 0 {
            return Err(AccountError::NotFound(id.to_string()));
        }

        Ok(())
    }

    async fn replace_password(
        &self,
        id: &UserId,
        password_hash: &str,
        changed_at: DateTime<Utc>,
    ) -> Result<User, AccountError> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            UPDATE users
            SET password_hash = $2, reset_token = NULL, reset_token_expires_at = NULL,
                last_password_change = $3
            WHERE id = $1
            RETURNING id, email, phone_number, name, last_name, address, location,
                      password_hash, role_id, verification_status, is_active,
                      verification_token, verification_token_expires_at,
                      reset_token, reset_token_expires_at,
                      last_password_change, created_at
            "#,
        )
        .bind(id.0)
        .bind(password_hash)
        .bind(changed_at)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AccountError::DatabaseError(e.to_string()))?;

        row.map(User::try_from)
            .transpose()?
            .ok_or_else(|| AccountError::NotFound(id.to_string()))
    }

    async fn update(&self, user: User) -> Result<User, AccountError> {
        let result = sqlx::query(
            r#"
            UPDATE users
            SET email = $2, phone_number = $3, name = $4, last_name = $5,
                address = $6, location = $7, password_hash = $8, role_id = $9,
                verification_status = $10, is_active = $11,
                verification_token = $12, verification_token_expires_at = $13,
                reset_token = $14, reset_token_expires_at = $15,
                last_password_change = $16
            WHERE id = $1
            "#,
        )
        .bind(user.id.0)
        .bind(user.email.as_str())
        .bind(user.phone_number.as_str())
        .bind(&user.name)
        .bind(&user.last_name)
        .bind(&user.address)
        .bind(&user.location)
        .bind(&user.password_hash)
        .bind(user.role_id.0)
        .bind(user.verification_status)
        .bind(user.is_active)
        .bind(&user.verification_token)
        .bind(user.verification_token_expires_at)
        .bind(&user.reset_token)
        .bind(user.reset_token_expires_at)
        .bind(user.last_password_change)
        .execute(&self.pool)
        .await
        .map_err(|e| map_unique_violation(e, &user))?;

        if result.rows_affected() == 0 {
            return Err(AccountError::NotFound(user.id.to_string()));
        }

        Ok(user)
    }

    async fn delete(&self, id: &UserId) -> Result<(), AccountError> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id.0)
            .execute(&self.pool)
            .await
            .map_err(|e| AccountError::DatabaseError(e.to_string()))?;

        if result.rows_affected() == 0 {
            return Err(AccountError::NotFound(id.to_string()));
        }

        Ok(())
    }
}
