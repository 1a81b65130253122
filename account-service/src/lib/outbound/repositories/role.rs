use sqlx::PgPool;

use crate::account::errors::AccountError;
use crate::account::models::Role;
use crate::account::models::RoleId;

/// Role lookups, used at startup to resolve the default role by name.
///
/// The seed set itself is created idempotently by migration, so there
/// is nothing to write here.
pub struct PostgresRoleRepository {
    pool: PgPool,
}

impl PostgresRoleRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Retrieve a role by its unique name.
    pub async fn find_by_name(&self, name: &str) -> Result<Option<Role>, AccountError> {
        let row: Option<(i32, String)> =
            sqlx::query_as("SELECT id, name FROM roles WHERE name = $1")
                .bind(name)
                .fetch_optional(&self.pool)
                .await
                .map_err(|e| AccountError::DatabaseError(e.to_string()))?;

        Ok(row.map(|(id, name)| Role {
            id: RoleId(id),
            name,
        }))
    }
}
