//! Role repository for database operations
//!
//! Roles are seeded by migration; at runtime they are only read and linked to
//! users. The comma-joined `permission` column is split into the domain
//! `Role::authorities` here, at the storage boundary.

use sqlx::PgPool;
use uuid::Uuid;

use crate::db::models::{Role, RoleRow};

/// Role assigned to every newly registered account
pub const DEFAULT_ROLE: &str = "ROLE_USER";

/// Role repository error types
#[derive(Debug, thiserror::Error)]
pub enum RoleRepositoryError {
    #[error("No role found by name: {0}")]
    NotFoundByName(String),

    #[error("Database error: {0}")]
    DatabaseError(#[from] sqlx::Error),
}

/// Role repository for database operations
#[derive(Clone)]
pub struct RoleRepository {
    pool: PgPool,
}

impl RoleRepository {
    /// Create a new role repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Find a role by its unique name
    pub async fn find_by_name(&self, name: &str) -> Result<Option<Role>, RoleRepositoryError> {
        let row = sqlx::query_as::<_, RoleRow>(
            r#"
            SELECT id, name, permission
            FROM roles
            WHERE name = $1
            "#,
        )
        .bind(name)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Role::from))
    }

    /// Find the role assigned to a user
    pub async fn find_by_user_id(
        &self,
        user_id: Uuid,
    ) -> Result<Option<Role>, RoleRepositoryError> {
        let row = sqlx::query_as::<_, RoleRow>(
            r#"
            SELECT r.id, r.name, r.permission
            FROM roles r
            JOIN user_roles ur ON ur.role_id = r.id
            WHERE ur.user_id = $1
            "#,
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Role::from))
    }

    /// Link a user to the named role and return it
    pub async fn assign_to_user(
        &self,
        user_id: Uuid,
        role_name: &str,
    ) -> Result<Role, RoleRepositoryError> {
        let role = self
            .find_by_name(role_name)
            .await?
            .ok_or_else(|| RoleRepositoryError::NotFoundByName(role_name.to_string()))?;

        sqlx::query(
            r#"
            INSERT INTO user_roles (user_id, role_id)
            VALUES ($1, $2)
            "#,
        )
        .bind(user_id)
        .bind(role.id)
        .execute(&self.pool)
        .await?;

        Ok(role)
    }
}
