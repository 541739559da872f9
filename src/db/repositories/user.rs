//! User repository for database operations
//!
//! Provides the user-account queries with secure password hashing using bcrypt.
//! Emails are normalized (trimmed, lower-cased) at this boundary so the unique
//! constraint and lookups always agree.

use sqlx::PgPool;
use uuid::Uuid;

use crate::db::models::User;

/// Cost factor for bcrypt hashing (12 is recommended for production)
const BCRYPT_COST: u32 = 12;

const USER_COLUMNS: &str = "id, first_name, last_name, email, password_hash, address, phone, \
                            title, bio, image_url, enabled, not_locked, using_mfa, created_at";

/// User repository error types
#[derive(Debug, thiserror::Error)]
pub enum UserRepositoryError {
    #[error("User not found")]
    NotFound,

    #[error("Email already exists")]
    EmailAlreadyExists,

    #[error("Password hashing failed: {0}")]
    HashingError(String),

    #[error("Database error: {0}")]
    DatabaseError(#[from] sqlx::Error),
}

/// User repository for database operations
#[derive(Clone)]
pub struct UserRepository {
    pool: PgPool,
}

impl UserRepository {
    /// Create a new user repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Hash a password using bcrypt with automatic salt generation
    pub fn hash_password(password: &str) -> Result<String, UserRepositoryError> {
        bcrypt::hash(password, BCRYPT_COST)
            .map_err(|e| UserRepositoryError::HashingError(e.to_string()))
    }

    /// Verify a password against a bcrypt hash
    pub fn verify_password(password: &str, hash: &str) -> Result<bool, UserRepositoryError> {
        bcrypt::verify(password, hash).map_err(|e| UserRepositoryError::HashingError(e.to_string()))
    }

    /// Canonical storage form of an email address
    pub fn normalize_email(email: &str) -> String {
        email.trim().to_lowercase()
    }

    /// Count accounts registered under an email
    pub async fn email_count(&self, email: &str) -> Result<i64, UserRepositoryError> {
        let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM users WHERE email = $1")
            .bind(Self::normalize_email(email))
            .fetch_one(&self.pool)
            .await?;

        Ok(count.0)
    }

    /// Create a new user with a plain text password (will be hashed).
    ///
    /// New accounts are persisted enabled so login works immediately after
    /// registration; the account-verification link stays redeemable.
    pub async fn create(
        &self,
        first_name: &str,
        last_name: &str,
        email: &str,
        password: &str,
    ) -> Result<User, UserRepositoryError> {
        let email = Self::normalize_email(email);

        if self.email_count(&email).await? > 0 {
            return Err(UserRepositoryError::EmailAlreadyExists);
        }

        let password_hash = Self::hash_password(password)?;

        let user = sqlx::query_as::<_, User>(&format!(
            r#"
            INSERT INTO users (first_name, last_name, email, password_hash, enabled)
            VALUES ($1, $2, $3, $4, TRUE)
            RETURNING {USER_COLUMNS}
            "#,
        ))
        .bind(first_name)
        .bind(last_name)
        .bind(&email)
        .bind(&password_hash)
        .fetch_one(&self.pool)
        .await?;

        Ok(user)
    }

    /// Find a user by ID
    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, UserRepositoryError> {
        let user = sqlx::query_as::<_, User>(&format!(
            r#"
            SELECT {USER_COLUMNS}
            FROM users
            WHERE id = $1
            "#,
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    /// Find a user by email
    pub async fn find_by_email(&self, email: &str) -> Result<Option<User>, UserRepositoryError> {
        let user = sqlx::query_as::<_, User>(&format!(
            r#"
            SELECT {USER_COLUMNS}
            FROM users
            WHERE email = $1
            "#,
        ))
        .bind(Self::normalize_email(email))
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    /// Mark an account as enabled (account-verification redemption)
    pub async fn enable(&self, id: Uuid) -> Result<(), UserRepositoryError> {
        let result = sqlx::query(
            r#"
            UPDATE users
            SET enabled = TRUE
            WHERE id = $1
            "#,
        )
        .bind(id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(UserRepositoryError::NotFound);
        }

        Ok(())
    }

    /// Update user's password (takes plain text, hashes it)
    pub async fn update_password(
        &self,
        id: Uuid,
        new_password: &str,
    ) -> Result<(), UserRepositoryError> {
        let password_hash = Self::hash_password(new_password)?;

        let result = sqlx::query(
            r#"
            UPDATE users
            SET password_hash = $2
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(&password_hash)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(UserRepositoryError::NotFound);
        }

        Ok(())
    }

    /// Delete a user by ID (test cleanup; accounts are never deleted in the API)
    pub async fn delete(&self, id: Uuid) -> Result<bool, UserRepositoryError> {
        let result = sqlx::query(
            r#"
            DELETE FROM users
            WHERE id = $1
            "#,
        )
        .bind(id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }
}
