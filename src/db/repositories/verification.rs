//! Verification link repository for database operations
//!
//! Persists the one-time URLs behind account activation and password reset.
//! Reset links are replaced wholesale (delete old, insert new) so a user can
//! hold at most one live reset link; the unique constraint on `user_id`
//! backs that up under concurrent requests.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::db::models::{AccountVerification, PasswordVerification};

/// Verification repository error types
#[derive(Debug, thiserror::Error)]
pub enum VerificationRepositoryError {
    #[error("Database error: {0}")]
    DatabaseError(#[from] sqlx::Error),
}

/// Verification link repository for database operations
#[derive(Clone)]
pub struct VerificationRepository {
    pool: PgPool,
}

impl VerificationRepository {
    /// Create a new verification repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Store the account-activation link created at registration
    pub async fn insert_account_link(
        &self,
        user_id: Uuid,
        url: &str,
    ) -> Result<AccountVerification, VerificationRepositoryError> {
        let link = sqlx::query_as::<_, AccountVerification>(
            r#"
            INSERT INTO account_verifications (user_id, url)
            VALUES ($1, $2)
            RETURNING id, user_id, url
            "#,
        )
        .bind(user_id)
        .bind(url)
        .fetch_one(&self.pool)
        .await?;

        Ok(link)
    }

    /// Look up an account-activation link by its full URL
    pub async fn find_account_link(
        &self,
        url: &str,
    ) -> Result<Option<AccountVerification>, VerificationRepositoryError> {
        let link = sqlx::query_as::<_, AccountVerification>(
            r#"
            SELECT id, user_id, url
            FROM account_verifications
            WHERE url = $1
            "#,
        )
        .bind(url)
        .fetch_optional(&self.pool)
        .await?;

        Ok(link)
    }

    /// Replace the user's reset link with a fresh one.
    ///
    /// Any previous link is dropped first, which is what invalidates it.
    pub async fn replace_password_link(
        &self,
        user_id: Uuid,
        url: &str,
        expiration_date: DateTime<Utc>,
    ) -> Result<PasswordVerification, VerificationRepositoryError> {
        sqlx::query(
            r#"
            DELETE FROM reset_password_verifications
            WHERE user_id = $1
            "#,
        )
        .bind(user_id)
        .execute(&self.pool)
        .await?;

        let link = sqlx::query_as::<_, PasswordVerification>(
            r#"
            INSERT INTO reset_password_verifications (user_id, url, expiration_date)
            VALUES ($1, $2, $3)
            RETURNING id, user_id, url, expiration_date
            "#,
        )
        .bind(user_id)
        .bind(url)
        .bind(expiration_date)
        .fetch_one(&self.pool)
        .await?;

        Ok(link)
    }

    /// Look up a reset link by its full URL
    pub async fn find_password_link(
        &self,
        url: &str,
    ) -> Result<Option<PasswordVerification>, VerificationRepositoryError> {
        let link = sqlx::query_as::<_, PasswordVerification>(
            r#"
            SELECT id, user_id, url, expiration_date
            FROM reset_password_verifications
            WHERE url = $1
            "#,
        )
        .bind(url)
        .fetch_optional(&self.pool)
        .await?;

        Ok(link)
    }

    /// Drop a reset link after it has been redeemed
    pub async fn delete_password_link(
        &self,
        url: &str,
    ) -> Result<bool, VerificationRepositoryError> {
        let result = sqlx::query(
            r#"
            DELETE FROM reset_password_verifications
            WHERE url = $1
            "#,
        )
        .bind(url)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }
}
