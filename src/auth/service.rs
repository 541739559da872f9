//! Authentication service
//!
//! Checks submitted credentials against stored bcrypt hashes and loads the
//! matching principal. Credential failures and account-state failures are
//! reported as distinct errors so the API layer can surface the right
//! message.

use crate::auth::principal::Principal;
use crate::db::{PgPool, RoleRepository, User, UserRepository};
use crate::error::ApiError;

/// Authentication service handling credential checks and principal loading
#[derive(Clone)]
pub struct AuthService {
    users: UserRepository,
    roles: RoleRepository,
}

impl AuthService {
    pub fn new(pool: PgPool) -> Self {
        Self {
            users: UserRepository::new(pool.clone()),
            roles: RoleRepository::new(pool),
        }
    }

    /// Verify email + password and return the principal on success.
    ///
    /// An unknown email and a wrong password both map to the same
    /// authentication failure; account-state checks only run once the
    /// credentials themselves are good.
    pub async fn authenticate(&self, email: &str, password: &str) -> Result<Principal, ApiError> {
        let user = self
            .users
            .find_by_email(email)
            .await?
            .ok_or(ApiError::AuthenticationFailed)?;

        let password_matches = UserRepository::verify_password(password, &user.password_hash)
            .unwrap_or(false);
        if !password_matches {
            return Err(ApiError::AuthenticationFailed);
        }

        if !user.enabled {
            return Err(ApiError::AccountDisabled);
        }
        if !user.not_locked {
            return Err(ApiError::AccountLocked);
        }

        self.into_principal(user).await
    }

    /// Load the principal for an already-verified subject (refresh flow,
    /// request authentication). No credential or account-state checks.
    pub async fn load_principal(&self, email: &str) -> Result<Principal, ApiError> {
        let user = self
            .users
            .find_by_email(email)
            .await?
            .ok_or_else(|| ApiError::NotFound(format!("No user found with email: {email}")))?;

        self.into_principal(user).await
    }

    async fn into_principal(&self, user: User) -> Result<Principal, ApiError> {
        let role = self.roles.find_by_user_id(user.id).await?.ok_or_else(|| {
            ApiError::Unexpected(format!("No role assigned to user {}", user.email))
        })?;

        Ok(Principal::new(user, role))
    }
}
