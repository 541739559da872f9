//! Database models for Custodia
//!
//! This module defines the database entity structs that map to PostgreSQL
//! tables, plus the wire-facing `UserDto`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

// ============================================================================
// User Model
// ============================================================================

/// User entity representing a registered account
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub address: Option<String>,
    pub phone: Option<String>,
    pub title: Option<String>,
    pub bio: Option<String>,
    pub image_url: Option<String>,
    pub enabled: bool,
    pub not_locked: bool,
    pub using_mfa: bool,
    pub created_at: DateTime<Utc>,
}

// ============================================================================
// Role Model
// ============================================================================

/// Role as stored: the authority list is a single comma-joined column
#[derive(Debug, Clone, FromRow)]
pub struct RoleRow {
    pub id: Uuid,
    pub name: String,
    pub permission: String,
}

/// Role as the rest of the service sees it: an ordered authority list
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Role {
    pub id: Uuid,
    pub name: String,
    pub authorities: Vec<String>,
}

impl From<RoleRow> for Role {
    fn from(row: RoleRow) -> Self {
        let authorities = row
            .permission
            .split(',')
            .map(str::trim)
            .filter(|a| !a.is_empty())
            .map(String::from)
            .collect();
        Self {
            id: row.id,
            name: row.name,
            authorities,
        }
    }
}

// ============================================================================
// Verification Link Models
// ============================================================================

/// Which one-time-link flow a key belongs to; also the `{type}` segment of
/// the stored URL `{base}/user/verify/{type}/{key}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerificationKind {
    Account,
    Password,
}

impl VerificationKind {
    /// Client-facing reason when a key of this kind matches no stored link.
    pub fn invalid_link_reason(&self) -> &'static str {
        match self {
            VerificationKind::Account => "This link is not valid.",
            VerificationKind::Password => {
                "This link is not valid. Please reset your password again"
            }
        }
    }
}

impl std::fmt::Display for VerificationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            VerificationKind::Account => write!(f, "account"),
            VerificationKind::Password => write!(f, "password"),
        }
    }
}

/// Account-activation link; lives until the account row does
#[derive(Debug, Clone, FromRow)]
pub struct AccountVerification {
    pub id: Uuid,
    pub user_id: Uuid,
    pub url: String,
}

/// Password-reset link; single use, expires 24 hours after creation
#[derive(Debug, Clone, FromRow)]
pub struct PasswordVerification {
    pub id: Uuid,
    pub user_id: Uuid,
    pub url: String,
    pub expiration_date: DateTime<Utc>,
}

impl PasswordVerification {
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expiration_date < now
    }
}

// ============================================================================
// User DTO
// ============================================================================

/// User without sensitive data, enriched with its role (for API responses).
/// Serialized camelCase because the browser client reads `firstName`,
/// `roleName` and friends directly.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserDto {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub address: Option<String>,
    pub phone: Option<String>,
    pub title: Option<String>,
    pub bio: Option<String>,
    pub image_url: Option<String>,
    pub enabled: bool,
    pub not_locked: bool,
    pub using_mfa: bool,
    pub created_at: DateTime<Utc>,
    pub role_name: String,
    pub authorities: Vec<String>,
}

impl UserDto {
    /// Build the wire form from a user and its role.
    pub fn from_parts(user: User, role: &Role) -> Self {
        Self {
            id: user.id,
            first_name: user.first_name,
            last_name: user.last_name,
            email: user.email,
            address: user.address,
            phone: user.phone,
            title: user.title,
            bio: user.bio,
            image_url: user.image_url,
            enabled: user.enabled,
            not_locked: user.not_locked,
            using_mfa: user.using_mfa,
            created_at: user.created_at,
            role_name: role.name.clone(),
            authorities: role.authorities.clone(),
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
