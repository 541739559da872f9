//! Authenticated principal
//!
//! Pairs a user record with its resolved role so callers can reach the
//! username, account flags and authority strings without further lookups.

use crate::db::{Role, User, UserDto};

/// A fully loaded identity: the user plus the role granting its authorities
#[derive(Debug, Clone)]
pub struct Principal {
    pub user: User,
    pub role: Role,
}

impl Principal {
    pub fn new(user: User, role: Role) -> Self {
        Self { user, role }
    }

    /// The login identifier; emails are unique so they double as usernames
    pub fn username(&self) -> &str {
        &self.user.email
    }

    /// Authority strings granted through the role, in catalog order
    pub fn authorities(&self) -> &[String] {
        &self.role.authorities
    }

    pub fn is_enabled(&self) -> bool {
        self.user.enabled
    }

    pub fn is_not_locked(&self) -> bool {
        self.user.not_locked
    }

    /// Wire representation used inside response envelopes
    pub fn to_dto(&self) -> UserDto {
        UserDto::from_parts(self.user.clone(), &self.role)
    }
}
