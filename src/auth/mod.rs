//! Authentication module for Custodia
//!
//! This module provides authentication functionality including:
//! - JWT token generation and verification (HS512)
//! - Credential checks against stored bcrypt hashes
//! - The two-step authorization middleware pipeline
//! - The authenticated principal and request context types

pub mod jwt;
pub mod middleware;
pub mod principal;
pub mod service;

pub use jwt::{Claims, JwtError, JwtService};
pub use middleware::{AuthContext, PUBLIC_URLS, TOKEN_PREFIX, access_policy, authorization_filter};
pub use principal::Principal;
pub use service::AuthService;
