//! User module for Custodia
//!
//! This module provides the account-facing functionality:
//! - Registration and profile lookup
//! - Account-activation and password-reset link flows
//! - REST API endpoints under `/user`

pub mod api;
pub mod service;

pub use api::{ApiState, app, user_router};
pub use service::{LoginRequest, RegisterRequest, UserService};
