//! Custodia - User Account and Authentication Service
//!
//! A REST backend for user accounts: registration with account-activation
//! links, login with JWT access/refresh tokens, role-derived authorities,
//! and password reset through expiring one-time links.

pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod response;
pub mod user;
