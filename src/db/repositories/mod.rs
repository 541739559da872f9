//! Database repositories for Custodia
//!
//! This module provides repository implementations for database operations.
//! Repositories encapsulate data access logic and provide a clean API for
//! business logic to interact with the database.

pub mod role;
pub mod user;
pub mod verification;

pub use role::{DEFAULT_ROLE, RoleRepository, RoleRepositoryError};
pub use user::{UserRepository, UserRepositoryError};
pub use verification::{VerificationRepository, VerificationRepositoryError};
