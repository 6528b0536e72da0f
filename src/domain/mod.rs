//! Domain layer - Core business logic and rules
//!
//! This layer contains:
//! - The failure taxonomy every layer reports through
//! - Document model and the generic repository over it
//! - Entities, their repositories and services

pub mod shared;
pub mod user;

// Re-export commonly used types
pub use shared::{AppError, Failure, Result};
