//! Request result type

use super::failure::Failure;

/// Standard result type for anything that can end a request
pub type Result<T> = std::result::Result<T, Failure>;
