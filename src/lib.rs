//! User service - a JSON HTTP backend over a document store
//!
//! Every failure raised while serving a request is classified into one of a
//! small set of canonical error shapes in a single place
//! (`interface::api::error_handler`); entities are persisted through a
//! generic repository over a `DocumentCollection`.

pub mod application;
pub mod config;
pub mod domain;
pub mod infrastructure;
pub mod interface;

// Re-export commonly used types
pub use domain::shared::error::AppError;
pub use domain::shared::failure::Failure;
pub use domain::shared::result::Result;
