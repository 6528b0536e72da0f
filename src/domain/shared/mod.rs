//! Shared kernel - Common types used across all entities

pub mod document;
pub mod error;
pub mod failure;
pub mod persistence;
pub mod repository;
pub mod result;

pub use document::{Document, DocumentId, FieldFilter, Model, Projection, Record};
pub use error::AppError;
pub use failure::{Failure, SchemaValidationError, ValidationIssue};
pub use persistence::{FieldError, ModelValidationError, PersistenceError, DUPLICATE_KEY_CODE};
pub use repository::{CrudRepository, DocumentCollection};
pub use result::Result;
