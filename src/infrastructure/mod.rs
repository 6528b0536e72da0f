//! Infrastructure layer - Technical implementations
//!
//! This layer contains the storage adapters behind `DocumentCollection`.

pub mod persistence;
