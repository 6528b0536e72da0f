//! Interface layer - External interfaces
//!
//! This layer handles:
//! - REST API endpoints
//! - Request validation
//! - Error classification and response formatting

pub mod api;
