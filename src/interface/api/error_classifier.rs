//! Failure classification
//!
//! Maps every [`Failure`] onto one of four canonical categories together
//! with the status, code, message and field details the client will see.
//! The arms below are a priority chain and are evaluated top to bottom:
//!
//! 1. request-body validation
//! 2. model validation raised by the store
//! 3. duplicate key (engine code 11000)
//! 4. domain errors carrying their own status/name/message
//! 5. everything else
//!
//! The last arm makes the mapping total.

use super::error_response::FieldIssue;
use crate::domain::shared::failure::Failure;
use crate::domain::shared::persistence::{PersistenceError, DUPLICATE_KEY_CODE};
use axum::http::StatusCode;
use std::borrow::Cow;

pub const SCHEMA_VALIDATION_CODE: &str = "ZOD_VALIDATION_ERROR";
pub const MODEL_VALIDATION_CODE: &str = "MONGOOSE_VALIDATION_ERROR";
pub const DUPLICATE_KEY_ERROR_CODE: &str = "MONGO_DUPLICATE_KEY";
pub const INTERNAL_ERROR_CODE: &str = "INTERNAL_SERVER_ERROR";

pub const VALIDATION_MESSAGE: &str = "Validation failed";
pub const DUPLICATE_KEY_MESSAGE: &str = "Duplicate key";
pub const INTERNAL_ERROR_MESSAGE: &str = "Internal Server Error";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    Validation,
    DuplicateKey,
    Domain,
    Internal,
}

impl ErrorCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCategory::Validation => "VALIDATION",
            ErrorCategory::DuplicateKey => "DUPLICATE_KEY",
            ErrorCategory::Domain => "DOMAIN",
            ErrorCategory::Internal => "INTERNAL",
        }
    }
}

/// Everything the response builder needs to render a failure
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classification {
    pub category: ErrorCategory,
    pub status: StatusCode,
    pub code: Cow<'static, str>,
    pub message: Cow<'static, str>,
    /// Present only for `Validation` and `DuplicateKey`
    pub details: Option<Vec<FieldIssue>>,
}

impl Classification {
    fn validation(code: &'static str, details: Vec<FieldIssue>) -> Self {
        Self {
            category: ErrorCategory::Validation,
            status: StatusCode::BAD_REQUEST,
            code: Cow::Borrowed(code),
            message: Cow::Borrowed(VALIDATION_MESSAGE),
            details: Some(details),
        }
    }

    fn internal() -> Self {
        Self {
            category: ErrorCategory::Internal,
            status: StatusCode::INTERNAL_SERVER_ERROR,
            code: Cow::Borrowed(INTERNAL_ERROR_CODE),
            message: Cow::Borrowed(INTERNAL_ERROR_MESSAGE),
            details: None,
        }
    }
}

/// Classify a failure. Pure: the same failure always yields the same result.
pub fn classify(failure: &Failure) -> Classification {
    match failure {
        Failure::SchemaValidation(err) => Classification::validation(
            SCHEMA_VALIDATION_CODE,
            err.issues()
                .iter()
                .map(|issue| FieldIssue::new(issue.dotted_path(), issue.message.clone()))
                .collect(),
        ),

        Failure::Persistence(PersistenceError::Validation(err)) => Classification::validation(
            MODEL_VALIDATION_CODE,
            err.errors()
                .iter()
                .map(|field| FieldIssue::new(field.path.clone(), field.message.clone()))
                .collect(),
        ),

        Failure::Persistence(PersistenceError::DuplicateKey {
            code, key_pattern, ..
        }) if *code == DUPLICATE_KEY_CODE && !key_pattern.is_empty() => {
            Classification {
                category: ErrorCategory::DuplicateKey,
                status: StatusCode::CONFLICT,
                code: Cow::Borrowed(DUPLICATE_KEY_ERROR_CODE),
                message: Cow::Borrowed(DUPLICATE_KEY_MESSAGE),
                details: Some(
                    key_pattern
                        .iter()
                        .map(|key| FieldIssue::new(key.clone(), format!("{} already exists", key)))
                        .collect(),
                ),
            }
        }

        Failure::Domain(err) => match http_status(err.status()) {
            Some(status) => Classification {
                category: ErrorCategory::Domain,
                status,
                code: Cow::Owned(err.name().to_string()),
                message: Cow::Owned(err.message().to_string()),
                details: None,
            },
            // a status outside 100..=599 is a bug in the raising code
            None => Classification::internal(),
        },

        Failure::Persistence(_) | Failure::Unexpected(_) => Classification::internal(),
    }
}

fn http_status(status: u16) -> Option<StatusCode> {
    if (100..=599).contains(&status) {
        StatusCode::from_u16(status).ok()
    } else {
        None
    }
}
