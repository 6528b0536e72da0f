//! Errors raised by storage adapters

use std::fmt;
use thiserror::Error;

/// Numeric code storage engines use to report a uniqueness violation.
pub const DUPLICATE_KEY_CODE: i32 = 11000;

/// A single field complaint produced by model-level validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub path: String,
    pub message: String,
}

/// Model validation failure: an ordered field -> message map.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ModelValidationError {
    errors: Vec<FieldError>,
}

impl ModelValidationError {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a complaint for `path`. Order of insertion is preserved.
    pub fn push(&mut self, path: impl Into<String>, message: impl Into<String>) {
        self.errors.push(FieldError {
            path: path.into(),
            message: message.into(),
        });
    }

    pub fn errors(&self) -> &[FieldError] {
        &self.errors
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// `Ok(())` when nothing was recorded.
    pub fn into_result(self) -> Result<(), Self> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }
}

impl fmt::Display for ModelValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self
            .errors
            .iter()
            .map(|e| format!("{}: {}", e.path, e.message))
            .collect();
        write!(f, "{}", parts.join(", "))
    }
}

impl std::error::Error for ModelValidationError {}

#[derive(Error, Debug)]
pub enum PersistenceError {
    #[error("validation failed: {0}")]
    Validation(#[from] ModelValidationError),

    #[error("E{code} duplicate key error collection: {collection} key: {}", key_pattern.join(", "))]
    DuplicateKey {
        code: i32,
        collection: String,
        key_pattern: Vec<String>,
    },

    #[error("failed to decode stored document: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("storage backend error: {0}")]
    Backend(String),
}

impl PersistenceError {
    pub fn duplicate_key(collection: &str, key: &str) -> Self {
        Self::DuplicateKey {
            code: DUPLICATE_KEY_CODE,
            collection: collection.to_string(),
            key_pattern: vec![key.to_string()],
        }
    }

    /// Engine error code, when the failure carries one.
    pub fn code(&self) -> Option<i32> {
        match self {
            Self::DuplicateKey { code, .. } => Some(*code),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_model_validation_preserves_order() {
        let mut err = ModelValidationError::new();
        err.push("username", "username is required");
        err.push("email", "email is invalid");
        err.push("username", "username is too short");

        let paths: Vec<&str> = err.errors().iter().map(|e| e.path.as_str()).collect();
        assert_eq!(paths, vec!["username", "email", "username"]);
        assert!(err.clone().into_result().is_err());
        assert!(ModelValidationError::new().into_result().is_ok());
    }

    #[test]
    fn test_duplicate_key_code() {
        let err = PersistenceError::duplicate_key("users", "email");
        assert_eq!(err.code(), Some(DUPLICATE_KEY_CODE));
        assert_eq!(
            err.to_string(),
            "E11000 duplicate key error collection: users key: email"
        );
        assert_eq!(PersistenceError::Backend("down".into()).code(), None);
    }
}
