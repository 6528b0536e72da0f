//! The closed set of failures a request can end with.
//!
//! Every layer that can fail tags its errors with one of these variants, so
//! the HTTP error handler never has to guess what kind of error it holds.

use super::error::AppError;
use super::persistence::PersistenceError;
use std::any::Any;
use std::fmt;
use thiserror::Error;

/// One complaint raised while validating a request body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationIssue {
    /// Field path, outermost segment first.
    pub path: Vec<String>,
    pub message: String,
}

impl ValidationIssue {
    pub fn new<I, S>(path: I, message: impl Into<String>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            path: path.into_iter().map(Into::into).collect(),
            message: message.into(),
        }
    }

    /// Path segments joined with `.`
    pub fn dotted_path(&self) -> String {
        self.path.join(".")
    }
}

/// Request-body validation failure with its issues in discovery order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SchemaValidationError {
    issues: Vec<ValidationIssue>,
}

impl SchemaValidationError {
    pub fn new(issues: Vec<ValidationIssue>) -> Self {
        Self { issues }
    }

    pub fn issues(&self) -> &[ValidationIssue] {
        &self.issues
    }
}

impl fmt::Display for SchemaValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self
            .issues
            .iter()
            .map(|i| format!("{}: {}", i.dotted_path(), i.message))
            .collect();
        write!(f, "{}", parts.join(", "))
    }
}

impl std::error::Error for SchemaValidationError {}

#[derive(Error, Debug)]
pub enum Failure {
    #[error("request validation failed: {0}")]
    SchemaValidation(#[from] SchemaValidationError),

    #[error(transparent)]
    Persistence(#[from] PersistenceError),

    #[error(transparent)]
    Domain(#[from] AppError),

    #[error(transparent)]
    Unexpected(#[from] anyhow::Error),
}

impl Failure {
    /// Wrap a panic payload caught while serving a request.
    pub fn from_panic(payload: Box<dyn Any + Send + 'static>) -> Self {
        let detail = if let Some(s) = payload.downcast_ref::<String>() {
            s.clone()
        } else if let Some(s) = payload.downcast_ref::<&str>() {
            s.to_string()
        } else {
            "unknown panic payload".to_string()
        };
        Self::Unexpected(anyhow::anyhow!("handler panicked: {}", detail))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dotted_path() {
        let issue = ValidationIssue::new(["address", "city"], "Required");
        assert_eq!(issue.dotted_path(), "address.city");

        let top = ValidationIssue::new(["username"], "Required");
        assert_eq!(top.dotted_path(), "username");
    }

    #[test]
    fn test_from_panic_payloads() {
        let failure = Failure::from_panic(Box::new("boom"));
        assert!(failure.to_string().contains("boom"));

        let failure = Failure::from_panic(Box::new(String::from("bang")));
        assert!(failure.to_string().contains("bang"));

        let failure = Failure::from_panic(Box::new(42_u8));
        assert!(matches!(failure, Failure::Unexpected(_)));
    }

    #[test]
    fn test_question_mark_conversions() {
        fn domain() -> Result<(), Failure> {
            let lookup: Result<(), AppError> = Err(AppError::not_found("missing"));
            lookup?;
            Ok(())
        }
        fn storage() -> Result<(), Failure> {
            let write: Result<(), PersistenceError> =
                Err(PersistenceError::Backend("down".to_string()));
            write?;
            Ok(())
        }

        assert!(matches!(domain(), Err(Failure::Domain(_))));
        assert!(matches!(storage(), Err(Failure::Persistence(_))));
    }
}
