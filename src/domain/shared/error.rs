//! Domain errors

use std::borrow::Cow;
use thiserror::Error;

/// Application error raised deliberately by domain and service code.
///
/// Carries its own transport status, a stable name used as the client-facing
/// error code, and a human-readable message.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{name}: {message}")]
pub struct AppError {
    status: u16,
    name: Cow<'static, str>,
    message: String,
}

impl AppError {
    pub fn new(status: u16, name: impl Into<Cow<'static, str>>, message: impl Into<String>) -> Self {
        Self {
            status,
            name: name.into(),
            message: message.into(),
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(400, "BadRequestError", message)
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(401, "UnauthorizedError", message)
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::new(403, "ForbiddenError", message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(404, "NotFoundError", message)
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::new(409, "ConflictError", message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(500, "InternalServerError", message)
    }

    pub fn status(&self) -> u16 {
        self.status
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_named_constructors() {
        let err = AppError::forbidden("Forbidden");
        assert_eq!(err.status(), 403);
        assert_eq!(err.name(), "ForbiddenError");
        assert_eq!(err.message(), "Forbidden");

        assert_eq!(AppError::not_found("x").status(), 404);
        assert_eq!(AppError::unauthorized("x").name(), "UnauthorizedError");
    }

    #[test]
    fn test_display() {
        let err = AppError::new(418, "TeapotError", "short and stout");
        assert_eq!(err.to_string(), "TeapotError: short and stout");
    }
}
