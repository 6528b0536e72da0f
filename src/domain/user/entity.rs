//! User entity

use crate::domain::shared::document::Model;
use crate::domain::shared::persistence::ModelValidationError;
use serde::{Deserialize, Serialize};

pub const USERNAME_MIN_LEN: usize = 3;
pub const USERNAME_MAX_LEN: usize = 30;

/// User entity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub username: String,
    pub email: String,
    /// bcrypt hash, never the plain text
    pub password: String,
}

/// User update data
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UserPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
}

/// User as returned by lookups that project out the credential
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublicUser {
    pub username: String,
    pub email: String,
}

impl From<User> for PublicUser {
    fn from(user: User) -> Self {
        Self {
            username: user.username,
            email: user.email,
        }
    }
}

impl Model for User {
    type Patch = UserPatch;

    const COLLECTION: &'static str = "users";
    const UNIQUE_KEYS: &'static [&'static str] = &["email", "username"];

    fn validate(&self) -> Result<(), ModelValidationError> {
        let mut errors = ModelValidationError::new();

        let username_len = self.username.trim().chars().count();
        if username_len == 0 {
            errors.push("username", "username is required");
        } else if !(USERNAME_MIN_LEN..=USERNAME_MAX_LEN).contains(&username_len) {
            errors.push(
                "username",
                format!(
                    "username must be between {} and {} characters",
                    USERNAME_MIN_LEN, USERNAME_MAX_LEN
                ),
            );
        }

        if self.email.trim().is_empty() {
            errors.push("email", "email is required");
        } else if !looks_like_email(&self.email) {
            errors.push("email", "email is not a valid address");
        }

        if self.password.is_empty() {
            errors.push("password", "password is required");
        }

        errors.into_result()
    }
}

fn looks_like_email(value: &str) -> bool {
    if value.chars().any(char::is_whitespace) {
        return false;
    }
    match value.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.contains('@')
                && domain.contains('.')
                && !domain.starts_with('.')
                && !domain.ends_with('.')
        }
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(username: &str, email: &str, password: &str) -> User {
        User {
            username: username.to_string(),
            email: email.to_string(),
            password: password.to_string(),
        }
    }

    #[test]
    fn test_valid_user() {
        assert!(user("alice", "alice@example.com", "$2b$hash").validate().is_ok());
    }

    #[test]
    fn test_validation_reports_every_field_in_order() {
        let err = user("", "not-an-email", "").validate().unwrap_err();
        let paths: Vec<&str> = err.errors().iter().map(|e| e.path.as_str()).collect();
        assert_eq!(paths, vec!["username", "email", "password"]);
        assert_eq!(err.errors()[0].message, "username is required");
        assert_eq!(err.errors()[1].message, "email is not a valid address");
    }

    #[test]
    fn test_username_length_bounds() {
        assert!(user("al", "a@example.com", "h").validate().is_err());
        assert!(user("ali", "a@example.com", "h").validate().is_ok());
        assert!(user(&"a".repeat(31), "a@example.com", "h").validate().is_err());
    }

    #[test]
    fn test_email_shapes() {
        assert!(looks_like_email("bob@mail.example.org"));
        assert!(!looks_like_email("bob@localhost"));
        assert!(!looks_like_email("@example.com"));
        assert!(!looks_like_email("bob@@example.com"));
        assert!(!looks_like_email("bob @example.com"));
        assert!(!looks_like_email("bob@example."));
    }

    #[test]
    fn test_patch_skips_absent_fields() {
        let patch = UserPatch {
            email: Some("new@example.com".to_string()),
            ..Default::default()
        };
        let json = serde_json::to_value(&patch).unwrap();
        assert_eq!(json, serde_json::json!({"email": "new@example.com"}));
    }
}
