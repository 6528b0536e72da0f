//! User API DTOs (Data Transfer Objects)

use super::validation::{reject_null, RequestSchema};
use crate::domain::shared::document::Record;
use crate::domain::user::{PublicUser, SignupData, User, UserPatch};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// User response DTO; the password hash is never part of it
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserResponse {
    pub id: String,
    pub username: String,
    pub email: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Signup request
#[derive(Debug, Deserialize, Validate)]
pub struct SignupRequest {
    #[serde(default, deserialize_with = "reject_null")]
    #[validate(
        required(message = "Required"),
        length(min = 3, max = 30, message = "Username must be between 3 and 30 characters")
    )]
    pub username: Option<String>,
    #[serde(default, deserialize_with = "reject_null")]
    #[validate(required(message = "Required"), email(message = "Invalid email"))]
    pub email: Option<String>,
    #[serde(default, deserialize_with = "reject_null")]
    #[validate(
        required(message = "Required"),
        length(min = 8, message = "Password must be at least 8 characters")
    )]
    pub password: Option<String>,
}

/// Sign-in request
#[derive(Debug, Deserialize, Validate)]
pub struct SigninRequest {
    #[serde(default, deserialize_with = "reject_null")]
    #[validate(required(message = "Required"), email(message = "Invalid email"))]
    pub email: Option<String>,
    #[serde(default, deserialize_with = "reject_null")]
    #[validate(required(message = "Required"))]
    pub password: Option<String>,
}

/// Update user request; every field optional
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateUserRequest {
    #[serde(default, deserialize_with = "reject_null")]
    #[validate(length(min = 3, max = 30, message = "Username must be between 3 and 30 characters"))]
    pub username: Option<String>,
    #[serde(default, deserialize_with = "reject_null")]
    #[validate(email(message = "Invalid email"))]
    pub email: Option<String>,
    #[serde(default, deserialize_with = "reject_null")]
    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub password: Option<String>,
}

impl RequestSchema for SignupRequest {
    const FIELDS: &'static [&'static str] = &["username", "email", "password"];
}

impl RequestSchema for SigninRequest {
    const FIELDS: &'static [&'static str] = &["email", "password"];
}

impl RequestSchema for UpdateUserRequest {
    const FIELDS: &'static [&'static str] = &["username", "email", "password"];
}

/// Generic API response
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub message: String,
    pub data: T,
}

impl<T> ApiResponse<T> {
    pub fn success(message: impl Into<String>, data: T) -> Self {
        Self {
            success: true,
            message: message.into(),
            data,
        }
    }
}

/// Ping response
#[derive(Debug, Serialize)]
pub struct PingResponse {
    pub message: &'static str,
}

impl From<Record<User>> for UserResponse {
    fn from(record: Record<User>) -> Self {
        Self {
            id: record.id.to_string(),
            username: record.data.username,
            email: record.data.email,
            created_at: record.created_at,
            updated_at: record.updated_at,
        }
    }
}

impl From<Record<PublicUser>> for UserResponse {
    fn from(record: Record<PublicUser>) -> Self {
        Self {
            id: record.id.to_string(),
            username: record.data.username,
            email: record.data.email,
            created_at: record.created_at,
            updated_at: record.updated_at,
        }
    }
}

/// Only called after validation, so `required` fields are present
impl From<SignupRequest> for SignupData {
    fn from(req: SignupRequest) -> Self {
        Self {
            username: req.username.unwrap_or_default(),
            email: req.email.unwrap_or_default(),
            password: req.password.unwrap_or_default(),
        }
    }
}

impl From<UpdateUserRequest> for UserPatch {
    fn from(req: UpdateUserRequest) -> Self {
        Self {
            username: req.username,
            email: req.email,
            password: req.password,
        }
    }
}
