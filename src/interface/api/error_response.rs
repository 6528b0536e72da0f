//! Wire format for failed requests

use axum::http::StatusCode;
use serde::{Deserialize, Serialize};

/// A single field-level complaint
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldIssue {
    pub path: String,
    pub message: String,
}

impl FieldIssue {
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Vec<FieldIssue>>,
}

/// The only body shape a failed request ever gets
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub message: String,
    pub error: ErrorBody,
}

/// Build the response for a classified failure.
///
/// `details: None` omits the key; `Some(vec![])` renders an empty array.
pub fn build_error_response(
    status: StatusCode,
    message: impl Into<String>,
    code: impl Into<String>,
    details: Option<Vec<FieldIssue>>,
) -> (StatusCode, ErrorResponse) {
    (
        status,
        ErrorResponse {
            success: false,
            message: message.into(),
            error: ErrorBody {
                code: code.into(),
                details,
            },
        },
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_details_key_is_omitted_when_absent() {
        let (status, body) =
            build_error_response(StatusCode::FORBIDDEN, "Forbidden", "ForbiddenError", None);

        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(
            serde_json::to_value(&body).unwrap(),
            json!({
                "success": false,
                "message": "Forbidden",
                "error": { "code": "ForbiddenError" }
            })
        );
    }

    #[test]
    fn test_empty_details_are_kept() {
        let (_, body) = build_error_response(
            StatusCode::BAD_REQUEST,
            "Validation failed",
            "ZOD_VALIDATION_ERROR",
            Some(vec![]),
        );

        let value = serde_json::to_value(&body).unwrap();
        assert_eq!(value["error"]["details"], json!([]));
    }

    #[test]
    fn test_output_is_deterministic() {
        let build = || {
            build_error_response(
                StatusCode::CONFLICT,
                "Duplicate key",
                "MONGO_DUPLICATE_KEY",
                Some(vec![FieldIssue::new("email", "email already exists")]),
            )
        };

        let first = serde_json::to_vec(&build().1).unwrap();
        let second = serde_json::to_vec(&build().1).unwrap();
        assert_eq!(first, second);
        assert_eq!(
            String::from_utf8(first).unwrap(),
            r#"{"success":false,"message":"Duplicate key","error":{"code":"MONGO_DUPLICATE_KEY","details":[{"path":"email","message":"email already exists"}]}}"#
        );
    }
}
