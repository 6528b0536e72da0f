//! Terminal error handler
//!
//! Every handler returns `Result<_, Failure>`; axum turns the `Err` side
//! into a response through [`handle_failure`], which is also used for caught
//! panics and unknown routes. Nothing else writes error responses.

use super::error_classifier::classify;
use super::error_response::build_error_response;
use super::metrics_handler::record_http_error;
use crate::domain::shared::error::AppError;
use crate::domain::shared::failure::Failure;
use axum::{
    http::{Method, Uri},
    response::{IntoResponse, Response},
    Json,
};
use std::any::Any;
use tracing::error;

/// Log, classify and render a failure as a single response
pub fn handle_failure(failure: Failure) -> Response {
    let classification = classify(&failure);

    error!(
        category = classification.category.as_str(),
        code = %classification.code,
        status = classification.status.as_u16(),
        error = ?failure,
        "Request failed: {}",
        failure
    );
    record_http_error(classification.category.as_str(), &classification.code);

    let (status, body) = build_error_response(
        classification.status,
        classification.message,
        classification.code,
        classification.details,
    );
    (status, Json(body)).into_response()
}

impl IntoResponse for Failure {
    fn into_response(self) -> Response {
        handle_failure(self)
    }
}

/// Response for a panic caught by `CatchPanicLayer`
pub fn handle_panic(payload: Box<dyn Any + Send + 'static>) -> Response {
    handle_failure(Failure::from_panic(payload))
}

/// Fallback for requests that match no route
pub async fn route_not_found(uri: Uri) -> Failure {
    AppError::not_found(format!("Route {} not found", uri.path())).into()
}

/// Fallback for a known path hit with a method it does not serve
pub async fn method_not_allowed(method: Method, uri: Uri) -> Failure {
    AppError::new(
        405,
        "MethodNotAllowedError",
        format!("Method {} not allowed on {}", method, uri.path()),
    )
    .into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::shared::failure::{SchemaValidationError, ValidationIssue};
    use crate::domain::shared::persistence::PersistenceError;
    use axum::http::StatusCode;
    use serde_json::{json, Value};

    async fn body_json(response: Response) -> Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_signup_missing_username_scenario() {
        let failure = Failure::SchemaValidation(SchemaValidationError::new(vec![
            ValidationIssue::new(["username"], "Required"),
        ]));

        let response = handle_failure(failure);
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            body_json(response).await,
            json!({
                "success": false,
                "message": "Validation failed",
                "error": {
                    "code": "ZOD_VALIDATION_ERROR",
                    "details": [{ "path": "username", "message": "Required" }]
                }
            })
        );
    }

    #[tokio::test]
    async fn test_duplicate_key_response() {
        let failure = Failure::from(PersistenceError::duplicate_key("users", "email"));
        let response = failure.into_response();

        assert_eq!(response.status(), StatusCode::CONFLICT);
        let body = body_json(response).await;
        assert_eq!(body["error"]["code"], "MONGO_DUPLICATE_KEY");
        assert_eq!(
            body["error"]["details"],
            json!([{ "path": "email", "message": "email already exists" }])
        );
    }

    #[tokio::test]
    async fn test_domain_error_has_no_details() {
        let response = Failure::from(AppError::forbidden("Forbidden")).into_response();

        assert_eq!(response.status(), StatusCode::FORBIDDEN);
        let body = body_json(response).await;
        assert_eq!(body["message"], "Forbidden");
        assert!(body["error"].get("details").is_none());
    }

    #[tokio::test]
    async fn test_panic_is_internal() {
        let response = handle_panic(Box::new("index out of bounds"));

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            body_json(response).await,
            json!({
                "success": false,
                "message": "Internal Server Error",
                "error": { "code": "INTERNAL_SERVER_ERROR" }
            })
        );
    }

    #[tokio::test]
    async fn test_unknown_route() {
        let uri: Uri = "/api/v1/nowhere".parse().unwrap();
        let response = route_not_found(uri).await.into_response();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let body = body_json(response).await;
        assert_eq!(body["error"]["code"], "NotFoundError");
        assert_eq!(body["message"], "Route /api/v1/nowhere not found");
    }

    #[tokio::test]
    async fn test_method_not_allowed() {
        let uri: Uri = "/api/v1/users/abc".parse().unwrap();
        let response = method_not_allowed(Method::PUT, uri).await.into_response();

        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(
            body_json(response).await,
            json!({
                "success": false,
                "message": "Method PUT not allowed on /api/v1/users/abc",
                "error": { "code": "MethodNotAllowedError" }
            })
        );
    }
}
