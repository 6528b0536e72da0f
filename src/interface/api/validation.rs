//! Request-body validation
//!
//! [`ValidatedJson`] reads the body as JSON, checks the type of every
//! declared field, then runs the DTO's `validator` rules. Type and rule
//! complaints both come back as a tagged schema-validation failure; only a
//! body that is not JSON at all is a plain bad request.

use crate::domain::shared::error::AppError;
use crate::domain::shared::failure::{Failure, SchemaValidationError, ValidationIssue};
use axum::{
    async_trait,
    extract::{rejection::JsonRejection, FromRequest, Request},
    Json,
};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use serde_json::{Map, Value};
use tracing::debug;
use validator::{Validate, ValidationErrors, ValidationErrorsKind};

/// Field layout of a request body.
///
/// Every field must tolerate being absent (`Option` with `#[serde(default)]`);
/// presence is a `validator` rule, so a one-field object deserializes
/// whenever that field's value has the right type.
pub trait RequestSchema {
    /// Top-level fields in declaration order
    const FIELDS: &'static [&'static str];
}

/// JSON body that passed its validation rules
#[derive(Debug, Clone)]
pub struct ValidatedJson<T>(pub T);

#[async_trait]
impl<T, S> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Validate + RequestSchema,
    S: Send + Sync,
{
    type Rejection = Failure;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(body) = Json::<Value>::from_request(req, state)
            .await
            .map_err(malformed_body)?;

        let value = decode::<T>(body)?;
        value
            .validate()
            .map_err(|errors| schema_failure(&errors, T::FIELDS))?;
        Ok(Self(value))
    }
}

/// `deserialize_with` helper: an explicit `null` is a type error, a missing
/// field stays `None` through `#[serde(default)]`
pub fn reject_null<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    T::deserialize(deserializer).map(Some)
}

/// Only bodies that are not JSON, or not sent as JSON, end up here
fn malformed_body(rejection: JsonRejection) -> Failure {
    debug!("Rejected request body: {}", rejection.body_text());
    let message = match rejection {
        JsonRejection::MissingJsonContentType(_) => {
            "Expected request with `Content-Type: application/json`"
        }
        _ => "Malformed JSON in request body",
    };
    AppError::bad_request(message).into()
}

fn decode<T>(body: Value) -> Result<T, Failure>
where
    T: DeserializeOwned + RequestSchema,
{
    let fields = match body {
        Value::Object(fields) => fields,
        other => {
            return Err(SchemaValidationError::new(vec![ValidationIssue::new(
                Vec::<String>::new(),
                format!("Expected object, received {}", kind_of(&other)),
            )])
            .into())
        }
    };

    let issues = type_issues::<T>(&fields);
    if !issues.is_empty() {
        return Err(SchemaValidationError::new(issues).into());
    }

    serde_json::from_value(Value::Object(fields))
        .map_err(|err| AppError::bad_request(err.to_string()).into())
}

/// Check each declared field on its own, in declaration order
fn type_issues<T>(fields: &Map<String, Value>) -> Vec<ValidationIssue>
where
    T: DeserializeOwned + RequestSchema,
{
    T::FIELDS
        .iter()
        .filter_map(|field| {
            let value = fields.get(*field)?;
            let single = Map::from_iter([(field.to_string(), value.clone())]);
            serde_json::from_value::<T>(Value::Object(single))
                .err()
                .map(|err| ValidationIssue::new([*field], type_message(&err, value)))
        })
        .collect()
}

/// "Expected string, received number" from serde's invalid-type message
fn type_message(err: &serde_json::Error, value: &Value) -> String {
    let text = err.to_string();
    match text.rsplit_once(", expected ") {
        Some((_, expected)) => {
            let expected = expected
                .strip_prefix("a ")
                .or_else(|| expected.strip_prefix("an "))
                .unwrap_or(expected);
            format!("Expected {}, received {}", expected, kind_of(value))
        }
        None => text,
    }
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn schema_failure(errors: &ValidationErrors, order: &[&str]) -> Failure {
    SchemaValidationError::new(issues_from(errors, order)).into()
}

/// Flatten `validator` output into issues with full paths.
///
/// Top-level fields follow `order`; anything not listed there comes last in
/// name order. The complaints on one field keep the order their rules were
/// declared in.
pub fn issues_from(errors: &ValidationErrors, order: &[&str]) -> Vec<ValidationIssue> {
    let mut issues = Vec::new();
    collect(&[], errors, &mut issues);
    issues.sort_by_key(|issue| {
        issue
            .path
            .first()
            .and_then(|field| order.iter().position(|known| known == field))
            .unwrap_or(order.len())
    });
    issues
}

fn collect(prefix: &[String], errors: &ValidationErrors, issues: &mut Vec<ValidationIssue>) {
    let mut fields: Vec<_> = errors.errors().iter().collect();
    fields.sort_by(|a, b| a.0.cmp(b.0));

    for (field, kind) in fields {
        let mut path = prefix.to_vec();
        path.push(field.to_string());

        match kind {
            ValidationErrorsKind::Field(field_errors) => {
                for error in field_errors {
                    let message = error
                        .message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| error.code.to_string());
                    issues.push(ValidationIssue::new(path.clone(), message));
                }
            }
            ValidationErrorsKind::Struct(nested) => collect(&path, nested, issues),
            ValidationErrorsKind::List(items) => {
                for (index, nested) in items {
                    let mut item_path = path.clone();
                    item_path.push(index.to_string());
                    collect(&item_path, nested, issues);
                }
            }
        }
    }
}
