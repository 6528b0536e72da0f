//! API interface implementations

pub mod error_classifier;
pub mod error_handler;
pub mod error_response;
pub mod metrics_handler;
pub mod router;
pub mod user_dto;
pub mod user_handler;
pub mod validation;

pub use error_classifier::{classify, Classification, ErrorCategory};
pub use error_handler::handle_failure;
pub use error_response::{build_error_response, ErrorResponse, FieldIssue};
pub use metrics_handler::{detached_metrics, init_metrics};
pub use router::{build_router, CORRELATION_ID_HEADER};
pub use user_handler::AppState;
pub use validation::{RequestSchema, ValidatedJson};
