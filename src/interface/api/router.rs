//! API Router configuration

use super::error_handler::{handle_panic, method_not_allowed, route_not_found};
use super::metrics_handler::metrics_handler;
use super::user_handler::{
    delete_user, get_user, get_user_by_username, list_users, ping, signin, signup, update_user,
    AppState,
};
use axum::{
    extract::Request,
    http::HeaderName,
    routing::{get, post},
    Router,
};
use metrics_exporter_prometheus::PrometheusHandle;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::{Any, CorsLayer};
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::TraceLayer;

/// Header carrying the per-request correlation id
pub const CORRELATION_ID_HEADER: &str = "x-correlation-id";

/// Build the API router
pub fn build_router(state: AppState, prometheus_handle: PrometheusHandle) -> Router {
    let correlation_header = HeaderName::from_static(CORRELATION_ID_HEADER);

    let user_routes = Router::new()
        .route("/users", get(list_users))
        .route("/users/signup", post(signup))
        .route("/users/signin", post(signin))
        .route("/users/username/:username", get(get_user_by_username))
        .route(
            "/users/:id",
            get(get_user).patch(update_user).delete(delete_user),
        );

    let v1_routes = Router::new()
        .route("/ping", get(ping))
        .merge(user_routes);

    // Metrics route (separate state)
    let metrics_routes = Router::new()
        .route("/metrics", get(metrics_handler))
        .with_state(prometheus_handle);

    Router::new()
        .nest("/api/v1", v1_routes)
        .fallback(route_not_found)
        .with_state(state)
        .merge(metrics_routes)
        .method_not_allowed_fallback(method_not_allowed)
        .layer(CatchPanicLayer::custom(handle_panic))
        .layer(
            TraceLayer::new_for_http().make_span_with(|request: &Request| {
                let correlation_id = request
                    .headers()
                    .get(CORRELATION_ID_HEADER)
                    .and_then(|value| value.to_str().ok())
                    .unwrap_or("-");
                tracing::info_span!(
                    "http_request",
                    method = %request.method(),
                    uri = %request.uri(),
                    correlation_id = %correlation_id,
                )
            }),
        )
        .layer(PropagateRequestIdLayer::new(correlation_header.clone()))
        .layer(SetRequestIdLayer::new(correlation_header, MakeRequestUuid))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
}
