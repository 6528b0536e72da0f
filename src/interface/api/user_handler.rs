//! User API handlers

use super::user_dto::{
    ApiResponse, PingResponse, SigninRequest, SignupRequest, UpdateUserRequest, UserResponse,
};
use super::validation::ValidatedJson;
use crate::domain::shared::document::DocumentId;
use crate::domain::shared::result::Result;
use crate::domain::user::UserService;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use std::sync::Arc;
use tracing::info;

/// Application state
#[derive(Clone)]
pub struct AppState {
    pub user_service: Arc<UserService>,
}

/// Liveness check
pub async fn ping() -> Json<PingResponse> {
    Json(PingResponse { message: "pong" })
}

/// Create a new user
pub async fn signup(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<SignupRequest>,
) -> Result<(StatusCode, Json<ApiResponse<UserResponse>>)> {
    let user = state.user_service.signup(req.into()).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success("User created successfully", user.into())),
    ))
}

/// Check credentials
pub async fn signin(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<SigninRequest>,
) -> Result<Json<ApiResponse<UserResponse>>> {
    let email = req.email.unwrap_or_default();
    let password = req.password.unwrap_or_default();

    let user = state.user_service.signin(&email, &password).await?;
    Ok(Json(ApiResponse::success("Signed in successfully", user.into())))
}

/// List users
pub async fn list_users(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<UserResponse>>>> {
    let users = state.user_service.list_users().await?;
    info!("API: Listed {} users", users.len());
    Ok(Json(ApiResponse::success(
        "Users fetched successfully",
        users.into_iter().map(UserResponse::from).collect(),
    )))
}

/// Get user by ID
pub async fn get_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<UserResponse>>> {
    let user = state.user_service.get_user(&DocumentId::from(id)).await?;
    Ok(Json(ApiResponse::success("User fetched successfully", user.into())))
}

/// Get user by username
pub async fn get_user_by_username(
    State(state): State<AppState>,
    Path(username): Path<String>,
) -> Result<Json<ApiResponse<UserResponse>>> {
    let user = state.user_service.get_user_by_username(&username).await?;
    Ok(Json(ApiResponse::success("User fetched successfully", user.into())))
}

/// Update user
pub async fn update_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
    ValidatedJson(req): ValidatedJson<UpdateUserRequest>,
) -> Result<Json<ApiResponse<UserResponse>>> {
    let user = state
        .user_service
        .update_user(&DocumentId::from(id), req.into())
        .await?;
    Ok(Json(ApiResponse::success("User updated successfully", user.into())))
}

/// Delete user
pub async fn delete_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<UserResponse>>> {
    let user = state.user_service.delete_user(&DocumentId::from(id)).await?;
    Ok(Json(ApiResponse::success("User deleted successfully", user.into())))
}
