//! User, account and user administration handlers.

use axum::{
    extract::State,
    response::Json,
    routing::{get, patch, post},
    Router,
};
use serde::Deserialize;
use utoipa::IntoParams;
use uuid::Uuid;

use crate::api::extractors::{CurrentUser, ValidatedJson, ValidatedPath};
use crate::api::AppState;
use crate::domain::{
    CreateUserRequest, UpdateUserPasswordRequest, UpdateUserRequest, UserResponse,
};
use crate::errors::AppResult;
use crate::types::{Created, NoContent};

/// `/api/admin/users/{id}`
#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Path)]
pub struct UserPath {
    /// User ID
    pub id: Uuid,
}

/// Anonymous registration
pub fn user_routes() -> Router<AppState> {
    Router::new().route("/api/users", post(register))
}

/// The caller's own account
pub fn account_routes() -> Router<AppState> {
    Router::new()
        .route("/api/account", get(get_account).patch(update_account))
        .route("/api/account/password", patch(update_password))
}

/// User administration, admin only
pub fn admin_routes() -> Router<AppState> {
    Router::new().route("/api/admin/users/:id", get(get_user).patch(update_user))
}

/// Register a new user
#[utoipa::path(
    post,
    path = "/api/users",
    tag = "Users",
    request_body = CreateUserRequest,
    responses(
        (status = 201, description = "User registered", body = UserResponse,
            headers(("Location" = String, description = "URI of the new user"))),
        (status = 400, description = "Validation error", body = ErrorResponse),
        (status = 409, description = "Email already exists", body = ErrorResponse)
    )
)]
pub async fn register(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<CreateUserRequest>,
) -> AppResult<Created<UserResponse>> {
    let user = state.user_service.register(payload).await?;
    Ok(Created::at(format!("/api/users/{}", user.id), UserResponse::from(user)))
}

/// Get current account
#[utoipa::path(
    get,
    path = "/api/account",
    tag = "Account",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Current user profile", body = UserResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse)
    )
)]
pub async fn get_account(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
) -> AppResult<Json<UserResponse>> {
    let user = state.user_service.get_current_user(user_id).await?;
    Ok(Json(UserResponse::from(user)))
}

/// Update current account
#[utoipa::path(
    patch,
    path = "/api/account",
    tag = "Account",
    security(("bearer_auth" = [])),
    request_body = UpdateUserRequest,
    responses(
        (status = 200, description = "Account updated", body = UserResponse),
        (status = 400, description = "Validation error", body = ErrorResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 409, description = "Email already exists", body = ErrorResponse)
    )
)]
pub async fn update_account(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    ValidatedJson(payload): ValidatedJson<UpdateUserRequest>,
) -> AppResult<Json<UserResponse>> {
    let user = state.user_service.update_my_account(user_id, payload).await?;
    Ok(Json(UserResponse::from(user)))
}

/// Change current account password
#[utoipa::path(
    patch,
    path = "/api/account/password",
    tag = "Account",
    security(("bearer_auth" = [])),
    request_body = UpdateUserPasswordRequest,
    responses(
        (status = 204, description = "Password changed"),
        (status = 400, description = "Validation error", body = ErrorResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse)
    )
)]
pub async fn update_password(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    ValidatedJson(payload): ValidatedJson<UpdateUserPasswordRequest>,
) -> AppResult<NoContent> {
    state.user_service.update_my_password(user_id, payload).await?;
    Ok(NoContent)
}

/// Get user by ID (admin only)
#[utoipa::path(
    get,
    path = "/api/admin/users/{id}",
    tag = "Admin",
    security(("bearer_auth" = [])),
    params(UserPath),
    responses(
        (status = 200, description = "User profile", body = UserResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 403, description = "Forbidden - Admin only", body = ErrorResponse),
        (status = 404, description = "User not found", body = ErrorResponse)
    )
)]
pub async fn get_user(
    State(state): State<AppState>,
    ValidatedPath(path): ValidatedPath<UserPath>,
) -> AppResult<Json<UserResponse>> {
    let user = state.user_service.get_user(path.id).await?;
    Ok(Json(UserResponse::from(user)))
}

/// Update any user (admin only)
#[utoipa::path(
    patch,
    path = "/api/admin/users/{id}",
    tag = "Admin",
    security(("bearer_auth" = [])),
    params(UserPath),
    request_body = UpdateUserRequest,
    responses(
        (status = 200, description = "User updated", body = UserResponse),
        (status = 400, description = "Validation error", body = ErrorResponse),
        (status = 403, description = "Forbidden - Admin only", body = ErrorResponse),
        (status = 404, description = "User not found", body = ErrorResponse),
        (status = 409, description = "Email already exists", body = ErrorResponse)
    )
)]
pub async fn update_user(
    State(state): State<AppState>,
    ValidatedPath(path): ValidatedPath<UserPath>,
    ValidatedJson(payload): ValidatedJson<UpdateUserRequest>,
) -> AppResult<Json<UserResponse>> {
    let user = state.user_service.admin_update_user(path.id, payload).await?;
    Ok(Json(UserResponse::from(user)))
}
