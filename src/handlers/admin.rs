//! Admin panel handlers: dashboard and user management

use axum::extract::{Path, Query, State};
use axum::Json;
use uuid::Uuid;
use validator::Validate;

use crate::app_state::AppState;
use crate::auth::AdminUser;
use crate::error::ApiError;
use crate::handlers::products::PageQuery;
use crate::models::{AdminUpdateUserRequest, ApiResponse, User};

pub async fn dashboard(
    State(state): State<AppState>,
    AdminUser(_admin): AdminUser,
) -> Result<Json<ApiResponse<serde_json::Value>>, ApiError> {
    let stats = state.admin_service.dashboard().await?;
    Ok(Json(ApiResponse::ok(stats)))
}

pub async fn list_users(
    State(state): State<AppState>,
    AdminUser(_admin): AdminUser,
    Query(query): Query<PageQuery>,
) -> Result<Json<ApiResponse<Vec<User>>>, ApiError> {
    let (users, total, page, limit) = state
        .admin_service
        .list_users(query.page, query.limit)
        .await?;
    Ok(Json(ApiResponse::paginated(users, total, page, limit)))
}

pub async fn get_user(
    State(state): State<AppState>,
    AdminUser(_admin): AdminUser,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<User>>, ApiError> {
    let user = state.admin_service.get_user(id).await?;
    Ok(Json(ApiResponse::ok(user)))
}

pub async fn update_user(
    State(state): State<AppState>,
    AdminUser(_admin): AdminUser,
    Path(id): Path<Uuid>,
    Json(req): Json<AdminUpdateUserRequest>,
) -> Result<Json<ApiResponse<User>>, ApiError> {
    req.validate()?;
    let user = state.admin_service.update_user(id, req).await?;
    Ok(Json(ApiResponse::ok(user)))
}

pub async fn delete_user(
    State(state): State<AppState>,
    AdminUser(_admin): AdminUser,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<()>>, ApiError> {
    state.admin_service.delete_user(id).await?;
    Ok(Json(ApiResponse::message("User deleted successfully")))
}
