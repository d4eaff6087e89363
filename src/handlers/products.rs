//! Product catalog handlers

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

use crate::app_state::AppState;
use crate::auth::{AdminUser, AuthUser};
use crate::error::ApiError;
use crate::models::{
    AddReviewRequest, ApiResponse, CreateProductRequest, ListProductsQuery, Product,
    ProductCategory, ProductDetail, UpdateProductRequest,
};

#[derive(Debug, Deserialize)]
pub struct PageQuery {
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

pub async fn list_products(
    State(state): State<AppState>,
    Query(query): Query<ListProductsQuery>,
) -> Result<Json<ApiResponse<Vec<Product>>>, ApiError> {
    let (products, total, page, limit) = state.product_service.list(query).await?;
    Ok(Json(ApiResponse::paginated(products, total, page, limit)))
}

pub async fn get_product(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<ProductDetail>>, ApiError> {
    let detail = state.product_service.get(id).await?;
    Ok(Json(ApiResponse::ok(detail)))
}

pub async fn featured_products(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<Product>>>, ApiError> {
    let products = state.product_service.featured().await?;
    Ok(Json(ApiResponse::list(products)))
}

pub async fn categories(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<ProductCategory>>>, ApiError> {
    let categories = state.product_service.categories().await?;
    Ok(Json(ApiResponse::ok(categories)))
}

pub async fn add_review(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(id): Path<Uuid>,
    Json(req): Json<AddReviewRequest>,
) -> Result<impl IntoResponse, ApiError> {
    req.validate()?;
    state.product_service.add_review(id, &user, req).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::<()>::message("Review added successfully")),
    ))
}

pub async fn create_product(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    Json(req): Json<CreateProductRequest>,
) -> Result<impl IntoResponse, ApiError> {
    req.validate()?;
    let product = state.product_service.create(req, admin.id).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::ok(product))))
}

pub async fn update_product(
    State(state): State<AppState>,
    AdminUser(_admin): AdminUser,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateProductRequest>,
) -> Result<Json<ApiResponse<Product>>, ApiError> {
    req.validate()?;
    let product = state.product_service.update(id, req).await?;
    Ok(Json(ApiResponse::ok(product)))
}

pub async fn delete_product(
    State(state): State<AppState>,
    AdminUser(_admin): AdminUser,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<()>>, ApiError> {
    state.product_service.delete(id).await?;
    Ok(Json(ApiResponse::message("Product deleted successfully")))
}

pub async fn list_products_admin(
    State(state): State<AppState>,
    AdminUser(_admin): AdminUser,
    Query(query): Query<PageQuery>,
) -> Result<Json<ApiResponse<Vec<Product>>>, ApiError> {
    let (products, total, page, limit) = state
        .product_service
        .list_admin(query.page, query.limit)
        .await?;
    Ok(Json(ApiResponse::paginated(products, total, page, limit)))
}
