//! Order and checkout handlers

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use uuid::Uuid;

use crate::app_state::AppState;
use crate::auth::{AdminUser, AuthUser};
use crate::error::ApiError;
use crate::handlers::products::PageQuery;
use crate::models::{
    AdminOrderList, ApiResponse, CreateOrderRequest, CreatePaymentIntentRequest, OrderWithItems,
    PaymentIntentPayload, PaymentResult, UpdateOrderStatusRequest,
};

pub async fn create_order(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Json(req): Json<CreateOrderRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let order = state.order_service.create_order(user.id, req).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::ok(order))))
}

pub async fn my_orders(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
) -> Result<Json<ApiResponse<Vec<OrderWithItems>>>, ApiError> {
    let orders = state.order_service.my_orders(user.id).await?;
    Ok(Json(ApiResponse::list(orders)))
}

pub async fn get_order(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<OrderWithItems>>, ApiError> {
    let order = state.order_service.get_order(id, &user).await?;
    Ok(Json(ApiResponse::ok(order)))
}

pub async fn pay_order(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(id): Path<Uuid>,
    Json(receipt): Json<PaymentResult>,
) -> Result<Json<ApiResponse<OrderWithItems>>, ApiError> {
    let order = state.order_service.mark_paid(id, &user, receipt).await?;
    Ok(Json(ApiResponse::ok(order)))
}

pub async fn create_payment_intent(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Json(req): Json<CreatePaymentIntentRequest>,
) -> Result<Json<ApiResponse<PaymentIntentPayload>>, ApiError> {
    let payload = state
        .payment_service
        .create_payment_intent(req.amount, user.id)
        .await?;
    Ok(Json(ApiResponse::ok(payload)))
}

pub async fn all_orders(
    State(state): State<AppState>,
    AdminUser(_admin): AdminUser,
    Query(query): Query<PageQuery>,
) -> Result<Json<ApiResponse<AdminOrderList>>, ApiError> {
    let (orders, total, page, limit, total_revenue) = state
        .order_service
        .list_all(query.page, query.limit)
        .await?;

    let count = orders.len() as i64;
    let mut response = ApiResponse::ok(AdminOrderList {
        orders,
        total_revenue,
    });
    response.count = Some(count);
    response.total = Some(total);
    response.total_pages = Some(crate::models::total_pages(total, limit));
    response.current_page = Some(page);
    Ok(Json(response))
}

pub async fn order_stats(
    State(state): State<AppState>,
    AdminUser(_admin): AdminUser,
) -> Result<Json<ApiResponse<serde_json::Value>>, ApiError> {
    let stats = state.order_service.stats().await?;
    Ok(Json(ApiResponse::ok(stats)))
}

pub async fn update_order_status(
    State(state): State<AppState>,
    AdminUser(_admin): AdminUser,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateOrderStatusRequest>,
) -> Result<Json<ApiResponse<OrderWithItems>>, ApiError> {
    let order = state.order_service.set_status(id, req.status).await?;
    Ok(Json(ApiResponse::ok(order)))
}
