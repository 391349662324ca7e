//! Order management endpoints

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};

use crate::{
    error::AppResult,
    models::order::{CreateOrder, Order, OrderQuery, OrderSummary, UpdateOrderStatus},
};

use super::{AuthenticatedUser, PaginatedResponse};

/// List orders with filters, pagination and sorting.
///
/// Employees see all orders; customers only their own.
#[utoipa::path(
    get,
    path = "/orders",
    tag = "orders",
    security(("bearer_auth" = [])),
    params(
        ("status" = Option<String>, Query, description = "Filter by lifecycle status"),
        ("customer_id" = Option<i32>, Query, description = "Filter by customer (employees only)"),
        ("start_date" = Option<String>, Query, description = "Created at or after (RFC 3339)"),
        ("end_date" = Option<String>, Query, description = "Created before (RFC 3339)"),
        ("sort" = Option<String>, Query, description = "Sort key (created_at, total, id; prefix - for descending)"),
        ("page" = Option<i64>, Query, description = "Page number"),
        ("per_page" = Option<i64>, Query, description = "Items per page")
    ),
    responses(
        (status = 200, description = "List of orders", body = PaginatedResponse<OrderSummary>),
        (status = 401, description = "Not authenticated")
    )
)]
pub async fn list_orders(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Query(query): Query<OrderQuery>,
) -> AppResult<Json<PaginatedResponse<OrderSummary>>> {
    let page = query.page.unwrap_or(1);
    let per_page = query.per_page.unwrap_or(20);

    let (orders, total) = state.services.orders.search_orders(&claims, query).await?;

    Ok(Json(PaginatedResponse {
        items: orders,
        total,
        page,
        per_page,
    }))
}

/// Get order details by ID
#[utoipa::path(
    get,
    path = "/orders/{id}",
    tag = "orders",
    security(("bearer_auth" = [])),
    params(
        ("id" = i32, Path, description = "Order ID")
    ),
    responses(
        (status = 200, description = "Order details", body = Order),
        (status = 404, description = "Order not found")
    )
)]
pub async fn get_order(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
) -> AppResult<Json<Order>> {
    let order = state.services.orders.get_order(&claims, id).await?;
    Ok(Json(order))
}

/// Reserve a new order for the authenticated customer
#[utoipa::path(
    post,
    path = "/orders",
    tag = "orders",
    security(("bearer_auth" = [])),
    request_body = CreateOrder,
    responses(
        (status = 201, description = "Order reserved", body = Order),
        (status = 403, description = "Customer account required"),
        (status = 404, description = "Book not found"),
        (status = 422, description = "Validation failed")
    )
)]
pub async fn create_order(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Json(order): Json<CreateOrder>,
) -> AppResult<(StatusCode, Json<Order>)> {
    let created = state.services.orders.create_order(&claims, order).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// Change the status of an order.
///
/// Only RESERVED orders may transition, and never to the same status.
/// Customers may only cancel their own orders.
#[utoipa::path(
    put,
    path = "/orders/{id}/status",
    tag = "orders",
    security(("bearer_auth" = [])),
    params(
        ("id" = i32, Path, description = "Order ID")
    ),
    request_body = UpdateOrderStatus,
    responses(
        (status = 200, description = "Order updated", body = Order),
        (status = 403, description = "Customers may only cancel their orders"),
        (status = 404, description = "Order not found"),
        (status = 422, description = "Illegal status transition")
    )
)]
pub async fn update_order_status(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
    Json(change): Json<UpdateOrderStatus>,
) -> AppResult<Json<Order>> {
    let updated = state
        .services
        .orders
        .update_status(&claims, id, change)
        .await?;
    Ok(Json(updated))
}

/// Response of a manual expiration pass
#[derive(serde::Serialize, utoipa::ToSchema)]
pub struct ExpirationResponse {
    /// Number of reservations transitioned to RESERVATION_EXPIRED
    pub expired: usize,
}

/// Run the reservation expiration pass immediately.
///
/// Same pass the hourly job runs; useful for operations and testing.
#[utoipa::path(
    post,
    path = "/orders/expire-stale",
    tag = "orders",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Expiration pass completed", body = ExpirationResponse),
        (status = 403, description = "Administrator privileges required")
    )
)]
pub async fn expire_stale(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
) -> AppResult<Json<ExpirationResponse>> {
    claims.require_admin()?;

    let expired = state.services.orders.expire_stale_reservations().await?;
    Ok(Json(ExpirationResponse { expired }))
}
