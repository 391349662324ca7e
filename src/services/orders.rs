//! Order lifecycle service.
//!
//! Orders are created RESERVED. Only RESERVED orders may transition, never to
//! the same status; customers may only cancel their own orders, employees may
//! set any target status. The expiration pass claims RESERVED orders older
//! than the configured TTL.

use chrono::{Duration, Utc};
use rust_decimal::Decimal;
use validator::Validate;

use crate::{
    config::OrdersConfig,
    error::{AppError, AppResult},
    models::{
        audit::AuditAction,
        order::{CreateOrder, Order, OrderQuery, OrderStatus, OrderSummary, UpdateOrderStatus},
        user::UserClaims,
    },
    repository::{orders::OrderLine, Repository},
};

#[derive(Clone)]
pub struct OrdersService {
    repository: Repository,
    config: OrdersConfig,
}

impl OrdersService {
    pub fn new(repository: Repository, config: OrdersConfig) -> Self {
        Self { repository, config }
    }

    /// Reserve an order for the authenticated customer, snapshotting the
    /// current book prices into the order lines
    pub async fn create_order(&self, claims: &UserClaims, order: CreateOrder) -> AppResult<Order> {
        claims.require_customer()?;
        order.validate()?;

        let mut lines: Vec<OrderLine> = Vec::with_capacity(order.items.len());
        let mut total = Decimal::ZERO;
        for item in &order.items {
            if lines.iter().any(|(book_id, _, _)| *book_id == item.book_id) {
                return Err(AppError::Validation(format!(
                    "Book {} appears more than once in the order",
                    item.book_id
                )));
            }
            let price = self.repository.books.get_price(item.book_id).await?;
            total += price * Decimal::from(item.quantity);
            lines.push((item.book_id, item.quantity, price));
        }

        let id = self.repository.orders.create(claims.user_id, &lines, total).await?;
        self.repository
            .audits
            .record(&claims.sub, AuditAction::Add, &format!("order:{}", id))
            .await?;

        self.repository.orders.get_by_id(id).await
    }

    /// Fetch a single order. Customers only see their own orders; a foreign
    /// order answers 404 rather than 403 so order IDs cannot be probed.
    pub async fn get_order(&self, claims: &UserClaims, id: i32) -> AppResult<Order> {
        let order = self.repository.orders.get_by_id(id).await?;

        if !claims.is_employee() && order.customer_id != claims.user_id {
            return Err(AppError::NotFound(format!("Order with id {} not found", id)));
        }

        Ok(order)
    }

    /// Search orders. Employees see everything and may filter by customer;
    /// customers are always restricted to their own orders.
    pub async fn search_orders(
        &self,
        claims: &UserClaims,
        mut query: OrderQuery,
    ) -> AppResult<(Vec<OrderSummary>, i64)> {
        if !claims.is_employee() {
            query.customer_id = Some(claims.user_id);
        }
        self.repository.orders.search(&query).await
    }

    /// Apply a status transition requested over the API
    pub async fn update_status(
        &self,
        claims: &UserClaims,
        id: i32,
        change: UpdateOrderStatus,
    ) -> AppResult<Order> {
        let order = self.get_order(claims, id).await?;

        if !claims.is_employee() && change.status != OrderStatus::Cancelled {
            return Err(AppError::Authorization(
                "Customers may only cancel their orders".to_string(),
            ));
        }

        if !order.current_status.can_transition_to(change.status) {
            return Err(AppError::BusinessRule(format!(
                "Order {} cannot move from {} to {}",
                id, order.current_status, change.status
            )));
        }

        self.repository.orders.update_status(id, change.status).await?;
        self.repository
            .audits
            .record(&claims.sub, AuditAction::Update, &format!("order:{}", id))
            .await?;

        self.repository.orders.get_by_id(id).await
    }

    /// Expire RESERVED orders older than the configured TTL. Returns the
    /// number of orders transitioned.
    pub async fn expire_stale_reservations(&self) -> AppResult<usize> {
        let cutoff = Utc::now() - Duration::hours(self.config.reservation_ttl_hours);
        let ids = self.repository.orders.expire_reservations(cutoff).await?;

        for id in &ids {
            tracing::info!(order = id, "Reservation expired");
        }

        Ok(ids.len())
    }
}
