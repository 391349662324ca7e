//! Orders repository for database operations

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::{Pool, Postgres};

use crate::{
    error::{AppError, AppResult},
    models::order::{
        Order, OrderCustomer, OrderHistoryEntry, OrderItem, OrderQuery, OrderStatus, OrderSummary,
    },
};

/// One order line ready for insertion: (book_id, quantity, snapshot price)
pub type OrderLine = (i32, i32, Decimal);

#[derive(Clone)]
pub struct OrdersRepository {
    pool: Pool<Postgres>,
}

impl OrdersRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Get order by ID with customer, items and history
    pub async fn get_by_id(&self, id: i32) -> AppResult<Order> {
        let mut order = sqlx::query_as::<_, Order>(
            "SELECT id, customer_id, total, current_status, created_at FROM orders WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Order with id {} not found", id)))?;

        order.customer = sqlx::query_as::<_, OrderCustomer>(
            "SELECT id, name, email FROM users WHERE id = $1",
        )
        .bind(order.customer_id)
        .fetch_optional(&self.pool)
        .await?;

        order.items = sqlx::query_as::<_, OrderItem>(
            r#"
            SELECT oi.book_id, b.title as book_title, oi.quantity, oi.price
            FROM order_items oi
            JOIN books b ON b.id = oi.book_id
            WHERE oi.order_id = $1
            ORDER BY b.title
            "#,
        )
        .bind(id)
        .fetch_all(&self.pool)
        .await?;

        order.history = sqlx::query_as::<_, OrderHistoryEntry>(
            "SELECT status, created_at FROM order_history WHERE order_id = $1 ORDER BY created_at",
        )
        .bind(id)
        .fetch_all(&self.pool)
        .await?;

        Ok(order)
    }

    /// Search orders with pagination and sorting
    pub async fn search(&self, query: &OrderQuery) -> AppResult<(Vec<OrderSummary>, i64)> {
        let (_, per_page, offset) = super::page_bounds(query.page, query.per_page);

        let mut conditions = Vec::new();
        let mut params: Vec<String> = Vec::new();

        if let Some(status) = query.status {
            params.push(status.as_str().to_string());
            conditions.push(format!("o.current_status = ${}", params.len()));
        }

        // i32, safe to inline
        if let Some(customer_id) = query.customer_id {
            conditions.push(format!("o.customer_id = {}", customer_id));
        }

        if let Some(start) = query.start_date {
            params.push(start.to_rfc3339());
            conditions.push(format!("o.created_at >= ${}::timestamptz", params.len()));
        }

        if let Some(end) = query.end_date {
            params.push(end.to_rfc3339());
            conditions.push(format!("o.created_at < ${}::timestamptz", params.len()));
        }

        let where_clause = if conditions.is_empty() {
            String::new()
        } else {
            format!("WHERE {}", conditions.join(" AND "))
        };

        let count_query = format!("SELECT COUNT(*) FROM orders o {}", where_clause);
        let mut count_builder = sqlx::query_scalar::<_, i64>(&count_query);
        for param in &params {
            count_builder = count_builder.bind(param);
        }
        let total = count_builder.fetch_one(&self.pool).await?;

        let order = super::order_by(
            query.sort.as_deref(),
            &["created_at", "total", "id"],
            "-created_at",
        );
        let select_query = format!(
            r#"
            SELECT o.id, o.customer_id, u.name as customer_name, o.total,
                   o.current_status, o.created_at,
                   (SELECT COUNT(*) FROM order_items oi WHERE oi.order_id = o.id) as nb_items
            FROM orders o
            JOIN users u ON u.id = o.customer_id
            {}
            ORDER BY o.{} LIMIT {} OFFSET {}
            "#,
            where_clause, order, per_page, offset
        );

        let mut select_builder = sqlx::query_as::<_, OrderSummary>(&select_query);
        for param in &params {
            select_builder = select_builder.bind(param);
        }
        let orders = select_builder.fetch_all(&self.pool).await?;

        Ok((orders, total))
    }

    /// Create a RESERVED order with its lines and the initial history entry
    pub async fn create(
        &self,
        customer_id: i32,
        lines: &[OrderLine],
        total: Decimal,
    ) -> AppResult<i32> {
        let now = Utc::now();
        let mut tx = self.pool.begin().await?;

        let id = sqlx::query_scalar::<_, i32>(
            r#"
            INSERT INTO orders (customer_id, total, current_status, created_at)
            VALUES ($1, $2, $3, $4)
            RETURNING id
            "#,
        )
        .bind(customer_id)
        .bind(total)
        .bind(OrderStatus::Reserved)
        .bind(now)
        .fetch_one(&mut *tx)
        .await?;

        for (book_id, quantity, price) in lines {
            sqlx::query(
                "INSERT INTO order_items (order_id, book_id, quantity, price) VALUES ($1, $2, $3, $4)",
            )
            .bind(id)
            .bind(book_id)
            .bind(quantity)
            .bind(price)
            .execute(&mut *tx)
            .await?;
        }

        sqlx::query("INSERT INTO order_history (order_id, status, created_at) VALUES ($1, $2, $3)")
            .bind(id)
            .bind(OrderStatus::Reserved)
            .bind(now)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        Ok(id)
    }

    /// Move an order to a new status, appending a history entry.
    /// The transition rule is enforced by the caller.
    pub async fn update_status(&self, id: i32, status: OrderStatus) -> AppResult<()> {
        let now = Utc::now();
        let mut tx = self.pool.begin().await?;

        sqlx::query("UPDATE orders SET current_status = $1 WHERE id = $2")
            .bind(status)
            .bind(id)
            .execute(&mut *tx)
            .await?;

        sqlx::query("INSERT INTO order_history (order_id, status, created_at) VALUES ($1, $2, $3)")
            .bind(id)
            .bind(status)
            .bind(now)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        Ok(())
    }

    /// Expire every RESERVED order created before the cutoff. Returns the
    /// IDs that were transitioned.
    pub async fn expire_reservations(&self, cutoff: DateTime<Utc>) -> AppResult<Vec<i32>> {
        let now = Utc::now();
        let mut tx = self.pool.begin().await?;

        let ids: Vec<i32> = sqlx::query_scalar(
            r#"
            UPDATE orders
            SET current_status = $1
            WHERE current_status = $2 AND created_at < $3
            RETURNING id
            "#,
        )
        .bind(OrderStatus::ReservationExpired)
        .bind(OrderStatus::Reserved)
        .bind(cutoff)
        .fetch_all(&mut *tx)
        .await?;

        for id in &ids {
            sqlx::query(
                "INSERT INTO order_history (order_id, status, created_at) VALUES ($1, $2, $3)",
            )
            .bind(id)
            .bind(OrderStatus::ReservationExpired)
            .bind(now)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        Ok(ids)
    }
}
