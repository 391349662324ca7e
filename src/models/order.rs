//! Order model and the reservation lifecycle types

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::{Decode, Encode, FromRow, Postgres};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

/// Order lifecycle status.
///
/// Invariant: only RESERVED orders may transition, and never to the same
/// status. DELIVERED, CANCELLED and RESERVATION_EXPIRED are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    Reserved,
    ReservationExpired,
    Delivered,
    Cancelled,
}

impl OrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Reserved => "RESERVED",
            OrderStatus::ReservationExpired => "RESERVATION_EXPIRED",
            OrderStatus::Delivered => "DELIVERED",
            OrderStatus::Cancelled => "CANCELLED",
        }
    }

    pub fn can_transition_to(self, next: OrderStatus) -> bool {
        self == OrderStatus::Reserved && next != self
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for OrderStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "RESERVED" => Ok(OrderStatus::Reserved),
            "RESERVATION_EXPIRED" => Ok(OrderStatus::ReservationExpired),
            "DELIVERED" => Ok(OrderStatus::Delivered),
            "CANCELLED" => Ok(OrderStatus::Cancelled),
            _ => Err(format!("Invalid order status: {}", s)),
        }
    }
}

// SQLx conversion for OrderStatus (stored as TEXT)
impl sqlx::Type<Postgres> for OrderStatus {
    fn type_info() -> sqlx::postgres::PgTypeInfo {
        <String as sqlx::Type<Postgres>>::type_info()
    }
}

impl<'r> Decode<'r, Postgres> for OrderStatus {
    fn decode(value: sqlx::postgres::PgValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let s: String = Decode::<Postgres>::decode(value)?;
        s.parse().map_err(|e: String| e.into())
    }
}

impl Encode<'_, Postgres> for OrderStatus {
    fn encode_by_ref(&self, buf: &mut sqlx::postgres::PgArgumentBuffer) -> sqlx::encode::IsNull {
        let s: String = self.as_str().to_string();
        <String as Encode<Postgres>>::encode(s, buf)
    }
}

/// Customer details embedded in an order
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct OrderCustomer {
    pub id: i32,
    pub name: String,
    pub email: String,
}

/// Order line with the unit price snapshotted at reservation time
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct OrderItem {
    pub book_id: i32,
    pub book_title: String,
    pub quantity: i32,
    #[schema(value_type = String)]
    pub price: Decimal,
}

/// One entry of the order status history
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct OrderHistoryEntry {
    pub status: OrderStatus,
    pub created_at: DateTime<Utc>,
}

/// Full order model (DB + API). Items, history and customer are loaded
/// separately.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Order {
    pub id: i32,
    pub customer_id: i32,
    #[schema(value_type = String)]
    pub total: Decimal,
    pub current_status: OrderStatus,
    pub created_at: DateTime<Utc>,
    #[sqlx(skip)]
    #[serde(default)]
    pub customer: Option<OrderCustomer>,
    #[sqlx(skip)]
    #[serde(default)]
    pub items: Vec<OrderItem>,
    #[sqlx(skip)]
    #[serde(default)]
    pub history: Vec<OrderHistoryEntry>,
}

/// Short order representation for lists
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct OrderSummary {
    pub id: i32,
    pub customer_id: i32,
    pub customer_name: String,
    #[schema(value_type = String)]
    pub total: Decimal,
    pub current_status: OrderStatus,
    pub created_at: DateTime<Utc>,
    pub nb_items: i64,
}

/// Create order line request
#[derive(Debug, Serialize, Deserialize, Validate, ToSchema)]
pub struct CreateOrderItem {
    pub book_id: i32,
    #[validate(range(min = 1, message = "Quantity must be at least 1"))]
    pub quantity: i32,
}

/// Create order request. The customer is taken from the authenticated user.
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateOrder {
    #[validate(length(min = 1, message = "Order must contain at least one item"), nested)]
    pub items: Vec<CreateOrderItem>,
}

/// Status change request
#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateOrderStatus {
    pub status: OrderStatus,
}

/// Order query parameters
#[derive(Debug, Deserialize, IntoParams, ToSchema)]
pub struct OrderQuery {
    /// Restrict to a lifecycle status
    pub status: Option<OrderStatus>,
    /// Restrict to a customer (employees only; implied for customers)
    pub customer_id: Option<i32>,
    /// Orders created at or after this instant
    pub start_date: Option<DateTime<Utc>>,
    /// Orders created before this instant
    pub end_date: Option<DateTime<Utc>>,
    /// Sort key: `created_at`, `total`, `id`, prefix with `-` for descending
    pub sort: Option<String>,
    pub page: Option<i64>,
    pub per_page: Option<i64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reserved_may_move_to_any_other_status() {
        for next in [
            OrderStatus::ReservationExpired,
            OrderStatus::Delivered,
            OrderStatus::Cancelled,
        ] {
            assert!(OrderStatus::Reserved.can_transition_to(next), "{next}");
        }
    }

    #[test]
    fn same_status_transition_is_rejected() {
        assert!(!OrderStatus::Reserved.can_transition_to(OrderStatus::Reserved));
    }

    #[test]
    fn terminal_statuses_never_transition() {
        for from in [
            OrderStatus::ReservationExpired,
            OrderStatus::Delivered,
            OrderStatus::Cancelled,
        ] {
            for next in [
                OrderStatus::Reserved,
                OrderStatus::ReservationExpired,
                OrderStatus::Delivered,
                OrderStatus::Cancelled,
            ] {
                assert!(!from.can_transition_to(next), "{from} -> {next}");
            }
        }
    }

    #[test]
    fn status_roundtrips_through_strings() {
        for status in [
            OrderStatus::Reserved,
            OrderStatus::ReservationExpired,
            OrderStatus::Delivered,
            OrderStatus::Cancelled,
        ] {
            assert_eq!(status.as_str().parse::<OrderStatus>().unwrap(), status);
        }
        assert!("SHIPPED".parse::<OrderStatus>().is_err());
    }
}
