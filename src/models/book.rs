//! Book (catalog entry) model and related types

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use validator::{Validate, ValidationError};

use super::author::Author;
use super::category::Category;

/// Full book model (DB + API). Category and authors are loaded separately.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Book {
    pub id: i32,
    pub title: String,
    pub description: Option<String>,
    #[schema(value_type = String)]
    pub price: Decimal,
    pub category_id: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
    // Relations (loaded separately)
    #[sqlx(skip)]
    #[serde(default)]
    pub category: Option<Category>,
    #[sqlx(skip)]
    #[serde(default)]
    pub authors: Vec<Author>,
}

/// Short book representation for lists
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct BookSummary {
    pub id: i32,
    pub title: String,
    #[schema(value_type = String)]
    pub price: Decimal,
    pub category_id: i32,
    pub category_name: String,
}

fn validate_price(price: &Decimal) -> Result<(), ValidationError> {
    if *price > Decimal::ZERO {
        Ok(())
    } else {
        let mut err = ValidationError::new("price_positive");
        err.message = Some("Price must be greater than zero".into());
        Err(err)
    }
}

/// Create book request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateBook {
    #[validate(length(min = 1, max = 150, message = "Title must be between 1 and 150 characters"))]
    pub title: String,
    #[validate(length(max = 1000, message = "Description must be at most 1000 characters"))]
    pub description: Option<String>,
    #[validate(custom(function = "validate_price"))]
    #[schema(value_type = String)]
    pub price: Decimal,
    pub category_id: i32,
    #[validate(length(min = 1, message = "At least one author is required"))]
    pub author_ids: Vec<i32>,
}

/// Update book request (PUT replaces the whole record, author links included)
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateBook {
    #[validate(length(min = 1, max = 150, message = "Title must be between 1 and 150 characters"))]
    pub title: String,
    #[validate(length(max = 1000, message = "Description must be at most 1000 characters"))]
    pub description: Option<String>,
    #[validate(custom(function = "validate_price"))]
    #[schema(value_type = String)]
    pub price: Decimal,
    pub category_id: i32,
    #[validate(length(min = 1, message = "At least one author is required"))]
    pub author_ids: Vec<i32>,
}

/// Book query parameters
#[derive(Debug, Deserialize, IntoParams, ToSchema)]
pub struct BookQuery {
    /// Substring match on the title
    pub title: Option<String>,
    /// Restrict to a category
    pub category_id: Option<i32>,
    /// Sort key: `title`, `price`, `id`, prefix with `-` for descending
    pub sort: Option<String>,
    pub page: Option<i64>,
    pub per_page: Option<i64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn price_must_be_positive() {
        let book = CreateBook {
            title: "The Histories".to_string(),
            description: None,
            price: Decimal::ZERO,
            category_id: 1,
            author_ids: vec![1],
        };
        assert!(book.validate().is_err());
    }

    #[test]
    fn valid_book_passes_validation() {
        let book = CreateBook {
            title: "The Histories".to_string(),
            description: Some("Herodotus".to_string()),
            price: Decimal::new(1999, 2),
            category_id: 1,
            author_ids: vec![1, 2],
        };
        assert!(book.validate().is_ok());
    }

    #[test]
    fn authors_are_required() {
        let book = CreateBook {
            title: "Anonymous".to_string(),
            description: None,
            price: Decimal::ONE,
            category_id: 1,
            author_ids: Vec::new(),
        };
        assert!(book.validate().is_err());
    }
}
