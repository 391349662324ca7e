//! Repository layer for database operations

pub mod audits;
pub mod authors;
pub mod books;
pub mod categories;
pub mod orders;
pub mod users;

use sqlx::{Pool, Postgres};

/// Main repository struct holding database connection pool
#[derive(Clone)]
pub struct Repository {
    pub pool: Pool<Postgres>,
    pub authors: authors::AuthorsRepository,
    pub categories: categories::CategoriesRepository,
    pub books: books::BooksRepository,
    pub users: users::UsersRepository,
    pub orders: orders::OrdersRepository,
    pub audits: audits::AuditsRepository,
}

impl Repository {
    /// Create a new repository with the given database pool
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self {
            authors: authors::AuthorsRepository::new(pool.clone()),
            categories: categories::CategoriesRepository::new(pool.clone()),
            books: books::BooksRepository::new(pool.clone()),
            users: users::UsersRepository::new(pool.clone()),
            orders: orders::OrdersRepository::new(pool.clone()),
            audits: audits::AuditsRepository::new(pool.clone()),
            pool,
        }
    }
}

/// Resolve a client sort key (`name`, `-name`, ...) into an ORDER BY clause.
/// Keys outside the whitelist fall back to the default.
pub(crate) fn order_by(sort: Option<&str>, allowed: &[&str], default: &str) -> String {
    fn split(spec: &str) -> (&str, &str) {
        match spec.strip_prefix('-') {
            Some(key) => (key, "DESC"),
            None => (spec, "ASC"),
        }
    }

    let (key, direction) = split(sort.unwrap_or(default));
    if allowed.contains(&key) {
        format!("{} {}", key, direction)
    } else {
        let (key, direction) = split(default);
        format!("{} {}", key, direction)
    }
}

/// Normalize pagination parameters into (page, per_page, offset).
pub(crate) fn page_bounds(page: Option<i64>, per_page: Option<i64>) -> (i64, i64, i64) {
    let page = page.unwrap_or(1).max(1);
    let per_page = per_page.unwrap_or(20).clamp(1, 100);
    (page, per_page, (page - 1) * per_page)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn order_by_accepts_whitelisted_keys() {
        assert_eq!(order_by(Some("name"), &["name", "id"], "id"), "name ASC");
        assert_eq!(order_by(Some("-name"), &["name", "id"], "id"), "name DESC");
    }

    #[test]
    fn order_by_rejects_unknown_keys() {
        // arbitrary SQL must never reach the ORDER BY clause
        assert_eq!(
            order_by(Some("name; DROP TABLE books"), &["name", "id"], "id"),
            "id ASC"
        );
        assert_eq!(order_by(Some("price"), &["name"], "-name"), "name DESC");
    }

    #[test]
    fn order_by_defaults_when_absent() {
        assert_eq!(order_by(None, &["created_at"], "-created_at"), "created_at DESC");
    }

    #[test]
    fn page_bounds_clamps_input() {
        assert_eq!(page_bounds(None, None), (1, 20, 0));
        assert_eq!(page_bounds(Some(3), Some(10)), (3, 10, 20));
        assert_eq!(page_bounds(Some(0), Some(500)), (1, 100, 0));
        assert_eq!(page_bounds(Some(-2), Some(-5)), (1, 1, 0));
    }
}
