//! OpenAPI documentation

use axum::Router;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::api::{audits, auth, authors, books, categories, health, orders, users};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Alexandria API",
        version = "1.0.0",
        description = "Bookstore Management System REST API",
        license(name = "AGPL-3.0", url = "https://www.gnu.org/licenses/agpl-3.0.html"),
        contact(name = "Alexandria Team", email = "contact@alexandria-books.org")
    ),
    servers(
        (url = "/api/v1", description = "API v1")
    ),
    paths(
        // Health
        health::health_check,
        health::readiness_check,
        // Auth
        auth::login,
        auth::me,
        // Authors
        authors::list_authors,
        authors::get_author,
        authors::create_author,
        authors::update_author,
        // Categories
        categories::list_categories,
        categories::get_category,
        categories::create_category,
        categories::update_category,
        // Books
        books::list_books,
        books::get_book,
        books::create_book,
        books::update_book,
        // Users
        users::list_users,
        users::get_user,
        users::create_user,
        users::update_user,
        users::update_password,
        // Orders
        orders::list_orders,
        orders::get_order,
        orders::create_order,
        orders::update_order_status,
        orders::expire_stale,
        // Audits
        audits::list_audits,
    ),
    components(
        schemas(
            // Auth
            auth::LoginRequest,
            auth::LoginResponse,
            // Authors
            crate::models::author::Author,
            crate::models::author::CreateAuthor,
            crate::models::author::UpdateAuthor,
            // Categories
            crate::models::category::Category,
            crate::models::category::CreateCategory,
            crate::models::category::UpdateCategory,
            // Books
            crate::models::book::Book,
            crate::models::book::BookSummary,
            crate::models::book::CreateBook,
            crate::models::book::UpdateBook,
            // Users
            crate::models::user::User,
            crate::models::user::UserShort,
            crate::models::user::CreateUser,
            crate::models::user::UpdateUser,
            crate::models::user::UpdatePassword,
            crate::models::user::Role,
            crate::models::user::UserType,
            // Orders
            crate::models::order::Order,
            crate::models::order::OrderSummary,
            crate::models::order::OrderCustomer,
            crate::models::order::OrderItem,
            crate::models::order::OrderHistoryEntry,
            crate::models::order::OrderStatus,
            crate::models::order::CreateOrder,
            crate::models::order::CreateOrderItem,
            crate::models::order::UpdateOrderStatus,
            orders::ExpirationResponse,
            // Audits
            crate::models::audit::LogAudit,
            crate::models::audit::AuditAction,
            // Health
            health::HealthResponse,
            // Errors
            crate::error::ErrorResponse,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "auth", description = "Authentication endpoints"),
        (name = "authors", description = "Author management"),
        (name = "categories", description = "Category management"),
        (name = "books", description = "Book catalog management"),
        (name = "users", description = "User account management"),
        (name = "orders", description = "Order reservation lifecycle"),
        (name = "audits", description = "Audit log")
    )
)]
pub struct ApiDoc;

/// Create the OpenAPI documentation router
pub fn create_openapi_router() -> Router {
    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
}
