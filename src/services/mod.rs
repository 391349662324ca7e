//! Business logic services

pub mod audit;
pub mod catalog;
pub mod orders;
pub mod users;

use crate::{
    config::{AuthConfig, OrdersConfig},
    error::AppResult,
    repository::Repository,
};

/// Container for all services
#[derive(Clone)]
pub struct Services {
    pub catalog: catalog::CatalogService,
    pub users: users::UsersService,
    pub orders: orders::OrdersService,
    pub audits: audit::AuditService,
    repository: Repository,
}

impl Services {
    /// Create all services with the given repository
    pub fn new(repository: Repository, auth_config: AuthConfig, orders_config: OrdersConfig) -> Self {
        Self {
            catalog: catalog::CatalogService::new(repository.clone()),
            users: users::UsersService::new(repository.clone(), auth_config),
            orders: orders::OrdersService::new(repository.clone(), orders_config),
            audits: audit::AuditService::new(repository.clone()),
            repository,
        }
    }

    /// Round-trip to the database, for readiness probes
    pub async fn ping_database(&self) -> AppResult<()> {
        sqlx::query_scalar::<_, i32>("SELECT 1")
            .fetch_one(&self.repository.pool)
            .await?;
        Ok(())
    }
}
