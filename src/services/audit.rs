//! Audit log query service

use crate::{
    error::AppResult,
    models::audit::{AuditQuery, LogAudit},
    repository::Repository,
};

#[derive(Clone)]
pub struct AuditService {
    repository: Repository,
}

impl AuditService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    /// Search audit entries, newest first
    pub async fn search(&self, query: &AuditQuery) -> AppResult<(Vec<LogAudit>, i64)> {
        self.repository.audits.search(query).await
    }
}
