//! Audit log repository for database operations

use chrono::Utc;
use sqlx::{Pool, Postgres};

use crate::{
    error::AppResult,
    models::audit::{AuditAction, AuditQuery, LogAudit},
};

#[derive(Clone)]
pub struct AuditsRepository {
    pool: Pool<Postgres>,
}

impl AuditsRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Append one audit entry
    pub async fn record(&self, actor: &str, action: AuditAction, element: &str) -> AppResult<()> {
        sqlx::query(
            "INSERT INTO log_audits (actor, action, element, created_at) VALUES ($1, $2, $3, $4)",
        )
        .bind(actor)
        .bind(action)
        .bind(element)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Search audit entries, newest first
    pub async fn search(&self, query: &AuditQuery) -> AppResult<(Vec<LogAudit>, i64)> {
        let (_, per_page, offset) = super::page_bounds(query.page, query.per_page);

        let mut conditions = Vec::new();
        let mut params: Vec<String> = Vec::new();

        if let Some(ref actor) = query.actor {
            params.push(actor.clone());
            conditions.push(format!("LOWER(actor) = LOWER(${})", params.len()));
        }

        if let Some(action) = query.action {
            params.push(action.as_str().to_string());
            conditions.push(format!("action = ${}", params.len()));
        }

        if let Some(start) = query.start_date {
            params.push(start.to_rfc3339());
            conditions.push(format!("created_at >= ${}::timestamptz", params.len()));
        }

        if let Some(end) = query.end_date {
            params.push(end.to_rfc3339());
            conditions.push(format!("created_at < ${}::timestamptz", params.len()));
        }

        let where_clause = if conditions.is_empty() {
            String::new()
        } else {
            format!("WHERE {}", conditions.join(" AND "))
        };

        let count_query = format!("SELECT COUNT(*) FROM log_audits {}", where_clause);
        let mut count_builder = sqlx::query_scalar::<_, i64>(&count_query);
        for param in &params {
            count_builder = count_builder.bind(param);
        }
        let total = count_builder.fetch_one(&self.pool).await?;

        let select_query = format!(
            r#"
            SELECT id, actor, action, element, created_at
            FROM log_audits {}
            ORDER BY created_at DESC, id DESC
            LIMIT {} OFFSET {}
            "#,
            where_clause, per_page, offset
        );

        let mut select_builder = sqlx::query_as::<_, LogAudit>(&select_query);
        for param in &params {
            select_builder = select_builder.bind(param);
        }
        let entries = select_builder.fetch_all(&self.pool).await?;

        Ok((entries, total))
    }
}
