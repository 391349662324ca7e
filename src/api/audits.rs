//! Audit log endpoints

use axum::{
    extract::{Query, State},
    Json,
};

use crate::{
    error::AppResult,
    models::audit::{AuditQuery, LogAudit},
};

use super::{AuthenticatedUser, PaginatedResponse};

/// List audit entries, newest first
#[utoipa::path(
    get,
    path = "/audits",
    tag = "audits",
    security(("bearer_auth" = [])),
    params(
        ("actor" = Option<String>, Query, description = "Filter by acting user's email"),
        ("action" = Option<String>, Query, description = "Filter by action (add, update)"),
        ("start_date" = Option<String>, Query, description = "Created at or after (RFC 3339)"),
        ("end_date" = Option<String>, Query, description = "Created before (RFC 3339)"),
        ("page" = Option<i64>, Query, description = "Page number"),
        ("per_page" = Option<i64>, Query, description = "Items per page")
    ),
    responses(
        (status = 200, description = "Audit entries", body = PaginatedResponse<LogAudit>),
        (status = 403, description = "Administrator privileges required")
    )
)]
pub async fn list_audits(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Query(query): Query<AuditQuery>,
) -> AppResult<Json<PaginatedResponse<LogAudit>>> {
    claims.require_admin()?;

    let (entries, total) = state.services.audits.search(&query).await?;

    Ok(Json(PaginatedResponse {
        items: entries,
        total,
        page: query.page.unwrap_or(1),
        per_page: query.per_page.unwrap_or(20),
    }))
}
