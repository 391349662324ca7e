//! Audit log model and related types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{Decode, Encode, FromRow, Postgres};
use utoipa::{IntoParams, ToSchema};

/// Kind of recorded mutation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum AuditAction {
    Add,
    Update,
}

impl AuditAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            AuditAction::Add => "add",
            AuditAction::Update => "update",
        }
    }
}

impl std::fmt::Display for AuditAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for AuditAction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "add" => Ok(AuditAction::Add),
            "update" => Ok(AuditAction::Update),
            _ => Err(format!("Invalid audit action: {}", s)),
        }
    }
}

// SQLx conversion for AuditAction (stored as TEXT)
impl sqlx::Type<Postgres> for AuditAction {
    fn type_info() -> sqlx::postgres::PgTypeInfo {
        <String as sqlx::Type<Postgres>>::type_info()
    }
}

impl<'r> Decode<'r, Postgres> for AuditAction {
    fn decode(value: sqlx::postgres::PgValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let s: String = Decode::<Postgres>::decode(value)?;
        s.parse().map_err(|e: String| e.into())
    }
}

impl Encode<'_, Postgres> for AuditAction {
    fn encode_by_ref(&self, buf: &mut sqlx::postgres::PgArgumentBuffer) -> sqlx::encode::IsNull {
        let s: String = self.as_str().to_string();
        <String as Encode<Postgres>>::encode(s, buf)
    }
}

/// One audit log row: who did what to which element
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct LogAudit {
    pub id: i64,
    /// Email of the acting user
    pub actor: String,
    pub action: AuditAction,
    /// Touched element as `{entity}:{id}`, e.g. `book:42`
    pub element: String,
    pub created_at: DateTime<Utc>,
}

/// Audit query parameters
#[derive(Debug, Deserialize, IntoParams, ToSchema)]
pub struct AuditQuery {
    /// Exact match on the acting user's email
    pub actor: Option<String>,
    /// Restrict to an action kind
    pub action: Option<AuditAction>,
    /// Entries created at or after this instant
    pub start_date: Option<DateTime<Utc>>,
    /// Entries created before this instant
    pub end_date: Option<DateTime<Utc>>,
    pub page: Option<i64>,
    pub per_page: Option<i64>,
}
