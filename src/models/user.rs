//! User model and related types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{Decode, Encode, FromRow, Postgres};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::error::AppError;

/// Granted roles. Customers hold CUSTOMER; employees hold EMPLOYEE and
/// optionally ADMINISTRATOR.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "UPPERCASE")]
pub enum Role {
    Customer,
    Employee,
    Administrator,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Customer => "CUSTOMER",
            Role::Employee => "EMPLOYEE",
            Role::Administrator => "ADMINISTRATOR",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "CUSTOMER" => Ok(Role::Customer),
            "EMPLOYEE" => Ok(Role::Employee),
            "ADMINISTRATOR" => Ok(Role::Administrator),
            _ => Err(format!("Invalid role: {}", s)),
        }
    }
}

/// Account type discriminator (string identifier)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum UserType {
    Customer,
    Employee,
}

impl UserType {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserType::Customer => "customer",
            UserType::Employee => "employee",
        }
    }

    /// Roles granted to a freshly created account of this type
    pub fn default_roles(&self) -> Vec<Role> {
        match self {
            UserType::Customer => vec![Role::Customer],
            UserType::Employee => vec![Role::Employee],
        }
    }
}

impl std::fmt::Display for UserType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for UserType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "customer" => Ok(UserType::Customer),
            "employee" => Ok(UserType::Employee),
            _ => Err(format!("Invalid user type: {}", s)),
        }
    }
}

// SQLx conversion for UserType (stored as TEXT)
impl sqlx::Type<Postgres> for UserType {
    fn type_info() -> sqlx::postgres::PgTypeInfo {
        <String as sqlx::Type<Postgres>>::type_info()
    }
}

impl<'r> Decode<'r, Postgres> for UserType {
    fn decode(value: sqlx::postgres::PgValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let s: String = Decode::<Postgres>::decode(value)?;
        s.parse().map_err(|e: String| e.into())
    }
}

impl Encode<'_, Postgres> for UserType {
    fn encode_by_ref(&self, buf: &mut sqlx::postgres::PgArgumentBuffer) -> sqlx::encode::IsNull {
        let s: String = self.as_str().to_string();
        <String as Encode<Postgres>>::encode(s, buf)
    }
}

/// Internal row structure for database queries (roles as raw strings)
#[derive(Debug, Clone, FromRow)]
pub struct UserRow {
    id: i32,
    name: String,
    email: String,
    password: Option<String>,
    roles: Vec<String>,
    user_type: UserType,
    created_at: Option<DateTime<Utc>>,
    updated_at: Option<DateTime<Utc>>,
}

impl From<UserRow> for User {
    fn from(row: UserRow) -> Self {
        User {
            id: row.id,
            name: row.name,
            email: row.email,
            password: row.password,
            roles: row.roles.iter().filter_map(|r| r.parse().ok()).collect(),
            user_type: row.user_type,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// Full user model from database
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct User {
    pub id: i32,
    pub name: String,
    pub email: String,
    /// Hashed password (argon2)
    #[serde(skip_serializing)]
    pub password: Option<String>,
    pub roles: Vec<Role>,
    pub user_type: UserType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl User {
    pub fn has_role(&self, role: Role) -> bool {
        self.roles.contains(&role)
    }
}

/// Short user representation for lists
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct UserShort {
    pub id: i32,
    pub name: String,
    pub email: String,
    pub user_type: UserType,
}

/// User query parameters
#[derive(Debug, Deserialize, IntoParams, ToSchema)]
pub struct UserQuery {
    /// Substring match on the user name
    pub name: Option<String>,
    /// Restrict to an account type
    pub user_type: Option<UserType>,
    pub page: Option<i64>,
    pub per_page: Option<i64>,
}

/// Create user request. Without an authenticated administrator this is the
/// public signup flow and may only create customers.
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateUser {
    #[validate(length(min = 1, max = 40, message = "Name must be between 1 and 40 characters"))]
    pub name: String,
    #[validate(email(message = "Invalid email format"))]
    pub email: String,
    #[validate(length(min = 6, message = "Password must be at least 6 characters"))]
    pub password: String,
    pub user_type: Option<UserType>,
}

/// Update user request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateUser {
    #[validate(length(min = 1, max = 40, message = "Name must be between 1 and 40 characters"))]
    pub name: Option<String>,
    #[validate(email(message = "Invalid email format"))]
    pub email: Option<String>,
}

/// Change password request (self-service)
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdatePassword {
    pub current_password: String,
    #[validate(length(min = 6, message = "Password must be at least 6 characters"))]
    pub new_password: String,
}

/// JWT Claims for authenticated users
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserClaims {
    pub sub: String,
    pub user_id: i32,
    pub name: String,
    pub roles: Vec<Role>,
    pub exp: i64,
    pub iat: i64,
}

impl UserClaims {
    /// Create a new JWT token
    pub fn create_token(&self, secret: &str) -> Result<String, jsonwebtoken::errors::Error> {
        use jsonwebtoken::{encode, EncodingKey, Header};
        encode(
            &Header::default(),
            self,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
    }

    /// Parse JWT token
    pub fn from_token(token: &str, secret: &str) -> Result<Self, jsonwebtoken::errors::Error> {
        use jsonwebtoken::{decode, DecodingKey, Validation};
        let token_data = decode::<Self>(
            token,
            &DecodingKey::from_secret(secret.as_bytes()),
            &Validation::default(),
        )?;
        Ok(token_data.claims)
    }

    pub fn has_role(&self, role: Role) -> bool {
        self.roles.contains(&role)
    }

    pub fn is_employee(&self) -> bool {
        self.has_role(Role::Employee)
    }

    pub fn is_admin(&self) -> bool {
        self.has_role(Role::Administrator)
    }

    pub fn require_customer(&self) -> Result<(), AppError> {
        if self.has_role(Role::Customer) {
            Ok(())
        } else {
            Err(AppError::Authorization(
                "Customer account required".to_string(),
            ))
        }
    }

    pub fn require_employee(&self) -> Result<(), AppError> {
        if self.is_employee() {
            Ok(())
        } else {
            Err(AppError::Authorization(
                "Employee privileges required".to_string(),
            ))
        }
    }

    pub fn require_admin(&self) -> Result<(), AppError> {
        if self.is_admin() {
            Ok(())
        } else {
            Err(AppError::Authorization(
                "Administrator privileges required".to_string(),
            ))
        }
    }

    /// Self-or-employee check for account reads
    pub fn require_self_or_employee(&self, user_id: i32) -> Result<(), AppError> {
        if self.user_id == user_id || self.is_employee() {
            Ok(())
        } else {
            Err(AppError::Authorization(
                "Not allowed to access this account".to_string(),
            ))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_parsing_is_case_insensitive() {
        assert_eq!("customer".parse::<Role>().unwrap(), Role::Customer);
        assert_eq!("ADMINISTRATOR".parse::<Role>().unwrap(), Role::Administrator);
        assert!("root".parse::<Role>().is_err());
    }

    #[test]
    fn token_roundtrip_preserves_claims() {
        let claims = UserClaims {
            sub: "reader@example.org".to_string(),
            user_id: 7,
            name: "Reader".to_string(),
            roles: vec![Role::Customer],
            iat: 1_700_000_000,
            exp: 4_102_444_800,
        };

        let token = claims.create_token("test-secret").unwrap();
        let decoded = UserClaims::from_token(&token, "test-secret").unwrap();
        assert_eq!(decoded.sub, claims.sub);
        assert_eq!(decoded.user_id, 7);
        assert_eq!(decoded.roles, vec![Role::Customer]);
    }

    #[test]
    fn token_with_wrong_secret_is_rejected() {
        let claims = UserClaims {
            sub: "reader@example.org".to_string(),
            user_id: 7,
            name: "Reader".to_string(),
            roles: vec![Role::Customer],
            iat: 1_700_000_000,
            exp: 4_102_444_800,
        };

        let token = claims.create_token("test-secret").unwrap();
        assert!(UserClaims::from_token(&token, "other-secret").is_err());
    }

    #[test]
    fn employee_checks_follow_roles() {
        let claims = UserClaims {
            sub: "clerk@example.org".to_string(),
            user_id: 2,
            name: "Clerk".to_string(),
            roles: vec![Role::Employee],
            iat: 0,
            exp: i64::MAX,
        };

        assert!(claims.require_employee().is_ok());
        assert!(claims.require_admin().is_err());
        assert!(claims.require_customer().is_err());
        assert!(claims.require_self_or_employee(99).is_ok());
    }
}
