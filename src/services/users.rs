//! User account management and authentication service

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use chrono::Utc;
use validator::Validate;

use crate::{
    config::AuthConfig,
    error::{AppError, AppResult},
    models::{
        audit::AuditAction,
        user::{
            CreateUser, Role, UpdatePassword, UpdateUser, User, UserClaims, UserQuery, UserShort,
            UserType,
        },
    },
    repository::Repository,
};

#[derive(Clone)]
pub struct UsersService {
    repository: Repository,
    config: AuthConfig,
}

impl UsersService {
    pub fn new(repository: Repository, config: AuthConfig) -> Self {
        Self { repository, config }
    }

    /// Authenticate by email and password, returning a JWT token and the user
    pub async fn authenticate(&self, email: &str, password: &str) -> AppResult<(String, User)> {
        let user = self
            .repository
            .users
            .get_by_email(email)
            .await?
            .ok_or_else(|| AppError::Authentication("Invalid email or password".to_string()))?;

        if !self.verify_password(&user, password)? {
            return Err(AppError::Authentication(
                "Invalid email or password".to_string(),
            ));
        }

        let token = self.create_token_for_user(&user)?;
        Ok((token, user))
    }

    /// Build a signed JWT for the given user
    pub fn create_token_for_user(&self, user: &User) -> AppResult<String> {
        let now = Utc::now().timestamp();
        let exp = now + (self.config.jwt_expiration_hours as i64 * 3600);

        let claims = UserClaims {
            sub: user.email.clone(),
            user_id: user.id,
            name: user.name.clone(),
            roles: user.roles.clone(),
            exp,
            iat: now,
        };

        claims
            .create_token(&self.config.jwt_secret)
            .map_err(|e| AppError::Internal(format!("Failed to create token: {}", e)))
    }

    /// Create a user account.
    ///
    /// Without an authenticated actor this is the public signup flow and only
    /// customers can be created; employees require an administrator actor.
    pub async fn create_user(
        &self,
        actor: Option<&UserClaims>,
        user: CreateUser,
    ) -> AppResult<User> {
        user.validate()?;

        let user_type = user.user_type.unwrap_or(UserType::Customer);
        if user_type == UserType::Employee {
            let claims = actor.ok_or_else(|| {
                AppError::Authorization("Administrator privileges required".to_string())
            })?;
            claims.require_admin()?;
        }

        if self.repository.users.email_exists(&user.email, None).await? {
            return Err(AppError::AlreadyExists(format!(
                "User with email '{}' already exists",
                user.email
            )));
        }

        let hash = self.hash_password(&user.password)?;
        let roles = user_type.default_roles();
        let created = self
            .repository
            .users
            .create(&user.name, &user.email, &hash, &roles, user_type)
            .await?;

        // Self-signups are recorded under the fresh account's own email
        let actor_email = actor.map(|c| c.sub.as_str()).unwrap_or(created.email.as_str());
        self.repository
            .audits
            .record(actor_email, AuditAction::Add, &format!("user:{}", created.id))
            .await?;

        Ok(created)
    }

    pub async fn get_by_id(&self, id: i32) -> AppResult<User> {
        self.repository.users.get_by_id(id).await
    }

    pub async fn search_users(&self, query: &UserQuery) -> AppResult<(Vec<UserShort>, i64)> {
        self.repository.users.search(query).await
    }

    /// Update name/email; allowed for the account owner or an administrator
    pub async fn update_user(
        &self,
        claims: &UserClaims,
        id: i32,
        user: UpdateUser,
    ) -> AppResult<User> {
        if claims.user_id != id {
            claims.require_admin()?;
        }
        user.validate()?;

        if let Some(ref email) = user.email {
            if self.repository.users.email_exists(email, Some(id)).await? {
                return Err(AppError::AlreadyExists(format!(
                    "User with email '{}' already exists",
                    email
                )));
            }
        }

        let updated = self
            .repository
            .users
            .update(id, user.name.as_deref(), user.email.as_deref())
            .await?;

        self.repository
            .audits
            .record(&claims.sub, AuditAction::Update, &format!("user:{}", id))
            .await?;

        Ok(updated)
    }

    /// Change the account password; owner only, current password required
    pub async fn update_password(
        &self,
        claims: &UserClaims,
        id: i32,
        payload: UpdatePassword,
    ) -> AppResult<()> {
        if claims.user_id != id {
            return Err(AppError::Authorization(
                "Passwords can only be changed by the account owner".to_string(),
            ));
        }
        payload.validate()?;

        let user = self.repository.users.get_by_id(id).await?;
        if !self.verify_password(&user, &payload.current_password)? {
            return Err(AppError::Authentication(
                "Current password is incorrect".to_string(),
            ));
        }

        let hash = self.hash_password(&payload.new_password)?;
        self.repository.users.update_password(id, &hash).await?;

        self.repository
            .audits
            .record(&claims.sub, AuditAction::Update, &format!("user:{}", id))
            .await?;

        Ok(())
    }

    /// Create the administrator account on first startup if none exists
    pub async fn ensure_bootstrap_admin(&self) -> AppResult<()> {
        if self.repository.users.any_admin().await? {
            return Ok(());
        }

        let hash = self.hash_password(&self.config.bootstrap_admin_password)?;
        let admin = self
            .repository
            .users
            .create(
                "Administrator",
                &self.config.bootstrap_admin_email,
                &hash,
                &[Role::Employee, Role::Administrator],
                UserType::Employee,
            )
            .await?;

        tracing::warn!(
            email = %admin.email,
            "Created bootstrap administrator account; change its password"
        );

        Ok(())
    }

    fn verify_password(&self, user: &User, password: &str) -> AppResult<bool> {
        match user.password.as_deref() {
            Some(stored) => {
                let parsed_hash = PasswordHash::new(stored)
                    .map_err(|e| AppError::Internal(format!("Invalid password hash: {}", e)))?;
                Ok(Argon2::default()
                    .verify_password(password.as_bytes(), &parsed_hash)
                    .is_ok())
            }
            None => Ok(false),
        }
    }

    /// Hash a password using Argon2
    pub fn hash_password(&self, password: &str) -> AppResult<String> {
        let salt = SaltString::generate(&mut OsRng);
        let argon2 = Argon2::default();
        let hash = argon2
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| AppError::Internal(format!("Failed to hash password: {}", e)))?;
        Ok(hash.to_string())
    }
}
