//! User registration, authentication and administration service

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use chrono::Utc;

use crate::{
    config::AuthConfig,
    error::{AppError, AppResult},
    models::user::{RegisterRequest, Role, UpdateUser, User, UserClaims},
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

    /// Register a new account.
    ///
    /// The role is decided here, once: usernames on the configured admin
    /// allow-list become admins, everyone else a plain user. Nothing later
    /// re-evaluates this except an explicit admin edit.
    pub async fn register(&self, request: RegisterRequest) -> AppResult<User> {
        let username = request.username.trim().to_string();

        if self.repository.users.get_by_username(&username).await?.is_some() {
            return Err(AppError::DuplicateUsername(username));
        }

        let password_hash = self.hash_password(&request.password)?;

        let role = if self.config.admin_usernames.iter().any(|u| u == &username) {
            Role::Admin
        } else {
            Role::User
        };

        let user = self.repository.users.create(&username, &password_hash, role).await?;
        tracing::info!(username = %user.username, role = %user.role, "user registered");
        Ok(user)
    }

    /// Authenticate by username and password, returning a JWT token and the
    /// user record. The message never says which of the two was wrong.
    pub async fn authenticate(&self, username: &str, password: &str) -> AppResult<(String, User)> {
        let user = self
            .repository
            .users
            .get_by_username(username.trim())
            .await?
            .ok_or_else(|| AppError::Authentication("Invalid username or password".to_string()))?;

        if !self.verify_password(&user.password_hash, password) {
            return Err(AppError::Authentication("Invalid username or password".to_string()));
        }

        let token = self.create_token(&user)?;
        Ok((token, user))
    }

    /// Build a signed JWT for a user
    pub fn create_token(&self, user: &User) -> AppResult<String> {
        let now = Utc::now().timestamp();
        let exp = now + (self.config.jwt_expiration_hours as i64 * 3600);

        let claims = UserClaims {
            sub: user.username.clone(),
            user_id: user.id,
            role: user.role,
            exp,
            iat: now,
        };

        claims
            .create_token(&self.config.jwt_secret)
            .map_err(|e| AppError::Internal(format!("Failed to create token: {}", e)))
    }

    /// Get user by ID
    pub async fn get_by_id(&self, id: i64) -> AppResult<User> {
        self.repository.users.get_by_id(id).await
    }

    /// List all users
    pub async fn list_users(&self) -> AppResult<Vec<User>> {
        self.repository.users.list().await
    }

    /// Update a user's username and/or role (admin operation)
    pub async fn update_user(&self, id: i64, update: UpdateUser) -> AppResult<User> {
        self.repository
            .users
            .update(id, update.username.as_deref(), update.role)
            .await
    }

    /// Delete a user (admin operation)
    pub async fn delete_user(&self, id: i64) -> AppResult<()> {
        self.repository.users.delete(id).await
    }

    fn hash_password(&self, password: &str) -> AppResult<String> {
        let salt = SaltString::generate(&mut OsRng);
        Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map(|h| h.to_string())
            .map_err(|e| AppError::Internal(format!("Failed to hash password: {}", e)))
    }

    fn verify_password(&self, hash: &str, password: &str) -> bool {
        PasswordHash::new(hash)
            .map(|parsed| {
                Argon2::default()
                    .verify_password(password.as_bytes(), &parsed)
                    .is_ok()
            })
            .unwrap_or(false)
    }
}
