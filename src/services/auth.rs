//! Authentication service
//!
//! Provides password hashing with Argon2 and user authentication.

use anyhow::{Context, Result};
use argon2::{
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use rand::rngs::OsRng;
use sqlx::SqlitePool;
use tracing::info;

use crate::config::BootstrapAdminConfig;
use crate::db::UserRepository;
use crate::models::User;

/// Authentication service for user management
pub struct AuthService<'a> {
    pool: &'a SqlitePool,
}

impl<'a> AuthService<'a> {
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Hash a password using Argon2id
    pub fn hash_password(password: &str) -> Result<String> {
        let salt = SaltString::generate(&mut OsRng);
        let argon2 = Argon2::default();
        let password_hash = argon2
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| anyhow::anyhow!("Failed to hash password: {}", e))?
            .to_string();
        Ok(password_hash)
    }

    /// Verify a password against a hash
    pub fn verify_password(password: &str, password_hash: &str) -> Result<bool> {
        let parsed_hash = PasswordHash::new(password_hash)
            .map_err(|e| anyhow::anyhow!("Invalid password hash format: {}", e))?;
        Ok(Argon2::default()
            .verify_password(password.as_bytes(), &parsed_hash)
            .is_ok())
    }

    /// Authenticate a user by username and password
    pub async fn authenticate(&self, username: &str, password: &str) -> Result<Option<User>> {
        let user = UserRepository::new(self.pool)
            .get_by_username(username)
            .await?;

        match user {
            Some(user) => {
                if Self::verify_password(password, &user.password_hash)? {
                    Ok(Some(user))
                } else {
                    Ok(None)
                }
            }
            None => Ok(None),
        }
    }

    /// Create a user, hashing the password
    pub async fn create_user(
        &self,
        username: &str,
        email: &str,
        password: &str,
        is_staff: bool,
    ) -> Result<User> {
        let password_hash = Self::hash_password(password)?;
        UserRepository::new(self.pool)
            .create(username, email, &password_hash, is_staff)
            .await
    }

    /// Create the configured staff account unless the username is taken
    pub async fn ensure_bootstrap_admin(&self, admin: &BootstrapAdminConfig) -> Result<bool> {
        let users = UserRepository::new(self.pool);
        if users.get_by_username(&admin.username).await?.is_some() {
            return Ok(false);
        }

        self.create_user(&admin.username, &admin.email, &admin.password, true)
            .await
            .context("Failed to create bootstrap admin")?;
        info!(username = %admin.username, "Created bootstrap staff account");
        Ok(true)
    }
}
