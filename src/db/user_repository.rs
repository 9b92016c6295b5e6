//! User account repository

use anyhow::{Context, Result};
use sqlx::SqlitePool;
use uuid::Uuid;

use super::parse_id;
use crate::models::User;
use crate::utils::time::{db_now, parse_db_timestamp};

#[derive(Debug, sqlx::FromRow)]
struct UserRow {
    id: String,
    username: String,
    email: String,
    password_hash: String,
    is_staff: bool,
    created_at: String,
    updated_at: String,
}

const USER_COLUMNS: &str = "id, username, email, password_hash, is_staff, created_at, updated_at";

pub struct UserRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> UserRepository<'a> {
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn list(&self) -> Result<Vec<User>> {
        let rows = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {USER_COLUMNS} FROM users ORDER BY username"
        ))
        .fetch_all(self.pool)
        .await
        .context("Failed to list users")?;

        Ok(rows.into_iter().map(row_to_user).collect())
    }

    pub async fn get_by_id(&self, id: Uuid) -> Result<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = ?"
        ))
        .bind(id.to_string())
        .fetch_optional(self.pool)
        .await
        .context("Failed to get user")?;

        Ok(row.map(row_to_user))
    }

    pub async fn get_by_username(&self, username: &str) -> Result<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE username = ?"
        ))
        .bind(username)
        .fetch_optional(self.pool)
        .await
        .context("Failed to get user by username")?;

        Ok(row.map(row_to_user))
    }

    /// Insert a user; `password_hash` must already be hashed
    pub async fn create(
        &self,
        username: &str,
        email: &str,
        password_hash: &str,
        is_staff: bool,
    ) -> Result<User> {
        let id = Uuid::new_v4();
        let now = db_now();

        sqlx::query(
            r#"
            INSERT INTO users (id, username, email, password_hash, is_staff, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(id.to_string())
        .bind(username)
        .bind(email)
        .bind(password_hash)
        .bind(is_staff)
        .bind(&now)
        .bind(&now)
        .execute(self.pool)
        .await
        .context("Failed to create user")?;

        self.get_by_id(id)
            .await?
            .context("Failed to retrieve created user")
    }

    pub async fn count(&self) -> Result<i64> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM users")
            .fetch_one(self.pool)
            .await
            .context("Failed to count users")?;
        Ok(count)
    }
}

fn row_to_user(row: UserRow) -> User {
    User {
        id: parse_id(&row.id),
        username: row.username,
        email: row.email,
        password_hash: row.password_hash,
        is_staff: row.is_staff,
        created_at: parse_db_timestamp(&row.created_at),
        updated_at: parse_db_timestamp(&row.updated_at),
    }
}
