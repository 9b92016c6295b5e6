//! Chat session and message repository

use anyhow::{Context, Result};
use sqlx::SqlitePool;
use uuid::Uuid;

use super::{parse_id, parse_id_opt};
use crate::models::{ChatMessage, ChatRole, ChatSession};
use crate::utils::time::{db_now, parse_db_timestamp};

#[derive(Debug, sqlx::FromRow)]
struct SessionRow {
    id: String,
    session_key: String,
    user_id: Option<String>,
    title: String,
    created_at: String,
    updated_at: String,
}

#[derive(Debug, sqlx::FromRow)]
struct MessageRow {
    role: String,
    content: String,
    created_at: String,
}

pub struct ChatRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> ChatRepository<'a> {
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn find_session(&self, session_key: &str) -> Result<Option<ChatSession>> {
        let row = sqlx::query_as::<_, SessionRow>(
            r#"
            SELECT id, session_key, user_id, title, created_at, updated_at
            FROM chat_sessions
            WHERE session_key = ?
            "#,
        )
        .bind(session_key)
        .fetch_optional(self.pool)
        .await
        .context("Failed to get chat session")?;

        Ok(row.map(row_to_session))
    }

    /// Fetch the session for `session_key`, creating it on first use
    pub async fn get_or_create_session(
        &self,
        session_key: &str,
        user_id: Option<Uuid>,
    ) -> Result<ChatSession> {
        let now = db_now();

        sqlx::query(
            r#"
            INSERT INTO chat_sessions (id, session_key, user_id, title, created_at, updated_at)
            VALUES (?, ?, ?, 'Chat Session', ?, ?)
            ON CONFLICT(session_key) DO NOTHING
            "#,
        )
        .bind(Uuid::new_v4().to_string())
        .bind(session_key)
        .bind(user_id.map(|u| u.to_string()))
        .bind(&now)
        .bind(&now)
        .execute(self.pool)
        .await
        .context("Failed to create chat session")?;

        self.find_session(session_key)
            .await?
            .context("Failed to retrieve chat session")
    }

    pub async fn append_message(
        &self,
        session_id: Uuid,
        role: ChatRole,
        content: &str,
    ) -> Result<()> {
        let now = db_now();
        let mut tx = self.pool.begin().await.context("Failed to begin transaction")?;

        sqlx::query(
            "INSERT INTO chat_messages (session_id, role, content, created_at) VALUES (?, ?, ?, ?)",
        )
        .bind(session_id.to_string())
        .bind(role.as_str())
        .bind(content)
        .bind(&now)
        .execute(&mut *tx)
        .await
        .context("Failed to append chat message")?;

        sqlx::query("UPDATE chat_sessions SET updated_at = ? WHERE id = ?")
            .bind(&now)
            .bind(session_id.to_string())
            .execute(&mut *tx)
            .await
            .context("Failed to touch chat session")?;

        tx.commit().await.context("Failed to commit chat message")?;
        Ok(())
    }

    /// The last `limit` messages, oldest first
    pub async fn recent_messages(&self, session_id: Uuid, limit: i64) -> Result<Vec<ChatMessage>> {
        let rows = sqlx::query_as::<_, MessageRow>(
            r#"
            SELECT role, content, created_at FROM (
                SELECT seq, role, content, created_at
                FROM chat_messages
                WHERE session_id = ?
                ORDER BY seq DESC
                LIMIT ?
            )
            ORDER BY seq
            "#,
        )
        .bind(session_id.to_string())
        .bind(limit)
        .fetch_all(self.pool)
        .await
        .context("Failed to load recent chat messages")?;

        Ok(rows.into_iter().map(row_to_message).collect())
    }

    /// Full ordered log for a session
    pub async fn messages(&self, session_id: Uuid) -> Result<Vec<ChatMessage>> {
        let rows = sqlx::query_as::<_, MessageRow>(
            r#"
            SELECT role, content, created_at
            FROM chat_messages
            WHERE session_id = ?
            ORDER BY created_at, seq
            "#,
        )
        .bind(session_id.to_string())
        .fetch_all(self.pool)
        .await
        .context("Failed to load chat history")?;

        Ok(rows.into_iter().map(row_to_message).collect())
    }
}

fn row_to_session(row: SessionRow) -> ChatSession {
    ChatSession {
        id: parse_id(&row.id),
        session_key: row.session_key,
        user_id: parse_id_opt(row.user_id.as_deref()),
        title: row.title,
        created_at: parse_db_timestamp(&row.created_at),
        updated_at: parse_db_timestamp(&row.updated_at),
    }
}

fn row_to_message(row: MessageRow) -> ChatMessage {
    ChatMessage {
        role: row.role.parse().unwrap_or(ChatRole::User),
        content: row.content,
        created_at: parse_db_timestamp(&row.created_at),
    }
}
