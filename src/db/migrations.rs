//! Database migrations
//!
//! Migrations are embedded from the `migrations/` directory at build time.

use anyhow::{Context, Result};
use sqlx::{Row, SqlitePool};

/// Tables the application cannot run without
pub const REQUIRED_TABLES: &[&str] = &[
    "users",
    "individuals",
    "organizations",
    "venues",
    "venue_photos",
    "event_classes",
    "event_class_photos",
    "events",
    "event_registrations",
    "reservations",
    "suites",
    "suite_photos",
    "suite_operating_models",
    "suite_contracts",
    "chat_sessions",
    "chat_messages",
];

pub async fn run(pool: &SqlitePool) -> Result<()> {
    sqlx::migrate!("./migrations")
        .run(pool)
        .await
        .context("Failed to run database migrations")
}

/// Application tables currently present
pub async fn list_tables(pool: &SqlitePool) -> Result<Vec<String>> {
    let rows = sqlx::query(
        "SELECT name FROM sqlite_master WHERE type='table' AND name NOT LIKE 'sqlite_%' AND name NOT LIKE '_sqlx_%' ORDER BY name",
    )
    .fetch_all(pool)
    .await
    .context("Failed to query database tables")?;

    Ok(rows.iter().map(|row| row.get::<String, _>("name")).collect())
}

/// Required tables that do not exist
pub async fn missing_tables(pool: &SqlitePool) -> Result<Vec<&'static str>> {
    let existing = list_tables(pool).await?;
    Ok(REQUIRED_TABLES
        .iter()
        .filter(|&&table| !existing.iter().any(|t| t == table))
        .copied()
        .collect())
}
