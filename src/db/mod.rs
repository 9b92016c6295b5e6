//! Database layer
//!
//! SQLite storage for:
//! - Accounts and the entity pool
//! - Venues, events, registrations and reservations
//! - Suites, operating models and contracts
//! - Chat sessions

pub mod chat_repository;
pub mod entity_repository;
pub mod event_repository;
pub mod migrations;
pub mod photo_repository;
pub mod reservation_repository;
pub mod stats_repository;
pub mod suite_repository;
pub mod user_repository;
pub mod venue_repository;

pub use chat_repository::ChatRepository;
pub use entity_repository::{IndividualRepository, OrganizationRepository};
pub use event_repository::{EventClassRepository, EventRepository, RegistrationOutcome};
pub use photo_repository::{PhotoInsert, PhotoRepository};
pub use reservation_repository::ReservationRepository;
pub use stats_repository::{CountedTable, StatsRepository};
pub use suite_repository::{ContractRepository, OperatingModelRepository, SuiteRepository};
pub use user_repository::UserRepository;
pub use venue_repository::VenueRepository;

use std::time::Duration;

use anyhow::{Context, Result};
use sqlx::{
    sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous},
    Pool, Sqlite,
};
use uuid::Uuid;

use crate::config::DatabaseConfig;

/// Database connection pool type
pub type DbPool = Pool<Sqlite>;

/// Initialize the database connection pool and apply migrations
pub async fn init_pool(config: &DatabaseConfig) -> Result<DbPool> {
    let pool = connect(config, config.max_connections).await?;
    migrations::run(&pool).await?;
    Ok(pool)
}

/// Open a pool without running migrations
pub async fn connect(config: &DatabaseConfig, max_connections: u32) -> Result<DbPool> {
    ensure_parent_dir(&config.url)?;

    let options = config
        .url
        .parse::<SqliteConnectOptions>()
        .context("Failed to parse database URL")?
        .journal_mode(SqliteJournalMode::Wal)
        .synchronous(SqliteSynchronous::Normal)
        .busy_timeout(Duration::from_secs(config.connect_timeout_secs))
        .foreign_keys(true)
        .create_if_missing(true);

    SqlitePoolOptions::new()
        .max_connections(max_connections)
        .min_connections(config.min_connections.min(max_connections))
        .acquire_timeout(Duration::from_secs(config.connect_timeout_secs))
        .idle_timeout(Duration::from_secs(config.idle_timeout_secs))
        .connect_with(options)
        .await
        .context("Failed to connect to database")
}

fn ensure_parent_dir(url: &str) -> Result<()> {
    let path = url
        .strip_prefix("sqlite://")
        .or_else(|| url.strip_prefix("sqlite:"))
        .unwrap_or(url);
    if path.starts_with(':') {
        return Ok(());
    }
    let path = path.split('?').next().unwrap_or(path);
    if let Some(parent) = std::path::Path::new(path).parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            std::fs::create_dir_all(parent).context("Failed to create data directory")?;
        }
    }
    Ok(())
}

/// Liveness probe used by health endpoints
pub async fn check_health(pool: &DbPool) -> bool {
    sqlx::query("SELECT 1").execute(pool).await.is_ok()
}

pub(crate) fn parse_id(id: &str) -> Uuid {
    Uuid::parse_str(id).unwrap_or_default()
}

pub(crate) fn parse_id_opt(id: Option<&str>) -> Option<Uuid> {
    id.and_then(|s| Uuid::parse_str(s).ok())
}
