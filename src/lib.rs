//! SuiteHub library
//!
//! Venue reservations, events, suite contracts and the staff dashboard
//! behind a JSON API.

use std::sync::Arc;

pub mod api;
pub mod config;
pub mod db;
pub mod middleware;
pub mod models;
pub mod services;
pub mod utils;

pub use config::AppConfig;
pub use db::DbPool;
pub use middleware::{auth_middleware, AuthUser, Claims};
use services::{ChatService, MediaStore, SystemMonitor};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    /// Application configuration
    pub config: AppConfig,
    /// Database connection pool
    pub db: DbPool,
    /// Chat completion proxy
    pub chat: ChatService,
    /// Host metrics sampler for the status page
    pub system_monitor: Arc<SystemMonitor>,
    /// Uploaded file storage
    pub media: MediaStore,
}

impl AppState {
    /// Build state from configuration and an open pool
    pub fn new(config: AppConfig, db: DbPool) -> anyhow::Result<Self> {
        let chat = ChatService::from_config(&config.chat)?;
        let media = MediaStore::new(&config.media);
        Ok(Self {
            config,
            db,
            chat,
            system_monitor: Arc::new(SystemMonitor::new()),
            media,
        })
    }
}
