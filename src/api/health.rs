//! Health check endpoints
//!
//! Provides health check endpoints for monitoring and load balancers.

use axum::{extract::State, http::StatusCode, routing::get, Router};
use serde::Serialize;

use crate::{db, utils::Json, AppState};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/health/", get(health_check))
        .route("/health/detailed/", get(health_check_detailed))
        .route("/health/live/", get(liveness))
        .route("/health/ready/", get(readiness))
}

/// Basic health response
#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

/// Detailed health response with component status
#[derive(Serialize)]
pub struct DetailedHealthResponse {
    pub status: String,
    pub version: String,
    pub components: ComponentHealth,
}

#[derive(Serialize)]
pub struct ComponentHealth {
    pub database: ComponentStatus,
    pub chat: ComponentStatus,
    pub media: ComponentStatus,
}

#[derive(Serialize)]
pub struct ComponentStatus {
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl ComponentStatus {
    fn healthy() -> Self {
        Self {
            status: "healthy".to_string(),
            message: None,
        }
    }

    fn unhealthy(message: impl Into<String>) -> Self {
        Self {
            status: "unhealthy".to_string(),
            message: Some(message.into()),
        }
    }

    fn not_configured() -> Self {
        Self {
            status: "not_configured".to_string(),
            message: None,
        }
    }

    fn is_failing(&self) -> bool {
        self.status == "unhealthy"
    }
}

/// Simple health check endpoint (for load balancers)
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// Detailed health check endpoint
///
/// The chat provider is optional, so a missing API key is reported but never
/// makes the service unhealthy. Returns 503 when the database is unreachable
/// or the media root is missing.
pub async fn health_check_detailed(
    State(state): State<AppState>,
) -> (StatusCode, Json<DetailedHealthResponse>) {
    let database = if db::check_health(&state.db).await {
        ComponentStatus::healthy()
    } else {
        ComponentStatus::unhealthy("Database did not answer")
    };

    let chat = match state.config.chat.api_key.as_deref() {
        Some(key) if !key.is_empty() => ComponentStatus::healthy(),
        _ => ComponentStatus::not_configured(),
    };

    let media = if state.media.root().is_dir() {
        ComponentStatus::healthy()
    } else {
        ComponentStatus::unhealthy(format!(
            "Media root {} does not exist",
            state.media.root().display()
        ))
    };

    let healthy = !database.is_failing() && !media.is_failing();
    let status_code = if healthy {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let response = DetailedHealthResponse {
        status: if healthy { "healthy" } else { "unhealthy" }.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        components: ComponentHealth {
            database,
            chat,
            media,
        },
    };

    (status_code, Json(response))
}

/// Liveness probe
pub async fn liveness() -> StatusCode {
    StatusCode::OK
}

/// Readiness probe
pub async fn readiness(State(state): State<AppState>) -> StatusCode {
    if db::check_health(&state.db).await {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    }
}
