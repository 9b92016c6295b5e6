//! Staff dashboard: aggregated statistics and the endpoint index

use axum::{extract::State, routing::get, Router};
use chrono::{Duration, Utc};
use serde::Serialize;

use crate::{
    db::StatsRepository,
    middleware::AuthUser,
    models::DashboardStats,
    utils::{AppResult, Json},
    AppState,
};

/// Statistics route (mounted under `/admin/api`)
pub fn routes() -> Router<AppState> {
    Router::new().route("/stats/", get(get_stats))
}

pub fn index_routes() -> Router<AppState> {
    Router::new().route("/admin/", get(index))
}

/// GET /admin/api/stats/
///
/// Counted from current table state on every request.
async fn get_stats(State(state): State<AppState>) -> AppResult<Json<DashboardStats>> {
    let now = Utc::now();
    let recent_since = now - Duration::days(state.config.dashboard.recent_days);
    let stats = StatsRepository::new(&state.db)
        .dashboard(recent_since, now.date_naive())
        .await?;
    Ok(Json(stats))
}

#[derive(Debug, Serialize)]
pub struct DashboardIndex {
    pub user: String,
    pub endpoints: Vec<&'static str>,
}

const DASHBOARD_ENDPOINTS: &[&str] = &[
    "/admin/api/stats/",
    "/admin/api/entities/",
    "/admin/api/individuals/",
    "/admin/api/organizations/",
    "/admin/api/venues/",
    "/admin/api/event-classes/",
    "/admin/api/events/",
    "/admin/api/event/status/",
    "/admin/api/reservations/",
    "/admin/api/reservation/status/",
    "/admin/api/suites/",
    "/admin/api/operating-models/",
    "/admin/api/contracts/",
    "/admin/api/users/",
    "/system_status/api/",
];

/// GET /admin/
async fn index(auth_user: AuthUser) -> Json<DashboardIndex> {
    Json(DashboardIndex {
        user: auth_user.username,
        endpoints: DASHBOARD_ENDPOINTS.to_vec(),
    })
}
