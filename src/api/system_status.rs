//! Host and database status for the ops dashboard (staff only)

use axum::{extract::State, routing::get, Router};

use crate::{
    models::{PlatformInfo, SystemStatus},
    utils::Json,
    AppState,
};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/system_status/api/", get(get_status))
        .route("/system_status/api/info/", get(get_platform_info))
}

/// GET /system_status/api/
///
/// Metrics that cannot be read are reported as `"N/A"`.
async fn get_status(State(state): State<AppState>) -> Json<SystemStatus> {
    Json(state.system_monitor.status(&state.db).await)
}

/// GET /system_status/api/info/
async fn get_platform_info(State(state): State<AppState>) -> Json<PlatformInfo> {
    Json(state.system_monitor.platform_info())
}
