//! Admin host routing
//!
//! Requests arriving on the dashboard host (e.g. `admin.example.org`) are
//! sent to the dashboard unless they already target it.

use axum::{
    extract::{Request, State},
    http::{
        header::{HOST, LOCATION},
        StatusCode,
    },
    middleware::Next,
    response::{IntoResponse, Response},
};
use tracing::debug;

use crate::{config::RoutingConfig, AppState};

/// Where a request on `host` for `path` should be redirected, if anywhere
pub fn admin_redirect_target<'a>(
    routing: &'a RoutingConfig,
    host: &str,
    path: &str,
) -> Option<&'a str> {
    let prefix = routing.admin_host_prefix.as_str();
    if prefix.is_empty() {
        return None;
    }

    let host = host.to_ascii_lowercase();
    // Match whole leading labels only, so "myadmin.example.org" stays public
    let on_admin_host = host.starts_with(prefix) || host.contains(&format!(".{}", prefix));
    if on_admin_host && !path.starts_with(routing.dashboard_path.as_str()) {
        Some(routing.dashboard_path.as_str())
    } else {
        None
    }
}

/// Redirect non-dashboard paths on the admin host with a 302
pub async fn host_routing_middleware(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    let host = request
        .headers()
        .get(HOST)
        .and_then(|h| h.to_str().ok())
        .or_else(|| request.uri().host())
        .unwrap_or_default();

    if let Some(target) = admin_redirect_target(&state.config.routing, host, request.uri().path())
    {
        debug!(host = %host, path = %request.uri().path(), "Redirecting admin host to dashboard");
        return (StatusCode::FOUND, [(LOCATION, target.to_string())]).into_response();
    }

    next.run(request).await
}
