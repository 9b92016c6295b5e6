//! API routes and handlers
//!
//! Routes fall into four groups with different guards:
//! - public reads, personalised when a bearer token is present
//! - public submissions (login, reservation requests, chat), rate limited
//! - signed-in user routes
//! - staff routes under `/admin` and `/system_status`

use axum::{extract::DefaultBodyLimit, middleware::from_fn, middleware::from_fn_with_state, Router};
use uuid::Uuid;

use crate::{
    middleware::{
        api_cache_control_middleware, auth_middleware, host_routing_middleware,
        optional_auth_middleware, rate_limit_middleware, staff_middleware, RateLimitState,
    },
    utils::{AppError, AppResult},
    AppState,
};

mod auth;
mod chat;
mod dashboard;
mod entities;
mod events;
mod health;
mod reservations;
mod suites;
mod system_status;
mod uploads;
mod users;
mod venues;

pub use health::*;

/// Multipart framing on top of the configured file size
const UPLOAD_BODY_SLACK: usize = 64 * 1024;

/// Parse a path identifier, rejecting malformed ones with 400
pub(crate) fn parse_uuid(raw: &str, what: &str) -> AppResult<Uuid> {
    Uuid::parse_str(raw.trim()).map_err(|_| AppError::bad_request(format!("Invalid {} ID", what)))
}

/// Public routes (authentication optional)
pub fn public_routes() -> Router<AppState> {
    Router::new()
        .nest("/api", health::routes())
        .merge(events::public_routes())
        .merge(reservations::public_routes())
        .merge(chat::public_routes())
}

/// Public write routes; the caller decides whether to rate limit them
pub fn submission_routes() -> Router<AppState> {
    Router::new()
        .merge(auth::public_routes())
        .merge(reservations::submission_routes())
        .merge(chat::submission_routes())
}

/// Routes for any signed-in user
pub fn protected_routes() -> Router<AppState> {
    Router::new()
        .merge(auth::protected_routes())
        .merge(events::protected_routes())
}

/// Staff-only routes
pub fn staff_routes() -> Router<AppState> {
    let admin_api = Router::new()
        .merge(dashboard::routes())
        .merge(entities::routes())
        .merge(venues::routes())
        .merge(events::staff_routes())
        .merge(reservations::staff_routes())
        .merge(suites::routes())
        .merge(users::routes());

    Router::new()
        .merge(dashboard::index_routes())
        .nest("/admin/api", admin_api)
        .merge(system_status::routes())
}

/// Assemble the application router with its guards
///
/// `submission_limit` throttles the public write routes per client IP.
pub fn create_router(state: AppState, submission_limit: Option<RateLimitState>) -> Router {
    let body_limit = state.config.media.max_upload_bytes + UPLOAD_BODY_SLACK;

    let mut submissions =
        submission_routes().layer(from_fn_with_state(state.clone(), optional_auth_middleware));
    if let Some(limit) = submission_limit {
        submissions = submissions.layer(from_fn_with_state(limit, rate_limit_middleware));
    }

    Router::new()
        .merge(
            public_routes().layer(from_fn_with_state(state.clone(), optional_auth_middleware)),
        )
        .merge(submissions)
        .merge(
            protected_routes().layer(from_fn_with_state(state.clone(), auth_middleware)),
        )
        .merge(
            staff_routes()
                .layer(from_fn(staff_middleware))
                .layer(from_fn_with_state(state.clone(), auth_middleware)),
        )
        .layer(from_fn(api_cache_control_middleware))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(from_fn_with_state(state.clone(), host_routing_middleware))
        .with_state(state)
}
