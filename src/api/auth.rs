//! Authentication API endpoints

use axum::{
    extract::State,
    routing::{get, post},
    Router,
};
use tracing::{info, warn};

use crate::{
    db::UserRepository,
    middleware::auth::{create_access_token, AuthUser},
    models::{LoginRequest, LoginResponse, UserPublic},
    services::AuthService,
    utils::{AppError, AppResult, Json},
    AppState,
};

/// Routes that issue tokens (no auth required)
pub fn public_routes() -> Router<AppState> {
    Router::new().route("/auth/login/", post(login))
}

/// Routes for the signed-in caller
pub fn protected_routes() -> Router<AppState> {
    Router::new().route("/auth/me/", get(get_current_user))
}

/// POST /auth/login/
async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> AppResult<Json<LoginResponse>> {
    if payload.username.trim().is_empty() || payload.password.is_empty() {
        return Err(AppError::bad_request("Username and password are required"));
    }

    let user = AuthService::new(&state.db)
        .authenticate(payload.username.trim(), &payload.password)
        .await?
        .ok_or_else(|| {
            warn!(username = %payload.username, "Failed login attempt");
            AppError::unauthorized("Invalid username or password")
        })?;

    let access_token = create_access_token(
        &user,
        &state.config.auth.jwt_secret,
        state.config.auth.token_expiry_hours,
    )
    .map_err(|e| AppError::internal(format!("Failed to create access token: {}", e)))?;

    info!(username = %user.username, "User logged in");

    Ok(Json(LoginResponse {
        access_token,
        token_type: "Bearer".to_string(),
        expires_in: state.config.auth.token_expiry_hours * 3600,
        user: user.into(),
    }))
}

/// GET /auth/me/
async fn get_current_user(
    State(state): State<AppState>,
    auth_user: AuthUser,
) -> AppResult<Json<UserPublic>> {
    let user = UserRepository::new(&state.db)
        .get_by_id(auth_user.id)
        .await?
        .ok_or_else(|| AppError::not_found("User not found"))?;

    Ok(Json(user.into()))
}
