//! User account management (staff only)

use axum::{extract::State, http::StatusCode, routing::get, Router};
use tracing::info;
use validator::Validate;

use crate::{
    db::UserRepository,
    middleware::AuthUser,
    models::{CreateUserRequest, UserPublic},
    services::AuthService,
    utils::{validation::validate_username, AppError, AppResult, Json},
    AppState,
};

pub fn routes() -> Router<AppState> {
    Router::new().route("/users/", get(list_users).post(create_user))
}

async fn list_users(State(state): State<AppState>) -> AppResult<Json<Vec<UserPublic>>> {
    let users = UserRepository::new(&state.db).list().await?;
    Ok(Json(users.into_iter().map(UserPublic::from).collect()))
}

async fn create_user(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Json(payload): Json<CreateUserRequest>,
) -> AppResult<(StatusCode, Json<UserPublic>)> {
    payload.validate()?;

    if !validate_username(&payload.username) {
        return Err(AppError::validation(
            "Username may only contain letters, digits and @.+-_",
        ));
    }

    let min_length = state.config.auth.password_min_length;
    if payload.password.chars().count() < min_length {
        return Err(AppError::validation(format!(
            "Password must be at least {} characters",
            min_length
        )));
    }

    let user = AuthService::new(&state.db)
        .create_user(
            &payload.username,
            payload.email.as_deref().unwrap_or_default(),
            &payload.password,
            payload.is_staff,
        )
        .await?;

    info!(
        created_by = %auth_user.username,
        username = %user.username,
        is_staff = user.is_staff,
        "User created"
    );

    Ok((StatusCode::CREATED, Json(user.into())))
}
