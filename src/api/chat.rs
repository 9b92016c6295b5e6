//! Chat proxy endpoints

use axum::{
    extract::State,
    routing::{get, post},
    Router,
};

use crate::{
    db::ChatRepository,
    middleware::AuthUser,
    models::{ChatHistory, ChatHistoryQuery, ChatRequest, ChatResponse},
    utils::{AppError, AppResult, Json, Query},
    AppState,
};

/// Message route (rate limited)
pub fn submission_routes() -> Router<AppState> {
    Router::new().route("/chat/api/", post(send_message))
}

pub fn public_routes() -> Router<AppState> {
    Router::new().route("/chat/history/", get(get_history))
}

/// POST /chat/api/ `{message, session_id?}`
///
/// Provider failures come back as a canned reply, never as an error status.
async fn send_message(
    State(state): State<AppState>,
    auth_user: Option<AuthUser>,
    Json(payload): Json<ChatRequest>,
) -> AppResult<Json<ChatResponse>> {
    let message = payload
        .message
        .as_deref()
        .map(str::trim)
        .filter(|m| !m.is_empty())
        .ok_or_else(|| AppError::bad_request("Message cannot be empty"))?;

    let response = state
        .chat
        .send(
            &state.db,
            payload.session_id.as_deref(),
            auth_user.map(|u| u.id),
            message,
        )
        .await?;

    Ok(Json(response))
}

/// GET /chat/history/?session_id=
async fn get_history(
    State(state): State<AppState>,
    Query(query): Query<ChatHistoryQuery>,
) -> AppResult<Json<ChatHistory>> {
    let session_key = query
        .session_id
        .as_deref()
        .map(str::trim)
        .filter(|k| !k.is_empty())
        .ok_or_else(|| AppError::bad_request("session_id is required"))?;

    let repo = ChatRepository::new(&state.db);
    let messages = match repo.find_session(session_key).await? {
        Some(session) => repo.messages(session.id).await?,
        None => Vec::new(),
    };

    Ok(Json(ChatHistory {
        session_id: Some(session_key.to_string()),
        messages,
    }))
}
