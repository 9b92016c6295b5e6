//! JWT authentication middleware
//!
//! Tokens are issued by `POST /auth/login/` and carried as
//! `Authorization: Bearer <token>`. Staff-only routes additionally pass
//! through [`staff_middleware`].

use std::convert::Infallible;

use axum::{
    extract::{FromRequestParts, OptionalFromRequestParts, Request, State},
    http::{header::AUTHORIZATION, request::Parts, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, TokenData, Validation};
use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

use crate::{models::User, utils::error::ErrorResponse, AppState};

/// JWT claims
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (user ID)
    pub sub: String,
    pub username: String,
    #[serde(default)]
    pub is_staff: bool,
    /// Issued at timestamp
    pub iat: i64,
    /// Expiration timestamp
    pub exp: i64,
    /// Not before timestamp
    pub nbf: i64,
    /// JWT ID
    pub jti: String,
}

/// Authenticated user extracted from a validated token
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthUser {
    pub id: Uuid,
    pub username: String,
    pub is_staff: bool,
}

impl TryFrom<Claims> for AuthUser {
    type Error = &'static str;

    fn try_from(claims: Claims) -> Result<Self, Self::Error> {
        let id = Uuid::parse_str(&claims.sub).map_err(|_| "Invalid user ID in token")?;
        Ok(Self {
            id,
            username: claims.username,
            is_staff: claims.is_staff,
        })
    }
}

/// Handler parameter for routes behind [`auth_middleware`]
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = (StatusCode, Json<ErrorResponse>);

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts.extensions.get::<AuthUser>().cloned().ok_or_else(|| {
            (
                StatusCode::UNAUTHORIZED,
                Json(ErrorResponse::new("Authentication required")),
            )
        })
    }
}

/// `Option<AuthUser>` for routes behind [`optional_auth_middleware`]
impl<S> OptionalFromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        _state: &S,
    ) -> Result<Option<Self>, Self::Rejection> {
        Ok(parts.extensions.get::<AuthUser>().cloned())
    }
}

/// Create a new JWT access token for `user`
pub fn create_access_token(
    user: &User,
    secret: &str,
    expiry_hours: u64,
) -> Result<String, jsonwebtoken::errors::Error> {
    let now = Utc::now();
    let exp = now + Duration::hours(expiry_hours as i64);

    let claims = Claims {
        sub: user.id.to_string(),
        username: user.username.clone(),
        is_staff: user.is_staff,
        iat: now.timestamp(),
        exp: exp.timestamp(),
        nbf: now.timestamp(),
        jti: Uuid::new_v4().to_string(),
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
}

/// Validate and decode a JWT token
pub fn validate_token(token: &str, secret: &str) -> Result<TokenData<Claims>, AuthError> {
    let mut validation = Validation::default();
    validation.validate_exp = true;
    validation.validate_nbf = true;

    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &validation,
    )
    .map_err(|e| match e.kind() {
        jsonwebtoken::errors::ErrorKind::ExpiredSignature => AuthError::TokenExpired,
        _ => AuthError::InvalidToken,
    })
}

/// Authentication error types
#[derive(Debug, PartialEq, Eq)]
pub enum AuthError {
    MissingToken,
    InvalidToken,
    TokenExpired,
    StaffRequired,
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AuthError::MissingToken => (StatusCode::UNAUTHORIZED, "Missing authentication token"),
            AuthError::InvalidToken => (StatusCode::UNAUTHORIZED, "Invalid authentication token"),
            AuthError::TokenExpired => {
                (StatusCode::UNAUTHORIZED, "Authentication token has expired")
            }
            AuthError::StaffRequired => (StatusCode::FORBIDDEN, "Staff access required"),
        };

        (status, Json(ErrorResponse::new(message))).into_response()
    }
}

fn extract_bearer_token(auth_header: &str) -> Option<&str> {
    auth_header
        .strip_prefix("Bearer ")
        .or_else(|| auth_header.strip_prefix("bearer "))
}

fn user_from_request(request: &Request, secret: &str) -> Result<AuthUser, AuthError> {
    let auth_header = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .ok_or(AuthError::MissingToken)?;

    let token = extract_bearer_token(auth_header).ok_or(AuthError::InvalidToken)?;
    let token_data = validate_token(token, secret)?;
    AuthUser::try_from(token_data.claims).map_err(|_| AuthError::InvalidToken)
}

/// Authentication middleware
///
/// Validates the bearer token and injects [`AuthUser`] into request extensions.
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AuthError> {
    let auth_user = user_from_request(&request, &state.config.auth.jwt_secret)?;
    request.extensions_mut().insert(auth_user);
    Ok(next.run(request).await)
}

/// Optional authentication middleware
///
/// Like [`auth_middleware`] but lets anonymous requests through. Used where
/// the response is personalised for signed-in callers.
pub async fn optional_auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    match user_from_request(&request, &state.config.auth.jwt_secret) {
        Ok(auth_user) => {
            request.extensions_mut().insert(auth_user);
        }
        Err(AuthError::MissingToken) => {}
        Err(e) => debug!(error = ?e, "Ignoring invalid token on public route"),
    }
    next.run(request).await
}

/// Staff gate; must run after [`auth_middleware`]
pub async fn staff_middleware(request: Request, next: Next) -> Result<Response, AuthError> {
    match request.extensions().get::<AuthUser>() {
        Some(user) if user.is_staff => Ok(next.run(request).await),
        Some(_) => Err(AuthError::StaffRequired),
        None => Err(AuthError::MissingToken),
    }
}
