//! Venue reservation endpoints
//!
//! Anyone may request a reservation; only approved, upcoming reservations are
//! visible publicly. Staff review requests through the dashboard routes.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Router,
};
use chrono::Utc;
use serde::Serialize;
use tracing::info;
use uuid::Uuid;

use super::parse_uuid;
use crate::{
    db::{ReservationRepository, VenueRepository},
    models::{
        ReservationForm, ReservationStatus, ReservationStatusUpdate, ReservationSummary,
        ReservationView,
    },
    utils::{AppError, AppResult, Json},
    AppState,
};

/// Public read routes
pub fn public_routes() -> Router<AppState> {
    Router::new()
        .route("/events/reservations/", get(list_reservations))
        .route("/events/reservations/{id}/", get(get_reservation))
}

/// Public request form
pub fn submission_routes() -> Router<AppState> {
    Router::new().route("/events/reservations/create/", post(create_reservation))
}

/// Staff review routes (mounted under `/admin/api`)
pub fn staff_routes() -> Router<AppState> {
    Router::new()
        .route("/reservations/", get(list_recent_reservations))
        .route("/reservations/{id}/", get(get_any_reservation))
        .route("/reservation/status/", post(update_reservation_status))
}

/// GET /events/reservations/
async fn list_reservations(State(state): State<AppState>) -> AppResult<Json<Vec<ReservationView>>> {
    let reservations = ReservationRepository::new(&state.db)
        .list_public(Utc::now())
        .await?;

    Ok(Json(
        reservations
            .into_iter()
            .map(|(reservation, venue)| ReservationView::new(reservation, venue))
            .collect(),
    ))
}

/// GET /events/reservations/{id}/
///
/// Pending, rejected, cancelled and past reservations are reported as 404.
async fn get_reservation(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<ReservationView>> {
    let not_found = || AppError::not_found("Reservation not found");
    let id = Uuid::parse_str(id.trim()).map_err(|_| not_found())?;

    let (reservation, venue) = ReservationRepository::new(&state.db)
        .get_public(id, Utc::now())
        .await?
        .ok_or_else(not_found)?;

    Ok(Json(ReservationView::new(reservation, venue)))
}

/// POST /events/reservations/create/
///
/// Fields arrive as free text and are parsed server side; nothing is stored
/// when any of them is invalid.
async fn create_reservation(
    State(state): State<AppState>,
    Json(form): Json<ReservationForm>,
) -> AppResult<(StatusCode, Json<ReservationView>)> {
    let new = form.parse().map_err(AppError::bad_request)?;

    let reservation = ReservationRepository::new(&state.db).create(&new).await?;
    info!(
        reservation_id = %reservation.id,
        organization = %reservation.organization,
        start = %reservation.start_datetime,
        "Reservation requested"
    );

    let venue = match reservation.venue_id {
        Some(venue_id) => VenueRepository::new(&state.db).name_of(venue_id).await?,
        None => None,
    };

    Ok((
        StatusCode::CREATED,
        Json(ReservationView::new(reservation, venue)),
    ))
}

/// GET /admin/api/reservations/
async fn list_recent_reservations(
    State(state): State<AppState>,
) -> AppResult<Json<Vec<ReservationSummary>>> {
    let limit = state.config.dashboard.recent_reservations;
    Ok(Json(
        ReservationRepository::new(&state.db)
            .list_recent(limit)
            .await?,
    ))
}

/// GET /admin/api/reservations/{id}/
async fn get_any_reservation(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<ReservationView>> {
    let id = parse_uuid(&id, "reservation")?;
    let (reservation, venue) = ReservationRepository::new(&state.db)
        .get_by_id(id)
        .await?
        .ok_or_else(|| AppError::not_found("Reservation not found"))?;

    Ok(Json(ReservationView::new(reservation, venue)))
}

#[derive(Debug, Serialize)]
pub struct StatusUpdateResponse {
    pub success: bool,
    pub status: ReservationStatus,
}

/// POST /admin/api/reservation/status/ `{reservation_id, status}`
///
/// Any known status may replace any other.
async fn update_reservation_status(
    State(state): State<AppState>,
    Json(payload): Json<ReservationStatusUpdate>,
) -> AppResult<Json<StatusUpdateResponse>> {
    let reservation_id = payload
        .reservation_id
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty());
    let status = payload
        .status
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty());

    let (Some(reservation_id), Some(status)) = (reservation_id, status) else {
        return Err(AppError::bad_request("Missing required fields"));
    };

    let status: ReservationStatus = status.parse().map_err(AppError::bad_request)?;

    let not_found = || AppError::not_found("Reservation not found");
    let id = Uuid::parse_str(reservation_id).map_err(|_| not_found())?;

    if !ReservationRepository::new(&state.db)
        .set_status(id, status)
        .await?
    {
        return Err(not_found());
    }

    info!(reservation_id = %id, status = %status, "Reservation status updated");
    Ok(Json(StatusUpdateResponse {
        success: true,
        status,
    }))
}
