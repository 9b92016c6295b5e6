//! Venue management endpoints (staff only)

use axum::{
    extract::{Multipart, Path, State},
    http::StatusCode,
    routing::{delete, get},
    Router,
};
use tracing::info;
use validator::Validate;

use super::{parse_uuid, uploads};
use crate::{
    db::{PhotoRepository, VenueRepository},
    models::{Photo, PhotoOwner, Venue, VenueDetail, VenueRequest, VenueSummary},
    utils::{AppError, AppResult, Json},
    AppState,
};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/venues/", get(list_venues).post(create_venue))
        .route(
            "/venues/{id}/",
            get(get_venue).put(update_venue).delete(delete_venue),
        )
        .route("/venues/{id}/photos/", get(list_photos).post(upload_photo))
        .route("/venues/{id}/photos/{photo_id}/", delete(delete_photo))
}

/// GET /admin/api/venues/
///
/// Every venue with its responsible person and photo/reservation counts.
async fn list_venues(State(state): State<AppState>) -> AppResult<Json<Vec<VenueSummary>>> {
    Ok(Json(VenueRepository::new(&state.db).list_summaries().await?))
}

async fn get_venue(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<VenueDetail>> {
    let id = parse_uuid(&id, "venue")?;
    let venue = VenueRepository::new(&state.db)
        .get_by_id(id)
        .await?
        .ok_or_else(|| AppError::not_found("Venue not found"))?;
    let photos = PhotoRepository::new(&state.db, PhotoOwner::Venue)
        .list(id)
        .await?;

    Ok(Json(VenueDetail { venue, photos }))
}

async fn create_venue(
    State(state): State<AppState>,
    Json(payload): Json<VenueRequest>,
) -> AppResult<(StatusCode, Json<Venue>)> {
    payload.validate()?;
    let venue = VenueRepository::new(&state.db).create(&payload).await?;
    info!(venue_id = %venue.id, name = %venue.name, "Venue created");
    Ok((StatusCode::CREATED, Json(venue)))
}

async fn update_venue(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(payload): Json<VenueRequest>,
) -> AppResult<Json<Venue>> {
    let id = parse_uuid(&id, "venue")?;
    payload.validate()?;
    VenueRepository::new(&state.db)
        .update(id, &payload)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::not_found("Venue not found"))
}

async fn delete_venue(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<StatusCode> {
    let id = parse_uuid(&id, "venue")?;
    let photos = PhotoRepository::new(&state.db, PhotoOwner::Venue)
        .list(id)
        .await?;

    if !VenueRepository::new(&state.db).delete(id).await? {
        return Err(AppError::not_found("Venue not found"));
    }

    for photo in photos {
        state.media.remove(&photo.path).await;
    }
    info!(venue_id = %id, "Venue deleted");
    Ok(StatusCode::NO_CONTENT)
}

async fn list_photos(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<Vec<Photo>>> {
    let id = parse_uuid(&id, "venue")?;
    Ok(Json(
        PhotoRepository::new(&state.db, PhotoOwner::Venue)
            .list(id)
            .await?,
    ))
}

/// POST /admin/api/venues/{id}/photos/ (at most six per venue)
async fn upload_photo(
    State(state): State<AppState>,
    Path(id): Path<String>,
    multipart: Multipart,
) -> AppResult<(StatusCode, Json<Photo>)> {
    let id = parse_uuid(&id, "venue")?;
    uploads::add_photo(&state, PhotoOwner::Venue, id, multipart).await
}

async fn delete_photo(
    State(state): State<AppState>,
    Path((id, photo_id)): Path<(String, String)>,
) -> AppResult<StatusCode> {
    let id = parse_uuid(&id, "venue")?;
    let photo_id = parse_uuid(&photo_id, "photo")?;
    uploads::remove_photo(&state, PhotoOwner::Venue, id, photo_id).await
}
