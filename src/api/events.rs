//! Event endpoints
//!
//! Public listing and detail, self-registration for signed-in users, the
//! JSON booking API and the staff event management routes.

use axum::{
    extract::{Multipart, Path, State},
    http::StatusCode,
    routing::{delete, get, post},
    Router,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;
use validator::Validate;

use super::{parse_uuid, uploads};
use crate::{
    db::{
        EventClassRepository, EventRepository, PhotoRepository, RegistrationOutcome,
        VenueRepository,
    },
    middleware::AuthUser,
    models::{
        CreateEventApiRequest, CrowdSize, Event, EventClass, EventClassDetail,
        EventClassRequest, EventDetail, EventRegistration, EventRequest, EventStatus,
        EventStatusUpdate, EventSummary, MyEventEntry, Photo, PhotoOwner, RegisterRequest,
        VenueOption,
    },
    utils::{time::parse_datetime_input, AppError, AppResult, Json, Query},
    AppState,
};

/// Routes open to anonymous callers
pub fn public_routes() -> Router<AppState> {
    Router::new()
        .route("/events/", get(list_events))
        .route("/events/{id}/", get(get_event))
        .route("/events/api/event-classes/", get(list_event_classes))
        .route("/events/api/venues/", get(list_venue_options))
}

/// Routes for signed-in users
pub fn protected_routes() -> Router<AppState> {
    Router::new()
        .route("/events/{id}/register/", post(register))
        .route("/events/{id}/unregister/", post(unregister))
        .route("/events/my-events/", get(my_events))
        .route("/events/api/create-event/", post(create_event_api))
}

/// Staff event management (mounted under `/admin/api`)
pub fn staff_routes() -> Router<AppState> {
    Router::new()
        .route("/events/", get(list_recent_events).post(create_event))
        .route(
            "/events/{id}/",
            get(get_event).put(update_event).delete(delete_event),
        )
        .route("/event/status/", post(update_event_status))
        .route(
            "/event-classes/",
            get(list_all_event_classes).post(create_event_class),
        )
        .route(
            "/event-classes/{id}/",
            get(get_event_class)
                .put(update_event_class)
                .delete(delete_event_class),
        )
        .route(
            "/event-classes/{id}/photos/",
            get(list_event_class_photos).post(upload_event_class_photo),
        )
        .route(
            "/event-classes/{id}/photos/{photo_id}/",
            delete(delete_event_class_photo),
        )
}

#[derive(Debug, Deserialize)]
pub struct EventListQuery {
    #[serde(default)]
    pub search: Option<String>,
}

/// GET /events/?search=
///
/// Upcoming approved, active events, soonest first.
async fn list_events(
    State(state): State<AppState>,
    Query(query): Query<EventListQuery>,
) -> AppResult<Json<Vec<EventSummary>>> {
    let events = EventRepository::new(&state.db)
        .list_upcoming(Utc::now(), query.search.as_deref())
        .await?;
    Ok(Json(events))
}

/// GET /events/{id}/
///
/// Personalised with `user_registered` when the caller is signed in.
async fn get_event(
    State(state): State<AppState>,
    auth_user: Option<AuthUser>,
    Path(id): Path<String>,
) -> AppResult<Json<EventDetail>> {
    let id = parse_uuid(&id, "event")?;
    let repo = EventRepository::new(&state.db);
    let event = repo
        .get_by_id(id)
        .await?
        .ok_or_else(|| AppError::not_found("Event not found"))?;

    let registration_count = repo.registration_count(id).await?;
    let user_registered = match auth_user {
        Some(user) => repo.is_registered(id, user.id).await?,
        None => false,
    };
    let (venue_name, event_class_name) = repo.related_names(&event).await?;

    let spots_remaining = event
        .max_participants
        .map(|max| (max - registration_count).max(0));
    let can_register = event.can_register(Utc::now());

    Ok(Json(EventDetail {
        event,
        venue_name,
        event_class_name,
        registration_count,
        spots_remaining,
        can_register,
        user_registered,
    }))
}

/// POST /events/{id}/register/
async fn register(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<String>,
    payload: Option<Json<RegisterRequest>>,
) -> AppResult<(StatusCode, Json<EventRegistration>)> {
    let id = parse_uuid(&id, "event")?;
    let repo = EventRepository::new(&state.db);
    let event = repo
        .get_by_id(id)
        .await?
        .ok_or_else(|| AppError::not_found("Event not found"))?;

    if !event.can_register(Utc::now()) {
        return Err(AppError::bad_request(
            "Registration is not open for this event",
        ));
    }

    let notes = payload.map(|Json(p)| p.notes).unwrap_or_default();
    match repo.register(id, auth_user.id, notes.trim()).await? {
        RegistrationOutcome::Registered(registration) => {
            info!(event_id = %id, user = %auth_user.username, "Registered for event");
            Ok((StatusCode::CREATED, Json(registration)))
        }
        RegistrationOutcome::AlreadyRegistered => Err(AppError::conflict(
            "You are already registered for this event",
        )),
        RegistrationOutcome::Full => Err(AppError::bad_request("This event is full")),
    }
}

/// POST /events/{id}/unregister/
async fn unregister(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<String>,
) -> AppResult<StatusCode> {
    let id = parse_uuid(&id, "event")?;
    if EventRepository::new(&state.db)
        .unregister(id, auth_user.id)
        .await?
    {
        info!(event_id = %id, user = %auth_user.username, "Unregistered from event");
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::not_found(
            "You are not registered for this event",
        ))
    }
}

/// GET /events/my-events/
async fn my_events(
    State(state): State<AppState>,
    auth_user: AuthUser,
) -> AppResult<Json<Vec<MyEventEntry>>> {
    Ok(Json(
        EventRepository::new(&state.db)
            .list_for_user(auth_user.id)
            .await?,
    ))
}

/// GET /events/api/event-classes/
async fn list_event_classes(State(state): State<AppState>) -> AppResult<Json<Vec<EventClass>>> {
    Ok(Json(EventClassRepository::new(&state.db).list(true).await?))
}

/// GET /events/api/venues/
async fn list_venue_options(State(state): State<AppState>) -> AppResult<Json<Vec<VenueOption>>> {
    Ok(Json(VenueRepository::new(&state.db).list_options().await?))
}

#[derive(Debug, Serialize)]
pub struct CreateEventApiResponse {
    pub success: bool,
    pub event_id: Uuid,
    pub message: String,
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

/// POST /events/api/create-event/
///
/// The caller becomes the organizer; the event waits for staff approval.
async fn create_event_api(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Json(payload): Json<CreateEventApiRequest>,
) -> AppResult<(StatusCode, Json<CreateEventApiResponse>)> {
    let (Some(title), Some(event_type), Some(start)) = (
        non_empty(&payload.title),
        non_empty(&payload.event_type),
        non_empty(&payload.datetime_start),
    ) else {
        return Err(AppError::bad_request(
            "Missing required fields: title, eventType, datetimeStart",
        ));
    };

    let date = parse_datetime_input(start)
        .ok_or_else(|| AppError::bad_request(format!("Invalid datetimeStart: {}", start)))?;

    let event_class = EventClassRepository::new(&state.db)
        .resolve(event_type)
        .await?
        .ok_or_else(|| AppError::bad_request(format!("Unknown event type: {}", event_type)))?;

    let (min, max) = CrowdSize::from_label(non_empty(&payload.crowd_size).unwrap_or("")).bounds();

    let request = EventRequest {
        title: title.to_string(),
        description: String::new(),
        date,
        venue_id: None,
        event_class_id: Some(event_class.id),
        location: non_empty(&payload.area).unwrap_or_default().to_string(),
        min_participants: Some(min),
        max_participants: Some(max),
        registration_deadline: None,
        is_active: true,
        special_requests: non_empty(&payload.special_requests)
            .unwrap_or_default()
            .to_string(),
        status: EventStatus::Pending,
    };
    request.validate()?;

    let event = EventRepository::new(&state.db)
        .create(&request, Some(auth_user.id))
        .await?;

    info!(
        event_id = %event.id,
        organizer = %auth_user.username,
        event_class = %event_class.name,
        "Event created via API"
    );

    Ok((
        StatusCode::CREATED,
        Json(CreateEventApiResponse {
            success: true,
            event_id: event.id,
            message: "Event created successfully".to_string(),
        }),
    ))
}

async fn list_recent_events(State(state): State<AppState>) -> AppResult<Json<Vec<EventSummary>>> {
    let limit = state.config.dashboard.recent_reservations;
    Ok(Json(EventRepository::new(&state.db).list_recent(limit).await?))
}

/// POST /admin/api/events/
async fn create_event(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Json(payload): Json<EventRequest>,
) -> AppResult<(StatusCode, Json<Event>)> {
    payload.validate()?;
    payload.check_bounds().map_err(AppError::validation)?;

    let event = EventRepository::new(&state.db)
        .create(&payload, Some(auth_user.id))
        .await?;
    info!(event_id = %event.id, title = %event.title, "Event created");
    Ok((StatusCode::CREATED, Json(event)))
}

async fn update_event(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(payload): Json<EventRequest>,
) -> AppResult<Json<Event>> {
    let id = parse_uuid(&id, "event")?;
    payload.validate()?;
    payload.check_bounds().map_err(AppError::validation)?;

    EventRepository::new(&state.db)
        .update(id, &payload)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::not_found("Event not found"))
}

async fn delete_event(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<StatusCode> {
    let id = parse_uuid(&id, "event")?;
    if EventRepository::new(&state.db).delete(id).await? {
        info!(event_id = %id, "Event deleted");
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::not_found("Event not found"))
    }
}

#[derive(Debug, Serialize)]
pub struct StatusUpdateResponse {
    pub success: bool,
    pub status: String,
}

/// POST /admin/api/event/status/ `{event_id, status}`
async fn update_event_status(
    State(state): State<AppState>,
    Json(payload): Json<EventStatusUpdate>,
) -> AppResult<Json<StatusUpdateResponse>> {
    let (Some(event_id), Some(status)) = (payload.event_id, payload.status.as_deref()) else {
        return Err(AppError::bad_request("Missing required fields"));
    };
    let status: EventStatus = status.trim().parse().map_err(AppError::bad_request)?;

    if !EventRepository::new(&state.db)
        .set_status(event_id, status)
        .await?
    {
        return Err(AppError::not_found("Event not found"));
    }

    info!(event_id = %event_id, status = %status, "Event status updated");
    Ok(Json(StatusUpdateResponse {
        success: true,
        status: status.to_string(),
    }))
}

/// GET /admin/api/event-classes/ (inactive classes included)
async fn list_all_event_classes(
    State(state): State<AppState>,
) -> AppResult<Json<Vec<EventClass>>> {
    Ok(Json(EventClassRepository::new(&state.db).list(false).await?))
}

async fn get_event_class(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<EventClassDetail>> {
    let id = parse_uuid(&id, "event class")?;
    let event_class = EventClassRepository::new(&state.db)
        .get_by_id(id)
        .await?
        .ok_or_else(|| AppError::not_found("Event class not found"))?;
    let photos = PhotoRepository::new(&state.db, PhotoOwner::EventClass)
        .list(id)
        .await?;

    Ok(Json(EventClassDetail {
        event_class,
        photos,
    }))
}

async fn create_event_class(
    State(state): State<AppState>,
    Json(payload): Json<EventClassRequest>,
) -> AppResult<(StatusCode, Json<EventClass>)> {
    payload.validate()?;
    let event_class = EventClassRepository::new(&state.db)
        .create(&payload)
        .await?;
    info!(event_class_id = %event_class.id, name = %event_class.name, "Event class created");
    Ok((StatusCode::CREATED, Json(event_class)))
}

async fn update_event_class(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(payload): Json<EventClassRequest>,
) -> AppResult<Json<EventClass>> {
    let id = parse_uuid(&id, "event class")?;
    payload.validate()?;
    EventClassRepository::new(&state.db)
        .update(id, &payload)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::not_found("Event class not found"))
}

/// DELETE /admin/api/event-classes/{id}/
///
/// Events of the class keep existing without a class.
async fn delete_event_class(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<StatusCode> {
    let id = parse_uuid(&id, "event class")?;
    let photos = PhotoRepository::new(&state.db, PhotoOwner::EventClass)
        .list(id)
        .await?;

    if !EventClassRepository::new(&state.db).delete(id).await? {
        return Err(AppError::not_found("Event class not found"));
    }

    for photo in photos {
        state.media.remove(&photo.path).await;
    }
    info!(event_class_id = %id, "Event class deleted");
    Ok(StatusCode::NO_CONTENT)
}

async fn list_event_class_photos(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<Vec<Photo>>> {
    let id = parse_uuid(&id, "event class")?;
    Ok(Json(
        PhotoRepository::new(&state.db, PhotoOwner::EventClass)
            .list(id)
            .await?,
    ))
}

/// POST /admin/api/event-classes/{id}/photos/ (at most two per class)
async fn upload_event_class_photo(
    State(state): State<AppState>,
    Path(id): Path<String>,
    multipart: Multipart,
) -> AppResult<(StatusCode, Json<Photo>)> {
    let id = parse_uuid(&id, "event class")?;
    uploads::add_photo(&state, PhotoOwner::EventClass, id, multipart).await
}

async fn delete_event_class_photo(
    State(state): State<AppState>,
    Path((id, photo_id)): Path<(String, String)>,
) -> AppResult<StatusCode> {
    let id = parse_uuid(&id, "event class")?;
    let photo_id = parse_uuid(&photo_id, "photo")?;
    uploads::remove_photo(&state, PhotoOwner::EventClass, id, photo_id).await
}
