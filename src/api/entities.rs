//! Entity pool endpoints: individuals and organizations (staff only)

use axum::{
    extract::{Multipart, Path, State},
    http::StatusCode,
    routing::{get, post},
    Router,
};
use tracing::info;
use validator::Validate;

use super::{parse_uuid, uploads::read_upload};
use crate::{
    db::{IndividualRepository, OrganizationRepository},
    models::{
        EntitiesOverview, Individual, IndividualRequest, IndividualSummary, Organization,
        OrganizationRequest, OrganizationSummary, UploadPrefix,
    },
    utils::{AppError, AppResult, Json},
    AppState,
};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/entities/", get(entities_overview))
        .route(
            "/individuals/",
            get(list_individuals).post(create_individual),
        )
        .route(
            "/individuals/{id}/",
            get(get_individual)
                .put(update_individual)
                .delete(delete_individual),
        )
        .route("/individuals/{id}/photo/", post(upload_individual_photo))
        .route(
            "/organizations/",
            get(list_organizations).post(create_organization),
        )
        .route(
            "/organizations/{id}/",
            get(get_organization)
                .put(update_organization)
                .delete(delete_organization),
        )
        .route("/organizations/{id}/logo/", post(upload_organization_logo))
}

/// GET /admin/api/entities/
///
/// Most recent individuals and organizations, newest first.
async fn entities_overview(State(state): State<AppState>) -> AppResult<Json<EntitiesOverview>> {
    let limit = Some(state.config.dashboard.recent_entities);
    let individuals = IndividualRepository::new(&state.db).list(limit).await?;
    let organizations = OrganizationRepository::new(&state.db).list(limit).await?;

    Ok(Json(EntitiesOverview {
        individuals: individuals.iter().map(IndividualSummary::from).collect(),
        organizations: organizations.iter().map(OrganizationSummary::from).collect(),
    }))
}

async fn list_individuals(State(state): State<AppState>) -> AppResult<Json<Vec<Individual>>> {
    Ok(Json(IndividualRepository::new(&state.db).list(None).await?))
}

async fn get_individual(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<Individual>> {
    let id = parse_uuid(&id, "individual")?;
    IndividualRepository::new(&state.db)
        .get_by_id(id)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::not_found("Individual not found"))
}

async fn create_individual(
    State(state): State<AppState>,
    Json(payload): Json<IndividualRequest>,
) -> AppResult<(StatusCode, Json<Individual>)> {
    payload.validate()?;
    let individual = IndividualRepository::new(&state.db).create(&payload).await?;
    info!(individual_id = %individual.id, "Individual created");
    Ok((StatusCode::CREATED, Json(individual)))
}

async fn update_individual(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(payload): Json<IndividualRequest>,
) -> AppResult<Json<Individual>> {
    let id = parse_uuid(&id, "individual")?;
    payload.validate()?;
    IndividualRepository::new(&state.db)
        .update(id, &payload)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::not_found("Individual not found"))
}

async fn delete_individual(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<StatusCode> {
    let id = parse_uuid(&id, "individual")?;
    let repo = IndividualRepository::new(&state.db);
    let individual = repo
        .get_by_id(id)
        .await?
        .ok_or_else(|| AppError::not_found("Individual not found"))?;

    repo.delete(id).await?;
    if let Some(photo) = individual.photo {
        state.media.remove(&photo).await;
    }
    info!(individual_id = %id, "Individual deleted");
    Ok(StatusCode::NO_CONTENT)
}

/// POST /admin/api/individuals/{id}/photo/
async fn upload_individual_photo(
    State(state): State<AppState>,
    Path(id): Path<String>,
    mut multipart: Multipart,
) -> AppResult<Json<Individual>> {
    let id = parse_uuid(&id, "individual")?;
    let repo = IndividualRepository::new(&state.db);
    if repo.get_by_id(id).await?.is_none() {
        return Err(AppError::not_found("Individual not found"));
    }

    let upload = read_upload(&mut multipart, state.media.max_upload_bytes()).await?;
    let path = state
        .media
        .store(UploadPrefix::IndividualPhotos, &upload.file_name, &upload.bytes)
        .await?;

    match repo.set_photo(id, &path).await? {
        Some(previous) => {
            if let Some(previous) = previous {
                state.media.remove(&previous).await;
            }
        }
        None => {
            state.media.remove(&path).await;
            return Err(AppError::not_found("Individual not found"));
        }
    }

    repo.get_by_id(id)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::not_found("Individual not found"))
}

async fn list_organizations(State(state): State<AppState>) -> AppResult<Json<Vec<Organization>>> {
    Ok(Json(OrganizationRepository::new(&state.db).list(None).await?))
}

async fn get_organization(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<Organization>> {
    let id = parse_uuid(&id, "organization")?;
    OrganizationRepository::new(&state.db)
        .get_by_id(id)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::not_found("Organization not found"))
}

async fn create_organization(
    State(state): State<AppState>,
    Json(payload): Json<OrganizationRequest>,
) -> AppResult<(StatusCode, Json<Organization>)> {
    payload.validate()?;
    let org = OrganizationRepository::new(&state.db).create(&payload).await?;
    info!(organization_id = %org.id, name = %org.name, "Organization created");
    Ok((StatusCode::CREATED, Json(org)))
}

async fn update_organization(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(payload): Json<OrganizationRequest>,
) -> AppResult<Json<Organization>> {
    let id = parse_uuid(&id, "organization")?;
    payload.validate()?;
    OrganizationRepository::new(&state.db)
        .update(id, &payload)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::not_found("Organization not found"))
}

async fn delete_organization(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<StatusCode> {
    let id = parse_uuid(&id, "organization")?;
    let repo = OrganizationRepository::new(&state.db);
    let org = repo
        .get_by_id(id)
        .await?
        .ok_or_else(|| AppError::not_found("Organization not found"))?;

    repo.delete(id).await?;
    if let Some(logo) = org.logo {
        state.media.remove(&logo).await;
    }
    info!(organization_id = %id, "Organization deleted");
    Ok(StatusCode::NO_CONTENT)
}

/// POST /admin/api/organizations/{id}/logo/
async fn upload_organization_logo(
    State(state): State<AppState>,
    Path(id): Path<String>,
    mut multipart: Multipart,
) -> AppResult<Json<Organization>> {
    let id = parse_uuid(&id, "organization")?;
    let repo = OrganizationRepository::new(&state.db);
    if repo.get_by_id(id).await?.is_none() {
        return Err(AppError::not_found("Organization not found"));
    }

    let upload = read_upload(&mut multipart, state.media.max_upload_bytes()).await?;
    let path = state
        .media
        .store(UploadPrefix::OrganizationLogos, &upload.file_name, &upload.bytes)
        .await?;

    match repo.set_logo(id, &path).await? {
        Some(previous) => {
            if let Some(previous) = previous {
                state.media.remove(&previous).await;
            }
        }
        None => {
            state.media.remove(&path).await;
            return Err(AppError::not_found("Organization not found"));
        }
    }

    repo.get_by_id(id)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::not_found("Organization not found"))
}
