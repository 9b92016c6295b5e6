//! Suite, operating model and contract endpoints (staff only)

use axum::{
    extract::{Multipart, Path, State},
    http::StatusCode,
    routing::{delete, get, post},
    Router,
};
use chrono::Utc;
use tracing::info;
use validator::Validate;

use super::{parse_uuid, uploads};
use crate::{
    db::{ContractRepository, OperatingModelRepository, PhotoRepository, SuiteRepository},
    models::{
        ContractRequest, ContractSummary, OperatingModelRequest, Photo, PhotoOwner, Suite,
        SuiteContract, SuiteDetail, SuiteOperatingModel, SuiteRequest, SuiteSummary,
        UploadPrefix,
    },
    utils::{AppError, AppResult, Json},
    AppState,
};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/suites/", get(list_suites).post(create_suite))
        .route(
            "/suites/{id}/",
            get(get_suite).put(update_suite).delete(delete_suite),
        )
        .route("/suites/{id}/photos/", get(list_photos).post(upload_photo))
        .route("/suites/{id}/photos/{photo_id}/", delete(delete_photo))
        .route("/suites/{id}/floor-plan/", post(upload_floor_plan))
        .route(
            "/operating-models/",
            get(list_models).post(create_model),
        )
        .route(
            "/operating-models/{id}/",
            get(get_model).put(update_model).delete(delete_model),
        )
        .route("/contracts/", get(list_contracts).post(create_contract))
        .route(
            "/contracts/{id}/",
            get(get_contract).put(update_contract).delete(delete_contract),
        )
}

/// GET /admin/api/suites/
async fn list_suites(State(state): State<AppState>) -> AppResult<Json<Vec<SuiteSummary>>> {
    Ok(Json(SuiteRepository::new(&state.db).list_summaries().await?))
}

async fn get_suite(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<SuiteDetail>> {
    let id = parse_uuid(&id, "suite")?;
    let suite = SuiteRepository::new(&state.db)
        .get_by_id(id)
        .await?
        .ok_or_else(|| AppError::not_found("Suite not found"))?;
    let photos = PhotoRepository::new(&state.db, PhotoOwner::Suite)
        .list(id)
        .await?;

    Ok(Json(SuiteDetail { suite, photos }))
}

async fn create_suite(
    State(state): State<AppState>,
    Json(payload): Json<SuiteRequest>,
) -> AppResult<(StatusCode, Json<Suite>)> {
    payload.validate()?;
    let suite = SuiteRepository::new(&state.db).create(&payload).await?;
    info!(suite_id = %suite.id, suite_number = %suite.suite_number, "Suite created");
    Ok((StatusCode::CREATED, Json(suite)))
}

async fn update_suite(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(payload): Json<SuiteRequest>,
) -> AppResult<Json<Suite>> {
    let id = parse_uuid(&id, "suite")?;
    payload.validate()?;
    SuiteRepository::new(&state.db)
        .update(id, &payload)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::not_found("Suite not found"))
}

/// DELETE /admin/api/suites/{id}/
///
/// Contracts and photos go with the suite.
async fn delete_suite(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<StatusCode> {
    let id = parse_uuid(&id, "suite")?;
    let repo = SuiteRepository::new(&state.db);
    let suite = repo
        .get_by_id(id)
        .await?
        .ok_or_else(|| AppError::not_found("Suite not found"))?;
    let photos = PhotoRepository::new(&state.db, PhotoOwner::Suite)
        .list(id)
        .await?;

    repo.delete(id).await?;

    for photo in photos {
        state.media.remove(&photo.path).await;
    }
    if let Some(floor_plan) = suite.floor_plan {
        state.media.remove(&floor_plan).await;
    }
    info!(suite_id = %id, "Suite deleted");
    Ok(StatusCode::NO_CONTENT)
}

async fn list_photos(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<Vec<Photo>>> {
    let id = parse_uuid(&id, "suite")?;
    Ok(Json(
        PhotoRepository::new(&state.db, PhotoOwner::Suite)
            .list(id)
            .await?,
    ))
}

/// POST /admin/api/suites/{id}/photos/
async fn upload_photo(
    State(state): State<AppState>,
    Path(id): Path<String>,
    multipart: Multipart,
) -> AppResult<(StatusCode, Json<Photo>)> {
    let id = parse_uuid(&id, "suite")?;
    uploads::add_photo(&state, PhotoOwner::Suite, id, multipart).await
}

async fn delete_photo(
    State(state): State<AppState>,
    Path((id, photo_id)): Path<(String, String)>,
) -> AppResult<StatusCode> {
    let id = parse_uuid(&id, "suite")?;
    let photo_id = parse_uuid(&photo_id, "photo")?;
    uploads::remove_photo(&state, PhotoOwner::Suite, id, photo_id).await
}

/// POST /admin/api/suites/{id}/floor-plan/
async fn upload_floor_plan(
    State(state): State<AppState>,
    Path(id): Path<String>,
    mut multipart: Multipart,
) -> AppResult<Json<Suite>> {
    let id = parse_uuid(&id, "suite")?;
    let repo = SuiteRepository::new(&state.db);
    if repo.get_by_id(id).await?.is_none() {
        return Err(AppError::not_found("Suite not found"));
    }

    let upload = uploads::read_upload(&mut multipart, state.media.max_upload_bytes()).await?;
    let path = state
        .media
        .store(UploadPrefix::SuiteFloorPlans, &upload.file_name, &upload.bytes)
        .await?;

    match repo.set_floor_plan(id, &path).await? {
        Some(previous) => {
            if let Some(previous) = previous {
                state.media.remove(&previous).await;
            }
        }
        None => {
            state.media.remove(&path).await;
            return Err(AppError::not_found("Suite not found"));
        }
    }

    repo.get_by_id(id)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::not_found("Suite not found"))
}

async fn list_models(
    State(state): State<AppState>,
) -> AppResult<Json<Vec<SuiteOperatingModel>>> {
    Ok(Json(OperatingModelRepository::new(&state.db).list().await?))
}

async fn get_model(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<SuiteOperatingModel>> {
    let id = parse_uuid(&id, "operating model")?;
    OperatingModelRepository::new(&state.db)
        .get_by_id(id)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::not_found("Operating model not found"))
}

async fn create_model(
    State(state): State<AppState>,
    Json(payload): Json<OperatingModelRequest>,
) -> AppResult<(StatusCode, Json<SuiteOperatingModel>)> {
    payload.validate()?;
    let model = OperatingModelRepository::new(&state.db)
        .create(&payload)
        .await?;
    info!(model_id = %model.id, name = %model.name, "Operating model created");
    Ok((StatusCode::CREATED, Json(model)))
}

async fn update_model(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(payload): Json<OperatingModelRequest>,
) -> AppResult<Json<SuiteOperatingModel>> {
    let id = parse_uuid(&id, "operating model")?;
    payload.validate()?;
    OperatingModelRepository::new(&state.db)
        .update(id, &payload)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::not_found("Operating model not found"))
}

/// DELETE /admin/api/operating-models/{id}/
///
/// Contracts under the model are removed with it.
async fn delete_model(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<StatusCode> {
    let id = parse_uuid(&id, "operating model")?;
    if OperatingModelRepository::new(&state.db).delete(id).await? {
        info!(model_id = %id, "Operating model deleted");
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::not_found("Operating model not found"))
    }
}

/// GET /admin/api/contracts/
async fn list_contracts(
    State(state): State<AppState>,
) -> AppResult<Json<Vec<ContractSummary>>> {
    let today = Utc::now().date_naive();
    Ok(Json(
        ContractRepository::new(&state.db)
            .list_summaries(today)
            .await?,
    ))
}

async fn get_contract(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<SuiteContract>> {
    let id = parse_uuid(&id, "contract")?;
    ContractRepository::new(&state.db)
        .get_by_id(id)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::not_found("Contract not found"))
}

/// POST /admin/api/contracts/
///
/// Exactly one holder; an end date after the begin date unless ongoing.
async fn create_contract(
    State(state): State<AppState>,
    Json(payload): Json<ContractRequest>,
) -> AppResult<(StatusCode, Json<SuiteContract>)> {
    let contract = payload.validate().map_err(AppError::validation)?;
    let contract = ContractRepository::new(&state.db).create(&contract).await?;
    info!(
        contract_id = %contract.id,
        suite_id = %contract.suite_id,
        "Suite contract created"
    );
    Ok((StatusCode::CREATED, Json(contract)))
}

async fn update_contract(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(payload): Json<ContractRequest>,
) -> AppResult<Json<SuiteContract>> {
    let id = parse_uuid(&id, "contract")?;
    let contract = payload.validate().map_err(AppError::validation)?;
    ContractRepository::new(&state.db)
        .update(id, &contract)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::not_found("Contract not found"))
}

async fn delete_contract(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<StatusCode> {
    let id = parse_uuid(&id, "contract")?;
    if ContractRepository::new(&state.db).delete(id).await? {
        info!(contract_id = %id, "Suite contract deleted");
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::not_found("Contract not found"))
    }
}
