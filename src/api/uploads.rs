//! Multipart upload handling shared by the gallery and single-file endpoints

use axum::{extract::Multipart, http::StatusCode};
use tracing::info;
use uuid::Uuid;

use crate::{
    db::{PhotoInsert, PhotoRepository},
    models::{Photo, PhotoOwner},
    utils::{AppError, AppResult, Json},
    AppState,
};

/// A file read from the `file` form field
#[derive(Debug)]
pub struct Upload {
    pub file_name: String,
    pub bytes: Vec<u8>,
    /// Optional `caption` form field
    pub caption: String,
}

/// Read the `file` field (and optional `caption`) from a multipart body
pub async fn read_upload(multipart: &mut Multipart, max_bytes: usize) -> AppResult<Upload> {
    let mut file: Option<(String, Vec<u8>)> = None;
    let mut caption = String::new();

    while let Some(mut field) = multipart.next_field().await? {
        match field.name() {
            Some("file") => {
                let file_name = field.file_name().unwrap_or("upload").to_string();
                let mut bytes = Vec::new();
                while let Some(chunk) = field.chunk().await? {
                    if bytes.len() + chunk.len() > max_bytes {
                        return Err(AppError::PayloadTooLarge(format!(
                            "Upload exceeds the {} byte limit",
                            max_bytes
                        )));
                    }
                    bytes.extend_from_slice(&chunk);
                }
                file = Some((file_name, bytes));
            }
            Some("caption") => {
                caption = field.text().await?.trim().to_string();
            }
            _ => {}
        }
    }

    let (file_name, bytes) = file.ok_or_else(|| AppError::bad_request("Missing file field"))?;
    if bytes.is_empty() {
        return Err(AppError::bad_request("Uploaded file is empty"));
    }

    Ok(Upload {
        file_name,
        bytes,
        caption,
    })
}

/// Store an upload and attach it to `owner`'s gallery
pub async fn add_photo(
    state: &AppState,
    owner: PhotoOwner,
    owner_id: Uuid,
    mut multipart: Multipart,
) -> AppResult<(StatusCode, Json<Photo>)> {
    let upload = read_upload(&mut multipart, state.media.max_upload_bytes()).await?;
    let repo = PhotoRepository::new(&state.db, owner);

    if let Some(max) = owner.max_photos() {
        if repo.count(owner_id).await? >= max {
            return Err(photo_limit_error(owner, max));
        }
    }

    let path = state
        .media
        .store(owner.upload_prefix(), &upload.file_name, &upload.bytes)
        .await?;

    match repo.insert(owner_id, &path, &upload.caption).await {
        Ok(PhotoInsert::Inserted(photo)) => {
            info!(owner = owner.label(), owner_id = %owner_id, path = %photo.path, "Photo added");
            Ok((StatusCode::CREATED, Json(photo)))
        }
        Ok(PhotoInsert::OwnerNotFound) => {
            state.media.remove(&path).await;
            Err(AppError::not_found(format!("{} not found", owner.label())))
        }
        Ok(PhotoInsert::LimitReached(max)) => {
            state.media.remove(&path).await;
            Err(photo_limit_error(owner, max))
        }
        Err(e) => {
            state.media.remove(&path).await;
            Err(e.into())
        }
    }
}

fn photo_limit_error(owner: PhotoOwner, max: i64) -> AppError {
    AppError::validation(format!(
        "{} photos are limited to {}",
        owner.label(),
        max
    ))
}

/// Detach a photo and remove its file
pub async fn remove_photo(
    state: &AppState,
    owner: PhotoOwner,
    owner_id: Uuid,
    photo_id: Uuid,
) -> AppResult<StatusCode> {
    let photo = PhotoRepository::new(&state.db, owner)
        .delete(owner_id, photo_id)
        .await?
        .ok_or_else(|| AppError::not_found("Photo not found"))?;

    state.media.remove(&photo.path).await;
    Ok(StatusCode::NO_CONTENT)
}
