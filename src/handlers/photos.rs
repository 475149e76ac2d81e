//! Photo handlers: list, upload, update, reorder, delete, set order.

use crate::error::AppError;
use crate::extractors::{collect_files, ValidatedJson};
use crate::model::{NewPhoto, Photo, PhotoPatch};
use crate::response::{created, message, ok};
use crate::state::AppState;
use crate::wire::{PhotoOrderRequest, ReorderPhotosRequest, PHOTOS_FIELD};
use axum::extract::{Multipart, Path, State};
use axum::response::IntoResponse;
use axum::Json;
use chrono::Utc;

/// GET /api/galleries/:galleryId/photos
pub async fn list_photos(
    State(state): State<AppState>,
    Path(gallery_id): Path<String>,
) -> Result<Json<Vec<Photo>>, AppError> {
    Ok(Json(state.store.list_photos_by_gallery(&gallery_id).await?))
}

/// POST /api/galleries/:galleryId/photos: multipart field `photos`, one or more images.
/// New photos take the upload time in milliseconds (plus their index) as `order`, so
/// they sort after existing photos and keep their submission order.
pub async fn upload_photos(
    State(state): State<AppState>,
    Path(gallery_id): Path<String>,
    mut multipart: Multipart,
) -> Result<impl IntoResponse, AppError> {
    if state.store.get_gallery(&gallery_id).await?.is_none() {
        return Err(AppError::NotFound("Gallery not found".into()));
    }
    let files = collect_files(&mut multipart, PHOTOS_FIELD, state.uploads.max_file_size()).await?;
    let accepted = state.uploads.accept(files)?;

    let base_order = Utc::now().timestamp_millis();
    let mut photos = Vec::with_capacity(accepted.len());
    for (i, file) in accepted.iter().enumerate() {
        let stored = state.uploads.save(file).await?;
        let record = state
            .store
            .create_photo(NewPhoto {
                gallery_id: gallery_id.clone(),
                filename: stored.filename.clone(),
                original_name: stored.original_name,
                url: stored.url,
                order: Some(base_order + i as i64),
            })
            .await;
        match record {
            Ok(photo) => photos.push(photo),
            Err(e) => {
                state.uploads.remove_best_effort(&stored.filename).await;
                return Err(e);
            }
        }
    }
    tracing::info!(gallery_id = %gallery_id, count = photos.len(), "photos uploaded");
    Ok(created(photos))
}

/// PUT /api/photos/:id
pub async fn update_photo(
    State(state): State<AppState>,
    Path(id): Path<String>,
    ValidatedJson(patch): ValidatedJson<PhotoPatch>,
) -> Result<impl IntoResponse, AppError> {
    let photo = state
        .store
        .update_photo(&id, patch)
        .await?
        .ok_or_else(|| AppError::NotFound("Photo not found".into()))?;
    Ok(ok(photo))
}

/// PUT /api/galleries/:galleryId/photos/reorder
pub async fn reorder_photos(
    State(state): State<AppState>,
    Path(gallery_id): Path<String>,
    ValidatedJson(body): ValidatedJson<ReorderPhotosRequest>,
) -> Result<impl IntoResponse, AppError> {
    state.store.reorder_photos(&gallery_id, &body.photo_ids).await?;
    Ok(message("Photos reordered successfully"))
}

/// DELETE /api/photos/:id. The record is removed even when its file cannot be.
pub async fn delete_photo(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let photo = state
        .store
        .get_photo(&id)
        .await?
        .ok_or_else(|| AppError::NotFound("Photo not found".into()))?;
    state.uploads.remove_best_effort(&photo.filename).await;
    if !state.store.delete_photo(&id).await? {
        return Err(AppError::NotFound("Photo not found".into()));
    }
    Ok(message("Photo deleted successfully"))
}

/// PUT /api/photos/:id/order
pub async fn set_photo_order(
    State(state): State<AppState>,
    Path(id): Path<String>,
    ValidatedJson(body): ValidatedJson<PhotoOrderRequest>,
) -> Result<impl IntoResponse, AppError> {
    if !state.store.set_photo_order(&id, body.order).await? {
        return Err(AppError::NotFound("Photo not found".into()));
    }
    Ok(message("Photo order updated"))
}
