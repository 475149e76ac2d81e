//! Gallery handlers: list, lookup by slug, create, update, reorder, delete, hero image.

use crate::error::AppError;
use crate::extractors::ValidatedJson;
use crate::model::{slugify, Gallery, GalleryPatch, NewGallery};
use crate::response::{created, message, ok};
use crate::state::AppState;
use crate::validation::{RequestValidator, GALLERY_NAME, GALLERY_SLUG};
use crate::wire::{CreateGalleryRequest, HeroImageRequest, ReorderGalleriesRequest};
use axum::extract::{Path, State};
use axum::response::IntoResponse;
use axum::Json;

/// GET /api/galleries
pub async fn list_galleries(State(state): State<AppState>) -> Result<Json<Vec<Gallery>>, AppError> {
    Ok(Json(state.store.list_galleries().await?))
}

/// GET /api/galleries/:slug
pub async fn get_gallery_by_slug(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<Json<Gallery>, AppError> {
    let gallery = state
        .store
        .get_gallery_by_slug(&slug)
        .await?
        .ok_or_else(|| AppError::NotFound("Gallery not found".into()))?;
    Ok(Json(gallery))
}

/// POST /api/galleries
pub async fn create_gallery(
    State(state): State<AppState>,
    ValidatedJson(body): ValidatedJson<CreateGalleryRequest>,
) -> Result<impl IntoResponse, AppError> {
    RequestValidator::validate("name", Some(&body.name), &GALLERY_NAME)?;
    let slug = match body.slug {
        Some(slug) => slug,
        None => slugify(body.name.trim()),
    };
    RequestValidator::validate("slug", Some(&slug), &GALLERY_SLUG)?;
    let order = match body.order {
        Some(order) => order,
        None => state.store.list_galleries().await?.len() as i64 + 1,
    };
    let gallery = state
        .store
        .create_gallery(NewGallery {
            name: body.name,
            slug,
            description: body.description,
            order: Some(order),
        })
        .await?;
    tracing::info!(id = %gallery.id, slug = %gallery.slug, "gallery created");
    Ok(created(gallery))
}

/// PUT /api/galleries/:id
pub async fn update_gallery(
    State(state): State<AppState>,
    Path(id): Path<String>,
    ValidatedJson(patch): ValidatedJson<GalleryPatch>,
) -> Result<impl IntoResponse, AppError> {
    RequestValidator::validate_present("name", patch.name.as_deref(), &GALLERY_NAME)?;
    RequestValidator::validate_present("slug", patch.slug.as_deref(), &GALLERY_SLUG)?;
    let gallery = state
        .store
        .update_gallery(&id, patch)
        .await?
        .ok_or_else(|| AppError::NotFound("Gallery not found".into()))?;
    Ok(ok(gallery))
}

/// PUT /api/galleries/reorder
pub async fn reorder_galleries(
    State(state): State<AppState>,
    ValidatedJson(body): ValidatedJson<ReorderGalleriesRequest>,
) -> Result<impl IntoResponse, AppError> {
    state.store.reorder_galleries(&body.gallery_ids).await?;
    Ok(message("Galleries reordered successfully"))
}

/// DELETE /api/galleries/:id. Photos go with the gallery; their files are removed best-effort.
pub async fn delete_gallery(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let photos = state.store.list_photos_by_gallery(&id).await?;
    if !state.store.delete_gallery(&id).await? {
        return Err(AppError::NotFound("Gallery not found".into()));
    }
    for photo in &photos {
        state.uploads.remove_best_effort(&photo.filename).await;
    }
    tracing::info!(id = %id, photos = photos.len(), "gallery deleted");
    Ok(message("Gallery deleted successfully"))
}

/// PUT /api/galleries/:id/hero-image. The photo is not required to belong to the gallery.
pub async fn set_hero_image(
    State(state): State<AppState>,
    Path(id): Path<String>,
    ValidatedJson(body): ValidatedJson<HeroImageRequest>,
) -> Result<impl IntoResponse, AppError> {
    let photo = state
        .store
        .get_photo(&body.photo_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Photo not found".into()))?;
    let gallery = state
        .store
        .update_gallery(&id, GalleryPatch::hero_image(photo.url))
        .await?
        .ok_or_else(|| AppError::NotFound("Gallery not found".into()))?;
    Ok(ok(gallery))
}
