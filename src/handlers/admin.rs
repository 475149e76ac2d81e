//! Admin handlers: password login and change, homepage background photo.
//!
//! Login only reports whether the password matches; no session or token is issued
//! and no other route checks authentication.

use crate::error::AppError;
use crate::extractors::{collect_files, ValidatedJson};
use crate::model::PASSWORD_KEY;
use crate::response::{message, ok, HomepagePhotoBody, HomepagePhotoUpdated, LoginBody};
use crate::state::AppState;
use crate::validation::{RequestValidator, NEW_PASSWORD};
use crate::wire::{ChangePasswordRequest, LoginRequest, HOMEPAGE_PHOTO_FIELD};
use axum::extract::{Multipart, State};
use axum::response::IntoResponse;

/// POST /api/admin/login
pub async fn login(
    State(state): State<AppState>,
    ValidatedJson(body): ValidatedJson<LoginRequest>,
) -> Result<impl IntoResponse, AppError> {
    let stored = state.store.get_admin_setting(PASSWORD_KEY).await?;
    match stored {
        Some(setting) if setting.value == body.password => Ok(ok(LoginBody {
            message: "Login successful".into(),
            authenticated: true,
        })),
        _ => {
            tracing::warn!("admin login rejected");
            Err(AppError::Unauthorized("Invalid password".into()))
        }
    }
}

/// POST /api/admin/change-password
pub async fn change_password(
    State(state): State<AppState>,
    ValidatedJson(body): ValidatedJson<ChangePasswordRequest>,
) -> Result<impl IntoResponse, AppError> {
    RequestValidator::validate("newPassword", body.new_password.as_deref(), &NEW_PASSWORD)?;
    let new_password = body.new_password.unwrap_or_default();
    state.store.set_admin_setting(PASSWORD_KEY, &new_password).await?;
    tracing::info!("admin password changed");
    Ok(message("Password changed successfully"))
}

/// GET /api/admin/homepage-photo
pub async fn get_homepage_photo(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let photo_url = state.store.get_homepage_photo().await?;
    Ok(ok(HomepagePhotoBody { photo_url }))
}

/// POST /api/admin/homepage-photo: multipart field `photo`. The first accepted image wins.
pub async fn upload_homepage_photo(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<impl IntoResponse, AppError> {
    let files = collect_files(&mut multipart, HOMEPAGE_PHOTO_FIELD, state.uploads.max_file_size()).await?;
    let accepted = state.uploads.accept(files)?;
    let Some(file) = accepted.first() else {
        return Err(AppError::Upload("No files uploaded".into()));
    };
    let stored = state.uploads.save(file).await?;
    if let Err(e) = state.store.set_homepage_photo(&stored.url).await {
        state.uploads.remove_best_effort(&stored.filename).await;
        return Err(e);
    }
    tracing::info!(url = %stored.url, "homepage photo updated");
    Ok(ok(HomepagePhotoUpdated {
        message: "Homepage photo updated successfully".into(),
        photo_url: stored.url,
    }))
}
