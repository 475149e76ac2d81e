//! Request bodies of the REST API, shared by the handlers and the client.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateGalleryRequest {
    pub name: String,
    /// Derived from `name` when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slug: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Defaults to one past the current gallery count.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order: Option<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReorderGalleriesRequest {
    pub gallery_ids: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReorderPhotosRequest {
    pub photo_ids: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HeroImageRequest {
    pub photo_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PhotoOrderRequest {
    pub order: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangePasswordRequest {
    #[serde(default)]
    pub new_password: Option<String>,
}

/// Multipart field carrying gallery photo uploads.
pub const PHOTOS_FIELD: &str = "photos";
/// Multipart field carrying the homepage background upload.
pub const HOMEPAGE_PHOTO_FIELD: &str = "photo";
