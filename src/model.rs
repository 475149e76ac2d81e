//! Entities stored by the portfolio: galleries, photos and admin settings.
//! JSON uses camelCase keys; PostgreSQL columns are snake_case.

use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize};
use std::sync::OnceLock;

/// Admin setting key holding the plain-text admin password.
pub const PASSWORD_KEY: &str = "password";
/// Admin setting key holding the homepage background photo URL.
pub const HOMEPAGE_PHOTO_KEY: &str = "homepage_photo";
/// Password written on first boot when none is stored.
pub const DEFAULT_ADMIN_PASSWORD: &str = "100301";

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Gallery {
    pub id: String,
    pub name: String,
    pub slug: String,
    pub description: Option<String>,
    pub hero_image: Option<String>,
    pub order: i64,
    pub created_at: DateTime<Utc>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Photo {
    pub id: String,
    pub gallery_id: String,
    /// Server-assigned name of the stored file inside the upload directory.
    pub filename: String,
    /// Name the file had on the uploader's machine. Display only.
    pub original_name: String,
    pub url: String,
    pub order: i64,
    pub created_at: DateTime<Utc>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct AdminSetting {
    pub id: String,
    pub key: String,
    pub value: String,
    pub updated_at: DateTime<Utc>,
}

/// Insert shape for a gallery. `order` falls back to 0.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewGallery {
    pub name: String,
    pub slug: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order: Option<i64>,
}

/// Insert shape for a photo. `order` falls back to 0.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewPhoto {
    pub gallery_id: String,
    pub filename: String,
    pub original_name: String,
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order: Option<i64>,
}

/// Partial gallery update. Absent fields are left alone; nullable fields accept
/// an explicit `null` to clear them.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GalleryPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slug: Option<String>,
    #[serde(default, deserialize_with = "nullable", skip_serializing_if = "Option::is_none")]
    pub description: Option<Option<String>>,
    #[serde(default, deserialize_with = "nullable", skip_serializing_if = "Option::is_none")]
    pub hero_image: Option<Option<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order: Option<i64>,
}

impl GalleryPatch {
    pub fn hero_image(url: impl Into<String>) -> Self {
        GalleryPatch {
            hero_image: Some(Some(url.into())),
            ..Default::default()
        }
    }

    /// Overwrite the fields present in the patch.
    pub fn apply(self, gallery: &mut Gallery) {
        if let Some(name) = self.name {
            gallery.name = name;
        }
        if let Some(slug) = self.slug {
            gallery.slug = slug;
        }
        if let Some(description) = self.description {
            gallery.description = description;
        }
        if let Some(hero_image) = self.hero_image {
            gallery.hero_image = hero_image;
        }
        if let Some(order) = self.order {
            gallery.order = order;
        }
    }
}

/// Partial photo update. `filename` and `url` are server-assigned and not patchable.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PhotoPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gallery_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order: Option<i64>,
}

impl PhotoPatch {
    pub fn apply(self, photo: &mut Photo) {
        if let Some(gallery_id) = self.gallery_id {
            photo.gallery_id = gallery_id;
        }
        if let Some(original_name) = self.original_name {
            photo.original_name = original_name;
        }
        if let Some(order) = self.order {
            photo.order = order;
        }
    }
}

/// Distinguishes a missing field (`None`) from an explicit `null` (`Some(None)`).
fn nullable<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// Derive a URL-safe slug: lower-case, whitespace runs become one hyphen,
/// anything outside `[a-z0-9-]` is dropped.
/// e.g. "My Gallery" -> "my-gallery", "Black & White" -> "black--white"
pub fn slugify(name: &str) -> String {
    static WHITESPACE: OnceLock<Regex> = OnceLock::new();
    static DISALLOWED: OnceLock<Regex> = OnceLock::new();
    let whitespace = WHITESPACE.get_or_init(|| Regex::new(r"\s+").expect("static regex"));
    let disallowed = DISALLOWED.get_or_init(|| Regex::new(r"[^a-z0-9-]").expect("static regex"));

    let lower = name.to_lowercase();
    let hyphenated = whitespace.replace_all(&lower, "-");
    disallowed.replace_all(&hyphenated, "").into_owned()
}
