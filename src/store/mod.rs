//! Storage engine: one CRUD contract over galleries, photos and admin settings,
//! implemented by an in-memory backend and a PostgreSQL backend.

mod memory;
mod postgres;

pub use memory::MemStorage;
pub use postgres::{ensure_database_exists, PgStorage};

use crate::config::ServerConfig;
use crate::error::AppError;
use crate::model::{
    AdminSetting, Gallery, GalleryPatch, NewGallery, NewPhoto, Photo, PhotoPatch, DEFAULT_ADMIN_PASSWORD,
    HOMEPAGE_PHOTO_KEY, PASSWORD_KEY,
};
use async_trait::async_trait;
use std::sync::Arc;

/// Uniform storage contract. Operations addressed by id report absence with
/// `None` / `false`; every other failure is an `AppError`.
#[async_trait]
pub trait Storage: Send + Sync {
    /// All galleries, ascending by `order`.
    async fn list_galleries(&self) -> Result<Vec<Gallery>, AppError>;
    async fn get_gallery(&self, id: &str) -> Result<Option<Gallery>, AppError>;
    async fn get_gallery_by_slug(&self, slug: &str) -> Result<Option<Gallery>, AppError>;
    async fn create_gallery(&self, gallery: NewGallery) -> Result<Gallery, AppError>;
    async fn update_gallery(&self, id: &str, patch: GalleryPatch) -> Result<Option<Gallery>, AppError>;
    /// The gallery at position `i` gets `order = i`. Galleries not listed keep their order.
    async fn reorder_galleries(&self, ids: &[String]) -> Result<(), AppError>;
    /// Removes the gallery and every photo it owns. Returns whether the gallery existed.
    async fn delete_gallery(&self, id: &str) -> Result<bool, AppError>;

    /// Photos of one gallery, ascending by `order`.
    async fn list_photos_by_gallery(&self, gallery_id: &str) -> Result<Vec<Photo>, AppError>;
    async fn get_photo(&self, id: &str) -> Result<Option<Photo>, AppError>;
    async fn create_photo(&self, photo: NewPhoto) -> Result<Photo, AppError>;
    async fn update_photo(&self, id: &str, patch: PhotoPatch) -> Result<Option<Photo>, AppError>;
    async fn delete_photo(&self, id: &str) -> Result<bool, AppError>;
    /// Like `reorder_galleries`, restricted to photos owned by `gallery_id`.
    async fn reorder_photos(&self, gallery_id: &str, ids: &[String]) -> Result<(), AppError>;
    async fn set_photo_order(&self, id: &str, order: i64) -> Result<bool, AppError>;

    async fn get_admin_setting(&self, key: &str) -> Result<Option<AdminSetting>, AppError>;
    /// Upsert by key; the record id survives overwrites, `updated_at` is refreshed.
    async fn set_admin_setting(&self, key: &str, value: &str) -> Result<AdminSetting, AppError>;

    async fn get_homepage_photo(&self) -> Result<Option<String>, AppError> {
        Ok(self.get_admin_setting(HOMEPAGE_PHOTO_KEY).await?.map(|s| s.value))
    }

    async fn set_homepage_photo(&self, url: &str) -> Result<AdminSetting, AppError> {
        self.set_admin_setting(HOMEPAGE_PHOTO_KEY, url).await
    }
}

/// Build the backend selected by configuration: PostgreSQL when `database_url` is set
/// (database and tables created if missing), the in-memory map otherwise.
pub async fn open(config: &ServerConfig) -> Result<Arc<dyn Storage>, AppError> {
    match &config.database_url {
        Some(url) => {
            ensure_database_exists(url).await?;
            let pool = sqlx::postgres::PgPoolOptions::new()
                .max_connections(config.max_connections)
                .connect(url)
                .await?;
            let store = PgStorage::new(pool, config.schema.clone());
            store.ensure_tables().await?;
            tracing::info!(schema = %config.schema, "using postgres storage");
            Ok(Arc::new(store))
        }
        None => {
            tracing::info!("using in-memory storage");
            Ok(Arc::new(MemStorage::new()))
        }
    }
}

/// Galleries created on first boot.
const DEFAULT_GALLERIES: &[(&str, &str, &str)] = &[
    ("Fashion", "fashion", "High fashion and editorial photography"),
    ("Beauty", "beauty", "Beauty and cosmetic photography"),
    ("Travel", "travel", "Travel and landscape photography"),
    ("Portrait", "portrait", "Professional portrait photography"),
    ("Conceptual", "conceptual", "Artistic and conceptual photography"),
];

/// Write the default password and galleries into an empty store. Existing data is left alone,
/// so this is safe to run on every boot against a persistent backend.
pub async fn seed_defaults(store: &dyn Storage) -> Result<(), AppError> {
    if store.get_admin_setting(PASSWORD_KEY).await?.is_none() {
        store.set_admin_setting(PASSWORD_KEY, DEFAULT_ADMIN_PASSWORD).await?;
        tracing::info!("seeded default admin password");
    }
    if store.list_galleries().await?.is_empty() {
        for (i, (name, slug, description)) in DEFAULT_GALLERIES.iter().enumerate() {
            store
                .create_gallery(NewGallery {
                    name: (*name).to_string(),
                    slug: (*slug).to_string(),
                    description: Some((*description).to_string()),
                    order: Some(i as i64 + 1),
                })
                .await?;
        }
        tracing::info!(count = DEFAULT_GALLERIES.len(), "seeded default galleries");
    }
    Ok(())
}
