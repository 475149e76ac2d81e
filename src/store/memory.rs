//! In-memory backend. All three maps sit behind one lock so multi-record
//! operations (cascade delete, reorder) are applied in a single pass.

use super::Storage;
use crate::error::AppError;
use crate::model::{AdminSetting, Gallery, GalleryPatch, NewGallery, NewPhoto, Photo, PhotoPatch};
use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

#[derive(Default)]
struct Maps {
    galleries: HashMap<String, Gallery>,
    photos: HashMap<String, Photo>,
    /// Keyed by setting key, which keeps at most one record per key.
    settings: HashMap<String, AdminSetting>,
}

#[derive(Default)]
pub struct MemStorage {
    maps: RwLock<Maps>,
}

impl MemStorage {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, Maps>, AppError> {
        self.maps.read().map_err(|_| AppError::Internal("storage lock poisoned".into()))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, Maps>, AppError> {
        self.maps.write().map_err(|_| AppError::Internal("storage lock poisoned".into()))
    }
}

fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

fn slug_taken(maps: &Maps, slug: &str, except_id: Option<&str>) -> bool {
    maps.galleries
        .values()
        .any(|g| g.slug == slug && Some(g.id.as_str()) != except_id)
}

#[async_trait]
impl Storage for MemStorage {
    async fn list_galleries(&self) -> Result<Vec<Gallery>, AppError> {
        let maps = self.read()?;
        let mut out: Vec<Gallery> = maps.galleries.values().cloned().collect();
        out.sort_by(|a, b| (a.order, a.created_at, &a.id).cmp(&(b.order, b.created_at, &b.id)));
        Ok(out)
    }

    async fn get_gallery(&self, id: &str) -> Result<Option<Gallery>, AppError> {
        Ok(self.read()?.galleries.get(id).cloned())
    }

    async fn get_gallery_by_slug(&self, slug: &str) -> Result<Option<Gallery>, AppError> {
        Ok(self.read()?.galleries.values().find(|g| g.slug == slug).cloned())
    }

    async fn create_gallery(&self, gallery: NewGallery) -> Result<Gallery, AppError> {
        let mut maps = self.write()?;
        if slug_taken(&maps, &gallery.slug, None) {
            return Err(AppError::Conflict(format!("gallery slug already exists: {}", gallery.slug)));
        }
        let record = Gallery {
            id: new_id(),
            name: gallery.name,
            slug: gallery.slug,
            description: gallery.description,
            hero_image: None,
            order: gallery.order.unwrap_or(0),
            created_at: Utc::now(),
        };
        maps.galleries.insert(record.id.clone(), record.clone());
        Ok(record)
    }

    async fn update_gallery(&self, id: &str, patch: GalleryPatch) -> Result<Option<Gallery>, AppError> {
        let mut maps = self.write()?;
        if !maps.galleries.contains_key(id) {
            return Ok(None);
        }
        if let Some(slug) = &patch.slug {
            if slug_taken(&maps, slug, Some(id)) {
                return Err(AppError::Conflict(format!("gallery slug already exists: {}", slug)));
            }
        }
        let Some(gallery) = maps.galleries.get_mut(id) else {
            return Ok(None);
        };
        patch.apply(gallery);
        Ok(Some(gallery.clone()))
    }

    async fn reorder_galleries(&self, ids: &[String]) -> Result<(), AppError> {
        let mut maps = self.write()?;
        for (position, id) in ids.iter().enumerate() {
            if let Some(gallery) = maps.galleries.get_mut(id) {
                gallery.order = position as i64;
            }
        }
        Ok(())
    }

    async fn delete_gallery(&self, id: &str) -> Result<bool, AppError> {
        let mut maps = self.write()?;
        maps.photos.retain(|_, p| p.gallery_id != id);
        Ok(maps.galleries.remove(id).is_some())
    }

    async fn list_photos_by_gallery(&self, gallery_id: &str) -> Result<Vec<Photo>, AppError> {
        let maps = self.read()?;
        let mut out: Vec<Photo> = maps
            .photos
            .values()
            .filter(|p| p.gallery_id == gallery_id)
            .cloned()
            .collect();
        out.sort_by(|a, b| (a.order, a.created_at, &a.id).cmp(&(b.order, b.created_at, &b.id)));
        Ok(out)
    }

    async fn get_photo(&self, id: &str) -> Result<Option<Photo>, AppError> {
        Ok(self.read()?.photos.get(id).cloned())
    }

    async fn create_photo(&self, photo: NewPhoto) -> Result<Photo, AppError> {
        let mut maps = self.write()?;
        if !maps.galleries.contains_key(&photo.gallery_id) {
            return Err(AppError::Validation("gallery does not exist".into()));
        }
        let record = Photo {
            id: new_id(),
            gallery_id: photo.gallery_id,
            filename: photo.filename,
            original_name: photo.original_name,
            url: photo.url,
            order: photo.order.unwrap_or(0),
            created_at: Utc::now(),
        };
        maps.photos.insert(record.id.clone(), record.clone());
        Ok(record)
    }

    async fn update_photo(&self, id: &str, patch: PhotoPatch) -> Result<Option<Photo>, AppError> {
        let mut maps = self.write()?;
        if !maps.photos.contains_key(id) {
            return Ok(None);
        }
        if let Some(gallery_id) = &patch.gallery_id {
            if !maps.galleries.contains_key(gallery_id) {
                return Err(AppError::Validation("gallery does not exist".into()));
            }
        }
        let Some(photo) = maps.photos.get_mut(id) else {
            return Ok(None);
        };
        patch.apply(photo);
        Ok(Some(photo.clone()))
    }

    async fn delete_photo(&self, id: &str) -> Result<bool, AppError> {
        Ok(self.write()?.photos.remove(id).is_some())
    }

    async fn reorder_photos(&self, gallery_id: &str, ids: &[String]) -> Result<(), AppError> {
        let mut maps = self.write()?;
        for (position, id) in ids.iter().enumerate() {
            if let Some(photo) = maps.photos.get_mut(id).filter(|p| p.gallery_id == gallery_id) {
                photo.order = position as i64;
            }
        }
        Ok(())
    }

    async fn set_photo_order(&self, id: &str, order: i64) -> Result<bool, AppError> {
        let mut maps = self.write()?;
        match maps.photos.get_mut(id) {
            Some(photo) => {
                photo.order = order;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn get_admin_setting(&self, key: &str) -> Result<Option<AdminSetting>, AppError> {
        Ok(self.read()?.settings.get(key).cloned())
    }

    async fn set_admin_setting(&self, key: &str, value: &str) -> Result<AdminSetting, AppError> {
        let mut maps = self.write()?;
        let id = maps
            .settings
            .get(key)
            .map(|s| s.id.clone())
            .unwrap_or_else(new_id);
        let record = AdminSetting {
            id,
            key: key.to_string(),
            value: value.to_string(),
            updated_at: Utc::now(),
        };
        maps.settings.insert(key.to_string(), record.clone());
        Ok(record)
    }
}

#[cfg(test)]
impl MemStorage {
    pub(crate) fn setting_count(&self) -> usize {
        self.maps.read().map(|m| m.settings.len()).unwrap_or(0)
    }
}
