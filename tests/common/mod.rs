//! Shared helpers for the integration tests.
#![allow(dead_code)]

use portfolio_api::model::{GalleryPatch, NewGallery, NewPhoto, PhotoPatch, PASSWORD_KEY};
use portfolio_api::{app, AppError, AppState, MemStorage, Storage, UploadStore};
use std::sync::Arc;

pub fn new_gallery(name: &str, slug: &str, order: i64) -> NewGallery {
    NewGallery {
        name: name.into(),
        slug: slug.into(),
        description: Some(format!("{} photography", name)),
        order: Some(order),
    }
}

pub fn new_photo(gallery_id: &str, name: &str, order: i64) -> NewPhoto {
    NewPhoto {
        gallery_id: gallery_id.into(),
        filename: format!("1700000000000-1-{}", name),
        original_name: name.into(),
        url: format!("/uploads/1700000000000-1-{}", name),
        order: Some(order),
    }
}

/// Router over an empty in-memory store and a temporary upload directory.
/// Keep the returned `TempDir` alive for the duration of the test.
pub async fn test_app() -> (axum::Router, Arc<dyn Storage>, tempfile::TempDir) {
    let dir = tempfile::tempdir().unwrap();
    let store: Arc<dyn Storage> = Arc::new(MemStorage::new());
    let uploads = UploadStore::new(dir.path().join("uploads"), 1024 * 1024).await.unwrap();
    let state = AppState::new(store.clone(), uploads);
    (app(state, 16 * 1024 * 1024), store, dir)
}

/// Behaviour every `Storage` backend must share. Expects an empty store.
pub async fn storage_contract(store: &dyn Storage) {
    assert!(store.list_galleries().await.unwrap().is_empty());

    // galleries list ascending by order
    let g1 = store.create_gallery(new_gallery("One", "one", 2)).await.unwrap();
    let g2 = store.create_gallery(new_gallery("Two", "two", 1)).await.unwrap();
    let g3 = store.create_gallery(new_gallery("Three", "three", 3)).await.unwrap();
    assert_ne!(g1.id, g2.id);
    assert!(g1.hero_image.is_none());
    let ids: Vec<String> = store.list_galleries().await.unwrap().into_iter().map(|g| g.id).collect();
    assert_eq!(ids, vec![g2.id.clone(), g1.id.clone(), g3.id.clone()]);

    // lookups
    assert_eq!(store.get_gallery(&g1.id).await.unwrap().unwrap(), g1);
    assert_eq!(store.get_gallery_by_slug("two").await.unwrap().unwrap().id, g2.id);
    assert!(store.get_gallery("missing").await.unwrap().is_none());
    assert!(store.get_gallery_by_slug("missing").await.unwrap().is_none());

    // duplicate slug
    let err = store.create_gallery(new_gallery("Again", "one", 9)).await.unwrap_err();
    assert!(matches!(err, AppError::Conflict(_)));

    // partial update leaves other fields alone
    let patch = serde_json::from_value(serde_json::json!({"name": "Uno", "description": null})).unwrap();
    let updated = store.update_gallery(&g1.id, patch).await.unwrap().unwrap();
    assert_eq!(updated.name, "Uno");
    assert_eq!(updated.slug, "one");
    assert_eq!(updated.description, None);
    assert_eq!(updated.order, 2);
    assert_eq!(updated.id, g1.id);
    assert!(store
        .update_gallery("missing", Default::default())
        .await
        .unwrap()
        .is_none());
    // absence wins over a slug that would conflict
    let taken = GalleryPatch {
        slug: Some("two".into()),
        ..Default::default()
    };
    assert!(store.update_gallery("missing", taken).await.unwrap().is_none());

    // reorder
    store
        .reorder_galleries(&[g3.id.clone(), g1.id.clone(), g2.id.clone()])
        .await
        .unwrap();
    let listed = store.list_galleries().await.unwrap();
    let ids: Vec<&str> = listed.iter().map(|g| g.id.as_str()).collect();
    assert_eq!(ids, vec![g3.id.as_str(), g1.id.as_str(), g2.id.as_str()]);
    let orders: Vec<i64> = listed.iter().map(|g| g.order).collect();
    assert_eq!(orders, vec![0, 1, 2]);

    // photos
    let p1 = store.create_photo(new_photo(&g1.id, "a.jpg", 20)).await.unwrap();
    let p2 = store.create_photo(new_photo(&g1.id, "b.jpg", 10)).await.unwrap();
    let other = store.create_photo(new_photo(&g2.id, "c.jpg", 0)).await.unwrap();
    let ids: Vec<String> = store
        .list_photos_by_gallery(&g1.id)
        .await
        .unwrap()
        .into_iter()
        .map(|p| p.id)
        .collect();
    assert_eq!(ids, vec![p2.id.clone(), p1.id.clone()]);
    assert_eq!(store.get_photo(&p1.id).await.unwrap().unwrap(), p1);
    assert!(store.get_photo("missing").await.unwrap().is_none());

    store
        .reorder_photos(&g1.id, &[p1.id.clone(), p2.id.clone(), other.id.clone()])
        .await
        .unwrap();
    assert_eq!(store.get_photo(&p1.id).await.unwrap().unwrap().order, 0);
    assert_eq!(store.get_photo(&p2.id).await.unwrap().unwrap().order, 1);
    // photo of another gallery is untouched
    assert_eq!(store.get_photo(&other.id).await.unwrap().unwrap().order, 0);

    assert!(store.set_photo_order(&p2.id, 99).await.unwrap());
    assert!(!store.set_photo_order("missing", 1).await.unwrap());
    let patch = serde_json::from_value(serde_json::json!({"originalName": "renamed.jpg"})).unwrap();
    let renamed = store.update_photo(&p2.id, patch).await.unwrap().unwrap();
    assert_eq!(renamed.original_name, "renamed.jpg");
    assert_eq!(renamed.order, 99);
    assert_eq!(renamed.url, p2.url);

    // absence wins over an unknown target gallery
    let moved = PhotoPatch {
        gallery_id: Some("no-such-gallery".into()),
        ..Default::default()
    };
    assert!(store.update_photo("missing", moved).await.unwrap().is_none());
    let moved = PhotoPatch {
        gallery_id: Some("no-such-gallery".into()),
        ..Default::default()
    };
    let err = store.update_photo(&p2.id, moved).await.unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));

    assert!(store.delete_photo(&p2.id).await.unwrap());
    assert!(!store.delete_photo(&p2.id).await.unwrap());

    // cascade
    assert!(store.delete_gallery(&g1.id).await.unwrap());
    assert!(!store.delete_gallery(&g1.id).await.unwrap());
    assert!(store.list_photos_by_gallery(&g1.id).await.unwrap().is_empty());
    assert!(store.get_photo(&p1.id).await.unwrap().is_none());
    assert!(store.get_photo(&other.id).await.unwrap().is_some());

    // settings upsert
    assert!(store.get_admin_setting(PASSWORD_KEY).await.unwrap().is_none());
    let first = store.set_admin_setting(PASSWORD_KEY, "x").await.unwrap();
    let second = store.set_admin_setting(PASSWORD_KEY, "y").await.unwrap();
    assert_eq!(first.id, second.id);
    assert_eq!(store.get_admin_setting(PASSWORD_KEY).await.unwrap().unwrap().value, "y");

    assert!(store.get_homepage_photo().await.unwrap().is_none());
    store.set_homepage_photo("/uploads/home.jpg").await.unwrap();
    assert_eq!(
        store.get_homepage_photo().await.unwrap().as_deref(),
        Some("/uploads/home.jpg")
    );
}
