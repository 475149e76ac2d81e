//! REST routes under /api.
//! Path parameters at the same position must share a name, so `:id` stands for the slug
//! on `GET /api/galleries/:id` and for the gallery id everywhere else. Static segments
//! (`reorder`) take priority over `:id`.

use crate::handlers::{
    change_password, create_gallery, delete_gallery, delete_photo, get_gallery_by_slug, get_homepage_photo,
    list_galleries, list_photos, login, reorder_galleries, reorder_photos, set_hero_image, set_photo_order,
    update_gallery, update_photo, upload_homepage_photo, upload_photos,
};
use crate::state::AppState;
use axum::{
    routing::{get, post, put},
    Router,
};

pub fn api_routes(state: AppState) -> Router {
    Router::new()
        .route("/api/galleries", get(list_galleries).post(create_gallery))
        .route("/api/galleries/reorder", put(reorder_galleries))
        .route(
            "/api/galleries/:id",
            get(get_gallery_by_slug).put(update_gallery).delete(delete_gallery),
        )
        .route("/api/galleries/:id/hero-image", put(set_hero_image))
        .route("/api/galleries/:id/photos", get(list_photos).post(upload_photos))
        .route("/api/galleries/:id/photos/reorder", put(reorder_photos))
        .route("/api/photos/:id", put(update_photo).delete(delete_photo))
        .route("/api/photos/:id/order", put(set_photo_order))
        .route("/api/admin/login", post(login))
        .route("/api/admin/change-password", post(change_password))
        .route(
            "/api/admin/homepage-photo",
            get(get_homepage_photo).post(upload_homepage_photo),
        )
        .with_state(state)
}
