//! Drives the full router with `oneshot` against the in-memory backend.

mod common;

use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use portfolio_api::model::{DEFAULT_ADMIN_PASSWORD, PASSWORD_KEY};
use serde_json::{json, Value};
use tower::ServiceExt;

const BOUNDARY: &str = "portfolio-test-boundary";

async fn send(app: &Router, req: Request<Body>) -> (StatusCode, Value) {
    let resp = app.clone().oneshot(req).await.unwrap();
    let status = resp.status();
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into()))
    };
    (status, body)
}

fn get(uri: &str) -> Request<Body> {
    Request::get(uri).body(Body::empty()).unwrap()
}

fn json_req(method: Method, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn delete(uri: &str) -> Request<Body> {
    Request::delete(uri).body(Body::empty()).unwrap()
}

/// `(field, file name, content type, bytes)` per part.
fn multipart(uri: &str, parts: &[(&str, &str, &str, &[u8])]) -> Request<Body> {
    let mut body = Vec::new();
    for (field, file_name, content_type, data) in parts {
        body.extend_from_slice(
            format!(
                "--{}\r\nContent-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\nContent-Type: {}\r\n\r\n",
                BOUNDARY, field, file_name, content_type
            )
            .as_bytes(),
        );
        body.extend_from_slice(data);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{}--\r\n", BOUNDARY).as_bytes());
    Request::post(uri)
        .header(header::CONTENT_TYPE, format!("multipart/form-data; boundary={}", BOUNDARY))
        .body(Body::from(body))
        .unwrap()
}

async fn create_gallery(app: &Router, body: Value) -> Value {
    let (status, gallery) = send(app, json_req(Method::POST, "/api/galleries", body)).await;
    assert_eq!(status, StatusCode::CREATED, "{}", gallery);
    gallery
}

#[tokio::test]
async fn gallery_upload_and_delete_end_to_end() {
    let (app, _store, dir) = common::test_app().await;

    let gallery = create_gallery(&app, json!({"name": "Nudes"})).await;
    assert_eq!(gallery["slug"], "nudes");
    assert_eq!(gallery["order"], 1);
    assert!(gallery["heroImage"].is_null());
    let id = gallery["id"].as_str().unwrap().to_string();

    let photos_uri = format!("/api/galleries/{}/photos", id);
    let (status, photos) = send(
        &app,
        multipart(
            &photos_uri,
            &[
                ("photos", "a.jpg", "image/jpeg", &b"jpeg-bytes"[..]),
                ("photos", "b.png", "image/png", &b"png-bytes"[..]),
            ],
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{}", photos);
    let photos = photos.as_array().unwrap().clone();
    assert_eq!(photos.len(), 2);
    assert_eq!(photos[0]["originalName"], "a.jpg");
    assert_eq!(photos[0]["galleryId"], id.as_str());
    assert!(photos[0]["order"].as_i64().unwrap() < photos[1]["order"].as_i64().unwrap());
    let filename = photos[0]["filename"].as_str().unwrap();
    assert!(filename.ends_with(".jpg"));
    assert_eq!(photos[0]["url"], format!("/uploads/{}", filename));
    assert!(dir.path().join("uploads").join(filename).exists());

    // uploaded file is served back
    let resp = app.clone().oneshot(get(&format!("/uploads/{}", filename))).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    assert_eq!(&bytes[..], b"jpeg-bytes");

    let (status, message) = send(&app, delete(&format!("/api/photos/{}", photos[0]["id"].as_str().unwrap()))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(message["message"], "Photo deleted successfully");
    assert!(!dir.path().join("uploads").join(filename).exists());

    let (_, listed) = send(&app, get(&photos_uri)).await;
    assert_eq!(listed.as_array().unwrap().len(), 1);

    let (status, _) = send(&app, delete(&format!("/api/galleries/{}", id))).await;
    assert_eq!(status, StatusCode::OK);
    let (_, listed) = send(&app, get(&photos_uri)).await;
    assert!(listed.as_array().unwrap().is_empty());
    let (status, _) = send(&app, get("/api/galleries/nudes")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn text_upload_is_rejected_without_creating_photos() {
    let (app, store, _dir) = common::test_app().await;
    let gallery = create_gallery(&app, json!({"name": "Travel"})).await;
    let id = gallery["id"].as_str().unwrap();

    let uri = format!("/api/galleries/{}/photos", id);
    let (status, body) = send(&app, multipart(&uri, &[("photos", "notes.txt", "text/plain", &b"hello"[..])])).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["message"].as_str().unwrap().contains("image/jpeg"));
    assert!(store.list_photos_by_gallery(id).await.unwrap().is_empty());

    // mixed batch keeps only the image
    let (status, body) = send(
        &app,
        multipart(
            &uri,
            &[
                ("photos", "notes.txt", "text/plain", &b"hello"[..]),
                ("photos", "c.webp", "image/webp", &b"webp"[..]),
            ],
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn oversized_upload_fails_whole_request() {
    let (app, store, _dir) = common::test_app().await;
    let gallery = create_gallery(&app, json!({"name": "Beauty"})).await;
    let id = gallery["id"].as_str().unwrap();
    let big = vec![0u8; 1024 * 1024 + 1];
    let (status, _) = send(
        &app,
        multipart(
            &format!("/api/galleries/{}/photos", id),
            &[("photos", "small.jpg", "image/jpeg", &b"ok"[..]), ("photos", "big.jpg", "image/jpeg", &big[..])],
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(store.list_photos_by_gallery(id).await.unwrap().is_empty());
}

#[tokio::test]
async fn upload_to_unknown_gallery_is_not_found() {
    let (app, _store, _dir) = common::test_app().await;
    let (status, body) = send(
        &app,
        multipart("/api/galleries/missing/photos", &[("photos", "a.jpg", "image/jpeg", &b"x"[..])]),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "not_found");
}

#[tokio::test]
async fn hero_image_may_come_from_another_gallery() {
    let (app, store, _dir) = common::test_app().await;
    let first = create_gallery(&app, json!({"name": "Fashion"})).await;
    let second = create_gallery(&app, json!({"name": "Portrait"})).await;
    let photo = store
        .create_photo(common::new_photo(second["id"].as_str().unwrap(), "p.jpg", 0))
        .await
        .unwrap();

    let uri = format!("/api/galleries/{}/hero-image", first["id"].as_str().unwrap());
    let (status, gallery) = send(&app, json_req(Method::PUT, &uri, json!({"photoId": photo.id}))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(gallery["heroImage"], photo.url.as_str());

    let (status, _) = send(&app, json_req(Method::PUT, &uri, json!({"photoId": "missing"}))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn galleries_create_update_and_reorder() {
    let (app, _store, _dir) = common::test_app().await;
    let a = create_gallery(&app, json!({"name": "My Gallery"})).await;
    assert_eq!(a["slug"], "my-gallery");
    let b = create_gallery(&app, json!({"name": "B", "slug": "bee", "order": 7})).await;
    assert_eq!(b["order"], 7);

    let (status, body) = send(&app, json_req(Method::POST, "/api/galleries", json!({"name": "X", "slug": "bee"}))).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert!(body["message"].is_string());

    let (status, _) = send(&app, json_req(Method::POST, "/api/galleries", json!({"name": "  "}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let (status, _) = send(&app, json_req(Method::POST, "/api/galleries", json!({"name": "!!!"}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let (status, _) = send(&app, json_req(Method::POST, "/api/galleries", json!({"slug": "no-name"}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let a_id = a["id"].as_str().unwrap();
    let (status, updated) = send(
        &app,
        json_req(Method::PUT, &format!("/api/galleries/{}", a_id), json!({"description": "New words"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["description"], "New words");
    assert_eq!(updated["name"], "My Gallery");

    let (status, _) = send(&app, json_req(Method::PUT, "/api/galleries/missing", json!({"name": "Z"}))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let b_id = b["id"].as_str().unwrap();
    let (status, body) = send(
        &app,
        json_req(Method::PUT, "/api/galleries/reorder", json!({"galleryIds": [b_id, a_id]})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Galleries reordered successfully");
    let (_, listed) = send(&app, get("/api/galleries")).await;
    let ids: Vec<&str> = listed.as_array().unwrap().iter().map(|g| g["id"].as_str().unwrap()).collect();
    assert_eq!(ids, [b_id, a_id]);

    let (status, found) = send(&app, get("/api/galleries/my-gallery")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(found["id"], a_id);
}

#[tokio::test]
async fn photo_reorder_and_order_updates() {
    let (app, store, _dir) = common::test_app().await;
    let gallery = create_gallery(&app, json!({"name": "Conceptual"})).await;
    let gid = gallery["id"].as_str().unwrap();
    let p1 = store.create_photo(common::new_photo(gid, "1.jpg", 100)).await.unwrap();
    let p2 = store.create_photo(common::new_photo(gid, "2.jpg", 200)).await.unwrap();

    let (status, _) = send(
        &app,
        json_req(
            Method::PUT,
            &format!("/api/galleries/{}/photos/reorder", gid),
            json!({"photoIds": [p2.id, p1.id]}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let listed = store.list_photos_by_gallery(gid).await.unwrap();
    assert_eq!(listed[0].id, p2.id);
    assert_eq!(listed[0].order, 0);

    let (status, _) = send(
        &app,
        json_req(Method::PUT, &format!("/api/photos/{}/order", p2.id), json!({"order": 5})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(store.get_photo(&p2.id).await.unwrap().unwrap().order, 5);

    let (status, photo) = send(
        &app,
        json_req(Method::PUT, &format!("/api/photos/{}", p1.id), json!({"originalName": "one.jpg"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(photo["originalName"], "one.jpg");

    let (status, _) = send(&app, json_req(Method::PUT, "/api/photos/missing/order", json!({"order": 1}))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, _) = send(&app, delete("/api/photos/missing")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, _) = send(&app, json_req(Method::PUT, "/api/photos/missing", json!({"order": 1}))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn login_and_change_password() {
    let (app, store, _dir) = common::test_app().await;
    portfolio_api::seed_defaults(store.as_ref()).await.unwrap();

    let (status, body) = send(
        &app,
        json_req(Method::POST, "/api/admin/login", json!({"password": DEFAULT_ADMIN_PASSWORD})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["authenticated"], true);

    let (status, body) = send(&app, json_req(Method::POST, "/api/admin/login", json!({"password": "wrong"}))).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "Invalid password");

    let (status, body) = send(
        &app,
        json_req(Method::POST, "/api/admin/change-password", json!({"newPassword": "short"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Password must be at least 6 characters");
    let (status, _) = send(&app, json_req(Method::POST, "/api/admin/change-password", json!({}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(
        &app,
        json_req(Method::POST, "/api/admin/change-password", json!({"newPassword": "longer-secret"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        store.get_admin_setting(PASSWORD_KEY).await.unwrap().unwrap().value,
        "longer-secret"
    );
    let (status, _) = send(
        &app,
        json_req(Method::POST, "/api/admin/login", json!({"password": DEFAULT_ADMIN_PASSWORD})),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn homepage_photo_round_trip() {
    let (app, _store, _dir) = common::test_app().await;
    let (status, body) = send(&app, get("/api/admin/homepage-photo")).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["photoUrl"].is_null());

    let (status, body) = send(
        &app,
        multipart("/api/admin/homepage-photo", &[("photo", "home.gif", "image/gif", &b"GIF89a"[..])]),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{}", body);
    let url = body["photoUrl"].as_str().unwrap().to_string();
    assert!(url.starts_with("/uploads/") && url.ends_with(".gif"));

    let (_, body) = send(&app, get("/api/admin/homepage-photo")).await;
    assert_eq!(body["photoUrl"], url.as_str());

    let (status, _) = send(
        &app,
        multipart("/api/admin/homepage-photo", &[("photos", "home.gif", "image/gif", &b"GIF89a"[..])]),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn malformed_json_is_bad_request() {
    let (app, _store, _dir) = common::test_app().await;
    let req = Request::post("/api/galleries")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{not json"))
        .unwrap();
    let (status, body) = send(&app, req).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["message"].is_string());
}

#[tokio::test]
async fn health_ready_and_version() {
    let (app, _store, _dir) = common::test_app().await;
    let (status, body) = send(&app, get("/health")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    let (status, body) = send(&app, get("/ready")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["storage"], "ok");
    let (_, body) = send(&app, get("/version")).await;
    assert_eq!(body["name"], "portfolio-api");
}

#[tokio::test]
async fn updates_of_missing_records_are_not_found() {
    let (app, store, _dir) = common::test_app().await;
    portfolio_api::seed_defaults(store.as_ref()).await.unwrap();

    // slug belongs to a seeded gallery, but the target does not exist
    let (status, _) = send(&app, json_req(Method::PUT, "/api/galleries/missing", json!({"slug": "fashion"}))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, _) = send(&app, json_req(Method::PUT, "/api/photos/missing", json!({"galleryId": "nope"}))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn reorder_is_not_a_gallery_slug() {
    let (app, _store, _dir) = common::test_app().await;
    let (status, _) = send(&app, json_req(Method::POST, "/api/galleries", json!({"name": "Reorder"}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let (status, _) = send(
        &app,
        json_req(Method::POST, "/api/galleries", json!({"name": "Misc", "slug": "reorder"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let gallery = create_gallery(&app, json!({"name": "Misc"})).await;
    let uri = format!("/api/galleries/{}", gallery["id"].as_str().unwrap());
    let (status, _) = send(&app, json_req(Method::PUT, &uri, json!({"slug": "reorder"}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn password_of_six_spaces_is_accepted() {
    let (app, _store, _dir) = common::test_app().await;
    let (status, _) = send(
        &app,
        json_req(Method::POST, "/api/admin/change-password", json!({"newPassword": "      "})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let (status, body) = send(&app, json_req(Method::POST, "/api/admin/login", json!({"password": "      "}))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["authenticated"], true);
}

#[tokio::test]
async fn oversized_homepage_photo_writes_nothing() {
    let (app, store, dir) = common::test_app().await;
    let big = vec![0u8; 3 * 1024 * 1024];
    let (status, body) = send(
        &app,
        multipart("/api/admin/homepage-photo", &[("photo", "huge.png", "image/png", &big[..])]),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["message"].as_str().unwrap().starts_with("File too large: huge.png"));
    assert!(store.get_homepage_photo().await.unwrap().is_none());
    assert_eq!(std::fs::read_dir(dir.path().join("uploads")).unwrap().count(), 0);
}
