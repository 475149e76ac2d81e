//! Async client for the portfolio API. Reads are cached by endpoint path; every
//! mutation invalidates the keys it affects so the next read refetches.

mod cache;

pub use cache::QueryCache;

use crate::model::{Gallery, GalleryPatch, Photo, PhotoPatch};
use crate::response::{HomepagePhotoBody, HomepagePhotoUpdated, LoginBody, MessageBody};
use crate::wire::{
    ChangePasswordRequest, CreateGalleryRequest, HeroImageRequest, LoginRequest, PhotoOrderRequest,
    ReorderGalleriesRequest, ReorderPhotosRequest, HOMEPAGE_PHOTO_FIELD, PHOTOS_FIELD,
};
use reqwest::multipart::{Form, Part};
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use thiserror::Error;

pub const GALLERIES_KEY: &str = "/api/galleries";
pub const HOMEPAGE_PHOTO_KEY: &str = "/api/admin/homepage-photo";

pub fn gallery_key(slug: &str) -> String {
    format!("{}/{}", GALLERIES_KEY, slug)
}

pub fn photos_key(gallery_id: &str) -> String {
    format!("{}/{}/photos", GALLERIES_KEY, gallery_id)
}

#[derive(Error, Debug)]
pub enum ClientError {
    #[error("http: {0}")]
    Http(#[from] reqwest::Error),
    #[error("decode: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("{status}: {message}")]
    Status { status: u16, message: String },
}

/// An image to upload.
#[derive(Debug, Clone)]
pub struct FilePart {
    pub file_name: String,
    pub content_type: String,
    pub data: Vec<u8>,
}

/// Remembers whether the last login succeeded. The server issues no session, so this
/// flag only gates what a UI chooses to show.
#[derive(Debug, Default)]
pub struct AdminSession {
    authenticated: AtomicBool,
}

impl AdminSession {
    pub fn is_authenticated(&self) -> bool {
        self.authenticated.load(Ordering::Relaxed)
    }

    fn set(&self, value: bool) {
        self.authenticated.store(value, Ordering::Relaxed);
    }
}

pub struct PortfolioClient {
    http: reqwest::Client,
    base_url: String,
    cache: QueryCache,
    session: AdminSession,
}

impl PortfolioClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_http(reqwest::Client::new(), base_url)
    }

    pub fn with_http(http: reqwest::Client, base_url: impl Into<String>) -> Self {
        PortfolioClient {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            cache: QueryCache::new(),
            session: AdminSession::default(),
        }
    }

    pub fn cache(&self) -> &QueryCache {
        &self.cache
    }

    pub fn session(&self) -> &AdminSession {
        &self.session
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Cached GET.
    async fn query<T: DeserializeOwned + Serialize>(&self, path: &str) -> Result<T, ClientError> {
        if let Some(hit) = self.cache.get::<T>(path) {
            return Ok(hit);
        }
        let resp = self.http.get(self.url(path)).send().await?;
        let value: T = decode(resp).await?;
        self.cache.put(path, &value);
        Ok(value)
    }

    async fn send_json<B: Serialize, T: DeserializeOwned>(
        &self,
        method: reqwest::Method,
        path: &str,
        body: Option<&B>,
    ) -> Result<T, ClientError> {
        let mut req = self.http.request(method, self.url(path));
        if let Some(body) = body {
            req = req.json(body);
        }
        decode(req.send().await?).await
    }

    pub async fn galleries(&self) -> Result<Vec<Gallery>, ClientError> {
        self.query(GALLERIES_KEY).await
    }

    pub async fn gallery_by_slug(&self, slug: &str) -> Result<Gallery, ClientError> {
        self.query(&gallery_key(slug)).await
    }

    pub async fn photos(&self, gallery_id: &str) -> Result<Vec<Photo>, ClientError> {
        self.query(&photos_key(gallery_id)).await
    }

    pub async fn homepage_photo(&self) -> Result<Option<String>, ClientError> {
        let body: HomepagePhotoBody = self.query(HOMEPAGE_PHOTO_KEY).await?;
        Ok(body.photo_url)
    }

    pub async fn create_gallery(&self, request: &CreateGalleryRequest) -> Result<Gallery, ClientError> {
        let gallery = self
            .send_json(reqwest::Method::POST, GALLERIES_KEY, Some(request))
            .await?;
        self.cache.invalidate(GALLERIES_KEY);
        Ok(gallery)
    }

    pub async fn update_gallery(&self, id: &str, patch: &GalleryPatch) -> Result<Gallery, ClientError> {
        let gallery = self
            .send_json(reqwest::Method::PUT, &format!("{}/{}", GALLERIES_KEY, id), Some(patch))
            .await?;
        self.cache.invalidate(GALLERIES_KEY);
        Ok(gallery)
    }

    pub async fn reorder_galleries(&self, gallery_ids: Vec<String>) -> Result<(), ClientError> {
        let body = ReorderGalleriesRequest { gallery_ids };
        let _: MessageBody = self
            .send_json(reqwest::Method::PUT, "/api/galleries/reorder", Some(&body))
            .await?;
        self.cache.invalidate(GALLERIES_KEY);
        Ok(())
    }

    pub async fn delete_gallery(&self, id: &str) -> Result<(), ClientError> {
        let _: MessageBody = self
            .send_json::<(), _>(reqwest::Method::DELETE, &format!("{}/{}", GALLERIES_KEY, id), None)
            .await?;
        self.cache.invalidate(GALLERIES_KEY);
        Ok(())
    }

    pub async fn set_hero_image(&self, gallery_id: &str, photo_id: &str) -> Result<Gallery, ClientError> {
        let body = HeroImageRequest {
            photo_id: photo_id.to_string(),
        };
        let gallery = self
            .send_json(
                reqwest::Method::PUT,
                &format!("{}/{}/hero-image", GALLERIES_KEY, gallery_id),
                Some(&body),
            )
            .await?;
        self.cache.invalidate(GALLERIES_KEY);
        Ok(gallery)
    }

    pub async fn upload_photos(&self, gallery_id: &str, files: Vec<FilePart>) -> Result<Vec<Photo>, ClientError> {
        let mut form = Form::new();
        for file in files {
            form = form.part(PHOTOS_FIELD, to_part(file)?);
        }
        let resp = self
            .http
            .post(self.url(&photos_key(gallery_id)))
            .multipart(form)
            .send()
            .await?;
        let photos = decode(resp).await?;
        self.cache.invalidate(GALLERIES_KEY);
        Ok(photos)
    }

    pub async fn update_photo(&self, id: &str, patch: &PhotoPatch) -> Result<Photo, ClientError> {
        let photo: Photo = self
            .send_json(reqwest::Method::PUT, &format!("/api/photos/{}", id), Some(patch))
            .await?;
        self.cache.invalidate(GALLERIES_KEY);
        Ok(photo)
    }

    /// Reorder locally first, then tell the server. The cached list is dropped afterwards
    /// either way, so a failed call is corrected by the next read.
    pub async fn reorder_photos(&self, gallery_id: &str, photo_ids: Vec<String>) -> Result<(), ClientError> {
        let key = photos_key(gallery_id);
        if let Some(cached) = self.cache.get::<Vec<Photo>>(&key) {
            self.cache.put(&key, &apply_local_reorder(&cached, &photo_ids));
        }
        let body = ReorderPhotosRequest { photo_ids };
        let result: Result<MessageBody, ClientError> = self
            .send_json(reqwest::Method::PUT, &format!("{}/reorder", key), Some(&body))
            .await;
        self.cache.invalidate(&key);
        result.map(|_| ())
    }

    pub async fn delete_photo(&self, id: &str) -> Result<(), ClientError> {
        let _: MessageBody = self
            .send_json::<(), _>(reqwest::Method::DELETE, &format!("/api/photos/{}", id), None)
            .await?;
        self.cache.invalidate(GALLERIES_KEY);
        Ok(())
    }

    pub async fn set_photo_order(&self, id: &str, order: i64) -> Result<(), ClientError> {
        let body = PhotoOrderRequest { order };
        let _: MessageBody = self
            .send_json(reqwest::Method::PUT, &format!("/api/photos/{}/order", id), Some(&body))
            .await?;
        self.cache.invalidate(GALLERIES_KEY);
        Ok(())
    }

    /// Returns whether the password was accepted and records it in the session.
    pub async fn login(&self, password: &str) -> Result<bool, ClientError> {
        let body = LoginRequest {
            password: password.to_string(),
        };
        let result: Result<LoginBody, ClientError> = self
            .send_json(reqwest::Method::POST, "/api/admin/login", Some(&body))
            .await;
        match result {
            Ok(login) => {
                self.session.set(login.authenticated);
                Ok(login.authenticated)
            }
            Err(ClientError::Status { status, .. }) if status == StatusCode::UNAUTHORIZED.as_u16() => {
                self.session.set(false);
                Ok(false)
            }
            Err(e) => {
                self.session.set(false);
                Err(e)
            }
        }
    }

    pub fn logout(&self) {
        self.session.set(false);
    }

    pub async fn change_password(&self, new_password: &str) -> Result<(), ClientError> {
        let body = ChangePasswordRequest {
            new_password: Some(new_password.to_string()),
        };
        let _: MessageBody = self
            .send_json(reqwest::Method::POST, "/api/admin/change-password", Some(&body))
            .await?;
        Ok(())
    }

    pub async fn upload_homepage_photo(&self, file: FilePart) -> Result<String, ClientError> {
        let form = Form::new().part(HOMEPAGE_PHOTO_FIELD, to_part(file)?);
        let resp = self
            .http
            .post(self.url(HOMEPAGE_PHOTO_KEY))
            .multipart(form)
            .send()
            .await?;
        let updated: HomepagePhotoUpdated = decode(resp).await?;
        self.cache.invalidate(HOMEPAGE_PHOTO_KEY);
        Ok(updated.photo_url)
    }
}

fn to_part(file: FilePart) -> Result<Part, ClientError> {
    Ok(Part::bytes(file.data)
        .file_name(file.file_name)
        .mime_str(&file.content_type)?)
}

/// Non-2xx responses become `ClientError::Status` carrying the server's message.
async fn decode<T: DeserializeOwned>(resp: reqwest::Response) -> Result<T, ClientError> {
    let status = resp.status();
    let bytes = resp.bytes().await?;
    if !status.is_success() {
        let message = serde_json::from_slice::<MessageBody>(&bytes)
            .map(|b| b.message)
            .unwrap_or_else(|_| String::from_utf8_lossy(&bytes).into_owned());
        return Err(ClientError::Status {
            status: status.as_u16(),
            message,
        });
    }
    Ok(serde_json::from_slice(&bytes)?)
}

/// Display order after a drag-and-drop: listed photos first with `order` set to their
/// position, unlisted photos after them unchanged.
pub fn apply_local_reorder(photos: &[Photo], ids: &[String]) -> Vec<Photo> {
    let mut seen = HashSet::new();
    let mut out = Vec::with_capacity(photos.len());
    for id in ids {
        if let Some(photo) = photos.iter().find(|p| &p.id == id) {
            if seen.insert(photo.id.clone()) {
                let mut photo = photo.clone();
                photo.order = out.len() as i64;
                out.push(photo);
            }
        }
    }
    out.extend(photos.iter().filter(|p| !seen.contains(&p.id)).cloned());
    out
}
