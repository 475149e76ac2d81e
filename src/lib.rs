//! Portfolio API: REST backend for a photography portfolio (galleries, photos,
//! homepage background, admin password) with swappable storage backends.

pub mod client;
pub mod config;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod model;
pub mod response;
pub mod routes;
pub mod state;
pub mod store;
pub mod upload;
pub mod validation;
pub mod wire;

pub use client::{ClientError, PortfolioClient};
pub use config::ServerConfig;
pub use error::AppError;
pub use model::{AdminSetting, Gallery, GalleryPatch, NewGallery, NewPhoto, Photo, PhotoPatch};
pub use routes::{api_routes, app, common_routes};
pub use state::AppState;
pub use store::{seed_defaults, MemStorage, PgStorage, Storage};
pub use upload::UploadStore;
