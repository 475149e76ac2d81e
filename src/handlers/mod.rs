//! HTTP handlers for galleries, photos and admin settings.

pub mod admin;
pub mod galleries;
pub mod photos;
pub use admin::*;
pub use galleries::*;
pub use photos::*;
