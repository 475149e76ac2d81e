//! Request extractors.

pub mod json;
pub mod multipart;

pub use json::ValidatedJson;
pub use multipart::collect_files;
