//! Image upload storage: type and size checks, collision-resistant names, and
//! files under the upload directory served at `/uploads/*`.

use crate::error::AppError;
use chrono::{DateTime, Utc};
use rand::Rng;
use std::path::{Path, PathBuf};
use tokio::fs;

/// MIME types accepted for photo uploads.
pub const ALLOWED_MIME_TYPES: &[&str] = &["image/jpeg", "image/png", "image/gif", "image/webp"];

/// Per-file size limit (50 MiB).
pub const DEFAULT_MAX_FILE_SIZE: usize = 50 * 1024 * 1024;

/// Route prefix the upload directory is served under.
pub const UPLOADS_ROUTE: &str = "/uploads";

/// One file taken from a multipart body, fully buffered.
#[derive(Debug, Clone)]
pub struct IncomingFile {
    pub original_name: String,
    pub content_type: Option<String>,
    pub data: Vec<u8>,
}

impl IncomingFile {
    pub fn is_allowed_type(&self) -> bool {
        self.content_type
            .as_deref()
            .map(|ct| ALLOWED_MIME_TYPES.contains(&ct))
            .unwrap_or(false)
    }
}

/// A file written to the upload directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredFile {
    pub filename: String,
    pub original_name: String,
    pub url: String,
}

#[derive(Debug, Clone)]
pub struct UploadStore {
    dir: PathBuf,
    max_file_size: usize,
}

impl UploadStore {
    pub async fn new(dir: impl Into<PathBuf>, max_file_size: usize) -> Result<Self, AppError> {
        let dir = dir.into();
        fs::create_dir_all(&dir).await?;
        tracing::info!(path = %dir.display(), "upload directory ready");
        Ok(UploadStore { dir, max_file_size })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn max_file_size(&self) -> usize {
        self.max_file_size
    }

    /// Check a batch before anything is written. An oversized file fails the whole
    /// batch; files of a disallowed type are dropped. An empty result is an error.
    pub fn accept(&self, files: Vec<IncomingFile>) -> Result<Vec<IncomingFile>, AppError> {
        if files.is_empty() {
            return Err(AppError::Upload("No files uploaded".into()));
        }
        if let Some(big) = files.iter().find(|f| f.data.len() > self.max_file_size) {
            return Err(AppError::Upload(format!(
                "File too large: {}. Maximum size is {}MB per file.",
                big.original_name,
                self.max_file_size / (1024 * 1024)
            )));
        }
        let total = files.len();
        let accepted: Vec<IncomingFile> = files
            .into_iter()
            .filter(|f| {
                let ok = f.is_allowed_type();
                if !ok {
                    tracing::warn!(
                        file = %f.original_name,
                        content_type = ?f.content_type,
                        "rejected upload with disallowed type"
                    );
                }
                ok
            })
            .collect();
        if accepted.is_empty() {
            return Err(AppError::Upload(format!(
                "No valid image files uploaded. Allowed types: {}",
                ALLOWED_MIME_TYPES.join(", ")
            )));
        }
        tracing::debug!(accepted = accepted.len(), total, "upload batch checked");
        Ok(accepted)
    }

    /// Write one file under a freshly generated name.
    pub async fn save(&self, file: &IncomingFile) -> Result<StoredFile, AppError> {
        let filename = generate_filename(&file.original_name, Utc::now());
        fs::write(self.dir.join(&filename), &file.data).await?;
        tracing::debug!(filename = %filename, size = file.data.len(), "stored upload");
        Ok(StoredFile {
            url: url_for(&filename),
            filename,
            original_name: file.original_name.clone(),
        })
    }

    /// Remove a stored file. Failures are logged and swallowed so the caller can
    /// still drop the database record.
    pub async fn remove_best_effort(&self, filename: &str) {
        let Some(name) = Path::new(filename).file_name() else {
            tracing::warn!(filename, "refusing to delete file with no name component");
            return;
        };
        if let Err(e) = fs::remove_file(self.dir.join(name)).await {
            tracing::warn!(filename, error = %e, "failed to delete file");
        }
    }
}

/// Public URL of a stored file.
pub fn url_for(filename: &str) -> String {
    format!("{}/{}", UPLOADS_ROUTE, filename)
}

/// `<unix millis>-<random below 1e9><original extension>`, e.g. `1718000000000-482913377.jpg`.
pub fn generate_filename(original_name: &str, now: DateTime<Utc>) -> String {
    let suffix: u32 = rand::thread_rng().gen_range(0..1_000_000_000);
    format!("{}-{}{}", now.timestamp_millis(), suffix, extension_of(original_name))
}

/// Extension with its leading dot, limited to ASCII alphanumerics. Empty when absent.
fn extension_of(original_name: &str) -> String {
    Path::new(original_name)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.chars().filter(|c| c.is_ascii_alphanumeric()).collect::<String>())
        .filter(|e| !e.is_empty())
        .map(|e| format!(".{}", e))
        .unwrap_or_default()
}
