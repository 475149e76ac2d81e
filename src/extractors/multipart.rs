//! Buffer uploaded files out of a multipart body.

use crate::error::AppError;
use crate::upload::IncomingFile;
use axum::extract::Multipart;

/// Collect every file sent under `field_name`. Other fields are skipped. Each file is read
/// chunk by chunk and the request fails as soon as one grows past `max_file_size`.
pub async fn collect_files(
    multipart: &mut Multipart,
    field_name: &str,
    max_file_size: usize,
) -> Result<Vec<IncomingFile>, AppError> {
    let mut files = Vec::new();
    while let Some(mut field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Upload(e.body_text()))?
    {
        if field.name() != Some(field_name) {
            continue;
        }
        let original_name = field.file_name().unwrap_or("upload").to_string();
        let content_type = field.content_type().map(str::to_string);
        let mut data = Vec::new();
        while let Some(chunk) = field.chunk().await.map_err(|e| AppError::Upload(e.body_text()))? {
            if data.len() + chunk.len() > max_file_size {
                return Err(AppError::Upload(format!(
                    "File too large: {}. Maximum size is {}MB per file.",
                    original_name,
                    max_file_size / (1024 * 1024)
                )));
            }
            data.extend_from_slice(&chunk);
        }
        files.push(IncomingFile {
            original_name,
            content_type,
            data,
        });
    }
    Ok(files)
}
