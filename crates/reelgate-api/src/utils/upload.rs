//! Multipart form parsing and uploader identity.

use std::str::FromStr;

use axum::extract::Multipart;
use axum::http::HeaderMap;
use reelgate_core::{AppError, MediaType};

const ANONYMOUS_UPLOADER: &str = "anonymous@example.com";

/// Extract the file and media type from the upload form.
/// Exactly one field named "file" is accepted.
pub async fn extract_upload_form(
    mut multipart: Multipart,
) -> Result<(Vec<u8>, String, MediaType), AppError> {
    let mut file_data: Option<Vec<u8>> = None;
    let mut filename: Option<String> = None;
    let mut media_type: Option<MediaType> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("Failed to read multipart: {}", e)))?
    {
        let field_name = field.name().map(|s| s.to_string()).unwrap_or_default();

        match field_name.as_str() {
            "file" => {
                if file_data.is_some() {
                    return Err(AppError::Validation(
                        "Multiple file fields are not allowed; send exactly one field named 'file'"
                            .to_string(),
                    ));
                }
                filename = field.file_name().map(|s: &str| s.to_string());
                let data = field.bytes().await.map_err(|e| {
                    AppError::Validation(format!("Failed to read file data: {}", e))
                })?;
                file_data = Some(data.to_vec());
            }
            "media_type" => {
                let value = field.text().await.map_err(|e| {
                    AppError::Validation(format!("Failed to read media_type: {}", e))
                })?;
                media_type = Some(MediaType::from_str(&value)?);
            }
            _ => {}
        }
    }

    let file_data =
        file_data.ok_or_else(|| AppError::Validation("No file provided".to_string()))?;
    let filename =
        filename.ok_or_else(|| AppError::Validation("No filename provided".to_string()))?;
    let media_type =
        media_type.ok_or_else(|| AppError::Validation("No media_type provided".to_string()))?;

    Ok((file_data, filename, media_type))
}

/// Uploader identity from trusted proxy headers. Cloudflare Access sets the
/// first header; a plain reverse proxy can set the second. Without either
/// the upload is recorded as anonymous.
pub fn uploader_identity(headers: &HeaderMap) -> String {
    for header in ["cf-access-authenticated-user-email", "x-user-email"] {
        if let Some(value) = headers.get(header).and_then(|h| h.to_str().ok()) {
            let value = value.trim();
            if !value.is_empty() {
                return value.to_lowercase();
            }
        }
    }
    ANONYMOUS_UPLOADER.to_string()
}
