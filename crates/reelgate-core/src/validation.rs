//! Upload validation
//!
//! Checks run before any byte is written to the pending area: filename
//! sanitization, extension allow-list, and the optional size cap.

use crate::config::Config;
use crate::error::AppError;

const MAX_FILENAME_LENGTH: usize = 255;

/// Sanitize a filename to prevent path traversal and invalid characters.
/// Returns an error if the filename contains a traversal attempt.
pub fn sanitize_filename(filename: &str) -> Result<String, AppError> {
    if filename.contains("..") {
        return Err(AppError::Validation(
            "Filename contains invalid path traversal".to_string(),
        ));
    }

    let path = std::path::Path::new(filename);
    let filename_only = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or(filename);

    let sanitized: String = filename_only
        .chars()
        .take(MAX_FILENAME_LENGTH)
        .map(|c| {
            if c.is_alphanumeric() || c == '.' || c == '-' || c == '_' || c == ' ' {
                c
            } else {
                '_'
            }
        })
        .collect();

    let sanitized = sanitized.trim().to_string();
    if sanitized.is_empty() {
        return Err(AppError::Validation("Filename is empty".to_string()));
    }

    Ok(sanitized)
}

/// Validates incoming uploads against the configured policy.
#[derive(Debug, Clone)]
pub struct UploadValidator {
    allowed_extensions: Vec<String>,
    max_size_bytes: Option<u64>,
}

impl UploadValidator {
    pub fn new(allowed_extensions: Vec<String>, max_size_bytes: Option<u64>) -> Self {
        Self {
            allowed_extensions,
            max_size_bytes,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(
            config.allowed_extensions.clone(),
            config.max_upload_size_bytes(),
        )
    }

    /// Validate a submission and return the sanitized filename to store
    /// under. Fails before anything touches disk.
    pub fn validate(&self, original_name: &str, size_bytes: u64) -> Result<String, AppError> {
        if original_name.trim().is_empty() {
            return Err(AppError::Validation("No filename provided".to_string()));
        }

        if size_bytes == 0 {
            return Err(AppError::Validation("File is empty".to_string()));
        }

        if let Some(max) = self.max_size_bytes {
            if size_bytes > max {
                return Err(AppError::PayloadTooLarge(format!(
                    "File exceeds maximum size of {} MB",
                    max / 1024 / 1024
                )));
            }
        }

        let sanitized = sanitize_filename(original_name)?;

        let extension = sanitized.rsplit_once('.').map(|(_, ext)| ext.to_lowercase());
        match extension {
            Some(ext) if self.allowed_extensions.contains(&ext) => Ok(sanitized),
            _ => Err(AppError::Validation(format!(
                "File type not allowed. Accepted extensions: {}",
                self.allowed_extensions.join(", ")
            ))),
        }
    }
}
