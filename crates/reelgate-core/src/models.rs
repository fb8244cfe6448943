//! Domain models for uploads and their review lifecycle.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Kind of media being uploaded; fixed at creation. Selects the
/// pending/published directory pair and the Plex library to rescan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum MediaType {
    Movie,
    Series,
}

impl MediaType {
    pub fn as_str(&self) -> &'static str {
        match self {
            MediaType::Movie => "movie",
            MediaType::Series => "series",
        }
    }

    /// Human-readable name used in notifications.
    pub fn display_name(&self) -> &'static str {
        match self {
            MediaType::Movie => "Movie",
            MediaType::Series => "TV Show",
        }
    }
}

impl std::fmt::Display for MediaType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for MediaType {
    type Err = crate::AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "movie" => Ok(MediaType::Movie),
            "series" | "tv" => Ok(MediaType::Series),
            other => Err(crate::AppError::Validation(format!(
                "Unknown media type '{}': expected 'movie' or 'series'",
                other
            ))),
        }
    }
}

/// Review status of an upload. Transitions are monotonic:
/// `Pending -> Approved` or `Pending -> Denied`, both terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum UploadStatus {
    Pending,
    Approved,
    Denied,
}

impl UploadStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            UploadStatus::Pending => "pending",
            UploadStatus::Approved => "approved",
            UploadStatus::Denied => "denied",
        }
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self, UploadStatus::Pending)
    }
}

impl std::fmt::Display for UploadStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One row per submitted file. The Upload Store owns all rows; `status` and
/// `reviewed_at` are only ever updated together, from the Pending state.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Upload {
    pub id: Uuid,
    /// Filename on disk in the pending area: `{id}_{sanitized original}`.
    pub stored_name: String,
    /// Filename as submitted; becomes the Plex-visible name on approval.
    pub original_name: String,
    pub media_type: MediaType,
    pub uploader: String,
    pub created_at: DateTime<Utc>,
    pub status: UploadStatus,
    pub reviewed_at: Option<DateTime<Utc>>,
    pub size_bytes: i64,
    pub review_notes: Option<String>,
}

/// Fields needed to persist a freshly saved upload. The id is generated
/// before the file write so the stored name can embed it.
#[derive(Debug, Clone)]
pub struct NewUpload {
    pub id: Uuid,
    pub stored_name: String,
    pub original_name: String,
    pub media_type: MediaType,
    pub uploader: String,
    pub size_bytes: i64,
}

/// API representation of an upload; omits the internal stored name.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadResponse {
    pub id: Uuid,
    pub original_name: String,
    pub media_type: MediaType,
    pub uploader: String,
    pub status: UploadStatus,
    pub created_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reviewed_at: Option<DateTime<Utc>>,
    pub size_bytes: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub review_notes: Option<String>,
}

impl From<Upload> for UploadResponse {
    fn from(u: Upload) -> Self {
        UploadResponse {
            id: u.id,
            original_name: u.original_name,
            media_type: u.media_type,
            uploader: u.uploader,
            status: u.status,
            created_at: u.created_at,
            reviewed_at: u.reviewed_at,
            size_bytes: u.size_bytes,
            review_notes: u.review_notes,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn media_type_parses_aliases() {
        assert_eq!(MediaType::from_str("movie").unwrap(), MediaType::Movie);
        assert_eq!(MediaType::from_str("Series").unwrap(), MediaType::Series);
        // legacy form accepted from older clients
        assert_eq!(MediaType::from_str("tv").unwrap(), MediaType::Series);
        assert!(MediaType::from_str("music").is_err());
    }

    #[test]
    fn status_terminality() {
        assert!(!UploadStatus::Pending.is_terminal());
        assert!(UploadStatus::Approved.is_terminal());
        assert!(UploadStatus::Denied.is_terminal());
    }

    #[test]
    fn response_omits_stored_name() {
        let upload = Upload {
            id: Uuid::new_v4(),
            stored_name: "abc_Movie.mkv".to_string(),
            original_name: "Movie.mkv".to_string(),
            media_type: MediaType::Movie,
            uploader: "a@x.com".to_string(),
            created_at: Utc::now(),
            status: UploadStatus::Pending,
            reviewed_at: None,
            size_bytes: 42,
            review_notes: None,
        };
        let json = serde_json::to_value(UploadResponse::from(upload)).expect("serialize");
        assert!(json.get("stored_name").is_none());
        assert_eq!(
            json.get("original_name").and_then(|v| v.as_str()),
            Some("Movie.mkv")
        );
        assert_eq!(json.get("status").and_then(|v| v.as_str()), Some("pending"));
    }
}
