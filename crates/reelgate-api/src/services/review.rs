//! The review workflow.
//!
//! Uploads land in a pending directory and a Pending row. A reviewer then
//! approves (file moves into the Plex-visible directory) or denies (file is
//! deleted). File-system mutations happen before the status commit, so a
//! failed move or delete leaves the upload pending and retryable. The
//! commit itself is a compare-and-set in the store, which makes concurrent
//! reviews race-safe. Notifications and Plex rescans run after the commit
//! and never affect the outcome.

use std::path::Path;
use std::sync::Arc;

use reelgate_core::{AppError, Config, MediaType, NewUpload, Upload, UploadStatus, UploadValidator};
use reelgate_db::UploadRepository;
use uuid::Uuid;

use crate::services::notify::Notifier;
use crate::services::plex::PlexClient;

#[derive(Clone)]
pub struct ReviewService {
    config: Arc<Config>,
    uploads: UploadRepository,
    validator: UploadValidator,
    notifier: Notifier,
    plex: PlexClient,
}

impl ReviewService {
    pub fn new(
        config: Arc<Config>,
        uploads: UploadRepository,
        notifier: Notifier,
        plex: PlexClient,
    ) -> Self {
        let validator = UploadValidator::from_config(&config);
        Self {
            config,
            uploads,
            validator,
            notifier,
            plex,
        }
    }

    /// Accept a new upload: validate, write the file into the pending
    /// directory, then record it. Nothing touches disk if validation fails.
    pub async fn submit(
        &self,
        original_name: &str,
        media_type: MediaType,
        uploader: &str,
        data: &[u8],
    ) -> Result<Upload, AppError> {
        let sanitized = self.validator.validate(original_name, data.len() as u64)?;

        let id = Uuid::new_v4();
        let stored_name = format!("{}_{}", id, sanitized);
        let pending_path = self.config.pending_dir(media_type).join(&stored_name);

        tokio::fs::write(&pending_path, data).await?;

        let new_upload = NewUpload {
            id,
            stored_name,
            original_name: sanitized,
            media_type,
            uploader: uploader.to_string(),
            size_bytes: data.len() as i64,
        };

        let upload = match self.uploads.create(new_upload).await {
            Ok(upload) => upload,
            Err(err) => {
                // Do not leave an orphan file behind when the insert fails
                if let Err(cleanup_err) = tokio::fs::remove_file(&pending_path).await {
                    tracing::warn!(
                        path = %pending_path.display(),
                        error = %cleanup_err,
                        "Failed to clean up pending file after store error"
                    );
                }
                return Err(err);
            }
        };

        tracing::info!(
            upload_id = %upload.id,
            file = %upload.original_name,
            media_type = %upload.media_type,
            uploader = %upload.uploader,
            size_bytes = upload.size_bytes,
            "Upload received"
        );

        let notifier = self.notifier.clone();
        let for_notify = upload.clone();
        tokio::spawn(async move {
            notifier.upload_received(&for_notify).await;
        });

        Ok(upload)
    }

    /// Approve a pending upload: move its file into the published directory,
    /// then commit the status change.
    pub async fn approve(&self, id: Uuid) -> Result<Upload, AppError> {
        let upload = self.get_pending(id).await?;

        let src = self
            .config
            .pending_dir(upload.media_type)
            .join(&upload.stored_name);
        let dst = self
            .config
            .published_dir(upload.media_type)
            .join(&upload.original_name);

        if tokio::fs::metadata(&src).await.is_err() {
            return Err(AppError::Storage(format!(
                "Pending file missing for upload {}: {}",
                id,
                src.display()
            )));
        }

        move_file(&src, &dst).await?;

        let updated = match self
            .uploads
            .transition(id, UploadStatus::Approved, None)
            .await
        {
            Ok(updated) => updated,
            Err(err) => {
                // The file was already moved but the row left Pending first.
                // There is no rollback here; flag it for an operator.
                tracing::error!(
                    upload_id = %id,
                    moved_to = %dst.display(),
                    error = %err,
                    "Approval file move succeeded but the status commit did not"
                );
                return Err(err);
            }
        };

        tracing::info!(
            upload_id = %updated.id,
            file = %updated.original_name,
            published_to = %dst.display(),
            "Upload approved"
        );

        let notifier = self.notifier.clone();
        let plex = self.plex.clone();
        let for_notify = updated.clone();
        tokio::spawn(async move {
            notifier.upload_approved(&for_notify).await;
            if let Err(err) = plex.rescan(for_notify.media_type).await {
                tracing::warn!(error = %err, "Plex rescan failed after approval");
            }
        });

        Ok(updated)
    }

    /// Deny a pending upload: delete its file, then commit the status
    /// change. A file that is already gone does not block the denial.
    pub async fn deny(&self, id: Uuid, notes: Option<String>) -> Result<Upload, AppError> {
        let upload = self.get_pending(id).await?;

        let pending_path = self
            .config
            .pending_dir(upload.media_type)
            .join(&upload.stored_name);

        // The goal state is "file gone"; an absent file already satisfies it
        // and other delete failures leave an orphan but do not block the
        // denial itself.
        match tokio::fs::remove_file(&pending_path).await {
            Ok(()) => {}
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                tracing::warn!(
                    upload_id = %id,
                    path = %pending_path.display(),
                    "Pending file already absent while denying"
                );
            }
            Err(err) => {
                tracing::warn!(
                    upload_id = %id,
                    path = %pending_path.display(),
                    error = %err,
                    "Failed to delete pending file while denying, leaving it behind"
                );
            }
        }

        let notes = notes.map(|n| n.trim().to_string()).filter(|n| !n.is_empty());

        let updated = match self
            .uploads
            .transition(id, UploadStatus::Denied, notes)
            .await
        {
            Ok(updated) => updated,
            Err(err) => {
                tracing::error!(
                    upload_id = %id,
                    deleted = %pending_path.display(),
                    error = %err,
                    "Denial file delete succeeded but the status commit did not"
                );
                return Err(err);
            }
        };

        tracing::info!(
            upload_id = %updated.id,
            file = %updated.original_name,
            "Upload denied"
        );

        let notifier = self.notifier.clone();
        let for_notify = updated.clone();
        tokio::spawn(async move {
            notifier.upload_denied(&for_notify).await;
        });

        Ok(updated)
    }

    /// Fetch the upload and reject review actions on terminal rows early.
    /// The transition CAS still decides races that slip past this check.
    async fn get_pending(&self, id: Uuid) -> Result<Upload, AppError> {
        let upload = self
            .uploads
            .get(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Upload {} not found", id)))?;

        if upload.status.is_terminal() {
            return Err(AppError::AlreadyReviewed(format!(
                "Upload {} was already {}",
                id, upload.status
            )));
        }

        Ok(upload)
    }
}

/// Move a file, falling back to copy + remove when rename fails (e.g. the
/// pending and published directories are on different filesystems).
async fn move_file(src: &Path, dst: &Path) -> Result<(), AppError> {
    if tokio::fs::rename(src, dst).await.is_ok() {
        return Ok(());
    }

    tokio::fs::copy(src, dst).await.map_err(|e| {
        AppError::Storage(format!(
            "Failed to move {} to {}: {}",
            src.display(),
            dst.display(),
            e
        ))
    })?;

    if let Err(err) = tokio::fs::remove_file(src).await {
        tracing::warn!(
            path = %src.display(),
            error = %err,
            "Moved file copied but the source could not be removed"
        );
    }

    Ok(())
}
