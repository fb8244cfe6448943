use chrono::Utc;
use reelgate_core::{AppError, NewUpload, Upload, UploadStatus};
use sqlx::SqlitePool;
use uuid::Uuid;

/// Repository for upload records
#[derive(Clone)]
pub struct UploadRepository {
    pool: SqlitePool,
}

impl UploadRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Persist a new upload in the Pending state.
    pub async fn create(&self, new: NewUpload) -> Result<Upload, AppError> {
        let upload = Upload {
            id: new.id,
            stored_name: new.stored_name,
            original_name: new.original_name,
            media_type: new.media_type,
            uploader: new.uploader,
            created_at: Utc::now(),
            status: UploadStatus::Pending,
            reviewed_at: None,
            size_bytes: new.size_bytes,
            review_notes: None,
        };

        // Dynamic queries keep the build independent of a prepared database
        sqlx::query(
            r#"
            INSERT INTO uploads (
                id, stored_name, original_name, media_type, uploader,
                created_at, status, reviewed_at, size_bytes, review_notes
            )
            VALUES (?, ?, ?, ?, ?, ?, 'pending', NULL, ?, NULL)
            "#,
        )
        .bind(upload.id)
        .bind(&upload.stored_name)
        .bind(&upload.original_name)
        .bind(upload.media_type)
        .bind(&upload.uploader)
        .bind(upload.created_at)
        .bind(upload.size_bytes)
        .execute(&self.pool)
        .await?;

        Ok(upload)
    }

    pub async fn get(&self, id: Uuid) -> Result<Option<Upload>, AppError> {
        let row = sqlx::query_as::<_, Upload>(
            r#"
            SELECT id, stored_name, original_name, media_type, uploader,
                   created_at, status, reviewed_at, size_bytes, review_notes
            FROM uploads
            WHERE id = ?
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }

    /// Uploads still awaiting review, newest first.
    pub async fn list_pending(&self) -> Result<Vec<Upload>, AppError> {
        let rows = sqlx::query_as::<_, Upload>(
            r#"
            SELECT id, stored_name, original_name, media_type, uploader,
                   created_at, status, reviewed_at, size_bytes, review_notes
            FROM uploads
            WHERE status = 'pending'
            ORDER BY created_at DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    /// Recently reviewed uploads, most recent review first.
    pub async fn list_processed(&self, limit: i64) -> Result<Vec<Upload>, AppError> {
        let rows = sqlx::query_as::<_, Upload>(
            r#"
            SELECT id, stored_name, original_name, media_type, uploader,
                   created_at, status, reviewed_at, size_bytes, review_notes
            FROM uploads
            WHERE status != 'pending'
            ORDER BY reviewed_at DESC
            LIMIT ?
            "#,
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    pub async fn list_by_uploader(&self, uploader: &str) -> Result<Vec<Upload>, AppError> {
        let rows = sqlx::query_as::<_, Upload>(
            r#"
            SELECT id, stored_name, original_name, media_type, uploader,
                   created_at, status, reviewed_at, size_bytes, review_notes
            FROM uploads
            WHERE uploader = ?
            ORDER BY created_at DESC
            "#,
        )
        .bind(uploader)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    /// Atomically move an upload out of the Pending state.
    ///
    /// The UPDATE is conditional on `status = 'pending'`, so under
    /// concurrent reviews exactly one caller wins; the others get
    /// `AlreadyReviewed` (or `NotFound` if the id never existed).
    pub async fn transition(
        &self,
        id: Uuid,
        status: UploadStatus,
        notes: Option<String>,
    ) -> Result<Upload, AppError> {
        if !status.is_terminal() {
            return Err(AppError::Internal(
                "Transition target must be a terminal status".to_string(),
            ));
        }

        let reviewed_at = Utc::now();
        let result = sqlx::query(
            r#"
            UPDATE uploads
            SET status = ?, reviewed_at = ?, review_notes = ?
            WHERE id = ? AND status = 'pending'
            "#,
        )
        .bind(status)
        .bind(reviewed_at)
        .bind(&notes)
        .bind(id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return match self.get(id).await? {
                Some(existing) => Err(AppError::AlreadyReviewed(format!(
                    "Upload {} was already {}",
                    id, existing.status
                ))),
                None => Err(AppError::NotFound(format!("Upload {} not found", id))),
            };
        }

        self.get(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Upload {} not found", id)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reelgate_core::MediaType;
    use sqlx::sqlite::SqlitePoolOptions;

    async fn test_pool() -> SqlitePool {
        // A single connection keeps every query on the same in-memory database
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .unwrap();
        let migrations = std::path::Path::new(env!("CARGO_MANIFEST_DIR")).join("../../migrations");
        sqlx::migrate::Migrator::new(migrations)
            .await
            .unwrap()
            .run(&pool)
            .await
            .unwrap();
        pool
    }

    fn new_upload(name: &str, uploader: &str) -> NewUpload {
        let id = Uuid::new_v4();
        NewUpload {
            id,
            stored_name: format!("{}_{}", id, name),
            original_name: name.to_string(),
            media_type: MediaType::Movie,
            uploader: uploader.to_string(),
            size_bytes: 1024,
        }
    }

    #[tokio::test]
    async fn create_and_get_roundtrip() {
        let repo = UploadRepository::new(test_pool().await);
        let created = repo.create(new_upload("Movie.mkv", "a@x.com")).await.unwrap();

        let fetched = repo.get(created.id).await.unwrap().unwrap();
        assert_eq!(fetched.id, created.id);
        assert_eq!(fetched.original_name, "Movie.mkv");
        assert_eq!(fetched.status, UploadStatus::Pending);
        assert_eq!(fetched.reviewed_at, None);
        assert_eq!(fetched.size_bytes, 1024);
    }

    #[tokio::test]
    async fn get_unknown_id_returns_none() {
        let repo = UploadRepository::new(test_pool().await);
        assert!(repo.get(Uuid::new_v4()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn approve_sets_status_and_timestamp() {
        let repo = UploadRepository::new(test_pool().await);
        let created = repo.create(new_upload("Movie.mkv", "a@x.com")).await.unwrap();

        let approved = repo
            .transition(created.id, UploadStatus::Approved, None)
            .await
            .unwrap();
        assert_eq!(approved.status, UploadStatus::Approved);
        assert!(approved.reviewed_at.is_some());
        assert_eq!(approved.review_notes, None);
    }

    #[tokio::test]
    async fn deny_records_notes() {
        let repo = UploadRepository::new(test_pool().await);
        let created = repo.create(new_upload("Movie.mkv", "a@x.com")).await.unwrap();

        let denied = repo
            .transition(
                created.id,
                UploadStatus::Denied,
                Some("wrong cut".to_string()),
            )
            .await
            .unwrap();
        assert_eq!(denied.status, UploadStatus::Denied);
        assert_eq!(denied.review_notes.as_deref(), Some("wrong cut"));
    }

    #[tokio::test]
    async fn second_transition_is_conflict() {
        let repo = UploadRepository::new(test_pool().await);
        let created = repo.create(new_upload("Movie.mkv", "a@x.com")).await.unwrap();

        repo.transition(created.id, UploadStatus::Approved, None)
            .await
            .unwrap();
        let err = repo
            .transition(created.id, UploadStatus::Denied, None)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::AlreadyReviewed(_)));

        // the first outcome survives
        let fetched = repo.get(created.id).await.unwrap().unwrap();
        assert_eq!(fetched.status, UploadStatus::Approved);
    }

    #[tokio::test]
    async fn transition_unknown_id_is_not_found() {
        let repo = UploadRepository::new(test_pool().await);
        let err = repo
            .transition(Uuid::new_v4(), UploadStatus::Approved, None)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn pending_and_processed_lists_are_disjoint() {
        let repo = UploadRepository::new(test_pool().await);
        let first = repo.create(new_upload("First.mkv", "a@x.com")).await.unwrap();
        let second = repo.create(new_upload("Second.mkv", "b@x.com")).await.unwrap();

        repo.transition(first.id, UploadStatus::Denied, None)
            .await
            .unwrap();

        let pending = repo.list_pending().await.unwrap();
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].id, second.id);

        let processed = repo.list_processed(50).await.unwrap();
        assert_eq!(processed.len(), 1);
        assert_eq!(processed[0].id, first.id);
    }

    #[tokio::test]
    async fn processed_list_honors_limit() {
        let repo = UploadRepository::new(test_pool().await);
        for i in 0..3 {
            let created = repo
                .create(new_upload(&format!("Movie{}.mkv", i), "a@x.com"))
                .await
                .unwrap();
            repo.transition(created.id, UploadStatus::Approved, None)
                .await
                .unwrap();
        }
        assert_eq!(repo.list_processed(2).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn uploader_history_is_scoped() {
        let repo = UploadRepository::new(test_pool().await);
        repo.create(new_upload("Mine.mkv", "me@x.com")).await.unwrap();
        repo.create(new_upload("Theirs.mkv", "them@x.com")).await.unwrap();

        let mine = repo.list_by_uploader("me@x.com").await.unwrap();
        assert_eq!(mine.len(), 1);
        assert_eq!(mine[0].original_name, "Mine.mkv");
    }
}
