use chrono::{DateTime, Utc};
use reelgate_core::AppError;
use sqlx::SqlitePool;

/// The single admin account row.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct AdminCredential {
    pub password_hash: String,
    pub must_change_password: bool,
    pub created_at: DateTime<Utc>,
    pub last_login: Option<DateTime<Utc>>,
}

/// Repository for the admin credential singleton
#[derive(Clone)]
pub struct AdminRepository {
    pool: SqlitePool,
}

impl AdminRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Insert the initial credential if none exists yet. Returns true when
    /// the row was created by this call.
    pub async fn seed_if_absent(&self, password_hash: &str) -> Result<bool, AppError> {
        let result = sqlx::query(
            r#"
            INSERT OR IGNORE INTO admin_credentials (id, password_hash, must_change_password, created_at)
            VALUES (1, ?, 1, ?)
            "#,
        )
        .bind(password_hash)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() == 1)
    }

    pub async fn get(&self) -> Result<Option<AdminCredential>, AppError> {
        let row = sqlx::query_as::<_, AdminCredential>(
            r#"
            SELECT password_hash, must_change_password, created_at, last_login
            FROM admin_credentials
            WHERE id = 1
            "#,
        )
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }

    /// Store a new password hash and clear the forced-change flag.
    pub async fn update_password(&self, password_hash: &str) -> Result<(), AppError> {
        sqlx::query(
            r#"
            UPDATE admin_credentials
            SET password_hash = ?, must_change_password = 0
            WHERE id = 1
            "#,
        )
        .bind(password_hash)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    pub async fn touch_last_login(&self) -> Result<(), AppError> {
        sqlx::query(
            r#"
            UPDATE admin_credentials
            SET last_login = ?
            WHERE id = 1
            "#,
        )
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}
