//! Configuration module
//!
//! All settings come from the environment (a `.env` file is honored in
//! development). `from_env` applies defaults, `validate` enforces the
//! invariants and creates the staging directories.

use std::env;
use std::path::{Path, PathBuf};

use crate::models::MediaType;

const SERVER_PORT: u16 = 8080;
const SMTP_PORT: u16 = 587;
const JWT_EXPIRY_HOURS: i64 = 24;

/// Video container extensions accepted by default.
const DEFAULT_ALLOWED_EXTENSIONS: &str = "mp4,mkv,avi,mov,wmv,flv,webm,m4v,mpg,mpeg,ts,vob,iso";

#[derive(Clone, Debug)]
pub struct Config {
    pub app_name: String,
    /// Public base URL, used in notification deep links.
    pub app_url: String,
    pub server_port: u16,
    pub database_path: PathBuf,
    // Staging and published directories per media type
    pub pending_movies_path: PathBuf,
    pub pending_tv_path: PathBuf,
    pub plex_movies_path: PathBuf,
    pub plex_tv_path: PathBuf,
    // Plex server integration (optional)
    pub plex_url: Option<String>,
    pub plex_token: Option<String>,
    pub plex_movies_library: String,
    pub plex_tv_library: String,
    // Notifications
    pub admin_emails: Vec<String>,
    pub email_enabled: bool,
    pub smtp_server: Option<String>,
    pub smtp_port: u16,
    pub smtp_username: Option<String>,
    pub smtp_password: Option<String>,
    pub smtp_from: Option<String>,
    pub smtp_use_tls: bool,
    pub discord_webhook_url: Option<String>,
    // Upload policy
    pub allowed_extensions: Vec<String>,
    /// Maximum upload size in megabytes. 0 means unlimited.
    pub max_upload_size_mb: u64,
    // Auth
    pub jwt_secret: String,
    pub jwt_expiry_hours: i64,
    pub environment: String,
}

impl Config {
    pub fn from_env() -> Result<Self, anyhow::Error> {
        dotenvy::dotenv().ok();

        let environment = env::var("ENVIRONMENT")
            .or_else(|_| env::var("APP_ENV"))
            .unwrap_or_else(|_| "development".to_string());

        let allowed_extensions = env::var("ALLOWED_EXTENSIONS")
            .unwrap_or_else(|_| DEFAULT_ALLOWED_EXTENSIONS.to_string())
            .split(',')
            .map(|s| s.trim().trim_start_matches('.').to_lowercase())
            .filter(|s| !s.is_empty())
            .collect();

        let admin_emails = env::var("ADMIN_EMAILS")
            .unwrap_or_default()
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let config = Config {
            app_name: env::var("APP_NAME").unwrap_or_else(|_| "Plex Upload Portal".to_string()),
            app_url: env::var("APP_URL").unwrap_or_else(|_| "http://localhost:8080".to_string()),
            server_port: env::var("PORT")
                .unwrap_or_else(|_| SERVER_PORT.to_string())
                .parse()
                .map_err(|_| anyhow::anyhow!("PORT must be a valid number"))?,
            database_path: env::var("DATABASE_PATH")
                .unwrap_or_else(|_| "data/uploads.db".to_string())
                .into(),
            pending_movies_path: env::var("PENDING_MOVIES_PATH")
                .unwrap_or_else(|_| "data/pending/movies".to_string())
                .into(),
            pending_tv_path: env::var("PENDING_TV_PATH")
                .unwrap_or_else(|_| "data/pending/tv".to_string())
                .into(),
            plex_movies_path: env::var("PLEX_MOVIES_PATH")
                .unwrap_or_else(|_| "data/plex/movies".to_string())
                .into(),
            plex_tv_path: env::var("PLEX_TV_PATH")
                .unwrap_or_else(|_| "data/plex/tv".to_string())
                .into(),
            plex_url: env::var("PLEX_URL").ok().filter(|s| !s.is_empty()),
            plex_token: env::var("PLEX_TOKEN").ok().filter(|s| !s.is_empty()),
            plex_movies_library: env::var("PLEX_MOVIES_LIBRARY")
                .unwrap_or_else(|_| "Movies".to_string()),
            plex_tv_library: env::var("PLEX_TV_LIBRARY")
                .unwrap_or_else(|_| "TV Shows".to_string()),
            admin_emails,
            email_enabled: env::var("EMAIL_ENABLED")
                .unwrap_or_else(|_| "false".to_string())
                .to_lowercase()
                .parse()
                .unwrap_or(false),
            smtp_server: env::var("SMTP_SERVER").ok().filter(|s| !s.is_empty()),
            smtp_port: env::var("SMTP_PORT")
                .unwrap_or_else(|_| SMTP_PORT.to_string())
                .parse()
                .unwrap_or(SMTP_PORT),
            smtp_username: env::var("SMTP_USERNAME").ok().filter(|s| !s.is_empty()),
            smtp_password: env::var("SMTP_PASSWORD").ok().filter(|s| !s.is_empty()),
            smtp_from: env::var("SMTP_FROM").ok().filter(|s| !s.is_empty()),
            smtp_use_tls: env::var("SMTP_USE_TLS")
                .unwrap_or_else(|_| "true".to_string())
                .to_lowercase()
                .parse()
                .unwrap_or(true),
            discord_webhook_url: env::var("DISCORD_WEBHOOK_URL")
                .ok()
                .filter(|s| !s.is_empty()),
            allowed_extensions,
            max_upload_size_mb: env::var("MAX_UPLOAD_SIZE_MB")
                .unwrap_or_else(|_| "0".to_string())
                .parse()
                .unwrap_or(0),
            jwt_secret: env::var("JWT_SECRET")
                .map_err(|_| anyhow::anyhow!("JWT_SECRET must be set for authentication"))?,
            jwt_expiry_hours: env::var("JWT_EXPIRY_HOURS")
                .unwrap_or_else(|_| JWT_EXPIRY_HOURS.to_string())
                .parse()
                .unwrap_or(JWT_EXPIRY_HOURS),
            environment,
        };

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        if self.jwt_secret.len() < 32 {
            return Err(anyhow::anyhow!(
                "JWT_SECRET must be at least 32 characters long"
            ));
        }

        if self.email_enabled && (self.smtp_server.is_none() || self.smtp_from.is_none()) {
            return Err(anyhow::anyhow!(
                "EMAIL_ENABLED=true requires SMTP_SERVER and SMTP_FROM to be set"
            ));
        }

        if self.allowed_extensions.is_empty() {
            return Err(anyhow::anyhow!("ALLOWED_EXTENSIONS cannot be empty"));
        }

        if let Some(parent) = self.database_path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        for dir in [
            &self.pending_movies_path,
            &self.pending_tv_path,
            &self.plex_movies_path,
            &self.plex_tv_path,
        ] {
            std::fs::create_dir_all(dir)?;
        }

        Ok(())
    }

    /// Staging directory where new uploads of this type land.
    pub fn pending_dir(&self, media_type: MediaType) -> &Path {
        match media_type {
            MediaType::Movie => &self.pending_movies_path,
            MediaType::Series => &self.pending_tv_path,
        }
    }

    /// Plex-visible directory approved uploads are moved into.
    pub fn published_dir(&self, media_type: MediaType) -> &Path {
        match media_type {
            MediaType::Movie => &self.plex_movies_path,
            MediaType::Series => &self.plex_tv_path,
        }
    }

    /// Plex library section title for this media type.
    pub fn plex_library(&self, media_type: MediaType) -> &str {
        match media_type {
            MediaType::Movie => &self.plex_movies_library,
            MediaType::Series => &self.plex_tv_library,
        }
    }

    pub fn plex_enabled(&self) -> bool {
        self.plex_url.is_some() && self.plex_token.is_some()
    }

    pub fn discord_enabled(&self) -> bool {
        self.discord_webhook_url.is_some()
    }

    /// Maximum upload size in bytes; `None` when unlimited.
    pub fn max_upload_size_bytes(&self) -> Option<u64> {
        if self.max_upload_size_mb == 0 {
            None
        } else {
            Some(self.max_upload_size_mb * 1024 * 1024)
        }
    }

    pub fn is_production(&self) -> bool {
        let env = self.environment.to_lowercase();
        env == "production" || env == "prod"
    }
}
