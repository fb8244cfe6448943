use std::path::Path;
use std::sync::Arc;

use axum_test::TestServer;
use reelgate_api::auth::middleware::AuthFailureLimiter;
use reelgate_api::auth::password;
use reelgate_api::services::notify::{Notifier, NotifyEvent};
use reelgate_api::services::plex::PlexClient;
use reelgate_api::services::review::ReviewService;
use reelgate_api::setup::routes::build_router;
use reelgate_api::state::AppState;
use reelgate_core::Config;
use reelgate_db::{AdminRepository, UploadRepository};
use sqlx::sqlite::SqlitePoolOptions;
use tempfile::TempDir;
use tokio::sync::mpsc;

pub const DEFAULT_PASSWORD: &str = "admin";

/// Test application over an in-memory database and a throwaway directory
/// tree, with notifications and Plex turned off.
pub struct TestApp {
    pub state: AppState,
    pub server: TestServer,
    pub _temp_dir: TempDir,
}

pub fn test_config(root: &Path) -> Config {
    Config {
        app_name: "Plex Upload Portal".to_string(),
        app_url: "http://localhost:8080".to_string(),
        server_port: 8080,
        database_path: root.join("uploads.db"),
        pending_movies_path: root.join("pending/movies"),
        pending_tv_path: root.join("pending/tv"),
        plex_movies_path: root.join("plex/movies"),
        plex_tv_path: root.join("plex/tv"),
        plex_url: None,
        plex_token: None,
        plex_movies_library: "Movies".to_string(),
        plex_tv_library: "TV Shows".to_string(),
        admin_emails: vec![],
        email_enabled: false,
        smtp_server: None,
        smtp_port: 587,
        smtp_username: None,
        smtp_password: None,
        smtp_from: None,
        smtp_use_tls: true,
        discord_webhook_url: None,
        allowed_extensions: vec!["mkv".to_string(), "mp4".to_string()],
        max_upload_size_mb: 0,
        jwt_secret: "integration-test-secret-0123456789ab".to_string(),
        jwt_expiry_hours: 24,
        environment: "development".to_string(),
    }
}

pub async fn setup_test_app() -> TestApp {
    setup_test_app_with(Notifier::disabled()).await
}

/// Like `setup_test_app`, but the notifier reports every dispatch on the
/// returned channel.
#[allow(dead_code)]
pub async fn setup_observed_app() -> (TestApp, mpsc::UnboundedReceiver<NotifyEvent>) {
    let (notifier, events) = Notifier::observed();
    (setup_test_app_with(notifier).await, events)
}

async fn setup_test_app_with(notifier: Notifier) -> TestApp {
    let temp_dir = tempfile::tempdir().expect("Failed to create temp directory");
    let config = test_config(temp_dir.path());
    config.validate().expect("Test config should validate");

    // A single connection keeps every query on the same in-memory database
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .expect("Failed to open in-memory database");

    let migrations = Path::new(env!("CARGO_MANIFEST_DIR")).join("../../migrations");
    sqlx::migrate::Migrator::new(migrations)
        .await
        .expect("Failed to load migrations")
        .run(&pool)
        .await
        .expect("Failed to run migrations");

    let uploads = UploadRepository::new(pool.clone());
    let admin = AdminRepository::new(pool);

    let default_hash = password::hash_password(DEFAULT_PASSWORD).expect("hash");
    admin.seed_if_absent(&default_hash).await.expect("seed");

    let config = Arc::new(config);
    let review = ReviewService::new(
        config.clone(),
        uploads.clone(),
        notifier,
        PlexClient::disabled(),
    );

    let state = AppState {
        config,
        uploads,
        admin,
        review,
        login_limiter: Arc::new(AuthFailureLimiter::new(5, 300)),
    };

    let server = TestServer::new(build_router(state.clone())).expect("Failed to start test server");

    TestApp {
        state,
        server,
        _temp_dir: temp_dir,
    }
}
