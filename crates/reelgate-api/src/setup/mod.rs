//! Application wiring: database, services, routes, server.

pub mod database;
pub mod routes;
pub mod server;

use std::sync::Arc;

use anyhow::Result;
use axum::Router;
use reelgate_core::Config;
use reelgate_db::{AdminRepository, UploadRepository};

use crate::auth::middleware::AuthFailureLimiter;
use crate::auth::password;
use crate::services::notify::Notifier;
use crate::services::plex::PlexClient;
use crate::services::review::ReviewService;
use crate::state::AppState;

/// Initial admin password; a change is forced on first login.
const DEFAULT_ADMIN_PASSWORD: &str = "admin";

const LOGIN_MAX_FAILURES: u32 = 5;
const LOGIN_WINDOW_SECONDS: u64 = 300;

pub async fn initialize_app(config: Config) -> Result<(AppState, Router)> {
    let pool = database::setup_database(&config).await?;

    let uploads = UploadRepository::new(pool.clone());
    let admin = AdminRepository::new(pool);

    let default_hash = password::hash_password(DEFAULT_ADMIN_PASSWORD)?;
    if admin.seed_if_absent(&default_hash).await? {
        tracing::warn!(
            "Admin account seeded with the default password; it must be changed on first login"
        );
    }

    let config = Arc::new(config);
    let notifier = Notifier::from_config(&config);
    let plex = PlexClient::from_config(&config)?;
    let review = ReviewService::new(config.clone(), uploads.clone(), notifier, plex);

    let state = AppState {
        config,
        uploads,
        admin,
        review,
        login_limiter: Arc::new(AuthFailureLimiter::new(
            LOGIN_MAX_FAILURES,
            LOGIN_WINDOW_SECONDS,
        )),
    };

    let router = routes::build_router(state.clone());
    Ok((state, router))
}
