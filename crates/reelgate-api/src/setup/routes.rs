//! Router assembly.

use axum::extract::DefaultBodyLimit;
use axum::middleware;
use axum::routing::{get, post};
use axum::Router;
use tower_http::trace::TraceLayer;

use crate::auth::middleware::require_admin;
use crate::handlers::{admin, health, review, uploads};
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    let admin_routes = Router::new()
        .route("/uploads", get(review::review_queue))
        .route("/uploads/{id}/approve", post(review::approve_upload))
        .route("/uploads/{id}/deny", post(review::deny_upload))
        .route("/password", post(admin::change_password))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            require_admin,
        ));

    // Uploads are full video files; the cap comes from config, 0 = unlimited
    let body_limit = match state.config.max_upload_size_bytes() {
        Some(max) => DefaultBodyLimit::max(max as usize + 1024 * 1024),
        None => DefaultBodyLimit::disable(),
    };

    Router::new()
        .route("/health", get(health::health))
        .route("/api/v0/uploads", post(uploads::submit_upload))
        .route("/api/v0/uploads/{id}", get(uploads::get_upload))
        .route("/api/v0/my-uploads", get(uploads::my_uploads))
        .route("/api/v0/admin/login", post(admin::login))
        .nest("/api/v0/admin", admin_routes)
        .layer(body_limit)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
