//! Admin authentication endpoints.

use axum::extract::State;
use axum::http::HeaderMap;
use axum::Json;
use reelgate_core::AppError;
use serde::{Deserialize, Serialize};

use crate::auth::middleware::client_ip;
use crate::auth::{jwt, password};
use crate::error::HttpAppError;
use crate::state::AppState;

const MIN_PASSWORD_LENGTH: usize = 8;

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub must_change_password: bool,
}

/// POST /api/v0/admin/login
pub async fn login(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(request): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, HttpAppError> {
    let ip = client_ip(&headers);
    if state.login_limiter.is_blocked(&ip).await {
        return Err(HttpAppError(AppError::Unauthorized(
            "Too many failed login attempts, try again later".to_string(),
        )));
    }

    let credential = state
        .admin
        .get()
        .await?
        .ok_or_else(|| AppError::Internal("Admin credential not seeded".to_string()))?;

    if !password::verify_password(&request.password, &credential.password_hash) {
        state.login_limiter.record_failure(&ip).await;
        tracing::warn!(ip = %ip, "Failed admin login attempt");
        return Err(HttpAppError(AppError::Unauthorized(
            "Invalid password".to_string(),
        )));
    }

    let token = jwt::issue_token(
        &state.config.jwt_secret,
        state.config.jwt_expiry_hours,
        credential.must_change_password,
    )?;

    let admin = state.admin.clone();
    tokio::spawn(async move {
        if let Err(err) = admin.touch_last_login().await {
            tracing::warn!(error = %err, "Failed to record admin login time");
        }
    });

    tracing::info!("Admin logged in");
    Ok(Json(LoginResponse {
        token,
        must_change_password: credential.must_change_password,
    }))
}

#[derive(Debug, Deserialize)]
pub struct ChangePasswordRequest {
    pub current_password: String,
    pub new_password: String,
}

/// POST /api/v0/admin/password
pub async fn change_password(
    State(state): State<AppState>,
    Json(request): Json<ChangePasswordRequest>,
) -> Result<Json<serde_json::Value>, HttpAppError> {
    let credential = state
        .admin
        .get()
        .await?
        .ok_or_else(|| AppError::Internal("Admin credential not seeded".to_string()))?;

    if !password::verify_password(&request.current_password, &credential.password_hash) {
        return Err(HttpAppError(AppError::Unauthorized(
            "Current password is incorrect".to_string(),
        )));
    }

    if request.new_password.len() < MIN_PASSWORD_LENGTH {
        return Err(HttpAppError(AppError::Validation(format!(
            "Password must be at least {} characters",
            MIN_PASSWORD_LENGTH
        ))));
    }

    let new_hash = password::hash_password(&request.new_password)?;
    state.admin.update_password(&new_hash).await?;

    tracing::info!("Admin password changed");
    Ok(Json(serde_json::json!({ "status": "password changed" })))
}
