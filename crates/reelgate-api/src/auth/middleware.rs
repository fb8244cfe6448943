use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::{
    extract::{Request, State},
    http::HeaderMap,
    middleware::Next,
    response::{IntoResponse, Response},
};
use reelgate_core::AppError;
use tokio::sync::Mutex;

use crate::error::HttpAppError;
use crate::state::AppState;

/// Tracks failed login attempts per client, blocking for the rest of the
/// window once the threshold is hit.
#[derive(Clone)]
pub struct AuthFailureLimiter {
    inner: Arc<Mutex<HashMap<String, (u32, Instant)>>>,
    max_failures: u32,
    window: Duration,
}

impl AuthFailureLimiter {
    pub fn new(max_failures: u32, window_seconds: u64) -> Self {
        Self {
            inner: Arc::new(Mutex::new(HashMap::new())),
            max_failures,
            window: Duration::from_secs(window_seconds),
        }
    }

    pub async fn record_failure(&self, ip: &str) -> bool {
        let mut guard = self.inner.lock().await;
        let now = Instant::now();
        let (count, reset_at) = guard.entry(ip.to_string()).or_insert((0, now + self.window));
        if now >= *reset_at {
            *count = 0;
            *reset_at = now + self.window;
        }
        *count += 1;
        *count >= self.max_failures
    }

    pub async fn is_blocked(&self, ip: &str) -> bool {
        let mut guard = self.inner.lock().await;
        if let Some((count, reset_at)) = guard.get(ip) {
            if Instant::now() >= *reset_at {
                guard.remove(ip);
                return false;
            }
            return *count >= self.max_failures;
        }
        false
    }
}

/// Best-effort client identifier for the login limiter. Proxied setups put
/// the real address first in X-Forwarded-For.
pub fn client_ip(headers: &HeaderMap) -> String {
    headers
        .get("x-forwarded-for")
        .and_then(|h| h.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(|s| s.trim().to_string())
        .unwrap_or_else(|| "unknown".to_string())
}

/// Gate for admin routes: requires a valid bearer token issued by login.
/// Tokens from a default-password login are rejected everywhere except the
/// password-change endpoint, which opts in via its own claims check.
pub async fn require_admin(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    let token = match bearer_token(request.headers()) {
        Some(token) => token,
        None => {
            return HttpAppError(AppError::Unauthorized(
                "Missing authorization header".to_string(),
            ))
            .into_response();
        }
    };

    let claims = match crate::auth::jwt::validate_token(&state.config.jwt_secret, token) {
        Ok(claims) => claims,
        Err(err) => return HttpAppError(err).into_response(),
    };

    let is_password_change = request.uri().path().ends_with("/password");
    if claims.must_change_password && !is_password_change {
        return HttpAppError(AppError::Unauthorized(
            "Password change required before using admin endpoints".to_string(),
        ))
        .into_response();
    }

    request.extensions_mut().insert(claims);
    next.run(request).await
}

fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get("Authorization")
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn limiter_blocks_after_threshold() {
        let limiter = AuthFailureLimiter::new(3, 60);
        assert!(!limiter.is_blocked("1.2.3.4").await);
        assert!(!limiter.record_failure("1.2.3.4").await);
        assert!(!limiter.record_failure("1.2.3.4").await);
        assert!(limiter.record_failure("1.2.3.4").await);
        assert!(limiter.is_blocked("1.2.3.4").await);
        // other clients are unaffected
        assert!(!limiter.is_blocked("5.6.7.8").await);
    }

    #[test]
    fn client_ip_takes_first_forwarded_entry() {
        let mut headers = HeaderMap::new();
        headers.insert("x-forwarded-for", "9.9.9.9, 10.0.0.1".parse().unwrap());
        assert_eq!(client_ip(&headers), "9.9.9.9");
        assert_eq!(client_ip(&HeaderMap::new()), "unknown");
    }
}
