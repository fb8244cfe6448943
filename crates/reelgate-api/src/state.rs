//! Application state shared across handlers.

use std::sync::Arc;

use reelgate_core::Config;
use reelgate_db::{AdminRepository, UploadRepository};

use crate::auth::middleware::AuthFailureLimiter;
use crate::services::review::ReviewService;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub uploads: UploadRepository,
    pub admin: AdminRepository,
    pub review: ReviewService,
    pub login_limiter: Arc<AuthFailureLimiter>,
}
