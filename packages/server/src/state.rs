use std::sync::Arc;
use std::time::Duration;

use sea_orm::DatabaseConnection;

use crate::config::AppConfig;
use crate::utils::rate_limit::RateLimiter;

/// Application context built once at startup and shared by every handler.
#[derive(Clone)]
pub struct AppState {
    pub db: DatabaseConnection,
    pub config: AppConfig,
    /// Per-client limiter for the public result check.
    pub check_limiter: Arc<RateLimiter>,
}

impl AppState {
    pub fn new(db: DatabaseConnection, config: AppConfig) -> Self {
        let check_limiter = Arc::new(RateLimiter::new(
            config.rate_limit.check_requests,
            Duration::from_secs(config.rate_limit.window_secs),
        ));
        Self {
            db,
            config,
            check_limiter,
        }
    }
}
