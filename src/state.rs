use sqlx::PgPool;

use crate::config::capacity::CapacityConfig;
use crate::config::cors::CorsConfig;
use crate::config::database::init_db_pool;
use crate::config::email::EmailConfig;
use crate::config::rate_limit::RateLimitConfig;
use crate::config::session::SessionConfig;
use crate::limiter::RateLimiter;
use crate::modules::sessions::SessionManager;
use crate::presence::ActiveClientTracker;

#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    pub cors_config: CorsConfig,
    pub email_config: EmailConfig,
    pub session_config: SessionConfig,
    pub rate_limit_config: RateLimitConfig,
    pub capacity_config: CapacityConfig,
    pub sessions: SessionManager,
    pub limiter: RateLimiter,
    pub active_clients: ActiveClientTracker,
}

impl AppState {
    /// Build state around an existing pool. Used by tests and by
    /// [`init_app_state`].
    pub fn with_pool(
        db: PgPool,
        cors_config: CorsConfig,
        email_config: EmailConfig,
        session_config: SessionConfig,
        rate_limit_config: RateLimitConfig,
        capacity_config: CapacityConfig,
    ) -> Self {
        let sessions = SessionManager::new(session_config.clone());
        let limiter = RateLimiter::new(&rate_limit_config);
        let active_clients = ActiveClientTracker::new(&capacity_config);

        Self {
            db,
            cors_config,
            email_config,
            session_config,
            rate_limit_config,
            capacity_config,
            sessions,
            limiter,
            active_clients,
        }
    }
}

pub async fn init_app_state() -> AppState {
    AppState::with_pool(
        init_db_pool().await,
        CorsConfig::from_env(),
        EmailConfig::from_env(),
        SessionConfig::from_env(),
        RateLimitConfig::from_env(),
        CapacityConfig::from_env(),
    )
}
