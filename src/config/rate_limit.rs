use std::env;

/// Fixed-window rate limiter configuration.
///
/// Thresholds are role-differentiated: admins get the most headroom,
/// org_admins less, and unauthenticated or viewer traffic the least.
#[derive(Clone, Debug)]
pub struct RateLimitConfig {
    /// Window length in seconds.
    pub window_secs: u64,
    /// Maximum requests per window for admin users.
    pub admin_max: u32,
    /// Maximum requests per window for org_admin users.
    pub org_max: u32,
    /// Maximum requests per window for everyone else.
    pub default_max: u32,
    /// How often expired entries are swept, in seconds.
    pub sweep_interval_secs: u64,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            window_secs: 60,
            admin_max: 300,
            org_max: 120,
            default_max: 60,
            sweep_interval_secs: 60,
        }
    }
}

impl RateLimitConfig {
    pub fn from_env() -> Self {
        let default = Self::default();
        Self {
            window_secs: env::var("RATE_LIMIT_WINDOW_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(default.window_secs),
            admin_max: env::var("RATE_LIMIT_ADMIN_MAX")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(default.admin_max),
            org_max: env::var("RATE_LIMIT_ORG_MAX")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(default.org_max),
            default_max: env::var("RATE_LIMIT_DEFAULT_MAX")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(default.default_max),
            sweep_interval_secs: env::var("RATE_LIMIT_SWEEP_INTERVAL_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(default.sweep_interval_secs),
        }
    }
}
