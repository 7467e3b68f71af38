use std::env;

/// Session lifetime and in-process cache configuration.
#[derive(Clone, Debug)]
pub struct SessionConfig {
    /// How long a session row is valid after creation, in seconds.
    pub ttl_secs: i64,
    /// How long a validated session may be served from the in-process
    /// cache before being re-checked against the database, in seconds.
    pub cache_ttl_secs: i64,
    /// How long a passcode (verification / reset code) stays valid.
    pub passcode_ttl_secs: i64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            ttl_secs: 86_400,      // 24 hours
            cache_ttl_secs: 300,   // 5 minutes
            passcode_ttl_secs: 900, // 15 minutes
        }
    }
}

impl SessionConfig {
    pub fn from_env() -> Self {
        let default = Self::default();
        Self {
            ttl_secs: env::var("SESSION_TTL_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(default.ttl_secs),
            cache_ttl_secs: env::var("SESSION_CACHE_TTL_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(default.cache_ttl_secs),
            passcode_ttl_secs: env::var("PASSCODE_TTL_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(default.passcode_ttl_secs),
        }
    }
}
