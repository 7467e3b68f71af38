use std::env;

/// Concurrent-client capacity gate configuration.
///
/// The gate counts distinct live client keys within the liveness window.
/// Both numbers are per-process; see DESIGN.md for the horizontal-scaling
/// caveat.
#[derive(Clone, Debug)]
pub struct CapacityConfig {
    /// Maximum number of distinct active clients served at once.
    pub max_active_clients: usize,
    /// A client counts as active for this many seconds after its last
    /// request.
    pub liveness_window_secs: u64,
}

impl Default for CapacityConfig {
    fn default() -> Self {
        Self {
            max_active_clients: 500,
            liveness_window_secs: 300,
        }
    }
}

impl CapacityConfig {
    pub fn from_env() -> Self {
        let default = Self::default();
        Self {
            max_active_clients: env::var("CAPACITY_MAX_ACTIVE_CLIENTS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(default.max_active_clients),
            liveness_window_secs: env::var("CAPACITY_LIVENESS_WINDOW_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(default.liveness_window_secs),
        }
    }
}
