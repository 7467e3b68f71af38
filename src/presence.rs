//! Active-client bookkeeping for the concurrent-client capacity gate.
//!
//! Tracks the last-seen time of each distinct client key. A client counts
//! as active until its liveness window lapses; when the number of active
//! clients reaches the configured capacity, new keys are rejected while
//! known keys keep flowing.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use tracing::{debug, warn};

use crate::config::capacity::CapacityConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admission {
    Admitted { active: usize },
    Rejected { active: usize },
}

#[derive(Clone)]
pub struct ActiveClientTracker {
    capacity: usize,
    liveness: Duration,
    clients: Arc<Mutex<HashMap<String, Instant>>>,
}

impl ActiveClientTracker {
    pub fn new(config: &CapacityConfig) -> Self {
        Self {
            capacity: config.max_active_clients,
            liveness: Duration::from_secs(config.liveness_window_secs),
            clients: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Record a request from `key`, pruning stale clients first.
    pub fn admit(&self, key: &str) -> anyhow::Result<Admission> {
        let now = Instant::now();
        let mut clients = self
            .clients
            .lock()
            .map_err(|_| anyhow::anyhow!("active client map poisoned"))?;

        let liveness = self.liveness;
        clients.retain(|_, last_seen| now.duration_since(*last_seen) < liveness);

        if clients.contains_key(key) || clients.len() < self.capacity {
            clients.insert(key.to_string(), now);
            Ok(Admission::Admitted {
                active: clients.len(),
            })
        } else {
            Ok(Admission::Rejected {
                active: clients.len(),
            })
        }
    }

    pub fn active_count(&self) -> anyhow::Result<usize> {
        let clients = self
            .clients
            .lock()
            .map_err(|_| anyhow::anyhow!("active client map poisoned"))?;
        Ok(clients.len())
    }

    /// Spawn the periodic prune task.
    pub fn spawn_sweeper(&self, interval: Duration) {
        let tracker = self.clone();
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.tick().await;
            loop {
                ticker.tick().await;
                let now = Instant::now();
                match tracker.clients.lock() {
                    Ok(mut clients) => {
                        let before = clients.len();
                        let liveness = tracker.liveness;
                        clients.retain(|_, last_seen| now.duration_since(*last_seen) < liveness);
                        let removed = before - clients.len();
                        if removed > 0 {
                            debug!(removed = removed, "Pruned stale active clients");
                        }
                    }
                    Err(_) => warn!("Active client map poisoned, skipping prune"),
                }
            }
        });
    }
}
