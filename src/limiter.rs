//! In-memory fixed-window rate limiter.
//!
//! One counter per client key (user id or peer IP). When a key exceeds its
//! threshold the entry is marked blocked until the window resets, and
//! denials carry a retry-after hint no longer than the window itself.
//!
//! State is per-process only: counters are lost on restart and are not
//! shared between instances. Callers are expected to fail open if
//! [`RateLimiter::check`] returns an error.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use tracing::{debug, warn};

use crate::config::rate_limit::RateLimitConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Allow { remaining: u32 },
    Deny { retry_after_secs: u64 },
}

#[derive(Debug)]
struct Entry {
    count: u32,
    reset_at: Instant,
    blocked: bool,
}

#[derive(Clone)]
pub struct RateLimiter {
    window: Duration,
    entries: Arc<Mutex<HashMap<String, Entry>>>,
}

impl RateLimiter {
    pub fn new(config: &RateLimitConfig) -> Self {
        Self {
            window: Duration::from_secs(config.window_secs),
            entries: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Count a request against `key` with a per-role threshold of `max`.
    pub fn check(&self, key: &str, max: u32) -> anyhow::Result<Decision> {
        let now = Instant::now();
        let mut entries = self
            .entries
            .lock()
            .map_err(|_| anyhow::anyhow!("rate limit map poisoned"))?;

        let entry = entries.entry(key.to_string()).or_insert_with(|| Entry {
            count: 0,
            reset_at: now + self.window,
            blocked: false,
        });

        if now >= entry.reset_at {
            entry.count = 0;
            entry.reset_at = now + self.window;
            entry.blocked = false;
        }

        if entry.blocked {
            return Ok(Decision::Deny {
                retry_after_secs: retry_after(entry.reset_at, now),
            });
        }

        entry.count += 1;
        if entry.count > max {
            entry.blocked = true;
            Ok(Decision::Deny {
                retry_after_secs: retry_after(entry.reset_at, now),
            })
        } else {
            Ok(Decision::Allow {
                remaining: max - entry.count,
            })
        }
    }

    /// Drop entries whose window has passed. Returns the number removed.
    pub fn sweep(&self) -> anyhow::Result<usize> {
        let now = Instant::now();
        let mut entries = self
            .entries
            .lock()
            .map_err(|_| anyhow::anyhow!("rate limit map poisoned"))?;
        let before = entries.len();
        entries.retain(|_, entry| entry.reset_at > now);
        Ok(before - entries.len())
    }

    /// Spawn the periodic sweep task.
    pub fn spawn_sweeper(&self, interval: Duration) {
        let limiter = self.clone();
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.tick().await; // first tick fires immediately
            loop {
                ticker.tick().await;
                match limiter.sweep() {
                    Ok(removed) if removed > 0 => {
                        debug!(removed = removed, "Swept expired rate limit entries");
                    }
                    Ok(_) => {}
                    Err(e) => warn!(error = %e, "Rate limit sweep failed"),
                }
            }
        });
    }
}

fn retry_after(reset_at: Instant, now: Instant) -> u64 {
    let remaining = reset_at.saturating_duration_since(now);
    let mut secs = remaining.as_secs();
    if remaining.subsec_nanos() > 0 {
        secs += 1;
    }
    secs.max(1)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn limiter(window_secs: u64) -> RateLimiter {
        RateLimiter::new(&RateLimitConfig {
            window_secs,
            ..RateLimitConfig::default()
        })
    }

    #[test]
    fn test_allows_up_to_threshold() {
        let limiter = limiter(60);
        for i in 0..3 {
            let decision = limiter.check("client-a", 3).unwrap();
            assert_eq!(decision, Decision::Allow { remaining: 2 - i });
        }
    }

    #[test]
    fn test_request_beyond_threshold_denied_with_bounded_retry_after() {
        let limiter = limiter(60);
        for _ in 0..3 {
            limiter.check("client-a", 3).unwrap();
        }

        match limiter.check("client-a", 3).unwrap() {
            Decision::Deny { retry_after_secs } => {
                assert!(retry_after_secs >= 1);
                assert!(retry_after_secs <= 60);
            }
            other => panic!("expected deny, got {:?}", other),
        }
    }

    #[test]
    fn test_blocked_entry_stays_blocked_within_window() {
        let limiter = limiter(60);
        for _ in 0..4 {
            limiter.check("client-a", 3).unwrap();
        }
        assert!(matches!(
            limiter.check("client-a", 3).unwrap(),
            Decision::Deny { .. }
        ));
    }

    #[test]
    fn test_keys_are_counted_independently() {
        let limiter = limiter(60);
        for _ in 0..4 {
            limiter.check("client-a", 3).unwrap();
        }
        assert!(matches!(
            limiter.check("client-b", 3).unwrap(),
            Decision::Allow { .. }
        ));
    }

    #[test]
    fn test_window_reset_unblocks() {
        let limiter = limiter(0); // zero-length window resets immediately
        for _ in 0..5 {
            // every check lands in a fresh window
            assert!(matches!(
                limiter.check("client-a", 1).unwrap(),
                Decision::Allow { .. }
            ));
        }
    }

    #[test]
    fn test_sweep_removes_expired_entries() {
        let limiter = limiter(0);
        limiter.check("client-a", 3).unwrap();
        limiter.check("client-b", 3).unwrap();
        std::thread::sleep(Duration::from_millis(5));
        assert_eq!(limiter.sweep().unwrap(), 2);
    }

    #[test]
    fn test_concurrent_checks_never_allow_more_than_max() {
        let limiter = limiter(60);
        let max = 10u32;
        let mut handles = Vec::new();

        for _ in 0..8 {
            let limiter = limiter.clone();
            handles.push(std::thread::spawn(move || {
                let mut allowed = 0u32;
                for _ in 0..20 {
                    if matches!(
                        limiter.check("shared-key", max).unwrap(),
                        Decision::Allow { .. }
                    ) {
                        allowed += 1;
                    }
                }
                allowed
            }));
        }

        let total_allowed: u32 = handles.into_iter().map(|h| h.join().unwrap()).sum();
        assert_eq!(total_allowed, max);
    }
}
