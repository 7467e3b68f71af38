//! Session lookup, creation and the in-process validation cache.
//!
//! Validated sessions are cached keyed by token for up to
//! `SessionConfig::cache_ttl_secs`. The cache is per-process; other
//! instances are not informed of invalidations (see DESIGN.md).

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use chrono::Utc;
use sqlx::PgPool;
use tracing::{debug, error, info, instrument, warn};
use uuid::Uuid;

use crate::config::session::SessionConfig;
use crate::utils::errors::AppError;
use crate::utils::token::generate_session_token;

use super::model::Session;

#[derive(Debug, Clone)]
struct CachedSession {
    session: Session,
    cached_at: Instant,
}

#[derive(Clone)]
pub struct SessionManager {
    config: SessionConfig,
    cache: Arc<Mutex<HashMap<String, CachedSession>>>,
}

impl SessionManager {
    pub fn new(config: SessionConfig) -> Self {
        Self {
            config,
            cache: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Find a live session for `user_id`, or mint a new token and row.
    #[instrument(skip(self, db), fields(user.id = %user_id, db.table = "sessions"))]
    pub async fn authenticate(&self, db: &PgPool, user_id: Uuid) -> Result<Session, AppError> {
        let existing = sqlx::query_as::<_, Session>(
            "SELECT id, user_id, token, active, expires_at, last_activity_at,
                    active_organization_id, created_at
             FROM sessions
             WHERE user_id = $1 AND active AND expires_at > now()
             ORDER BY created_at DESC
             LIMIT 1",
        )
        .bind(user_id)
        .fetch_optional(db)
        .await
        .map_err(|e| {
            error!(user.id = %user_id, error = %e, "Database error looking up session");
            AppError::database(e)
        })?;

        if let Some(session) = existing {
            debug!(session.id = %session.id, "Reusing live session");
            self.cache_put(&session);
            return Ok(session);
        }

        let token = generate_session_token();
        let expires_at = Utc::now() + chrono::Duration::seconds(self.config.ttl_secs);

        let session = sqlx::query_as::<_, Session>(
            "INSERT INTO sessions (user_id, token, expires_at)
             VALUES ($1, $2, $3)
             RETURNING id, user_id, token, active, expires_at, last_activity_at,
                       active_organization_id, created_at",
        )
        .bind(user_id)
        .bind(&token)
        .bind(expires_at)
        .fetch_one(db)
        .await
        .map_err(|e| {
            error!(user.id = %user_id, error = %e, "Database error creating session");
            AppError::database(e)
        })?;

        info!(session.id = %session.id, user.id = %user_id, "Session created");
        self.cache_put(&session);
        Ok(session)
    }

    /// Resolve a bearer token to a live session, serving from the cache
    /// when the entry is fresh. A cache hit never returns a session whose
    /// expiry is in the past.
    #[instrument(skip(self, db, token), fields(db.table = "sessions"))]
    pub async fn validate(&self, db: &PgPool, token: &str) -> Result<Option<Session>, AppError> {
        if let Some(session) = self.cache_get(token) {
            debug!(session.id = %session.id, "Session cache hit");
            return Ok(Some(session));
        }

        let session = sqlx::query_as::<_, Session>(
            "SELECT id, user_id, token, active, expires_at, last_activity_at,
                    active_organization_id, created_at
             FROM sessions
             WHERE token = $1 AND active AND expires_at > now()",
        )
        .bind(token)
        .fetch_optional(db)
        .await
        .map_err(|e| {
            error!(error = %e, "Database error validating session");
            AppError::database(e)
        })?;

        if let Some(session) = &session {
            self.cache_put(session);
        }

        Ok(session)
    }

    /// Update the liveness timestamp on a session row.
    pub async fn touch(&self, db: &PgPool, session_id: Uuid) -> Result<(), AppError> {
        sqlx::query("UPDATE sessions SET last_activity_at = now() WHERE id = $1")
            .bind(session_id)
            .execute(db)
            .await
            .map_err(|e| {
                error!(session.id = %session_id, error = %e, "Database error touching session");
                AppError::database(e)
            })?;
        Ok(())
    }

    /// Flip the active flag and evict the cached entry.
    #[instrument(skip(self, db, token), fields(db.table = "sessions"))]
    pub async fn invalidate(&self, db: &PgPool, token: &str) -> Result<(), AppError> {
        sqlx::query("UPDATE sessions SET active = FALSE WHERE token = $1")
            .bind(token)
            .execute(db)
            .await
            .map_err(|e| {
                error!(error = %e, "Database error invalidating session");
                AppError::database(e)
            })?;

        self.cache_remove(token);
        info!("Session invalidated");
        Ok(())
    }

    /// Deactivate every session a user holds, e.g. after a password reset.
    #[instrument(skip(self, db), fields(user.id = %user_id, db.table = "sessions"))]
    pub async fn invalidate_user(&self, db: &PgPool, user_id: Uuid) -> Result<(), AppError> {
        sqlx::query("UPDATE sessions SET active = FALSE WHERE user_id = $1 AND active")
            .bind(user_id)
            .execute(db)
            .await
            .map_err(|e| {
                error!(user.id = %user_id, error = %e, "Database error invalidating user sessions");
                AppError::database(e)
            })?;

        if let Ok(mut cache) = self.cache.lock() {
            cache.retain(|_, entry| entry.session.user_id != user_id);
        } else {
            warn!("Session cache poisoned, skipping user eviction");
        }
        info!("All user sessions invalidated");
        Ok(())
    }

    /// Switch the tenant context on a live session. Membership checks are
    /// the caller's responsibility.
    #[instrument(skip(self, db, token), fields(db.table = "sessions"))]
    pub async fn set_active_organization(
        &self,
        db: &PgPool,
        token: &str,
        organization_id: Option<Uuid>,
    ) -> Result<Session, AppError> {
        let session = sqlx::query_as::<_, Session>(
            "UPDATE sessions
             SET active_organization_id = $1, last_activity_at = now()
             WHERE token = $2 AND active AND expires_at > now()
             RETURNING id, user_id, token, active, expires_at, last_activity_at,
                       active_organization_id, created_at",
        )
        .bind(organization_id)
        .bind(token)
        .fetch_optional(db)
        .await
        .map_err(|e| {
            error!(error = %e, "Database error switching organization");
            AppError::database(e)
        })?
        .ok_or_else(|| AppError::unauthorized("Session is no longer valid".to_string()))?;

        self.cache_put(&session);
        info!(
            session.id = %session.id,
            organization.id = ?organization_id,
            "Active organization switched"
        );
        Ok(session)
    }

    /// Evict cache entries that are past their TTL or whose session has
    /// expired. Returns the number removed.
    pub fn evict_expired(&self) -> anyhow::Result<usize> {
        let now = Instant::now();
        let wall_now = Utc::now();
        let ttl = Duration::from_secs(self.config.cache_ttl_secs.max(0) as u64);

        let mut cache = self
            .cache
            .lock()
            .map_err(|_| anyhow::anyhow!("session cache poisoned"))?;
        let before = cache.len();
        cache.retain(|_, entry| {
            now.duration_since(entry.cached_at) < ttl && !entry.session.is_expired(wall_now)
        });
        Ok(before - cache.len())
    }

    /// Spawn the periodic cache eviction task.
    pub fn spawn_sweeper(&self, interval: Duration) {
        let manager = self.clone();
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.tick().await;
            loop {
                ticker.tick().await;
                match manager.evict_expired() {
                    Ok(removed) if removed > 0 => {
                        debug!(removed = removed, "Evicted stale session cache entries");
                    }
                    Ok(_) => {}
                    Err(e) => warn!(error = %e, "Session cache eviction failed"),
                }
            }
        });
    }

    fn cache_get(&self, token: &str) -> Option<Session> {
        let cache = match self.cache.lock() {
            Ok(cache) => cache,
            Err(_) => {
                warn!("Session cache poisoned, treating as miss");
                return None;
            }
        };

        let entry = cache.get(token)?;
        let ttl = Duration::from_secs(self.config.cache_ttl_secs.max(0) as u64);
        if Instant::now().duration_since(entry.cached_at) >= ttl {
            return None;
        }
        // A stale row may still sit in the cache; never serve it past expiry.
        if entry.session.is_expired(Utc::now()) || !entry.session.active {
            return None;
        }
        Some(entry.session.clone())
    }

    fn cache_put(&self, session: &Session) {
        if let Ok(mut cache) = self.cache.lock() {
            cache.insert(
                session.token.clone(),
                CachedSession {
                    session: session.clone(),
                    cached_at: Instant::now(),
                },
            );
        } else {
            warn!("Session cache poisoned, skipping insert");
        }
    }

    fn cache_remove(&self, token: &str) {
        if let Ok(mut cache) = self.cache.lock() {
            cache.remove(token);
        }
    }
}
