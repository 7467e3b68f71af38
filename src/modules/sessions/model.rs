use serde::Serialize;
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

/// A server-tracked authentication session.
///
/// Distinct from the browser/HTTP notion of a session: this is a row in
/// the `sessions` table, identified by an opaque bearer token, cached
/// in-process with a short TTL.
#[derive(Serialize, FromRow, Debug, Clone, PartialEq, Eq, ToSchema)]
pub struct Session {
    pub id: Uuid,
    pub user_id: Uuid,
    #[serde(skip_serializing)]
    pub token: String,
    pub active: bool,
    pub expires_at: chrono::DateTime<chrono::Utc>,
    pub last_activity_at: chrono::DateTime<chrono::Utc>,
    /// The tenant a multi-org user is currently working in.
    pub active_organization_id: Option<Uuid>,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

impl Session {
    pub fn is_expired(&self, now: chrono::DateTime<chrono::Utc>) -> bool {
        self.expires_at <= now
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};

    fn session(expires_in_secs: i64) -> Session {
        let now = Utc::now();
        Session {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            token: "tok".to_string(),
            active: true,
            expires_at: now + Duration::seconds(expires_in_secs),
            last_activity_at: now,
            active_organization_id: None,
            created_at: now,
        }
    }

    #[test]
    fn test_is_expired() {
        assert!(!session(60).is_expired(Utc::now()));
        assert!(session(-60).is_expired(Utc::now()));
    }

    #[test]
    fn test_token_not_serialized() {
        let serialized = serde_json::to_string(&session(60)).unwrap();
        assert!(!serialized.contains("tok"));
    }
}
