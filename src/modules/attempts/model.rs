use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

/// Assessment phase. Every participant gets at most one attempt per phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttemptPhase {
    Pre,
    Post,
}

impl AttemptPhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            AttemptPhase::Pre => "pre",
            AttemptPhase::Post => "post",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "pre" => Some(AttemptPhase::Pre),
            "post" => Some(AttemptPhase::Post),
            _ => None,
        }
    }
}

/// One run through the assessment by a participant.
#[derive(Serialize, FromRow, Debug, Clone, ToSchema)]
pub struct Attempt {
    pub id: Uuid,
    pub participant_id: Uuid,
    pub phase: String,
    /// Score summary stored at completion.
    pub report: Option<serde_json::Value>,
    pub started_at: chrono::DateTime<chrono::Utc>,
    pub completed_at: Option<chrono::DateTime<chrono::Utc>>,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

impl Attempt {
    pub fn is_completed(&self) -> bool {
        self.completed_at.is_some()
    }
}

#[derive(Deserialize, Validate, Debug, ToSchema)]
pub struct StartAttemptRequest {
    /// `pre` or `post`.
    pub phase: String,
}

#[derive(Deserialize, Validate, Debug, ToSchema)]
pub struct CompleteAttemptRequest {
    /// Caller-supplied report. When omitted, the report is computed from the
    /// recorded responses against the answer key.
    pub report: Option<serde_json::Value>,
}

/// A single answer within an attempt.
#[derive(Serialize, FromRow, Debug, Clone, ToSchema)]
pub struct Response {
    pub id: Uuid,
    pub attempt_id: Uuid,
    pub question_id: Uuid,
    pub option_id: Uuid,
    pub answered_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Deserialize, Validate, Debug, ToSchema)]
pub struct RecordResponseRequest {
    pub question_id: Uuid,
    pub option_id: Uuid,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_phase_round_trips_through_slug() {
        for phase in [AttemptPhase::Pre, AttemptPhase::Post] {
            assert_eq!(AttemptPhase::parse(phase.as_str()), Some(phase));
        }
    }

    #[test]
    fn test_unknown_phase_rejected() {
        assert_eq!(AttemptPhase::parse("mid"), None);
        assert_eq!(AttemptPhase::parse(""), None);
    }
}
