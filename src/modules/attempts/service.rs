use serde_json::json;
use sqlx::PgPool;
use tracing::{debug, error, info, instrument, warn};
use uuid::Uuid;

use crate::utils::errors::AppError;

use super::model::{Attempt, AttemptPhase, RecordResponseRequest, Response};

pub struct AttemptService;

impl AttemptService {
    /// Start an attempt for a participant. The `(participant, phase)`
    /// uniqueness constraint turns a concurrent double-start into a 409.
    #[instrument(skip(db), fields(participant.id = %participant_id, db.table = "attempts"))]
    pub async fn start(
        db: &PgPool,
        participant_id: Uuid,
        phase: &str,
    ) -> Result<Attempt, AppError> {
        let phase = AttemptPhase::parse(phase).ok_or_else(|| {
            AppError::unprocessable(anyhow::anyhow!("Phase must be 'pre' or 'post'"))
        })?;

        let attempt = sqlx::query_as::<_, Attempt>(
            "INSERT INTO attempts (participant_id, phase)
             VALUES ($1, $2)
             RETURNING id, participant_id, phase, report, started_at, completed_at, created_at",
        )
        .bind(participant_id)
        .bind(phase.as_str())
        .fetch_one(db)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(db_err) = &e {
                if db_err.is_unique_violation() {
                    warn!(phase = phase.as_str(), "Duplicate attempt for phase");
                    return AppError::conflict(format!(
                        "An attempt for the '{}' phase already exists",
                        phase.as_str()
                    ));
                }
                if db_err.is_foreign_key_violation() {
                    return AppError::not_found(anyhow::anyhow!("Participant not found"));
                }
            }
            error!(error = %e, "Database error starting attempt");
            AppError::database(e)
        })?;

        info!(attempt.id = %attempt.id, phase = phase.as_str(), "Attempt started");
        Ok(attempt)
    }

    #[instrument(skip(db), fields(participant.id = %participant_id, db.table = "attempts"))]
    pub async fn list_for_participant(
        db: &PgPool,
        participant_id: Uuid,
    ) -> Result<Vec<Attempt>, AppError> {
        sqlx::query_as::<_, Attempt>(
            "SELECT id, participant_id, phase, report, started_at, completed_at, created_at
             FROM attempts
             WHERE participant_id = $1
             ORDER BY started_at",
        )
        .bind(participant_id)
        .fetch_all(db)
        .await
        .map_err(|e| {
            error!(error = %e, "Database error listing attempts");
            AppError::database(e)
        })
    }

    #[instrument(skip(db), fields(attempt.id = %attempt_id, db.table = "attempts"))]
    pub async fn get(db: &PgPool, attempt_id: Uuid) -> Result<Attempt, AppError> {
        sqlx::query_as::<_, Attempt>(
            "SELECT id, participant_id, phase, report, started_at, completed_at, created_at
             FROM attempts WHERE id = $1",
        )
        .bind(attempt_id)
        .fetch_optional(db)
        .await
        .map_err(|e| {
            error!(error = %e, "Database error fetching attempt");
            AppError::database(e)
        })?
        .ok_or_else(|| AppError::not_found(anyhow::anyhow!("Attempt not found")))
    }

    /// Complete an attempt, storing the report. A second completion is a
    /// concurrent-access conflict.
    #[instrument(skip(db, report), fields(attempt.id = %attempt_id, db.table = "attempts"))]
    pub async fn complete(
        db: &PgPool,
        attempt_id: Uuid,
        report: Option<serde_json::Value>,
    ) -> Result<Attempt, AppError> {
        let report = match report {
            Some(report) => report,
            None => Self::score_report(db, attempt_id).await?,
        };

        let attempt = sqlx::query_as::<_, Attempt>(
            "UPDATE attempts
             SET report = $1, completed_at = now()
             WHERE id = $2 AND completed_at IS NULL
             RETURNING id, participant_id, phase, report, started_at, completed_at, created_at",
        )
        .bind(&report)
        .bind(attempt_id)
        .fetch_optional(db)
        .await
        .map_err(|e| {
            error!(error = %e, "Database error completing attempt");
            AppError::database(e)
        })?;

        match attempt {
            Some(attempt) => {
                info!(attempt.id = %attempt.id, "Attempt completed");
                Ok(attempt)
            }
            None => {
                // Distinguish "missing" from "already completed".
                let existing = Self::get(db, attempt_id).await?;
                debug_assert!(existing.is_completed());
                warn!("Attempt already completed");
                Err(AppError::conflict("Attempt is already completed"))
            }
        }
    }

    #[instrument(skip(db), fields(attempt.id = %attempt_id, db.table = "attempts"))]
    pub async fn delete(db: &PgPool, attempt_id: Uuid) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM attempts WHERE id = $1")
            .bind(attempt_id)
            .execute(db)
            .await
            .map_err(|e| {
                error!(error = %e, "Database error deleting attempt");
                AppError::database(e)
            })?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found(anyhow::anyhow!("Attempt not found")));
        }

        info!(attempt.id = %attempt_id, "Attempt deleted");
        Ok(())
    }

    /// Record (or change) an answer on an open attempt.
    #[instrument(skip(db, payload), fields(attempt.id = %attempt_id, db.table = "responses"))]
    pub async fn record_response(
        db: &PgPool,
        attempt_id: Uuid,
        payload: RecordResponseRequest,
    ) -> Result<Response, AppError> {
        let attempt = Self::get(db, attempt_id).await?;
        if attempt.is_completed() {
            return Err(AppError::conflict(
                "Attempt is already completed; answers can no longer change",
            ));
        }

        let option_question = sqlx::query_scalar::<_, Uuid>(
            "SELECT question_id FROM options WHERE id = $1",
        )
        .bind(payload.option_id)
        .fetch_optional(db)
        .await
        .map_err(|e| {
            error!(error = %e, "Database error checking option");
            AppError::database(e)
        })?;

        if option_question != Some(payload.question_id) {
            return Err(AppError::bad_request(anyhow::anyhow!(
                "Option does not belong to the given question"
            )));
        }

        let response = sqlx::query_as::<_, Response>(
            "INSERT INTO responses (attempt_id, question_id, option_id)
             VALUES ($1, $2, $3)
             ON CONFLICT (attempt_id, question_id)
             DO UPDATE SET option_id = EXCLUDED.option_id, answered_at = now()
             RETURNING id, attempt_id, question_id, option_id, answered_at",
        )
        .bind(attempt_id)
        .bind(payload.question_id)
        .bind(payload.option_id)
        .fetch_one(db)
        .await
        .map_err(|e| {
            error!(error = %e, "Database error recording response");
            AppError::database(e)
        })?;

        debug!(response.id = %response.id, "Response recorded");
        Ok(response)
    }

    #[instrument(skip(db), fields(attempt.id = %attempt_id, db.table = "responses"))]
    pub async fn list_responses(
        db: &PgPool,
        attempt_id: Uuid,
    ) -> Result<Vec<Response>, AppError> {
        sqlx::query_as::<_, Response>(
            "SELECT r.id, r.attempt_id, r.question_id, r.option_id, r.answered_at
             FROM responses r
             JOIN questions q ON q.id = r.question_id
             WHERE r.attempt_id = $1
             ORDER BY q.position",
        )
        .bind(attempt_id)
        .fetch_all(db)
        .await
        .map_err(|e| {
            error!(error = %e, "Database error listing responses");
            AppError::database(e)
        })
    }

    /// Resolve the organization an attempt belongs to, for isolation checks.
    pub async fn organization_for_attempt(
        db: &PgPool,
        attempt_id: Uuid,
    ) -> Result<Uuid, AppError> {
        sqlx::query_scalar::<_, Uuid>(
            "SELECT p.organization_id
             FROM attempts a
             JOIN participants p ON p.id = a.participant_id
             WHERE a.id = $1",
        )
        .bind(attempt_id)
        .fetch_optional(db)
        .await
        .map_err(|e| {
            error!(attempt.id = %attempt_id, error = %e, "Database error resolving attempt tenant");
            AppError::database(e)
        })?
        .ok_or_else(|| AppError::not_found(anyhow::anyhow!("Attempt not found")))
    }

    /// Resolve the organization a participant belongs to, for isolation
    /// checks.
    pub async fn organization_for_participant(
        db: &PgPool,
        participant_id: Uuid,
    ) -> Result<Uuid, AppError> {
        sqlx::query_scalar::<_, Uuid>("SELECT organization_id FROM participants WHERE id = $1")
            .bind(participant_id)
            .fetch_optional(db)
            .await
            .map_err(|e| {
                error!(participant.id = %participant_id, error = %e, "Database error resolving participant tenant");
                AppError::database(e)
            })?
            .ok_or_else(|| AppError::not_found(anyhow::anyhow!("Participant not found")))
    }

    /// Score the recorded responses against the answer key.
    async fn score_report(db: &PgPool, attempt_id: Uuid) -> Result<serde_json::Value, AppError> {
        let (total_questions, answered, correct) = sqlx::query_as::<_, (i64, i64, i64)>(
            "SELECT
                 (SELECT COUNT(*) FROM questions),
                 (SELECT COUNT(*) FROM responses WHERE attempt_id = $1),
                 (SELECT COUNT(*)
                  FROM responses r
                  JOIN correct_answers c
                    ON c.question_id = r.question_id AND c.option_id = r.option_id
                  WHERE r.attempt_id = $1)",
        )
        .bind(attempt_id)
        .fetch_one(db)
        .await
        .map_err(|e| {
            error!(error = %e, "Database error scoring attempt");
            AppError::database(e)
        })?;

        let score_percent = if total_questions > 0 {
            (correct as f64 / total_questions as f64) * 100.0
        } else {
            0.0
        };

        Ok(json!({
            "total_questions": total_questions,
            "answered": answered,
            "correct": correct,
            "score_percent": score_percent,
        }))
    }
}
