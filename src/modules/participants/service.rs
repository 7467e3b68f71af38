use sqlx::PgPool;
use tracing::{debug, error, info, instrument, warn};
use uuid::Uuid;

use crate::state::AppState;
use crate::utils::email::EmailService;
use crate::utils::errors::AppError;
use crate::utils::pagination::PaginationMeta;

use super::model::{
    CreateParticipantRequest, PaginatedParticipantsResponse, Participant,
    ParticipantFilterParams, UpdateParticipantRequest,
};

const PARTICIPANT_COLUMNS: &str =
    "id, organization_id, cohort_id, first_name, last_name, email, created_at, updated_at";

pub struct ParticipantService;

impl ParticipantService {
    /// Create a participant, optionally sending an invitation email. A
    /// failure to send the email does not roll back the creation.
    #[instrument(skip(state, payload), fields(organization.id = %organization_id, db.table = "participants"))]
    pub async fn create(
        state: &AppState,
        organization_id: Uuid,
        payload: CreateParticipantRequest,
    ) -> Result<Participant, AppError> {
        if let Some(cohort_id) = payload.cohort_id {
            ensure_cohort_in_organization(&state.db, organization_id, cohort_id).await?;
        }

        let participant = sqlx::query_as::<_, Participant>(
            "INSERT INTO participants (organization_id, cohort_id, first_name, last_name, email)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING id, organization_id, cohort_id, first_name, last_name, email,
                       created_at, updated_at",
        )
        .bind(organization_id)
        .bind(payload.cohort_id)
        .bind(&payload.first_name)
        .bind(&payload.last_name)
        .bind(&payload.email)
        .fetch_one(&state.db)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(db_err) = &e {
                if db_err.is_unique_violation() {
                    warn!("Participant email already registered in organization");
                    return AppError::bad_request(anyhow::anyhow!(
                        "A participant with this email already exists in the organization"
                    ));
                }
                if db_err.is_foreign_key_violation() {
                    return AppError::not_found(anyhow::anyhow!("Organization not found"));
                }
            }
            error!(error = %e, "Database error creating participant");
            AppError::database(e)
        })?;

        info!(participant.id = %participant.id, "Participant created");

        if payload.send_invitation {
            let organization_name =
                sqlx::query_scalar::<_, String>("SELECT name FROM organizations WHERE id = $1")
                    .bind(organization_id)
                    .fetch_one(&state.db)
                    .await
                    .map_err(|e| {
                        error!(error = %e, "Database error loading organization name");
                        AppError::database(e)
                    })?;

            let email_service = EmailService::new(state.email_config.clone());
            if let Err(e) = email_service
                .send_invitation_email(
                    &participant.email,
                    &participant.first_name,
                    &organization_name,
                )
                .await
            {
                warn!(
                    participant.id = %participant.id,
                    error = %e.error,
                    "Invitation email failed to send"
                );
            }
        }

        Ok(participant)
    }

    #[instrument(skip(db, filters), fields(organization.id = %organization_id, db.table = "participants"))]
    pub async fn list(
        db: &PgPool,
        organization_id: Uuid,
        filters: ParticipantFilterParams,
    ) -> Result<PaginatedParticipantsResponse, AppError> {
        let limit = filters.pagination.limit();
        let offset = filters.pagination.offset();
        let name_pattern = filters.name.as_ref().map(|name| format!("%{}%", name));
        let email_pattern = filters.email.as_ref().map(|email| format!("%{}%", email));

        let mut where_clause = String::from(" AND organization_id = $1");
        let mut bind_index = 1;

        if name_pattern.is_some() {
            bind_index += 1;
            where_clause.push_str(&format!(
                " AND (first_name ILIKE ${0} OR last_name ILIKE ${0})",
                bind_index
            ));
        }
        if email_pattern.is_some() {
            bind_index += 1;
            where_clause.push_str(&format!(" AND email ILIKE ${}", bind_index));
        }
        if filters.cohort_id.is_some() {
            bind_index += 1;
            where_clause.push_str(&format!(" AND cohort_id = ${}", bind_index));
        }

        let count_query = format!("SELECT COUNT(*) FROM participants WHERE 1=1{}", where_clause);
        let mut count_sql = sqlx::query_scalar::<_, i64>(&count_query).bind(organization_id);
        if let Some(pattern) = &name_pattern {
            count_sql = count_sql.bind(pattern);
        }
        if let Some(pattern) = &email_pattern {
            count_sql = count_sql.bind(pattern);
        }
        if let Some(cohort_id) = filters.cohort_id {
            count_sql = count_sql.bind(cohort_id);
        }
        let total = count_sql.fetch_one(db).await.map_err(|e| {
            error!(error = %e, "Database error counting participants");
            AppError::database(e)
        })?;

        let data_query = format!(
            "SELECT {} FROM participants WHERE 1=1{} ORDER BY created_at DESC LIMIT {} OFFSET {}",
            PARTICIPANT_COLUMNS, where_clause, limit, offset
        );
        let mut data_sql = sqlx::query_as::<_, Participant>(&data_query).bind(organization_id);
        if let Some(pattern) = &name_pattern {
            data_sql = data_sql.bind(pattern);
        }
        if let Some(pattern) = &email_pattern {
            data_sql = data_sql.bind(pattern);
        }
        if let Some(cohort_id) = filters.cohort_id {
            data_sql = data_sql.bind(cohort_id);
        }
        let participants = data_sql.fetch_all(db).await.map_err(|e| {
            error!(error = %e, "Database error fetching participants");
            AppError::database(e)
        })?;

        debug!(total = total, returned = participants.len(), "Participants fetched");

        Ok(PaginatedParticipantsResponse {
            data: participants,
            meta: PaginationMeta {
                total,
                limit,
                offset,
                has_more: offset + limit < total,
            },
        })
    }

    #[instrument(skip(db), fields(organization.id = %organization_id, participant.id = %participant_id, db.table = "participants"))]
    pub async fn get(
        db: &PgPool,
        organization_id: Uuid,
        participant_id: Uuid,
    ) -> Result<Participant, AppError> {
        sqlx::query_as::<_, Participant>(
            "SELECT id, organization_id, cohort_id, first_name, last_name, email,
                    created_at, updated_at
             FROM participants WHERE id = $1 AND organization_id = $2",
        )
        .bind(participant_id)
        .bind(organization_id)
        .fetch_optional(db)
        .await
        .map_err(|e| {
            error!(error = %e, "Database error fetching participant");
            AppError::database(e)
        })?
        .ok_or_else(|| AppError::not_found(anyhow::anyhow!("Participant not found")))
    }

    #[instrument(skip(db, payload), fields(organization.id = %organization_id, participant.id = %participant_id, db.table = "participants"))]
    pub async fn update(
        db: &PgPool,
        organization_id: Uuid,
        participant_id: Uuid,
        payload: UpdateParticipantRequest,
    ) -> Result<Participant, AppError> {
        if let Some(cohort_id) = payload.cohort_id {
            ensure_cohort_in_organization(db, organization_id, cohort_id).await?;
        }

        let participant = sqlx::query_as::<_, Participant>(
            "UPDATE participants
             SET first_name = COALESCE($1, first_name),
                 last_name = COALESCE($2, last_name),
                 cohort_id = COALESCE($3, cohort_id),
                 updated_at = now()
             WHERE id = $4 AND organization_id = $5
             RETURNING id, organization_id, cohort_id, first_name, last_name, email,
                       created_at, updated_at",
        )
        .bind(&payload.first_name)
        .bind(&payload.last_name)
        .bind(payload.cohort_id)
        .bind(participant_id)
        .bind(organization_id)
        .fetch_optional(db)
        .await
        .map_err(|e| {
            error!(error = %e, "Database error updating participant");
            AppError::database(e)
        })?
        .ok_or_else(|| AppError::not_found(anyhow::anyhow!("Participant not found")))?;

        info!(participant.id = %participant.id, "Participant updated");
        Ok(participant)
    }

    #[instrument(skip(db), fields(organization.id = %organization_id, participant.id = %participant_id, db.table = "participants"))]
    pub async fn delete(
        db: &PgPool,
        organization_id: Uuid,
        participant_id: Uuid,
    ) -> Result<(), AppError> {
        let result =
            sqlx::query("DELETE FROM participants WHERE id = $1 AND organization_id = $2")
                .bind(participant_id)
                .bind(organization_id)
                .execute(db)
                .await
                .map_err(|e| {
                    error!(error = %e, "Database error deleting participant");
                    AppError::database(e)
                })?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found(anyhow::anyhow!("Participant not found")));
        }

        info!(participant.id = %participant_id, "Participant deleted");
        Ok(())
    }
}

/// A cohort id from another tenant must not be attachable.
async fn ensure_cohort_in_organization(
    db: &PgPool,
    organization_id: Uuid,
    cohort_id: Uuid,
) -> Result<(), AppError> {
    let exists = sqlx::query_scalar::<_, i64>(
        "SELECT COUNT(*) FROM cohorts WHERE id = $1 AND organization_id = $2",
    )
    .bind(cohort_id)
    .bind(organization_id)
    .fetch_one(db)
    .await
    .map_err(|e| {
        error!(error = %e, "Database error checking cohort");
        AppError::database(e)
    })?;

    if exists == 0 {
        return Err(AppError::bad_request(anyhow::anyhow!(
            "Cohort does not belong to this organization"
        )));
    }
    Ok(())
}
