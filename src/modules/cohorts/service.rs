use sqlx::PgPool;
use tracing::{debug, error, info, instrument, warn};
use uuid::Uuid;

use crate::utils::errors::AppError;
use crate::utils::pagination::PaginationMeta;

use super::model::{
    Cohort, CohortFilterParams, CreateCohortRequest, PaginatedCohortsResponse,
    UpdateCohortRequest,
};

const COHORT_COLUMNS: &str = "id, organization_id, name, description, created_at, updated_at";

pub struct CohortService;

impl CohortService {
    #[instrument(skip(db, payload), fields(organization.id = %organization_id, cohort.name = %payload.name, db.table = "cohorts"))]
    pub async fn create(
        db: &PgPool,
        organization_id: Uuid,
        payload: CreateCohortRequest,
    ) -> Result<Cohort, AppError> {
        let cohort = sqlx::query_as::<_, Cohort>(
            "INSERT INTO cohorts (organization_id, name, description)
             VALUES ($1, $2, $3)
             RETURNING id, organization_id, name, description, created_at, updated_at",
        )
        .bind(organization_id)
        .bind(&payload.name)
        .bind(&payload.description)
        .fetch_one(db)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(db_err) = &e {
                if db_err.is_unique_violation() {
                    warn!(cohort.name = %payload.name, "Cohort name already used in organization");
                    return AppError::bad_request(anyhow::anyhow!(
                        "A cohort with this name already exists in the organization"
                    ));
                }
                if db_err.is_foreign_key_violation() {
                    return AppError::not_found(anyhow::anyhow!("Organization not found"));
                }
            }
            error!(error = %e, "Database error creating cohort");
            AppError::database(e)
        })?;

        info!(cohort.id = %cohort.id, "Cohort created");
        Ok(cohort)
    }

    #[instrument(skip(db, filters), fields(organization.id = %organization_id, db.table = "cohorts"))]
    pub async fn list(
        db: &PgPool,
        organization_id: Uuid,
        filters: CohortFilterParams,
    ) -> Result<PaginatedCohortsResponse, AppError> {
        let limit = filters.pagination.limit();
        let offset = filters.pagination.offset();
        let name_pattern = filters.name.as_ref().map(|name| format!("%{}%", name));

        let mut where_clause = String::from(" AND organization_id = $1");
        if name_pattern.is_some() {
            where_clause.push_str(" AND name ILIKE $2");
        }

        let count_query = format!("SELECT COUNT(*) FROM cohorts WHERE 1=1{}", where_clause);
        let mut count_sql = sqlx::query_scalar::<_, i64>(&count_query).bind(organization_id);
        if let Some(pattern) = &name_pattern {
            count_sql = count_sql.bind(pattern);
        }
        let total = count_sql.fetch_one(db).await.map_err(|e| {
            error!(error = %e, "Database error counting cohorts");
            AppError::database(e)
        })?;

        let data_query = format!(
            "SELECT {} FROM cohorts WHERE 1=1{} ORDER BY created_at DESC LIMIT {} OFFSET {}",
            COHORT_COLUMNS, where_clause, limit, offset
        );
        let mut data_sql = sqlx::query_as::<_, Cohort>(&data_query).bind(organization_id);
        if let Some(pattern) = &name_pattern {
            data_sql = data_sql.bind(pattern);
        }
        let cohorts = data_sql.fetch_all(db).await.map_err(|e| {
            error!(error = %e, "Database error fetching cohorts");
            AppError::database(e)
        })?;

        debug!(total = total, returned = cohorts.len(), "Cohorts fetched");

        Ok(PaginatedCohortsResponse {
            data: cohorts,
            meta: PaginationMeta {
                total,
                limit,
                offset,
                has_more: offset + limit < total,
            },
        })
    }

    /// Fetch a cohort, scoped to its organization so a valid id from another
    /// tenant still reads as missing.
    #[instrument(skip(db), fields(organization.id = %organization_id, cohort.id = %cohort_id, db.table = "cohorts"))]
    pub async fn get(
        db: &PgPool,
        organization_id: Uuid,
        cohort_id: Uuid,
    ) -> Result<Cohort, AppError> {
        sqlx::query_as::<_, Cohort>(
            "SELECT id, organization_id, name, description, created_at, updated_at
             FROM cohorts WHERE id = $1 AND organization_id = $2",
        )
        .bind(cohort_id)
        .bind(organization_id)
        .fetch_optional(db)
        .await
        .map_err(|e| {
            error!(error = %e, "Database error fetching cohort");
            AppError::database(e)
        })?
        .ok_or_else(|| AppError::not_found(anyhow::anyhow!("Cohort not found")))
    }

    #[instrument(skip(db, payload), fields(organization.id = %organization_id, cohort.id = %cohort_id, db.table = "cohorts"))]
    pub async fn update(
        db: &PgPool,
        organization_id: Uuid,
        cohort_id: Uuid,
        payload: UpdateCohortRequest,
    ) -> Result<Cohort, AppError> {
        let cohort = sqlx::query_as::<_, Cohort>(
            "UPDATE cohorts
             SET name = COALESCE($1, name),
                 description = COALESCE($2, description),
                 updated_at = now()
             WHERE id = $3 AND organization_id = $4
             RETURNING id, organization_id, name, description, created_at, updated_at",
        )
        .bind(&payload.name)
        .bind(&payload.description)
        .bind(cohort_id)
        .bind(organization_id)
        .fetch_optional(db)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(db_err) = &e
                && db_err.is_unique_violation()
            {
                return AppError::bad_request(anyhow::anyhow!(
                    "A cohort with this name already exists in the organization"
                ));
            }
            error!(error = %e, "Database error updating cohort");
            AppError::database(e)
        })?
        .ok_or_else(|| AppError::not_found(anyhow::anyhow!("Cohort not found")))?;

        info!(cohort.id = %cohort.id, "Cohort updated");
        Ok(cohort)
    }

    #[instrument(skip(db), fields(organization.id = %organization_id, cohort.id = %cohort_id, db.table = "cohorts"))]
    pub async fn delete(
        db: &PgPool,
        organization_id: Uuid,
        cohort_id: Uuid,
    ) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM cohorts WHERE id = $1 AND organization_id = $2")
            .bind(cohort_id)
            .bind(organization_id)
            .execute(db)
            .await
            .map_err(|e| {
                error!(error = %e, "Database error deleting cohort");
                AppError::database(e)
            })?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found(anyhow::anyhow!("Cohort not found")));
        }

        info!(cohort.id = %cohort_id, "Cohort deleted");
        Ok(())
    }
}
