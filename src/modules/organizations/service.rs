use sqlx::PgPool;
use tracing::{debug, error, info, instrument, warn};
use uuid::Uuid;

use crate::modules::auth::model::UserRole;
use crate::utils::errors::AppError;
use crate::utils::isolation::{DataIsolationService, OrgScope};
use crate::utils::pagination::PaginationMeta;
use crate::utils::password::hash_password;

use super::model::{
    AddMemberRequest, CreateOrganizationRequest, MemberInfo, Organization,
    OrganizationFilterParams, PaginatedOrganizationsResponse, UpdateOrganizationRequest,
};

const ORGANIZATION_COLUMNS: &str = "id, name, contact_email, created_at, updated_at";

pub struct OrganizationService;

impl OrganizationService {
    #[instrument(skip(db, payload), fields(organization.name = %payload.name, db.table = "organizations"))]
    pub async fn create(
        db: &PgPool,
        payload: CreateOrganizationRequest,
    ) -> Result<Organization, AppError> {
        let organization = sqlx::query_as::<_, Organization>(
            "INSERT INTO organizations (name, contact_email) VALUES ($1, $2)
             RETURNING id, name, contact_email, created_at, updated_at",
        )
        .bind(&payload.name)
        .bind(&payload.contact_email)
        .fetch_one(db)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(db_err) = &e
                && db_err.is_unique_violation()
            {
                warn!(organization.name = %payload.name, "Organization name already taken");
                return AppError::bad_request(anyhow::anyhow!("Organization name already exists"));
            }
            error!(error = %e, "Database error creating organization");
            AppError::database(e)
        })?;

        info!(organization.id = %organization.id, "Organization created");
        Ok(organization)
    }

    /// List the organizations visible to the caller, filtered and paginated.
    #[instrument(skip(db, filters), fields(user.id = %user_id, db.table = "organizations"))]
    pub async fn list(
        db: &PgPool,
        user_id: Uuid,
        role: UserRole,
        filters: OrganizationFilterParams,
    ) -> Result<PaginatedOrganizationsResponse, AppError> {
        let limit = filters.pagination.limit();
        let offset = filters.pagination.offset();

        let scope = DataIsolationService::organization_scope(db, user_id, role).await?;
        let membership_ids = match &scope {
            OrgScope::All => None,
            OrgScope::Memberships(ids) if !ids.is_empty() => Some(ids.clone()),
            // Nothing visible; skip the queries entirely.
            _ => {
                return Ok(PaginatedOrganizationsResponse {
                    data: Vec::new(),
                    meta: PaginationMeta {
                        total: 0,
                        limit,
                        offset,
                        has_more: false,
                    },
                });
            }
        };

        let mut where_clause = String::new();
        let mut bind_index = 0;

        if filters.name.is_some() {
            bind_index += 1;
            where_clause.push_str(&format!(" AND name ILIKE ${}", bind_index));
        }
        if membership_ids.is_some() {
            bind_index += 1;
            where_clause.push_str(&format!(" AND id = ANY(${})", bind_index));
        }

        let name_pattern = filters.name.as_ref().map(|name| format!("%{}%", name));

        let count_query = format!("SELECT COUNT(*) FROM organizations WHERE 1=1{}", where_clause);
        let mut count_sql = sqlx::query_scalar::<_, i64>(&count_query);
        if let Some(pattern) = &name_pattern {
            count_sql = count_sql.bind(pattern);
        }
        if let Some(ids) = &membership_ids {
            count_sql = count_sql.bind(ids);
        }
        let total = count_sql.fetch_one(db).await.map_err(|e| {
            error!(error = %e, "Database error counting organizations");
            AppError::database(e)
        })?;

        let data_query = format!(
            "SELECT {} FROM organizations WHERE 1=1{} ORDER BY created_at DESC LIMIT {} OFFSET {}",
            ORGANIZATION_COLUMNS, where_clause, limit, offset
        );
        let mut data_sql = sqlx::query_as::<_, Organization>(&data_query);
        if let Some(pattern) = &name_pattern {
            data_sql = data_sql.bind(pattern);
        }
        if let Some(ids) = &membership_ids {
            data_sql = data_sql.bind(ids);
        }
        let organizations = data_sql.fetch_all(db).await.map_err(|e| {
            error!(error = %e, "Database error fetching organizations");
            AppError::database(e)
        })?;

        debug!(total = total, returned = organizations.len(), "Organizations fetched");

        Ok(PaginatedOrganizationsResponse {
            data: organizations,
            meta: PaginationMeta {
                total,
                limit,
                offset,
                has_more: offset + limit < total,
            },
        })
    }

    #[instrument(skip(db), fields(organization.id = %organization_id, db.table = "organizations"))]
    pub async fn get(db: &PgPool, organization_id: Uuid) -> Result<Organization, AppError> {
        sqlx::query_as::<_, Organization>(
            "SELECT id, name, contact_email, created_at, updated_at
             FROM organizations WHERE id = $1",
        )
        .bind(organization_id)
        .fetch_optional(db)
        .await
        .map_err(|e| {
            error!(error = %e, "Database error fetching organization");
            AppError::database(e)
        })?
        .ok_or_else(|| AppError::not_found(anyhow::anyhow!("Organization not found")))
    }

    #[instrument(skip(db, payload), fields(organization.id = %organization_id, db.table = "organizations"))]
    pub async fn update(
        db: &PgPool,
        organization_id: Uuid,
        payload: UpdateOrganizationRequest,
    ) -> Result<Organization, AppError> {
        let organization = sqlx::query_as::<_, Organization>(
            "UPDATE organizations
             SET name = COALESCE($1, name),
                 contact_email = COALESCE($2, contact_email),
                 updated_at = now()
             WHERE id = $3
             RETURNING id, name, contact_email, created_at, updated_at",
        )
        .bind(&payload.name)
        .bind(&payload.contact_email)
        .bind(organization_id)
        .fetch_optional(db)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(db_err) = &e
                && db_err.is_unique_violation()
            {
                return AppError::bad_request(anyhow::anyhow!("Organization name already exists"));
            }
            error!(error = %e, "Database error updating organization");
            AppError::database(e)
        })?
        .ok_or_else(|| AppError::not_found(anyhow::anyhow!("Organization not found")))?;

        info!(organization.id = %organization.id, "Organization updated");
        Ok(organization)
    }

    #[instrument(skip(db), fields(organization.id = %organization_id, db.table = "organizations"))]
    pub async fn delete(db: &PgPool, organization_id: Uuid) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM organizations WHERE id = $1")
            .bind(organization_id)
            .execute(db)
            .await
            .map_err(|e| {
                error!(error = %e, "Database error deleting organization");
                AppError::database(e)
            })?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found(anyhow::anyhow!("Organization not found")));
        }

        info!(organization.id = %organization_id, "Organization deleted");
        Ok(())
    }

    /// Add a member to an organization, creating the user account when the
    /// email is not yet registered.
    #[instrument(skip(db, payload), fields(organization.id = %organization_id, db.table = "members"))]
    pub async fn add_member(
        db: &PgPool,
        organization_id: Uuid,
        payload: AddMemberRequest,
    ) -> Result<MemberInfo, AppError> {
        let role = match UserRole::parse(&payload.role) {
            Some(UserRole::OrgAdmin) => UserRole::OrgAdmin,
            Some(UserRole::Viewer) => UserRole::Viewer,
            Some(UserRole::Admin) => {
                return Err(AppError::bad_request(anyhow::anyhow!(
                    "The admin role cannot be granted through membership"
                )));
            }
            None => {
                return Err(AppError::unprocessable(anyhow::anyhow!(
                    "Role must be 'org_admin' or 'viewer'"
                )));
            }
        };

        // Organization existence check doubles as the 404.
        Self::get(db, organization_id).await?;

        let mut tx = db.begin().await.map_err(|e| {
            error!(error = %e, "Database error starting transaction");
            AppError::database(e)
        })?;

        let user_id = sqlx::query_scalar::<_, Uuid>("SELECT id FROM users WHERE email = $1")
            .bind(&payload.email)
            .fetch_optional(&mut *tx)
            .await
            .map_err(|e| {
                error!(error = %e, "Database error looking up member user");
                AppError::database(e)
            })?;

        let user_id = match user_id {
            Some(id) => id,
            None => {
                let hashed = hash_password(&payload.password)?;
                sqlx::query_scalar::<_, Uuid>(
                    "INSERT INTO users (first_name, last_name, email, password, role)
                     VALUES ($1, $2, $3, $4, $5)
                     RETURNING id",
                )
                .bind(&payload.first_name)
                .bind(&payload.last_name)
                .bind(&payload.email)
                .bind(&hashed)
                .bind(role.as_str())
                .fetch_one(&mut *tx)
                .await
                .map_err(|e| {
                    error!(error = %e, "Database error creating member user");
                    AppError::database(e)
                })?
            }
        };

        sqlx::query("INSERT INTO members (user_id, organization_id) VALUES ($1, $2)")
            .bind(user_id)
            .bind(organization_id)
            .execute(&mut *tx)
            .await
            .map_err(|e| {
                if let sqlx::Error::Database(db_err) = &e
                    && db_err.is_unique_violation()
                {
                    return AppError::conflict("User is already a member of this organization");
                }
                error!(error = %e, "Database error adding member");
                AppError::database(e)
            })?;

        let member = sqlx::query_as::<_, MemberInfo>(
            "SELECT m.user_id, u.first_name, u.last_name, u.email, u.role,
                    m.created_at AS joined_at
             FROM members m
             JOIN users u ON u.id = m.user_id
             WHERE m.user_id = $1 AND m.organization_id = $2",
        )
        .bind(user_id)
        .bind(organization_id)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| {
            error!(error = %e, "Database error loading member");
            AppError::database(e)
        })?;

        tx.commit().await.map_err(|e| {
            error!(error = %e, "Database error committing member transaction");
            AppError::database(e)
        })?;

        info!(user.id = %user_id, organization.id = %organization_id, "Member added");
        Ok(member)
    }

    #[instrument(skip(db), fields(organization.id = %organization_id, db.table = "members"))]
    pub async fn list_members(
        db: &PgPool,
        organization_id: Uuid,
    ) -> Result<Vec<MemberInfo>, AppError> {
        Self::get(db, organization_id).await?;

        sqlx::query_as::<_, MemberInfo>(
            "SELECT m.user_id, u.first_name, u.last_name, u.email, u.role,
                    m.created_at AS joined_at
             FROM members m
             JOIN users u ON u.id = m.user_id
             WHERE m.organization_id = $1
             ORDER BY m.created_at",
        )
        .bind(organization_id)
        .fetch_all(db)
        .await
        .map_err(|e| {
            error!(error = %e, "Database error listing members");
            AppError::database(e)
        })
    }
}
