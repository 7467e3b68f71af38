use sqlx::PgPool;
use tracing::{debug, error, instrument};

use crate::modules::auth::model::{User, UserRole};
use crate::utils::errors::AppError;
use crate::utils::pagination::PaginationMeta;

use super::model::{PaginatedUsersResponse, UserFilterParams};

const USER_COLUMNS: &str = "id, first_name, last_name, email, password, role, created_at, updated_at";

pub struct AdminService;

impl AdminService {
    /// List user accounts across all tenants, filtered and paginated.
    #[instrument(skip(db, filters), fields(db.table = "users"))]
    pub async fn list_users(
        db: &PgPool,
        filters: UserFilterParams,
    ) -> Result<PaginatedUsersResponse, AppError> {
        let limit = filters.pagination.limit();
        let offset = filters.pagination.offset();

        let role = match &filters.role {
            Some(slug) => Some(UserRole::parse(slug).ok_or_else(|| {
                AppError::unprocessable(anyhow::anyhow!(
                    "Role must be 'admin', 'org_admin' or 'viewer'"
                ))
            })?),
            None => None,
        };

        let mut where_clause = String::new();
        let mut bind_index = 0;

        if filters.name.is_some() {
            bind_index += 1;
            where_clause.push_str(&format!(
                " AND (first_name || ' ' || last_name) ILIKE ${}",
                bind_index
            ));
        }
        if filters.email.is_some() {
            bind_index += 1;
            where_clause.push_str(&format!(" AND email ILIKE ${}", bind_index));
        }
        if role.is_some() {
            bind_index += 1;
            where_clause.push_str(&format!(" AND role = ${}", bind_index));
        }

        let name_pattern = filters.name.as_ref().map(|name| format!("%{}%", name));
        let email_pattern = filters.email.as_ref().map(|email| format!("%{}%", email));

        let count_query = format!("SELECT COUNT(*) FROM users WHERE 1=1{}", where_clause);
        let mut count_sql = sqlx::query_scalar::<_, i64>(&count_query);
        if let Some(pattern) = &name_pattern {
            count_sql = count_sql.bind(pattern);
        }
        if let Some(pattern) = &email_pattern {
            count_sql = count_sql.bind(pattern);
        }
        if let Some(role) = role {
            count_sql = count_sql.bind(role.as_str());
        }
        let total = count_sql.fetch_one(db).await.map_err(|e| {
            error!(error = %e, "Database error counting users");
            AppError::database(e)
        })?;

        let data_query = format!(
            "SELECT {} FROM users WHERE 1=1{} ORDER BY created_at DESC LIMIT {} OFFSET {}",
            USER_COLUMNS, where_clause, limit, offset
        );
        let mut data_sql = sqlx::query_as::<_, User>(&data_query);
        if let Some(pattern) = &name_pattern {
            data_sql = data_sql.bind(pattern);
        }
        if let Some(pattern) = &email_pattern {
            data_sql = data_sql.bind(pattern);
        }
        if let Some(role) = role {
            data_sql = data_sql.bind(role.as_str());
        }
        let users = data_sql.fetch_all(db).await.map_err(|e| {
            error!(error = %e, "Database error fetching users");
            AppError::database(e)
        })?;

        debug!(total = total, returned = users.len(), "Users fetched");

        Ok(PaginatedUsersResponse {
            data: users,
            meta: PaginationMeta {
                total,
                limit,
                offset,
                has_more: offset + limit < total,
            },
        })
    }
}
