//! Organization-scoped data isolation.
//!
//! Every tenant-scoped query goes through [`DataIsolationService`], which
//! intersects the requested organization against the caller's permitted set:
//! admins see everything, org_admins see their memberships, everyone else
//! sees nothing.

use sqlx::PgPool;
use tracing::{error, instrument};
use uuid::Uuid;

use crate::modules::auth::model::UserRole;
use crate::utils::errors::AppError;

/// The set of organizations a caller may touch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OrgScope {
    /// Global access (admin role).
    All,
    /// Access limited to the listed memberships (org_admin role).
    Memberships(Vec<Uuid>),
    /// No tenant access at all.
    None,
}

impl OrgScope {
    pub fn allows(&self, organization_id: Uuid) -> bool {
        match self {
            OrgScope::All => true,
            OrgScope::Memberships(ids) => ids.contains(&organization_id),
            OrgScope::None => false,
        }
    }
}

pub struct DataIsolationService;

impl DataIsolationService {
    /// Resolve the caller's organization scope from their role and the
    /// `members` table.
    #[instrument(skip(db), fields(user.id = %user_id, user.role = ?role))]
    pub async fn organization_scope(
        db: &PgPool,
        user_id: Uuid,
        role: UserRole,
    ) -> Result<OrgScope, AppError> {
        match role {
            UserRole::Admin => Ok(OrgScope::All),
            UserRole::OrgAdmin => {
                let ids = sqlx::query_scalar::<_, Uuid>(
                    "SELECT organization_id FROM members WHERE user_id = $1",
                )
                .bind(user_id)
                .fetch_all(db)
                .await
                .map_err(|e| {
                    error!(user.id = %user_id, error = %e, "Database error loading memberships");
                    AppError::database(e)
                })?;
                Ok(OrgScope::Memberships(ids))
            }
            UserRole::Viewer => Ok(OrgScope::None),
        }
    }

    pub async fn can_access_organization(
        db: &PgPool,
        user_id: Uuid,
        role: UserRole,
        organization_id: Uuid,
    ) -> Result<bool, AppError> {
        let scope = Self::organization_scope(db, user_id, role).await?;
        Ok(scope.allows(organization_id))
    }

    /// Like [`Self::can_access_organization`] but maps denial to 403.
    pub async fn ensure_access(
        db: &PgPool,
        user_id: Uuid,
        role: UserRole,
        organization_id: Uuid,
    ) -> Result<(), AppError> {
        if Self::can_access_organization(db, user_id, role, organization_id).await? {
            Ok(())
        } else {
            Err(AppError::forbidden(
                "Access denied for this organization".to_string(),
            ))
        }
    }
}
