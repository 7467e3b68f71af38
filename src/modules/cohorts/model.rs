use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use crate::utils::pagination::{PaginationMeta, PaginationParams};

/// A named group of participants within one organization, e.g. a workshop
/// intake or a training round.
#[derive(Serialize, FromRow, Debug, Clone, ToSchema)]
pub struct Cohort {
    pub id: Uuid,
    pub organization_id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Deserialize, Validate, Debug, ToSchema)]
pub struct CreateCohortRequest {
    #[validate(length(min = 1, max = 200, message = "Name must be 1-200 characters"))]
    pub name: String,
    #[validate(length(max = 2000, message = "Description must be at most 2000 characters"))]
    pub description: Option<String>,
}

#[derive(Deserialize, Validate, Debug, ToSchema)]
pub struct UpdateCohortRequest {
    #[validate(length(min = 1, max = 200, message = "Name must be 1-200 characters"))]
    pub name: Option<String>,
    #[validate(length(max = 2000, message = "Description must be at most 2000 characters"))]
    pub description: Option<String>,
}

#[derive(Deserialize, Debug, Default, IntoParams)]
pub struct CohortFilterParams {
    /// Substring match on the cohort name.
    pub name: Option<String>,
    #[serde(flatten)]
    pub pagination: PaginationParams,
}

#[derive(Serialize, Debug, ToSchema)]
pub struct PaginatedCohortsResponse {
    pub data: Vec<Cohort>,
    pub meta: PaginationMeta,
}
