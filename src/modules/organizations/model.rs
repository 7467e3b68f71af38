use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use crate::utils::pagination::{PaginationMeta, PaginationParams};

/// A tenant. All cohorts, participants and attempts hang off one of these.
#[derive(Serialize, FromRow, Debug, Clone, ToSchema)]
pub struct Organization {
    pub id: Uuid,
    pub name: String,
    pub contact_email: Option<String>,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Deserialize, Validate, Debug, ToSchema)]
pub struct CreateOrganizationRequest {
    #[validate(length(min = 1, max = 200, message = "Name must be 1-200 characters"))]
    pub name: String,
    #[validate(email(message = "Invalid contact email format"))]
    pub contact_email: Option<String>,
}

#[derive(Deserialize, Validate, Debug, ToSchema)]
pub struct UpdateOrganizationRequest {
    #[validate(length(min = 1, max = 200, message = "Name must be 1-200 characters"))]
    pub name: Option<String>,
    #[validate(email(message = "Invalid contact email format"))]
    pub contact_email: Option<String>,
}

#[derive(Deserialize, Debug, Default, IntoParams)]
pub struct OrganizationFilterParams {
    /// Substring match on the organization name.
    pub name: Option<String>,
    #[serde(flatten)]
    pub pagination: PaginationParams,
}

#[derive(Serialize, Debug, ToSchema)]
pub struct PaginatedOrganizationsResponse {
    pub data: Vec<Organization>,
    pub meta: PaginationMeta,
}

/// A membership row joined with the member's user record.
#[derive(Serialize, FromRow, Debug, Clone, ToSchema)]
pub struct MemberInfo {
    pub user_id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub role: String,
    pub joined_at: chrono::DateTime<chrono::Utc>,
}

/// Adds a member, creating the user account when the email is new.
#[derive(Deserialize, Validate, Debug, ToSchema)]
pub struct AddMemberRequest {
    #[validate(email(message = "Invalid email format"))]
    pub email: String,
    #[validate(length(min = 1, max = 100, message = "First name must be 1-100 characters"))]
    pub first_name: String,
    #[validate(length(min = 1, max = 100, message = "Last name must be 1-100 characters"))]
    pub last_name: String,
    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub password: String,
    /// `org_admin` or `viewer`; the global admin role cannot be granted here.
    pub role: String,
}
