use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use crate::utils::pagination::{PaginationMeta, PaginationParams};
use crate::utils::serde::deserialize_optional_uuid;

/// A person taking assessments. Participants belong to one organization and
/// optionally to a cohort; they hold no login account.
#[derive(Serialize, FromRow, Debug, Clone, ToSchema)]
pub struct Participant {
    pub id: Uuid,
    pub organization_id: Uuid,
    pub cohort_id: Option<Uuid>,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Deserialize, Validate, Debug, ToSchema)]
pub struct CreateParticipantRequest {
    #[validate(length(min = 1, max = 100, message = "First name must be 1-100 characters"))]
    pub first_name: String,
    #[validate(length(min = 1, max = 100, message = "Last name must be 1-100 characters"))]
    pub last_name: String,
    #[validate(email(message = "Invalid email format"))]
    pub email: String,
    #[serde(default, deserialize_with = "deserialize_optional_uuid")]
    pub cohort_id: Option<Uuid>,
    /// When true, an invitation email is sent after creation.
    #[serde(default)]
    pub send_invitation: bool,
}

#[derive(Deserialize, Validate, Debug, ToSchema)]
pub struct UpdateParticipantRequest {
    #[validate(length(min = 1, max = 100, message = "First name must be 1-100 characters"))]
    pub first_name: Option<String>,
    #[validate(length(min = 1, max = 100, message = "Last name must be 1-100 characters"))]
    pub last_name: Option<String>,
    #[serde(default, deserialize_with = "deserialize_optional_uuid")]
    pub cohort_id: Option<Uuid>,
}

#[derive(Deserialize, Debug, Default, IntoParams)]
pub struct ParticipantFilterParams {
    /// Substring match against first or last name.
    pub name: Option<String>,
    /// Substring match on the email address.
    pub email: Option<String>,
    #[serde(default, deserialize_with = "deserialize_optional_uuid")]
    pub cohort_id: Option<Uuid>,
    #[serde(flatten)]
    pub pagination: PaginationParams,
}

#[derive(Serialize, Debug, ToSchema)]
pub struct PaginatedParticipantsResponse {
    pub data: Vec<Participant>,
    pub meta: PaginationMeta,
}
