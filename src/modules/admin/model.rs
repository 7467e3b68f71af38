use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::modules::auth::model::User;
use crate::utils::pagination::{PaginationMeta, PaginationParams};

#[derive(Deserialize, Debug, Default, IntoParams)]
pub struct UserFilterParams {
    /// Substring match against first or last name.
    pub name: Option<String>,
    /// Substring match on the email address.
    pub email: Option<String>,
    /// Exact role slug (`admin`, `org_admin` or `viewer`).
    pub role: Option<String>,
    #[serde(flatten)]
    pub pagination: PaginationParams,
}

#[derive(Serialize, Debug, ToSchema)]
pub struct PaginatedUsersResponse {
    pub data: Vec<User>,
    pub meta: PaginationMeta,
}
