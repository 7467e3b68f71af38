use std::fmt;

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::modules::sessions::Session;
use crate::utils::errors::AppError;
use crate::utils::serde::deserialize_optional_uuid;

/// Access role stored on the `users` row.
///
/// `Admin` is global, `OrgAdmin` is scoped to the organizations listed in
/// `members`, `Viewer` holds no tenant rights.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    Admin,
    OrgAdmin,
    Viewer,
}

impl UserRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::Admin => "admin",
            UserRole::OrgAdmin => "org_admin",
            UserRole::Viewer => "viewer",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "admin" => Some(UserRole::Admin),
            "org_admin" => Some(UserRole::OrgAdmin),
            "viewer" => Some(UserRole::Viewer),
            _ => None,
        }
    }
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Serialize, FromRow, Debug, Clone, ToSchema)]
pub struct User {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password: String,
    pub role: String,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

impl User {
    /// Parse the stored role column. A row with an unknown role is a data
    /// bug, surfaced as a 500.
    pub fn user_role(&self) -> Result<UserRole, AppError> {
        UserRole::parse(&self.role).ok_or_else(|| {
            AppError::internal(anyhow::anyhow!("Unknown role '{}' on user {}", self.role, self.id))
        })
    }
}

#[derive(Deserialize, Validate, Debug, ToSchema)]
pub struct LoginRequest {
    #[validate(email(message = "Invalid email format"))]
    pub email: String,
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

#[derive(Serialize, Debug, ToSchema)]
pub struct LoginResponse {
    /// Opaque session token, presented as a bearer token.
    pub token: String,
    pub expires_at: chrono::DateTime<chrono::Utc>,
    pub user: User,
}

#[derive(Serialize, Debug, ToSchema)]
pub struct MeResponse {
    pub user: User,
    pub session: Session,
}

#[derive(Deserialize, Validate, Debug, ToSchema)]
pub struct SwitchOrganizationRequest {
    /// `null` clears the active organization.
    #[serde(default, deserialize_with = "deserialize_optional_uuid")]
    pub organization_id: Option<Uuid>,
}

#[derive(Deserialize, Validate, Debug, ToSchema)]
pub struct ForgotPasswordRequest {
    #[validate(email(message = "Invalid email format"))]
    pub email: String,
}

#[derive(Deserialize, Validate, Debug, ToSchema)]
pub struct ResetPasswordRequest {
    #[validate(email(message = "Invalid email format"))]
    pub email: String,
    #[validate(length(equal = 6, message = "Code must be 6 digits"))]
    pub code: String,
    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub new_password: String,
}

#[derive(Deserialize, Validate, Debug, ToSchema)]
pub struct PasscodeRequest {
    #[validate(email(message = "Invalid email format"))]
    pub email: String,
}

#[derive(Deserialize, Validate, Debug, ToSchema)]
pub struct PasscodeVerifyRequest {
    #[validate(email(message = "Invalid email format"))]
    pub email: String,
    #[validate(length(equal = 6, message = "Code must be 6 digits"))]
    pub code: String,
}

#[derive(Serialize, Debug, ToSchema)]
pub struct MessageResponse {
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_round_trips_through_slug() {
        for role in [UserRole::Admin, UserRole::OrgAdmin, UserRole::Viewer] {
            assert_eq!(UserRole::parse(role.as_str()), Some(role));
        }
    }

    #[test]
    fn test_unknown_role_rejected() {
        assert_eq!(UserRole::parse("superuser"), None);
        assert_eq!(UserRole::parse(""), None);
    }

    #[test]
    fn test_password_not_serialized() {
        let now = chrono::Utc::now();
        let user = User {
            id: Uuid::new_v4(),
            first_name: "Ada".to_string(),
            last_name: "Lovelace".to_string(),
            email: "ada@example.com".to_string(),
            password: "secret-hash".to_string(),
            role: "viewer".to_string(),
            created_at: now,
            updated_at: now,
        };
        let serialized = serde_json::to_string(&user).unwrap();
        assert!(!serialized.contains("secret-hash"));
    }
}
