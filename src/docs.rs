use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::modules::admin::model::PaginatedUsersResponse;
use crate::modules::attempts::model::{
    Attempt, CompleteAttemptRequest, RecordResponseRequest, Response, StartAttemptRequest,
};
use crate::modules::auth::controller::ErrorResponse;
use crate::modules::auth::model::{
    ForgotPasswordRequest, LoginRequest, LoginResponse, MeResponse, MessageResponse,
    PasscodeRequest, PasscodeVerifyRequest, ResetPasswordRequest, SwitchOrganizationRequest,
    User, UserRole,
};
use crate::modules::cohorts::model::{
    Cohort, CreateCohortRequest, PaginatedCohortsResponse, UpdateCohortRequest,
};
use crate::modules::organizations::model::{
    AddMemberRequest, CreateOrganizationRequest, MemberInfo, Organization,
    PaginatedOrganizationsResponse, UpdateOrganizationRequest,
};
use crate::modules::participants::model::{
    CreateParticipantRequest, PaginatedParticipantsResponse, Participant,
    UpdateParticipantRequest,
};
use crate::modules::sessions::Session;
use crate::utils::pagination::{PaginationMeta, PaginationParams};

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::modules::auth::controller::login,
        crate::modules::auth::controller::logout,
        crate::modules::auth::controller::me,
        crate::modules::auth::controller::switch_active_organization,
        crate::modules::auth::controller::forgot_password,
        crate::modules::auth::controller::reset_password,
        crate::modules::auth::controller::request_passcode,
        crate::modules::auth::controller::verify_passcode,
        crate::modules::organizations::controller::create_organization,
        crate::modules::organizations::controller::list_organizations,
        crate::modules::organizations::controller::get_organization,
        crate::modules::organizations::controller::update_organization,
        crate::modules::organizations::controller::delete_organization,
        crate::modules::organizations::controller::add_member,
        crate::modules::organizations::controller::list_members,
        crate::modules::cohorts::controller::create_cohort,
        crate::modules::cohorts::controller::list_cohorts,
        crate::modules::cohorts::controller::get_cohort,
        crate::modules::cohorts::controller::update_cohort,
        crate::modules::cohorts::controller::delete_cohort,
        crate::modules::participants::controller::create_participant,
        crate::modules::participants::controller::list_participants,
        crate::modules::participants::controller::get_participant,
        crate::modules::participants::controller::update_participant,
        crate::modules::participants::controller::delete_participant,
        crate::modules::attempts::controller::start_attempt,
        crate::modules::attempts::controller::list_attempts,
        crate::modules::attempts::controller::get_attempt,
        crate::modules::attempts::controller::complete_attempt,
        crate::modules::attempts::controller::delete_attempt,
        crate::modules::attempts::controller::record_response,
        crate::modules::attempts::controller::list_responses,
        crate::modules::admin::controller::list_users,
    ),
    components(
        schemas(
            User,
            UserRole,
            Session,
            LoginRequest,
            LoginResponse,
            MeResponse,
            SwitchOrganizationRequest,
            ForgotPasswordRequest,
            ResetPasswordRequest,
            PasscodeRequest,
            PasscodeVerifyRequest,
            MessageResponse,
            ErrorResponse,
            Organization,
            CreateOrganizationRequest,
            UpdateOrganizationRequest,
            PaginatedOrganizationsResponse,
            MemberInfo,
            AddMemberRequest,
            Cohort,
            CreateCohortRequest,
            UpdateCohortRequest,
            PaginatedCohortsResponse,
            Participant,
            CreateParticipantRequest,
            UpdateParticipantRequest,
            PaginatedParticipantsResponse,
            Attempt,
            StartAttemptRequest,
            CompleteAttemptRequest,
            Response,
            RecordResponseRequest,
            PaginatedUsersResponse,
            PaginationMeta,
            PaginationParams,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Authentication", description = "Sessions, passcodes and password resets"),
        (name = "Organizations", description = "Tenant and membership management"),
        (name = "Cohorts", description = "Cohort management within an organization"),
        (name = "Participants", description = "Participant management within an organization"),
        (name = "Attempts", description = "Assessment attempts, responses and reports"),
        (name = "Admin", description = "Cross-tenant administration")
    ),
    info(
        title = "Scorebook API",
        version = "0.1.0",
        description = "Multi-tenant assessment reporting backend built with Rust, Axum, and PostgreSQL.",
        contact(
            name = "API Support",
            email = "support@scorebook.app"
        ),
        license(
            name = "MIT"
        )
    )
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .description(Some("Opaque session token from POST /api/auth/login"))
                        .build(),
                ),
            );
        }
    }
}
