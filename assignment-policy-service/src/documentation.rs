use utoipa::{
    openapi::security::{ApiKey, ApiKeyValue, Http, HttpAuthScheme, SecurityScheme},
    Modify, OpenApi,
};

use common::types::{
    Assignment, AssignmentStatus, AudienceMode, Classification, DirectoryUser, Role,
};

use crate::models::{
    AccessContext, AssignmentListing, AudienceMember, AuthorizationDecision,
    AuthorizeAssignmentRequest, CreateAssignmentRequest, CreatedAssignment, SeparationCheck,
    SeparationCheckRequest,
};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "TalentFlow Assignment Policy API",
        version = "1.0.0",
        description = "Form-assignment authorization policy engine: role/classification decisions, audience narrowing and read-side visibility",
        contact(
            name = "TalentFlow Platform Team",
            email = "platform@talentflow.example"
        ),
        license(
            name = "MIT OR Apache-2.0",
            url = "https://github.com/talentflow/talentflow-policy"
        )
    ),
    servers(
        (url = "http://localhost:8081", description = "Local development server")
    ),
    paths(
        crate::handlers::authorize_assignment,
        crate::handlers::assignable_users,
        crate::handlers::create_assignment,
        crate::handlers::list_assignments,
        crate::handlers::validate_separation,
        crate::handlers::health_check,
        crate::handlers::get_metrics,
    ),
    components(
        schemas(
            AuthorizeAssignmentRequest,
            AuthorizationDecision,
            CreateAssignmentRequest,
            CreatedAssignment,
            AudienceMember,
            AssignmentListing,
            SeparationCheckRequest,
            SeparationCheck,
            AccessContext,
            Assignment,
            AssignmentStatus,
            AudienceMode,
            Classification,
            DirectoryUser,
            Role,
            HealthCheckResponse,
            ErrorResponse,
            ErrorDetails,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "authorization", description = "Authorization operations"),
        (name = "assignments", description = "Assignment creation and listing"),
        (name = "reports", description = "Data-separation guards for reporting"),
        (name = "health", description = "Health check operations"),
        (name = "metrics", description = "Metrics operations")
    )
)]
pub struct ApiDoc;

pub struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "api_key",
                SecurityScheme::ApiKey(ApiKey::Header(ApiKeyValue::new("X-API-Key"))),
            );
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(Http::new(HttpAuthScheme::Bearer)),
            );
        }
    }
}

#[derive(serde::Serialize, serde::Deserialize, utoipa::ToSchema)]
pub struct HealthCheckResponse {
    pub status: String,
    pub version: String,
    pub timestamp: String,
}

#[derive(serde::Serialize, serde::Deserialize, utoipa::ToSchema)]
pub struct ErrorResponse {
    pub success: bool,
    pub error: ErrorDetails,
}

#[derive(serde::Serialize, serde::Deserialize, utoipa::ToSchema)]
pub struct ErrorDetails {
    #[schema(example = "permission_denied")]
    pub r#type: String,
    #[schema(example = "only HR may assign mental-health forms")]
    pub message: String,
    #[schema(example = 403)]
    pub status: u16,
}
