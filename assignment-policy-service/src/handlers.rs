//! HTTP request handlers for the assignment policy service

use axum::{
    extract::{Query, State},
    http::StatusCode,
    Json,
};
use std::sync::Arc;
use std::time::Instant;

use common::types::{ApiResponse, AudienceMode, Classification, DirectoryUser, NewAssignment, Role};

use crate::errors::{AppError, PolicyError};
use crate::metrics::{policy_metrics_handler, PolicyMetricsHelper};
use crate::models::{
    classification_label, role_label, AccessContext, AssignableUsersQuery, AssignmentListing,
    AuthorizationDecision, AuthorizeAssignmentRequest, CreateAssignmentRequest, CreatedAssignment,
    ListAssignmentsQuery, SeparationCheck, SeparationCheckRequest,
};
use crate::validation::validate_authorize_input;
use crate::AppState;

#[utoipa::path(
    post,
    path = "/v1/assignments/authorize",
    tag = "authorization",
    request_body = AuthorizeAssignmentRequest,
    responses(
        (status = 200, description = "Authorization decision made successfully", body = AuthorizationDecision),
        (status = 400, description = "Invalid request parameters", body = crate::documentation::ErrorResponse),
        (status = 500, description = "Internal server error", body = crate::documentation::ErrorResponse)
    )
)]
/// Advisory check: may this actor assign this form to this audience?
///
/// Always answers with a decision object; a denial is a result, not an
/// error. Unrecognized classification or role values fall through to a deny
/// with a displayable reason instead of a deserialization failure.
pub async fn authorize_assignment(
    State(state): State<Arc<AppState>>,
    Json(body): Json<AuthorizeAssignmentRequest>,
) -> Result<Json<AuthorizationDecision>, AppError> {
    validate_authorize_input(&body)?;

    let classification = Classification::parse(&body.classification);
    let role = Role::parse(&body.role);

    let auth_start = Instant::now();
    let decision = match classification {
        None => AuthorizationDecision::denied("unrecognized form classification"),
        Some(classification) => match role {
            Some(role) => {
                state
                    .engine
                    .check_assignment_permission(
                        &body.actor_id,
                        role,
                        classification,
                        &body.audience,
                    )
                    .await
            }
            // An unknown role can hold neither of the privileged roles a
            // classification requires, so it lands on the deny arm directly.
            None => AuthorizationDecision::denied(match classification {
                Classification::MentalHealth => "only HR may assign mental-health forms",
                Classification::Performance => {
                    "only admins and managers may assign performance forms"
                }
            }),
        },
    };
    let auth_duration = auth_start.elapsed();

    let outcome = if decision.can_assign { "allow" } else { "deny" };
    PolicyMetricsHelper::record_authorization_decision(
        outcome,
        role_label(role),
        classification_label(classification),
        auth_duration,
    );
    if role == Some(Role::Manager) && classification == Some(Classification::Performance) {
        let narrowing = if !decision.can_assign {
            "empty"
        } else if decision.reason.is_some() {
            "partial"
        } else {
            "full"
        };
        PolicyMetricsHelper::record_audience_narrowing(narrowing);
    }

    tracing::info!(
        request_id = %body.request_id,
        decision = %outcome,
        role = role_label(role),
        classification = classification_label(classification),
        "assignment authorization decision made"
    );

    Ok(Json(decision))
}

#[utoipa::path(
    get,
    path = "/v1/assignments/assignable-users",
    tag = "authorization",
    params(AssignableUsersQuery),
    responses(
        (status = 200, description = "Assignable users resolved", body = Vec<DirectoryUser>),
        (status = 400, description = "Invalid request parameters", body = crate::documentation::ErrorResponse),
        (status = 403, description = "Role may not assign this classification", body = crate::documentation::ErrorResponse),
        (status = 503, description = "Directory unavailable", body = crate::documentation::ErrorResponse)
    )
)]
/// Candidate-target pool for a prospective assignment.
pub async fn assignable_users(
    State(state): State<Arc<AppState>>,
    Query(query): Query<AssignableUsersQuery>,
) -> Result<Json<ApiResponse<Vec<DirectoryUser>>>, AppError> {
    let classification = Classification::parse(&query.classification)
        .ok_or_else(|| PolicyError::validation("unrecognized form classification"))?;
    let role = Role::parse(&query.role).ok_or_else(|| PolicyError::validation("unrecognized role"))?;

    let users = state
        .engine
        .assignable_users(&query.actor_id, role, classification)
        .await?;
    Ok(Json(ApiResponse::success(users)))
}

#[utoipa::path(
    post,
    path = "/v1/assignments",
    tag = "assignments",
    request_body = CreateAssignmentRequest,
    responses(
        (status = 201, description = "Assignment created", body = CreatedAssignment),
        (status = 400, description = "Invalid request parameters", body = crate::documentation::ErrorResponse),
        (status = 403, description = "Assigner may not create this assignment", body = crate::documentation::ErrorResponse),
        (status = 503, description = "A backing service is unavailable", body = crate::documentation::ErrorResponse)
    )
)]
/// Create an assignment. The assigner's role is re-read from the system of
/// record; any role implied by the caller context is ignored.
pub async fn create_assignment(
    State(state): State<Arc<AppState>>,
    Json(body): Json<CreateAssignmentRequest>,
) -> Result<(StatusCode, Json<ApiResponse<CreatedAssignment>>), AppError> {
    let classification = Classification::parse(&body.classification)
        .ok_or_else(|| PolicyError::validation("unrecognized form classification"))?;
    let mode = AudienceMode::parse(&body.mode)
        .ok_or_else(|| PolicyError::validation("unrecognized audience mode"))?;

    let new = NewAssignment {
        form_id: body.form_id,
        classification,
        assigned_by: body.assigned_by,
        audience: body.audience,
        mode,
        due_date: body.due_date,
    };

    let created = match state.engine.create_assignment(new).await {
        Ok(created) => created,
        Err(err) => {
            PolicyMetricsHelper::record_assignment_operation("create", "rejected");
            return Err(err.into());
        }
    };
    PolicyMetricsHelper::record_assignment_operation("create", "created");

    tracing::info!(
        request_id = body.request_id.as_deref().unwrap_or("-"),
        assignment_id = %created.assignment.id,
        classification = %created.assignment.classification,
        audience_size = created.assignment.audience.len(),
        "assignment created"
    );

    Ok((StatusCode::CREATED, Json(ApiResponse::success(created))))
}

#[utoipa::path(
    get,
    path = "/v1/assignments",
    tag = "assignments",
    params(ListAssignmentsQuery),
    responses(
        (status = 200, description = "Assignments visible to the actor", body = AssignmentListing),
        (status = 400, description = "Invalid request parameters", body = crate::documentation::ErrorResponse),
        (status = 503, description = "Assignment store unavailable", body = crate::documentation::ErrorResponse)
    )
)]
/// List the assignments visible to an actor under the read-side rules.
pub async fn list_assignments(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ListAssignmentsQuery>,
) -> Result<Json<ApiResponse<AssignmentListing>>, AppError> {
    let role = Role::parse(&query.role).ok_or_else(|| PolicyError::validation("unrecognized role"))?;
    let classification = match query.classification.as_deref() {
        Some(raw) => Some(
            Classification::parse(raw)
                .ok_or_else(|| PolicyError::validation("unrecognized form classification"))?,
        ),
        None => None,
    };

    let listing = state
        .engine
        .user_assignments(&query.actor_id, role, classification)
        .await?;
    PolicyMetricsHelper::record_assignment_operation("list", "ok");
    Ok(Json(ApiResponse::success(listing)))
}

#[utoipa::path(
    post,
    path = "/v1/reports/validate-separation",
    tag = "reports",
    request_body = SeparationCheckRequest,
    responses(
        (status = 200, description = "Separation check evaluated", body = SeparationCheck),
        (status = 400, description = "Invalid request parameters", body = crate::documentation::ErrorResponse)
    )
)]
/// Stateless guard used by reporting code paths before including classified
/// data in generated output.
pub async fn validate_separation(
    Json(body): Json<SeparationCheckRequest>,
) -> Result<Json<SeparationCheck>, AppError> {
    let classification = Classification::parse(&body.classification)
        .ok_or_else(|| PolicyError::validation("unrecognized form classification"))?;
    let role = Role::parse(&body.role).ok_or_else(|| PolicyError::validation("unrecognized role"))?;
    let context = AccessContext::parse(&body.context);

    Ok(Json(crate::engine::validate_data_separation(
        classification,
        role,
        context,
    )))
}

#[utoipa::path(
    get,
    path = "/health",
    tag = "health",
    responses(
        (status = 200, description = "Service is healthy", body = crate::documentation::HealthCheckResponse)
    )
)]
/// Health check endpoint
pub async fn health_check() -> Json<crate::documentation::HealthCheckResponse> {
    Json(crate::documentation::HealthCheckResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: chrono::Utc::now().to_rfc3339(),
    })
}

#[utoipa::path(
    get,
    path = "/metrics",
    tag = "metrics",
    responses(
        (status = 200, description = "Prometheus metrics", content_type = "text/plain"),
        (status = 500, description = "Failed to gather metrics")
    )
)]
/// Metrics endpoint
pub async fn get_metrics() -> impl axum::response::IntoResponse {
    policy_metrics_handler().await
}
