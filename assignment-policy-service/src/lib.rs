#![forbid(unsafe_code)]
#![deny(rust_2018_idioms, future_incompatible)]
//! Form-assignment authorization policy service for TalentFlow.
//!
//! The core is [`engine::PolicyEngine`]: given a requester's role, a form's
//! sensitivity classification and a target audience, it decides whether an
//! action (assign / view / report) is permitted and narrows the audience to
//! permissible targets. The HTTP layer in [`handlers`] is a thin facade over
//! the engine for the surrounding application's request handlers.

use std::sync::Arc;

use axum::{
    http,
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::CorsLayer,
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};

pub mod audit;
pub mod config;
pub mod documentation;
pub mod engine;
pub mod errors;
pub mod handlers;
pub mod metrics;
pub mod models;
pub mod validation;

pub use documentation::ApiDoc;
pub use engine::{validate_data_separation, PolicyEngine};
pub use errors::{AppError, PolicyError};
pub use models::{
    AccessContext, AssignmentListing, AudienceMember, AuthorizationDecision,
    AuthorizeAssignmentRequest, CreateAssignmentRequest, CreatedAssignment, SeparationCheck,
    SeparationCheckRequest,
};

pub struct AppState {
    pub engine: PolicyEngine,
}

pub fn app(state: Arc<AppState>) -> Router {
    let cors = match std::env::var("ALLOWED_ORIGINS") {
        Ok(origins) if !origins.trim().is_empty() => {
            let mut layer = CorsLayer::new();
            for o in origins.split(',') {
                if let Ok(origin) = o.trim().parse::<http::HeaderValue>() {
                    layer = layer.allow_origin(origin);
                }
            }
            layer
        }
        _ => {
            // Default to no origins unless explicitly configured
            CorsLayer::new()
        }
    };

    Router::new()
        .route("/health", get(handlers::health_check))
        .route(
            "/v1/assignments/authorize",
            post(handlers::authorize_assignment),
        )
        .route(
            "/v1/assignments/assignable-users",
            get(handlers::assignable_users),
        )
        .route(
            "/v1/assignments",
            post(handlers::create_assignment).get(handlers::list_assignments),
        )
        .route(
            "/v1/reports/validate-separation",
            post(handlers::validate_separation),
        )
        .route("/metrics", get(handlers::get_metrics))
        .layer(axum::middleware::from_fn(
            metrics::policy_metrics_middleware,
        ))
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
