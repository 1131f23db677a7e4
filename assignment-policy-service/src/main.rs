use std::sync::Arc;

use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use utoipa::OpenApi;

use assignment_policy_service::{app, config::AppConfig, ApiDoc, AppState, PolicyEngine};
use common::mocks::{
    InMemoryAssignmentStore, InMemoryAuditLog, InMemoryDirectory, StaticRoleResolver,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Default wiring uses the in-memory collaborators; production deployments
    // construct the engine over their own directory/store implementations.
    let engine = PolicyEngine::new(
        Arc::new(InMemoryDirectory::new()),
        Arc::new(InMemoryAssignmentStore::new()),
        Arc::new(StaticRoleResolver::new()),
        Arc::new(InMemoryAuditLog::new()),
    );
    let state = Arc::new(AppState { engine });
    let openapi = ApiDoc::openapi();

    let app = app(state).route(
        "/openapi.json",
        axum::routing::get(move || async { axum::Json(openapi) }),
    );

    let cfg = AppConfig::from_env();
    let listener = TcpListener::bind(cfg.bind_addr).await?;
    tracing::info!("assignment-policy-service listening on {}", cfg.bind_addr);
    axum::serve(listener, app).await?;
    Ok(())
}
