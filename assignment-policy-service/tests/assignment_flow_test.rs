//! End-to-end assignment flows: creation with the authoritative role
//! re-check, then read-side visibility per role.

use std::sync::Arc;

use assignment_policy_service::{app, AppState, PolicyEngine};
use common::mocks::{
    InMemoryAssignmentStore, InMemoryAuditLog, InMemoryDirectory, StaticRoleResolver,
};
use common::types::{AuditAction, Role};
use serde_json::json;
use tokio::net::TcpListener;

struct TestApp {
    base: String,
    client: reqwest::Client,
    audit: InMemoryAuditLog,
    roles: StaticRoleResolver,
}

async fn spawn_app() -> TestApp {
    let directory = InMemoryDirectory::new();
    let store = InMemoryAssignmentStore::new();
    let audit = InMemoryAuditLog::new();
    let roles = StaticRoleResolver::new();
    let engine = PolicyEngine::new(
        Arc::new(directory),
        Arc::new(store),
        Arc::new(roles.clone()),
        Arc::new(audit.clone()),
    );
    let state = Arc::new(AppState { engine });

    let listener = TcpListener::bind(("127.0.0.1", 0)).await.unwrap();
    let addr = listener.local_addr().unwrap();
    let app = app(state);
    tokio::spawn(async move { axum::serve(listener, app).await.unwrap() });

    TestApp {
        base: format!("http://{}", addr),
        client: reqwest::Client::new(),
        audit,
        roles,
    }
}

impl TestApp {
    async fn create_assignment(
        &self,
        assigned_by: &str,
        audience: &[&str],
        classification: &str,
    ) -> reqwest::Response {
        self.client
            .post(format!("{}/v1/assignments", self.base))
            .json(&json!({
                "form_id": "form-1",
                "assigned_by": assigned_by,
                "audience": audience,
                "mode": "multiple",
                "classification": classification,
            }))
            .send()
            .await
            .unwrap()
    }

    async fn list_assignments(
        &self,
        actor_id: &str,
        role: &str,
        classification: Option<&str>,
    ) -> serde_json::Value {
        let mut request = self
            .client
            .get(format!("{}/v1/assignments", self.base))
            .query(&[("actor_id", actor_id), ("role", role)]);
        if let Some(classification) = classification {
            request = request.query(&[("classification", classification)]);
        }
        let response = request.send().await.unwrap();
        assert_eq!(response.status(), 200);
        response.json().await.unwrap()
    }
}

#[tokio::test]
async fn the_stored_role_decides_mental_health_creation() {
    let test_app = spawn_app().await;
    test_app.roles.set_role("adm-1", Role::Admin);
    test_app.roles.set_role("hr-1", Role::Hr);

    // The role re-read says admin, so the creation is rejected no matter
    // what the caller context believed.
    let response = test_app
        .create_assignment("adm-1", &["u1", "u2"], "mental_health")
        .await;
    assert_eq!(response.status(), 403);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["success"], false);
    assert_eq!(
        body["error"]["message"],
        "only HR users may create mental-health assignments"
    );

    let response = test_app
        .create_assignment("hr-1", &["u1", "u2"], "mental_health")
        .await;
    assert_eq!(response.status(), 201);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["assignment"]["status"], "active");
    assert_eq!(
        body["data"]["assignment"]["audience"],
        json!(["u1", "u2"])
    );
}

#[tokio::test]
async fn mental_health_visibility_end_to_end() {
    let test_app = spawn_app().await;
    test_app.roles.set_role("hr-1", Role::Hr);

    let response = test_app
        .create_assignment("hr-1", &["emp-1"], "mental_health")
        .await;
    assert_eq!(response.status(), 201);

    // The assigned employee sees their own check-in.
    let body = test_app
        .list_assignments("emp-1", "employee", Some("mental_health"))
        .await;
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["assignments"].as_array().unwrap().len(), 1);

    // A manager who neither created it nor is in the audience sees nothing.
    let body = test_app
        .list_assignments("mgr-1", "manager", Some("mental_health"))
        .await;
    assert_eq!(body["success"], true);
    assert!(body["data"]["assignments"].as_array().unwrap().is_empty());

    // An admin's mental-health query is empty with a notice, never an error.
    let body = test_app
        .list_assignments("adm-1", "admin", Some("mental_health"))
        .await;
    assert_eq!(body["success"], true);
    assert!(body["data"]["assignments"].as_array().unwrap().is_empty());
    assert!(body["data"]["notice"].is_string());

    // HR sees every mental-health assignment.
    let body = test_app
        .list_assignments("hr-1", "hr", Some("mental_health"))
        .await;
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["assignments"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn sensitive_operations_leave_an_audit_trail() {
    let test_app = spawn_app().await;
    test_app.roles.set_role("hr-1", Role::Hr);

    test_app
        .create_assignment("hr-1", &["emp-1"], "mental_health")
        .await;
    test_app
        .list_assignments("hr-1", "hr", Some("mental_health"))
        .await;

    let entries = test_app.audit.entries();
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0].action, AuditAction::Create);
    assert_eq!(entries[1].action, AuditAction::View);
}

#[tokio::test]
async fn empty_audience_is_rejected_before_persistence() {
    let test_app = spawn_app().await;
    test_app.roles.set_role("hr-1", Role::Hr);

    let response = test_app
        .create_assignment("hr-1", &[], "mental_health")
        .await;
    assert_eq!(response.status(), 400);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["success"], false);
    assert_eq!(
        body["error"]["message"],
        "assignment audience must not be empty"
    );
}

#[tokio::test]
async fn admins_cannot_enumerate_mental_health_candidates() {
    let test_app = spawn_app().await;

    let response = test_app
        .client
        .get(format!(
            "{}/v1/assignments/assignable-users",
            test_app.base
        ))
        .query(&[
            ("actor_id", "adm-1"),
            ("role", "admin"),
            ("classification", "mental_health"),
        ])
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 403);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["success"], false);
    assert_eq!(
        body["error"]["message"],
        "only HR users may assign mental-health forms"
    );
}
