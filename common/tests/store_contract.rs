//! Contract tests for the in-memory collaborator implementations.

use common::mocks::{
    InMemoryAssignmentStore, InMemoryAuditLog, InMemoryDirectory, StaticRoleResolver,
};
use common::types::{
    AssignmentQuery, AssignmentStatus, AudienceMode, AuditAction, AuditEntry, Classification,
    DirectoryFilter, DirectoryUser, NewAssignment, Role,
};
use common::{AssignmentStore, AuditStore, DirectoryService, RoleResolver};

fn user(id: &str, manager_id: Option<&str>, active: bool) -> DirectoryUser {
    DirectoryUser {
        id: id.to_string(),
        name: format!("User {id}"),
        email: format!("{id}@talentflow.test"),
        position: None,
        team_id: Some("team-1".to_string()),
        manager_id: manager_id.map(str::to_string),
        active,
    }
}

fn new_assignment(form: &str, by: &str, audience: &[&str], c: Classification) -> NewAssignment {
    NewAssignment {
        form_id: form.to_string(),
        classification: c,
        assigned_by: by.to_string(),
        audience: audience.iter().map(|s| s.to_string()).collect(),
        mode: AudienceMode::Multiple,
        due_date: None,
    }
}

#[tokio::test]
async fn direct_reports_exclude_inactive_and_foreign_users() {
    let directory = InMemoryDirectory::new().with_users([
        user("u1", Some("mgr-1"), true),
        user("u2", Some("mgr-1"), false),
        user("u3", Some("mgr-2"), true),
    ]);

    let reports = directory.find_direct_reports("mgr-1").await.unwrap();
    assert!(reports.contains("u1"));
    assert!(!reports.contains("u2"), "inactive users are not reports");
    assert!(!reports.contains("u3"), "other teams are not reports");
}

#[tokio::test]
async fn active_user_listing_honors_manager_filter() {
    let directory = InMemoryDirectory::new().with_users([
        user("u1", Some("mgr-1"), true),
        user("u2", None, true),
        user("u3", Some("mgr-1"), false),
    ]);

    let all = directory.find_active_users(None).await.unwrap();
    assert_eq!(all.len(), 2);

    let filter = DirectoryFilter {
        manager_id: Some("mgr-1".to_string()),
    };
    let team = directory.find_active_users(Some(&filter)).await.unwrap();
    assert_eq!(team.len(), 1);
    assert_eq!(team[0].id, "u1");
}

#[tokio::test]
async fn insert_generates_identity_and_active_status() {
    let store = InMemoryAssignmentStore::new();
    let created = store
        .insert(new_assignment(
            "form-1",
            "hr-1",
            &["u1", "u2"],
            Classification::MentalHealth,
        ))
        .await
        .unwrap();

    assert!(!created.id.is_empty());
    assert_eq!(created.status, AssignmentStatus::Active);
    assert_eq!(created.created_at, created.updated_at);
    assert_eq!(store.records().len(), 1);
}

#[tokio::test]
async fn query_filters_compose_conjunctively() {
    let store = InMemoryAssignmentStore::new();
    store
        .insert(new_assignment(
            "form-1",
            "hr-1",
            &["u1"],
            Classification::MentalHealth,
        ))
        .await
        .unwrap();
    store
        .insert(new_assignment(
            "form-2",
            "mgr-1",
            &["u1", "u2"],
            Classification::Performance,
        ))
        .await
        .unwrap();

    let by_audience = store
        .query(&AssignmentQuery {
            audience_contains: Some("u1".to_string()),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(by_audience.len(), 2);

    let narrowed = store
        .query(&AssignmentQuery {
            audience_contains: Some("u1".to_string()),
            classification: Some(Classification::Performance),
            created_by: Some("mgr-1".to_string()),
        })
        .await
        .unwrap();
    assert_eq!(narrowed.len(), 1);
    assert_eq!(narrowed[0].form_id, "form-2");
}

#[tokio::test]
async fn failure_injection_surfaces_as_errors() {
    let directory = InMemoryDirectory::failing();
    assert!(directory.find_direct_reports("mgr-1").await.is_err());
    assert!(directory.find_active_users(None).await.is_err());

    let store = InMemoryAssignmentStore::failing();
    assert!(store.query(&AssignmentQuery::default()).await.is_err());

    let audit = InMemoryAuditLog::failing();
    let entry = AuditEntry::new(
        "hr-1",
        Classification::MentalHealth,
        AuditAction::View,
        None,
    );
    assert!(audit.append(entry).await.is_err());
}

#[tokio::test]
async fn role_resolver_reads_the_configured_role() {
    let resolver = StaticRoleResolver::new()
        .with_role("hr-1", Role::Hr)
        .with_role("adm-1", Role::Admin);

    assert_eq!(resolver.current_role("hr-1").await.unwrap(), Role::Hr);
    assert_eq!(resolver.current_role("adm-1").await.unwrap(), Role::Admin);
    assert!(
        resolver.current_role("ghost").await.is_err(),
        "unknown users are an error, not a default role"
    );
}
