//! Property tests for the decision invariants: the engine only ever narrows
//! a requested audience, and a denial always carries an empty audience.

use std::collections::HashSet;
use std::sync::Arc;

use assignment_policy_service::PolicyEngine;
use common::mocks::{
    InMemoryAssignmentStore, InMemoryAuditLog, InMemoryDirectory, StaticRoleResolver,
};
use common::types::{Classification, DirectoryUser, Role};
use proptest::prelude::*;

fn engine_with_reports(manager_id: &str, reports: &[&str]) -> PolicyEngine {
    let directory = InMemoryDirectory::new().with_users(reports.iter().map(|id| DirectoryUser {
        id: id.to_string(),
        name: format!("User {id}"),
        email: format!("{id}@talentflow.test"),
        position: None,
        team_id: None,
        manager_id: Some(manager_id.to_string()),
        active: true,
    }));
    PolicyEngine::new(
        Arc::new(directory),
        Arc::new(InMemoryAssignmentStore::new()),
        Arc::new(StaticRoleResolver::new()),
        Arc::new(InMemoryAuditLog::new()),
    )
}

fn role_strategy() -> impl Strategy<Value = Role> {
    prop_oneof![
        Just(Role::Employee),
        Just(Role::Manager),
        Just(Role::Hr),
        Just(Role::Admin),
    ]
}

fn classification_strategy() -> impl Strategy<Value = Classification> {
    prop_oneof![
        Just(Classification::Performance),
        Just(Classification::MentalHealth),
    ]
}

// Small id pool so duplicates and report/non-report overlap both occur.
fn audience_strategy() -> impl Strategy<Value = Vec<String>> {
    prop::collection::vec(
        prop_oneof![
            Just("u1".to_string()),
            Just("u2".to_string()),
            Just("u3".to_string()),
            Just("u4".to_string()),
        ],
        0..8,
    )
}

proptest! {
    #[test]
    fn allowed_audience_is_never_expanded(
        role in role_strategy(),
        classification in classification_strategy(),
        audience in audience_strategy(),
    ) {
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();
        let engine = engine_with_reports("mgr-1", &["u1", "u2"]);

        let decision = rt.block_on(engine.check_assignment_permission(
            "mgr-1",
            role,
            classification,
            &audience,
        ));

        let requested: HashSet<&str> = audience.iter().map(String::as_str).collect();
        for allowed in &decision.allowed_audience {
            prop_assert!(
                requested.contains(allowed.as_str()),
                "allowed id {allowed} was never requested"
            );
        }

        // Coupling invariant: no allowance without assignability.
        if !decision.can_assign {
            prop_assert!(decision.allowed_audience.is_empty());
        }

        // The allowed audience never contains duplicates.
        let unique: HashSet<&str> =
            decision.allowed_audience.iter().map(String::as_str).collect();
        prop_assert_eq!(unique.len(), decision.allowed_audience.len());
    }

    #[test]
    fn hr_mental_health_audience_is_passed_through_exactly(
        audience in audience_strategy(),
    ) {
        prop_assume!(!audience.is_empty());
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();
        let engine = engine_with_reports("mgr-1", &["u1", "u2"]);

        let decision = rt.block_on(engine.check_assignment_permission(
            "hr-1",
            Role::Hr,
            Classification::MentalHealth,
            &audience,
        ));

        prop_assert!(decision.can_assign);
        // Exactly the requested audience, in order, minus duplicates.
        let mut seen = HashSet::new();
        let expected: Vec<&String> =
            audience.iter().filter(|id| seen.insert(id.as_str())).collect();
        let actual: Vec<&String> = decision.allowed_audience.iter().collect();
        prop_assert_eq!(actual, expected);
    }
}
