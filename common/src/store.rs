//! Collaborator contracts consumed by the policy engine.
//!
//! The engine never talks to a concrete backend: it is constructed over these
//! four traits so tests (and the default service wiring) can substitute the
//! in-memory implementations from [`crate::mocks`] without any module-level
//! mutable state.

use crate::types::{
    Assignment, AssignmentQuery, AuditEntry, DirectoryFilter, DirectoryUser, NewAssignment, Role,
};
use async_trait::async_trait;
use std::collections::HashSet;
use std::error::Error;

/// External user/org-chart lookup service.
#[async_trait]
pub trait DirectoryService: Send + Sync {
    /// Resolve the set of active users whose manager reference equals
    /// `manager_id`.
    async fn find_direct_reports(
        &self,
        manager_id: &str,
    ) -> Result<HashSet<String>, Box<dyn Error + Send + Sync>>;

    /// List active users, optionally narrowed by a filter.
    async fn find_active_users(
        &self,
        filter: Option<&DirectoryFilter>,
    ) -> Result<Vec<DirectoryUser>, Box<dyn Error + Send + Sync>>;
}

/// Persistence for assignment records.
#[async_trait]
pub trait AssignmentStore: Send + Sync {
    /// Persist a new assignment, generating its id, status and timestamps.
    async fn insert(
        &self,
        new: NewAssignment,
    ) -> Result<Assignment, Box<dyn Error + Send + Sync>>;

    /// Return all assignments matching the (conjunctive) query.
    async fn query(
        &self,
        query: &AssignmentQuery,
    ) -> Result<Vec<Assignment>, Box<dyn Error + Send + Sync>>;
}

/// Append-only sink for sensitive-data access records.
#[async_trait]
pub trait AuditStore: Send + Sync {
    async fn append(&self, entry: AuditEntry) -> Result<(), Box<dyn Error + Send + Sync>>;
}

/// Authoritative role lookup against the system of record.
///
/// Used only by assignment creation, which never trusts a role value passed
/// by the caller.
#[async_trait]
pub trait RoleResolver: Send + Sync {
    async fn current_role(&self, user_id: &str) -> Result<Role, Box<dyn Error + Send + Sync>>;
}

// Type aliases for convenience - use Arc to enable cloning
pub type DynDirectoryService = std::sync::Arc<dyn DirectoryService>;
pub type DynAssignmentStore = std::sync::Arc<dyn AssignmentStore>;
pub type DynAuditStore = std::sync::Arc<dyn AuditStore>;
pub type DynRoleResolver = std::sync::Arc<dyn RoleResolver>;
