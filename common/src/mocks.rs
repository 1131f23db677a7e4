//! In-memory implementations of the collaborator contracts
//!
//! These back the policy engine in tests and in the default service wiring,
//! so the engine can be exercised without a real directory or database. Each
//! implementation carries a failure switch to simulate an unavailable
//! dependency.

use crate::errors::CommonError;
use crate::store::{AssignmentStore, AuditStore, DirectoryService, RoleResolver};
use crate::types::{
    Assignment, AssignmentQuery, AssignmentStatus, AuditEntry, DirectoryFilter, DirectoryUser,
    NewAssignment, Role,
};
use async_trait::async_trait;
use chrono::Utc;
use std::collections::{HashMap, HashSet};
use std::error::Error;
use std::sync::{Arc, Mutex};
use uuid::Uuid;

fn unavailable(what: &str) -> Box<dyn Error + Send + Sync> {
    Box::new(CommonError::ServiceUnavailable {
        message: format!("{what} unavailable (injected failure)"),
    })
}

/// In-memory directory backed by a flat user list.
#[derive(Debug, Clone, Default)]
pub struct InMemoryDirectory {
    users: Arc<Mutex<Vec<DirectoryUser>>>,
    should_fail: Arc<Mutex<bool>>,
}

impl InMemoryDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a directory that will fail every lookup.
    pub fn failing() -> Self {
        let directory = Self::new();
        directory.set_should_fail(true);
        directory
    }

    pub fn set_should_fail(&self, should_fail: bool) {
        *self.should_fail.lock().unwrap() = should_fail;
    }

    pub fn add_user(&self, user: DirectoryUser) {
        self.users.lock().unwrap().push(user);
    }

    #[must_use]
    pub fn with_users(self, users: impl IntoIterator<Item = DirectoryUser>) -> Self {
        self.users.lock().unwrap().extend(users);
        self
    }
}

#[async_trait]
impl DirectoryService for InMemoryDirectory {
    async fn find_direct_reports(
        &self,
        manager_id: &str,
    ) -> Result<HashSet<String>, Box<dyn Error + Send + Sync>> {
        if *self.should_fail.lock().unwrap() {
            return Err(unavailable("directory"));
        }
        let users = self.users.lock().unwrap();
        Ok(users
            .iter()
            .filter(|u| u.active && u.manager_id.as_deref() == Some(manager_id))
            .map(|u| u.id.clone())
            .collect())
    }

    async fn find_active_users(
        &self,
        filter: Option<&DirectoryFilter>,
    ) -> Result<Vec<DirectoryUser>, Box<dyn Error + Send + Sync>> {
        if *self.should_fail.lock().unwrap() {
            return Err(unavailable("directory"));
        }
        let users = self.users.lock().unwrap();
        Ok(users
            .iter()
            .filter(|u| u.active)
            .filter(|u| match filter.and_then(|f| f.manager_id.as_deref()) {
                Some(manager_id) => u.manager_id.as_deref() == Some(manager_id),
                None => true,
            })
            .cloned()
            .collect())
    }
}

/// In-memory assignment store.
#[derive(Debug, Clone, Default)]
pub struct InMemoryAssignmentStore {
    records: Arc<Mutex<Vec<Assignment>>>,
    should_fail: Arc<Mutex<bool>>,
}

impl InMemoryAssignmentStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing() -> Self {
        let store = Self::new();
        store.set_should_fail(true);
        store
    }

    pub fn set_should_fail(&self, should_fail: bool) {
        *self.should_fail.lock().unwrap() = should_fail;
    }

    /// Snapshot of every stored record, for test assertions.
    pub fn records(&self) -> Vec<Assignment> {
        self.records.lock().unwrap().clone()
    }
}

#[async_trait]
impl AssignmentStore for InMemoryAssignmentStore {
    async fn insert(
        &self,
        new: NewAssignment,
    ) -> Result<Assignment, Box<dyn Error + Send + Sync>> {
        if *self.should_fail.lock().unwrap() {
            return Err(unavailable("assignment store"));
        }
        let now = Utc::now();
        let assignment = Assignment {
            id: Uuid::new_v4().to_string(),
            form_id: new.form_id,
            classification: new.classification,
            assigned_by: new.assigned_by,
            audience: new.audience,
            mode: new.mode,
            due_date: new.due_date,
            status: AssignmentStatus::Active,
            created_at: now,
            updated_at: now,
        };
        self.records.lock().unwrap().push(assignment.clone());
        Ok(assignment)
    }

    async fn query(
        &self,
        query: &AssignmentQuery,
    ) -> Result<Vec<Assignment>, Box<dyn Error + Send + Sync>> {
        if *self.should_fail.lock().unwrap() {
            return Err(unavailable("assignment store"));
        }
        let records = self.records.lock().unwrap();
        Ok(records.iter().filter(|a| query.matches(a)).cloned().collect())
    }
}

/// In-memory append-only audit log.
#[derive(Debug, Clone, Default)]
pub struct InMemoryAuditLog {
    entries: Arc<Mutex<Vec<AuditEntry>>>,
    should_fail: Arc<Mutex<bool>>,
}

impl InMemoryAuditLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing() -> Self {
        let log = Self::new();
        log.set_should_fail(true);
        log
    }

    pub fn set_should_fail(&self, should_fail: bool) {
        *self.should_fail.lock().unwrap() = should_fail;
    }

    pub fn entries(&self) -> Vec<AuditEntry> {
        self.entries.lock().unwrap().clone()
    }
}

#[async_trait]
impl AuditStore for InMemoryAuditLog {
    async fn append(&self, entry: AuditEntry) -> Result<(), Box<dyn Error + Send + Sync>> {
        if *self.should_fail.lock().unwrap() {
            return Err(unavailable("audit store"));
        }
        self.entries.lock().unwrap().push(entry);
        Ok(())
    }
}

/// Role lookup backed by a fixed map, standing in for the system of record.
#[derive(Debug, Clone, Default)]
pub struct StaticRoleResolver {
    roles: Arc<Mutex<HashMap<String, Role>>>,
    should_fail: Arc<Mutex<bool>>,
}

impl StaticRoleResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing() -> Self {
        let resolver = Self::new();
        resolver.set_should_fail(true);
        resolver
    }

    pub fn set_should_fail(&self, should_fail: bool) {
        *self.should_fail.lock().unwrap() = should_fail;
    }

    pub fn set_role(&self, user_id: impl Into<String>, role: Role) {
        self.roles.lock().unwrap().insert(user_id.into(), role);
    }

    #[must_use]
    pub fn with_role(self, user_id: impl Into<String>, role: Role) -> Self {
        self.set_role(user_id, role);
        self
    }
}

#[async_trait]
impl RoleResolver for StaticRoleResolver {
    async fn current_role(&self, user_id: &str) -> Result<Role, Box<dyn Error + Send + Sync>> {
        if *self.should_fail.lock().unwrap() {
            return Err(unavailable("role resolver"));
        }
        self.roles
            .lock()
            .unwrap()
            .get(user_id)
            .copied()
            .ok_or_else(|| {
                Box::new(CommonError::NotFound {
                    resource: format!("user {user_id}"),
                }) as Box<dyn Error + Send + Sync>
            })
    }
}
