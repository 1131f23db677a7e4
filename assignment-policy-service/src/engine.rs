//! The form-assignment authorization policy engine.
//!
//! Every decision is a stateless function of its inputs plus at most one
//! directory read (audience narrowing) or one read-then-write pair
//! (assignment creation). The engine holds no mutable state of its own; the
//! four collaborators are injected at construction so tests substitute
//! in-memory fakes.
//!
//! Failure policy: read-side dependency failures degrade to denials, never
//! to silent allows. The creation path aborts without a partial write. Audit
//! writes are best-effort and never surface.

use std::collections::{HashMap, HashSet};

use common::store::{DynAssignmentStore, DynAuditStore, DynDirectoryService, DynRoleResolver};
use common::types::{
    Assignment, AssignmentQuery, AuditAction, Classification, DirectoryFilter, DirectoryUser,
    NewAssignment, Role,
};

use crate::audit::AuditTrail;
use crate::errors::PolicyError;
use crate::models::{
    AccessContext, AssignmentListing, AudienceMember, AuthorizationDecision, CreatedAssignment,
    SeparationCheck,
};
use crate::validation::validate_new_assignment;

pub struct PolicyEngine {
    directory: DynDirectoryService,
    assignments: DynAssignmentStore,
    roles: DynRoleResolver,
    audit: AuditTrail,
}

impl PolicyEngine {
    pub fn new(
        directory: DynDirectoryService,
        assignments: DynAssignmentStore,
        roles: DynRoleResolver,
        audit_store: DynAuditStore,
    ) -> Self {
        Self {
            directory,
            assignments,
            roles,
            audit: AuditTrail::new(audit_store),
        }
    }

    /// Advisory permission check for assigning a form to an audience.
    ///
    /// First matching rule wins. The manager/performance path narrows the
    /// requested audience to the actor's direct reports; a directory failure
    /// denies ("failed to verify team membership") rather than propagating.
    pub async fn check_assignment_permission(
        &self,
        actor_id: &str,
        role: Role,
        classification: Classification,
        requested_audience: &[String],
    ) -> AuthorizationDecision {
        let requested = dedup_preserving_order(requested_audience);
        if requested.is_empty() {
            return AuthorizationDecision::denied("requested audience must not be empty");
        }

        match (classification, role) {
            (Classification::MentalHealth, Role::Hr) => AuthorizationDecision::allowed(requested),
            (Classification::MentalHealth, Role::Employee | Role::Manager | Role::Admin) => {
                AuthorizationDecision::denied("only HR may assign mental-health forms")
            }
            (Classification::Performance, Role::Admin) => {
                AuthorizationDecision::allowed(requested)
            }
            (Classification::Performance, Role::Manager) => {
                let reports = match self.directory.find_direct_reports(actor_id).await {
                    Ok(reports) => reports,
                    Err(err) => {
                        tracing::warn!(
                            error = %err,
                            actor_id,
                            "direct-report lookup failed, denying assignment"
                        );
                        return AuthorizationDecision::denied("failed to verify team membership");
                    }
                };
                let allowed: Vec<String> = requested
                    .iter()
                    .filter(|id| reports.contains(id.as_str()))
                    .cloned()
                    .collect();
                let narrowed = allowed.len() < requested.len();
                AuthorizationDecision {
                    can_assign: !allowed.is_empty(),
                    can_view_results: true,
                    allowed_audience: allowed,
                    reason: narrowed
                        .then(|| "some users are not in your direct team".to_string()),
                }
            }
            (Classification::Performance, Role::Employee | Role::Hr) => {
                AuthorizationDecision::denied("only admins and managers may assign performance forms")
            }
        }
    }

    /// Candidate-target pool for a prospective assignment, before any
    /// specific audience is chosen.
    ///
    /// Consistent with [`Self::check_assignment_permission`]: every user this
    /// returns is accepted by the per-request check for the same actor, role
    /// and classification.
    pub async fn assignable_users(
        &self,
        actor_id: &str,
        role: Role,
        classification: Classification,
    ) -> Result<Vec<DirectoryUser>, PolicyError> {
        match (classification, role) {
            (Classification::MentalHealth, Role::Hr) => self
                .directory
                .find_active_users(None)
                .await
                .map_err(|e| PolicyError::dependency("directory", e)),
            (Classification::MentalHealth, Role::Employee | Role::Manager | Role::Admin) => Err(
                PolicyError::permission_denied("only HR users may assign mental-health forms"),
            ),
            (Classification::Performance, Role::Admin) => self
                .directory
                .find_active_users(None)
                .await
                .map_err(|e| PolicyError::dependency("directory", e)),
            (Classification::Performance, Role::Manager) => {
                let filter = DirectoryFilter {
                    manager_id: Some(actor_id.to_string()),
                };
                self.directory
                    .find_active_users(Some(&filter))
                    .await
                    .map_err(|e| PolicyError::dependency("directory", e))
            }
            (Classification::Performance, Role::Employee | Role::Hr) => {
                Err(PolicyError::permission_denied(
                    "only admins and managers may assign performance forms",
                ))
            }
        }
    }

    /// Create an assignment. This is the last line of defense: the assigner's
    /// role is re-read from the system of record at call time, never taken
    /// from the caller.
    pub async fn create_assignment(
        &self,
        mut new: NewAssignment,
    ) -> Result<CreatedAssignment, PolicyError> {
        new.audience = dedup_preserving_order(&new.audience);
        validate_new_assignment(&new)?;

        let role = self
            .roles
            .current_role(&new.assigned_by)
            .await
            .map_err(|e| PolicyError::dependency("role resolver", e))?;

        if new.classification == Classification::MentalHealth && role != Role::Hr {
            return Err(PolicyError::permission_denied(
                "only HR users may create mental-health assignments",
            ));
        }

        let assignment = self
            .assignments
            .insert(new)
            .await
            .map_err(|e| PolicyError::dependency("assignment store", e))?;

        if assignment.classification == Classification::MentalHealth {
            self.audit
                .record(
                    &assignment.assigned_by,
                    Classification::MentalHealth,
                    AuditAction::Create,
                    Some(format!(
                        "created assignment {} for {} recipient(s)",
                        assignment.id,
                        assignment.audience.len()
                    )),
                )
                .await;
        }

        let (assigned_by_name, audience) = self.resolve_display_names(&assignment).await;
        Ok(CreatedAssignment {
            assignment,
            assigned_by_name,
            audience,
        })
    }

    /// Read-side visibility. Distinct from the write-side checks: what an
    /// actor may list is not what they may assign.
    pub async fn user_assignments(
        &self,
        actor_id: &str,
        role: Role,
        classification: Option<Classification>,
    ) -> Result<AssignmentListing, PolicyError> {
        if classification == Some(Classification::MentalHealth) && role != Role::Hr {
            return self.restricted_mental_health_listing(actor_id, role).await;
        }

        let assignments = match role {
            Role::Admin => {
                self.query(AssignmentQuery {
                    classification,
                    ..Default::default()
                })
                .await?
            }
            Role::Hr => {
                let mut results = match classification {
                    // Performance filter: HR has no blanket visibility there,
                    // only what it created itself.
                    Some(Classification::Performance) => Vec::new(),
                    _ => {
                        self.query(AssignmentQuery {
                            classification: Some(Classification::MentalHealth),
                            ..Default::default()
                        })
                        .await?
                    }
                };
                let own = self
                    .query(AssignmentQuery {
                        created_by: Some(actor_id.to_string()),
                        classification,
                        ..Default::default()
                    })
                    .await?;
                merge_by_id(&mut results, own);
                results
            }
            Role::Manager => {
                let mut results = self
                    .query(AssignmentQuery {
                        created_by: Some(actor_id.to_string()),
                        classification,
                        ..Default::default()
                    })
                    .await?;
                let addressed = self
                    .query(AssignmentQuery {
                        audience_contains: Some(actor_id.to_string()),
                        classification,
                        ..Default::default()
                    })
                    .await?;
                merge_by_id(&mut results, addressed);
                results
            }
            Role::Employee => {
                self.query(AssignmentQuery {
                    audience_contains: Some(actor_id.to_string()),
                    classification,
                    ..Default::default()
                })
                .await?
            }
        };

        let assignments = sort_newest_first(assignments);
        self.audit_sensitive_view(actor_id, &assignments).await;
        Ok(AssignmentListing {
            assignments,
            notice: None,
        })
    }

    /// The mental-health-specific query path for non-HR roles.
    ///
    /// Admins receive an unconditionally empty listing: their metadata-level
    /// visibility is intentionally overridden here. Managers and employees
    /// see only assignments naming them in the audience (their own
    /// check-ins), never anyone else's. Both outcomes are success, so a
    /// non-HR caller cannot distinguish "none exist" from "none visible".
    async fn restricted_mental_health_listing(
        &self,
        actor_id: &str,
        role: Role,
    ) -> Result<AssignmentListing, PolicyError> {
        if role == Role::Admin {
            return Ok(AssignmentListing {
                assignments: Vec::new(),
                notice: Some("mental-health assignment data is restricted to HR".to_string()),
            });
        }

        let own = self
            .query(AssignmentQuery {
                classification: Some(Classification::MentalHealth),
                audience_contains: Some(actor_id.to_string()),
                ..Default::default()
            })
            .await?;
        let assignments = sort_newest_first(own);
        self.audit_sensitive_view(actor_id, &assignments).await;
        Ok(AssignmentListing {
            assignments,
            notice: Some("showing only mental-health assignments addressed to you".to_string()),
        })
    }

    /// Record an access to classified data. Fire-and-forget; see
    /// [`AuditTrail::record`].
    pub async fn log_data_access(
        &self,
        actor_id: &str,
        classification: Classification,
        action: AuditAction,
        detail: Option<String>,
    ) {
        self.audit
            .record(actor_id, classification, action, detail)
            .await;
    }

    async fn query(&self, query: AssignmentQuery) -> Result<Vec<Assignment>, PolicyError> {
        self.assignments
            .query(&query)
            .await
            .map_err(|e| PolicyError::dependency("assignment store", e))
    }

    async fn audit_sensitive_view(&self, actor_id: &str, assignments: &[Assignment]) {
        let sensitive = assignments
            .iter()
            .filter(|a| a.classification == Classification::MentalHealth)
            .count();
        if sensitive > 0 {
            self.audit
                .record(
                    actor_id,
                    Classification::MentalHealth,
                    AuditAction::View,
                    Some(format!("listed {sensitive} mental-health assignment(s)")),
                )
                .await;
        }
    }

    /// Best-effort display-name enrichment; a directory outage leaves the
    /// names unresolved without failing the operation.
    async fn resolve_display_names(
        &self,
        assignment: &Assignment,
    ) -> (Option<String>, Vec<AudienceMember>) {
        match self.directory.find_active_users(None).await {
            Ok(users) => {
                let names: HashMap<&str, &str> = users
                    .iter()
                    .map(|u| (u.id.as_str(), u.name.as_str()))
                    .collect();
                let assigned_by_name = names
                    .get(assignment.assigned_by.as_str())
                    .map(|n| (*n).to_string());
                let audience = assignment
                    .audience
                    .iter()
                    .map(|id| AudienceMember {
                        id: id.clone(),
                        name: names.get(id.as_str()).map(|n| (*n).to_string()),
                    })
                    .collect();
                (assigned_by_name, audience)
            }
            Err(err) => {
                tracing::warn!(error = %err, "display-name enrichment failed, returning bare ids");
                let audience = assignment
                    .audience
                    .iter()
                    .map(|id| AudienceMember {
                        id: id.clone(),
                        name: None,
                    })
                    .collect();
                (None, audience)
            }
        }
    }
}

/// Stateless guard for reporting code paths: may data of this classification
/// appear in output produced for this role in this context?
pub fn validate_data_separation(
    classification: Classification,
    role: Role,
    context: AccessContext,
) -> SeparationCheck {
    match (classification, role, context) {
        (Classification::MentalHealth, Role::Hr, _) => SeparationCheck::valid(),
        (Classification::MentalHealth, _, AccessContext::Report) => {
            SeparationCheck::invalid("mental-health data must not appear in managerial reports")
        }
        (Classification::MentalHealth, _, AccessContext::General) => {
            SeparationCheck::invalid("only HR may access mental-health data")
        }
        (Classification::Performance, _, _) => SeparationCheck::valid(),
    }
}

fn dedup_preserving_order(ids: &[String]) -> Vec<String> {
    let mut seen = HashSet::new();
    ids.iter()
        .filter(|id| seen.insert(id.as_str()))
        .cloned()
        .collect()
}

fn merge_by_id(into: &mut Vec<Assignment>, from: Vec<Assignment>) {
    let existing: HashSet<String> = into.iter().map(|a| a.id.clone()).collect();
    into.extend(from.into_iter().filter(|a| !existing.contains(&a.id)));
}

fn sort_newest_first(mut assignments: Vec<Assignment>) -> Vec<Assignment> {
    assignments.sort_by(|a, b| {
        b.created_at
            .cmp(&a.created_at)
            .then_with(|| a.id.cmp(&b.id))
    });
    assignments
}
