//! Data models and types for the assignment policy service

use chrono::{DateTime, Utc};
use common::types::{Assignment, Classification, Role};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

/// Advisory authorization check for a prospective assignment.
///
/// `role` and `classification` travel as raw strings so unrecognized values
/// can fall through to a deny instead of a deserialization failure.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AuthorizeAssignmentRequest {
    /// Unique identifier for this authorization request
    pub request_id: String,
    /// The actor asking to assign the form
    pub actor_id: String,
    /// The actor's role as claimed by the caller (advisory only)
    pub role: String,
    /// Sensitivity classification of the form being assigned
    pub classification: String,
    /// Target user ids the actor wishes to assign to
    pub audience: Vec<String>,
}

/// Outcome of a policy check. Transient; never persisted.
///
/// Invariants: `can_assign == false` implies `allowed_audience` is empty, and
/// `allowed_audience` is always a subset of the requested audience — the
/// engine narrows, it never expands.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct AuthorizationDecision {
    pub can_assign: bool,
    pub can_view_results: bool,
    pub allowed_audience: Vec<String>,
    /// Human-readable explanation for a denial or partial narrowing,
    /// suitable for direct display.
    pub reason: Option<String>,
}

impl AuthorizationDecision {
    pub fn denied(reason: impl Into<String>) -> Self {
        Self {
            can_assign: false,
            can_view_results: false,
            allowed_audience: Vec::new(),
            reason: Some(reason.into()),
        }
    }

    pub fn allowed(allowed_audience: Vec<String>) -> Self {
        Self {
            can_assign: true,
            can_view_results: true,
            allowed_audience,
            reason: None,
        }
    }
}

/// Request to create an assignment.
///
/// No role field: the creation path re-reads the assigner's role from the
/// system of record and ignores whatever the caller believes it is.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CreateAssignmentRequest {
    pub request_id: Option<String>,
    pub form_id: String,
    pub assigned_by: String,
    pub audience: Vec<String>,
    pub mode: String,
    pub classification: String,
    pub due_date: Option<DateTime<Utc>>,
}

/// Audience entry with a best-effort resolved display name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct AudienceMember {
    pub id: String,
    pub name: Option<String>,
}

/// A freshly persisted assignment plus display-name enrichment.
///
/// The names are best-effort: a directory outage leaves them `None` without
/// failing the creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct CreatedAssignment {
    pub assignment: Assignment,
    pub assigned_by_name: Option<String>,
    pub audience: Vec<AudienceMember>,
}

/// Read-side listing result. Suppressed listings are success with a notice,
/// never an error.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct AssignmentListing {
    pub assignments: Vec<Assignment>,
    pub notice: Option<String>,
}

/// Query parameters for the assignable-users endpoint.
#[derive(Debug, Clone, Deserialize, IntoParams)]
pub struct AssignableUsersQuery {
    pub actor_id: String,
    pub role: String,
    pub classification: String,
}

/// Query parameters for the assignment listing endpoint.
#[derive(Debug, Clone, Deserialize, IntoParams)]
pub struct ListAssignmentsQuery {
    pub actor_id: String,
    pub role: String,
    pub classification: Option<String>,
}

/// Where classified data is about to be used.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum AccessContext {
    Report,
    General,
}

impl AccessContext {
    /// Anything that is not explicitly a report is treated as general access;
    /// the stricter any-context rule still applies either way.
    pub fn parse(value: &str) -> Self {
        match value.trim() {
            "report" => Self::Report,
            _ => Self::General,
        }
    }
}

/// Request body for the data-separation guard.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SeparationCheckRequest {
    pub classification: String,
    pub role: String,
    pub context: String,
}

/// Result of the data-separation guard. Pure data, no hidden state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct SeparationCheck {
    pub valid: bool,
    pub reason: Option<String>,
}

impl SeparationCheck {
    pub const fn valid() -> Self {
        Self {
            valid: true,
            reason: None,
        }
    }

    pub fn invalid(reason: impl Into<String>) -> Self {
        Self {
            valid: false,
            reason: Some(reason.into()),
        }
    }
}

/// Metric label helpers; unparsed values collapse to "unknown" so raw user
/// input never becomes a label.
pub(crate) fn role_label(role: Option<Role>) -> &'static str {
    role.map_or("unknown", Role::as_str)
}

pub(crate) fn classification_label(classification: Option<Classification>) -> &'static str {
    classification.map_or("unknown", Classification::as_str)
}
