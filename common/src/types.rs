//! Shared domain types for the TalentFlow policy workspace

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// Role carried by an authenticated actor.
///
/// Sourced from the actor's profile by the surrounding application; immutable
/// for the duration of a session. The set is closed on purpose: every policy
/// decision matches exhaustively over `(Classification, Role)` so a new role
/// cannot be introduced without revisiting each decision site.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Employee,
    Manager,
    Hr,
    Admin,
}

impl Role {
    /// Parse a wire-format role string. Unknown values yield `None` so the
    /// boundary can fall through to a deny rather than panicking or guessing.
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim() {
            "employee" => Some(Self::Employee),
            "manager" => Some(Self::Manager),
            "hr" => Some(Self::Hr),
            "admin" => Some(Self::Admin),
            _ => None,
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Employee => "employee",
            Self::Manager => "manager",
            Self::Hr => "hr",
            Self::Admin => "admin",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Sensitivity classification attached to a form at creation time.
///
/// `MentalHealth` data is confidential to HR; every access rule in the
/// policy engine keys off this tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum Classification {
    Performance,
    MentalHealth,
}

impl Classification {
    /// Parse a wire-format classification. Unknown values yield `None`; the
    /// caller surfaces the "unrecognized form classification" outcome.
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim() {
            "performance" => Some(Self::Performance),
            "mental_health" => Some(Self::MentalHealth),
            _ => None,
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Performance => "performance",
            Self::MentalHealth => "mental_health",
        }
    }
}

impl std::fmt::Display for Classification {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How the audience of an assignment was selected in the UI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum AudienceMode {
    Individual,
    Multiple,
    All,
}

impl AudienceMode {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim() {
            "individual" => Some(Self::Individual),
            "multiple" => Some(Self::Multiple),
            "all" => Some(Self::All),
            _ => None,
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Individual => "individual",
            Self::Multiple => "multiple",
            Self::All => "all",
        }
    }
}

/// Lifecycle status of an assignment. The policy engine only ever creates
/// `Active` records; the other transitions belong to external code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum AssignmentStatus {
    Active,
    Completed,
    Expired,
}

/// A directive that a given form must be completed by a given audience.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Assignment {
    pub id: String,
    pub form_id: String,
    pub classification: Classification,
    pub assigned_by: String,
    /// Target user ids. Non-empty and free of duplicates.
    pub audience: Vec<String>,
    pub mode: AudienceMode,
    pub due_date: Option<DateTime<Utc>>,
    pub status: AssignmentStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Insert shape for an assignment; the store fills in id, status and
/// timestamps.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewAssignment {
    pub form_id: String,
    pub classification: Classification,
    pub assigned_by: String,
    pub audience: Vec<String>,
    pub mode: AudienceMode,
    pub due_date: Option<DateTime<Utc>>,
}

/// Conjunctive filter over stored assignments.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AssignmentQuery {
    pub classification: Option<Classification>,
    pub created_by: Option<String>,
    /// Matches assignments whose audience contains this user id.
    pub audience_contains: Option<String>,
}

impl AssignmentQuery {
    pub fn matches(&self, assignment: &Assignment) -> bool {
        if let Some(classification) = self.classification {
            if assignment.classification != classification {
                return false;
            }
        }
        if let Some(created_by) = &self.created_by {
            if &assignment.assigned_by != created_by {
                return false;
            }
        }
        if let Some(target) = &self.audience_contains {
            if !assignment.audience.iter().any(|id| id == target) {
                return false;
            }
        }
        true
    }
}

/// A user record as resolved through the directory service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct DirectoryUser {
    pub id: String,
    pub name: String,
    pub email: String,
    pub position: Option<String>,
    pub team_id: Option<String>,
    pub manager_id: Option<String>,
    pub active: bool,
}

/// Filter for directory user listings.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DirectoryFilter {
    /// Restrict to users whose manager reference equals this id.
    pub manager_id: Option<String>,
}

/// Kind of access being recorded against classified data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum AuditAction {
    View,
    Assign,
    Create,
    Update,
    Delete,
}

impl AuditAction {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::View => "view",
            Self::Assign => "assign",
            Self::Create => "create",
            Self::Update => "update",
            Self::Delete => "delete",
        }
    }
}

/// Append-only record of an access to classified data.
///
/// Write-only from the policy engine's perspective; never read back.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditEntry {
    pub id: Uuid,
    pub actor_id: String,
    pub classification: Classification,
    pub action: AuditAction,
    pub detail: Option<String>,
    pub timestamp: DateTime<Utc>,
}

impl AuditEntry {
    pub fn new(
        actor_id: impl Into<String>,
        classification: Classification,
        action: AuditAction,
        detail: Option<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            actor_id: actor_id.into(),
            classification,
            action,
            detail,
            timestamp: Utc::now(),
        }
    }
}

/// Standard response wrapper for API endpoints
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    pub error: Option<String>,
    pub timestamp: DateTime<Utc>,
    pub request_id: Option<Uuid>,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
            timestamp: Utc::now(),
            request_id: None,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message.into()),
            timestamp: Utc::now(),
            request_id: None,
        }
    }

    #[must_use]
    pub fn with_request_id(mut self, request_id: Uuid) -> Self {
        self.request_id = Some(request_id);
        self
    }
}
