use std::collections::BTreeSet;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::lifecycle::LifecycleAction;

/// Identifier wrapper for reported issues.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct IssueId(pub String);

impl fmt::Display for IssueId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Identifier wrapper for registered technicians.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TechnicianId(pub String);

impl fmt::Display for TechnicianId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Identifier of the resident who filed a report.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ReporterId(pub String);

impl fmt::Display for ReporterId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Trade a maintenance issue belongs to and a technician can be skilled in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Category {
    Electrical,
    Plumbing,
    Civil,
}

impl Category {
    pub const fn ordered() -> [Self; 3] {
        [Self::Electrical, Self::Plumbing, Self::Civil]
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Electrical => "Electrical",
            Self::Plumbing => "Plumbing",
            Self::Civil => "Civil",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Severity {
    Low,
    Medium,
    High,
}

impl Severity {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Low => "Low",
            Self::Medium => "Medium",
            Self::High => "High",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Lifecycle position of an issue. Transitions live in `lifecycle`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum IssueStatus {
    Open,
    Assigned,
    InProgress,
    Resolved,
}

impl IssueStatus {
    pub const fn ordered() -> [Self; 4] {
        [Self::Open, Self::Assigned, Self::InProgress, Self::Resolved]
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Open => "Open",
            Self::Assigned => "Assigned",
            Self::InProgress => "In Progress",
            Self::Resolved => "Resolved",
        }
    }

    /// Statuses that hold a technician's active assignment.
    pub const fn is_active_assignment(self) -> bool {
        matches!(self, Self::Assigned | Self::InProgress)
    }
}

impl fmt::Display for IssueStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Illustrative map position. Not geocoded.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lng: f64,
}

/// Resident supplied report, before classification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssueReport {
    pub title: String,
    pub description: String,
    pub location: String,
}

/// A single reported maintenance problem tracked through its lifecycle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Issue {
    pub id: IssueId,
    pub reporter_id: ReporterId,
    pub reporter_name: String,
    pub title: String,
    pub description: String,
    pub category: Category,
    pub severity: Severity,
    pub status: IssueStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assigned_technician: Option<TechnicianId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assigned_technician_name: Option<String>,
    pub classification_confidence: f32,
    pub location: String,
    pub coordinates: Coordinates,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Issue {
    pub fn is_assigned_to(&self, technician_id: &TechnicianId) -> bool {
        self.assigned_technician.as_ref() == Some(technician_id)
    }
}

/// Payload used to add a technician to the roster.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TechnicianRegistration {
    pub name: String,
    pub email: String,
    pub skills: BTreeSet<Category>,
    #[serde(default = "default_available")]
    pub available: bool,
    #[serde(default)]
    pub completed_count: u32,
    #[serde(default)]
    pub rating: f32,
}

fn default_available() -> bool {
    true
}

/// Technician roster entry with live availability and workload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Technician {
    pub id: TechnicianId,
    pub name: String,
    pub email: String,
    pub skills: BTreeSet<Category>,
    pub available: bool,
    pub assigned_issue_ids: BTreeSet<IssueId>,
    pub completed_count: u32,
    pub rating: f32,
}

impl Technician {
    pub fn has_skill(&self, category: Category) -> bool {
        self.skills.contains(&category)
    }

    /// Available and skilled in the category.
    pub fn is_eligible_for(&self, category: Category) -> bool {
        self.available && self.has_skill(category)
    }
}

/// Caller identity presented at the engine boundary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "role", rename_all = "snake_case")]
pub enum Actor {
    Resident { id: ReporterId, name: String },
    Technician { id: TechnicianId },
    Administrator,
}

impl Actor {
    pub fn role(&self) -> ActorRole {
        match self {
            Actor::Resident { .. } => ActorRole::Resident,
            Actor::Technician { .. } => ActorRole::Technician,
            Actor::Administrator => ActorRole::Administrator,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActorRole {
    Resident,
    Technician,
    Administrator,
}

impl ActorRole {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Resident => "resident",
            Self::Technician => "technician",
            Self::Administrator => "administrator",
        }
    }
}

impl fmt::Display for ActorRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Entity referenced by an unknown identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MissingEntity {
    Issue(IssueId),
    Technician(TechnicianId),
}

impl fmt::Display for MissingEntity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MissingEntity::Issue(id) => write!(f, "issue {id}"),
            MissingEntity::Technician(id) => write!(f, "technician {id}"),
        }
    }
}

/// Failures raised by triage operations. None of them leave partial state behind.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum TriageError {
    #[error("{0} not found")]
    NotFound(MissingEntity),
    #[error("cannot {action} an issue that is {from}")]
    InvalidTransition {
        from: IssueStatus,
        action: LifecycleAction,
    },
    #[error("technician {technician} is not skilled in {category}")]
    SkillMismatch {
        technician: TechnicianId,
        category: Category,
    },
    #[error("{role} is not permitted to {action}")]
    Unauthorized {
        role: ActorRole,
        action: &'static str,
    },
}

impl TriageError {
    pub(crate) fn issue_not_found(id: &IssueId) -> Self {
        Self::NotFound(MissingEntity::Issue(id.clone()))
    }

    pub(crate) fn technician_not_found(id: &TechnicianId) -> Self {
        Self::NotFound(MissingEntity::Technician(id.clone()))
    }

    pub(crate) fn unauthorized(actor: &Actor, action: &'static str) -> Self {
        Self::Unauthorized {
            role: actor.role(),
            action,
        }
    }
}
