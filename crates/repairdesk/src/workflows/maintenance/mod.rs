//! Maintenance request triage: classification, technician dispatch, and the
//! issue lifecycle, behind a single shared `TriageEngine`.

pub mod classifier;
pub mod dispatch;
pub mod domain;
pub mod engine;
pub mod issues;
pub mod lifecycle;
pub mod report;
pub mod router;
pub(crate) mod scheduler;
pub mod technicians;

#[cfg(test)]
mod tests;

pub use classifier::{Classification, IssueClassifier, KeywordClassifier};
pub use dispatch::DispatchOutcome;
pub use domain::{
    Actor, ActorRole, Category, Coordinates, Issue, IssueId, IssueReport, IssueStatus,
    MissingEntity, ReporterId, Severity, Technician, TechnicianId, TechnicianRegistration,
    TriageError,
};
pub use engine::TriageEngine;
pub use issues::IssueRegistry;
pub use lifecycle::LifecycleAction;
pub use report::{DensityCell, DensityGrid, ExportError, IssueSummary};
pub use router::maintenance_router;
pub use technicians::TechnicianRegistry;
