use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::info;

use super::domain::{ActorRole, Issue, IssueId, IssueStatus, TechnicianId, TriageError};
use super::engine::TriageState;
use super::issues::IssuePatch;

/// Events that move an issue between statuses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LifecycleAction {
    /// Dispatcher bound the issue to an eligible technician.
    Assign,
    /// Assigned technician began work.
    StartWork,
    /// Assigned technician finished work.
    Complete,
    /// Administrator moved the issue to a (possibly different) technician.
    Reassign,
}

impl LifecycleAction {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Assign => "assign",
            Self::StartWork => "start work on",
            Self::Complete => "complete",
            Self::Reassign => "reassign",
        }
    }
}

impl fmt::Display for LifecycleAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl IssueStatus {
    /// Status reached by applying `action`, or `None` when the table has no such edge.
    pub const fn next(self, action: LifecycleAction) -> Option<IssueStatus> {
        use IssueStatus::*;
        use LifecycleAction::*;

        match (self, action) {
            (Open, Assign) => Some(Assigned),
            (Open | Assigned | InProgress, Reassign) => Some(Assigned),
            (Assigned, StartWork) => Some(InProgress),
            (InProgress, Complete) => Some(Resolved),
            _ => None,
        }
    }

    pub fn apply(self, action: LifecycleAction) -> Result<IssueStatus, TriageError> {
        self.next(action)
            .ok_or(TriageError::InvalidTransition { from: self, action })
    }

    pub const fn is_terminal(self) -> bool {
        matches!(self, IssueStatus::Resolved)
    }
}

/// Assigned -> InProgress, only for the technician holding the issue.
pub(crate) fn start_work(
    state: &mut TriageState,
    technician_id: &TechnicianId,
    issue_id: &IssueId,
) -> Result<Issue, TriageError> {
    let next = owned_transition(state, technician_id, issue_id, LifecycleAction::StartWork)?;
    let updated = state.issues.update(
        issue_id,
        IssuePatch {
            status: Some(next),
            ..IssuePatch::default()
        },
    )?;

    info!(issue_id = %issue_id, technician_id = %technician_id, "work started");
    Ok(updated)
}

/// InProgress -> Resolved. Credits the technician with exactly one completion.
pub(crate) fn complete(
    state: &mut TriageState,
    technician_id: &TechnicianId,
    issue_id: &IssueId,
) -> Result<Issue, TriageError> {
    let next = owned_transition(state, technician_id, issue_id, LifecycleAction::Complete)?;
    state
        .technicians
        .record_completion(technician_id, issue_id)?;
    let updated = state.issues.update(
        issue_id,
        IssuePatch {
            status: Some(next),
            ..IssuePatch::default()
        },
    )?;

    info!(issue_id = %issue_id, technician_id = %technician_id, "issue resolved");
    Ok(updated)
}

fn owned_transition(
    state: &TriageState,
    technician_id: &TechnicianId,
    issue_id: &IssueId,
    action: LifecycleAction,
) -> Result<IssueStatus, TriageError> {
    let issue = state.issues.require(issue_id)?;
    if !issue.is_assigned_to(technician_id) {
        return Err(TriageError::Unauthorized {
            role: ActorRole::Technician,
            action: match action {
                LifecycleAction::StartWork => "start work on an issue assigned to someone else",
                _ => "complete an issue assigned to someone else",
            },
        });
    }
    issue.status.apply(action)
}
