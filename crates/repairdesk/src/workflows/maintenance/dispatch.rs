use serde::{Deserialize, Serialize};
use tracing::info;

use super::domain::{Issue, IssueId, IssueStatus, TechnicianId, TriageError};
use super::engine::TriageState;
use super::issues::{Assignee, IssuePatch};
use super::lifecycle::LifecycleAction;

/// Result of a dispatch attempt. Only `Assigned` mutates state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum DispatchOutcome {
    Assigned { technician: TechnicianId },
    /// Nobody available holds the skill; the issue stays open.
    NoEligibleTechnician,
    /// The issue already left `Open`, so there is nothing to dispatch.
    NotPending { status: IssueStatus },
}

impl DispatchOutcome {
    pub fn assigned_technician(&self) -> Option<&TechnicianId> {
        match self {
            DispatchOutcome::Assigned { technician } => Some(technician),
            _ => None,
        }
    }
}

/// Binds an open issue to the first eligible technician in roster order.
pub(crate) fn dispatch(
    state: &mut TriageState,
    issue_id: &IssueId,
) -> Result<DispatchOutcome, TriageError> {
    let issue = state.issues.require(issue_id)?;
    if issue.status != IssueStatus::Open {
        return Ok(DispatchOutcome::NotPending {
            status: issue.status,
        });
    }

    let next = issue.status.apply(LifecycleAction::Assign)?;
    let category = issue.category;
    let Some(technician) = state.technicians.first_eligible(category) else {
        info!(issue_id = %issue_id, %category, "no eligible technician, issue stays open");
        return Ok(DispatchOutcome::NoEligibleTechnician);
    };
    let technician_id = technician.id.clone();
    let technician_name = technician.name.clone();

    state
        .technicians
        .record_assignment(&technician_id, issue_id)?;
    state.issues.update(
        issue_id,
        IssuePatch {
            status: Some(next),
            assignee: Some(Assignee(Some((technician_id.clone(), technician_name)))),
        },
    )?;

    info!(issue_id = %issue_id, technician_id = %technician_id, %category, "issue dispatched");
    Ok(DispatchOutcome::Assigned {
        technician: technician_id,
    })
}

/// Moves an unresolved issue to `technician_id`, releasing the previous holder.
/// Availability is not required; the skill is.
pub(crate) fn reassign(
    state: &mut TriageState,
    issue_id: &IssueId,
    technician_id: &TechnicianId,
) -> Result<Issue, TriageError> {
    let issue = state.issues.require(issue_id)?;
    let technician = state.technicians.require(technician_id)?;
    let next = issue.status.apply(LifecycleAction::Reassign)?;
    if !technician.has_skill(issue.category) {
        return Err(TriageError::SkillMismatch {
            technician: technician_id.clone(),
            category: issue.category,
        });
    }

    let previous = issue.assigned_technician.clone();
    let technician_name = technician.name.clone();

    if let Some(previous) = &previous {
        state.technicians.release_assignment(previous, issue_id)?;
    }
    state
        .technicians
        .record_assignment(technician_id, issue_id)?;
    let updated = state.issues.update(
        issue_id,
        IssuePatch {
            status: Some(next),
            assignee: Some(Assignee(Some((technician_id.clone(), technician_name)))),
        },
    )?;

    info!(
        issue_id = %issue_id,
        technician_id = %technician_id,
        previous = ?previous.as_ref().map(|id| id.0.as_str()),
        "issue reassigned"
    );
    Ok(updated)
}
