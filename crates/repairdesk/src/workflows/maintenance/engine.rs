use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tracing::{debug, info};

use super::classifier::{IssueClassifier, KeywordClassifier};
use super::dispatch::{self, DispatchOutcome};
use super::domain::{
    Actor, Issue, IssueId, IssueReport, Technician, TechnicianId, TechnicianRegistration,
    TriageError,
};
use super::issues::IssueRegistry;
use super::lifecycle;
use super::report::{DensityGrid, IssueSummary};
use super::scheduler::DispatchQueue;
use super::technicians::TechnicianRegistry;
use crate::config::DispatchConfig;

/// Both registries, always locked together so multi-registry updates are atomic.
#[derive(Debug)]
pub(crate) struct TriageState {
    pub(crate) issues: IssueRegistry,
    pub(crate) technicians: TechnicianRegistry,
}

/// Shared entry point for reporters, technicians, and administrators.
///
/// Cloning is cheap; clones operate on the same registries. Every mutation is
/// validated and applied under a single lock, so readers never observe a
/// half-applied change. Capability checks happen here, against the `Actor`
/// passed in by the caller.
#[derive(Clone)]
pub struct TriageEngine {
    inner: Arc<EngineInner>,
}

struct EngineInner {
    state: Mutex<TriageState>,
    classifier: Box<dyn IssueClassifier>,
    queue: DispatchQueue,
}

impl TriageEngine {
    pub fn new(roster: TechnicianRegistry, config: DispatchConfig) -> Self {
        Self::with_classifier(roster, config, KeywordClassifier::new())
    }

    pub fn with_classifier<C>(roster: TechnicianRegistry, config: DispatchConfig, classifier: C) -> Self
    where
        C: IssueClassifier + 'static,
    {
        let state = TriageState {
            issues: IssueRegistry::new(),
            technicians: roster,
        };

        Self {
            inner: Arc::new(EngineInner {
                state: Mutex::new(state),
                classifier: Box::new(classifier),
                queue: DispatchQueue::new(config.delay),
            }),
        }
    }

    pub fn dispatch_delay(&self) -> Duration {
        self.inner.queue.delay()
    }

    /// Files a resident's report as an `Open` issue and schedules automatic dispatch.
    pub fn submit_report(&self, actor: &Actor, report: IssueReport) -> Result<Issue, TriageError> {
        let Actor::Resident { id, name } = actor else {
            return Err(TriageError::unauthorized(actor, "submit maintenance reports"));
        };

        let issue = {
            let mut state = self.lock();
            state.issues.create(
                id.clone(),
                name.clone(),
                report,
                self.inner.classifier.as_ref(),
            )
        };

        info!(
            issue_id = %issue.id,
            category = %issue.category,
            severity = %issue.severity,
            confidence = issue.classification_confidence,
            "issue reported"
        );

        let engine = self.clone();
        let issue_id = issue.id.clone();
        self.inner.queue.schedule(issue.id.clone(), move || {
            // Errors here mean the issue vanished, which the registry never allows.
            let _ = engine.run_deferred_dispatch(&issue_id);
        });

        Ok(issue)
    }

    /// Entry point for the delayed dispatch attempt. Re-checks the issue: a no-op
    /// when it already left `Open`, otherwise eligibility is evaluated now.
    pub fn run_deferred_dispatch(&self, issue_id: &IssueId) -> Result<DispatchOutcome, TriageError> {
        self.inner.queue.settle(issue_id);
        let outcome = dispatch::dispatch(&mut self.lock(), issue_id)?;
        if let DispatchOutcome::NotPending { status } = &outcome {
            debug!(issue_id = %issue_id, %status, "deferred dispatch pre-empted");
        }
        Ok(outcome)
    }

    /// Administrator re-trigger for a single issue.
    pub fn dispatch(&self, actor: &Actor, issue_id: &IssueId) -> Result<DispatchOutcome, TriageError> {
        require_administrator(actor, "dispatch issues")?;
        let outcome = dispatch::dispatch(&mut self.lock(), issue_id)?;
        if outcome.assigned_technician().is_some() {
            self.inner.queue.cancel(issue_id);
        }
        Ok(outcome)
    }

    /// Dispatches every open issue, oldest report first.
    pub fn dispatch_open_issues(
        &self,
        actor: &Actor,
    ) -> Result<Vec<(IssueId, DispatchOutcome)>, TriageError> {
        require_administrator(actor, "dispatch issues")?;
        let outcomes = {
            let mut state = self.lock();
            let mut outcomes = Vec::new();
            for issue_id in state.issues.list_open_oldest_first() {
                let outcome = dispatch::dispatch(&mut state, &issue_id)?;
                outcomes.push((issue_id, outcome));
            }
            outcomes
        };

        for (issue_id, outcome) in &outcomes {
            if outcome.assigned_technician().is_some() {
                self.inner.queue.cancel(issue_id);
            }
        }
        Ok(outcomes)
    }

    pub fn reassign(
        &self,
        actor: &Actor,
        issue_id: &IssueId,
        technician_id: &TechnicianId,
    ) -> Result<Issue, TriageError> {
        require_administrator(actor, "reassign issues")?;
        let updated = dispatch::reassign(&mut self.lock(), issue_id, technician_id)?;
        self.inner.queue.cancel(issue_id);
        Ok(updated)
    }

    pub fn start_work(&self, actor: &Actor, issue_id: &IssueId) -> Result<Issue, TriageError> {
        let technician_id = require_technician(actor, "start work")?;
        lifecycle::start_work(&mut self.lock(), technician_id, issue_id)
    }

    pub fn mark_complete(&self, actor: &Actor, issue_id: &IssueId) -> Result<Issue, TriageError> {
        let technician_id = require_technician(actor, "mark issues complete")?;
        lifecycle::complete(&mut self.lock(), technician_id, issue_id)
    }

    /// Technicians toggle their own availability. Current assignments are kept.
    pub fn set_availability(
        &self,
        actor: &Actor,
        technician_id: &TechnicianId,
        available: bool,
    ) -> Result<Technician, TriageError> {
        let own_id = require_technician(actor, "change availability")?;
        if own_id != technician_id {
            return Err(TriageError::unauthorized(
                actor,
                "change another technician's availability",
            ));
        }

        let technician = self
            .lock()
            .technicians
            .set_availability(technician_id, available)?
            .clone();
        info!(technician_id = %technician_id, available, "availability changed");
        Ok(technician)
    }

    pub fn register_technician(
        &self,
        actor: &Actor,
        registration: TechnicianRegistration,
    ) -> Result<Technician, TriageError> {
        require_administrator(actor, "register technicians")?;
        let technician = self.lock().technicians.register(registration);
        info!(technician_id = %technician.id, name = %technician.name, "technician registered");
        Ok(technician)
    }

    /// Single issue, if the actor may see it.
    pub fn issue(&self, actor: &Actor, issue_id: &IssueId) -> Result<Issue, TriageError> {
        let state = self.lock();
        let issue = state.issues.require(issue_id)?;
        let visible = match actor {
            Actor::Administrator => true,
            Actor::Resident { id, .. } => &issue.reporter_id == id,
            Actor::Technician { id } => issue.is_assigned_to(id),
        };
        if !visible {
            return Err(TriageError::unauthorized(actor, "view this issue"));
        }
        Ok(issue.clone())
    }

    /// Residents see their reports, technicians their assignments, administrators everything.
    pub fn issues_for(&self, actor: &Actor) -> Vec<Issue> {
        let state = self.lock();
        match actor {
            Actor::Administrator => state.issues.list_all(),
            Actor::Resident { id, .. } => state.issues.list_by_reporter(id),
            Actor::Technician { id } => state.issues.list_by_technician(id),
        }
    }

    /// Full roster for administrators, the caller's own record for technicians.
    pub fn technicians_for(&self, actor: &Actor) -> Result<Vec<Technician>, TriageError> {
        let state = self.lock();
        match actor {
            Actor::Administrator => Ok(state.technicians.list().to_vec()),
            Actor::Technician { id } => Ok(vec![state.technicians.require(id)?.clone()]),
            Actor::Resident { .. } => Err(TriageError::unauthorized(actor, "view technicians")),
        }
    }

    pub fn summary(&self, actor: &Actor) -> Result<IssueSummary, TriageError> {
        require_administrator(actor, "view issue analytics")?;
        Ok(self.read(|issues, technicians| {
            IssueSummary::from_snapshot(&issues.list_all(), technicians.list())
        }))
    }

    pub fn density_grid(&self, actor: &Actor) -> Result<DensityGrid, TriageError> {
        require_administrator(actor, "view issue analytics")?;
        Ok(self.read(|issues, _| DensityGrid::from_issues(&issues.list_all())))
    }

    /// Every issue, newest first, for bulk export.
    pub fn export_snapshot(&self, actor: &Actor) -> Result<Vec<Issue>, TriageError> {
        require_administrator(actor, "export issues")?;
        Ok(self.read(|issues, _| issues.list_all()))
    }

    /// Consistent read-only view of both registries.
    pub fn read<R>(&self, f: impl FnOnce(&IssueRegistry, &TechnicianRegistry) -> R) -> R {
        let state = self.lock();
        f(&state.issues, &state.technicians)
    }

    pub fn is_dispatch_pending(&self, issue_id: &IssueId) -> bool {
        self.inner.queue.is_pending(issue_id)
    }

    pub fn pending_dispatches(&self) -> usize {
        self.inner.queue.pending_count()
    }

    // Every mutation validates before writing, so a poisoned lock still guards consistent data.
    fn lock(&self) -> MutexGuard<'_, TriageState> {
        self.inner
            .state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

fn require_administrator(actor: &Actor, action: &'static str) -> Result<(), TriageError> {
    match actor {
        Actor::Administrator => Ok(()),
        _ => Err(TriageError::unauthorized(actor, action)),
    }
}

fn require_technician<'a>(
    actor: &'a Actor,
    action: &'static str,
) -> Result<&'a TechnicianId, TriageError> {
    match actor {
        Actor::Technician { id } => Ok(id),
        _ => Err(TriageError::unauthorized(actor, action)),
    }
}
