use std::collections::BTreeSet;

use super::domain::{Category, IssueId, Technician, TechnicianId, TechnicianRegistration, TriageError};

/// Roster of technicians in registration order. Iteration order is the
/// dispatcher's tie-break, so entries are never reordered or removed.
#[derive(Debug, Default)]
pub struct TechnicianRegistry {
    technicians: Vec<Technician>,
    sequence: u64,
}

impl TechnicianRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_roster(roster: impl IntoIterator<Item = TechnicianRegistration>) -> Self {
        let mut registry = Self::new();
        for registration in roster {
            registry.register(registration);
        }
        registry
    }

    pub fn register(&mut self, registration: TechnicianRegistration) -> Technician {
        self.sequence += 1;
        let technician = Technician {
            id: TechnicianId(format!("tech-{:04}", self.sequence)),
            name: registration.name,
            email: registration.email,
            skills: registration.skills,
            available: registration.available,
            assigned_issue_ids: BTreeSet::new(),
            completed_count: registration.completed_count,
            rating: registration.rating,
        };
        self.technicians.push(technician.clone());
        technician
    }

    /// Toggles availability only. Existing assignments are kept.
    pub(crate) fn set_availability(
        &mut self,
        id: &TechnicianId,
        available: bool,
    ) -> Result<&Technician, TriageError> {
        let technician = self.require_mut(id)?;
        technician.available = available;
        Ok(technician)
    }

    pub(crate) fn record_assignment(
        &mut self,
        id: &TechnicianId,
        issue_id: &IssueId,
    ) -> Result<(), TriageError> {
        self.require_mut(id)?
            .assigned_issue_ids
            .insert(issue_id.clone());
        Ok(())
    }

    /// Drops the issue from the active set without crediting a completion.
    pub(crate) fn release_assignment(
        &mut self,
        id: &TechnicianId,
        issue_id: &IssueId,
    ) -> Result<(), TriageError> {
        self.require_mut(id)?.assigned_issue_ids.remove(issue_id);
        Ok(())
    }

    pub(crate) fn record_completion(
        &mut self,
        id: &TechnicianId,
        issue_id: &IssueId,
    ) -> Result<(), TriageError> {
        let technician = self.require_mut(id)?;
        if technician.assigned_issue_ids.remove(issue_id) {
            technician.completed_count += 1;
        }
        Ok(())
    }

    pub fn get(&self, id: &TechnicianId) -> Option<&Technician> {
        self.technicians.iter().find(|technician| &technician.id == id)
    }

    pub(crate) fn require(&self, id: &TechnicianId) -> Result<&Technician, TriageError> {
        self.get(id)
            .ok_or_else(|| TriageError::technician_not_found(id))
    }

    pub fn list(&self) -> &[Technician] {
        &self.technicians
    }

    /// First available technician skilled in `category`, in registration order.
    pub fn first_eligible(&self, category: Category) -> Option<&Technician> {
        self.technicians
            .iter()
            .find(|technician| technician.is_eligible_for(category))
    }

    pub fn available_count(&self) -> usize {
        self.technicians
            .iter()
            .filter(|technician| technician.available)
            .count()
    }

    fn require_mut(&mut self, id: &TechnicianId) -> Result<&mut Technician, TriageError> {
        self.technicians
            .iter_mut()
            .find(|technician| &technician.id == id)
            .ok_or_else(|| TriageError::technician_not_found(id))
    }
}
