use std::collections::HashMap;

use chrono::Utc;
use rand::Rng;

use super::classifier::IssueClassifier;
use super::domain::{
    Coordinates, Issue, IssueId, IssueReport, IssueStatus, ReporterId, TechnicianId, TriageError,
};

const BASE_COORDINATES: Coordinates = Coordinates {
    lat: 40.7128,
    lng: -74.0060,
};
const COORDINATE_JITTER: f64 = 0.1;

/// Field changes applied through `IssueRegistry::update`.
#[derive(Debug, Clone, Default, PartialEq)]
pub(crate) struct IssuePatch {
    pub status: Option<IssueStatus>,
    pub assignee: Option<Assignee>,
}

/// Replacement for the assignee fields; `None` inside clears them.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Assignee(pub Option<(TechnicianId, String)>);

/// Owns every reported issue. Issues are never removed.
#[derive(Debug, Default)]
pub struct IssueRegistry {
    issues: Vec<Issue>,
    index: HashMap<IssueId, usize>,
    sequence: u64,
}

impl IssueRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Classifies and stores a new report with status `Open`.
    pub(crate) fn create(
        &mut self,
        reporter_id: ReporterId,
        reporter_name: String,
        report: IssueReport,
        classifier: &dyn IssueClassifier,
    ) -> Issue {
        self.sequence += 1;
        let id = IssueId(format!("issue-{:06}", self.sequence));
        let classification = classifier.classify(&report.description);
        let now = Utc::now();

        let issue = Issue {
            id: id.clone(),
            reporter_id,
            reporter_name,
            title: report.title,
            description: report.description,
            category: classification.category,
            severity: classification.severity,
            status: IssueStatus::Open,
            assigned_technician: None,
            assigned_technician_name: None,
            classification_confidence: classification.confidence,
            location: report.location,
            coordinates: illustrative_coordinates(),
            created_at: now,
            updated_at: now,
        };

        self.index.insert(id, self.issues.len());
        self.issues.push(issue.clone());
        issue
    }

    /// Applies the patch and refreshes `updated_at`.
    pub(crate) fn update(&mut self, id: &IssueId, patch: IssuePatch) -> Result<Issue, TriageError> {
        let issue = self
            .index
            .get(id)
            .and_then(|position| self.issues.get_mut(*position))
            .ok_or_else(|| TriageError::issue_not_found(id))?;

        if let Some(status) = patch.status {
            issue.status = status;
        }
        if let Some(Assignee(assignee)) = patch.assignee {
            match assignee {
                Some((technician_id, name)) => {
                    issue.assigned_technician = Some(technician_id);
                    issue.assigned_technician_name = Some(name);
                }
                None => {
                    issue.assigned_technician = None;
                    issue.assigned_technician_name = None;
                }
            }
        }
        issue.updated_at = Utc::now();

        Ok(issue.clone())
    }

    pub fn get(&self, id: &IssueId) -> Option<&Issue> {
        self.index
            .get(id)
            .and_then(|position| self.issues.get(*position))
    }

    pub(crate) fn require(&self, id: &IssueId) -> Result<&Issue, TriageError> {
        self.get(id).ok_or_else(|| TriageError::issue_not_found(id))
    }

    pub fn list_by_reporter(&self, reporter_id: &ReporterId) -> Vec<Issue> {
        self.newest_first()
            .filter(|issue| &issue.reporter_id == reporter_id)
            .cloned()
            .collect()
    }

    /// Every issue ever bound to the technician, resolved ones included.
    pub fn list_by_technician(&self, technician_id: &TechnicianId) -> Vec<Issue> {
        self.newest_first()
            .filter(|issue| issue.is_assigned_to(technician_id))
            .cloned()
            .collect()
    }

    pub fn list_all(&self) -> Vec<Issue> {
        self.newest_first().cloned().collect()
    }

    /// Open issues in the order they were reported.
    pub fn list_open_oldest_first(&self) -> Vec<IssueId> {
        self.issues
            .iter()
            .filter(|issue| issue.status == IssueStatus::Open)
            .map(|issue| issue.id.clone())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.issues.len()
    }

    pub fn is_empty(&self) -> bool {
        self.issues.is_empty()
    }

    fn newest_first(&self) -> impl Iterator<Item = &Issue> {
        self.issues.iter().rev()
    }
}

fn illustrative_coordinates() -> Coordinates {
    let mut rng = rand::thread_rng();
    Coordinates {
        lat: BASE_COORDINATES.lat + rng.gen_range(0.0..COORDINATE_JITTER),
        lng: BASE_COORDINATES.lng + rng.gen_range(0.0..COORDINATE_JITTER),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workflows::maintenance::classifier::KeywordClassifier;
    use crate::workflows::maintenance::domain::{Category, Severity};

    fn report(description: &str) -> IssueReport {
        IssueReport {
            title: "Kitchen Sink Leaking".to_string(),
            description: description.to_string(),
            location: "Block A, Apt 301".to_string(),
        }
    }

    fn create(registry: &mut IssueRegistry, reporter: &str, description: &str) -> Issue {
        registry.create(
            ReporterId(reporter.to_string()),
            "John Resident".to_string(),
            report(description),
            &KeywordClassifier::new(),
        )
    }

    #[test]
    fn create_classifies_and_opens_issue() {
        let mut registry = IssueRegistry::new();
        let issue = create(&mut registry, "1", "Water dripping from kitchen sink pipe");

        assert_eq!(issue.id, IssueId("issue-000001".to_string()));
        assert_eq!(issue.status, IssueStatus::Open);
        assert_eq!(issue.category, Category::Plumbing);
        assert_eq!(issue.severity, Severity::Medium);
        assert_eq!(issue.classification_confidence, 0.89);
        assert!(issue.assigned_technician.is_none());
        assert_eq!(issue.created_at, issue.updated_at);
        assert!((40.7128..40.8128).contains(&issue.coordinates.lat));
        assert!((-74.0060..-73.9060).contains(&issue.coordinates.lng));
        assert_eq!(registry.get(&issue.id), Some(&issue));
    }

    #[test]
    fn update_refreshes_timestamp_and_applies_assignee() {
        let mut registry = IssueRegistry::new();
        let issue = create(&mut registry, "1", "Light flickering");

        let updated = registry
            .update(
                &issue.id,
                IssuePatch {
                    status: Some(IssueStatus::Assigned),
                    assignee: Some(Assignee(Some((
                        TechnicianId("tech-0001".to_string()),
                        "Mike Technician".to_string(),
                    )))),
                },
            )
            .expect("issue exists");

        assert_eq!(updated.status, IssueStatus::Assigned);
        assert_eq!(updated.assigned_technician_name.as_deref(), Some("Mike Technician"));
        assert!(updated.updated_at >= issue.updated_at);
        assert_eq!(updated.description, issue.description);
    }

    #[test]
    fn update_unknown_issue_is_not_found() {
        let mut registry = IssueRegistry::new();
        let missing = IssueId("issue-999999".to_string());
        assert_eq!(
            registry.update(&missing, IssuePatch::default()),
            Err(TriageError::issue_not_found(&missing))
        );
    }

    #[test]
    fn listings_are_newest_first_and_filtered() {
        let mut registry = IssueRegistry::new();
        let first = create(&mut registry, "1", "Drain is slow");
        let other = create(&mut registry, "2", "Wall crack");
        let second = create(&mut registry, "1", "Door sticks");

        let mine: Vec<IssueId> = registry
            .list_by_reporter(&ReporterId("1".to_string()))
            .into_iter()
            .map(|issue| issue.id)
            .collect();
        assert_eq!(mine, vec![second.id.clone(), first.id.clone()]);

        let all: Vec<IssueId> = registry.list_all().into_iter().map(|i| i.id).collect();
        assert_eq!(all, vec![second.id.clone(), other.id.clone(), first.id.clone()]);

        assert_eq!(
            registry.list_open_oldest_first(),
            vec![first.id, other.id, second.id]
        );
    }
}
