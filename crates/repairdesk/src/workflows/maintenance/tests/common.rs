use std::time::Duration;

use axum::http::StatusCode;
use axum::response::Response;
use serde_json::Value;

use crate::config::DispatchConfig;
use crate::workflows::maintenance::domain::{
    Actor, Category, IssueReport, IssueStatus, ReporterId, TechnicianId, TechnicianRegistration,
};
use crate::workflows::maintenance::technicians::TechnicianRegistry;
use crate::workflows::maintenance::TriageEngine;

pub(super) const DISPATCH_DELAY: Duration = Duration::from_millis(1_000);

pub(super) fn registration(
    name: &str,
    skills: &[Category],
    available: bool,
    completed_count: u32,
) -> TechnicianRegistration {
    TechnicianRegistration {
        name: name.to_string(),
        email: format!("{}@demo.com", name.split(' ').next().unwrap_or(name).to_lowercase()),
        skills: skills.iter().copied().collect(),
        available,
        completed_count,
        rating: 4.8,
    }
}

/// tech-0001 Mike (Plumbing, Electrical), tech-0002 Alex (Electrical, Civil),
/// tech-0003 Sarah (Plumbing, Civil, unavailable).
pub(super) fn demo_roster() -> TechnicianRegistry {
    TechnicianRegistry::with_roster([
        registration(
            "Mike Technician",
            &[Category::Plumbing, Category::Electrical],
            true,
            15,
        ),
        registration(
            "Alex Rodriguez",
            &[Category::Electrical, Category::Civil],
            true,
            23,
        ),
        registration(
            "Sarah Johnson",
            &[Category::Plumbing, Category::Civil],
            false,
            31,
        ),
    ])
}

pub(super) fn mike() -> TechnicianId {
    TechnicianId("tech-0001".to_string())
}

pub(super) fn alex() -> TechnicianId {
    TechnicianId("tech-0002".to_string())
}

pub(super) fn sarah() -> TechnicianId {
    TechnicianId("tech-0003".to_string())
}

pub(super) fn engine_with(roster: TechnicianRegistry) -> TriageEngine {
    TriageEngine::new(
        roster,
        DispatchConfig {
            delay: DISPATCH_DELAY,
        },
    )
}

pub(super) fn demo_engine() -> TriageEngine {
    engine_with(demo_roster())
}

pub(super) fn resident() -> Actor {
    Actor::Resident {
        id: ReporterId("1".to_string()),
        name: "John Resident".to_string(),
    }
}

pub(super) fn neighbour() -> Actor {
    Actor::Resident {
        id: ReporterId("4".to_string()),
        name: "Nina Neighbour".to_string(),
    }
}

pub(super) fn technician(id: TechnicianId) -> Actor {
    Actor::Technician { id }
}

pub(super) fn admin() -> Actor {
    Actor::Administrator
}

pub(super) fn report(title: &str, description: &str) -> IssueReport {
    IssueReport {
        title: title.to_string(),
        description: description.to_string(),
        location: "Block A, Apt 301".to_string(),
    }
}

pub(super) fn sink_leak() -> IssueReport {
    report("Kitchen Sink Leaking", "Water dripping from kitchen sink pipe")
}

pub(super) fn cracked_wall() -> IssueReport {
    report("Hallway crack", "Long crack running along the bedroom wall")
}

/// Checks the cross-registry invariants on a consistent snapshot.
pub(super) fn assert_invariants(engine: &TriageEngine) {
    engine.read(|issues, technicians| {
        for issue in issues.list_all() {
            match issue.status {
                IssueStatus::Open => assert!(
                    issue.assigned_technician.is_none(),
                    "open issue {} has an assignee",
                    issue.id
                ),
                IssueStatus::Assigned | IssueStatus::InProgress => {
                    let assignee = issue
                        .assigned_technician
                        .as_ref()
                        .unwrap_or_else(|| panic!("{} has no assignee", issue.id));
                    let technician = technicians
                        .get(assignee)
                        .unwrap_or_else(|| panic!("{} assigned to unknown {}", issue.id, assignee));
                    assert!(technician.has_skill(issue.category));
                }
                IssueStatus::Resolved => {}
            }
        }

        for technician in technicians.list() {
            let expected: std::collections::BTreeSet<_> = issues
                .list_by_technician(&technician.id)
                .into_iter()
                .filter(|issue| issue.status.is_active_assignment())
                .map(|issue| issue.id)
                .collect();
            assert_eq!(
                technician.assigned_issue_ids, expected,
                "active set of {} drifted",
                technician.id
            );
        }
    });
}

pub(super) async fn json_body(response: Response) -> (StatusCode, Value) {
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body bytes");
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).expect("json body")
    };
    (status, value)
}
