//! Integration scenarios for the maintenance triage workflow.
//!
//! Drives the public engine facade and HTTP router end to end: a resident files
//! a report, the deferred dispatcher assigns it, and the technician works it to
//! resolution while the administrator watches the analytics.

mod common {
    use std::time::Duration;

    use repairdesk::config::DispatchConfig;
    use repairdesk::workflows::maintenance::{
        Actor, Category, IssueReport, ReporterId, TechnicianId, TechnicianRegistration,
        TechnicianRegistry, TriageEngine,
    };

    pub(super) const DELAY: Duration = Duration::from_millis(1_000);

    fn registration(name: &str, email: &str, skills: &[Category], available: bool) -> TechnicianRegistration {
        TechnicianRegistration {
            name: name.to_string(),
            email: email.to_string(),
            skills: skills.iter().copied().collect(),
            available,
            completed_count: 0,
            rating: 4.5,
        }
    }

    pub(super) fn engine() -> TriageEngine {
        let roster = TechnicianRegistry::with_roster([
            registration(
                "Mike Technician",
                "mike@demo.com",
                &[Category::Plumbing, Category::Electrical],
                true,
            ),
            registration(
                "Alex Rodriguez",
                "alex@demo.com",
                &[Category::Electrical, Category::Civil],
                true,
            ),
        ]);
        TriageEngine::new(roster, DispatchConfig { delay: DELAY })
    }

    pub(super) fn resident() -> Actor {
        Actor::Resident {
            id: ReporterId("1".to_string()),
            name: "John Resident".to_string(),
        }
    }

    pub(super) fn mike() -> Actor {
        Actor::Technician {
            id: TechnicianId("tech-0001".to_string()),
        }
    }

    pub(super) fn report(description: &str) -> IssueReport {
        IssueReport {
            title: "Resident report".to_string(),
            description: description.to_string(),
            location: "Block B, Apt 12".to_string(),
        }
    }
}

use std::time::Duration;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use repairdesk::workflows::maintenance::{
    maintenance_router, Actor, Category, IssueStatus, Severity, TechnicianId,
};
use serde_json::Value;
use tower::ServiceExt;

use common::*;

#[tokio::test(start_paused = true)]
async fn plumbing_report_flows_from_submission_to_resolution() {
    let engine = common::engine();
    let issue = engine
        .submit_report(&resident(), report("Water dripping from kitchen sink pipe"))
        .expect("resident may report");
    assert_eq!(issue.category, Category::Plumbing);
    assert_eq!(issue.severity, Severity::Medium);

    tokio::time::sleep(DELAY + Duration::from_millis(1)).await;

    let assigned = engine.issue(&mike(), &issue.id).expect("assignee can read");
    assert_eq!(assigned.status, IssueStatus::Assigned);
    assert_eq!(
        assigned.assigned_technician,
        Some(TechnicianId("tech-0001".to_string()))
    );

    engine.start_work(&mike(), &issue.id).expect("start");
    let resolved = engine.mark_complete(&mike(), &issue.id).expect("complete");
    assert_eq!(resolved.status, IssueStatus::Resolved);

    let summary = engine.summary(&Actor::Administrator).expect("summary");
    assert_eq!(summary.status_count(IssueStatus::Resolved), 1);
    let mike_record = engine.technicians_for(&mike()).expect("own record").remove(0);
    assert_eq!(mike_record.completed_count, 1);
    assert!(mike_record.assigned_issue_ids.is_empty());
}

#[tokio::test(start_paused = true)]
async fn emergency_report_is_triaged_high() {
    let engine = common::engine();
    let issue = engine
        .submit_report(&resident(), report("Emergency: flooding from burst pipe"))
        .expect("report");
    assert_eq!(issue.category, Category::Plumbing);
    assert_eq!(issue.severity, Severity::High);
    assert_eq!(issue.status, IssueStatus::Open);
}

#[tokio::test(start_paused = true)]
async fn router_exposes_the_resident_view() {
    let engine = common::engine();
    let router = maintenance_router(engine.clone());

    let response = router
        .clone()
        .oneshot(
            Request::post("/api/v1/issues")
                .header("x-actor-role", "resident")
                .header("x-actor-id", "1")
                .header("content-type", "application/json")
                .body(Body::from(
                    r#"{"title":"Flicker","description":"Bedroom light keeps flickering","location":"Block B"}"#,
                ))
                .expect("request"),
        )
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::ACCEPTED);

    tokio::time::sleep(DELAY * 2).await;

    let response = router
        .oneshot(
            Request::get("/api/v1/issues")
                .header("x-actor-role", "resident")
                .header("x-actor-id", "1")
                .body(Body::empty())
                .expect("request"),
        )
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::OK);
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body");
    let issues: Value = serde_json::from_slice(&bytes).expect("json");
    assert_eq!(issues.as_array().map(Vec::len), Some(1));
    assert_eq!(issues[0]["category"], "Electrical");
    assert_eq!(issues[0]["status"], "Assigned");
    assert_eq!(issues[0]["assigned_technician_name"], "Mike Technician");
}
