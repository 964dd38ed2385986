use crate::infra::demo_roster;
use chrono::Local;
use clap::Args;
use repairdesk::config::DispatchConfig;
use repairdesk::error::AppError;
use repairdesk::workflows::maintenance::report::export_csv;
use repairdesk::workflows::maintenance::{
    Actor, Category, DispatchOutcome, Issue, IssueClassifier, IssueReport, KeywordClassifier,
    ReporterId, TechnicianId, TriageEngine,
};
use std::fs::File;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Dispatch window in milliseconds (defaults to the configured service value).
    #[arg(long)]
    pub(crate) delay_ms: Option<u64>,
    /// Write the final issue list as CSV to this path.
    #[arg(long)]
    pub(crate) export: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub(crate) struct ClassifyArgs {
    /// Free-text description of the problem
    pub(crate) description: String,
}

pub(crate) fn run_classify(args: ClassifyArgs) -> Result<(), AppError> {
    let classification = KeywordClassifier::new().classify(&args.description);
    println!("Category:   {}", classification.category);
    println!("Severity:   {}", classification.severity);
    println!(
        "Confidence: {:.0}%",
        classification.confidence * 100.0
    );
    Ok(())
}

pub(crate) async fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let dispatch = args
        .delay_ms
        .map(|ms| DispatchConfig {
            delay: Duration::from_millis(ms),
        })
        .unwrap_or_default();
    let engine = TriageEngine::new(demo_roster(), dispatch);
    let resident = Actor::Resident {
        id: ReporterId("1".to_string()),
        name: "John Resident".to_string(),
    };
    let admin = Actor::Administrator;
    let mike = TechnicianId("tech-0001".to_string());
    let sarah = TechnicianId("tech-0003".to_string());
    let settle = dispatch.delay + Duration::from_millis(50);

    println!("Maintenance triage demo");
    println!("Dispatch window: {} ms", dispatch.delay.as_millis());

    println!("\nReports filed by John Resident");
    let mut filed = Vec::new();
    for report in demo_reports() {
        let issue = engine.submit_report(&resident, report)?;
        println!(
            "  {} {:<28} {:<10} {:<6} ({:.0}% confidence)",
            issue.id,
            issue.title,
            issue.category,
            issue.severity,
            issue.classification_confidence * 100.0
        );
        filed.push(issue);
    }

    tokio::time::sleep(settle).await;
    println!("\nAfter the dispatch window");
    for issue in engine.issues_for(&admin) {
        render_issue(&issue);
    }

    if let Some(plumbing) = filed.iter().find(|issue| issue.category == Category::Plumbing) {
        let technician = Actor::Technician { id: mike.clone() };
        engine.start_work(&technician, &plumbing.id)?;
        let resolved = engine.mark_complete(&technician, &plumbing.id)?;
        println!("\nMike Technician worked {}", resolved.id);
        render_issue(&resolved);
    }

    engine.set_availability(&Actor::Technician { id: mike.clone() }, &mike, false)?;
    let drain = engine.submit_report(
        &resident,
        IssueReport {
            title: "Shower drain blocked".to_string(),
            description: "Shower drain is blocked and water pools in the tub".to_string(),
            location: "Block A, Apt 301".to_string(),
        },
    )?;
    tokio::time::sleep(settle).await;
    println!("\nMike went off shift; a new plumbing report waits");
    render_issue(&engine.issue(&admin, &drain.id)?);

    engine.set_availability(&Actor::Technician { id: sarah.clone() }, &sarah, true)?;
    println!("\nSarah Johnson came online; administrator sweeps open issues");
    for (issue_id, outcome) in engine.dispatch_open_issues(&admin)? {
        match outcome {
            DispatchOutcome::Assigned { technician } => {
                println!("  {issue_id} -> {technician}")
            }
            DispatchOutcome::NoEligibleTechnician => {
                println!("  {issue_id} still waiting for an eligible technician")
            }
            DispatchOutcome::NotPending { status } => println!("  {issue_id} already {status}"),
        }
    }

    if let Some(civil) = filed.iter().find(|issue| issue.category == Category::Civil) {
        println!("\nAdministrator reassigns {} to Sarah Johnson", civil.id);
        match engine.reassign(&admin, &civil.id, &sarah) {
            Ok(issue) => render_issue(&issue),
            Err(err) => println!("  Reassignment rejected: {err}"),
        }
    }

    let summary = engine.summary(&admin)?;
    println!("\nSummary ({} issues)", summary.total_issues);
    for entry in &summary.by_status {
        println!("  {:<12} {}", entry.status_label, entry.count);
    }
    for entry in &summary.by_category {
        println!("  {:<12} {}", entry.category_label, entry.count);
    }
    println!(
        "  Technicians available: {}/{}",
        summary.available_technicians, summary.technicians
    );

    println!("\nTechnician workload");
    for technician in engine.technicians_for(&admin)? {
        println!(
            "  {} {:<16} active {:<2} completed {:<3} {}",
            technician.id,
            technician.name,
            technician.assigned_issue_ids.len(),
            technician.completed_count,
            if technician.available { "available" } else { "off shift" }
        );
    }

    let grid = engine.density_grid(&admin)?;
    println!("\nIssue density ({} hotspots)", grid.hotspots);
    for cell in &grid.cells {
        println!("  {:<10} {:>3} issues  {}", cell.key, cell.count, cell.intensity_label);
    }

    if let Some(path) = args.export {
        let issues = engine.export_snapshot(&admin)?;
        export_csv(&issues, File::create(&path)?)?;
        println!("\nCSV export written to {}", path.display());
    }

    Ok(())
}

fn demo_reports() -> Vec<IssueReport> {
    [
        ("Kitchen Sink Leaking", "Water dripping from kitchen sink pipe"),
        (
            "Bedroom Light Flickering",
            "The ceiling light keeps flickering and sometimes goes out",
        ),
        ("Cracked Window", "Small crack in the living room window pane"),
        ("Toilet overflowing", "Toilet is flooding the bathroom, urgent"),
    ]
    .into_iter()
    .map(|(title, description)| IssueReport {
        title: title.to_string(),
        description: description.to_string(),
        location: "Block A, Apt 301".to_string(),
    })
    .collect()
}

fn render_issue(issue: &Issue) {
    println!(
        "  {} [{}] {} -> {} (updated {})",
        issue.id,
        issue.status,
        issue.title,
        issue
            .assigned_technician_name
            .as_deref()
            .unwrap_or("Unassigned"),
        issue.updated_at.with_timezone(&Local).format("%H:%M:%S")
    );
}
