use super::common::*;
use crate::workflows::maintenance::domain::{Category, IssueStatus, TriageError};
use crate::workflows::maintenance::report::{export_csv_string, DensityIntensity};

#[test]
fn summary_counts_every_status_and_category() {
    let engine = demo_engine();
    let leak = engine.submit_report(&resident(), sink_leak()).unwrap();
    let wall = engine.submit_report(&resident(), cracked_wall()).unwrap();
    engine
        .submit_report(&neighbour(), report("Lights out", "No power in the hallway"))
        .unwrap();
    engine.run_deferred_dispatch(&leak.id).unwrap();
    engine.run_deferred_dispatch(&wall.id).unwrap();
    engine.start_work(&technician(alex()), &wall.id).unwrap();
    engine.mark_complete(&technician(alex()), &wall.id).unwrap();

    let summary = engine.summary(&admin()).unwrap();
    assert_eq!(summary.total_issues, 3);
    assert_eq!(summary.status_count(IssueStatus::Open), 1);
    assert_eq!(summary.status_count(IssueStatus::Assigned), 1);
    assert_eq!(summary.status_count(IssueStatus::InProgress), 0);
    assert_eq!(summary.status_count(IssueStatus::Resolved), 1);
    assert_eq!(summary.category_count(Category::Plumbing), 1);
    assert_eq!(summary.category_count(Category::Civil), 1);
    assert_eq!(summary.category_count(Category::Electrical), 1);
    assert_eq!(summary.by_status.len(), 4);
    assert_eq!(summary.by_status[2].status_label, "In Progress");
    assert_eq!(summary.technicians, 3);
    assert_eq!(summary.available_technicians, 2);
}

#[test]
fn density_grid_groups_the_illustrative_area_into_one_cell() {
    let engine = demo_engine();
    for _ in 0..4 {
        engine.submit_report(&resident(), sink_leak()).unwrap();
    }

    let grid = engine.density_grid(&admin()).unwrap();
    assert_eq!(grid.cells.len(), 1);
    let cell = &grid.cells[0];
    assert_eq!(cell.key, "41:-74");
    assert_eq!(cell.count, 4);
    assert_eq!(cell.intensity, DensityIntensity::Low);
    assert_eq!(cell.intensity_label, "Low");
    assert_eq!(grid.hotspots, 1);
}

#[test]
fn intensity_bands() {
    assert_eq!(DensityIntensity::for_count(1), DensityIntensity::VeryLow);
    assert_eq!(DensityIntensity::for_count(2), DensityIntensity::VeryLow);
    assert_eq!(DensityIntensity::for_count(3), DensityIntensity::Low);
    assert_eq!(DensityIntensity::for_count(5), DensityIntensity::Medium);
    assert_eq!(DensityIntensity::for_count(7), DensityIntensity::High);
    assert_eq!(DensityIntensity::for_count(9), DensityIntensity::High);
    assert_eq!(DensityIntensity::for_count(10), DensityIntensity::VeryHigh);
}

#[test]
fn export_lists_newest_first_with_readable_labels() {
    let engine = demo_engine();
    let leak = engine.submit_report(&resident(), sink_leak()).unwrap();
    let wall = engine.submit_report(&resident(), cracked_wall()).unwrap();
    engine.run_deferred_dispatch(&leak.id).unwrap();

    let issues = engine.export_snapshot(&admin()).unwrap();
    let csv = export_csv_string(&issues).unwrap();
    let mut lines = csv.lines();

    let header = lines.next().unwrap();
    assert!(header.starts_with("ID,Title,Description,Category,Severity,Status"));
    assert!(header.ends_with("CreatedAt,UpdatedAt"));

    let newest = lines.next().unwrap();
    assert!(newest.starts_with(&format!("{},Hallway crack,", wall.id)));
    assert!(newest.contains(",Civil,Medium,Open,"));
    assert!(newest.contains(",Unassigned,"));

    let oldest = lines.next().unwrap();
    assert!(oldest.starts_with(&format!("{},Kitchen Sink Leaking,", leak.id)));
    assert!(oldest.contains(",Plumbing,Medium,Assigned,"));
    assert!(oldest.contains(",tech-0001,Mike Technician,"));
    assert!(lines.next().is_none());
}

#[test]
fn empty_export_has_no_rows() {
    let engine = demo_engine();
    let issues = engine.export_snapshot(&admin()).unwrap();
    assert_eq!(export_csv_string(&issues).unwrap(), "");
}

#[test]
fn analytics_are_administrator_only() {
    let engine = demo_engine();
    assert!(matches!(
        engine.density_grid(&resident()),
        Err(TriageError::Unauthorized { .. })
    ));
    assert!(matches!(
        engine.export_snapshot(&technician(mike())),
        Err(TriageError::Unauthorized { .. })
    ));
}
