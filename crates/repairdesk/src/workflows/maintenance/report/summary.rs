use std::collections::HashMap;

use serde::Serialize;

use super::super::domain::{Category, Issue, IssueStatus, Technician};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusCount {
    pub status: IssueStatus,
    pub status_label: &'static str,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryCount {
    pub category: Category,
    pub category_label: &'static str,
    pub count: usize,
}

/// Dashboard counters over a snapshot of both registries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IssueSummary {
    pub total_issues: usize,
    pub by_status: Vec<StatusCount>,
    pub by_category: Vec<CategoryCount>,
    pub technicians: usize,
    pub available_technicians: usize,
}

impl IssueSummary {
    pub fn from_snapshot(issues: &[Issue], technicians: &[Technician]) -> Self {
        let mut statuses: HashMap<IssueStatus, usize> = HashMap::new();
        let mut categories: HashMap<Category, usize> = HashMap::new();
        for issue in issues {
            *statuses.entry(issue.status).or_default() += 1;
            *categories.entry(issue.category).or_default() += 1;
        }

        let by_status = IssueStatus::ordered()
            .into_iter()
            .map(|status| StatusCount {
                status,
                status_label: status.label(),
                count: statuses.get(&status).copied().unwrap_or(0),
            })
            .collect();

        let by_category = Category::ordered()
            .into_iter()
            .map(|category| CategoryCount {
                category,
                category_label: category.label(),
                count: categories.get(&category).copied().unwrap_or(0),
            })
            .collect();

        Self {
            total_issues: issues.len(),
            by_status,
            by_category,
            technicians: technicians.len(),
            available_technicians: technicians
                .iter()
                .filter(|technician| technician.available)
                .count(),
        }
    }

    pub fn status_count(&self, status: IssueStatus) -> usize {
        self.by_status
            .iter()
            .find(|entry| entry.status == status)
            .map_or(0, |entry| entry.count)
    }

    pub fn category_count(&self, category: Category) -> usize {
        self.by_category
            .iter()
            .find(|entry| entry.category == category)
            .map_or(0, |entry| entry.count)
    }
}
