use std::collections::BTreeMap;

use serde::Serialize;

use super::super::domain::{Issue, IssueId};

/// Cells with at least this many issues count as hotspots.
const HOTSPOT_THRESHOLD: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DensityIntensity {
    VeryLow,
    Low,
    Medium,
    High,
    VeryHigh,
}

impl DensityIntensity {
    pub const fn for_count(count: usize) -> Self {
        match count {
            10.. => Self::VeryHigh,
            7..=9 => Self::High,
            5..=6 => Self::Medium,
            3..=4 => Self::Low,
            _ => Self::VeryLow,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::VeryLow => "Very Low",
            Self::Low => "Low",
            Self::Medium => "Medium",
            Self::High => "High",
            Self::VeryHigh => "Very High",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DensityCell {
    /// `"{lat}:{lng}"` with both coordinates rounded to whole degrees.
    pub key: String,
    pub lat: i32,
    pub lng: i32,
    pub count: usize,
    pub intensity: DensityIntensity,
    pub intensity_label: &'static str,
    pub issue_ids: Vec<IssueId>,
}

/// Issues grouped by rounded illustrative coordinates.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DensityGrid {
    pub cells: Vec<DensityCell>,
    pub hotspots: usize,
}

impl DensityGrid {
    pub fn from_issues(issues: &[Issue]) -> Self {
        let mut grouped: BTreeMap<(i32, i32), Vec<IssueId>> = BTreeMap::new();
        for issue in issues {
            let cell = (
                issue.coordinates.lat.round() as i32,
                issue.coordinates.lng.round() as i32,
            );
            grouped.entry(cell).or_default().push(issue.id.clone());
        }

        let cells: Vec<DensityCell> = grouped
            .into_iter()
            .map(|((lat, lng), issue_ids)| {
                let intensity = DensityIntensity::for_count(issue_ids.len());
                DensityCell {
                    key: format!("{lat}:{lng}"),
                    lat,
                    lng,
                    count: issue_ids.len(),
                    intensity,
                    intensity_label: intensity.label(),
                    issue_ids,
                }
            })
            .collect();

        let hotspots = cells
            .iter()
            .filter(|cell| cell.count >= HOTSPOT_THRESHOLD)
            .count();

        Self { cells, hotspots }
    }
}
