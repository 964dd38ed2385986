use std::io::Write;

use serde::Serialize;

use super::super::domain::Issue;

/// Flat CSV row carrying every issue field.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IssueExportRow {
    #[serde(rename = "ID")]
    pub id: String,
    #[serde(rename = "Title")]
    pub title: String,
    #[serde(rename = "Description")]
    pub description: String,
    #[serde(rename = "Category")]
    pub category: &'static str,
    #[serde(rename = "Severity")]
    pub severity: &'static str,
    #[serde(rename = "Status")]
    pub status: &'static str,
    #[serde(rename = "ReporterID")]
    pub reporter_id: String,
    #[serde(rename = "Reporter")]
    pub reporter_name: String,
    #[serde(rename = "AssignedTechnicianID")]
    pub assigned_technician: String,
    #[serde(rename = "AssignedTo")]
    pub assigned_technician_name: String,
    #[serde(rename = "Confidence")]
    pub classification_confidence: f32,
    #[serde(rename = "Location")]
    pub location: String,
    #[serde(rename = "Latitude")]
    pub lat: f64,
    #[serde(rename = "Longitude")]
    pub lng: f64,
    #[serde(rename = "CreatedAt")]
    pub created_at: String,
    #[serde(rename = "UpdatedAt")]
    pub updated_at: String,
}

impl From<&Issue> for IssueExportRow {
    fn from(issue: &Issue) -> Self {
        Self {
            id: issue.id.0.clone(),
            title: issue.title.clone(),
            description: issue.description.clone(),
            category: issue.category.label(),
            severity: issue.severity.label(),
            status: issue.status.label(),
            reporter_id: issue.reporter_id.0.clone(),
            reporter_name: issue.reporter_name.clone(),
            assigned_technician: issue
                .assigned_technician
                .as_ref()
                .map(|id| id.0.clone())
                .unwrap_or_default(),
            assigned_technician_name: issue
                .assigned_technician_name
                .clone()
                .unwrap_or_else(|| "Unassigned".to_string()),
            classification_confidence: issue.classification_confidence,
            location: issue.location.clone(),
            lat: issue.coordinates.lat,
            lng: issue.coordinates.lng,
            created_at: issue.created_at.to_rfc3339(),
            updated_at: issue.updated_at.to_rfc3339(),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("failed to encode issue export: {0}")]
    Csv(#[from] csv::Error),
    #[error("failed to write issue export: {0}")]
    Io(#[source] std::io::Error),
    #[error("issue export is not valid UTF-8: {0}")]
    Encoding(#[source] std::string::FromUtf8Error),
}

/// Writes a header row followed by one row per issue, in the given order.
pub fn export_csv<W: Write>(issues: &[Issue], writer: W) -> Result<W, ExportError> {
    let mut csv_writer = csv::WriterBuilder::new()
        .has_headers(true)
        .from_writer(writer);

    for issue in issues {
        csv_writer.serialize(IssueExportRow::from(issue))?;
    }

    csv_writer
        .into_inner()
        .map_err(|err| ExportError::Io(err.into_error()))
}

pub fn export_csv_string(issues: &[Issue]) -> Result<String, ExportError> {
    let buffer = export_csv(issues, Vec::new())?;
    String::from_utf8(buffer).map_err(ExportError::Encoding)
}
