mod density;
mod export;
mod summary;

pub use density::{DensityCell, DensityGrid, DensityIntensity};
pub use export::{export_csv, export_csv_string, ExportError, IssueExportRow};
pub use summary::{CategoryCount, IssueSummary, StatusCount};
