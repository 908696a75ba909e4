//! Crosstab report generation.
//!
//! A [`CrosstabReport`] carries the header metadata of the selected variables
//! and the crosstab lines. It is written as:
//!
//! - **XLSX**: a single-column worksheet consumed by the translation-table tool
//! - **JSON**: the same fields as a structured document

mod error;
mod json;
mod layout;
mod xlsx;

use std::fs;
use std::path::{Path, PathBuf};

pub use error::{ReportError, Result};
pub use json::{json_bytes, write_json};
pub use layout::{
    CODE_ROW, CrosstabReport, FIRST_LINE_ROW, LABEL_ROW, PROFILE_MARKER, PROFILE_ROW, SAMPLE_ROW,
    TAG_ROW,
};
pub use xlsx::{write_xlsx, xlsx_bytes};

/// Output format of a report file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReportFormat {
    #[default]
    Xlsx,
    Json,
}

impl ReportFormat {
    pub fn extension(self) -> &'static str {
        match self {
            Self::Xlsx => "xlsx",
            Self::Json => "json",
        }
    }
}

/// Writes the report to `path`.
///
/// The document is rendered in memory first, so a failed render never
/// creates or truncates the destination.
pub fn write_report_file(
    report: &CrosstabReport,
    path: &Path,
    format: ReportFormat,
) -> Result<PathBuf> {
    let bytes = match format {
        ReportFormat::Xlsx => xlsx_bytes(report)?,
        ReportFormat::Json => json_bytes(report)?,
    };
    fs::write(path, &bytes).map_err(|source| ReportError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    tracing::info!(
        path = %path.display(),
        format = format.extension(),
        bytes = bytes.len(),
        "Wrote crosstab report"
    );
    Ok(path.to_path_buf())
}
