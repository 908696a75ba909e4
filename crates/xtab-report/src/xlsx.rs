use std::io::Write;

use rust_xlsxwriter::Workbook;

use crate::error::{ReportError, Result};
use crate::layout::CrosstabReport;

/// Renders the report layout into column A of a single worksheet.
pub fn xlsx_bytes(report: &CrosstabReport) -> Result<Vec<u8>> {
    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();
    for (row, text) in report.layout() {
        worksheet.write_string(row, 0, text)?;
    }
    Ok(workbook.save_to_buffer()?)
}

pub fn write_xlsx<W: Write>(report: &CrosstabReport, mut writer: W) -> Result<()> {
    let bytes = xlsx_bytes(report)?;
    writer.write_all(&bytes).map_err(ReportError::Write)?;
    Ok(())
}
