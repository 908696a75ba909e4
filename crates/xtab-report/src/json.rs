use std::io::Write;

use crate::error::{ReportError, Result};
use crate::layout::CrosstabReport;

pub fn json_bytes(report: &CrosstabReport) -> Result<Vec<u8>> {
    let mut bytes = serde_json::to_vec_pretty(report)?;
    bytes.push(b'\n');
    Ok(bytes)
}

pub fn write_json<W: Write>(report: &CrosstabReport, mut writer: W) -> Result<()> {
    let bytes = json_bytes(report)?;
    writer.write_all(&bytes).map_err(ReportError::Write)?;
    Ok(())
}
