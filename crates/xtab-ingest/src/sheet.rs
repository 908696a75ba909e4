//! Tabular file reading for data dictionaries and lookup tables.
//!
//! Workbooks are read from their first worksheet with `calamine`; CSV files
//! with the `csv` crate. In both cases the first row is the header row and
//! every cell is normalized to a trimmed string, with blank cells as `None`.

use std::path::Path;

use calamine::{Data, Reader, Xlsx, XlsxError, open_workbook};
use csv::ReaderBuilder;

use crate::error::{IngestError, Result};

/// Supported tabular source formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TabularFormat {
    Xlsx,
    Csv,
}

impl TabularFormat {
    /// Detects the format from the file extension (case-insensitive).
    pub fn from_path(path: &Path) -> Result<Self> {
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase);
        match extension.as_deref() {
            Some("xlsx") => Ok(Self::Xlsx),
            Some("csv") => Ok(Self::Csv),
            _ => Err(IngestError::UnsupportedFormat {
                path: path.to_path_buf(),
            }),
        }
    }
}

/// Header row plus normalized data rows.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SheetTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<Option<String>>>,
}

impl SheetTable {
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|header| header == name)
    }

    /// Resolves every named column, failing on the first one absent.
    pub fn require_columns(&self, names: &[&str], path: &Path) -> Result<Vec<usize>> {
        names
            .iter()
            .map(|name| {
                self.column_index(name)
                    .ok_or_else(|| IngestError::MissingColumn {
                        column: (*name).to_string(),
                        path: path.to_path_buf(),
                    })
            })
            .collect()
    }

    pub fn cell(&self, row: usize, column: usize) -> Option<&str> {
        self.rows
            .get(row)
            .and_then(|cells| cells.get(column))
            .and_then(Option::as_deref)
    }

    pub fn height(&self) -> usize {
        self.rows.len()
    }
}

/// Reads a `.xlsx` or `.csv` file into a [`SheetTable`].
pub fn read_sheet(path: &Path) -> Result<SheetTable> {
    let format = TabularFormat::from_path(path)?;
    if !path.exists() {
        return Err(IngestError::FileNotFound {
            path: path.to_path_buf(),
        });
    }
    let table = match format {
        TabularFormat::Xlsx => read_xlsx(path)?,
        TabularFormat::Csv => read_csv(path)?,
    };
    tracing::debug!(
        path = %path.display(),
        columns = table.headers.len(),
        rows = table.height(),
        "Read tabular file"
    );
    Ok(table)
}

fn read_xlsx(path: &Path) -> Result<SheetTable> {
    let workbook_error = |err: XlsxError| IngestError::Workbook {
        path: path.to_path_buf(),
        message: err.to_string(),
    };
    let mut workbook: Xlsx<_> = open_workbook(path).map_err(workbook_error)?;
    let Some(first_sheet) = workbook.sheet_names().first().cloned() else {
        return Err(IngestError::EmptyWorkbook {
            path: path.to_path_buf(),
        });
    };
    let range = workbook
        .worksheet_range(&first_sheet)
        .map_err(workbook_error)?;

    let mut rows = range.rows();
    let headers = rows
        .next()
        .map(|row| {
            row.iter()
                .map(|cell| data_to_string(cell).unwrap_or_default())
                .collect::<Vec<_>>()
        })
        .unwrap_or_default();
    let rows = rows
        .map(|row| row.iter().map(data_to_string).collect::<Vec<_>>())
        .collect();
    Ok(SheetTable { headers, rows })
}

fn read_csv(path: &Path) -> Result<SheetTable> {
    let csv_error = |err: csv::Error| IngestError::CsvParse {
        path: path.to_path_buf(),
        message: err.to_string(),
    };
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_path(path)
        .map_err(csv_error)?;
    let headers: Vec<String> = reader
        .headers()
        .map_err(csv_error)?
        .iter()
        .map(normalize_header)
        .collect();

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record.map_err(csv_error)?;
        let row: Vec<Option<String>> = (0..headers.len())
            .map(|idx| record.get(idx).and_then(normalize_cell))
            .collect();
        rows.push(row);
    }
    Ok(SheetTable { headers, rows })
}

fn normalize_header(raw: &str) -> String {
    raw.trim().trim_matches('\u{feff}').trim().to_string()
}

fn normalize_cell(raw: &str) -> Option<String> {
    let trimmed = raw.trim().trim_matches('\u{feff}');
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// Converts a workbook cell to a trimmed string. Blank and error cells are `None`.
pub fn data_to_string(cell: &Data) -> Option<String> {
    match cell {
        Data::Empty | Data::Error(_) => None,
        Data::String(s) | Data::DateTimeIso(s) | Data::DurationIso(s) => normalize_cell(s),
        Data::Float(v) => Some(format_numeric(*v)),
        Data::Int(v) => Some(v.to_string()),
        Data::Bool(b) => Some(b.to_string()),
        Data::DateTime(dt) => Some(format_numeric(dt.as_f64())),
    }
}

/// Formats a float without a fractional part when it is integral (`1.0` -> `1`).
pub fn format_numeric(v: f64) -> String {
    if v.is_finite() && v.fract() == 0.0 && v.abs() < 1e15 {
        format!("{}", v as i64)
    } else {
        format!("{v}")
    }
}
