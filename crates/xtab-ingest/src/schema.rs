//! Data dictionary loading.
//!
//! A dictionary is a table with the columns in [`SCHEMA_COLUMNS`]. Rows with a
//! `Var` cell start a variable; following rows with an empty `Var` and a
//! `Value` cell define value labels for the most recently accepted variable.
//!
//! The scan is a fold over typed [`SchemaRow`]s: [`scan_row`] takes the
//! current [`ScanState`] and one row and returns the next state plus a
//! [`RowEvent`], so each step can be tested in isolation.

use std::collections::BTreeSet;
use std::path::Path;

use xtab_model::{ByteSpan, Schema, VariableSpec};

use crate::error::{IngestError, Result, RowError};
use crate::sheet::{SheetTable, read_sheet};

/// Required dictionary columns, in the order [`SchemaRow`] reads them.
pub const SCHEMA_COLUMNS: [&str; 7] = [
    "Var",
    "Col",
    "Wid",
    "Value",
    "ValueLabel",
    "VarLabel",
    "Svar",
];

/// One dictionary row with every cell decoded once at the boundary.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SchemaRow {
    pub var: Option<String>,
    pub col: Option<String>,
    pub wid: Option<String>,
    pub value: Option<String>,
    pub value_label: Option<String>,
    pub var_label: Option<String>,
    pub svar: Option<String>,
}

impl SchemaRow {
    /// A variable-start row.
    pub fn variable(code: &str, col: &str, wid: &str) -> Self {
        Self {
            var: Some(code.to_string()),
            col: Some(col.to_string()),
            wid: Some(wid.to_string()),
            ..Self::default()
        }
    }

    /// A value-label row.
    pub fn value(value: &str, label: &str) -> Self {
        Self {
            value: Some(value.to_string()),
            value_label: (!label.is_empty()).then(|| label.to_string()),
            ..Self::default()
        }
    }

    pub fn with_var_label(mut self, label: &str) -> Self {
        self.var_label = Some(label.to_string());
        self
    }

    pub fn with_svar(mut self, svar: &str) -> Self {
        self.svar = Some(svar.to_string());
        self
    }
}

/// Scan cursor carried from row to row.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScanState {
    /// Most recently started and accepted variable.
    pub current_variable: Option<String>,
}

impl ScanState {
    pub fn accepting(code: &str) -> Self {
        Self {
            current_variable: Some(code.to_string()),
        }
    }

    pub fn is_accepting(&self) -> bool {
        self.current_variable.is_some()
    }
}

/// Outcome of scanning a single row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RowEvent {
    /// A requested variable started.
    Variable(VariableSpec),
    /// A value label for the current variable.
    ValueLabel {
        code: String,
        value: String,
        label: String,
    },
    /// Row belongs to an unrequested variable or carries nothing.
    Skipped,
    /// A requested variable row was malformed; it and its value rows are skipped.
    Rejected(RowError),
}

/// Advances the scan by one row.
pub fn scan_row(state: ScanState, row: &SchemaRow, requested: &BTreeSet<&str>) -> (ScanState, RowEvent) {
    if let Some(code) = row.var.as_deref() {
        if !requested.contains(code) {
            return (ScanState::default(), RowEvent::Skipped);
        }
        return match parse_variable(code, row) {
            Ok(spec) => (ScanState::accepting(code), RowEvent::Variable(spec)),
            Err(err) => (ScanState::default(), RowEvent::Rejected(err)),
        };
    }

    match (state.current_variable.as_deref(), row.value.as_deref()) {
        (Some(code), Some(value)) => {
            let event = RowEvent::ValueLabel {
                code: code.to_string(),
                value: value.to_string(),
                label: row.value_label.clone().unwrap_or_default(),
            };
            (state, event)
        }
        _ => (state, RowEvent::Skipped),
    }
}

fn parse_variable(code: &str, row: &SchemaRow) -> std::result::Result<VariableSpec, RowError> {
    let column = parse_count(code, "Col", row.col.as_deref())?;
    let width = parse_count(code, "Wid", row.wid.as_deref())?;
    let span = ByteSpan::from_column(column, width).ok_or_else(|| RowError::InvalidSpan {
        code: code.to_string(),
        column,
        width,
    })?;
    Ok(VariableSpec::new(
        code,
        row.var_label.clone().unwrap_or_default(),
        span,
        row.svar.clone().unwrap_or_default(),
    ))
}

/// Parses a non-negative integer cell. Integral floats (`"12.0"`) are accepted.
fn parse_count(code: &str, field: &'static str, raw: Option<&str>) -> std::result::Result<usize, RowError> {
    let Some(raw) = raw else {
        return Err(RowError::MissingField {
            code: code.to_string(),
            field,
        });
    };
    if let Ok(value) = raw.parse::<usize>() {
        return Ok(value);
    }
    match raw.parse::<f64>() {
        Ok(value)
            if value.is_finite()
                && value >= 0.0
                && value.fract() == 0.0
                && value < usize::MAX as f64 =>
        {
            Ok(value as usize)
        }
        _ => Err(RowError::InvalidNumber {
            code: code.to_string(),
            field,
            value: raw.to_string(),
        }),
    }
}

/// Converts a dictionary table into typed rows.
pub fn schema_rows(table: &SheetTable, path: &Path) -> Result<Vec<SchemaRow>> {
    let indices = table.require_columns(&SCHEMA_COLUMNS, path)?;
    let cell = |row: usize, column: usize| table.cell(row, indices[column]).map(str::to_string);
    Ok((0..table.height())
        .map(|row| SchemaRow {
            var: cell(row, 0),
            col: cell(row, 1),
            wid: cell(row, 2),
            value: cell(row, 3),
            value_label: cell(row, 4),
            var_label: cell(row, 5),
            svar: cell(row, 6),
        })
        .collect())
}

/// Folds dictionary rows into a [`Schema`] holding only the requested variables.
///
/// Requested codes absent from the rows produce no entry; use
/// [`require_variables`] to turn that into an error.
pub fn build_schema<S: AsRef<str>>(rows: &[SchemaRow], requested: &[S]) -> Schema {
    let requested: BTreeSet<&str> = requested.iter().map(AsRef::as_ref).collect();
    let (_, schema) = rows.iter().enumerate().fold(
        (ScanState::default(), Schema::new()),
        |(state, mut schema), (idx, row)| {
            let (next, event) = scan_row(state, row, &requested);
            apply_event(&mut schema, idx, event);
            (next, schema)
        },
    );
    schema
}

fn apply_event(schema: &mut Schema, idx: usize, event: RowEvent) {
    // Row numbers are 1-based and count the header row.
    let row = idx + 2;
    match event {
        RowEvent::Variable(spec) => {
            tracing::debug!(row, code = %spec.code, start = spec.span.start, end = spec.span.end, "Accepted variable");
            let code = spec.code.clone();
            if !schema.push_variable(spec) {
                tracing::warn!(row, %code, "Variable defined more than once, keeping first definition");
            }
        }
        RowEvent::ValueLabel { code, value, label } => {
            schema.insert_value_label(&code, &value, &label);
        }
        RowEvent::Rejected(err) => {
            tracing::warn!(row, error = %err, "Skipping malformed dictionary row");
        }
        RowEvent::Skipped => {}
    }
}

/// Loads the requested variables from a `.xlsx` or `.csv` dictionary.
pub fn load_schema<S: AsRef<str>>(path: &Path, requested: &[S]) -> Result<Schema> {
    let table = read_sheet(path)?;
    let rows = schema_rows(&table, path)?;
    let schema = build_schema(&rows, requested);
    tracing::info!(
        path = %path.display(),
        requested = requested.len(),
        accepted = schema.len(),
        "Loaded data dictionary"
    );
    Ok(schema)
}

/// Fails with every requested code that the schema does not define.
pub fn require_variables<S: AsRef<str>>(schema: &Schema, requested: &[S], path: &Path) -> Result<()> {
    let codes = schema.missing_codes(requested);
    if codes.is_empty() {
        Ok(())
    } else {
        Err(IngestError::UnknownVariables {
            codes,
            path: path.to_path_buf(),
        })
    }
}
