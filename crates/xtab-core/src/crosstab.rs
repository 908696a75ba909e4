use std::collections::BTreeMap;

use polars::prelude::StringChunked;
use serde::Serialize;
use xtab_ingest::{DecodedTable, display_column};
use xtab_model::CrosstabRow;

use crate::error::{CrosstabError, Result};

/// Separator between per-variable segments of a composite label.
pub const LABEL_SEPARATOR: &str = "; ";

/// Distinct combinations of the selected variables, sorted by (code, label).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Crosstab {
    variables: Vec<String>,
    rows: Vec<CrosstabRow>,
}

impl Crosstab {
    pub fn variables(&self) -> &[String] {
        &self.variables
    }

    pub fn rows(&self) -> &[CrosstabRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Sum of all frequencies; equals the number of aggregated records.
    pub fn total(&self) -> u64 {
        self.rows.iter().map(|row| row.frequency).sum()
    }

    /// `CODE = LABEL {FREQUENCY}` lines in row order.
    pub fn lines(&self) -> Vec<String> {
        self.rows.iter().map(ToString::to_string).collect()
    }
}

/// Concatenates raw codes with no separator, each stripped of surrounding whitespace.
pub fn composite_code<'a>(raw_values: impl IntoIterator<Item = &'a str>) -> String {
    raw_values.into_iter().map(str::trim).collect()
}

/// Joins display strings with `"; "`. Missing or blank segments become empty
/// strings but keep their position.
pub fn composite_label<'a>(segments: impl IntoIterator<Item = Option<&'a str>>) -> String {
    segments
        .into_iter()
        .map(|segment| match segment {
            Some(value) if !value.trim().is_empty() => value,
            _ => "",
        })
        .collect::<Vec<_>>()
        .join(LABEL_SEPARATOR)
}

/// Groups decoded records by composite (code, label) pair.
///
/// Every selected variable must have a raw column in `table`. A variable
/// without a display column contributes an empty label segment.
pub fn build_crosstab<S: AsRef<str>>(table: &DecodedTable, selected: &[S]) -> Result<Crosstab> {
    if selected.is_empty() {
        return Err(CrosstabError::NoVariables);
    }
    let frame = table.frame();

    let mut raw_columns: Vec<&StringChunked> = Vec::with_capacity(selected.len());
    let mut display_columns: Vec<Option<&StringChunked>> = Vec::with_capacity(selected.len());
    for variable in selected {
        let variable = variable.as_ref();
        let raw = frame
            .column(variable)
            .map_err(|_| CrosstabError::MissingVariable {
                variable: variable.to_string(),
            })?;
        raw_columns.push(raw.str()?);

        let display = match frame.column(&display_column(variable)) {
            Ok(column) => Some(column.str()?),
            Err(_) => {
                tracing::debug!(variable, "No value labels, using empty label segment");
                None
            }
        };
        display_columns.push(display);
    }

    let mut counts: BTreeMap<(String, String), u64> = BTreeMap::new();
    for idx in 0..frame.height() {
        let code = composite_code(raw_columns.iter().map(|column| column.get(idx).unwrap_or("")));
        let label = composite_label(
            display_columns
                .iter()
                .map(|column| column.and_then(|c| c.get(idx))),
        );
        *counts.entry((code, label)).or_insert(0) += 1;
    }

    let rows: Vec<CrosstabRow> = counts
        .into_iter()
        .map(|((code, label), frequency)| CrosstabRow::new(code, label, frequency))
        .collect();
    tracing::info!(
        records = frame.height(),
        combinations = rows.len(),
        variables = selected.len(),
        "Built crosstab"
    );

    Ok(Crosstab {
        variables: selected.iter().map(|v| v.as_ref().to_string()).collect(),
        rows,
    })
}

/// Formatted `CODE = LABEL {FREQUENCY}` lines for the selected variables.
pub fn aggregate<S: AsRef<str>>(table: &DecodedTable, selected: &[S]) -> Result<Vec<String>> {
    Ok(build_crosstab(table, selected)?.lines())
}
