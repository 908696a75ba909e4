//! Fixed-width record decoding.
//!
//! Each record line is sliced by the schema's byte spans into opaque strings.
//! For every variable with a value-label table the decoder adds two derived
//! columns next to the raw one:
//!
//! - `{code}_label`: the looked-up label, or the stripped raw value on a miss
//! - `{code}_code_and_label`: `raw: label` when the label differs from the raw
//!   value, otherwise just `raw`

use std::collections::BTreeMap;
use std::fs;
use std::io::Read;
use std::path::Path;

use polars::prelude::*;
use xtab_model::{Schema, SchemaParts, ValueLabelTable};

use crate::error::{IngestError, Result};

/// Suffix of the resolved-label column.
pub const LABEL_SUFFIX: &str = "_label";
/// Suffix of the combined `code: label` column.
pub const DISPLAY_SUFFIX: &str = "_code_and_label";

pub fn label_column(code: &str) -> String {
    format!("{code}{LABEL_SUFFIX}")
}

pub fn display_column(code: &str) -> String {
    format!("{code}{DISPLAY_SUFFIX}")
}

/// Decoded records plus the variable metadata the report needs.
#[derive(Debug, Clone)]
pub struct DecodedTable {
    frame: DataFrame,
    variables: Vec<String>,
    var_labels: BTreeMap<String, String>,
    tags: BTreeMap<String, String>,
}

impl DecodedTable {
    /// Wraps an already decoded frame with its variable metadata.
    pub fn new(
        frame: DataFrame,
        variables: Vec<String>,
        var_labels: BTreeMap<String, String>,
        tags: BTreeMap<String, String>,
    ) -> Self {
        Self {
            frame,
            variables,
            var_labels,
            tags,
        }
    }

    pub fn frame(&self) -> &DataFrame {
        &self.frame
    }

    /// Number of decoded records.
    pub fn height(&self) -> usize {
        self.frame.height()
    }

    /// Variable codes in schema order.
    pub fn variables(&self) -> &[String] {
        &self.variables
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.frame.column(name).is_ok()
    }

    pub fn var_label(&self, code: &str) -> Option<&str> {
        self.var_labels.get(code).map(String::as_str)
    }

    pub fn tag(&self, code: &str) -> Option<&str> {
        self.tags.get(code).map(String::as_str)
    }

    pub fn var_labels(&self) -> &BTreeMap<String, String> {
        &self.var_labels
    }

    pub fn tags(&self) -> &BTreeMap<String, String> {
        &self.tags
    }
}

/// Resolves the label of a raw value. The value is stripped before lookup; on
/// a miss the stripped value itself is the label.
pub fn resolve_label(raw: &str, table: &ValueLabelTable) -> String {
    let value = raw.trim();
    match table.lookup(value) {
        Some(label) => label.to_string(),
        None => value.to_string(),
    }
}

/// `raw: label` when the label differs from the raw value, otherwise `raw`.
pub fn combine_code_and_label(raw: &str, label: &str) -> String {
    if label == raw {
        raw.to_string()
    } else {
        format!("{raw}: {label}")
    }
}

/// Reads and decodes a fixed-width record file.
///
/// The file is read fully and released before decoding starts.
pub fn decode_file(path: &Path, schema: &Schema) -> Result<DecodedTable> {
    let bytes = fs::read(path).map_err(|source| {
        if source.kind() == std::io::ErrorKind::NotFound {
            IngestError::FileNotFound {
                path: path.to_path_buf(),
            }
        } else {
            IngestError::FileRead {
                path: path.to_path_buf(),
                source,
            }
        }
    })?;
    tracing::debug!(path = %path.display(), bytes = bytes.len(), "Read record file");
    decode_bytes(&bytes, schema)
}

/// Decodes records from any reader.
pub fn decode_records<R: Read>(mut reader: R, schema: &Schema) -> Result<DecodedTable> {
    let mut bytes = Vec::new();
    reader
        .read_to_end(&mut bytes)
        .map_err(IngestError::RecordRead)?;
    decode_bytes(&bytes, schema)
}

pub fn decode_bytes(input: &[u8], schema: &Schema) -> Result<DecodedTable> {
    decode_parts(input, &schema.clone().into_parts())
}

/// Decodes records from the four schema collections.
///
/// Variables without an entry in `parts.value_labels` keep only their raw,
/// unstripped column.
pub fn decode_parts(input: &[u8], parts: &SchemaParts) -> Result<DecodedTable> {
    if parts.byte_spans.len() != parts.var_labels.len() {
        return Err(IngestError::InconsistentSchema {
            spans: parts.byte_spans.len(),
            variables: parts.var_labels.len(),
        });
    }

    let max_end = parts.byte_spans.iter().map(|span| span.end).max().unwrap_or(0);
    let mut raw: Vec<Vec<String>> = vec![Vec::new(); parts.byte_spans.len()];
    let mut short_lines = 0usize;
    for line in input.split(|&byte| byte == b'\n') {
        let line = line.strip_suffix(b"\r").unwrap_or(line);
        if line.is_empty() {
            continue;
        }
        if line.len() < max_end {
            short_lines += 1;
        }
        for (values, span) in raw.iter_mut().zip(&parts.byte_spans) {
            values.push(String::from_utf8_lossy(span.slice(line)).into_owned());
        }
    }
    if short_lines > 0 {
        tracing::warn!(
            short_lines,
            expected_width = max_end,
            "Some records are shorter than the dictionary layout"
        );
    }

    let mut columns: Vec<Column> = Vec::with_capacity(parts.var_labels.len() * 3);
    for ((code, _), values) in parts.var_labels.iter().zip(raw) {
        let Some(table) = parts.value_labels.get(code) else {
            columns.push(Column::new(code.as_str().into(), values));
            continue;
        };
        let stripped: Vec<String> = values.iter().map(|v| v.trim().to_string()).collect();
        let labels: Vec<String> = stripped.iter().map(|v| resolve_label(v, table)).collect();
        let display: Vec<String> = stripped
            .iter()
            .zip(&labels)
            .map(|(raw, label)| combine_code_and_label(raw, label))
            .collect();
        let misses = stripped
            .iter()
            .filter(|v| table.lookup(v).is_none())
            .count();
        tracing::debug!(
            variable = %code,
            labels = table.len(),
            misses,
            "Resolved value labels"
        );
        columns.push(Column::new(code.as_str().into(), stripped));
        columns.push(Column::new(label_column(code).into(), labels));
        columns.push(Column::new(display_column(code).into(), display));
    }
    let frame = DataFrame::new(columns)?;

    tracing::info!(
        records = frame.height(),
        variables = parts.var_labels.len(),
        "Decoded fixed-width records"
    );

    Ok(DecodedTable {
        frame,
        variables: parts.var_labels.iter().map(|(code, _)| code.clone()).collect(),
        var_labels: parts.var_labels.iter().cloned().collect(),
        tags: parts.tags.iter().cloned().collect(),
    })
}
