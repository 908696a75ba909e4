//! Error types for survey data ingestion.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that abort an ingestion stage.
#[derive(Debug, Error)]
pub enum IngestError {
    // === Source Errors ===
    /// Input file does not exist.
    #[error("file not found: {path}")]
    FileNotFound { path: PathBuf },

    /// Input file exists but could not be read.
    #[error("failed to read file {path}: {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Record stream could not be read.
    #[error("failed to read records: {0}")]
    RecordRead(#[source] std::io::Error),

    // === Format Errors ===
    /// File extension is not a supported tabular format.
    #[error("unsupported file format for {path}: expected .xlsx or .csv")]
    UnsupportedFormat { path: PathBuf },

    /// Workbook could not be opened or parsed.
    #[error("failed to read workbook {path}: {message}")]
    Workbook { path: PathBuf, message: String },

    /// Workbook has no worksheets.
    #[error("workbook contains no sheets: {path}")]
    EmptyWorkbook { path: PathBuf },

    /// CSV could not be parsed.
    #[error("failed to parse CSV {path}: {message}")]
    CsvParse { path: PathBuf, message: String },

    /// Required column not found in a tabular file.
    #[error("required column '{column}' not found in {path}")]
    MissingColumn { column: String, path: PathBuf },

    /// Byte spans and variable labels disagree in length.
    #[error("schema has {spans} byte spans but {variables} variables")]
    InconsistentSchema { spans: usize, variables: usize },

    // === Lookup Errors ===
    /// Requested variables are absent from the schema.
    #[error("variables not found in schema {path}: {}", .codes.join(", "))]
    UnknownVariables { codes: Vec<String>, path: PathBuf },

    /// Sample identifier cannot be decomposed.
    #[error("invalid sample identifier '{sample}': {reason}")]
    InvalidSampleId { sample: String, reason: String },

    /// Country code of a sample is not in the country directory.
    #[error("no country found for sample '{sample}' (country code '{code}')")]
    UnknownCountry { sample: String, code: String },

    // === DataFrame Errors ===
    /// Failed DataFrame operation.
    #[error("DataFrame operation failed: {message}")]
    DataFrame { message: String },
}

impl From<polars::prelude::PolarsError> for IngestError {
    fn from(err: polars::prelude::PolarsError) -> Self {
        Self::DataFrame {
            message: err.to_string(),
        }
    }
}

/// Row-level schema problems. These are logged and the row skipped.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RowError {
    #[error("variable {code}: missing {field}")]
    MissingField { code: String, field: &'static str },

    #[error("variable {code}: invalid {field} value '{value}'")]
    InvalidNumber {
        code: String,
        field: &'static str,
        value: String,
    },

    #[error("variable {code}: column {column} with width {width} is not a valid span")]
    InvalidSpan {
        code: String,
        column: usize,
        width: usize,
    },
}

/// Result type for ingestion operations.
pub type Result<T> = std::result::Result<T, IngestError>;
