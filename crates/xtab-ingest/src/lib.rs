//! Survey microdata ingestion.
//!
//! This crate turns an external data dictionary and a fixed-width record file
//! into a labelled Polars [`DataFrame`](polars::prelude::DataFrame).
//!
//! # Features
//!
//! - **Tabular Reading**: `.xlsx` (first worksheet) and `.csv` dictionaries
//! - **Schema Loading**: byte spans, variable labels, tags, and value labels
//!   for a requested subset of variables
//! - **Record Decoding**: fixed-width slicing with value-label resolution and
//!   `code: label` display columns
//! - **Sample Resolution**: sample identifier to dictionary and data paths
//!
//! # Example
//!
//! ```ignore
//! use std::path::Path;
//! use xtab_ingest::{decode_file, load_schema, require_variables};
//!
//! let requested = ["v025", "v101"];
//! let schema_path = Path::new("data_dict_bd2018ir.xlsx");
//! let schema = load_schema(schema_path, &requested)?;
//! require_variables(&schema, &requested, schema_path)?;
//! let table = decode_file(Path::new("bd2018ir.dat"), &schema)?;
//! ```

mod decode;
mod error;
mod sample;
mod schema;
mod sheet;

// === Error Types ===
pub use error::{IngestError, Result, RowError};

// === Tabular Reading ===
pub use sheet::{SheetTable, TabularFormat, data_to_string, format_numeric, read_sheet};

// === Schema Loading ===
pub use schema::{
    RowEvent, SCHEMA_COLUMNS, ScanState, SchemaRow, build_schema, load_schema, require_variables,
    scan_row, schema_rows,
};

// === Record Decoding ===
pub use decode::{
    DISPLAY_SUFFIX, DecodedTable, LABEL_SUFFIX, combine_code_and_label, decode_bytes, decode_file,
    decode_parts, decode_records, display_column, label_column, resolve_label,
};

// === Sample Resolution ===
pub use sample::{CountryDirectory, CountryEntry, SampleId, SampleLocation};
