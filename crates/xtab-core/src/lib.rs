//! Crosstab aggregation over decoded survey records.
//!
//! Raw codes of the selected variables are concatenated into a composite code,
//! their `code: label` display strings are joined with `"; "` into a composite
//! label, and records are counted per distinct (code, label) pair.

pub mod crosstab;
pub mod error;

pub use crosstab::{
    Crosstab, LABEL_SEPARATOR, aggregate, build_crosstab, composite_code, composite_label,
};
pub use error::{CrosstabError, Result};
