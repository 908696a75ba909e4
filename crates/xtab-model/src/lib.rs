pub mod crosstab;
pub mod schema;

pub use crosstab::CrosstabRow;
pub use schema::{ByteSpan, Schema, SchemaParts, ValueLabelTable, VariableSpec};
