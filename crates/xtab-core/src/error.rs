use thiserror::Error;

#[derive(Debug, Error)]
pub enum CrosstabError {
    /// A selected variable has no raw-value column in the decoded table.
    #[error("decoded table is missing expected variable column: {variable}")]
    MissingVariable { variable: String },

    #[error("no variables selected for crosstab")]
    NoVariables,

    #[error("DataFrame operation failed: {message}")]
    DataFrame { message: String },
}

impl From<polars::prelude::PolarsError> for CrosstabError {
    fn from(err: polars::prelude::PolarsError) -> Self {
        Self::DataFrame {
            message: err.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, CrosstabError>;
