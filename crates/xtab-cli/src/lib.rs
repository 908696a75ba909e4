//! CLI library components for the survey crosstab generator.

pub mod logging;
pub mod pipeline;
