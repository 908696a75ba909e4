use std::fmt;

use serde::{Deserialize, Serialize};

/// One distinct observed (composite code, composite label) combination.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct CrosstabRow {
    pub composite_code: String,
    pub composite_label: String,
    pub frequency: u64,
}

impl CrosstabRow {
    pub fn new(
        composite_code: impl Into<String>,
        composite_label: impl Into<String>,
        frequency: u64,
    ) -> Self {
        Self {
            composite_code: composite_code.into(),
            composite_label: composite_label.into(),
            frequency,
        }
    }
}

/// Renders `CODE = LABEL {FREQUENCY}`.
impl fmt::Display for CrosstabRow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} = {} {{{}}}",
            self.composite_code, self.composite_label, self.frequency
        )
    }
}
