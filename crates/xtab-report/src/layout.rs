//! Fixed row layout of the crosstab report.

use serde::Serialize;
use xtab_core::Crosstab;
use xtab_ingest::DecodedTable;
use xtab_model::CrosstabRow;

pub const SAMPLE_ROW: u32 = 0;
pub const PROFILE_ROW: u32 = 1;
pub const TAG_ROW: u32 = 5;
pub const CODE_ROW: u32 = 8;
pub const LABEL_ROW: u32 = 9;
pub const FIRST_LINE_ROW: u32 = 12;

/// Content of the profile row.
pub const PROFILE_MARKER: &str = "P";

/// Placeholder for a variable without a tag or descriptive label.
const BLANK: &str = " ";

/// Header metadata and crosstab lines of one sample.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CrosstabReport {
    pub sample: String,
    pub tags: Vec<String>,
    pub codes: Vec<String>,
    pub labels: Vec<String>,
    pub rows: Vec<CrosstabRow>,
}

impl CrosstabReport {
    /// Collects tags and descriptive labels of `selected` from the decoded table.
    pub fn new<S: AsRef<str>>(
        sample: &str,
        table: &DecodedTable,
        crosstab: &Crosstab,
        selected: &[S],
    ) -> Self {
        let codes: Vec<String> = selected.iter().map(|c| c.as_ref().to_string()).collect();
        let tags = codes
            .iter()
            .map(|code| table.tag(code).unwrap_or(BLANK).to_string())
            .collect();
        let labels = codes
            .iter()
            .map(|code| table.var_label(code).unwrap_or(BLANK).to_string())
            .collect();
        Self {
            sample: sample.to_string(),
            tags,
            codes,
            labels,
            rows: crosstab.rows().to_vec(),
        }
    }

    /// Non-blank rows as `(row index, text)`; every other row is empty.
    pub fn layout(&self) -> Vec<(u32, String)> {
        let mut rows = vec![
            (SAMPLE_ROW, self.sample.clone()),
            (PROFILE_ROW, PROFILE_MARKER.to_string()),
            (TAG_ROW, self.tags.join(" ")),
            (CODE_ROW, self.codes.join(" ")),
            (LABEL_ROW, self.labels.join(";")),
        ];
        rows.extend(
            (FIRST_LINE_ROW..)
                .zip(&self.rows)
                .map(|(idx, row)| (idx, row.to_string())),
        );
        rows
    }
}
