//! Sample identifier resolution.
//!
//! Sample names follow the `CCYYYYUU` convention: a two-letter country code,
//! a four-character year and a two-letter unit of analysis (`bd2018ir`). The
//! country code is looked up in a country directory table with the columns
//! `country`, `fullname` and `path`.

use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::error::{IngestError, Result};
use crate::sheet::{SheetTable, read_sheet};

const COUNTRY_COLUMNS: [&str; 3] = ["country", "fullname", "path"];

/// A decomposed sample identifier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SampleId {
    name: String,
    country_code: String,
    year: String,
    unit: String,
}

impl SampleId {
    /// Parses a sample name. The name is lower-cased first.
    pub fn parse(name: &str) -> Result<Self> {
        let name = name.trim().to_ascii_lowercase();
        let invalid = |reason: &str| IngestError::InvalidSampleId {
            sample: name.clone(),
            reason: reason.to_string(),
        };
        if !name.is_ascii() {
            return Err(invalid("expected ASCII characters"));
        }
        if name.len() < 8 {
            return Err(invalid(
                "expected country code, year and unit of analysis (e.g. bd2018ir)",
            ));
        }
        Ok(Self {
            country_code: name[0..2].to_string(),
            year: name[2..6].to_string(),
            unit: name[6..8].to_string(),
            name,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.name
    }

    pub fn country_code(&self) -> &str {
        &self.country_code
    }

    pub fn year(&self) -> &str {
        &self.year
    }

    pub fn unit(&self) -> &str {
        &self.unit
    }
}

impl fmt::Display for SampleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

/// One row of the country directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CountryEntry {
    pub code: String,
    pub full_name: String,
    pub path: String,
}

/// Where a sample's dictionary and records live.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SampleLocation {
    pub sample: SampleId,
    /// Full country name, lower-cased with spaces replaced by `_`.
    pub country_name: String,
    pub schema_path: PathBuf,
    pub records_path: PathBuf,
}

/// Country code lookup table.
#[derive(Debug, Clone, Default)]
pub struct CountryDirectory {
    entries: BTreeMap<String, CountryEntry>,
}

impl CountryDirectory {
    /// Loads the directory from a `.xlsx` or `.csv` file.
    pub fn load(path: &Path) -> Result<Self> {
        let table = read_sheet(path)?;
        let directory = Self::from_table(&table, path)?;
        tracing::debug!(path = %path.display(), countries = directory.len(), "Loaded country directory");
        Ok(directory)
    }

    /// Builds the directory from a table. The first row for a code wins.
    pub fn from_table(table: &SheetTable, path: &Path) -> Result<Self> {
        let indices = table.require_columns(&COUNTRY_COLUMNS, path)?;
        let mut entries = BTreeMap::new();
        for row in 0..table.height() {
            let Some(code) = table.cell(row, indices[0]) else {
                continue;
            };
            entries
                .entry(code.to_string())
                .or_insert_with(|| CountryEntry {
                    code: code.to_string(),
                    full_name: table.cell(row, indices[1]).unwrap_or_default().to_string(),
                    path: table.cell(row, indices[2]).unwrap_or_default().to_string(),
                });
        }
        Ok(Self { entries })
    }

    pub fn get(&self, code: &str) -> Option<&CountryEntry> {
        self.entries.get(code)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Resolves `{root}/{path}/{year}/data/data_dict_{sample}.xlsx` and
    /// `{root}/{path}/{year}/data/{sample}.dat`.
    pub fn resolve(&self, sample: &SampleId, data_root: &Path) -> Result<SampleLocation> {
        let entry = self
            .get(sample.country_code())
            .ok_or_else(|| IngestError::UnknownCountry {
                sample: sample.to_string(),
                code: sample.country_code().to_string(),
            })?;
        let data_dir = data_root
            .join(entry.path.trim_matches('/'))
            .join(sample.year())
            .join("data");
        Ok(SampleLocation {
            sample: sample.clone(),
            country_name: entry.full_name.to_lowercase().replace(' ', "_"),
            schema_path: data_dir.join(format!("data_dict_{sample}.xlsx")),
            records_path: data_dir.join(format!("{sample}.dat")),
        })
    }
}
