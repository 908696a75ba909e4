//! Crosstab pipeline with explicit stages.
//!
//! 1. **Resolve**: locate the data dictionary and record file for the sample
//! 2. **Schema**: load byte spans and labels of the requested variables
//! 3. **Decode**: slice records and attach value labels
//! 4. **Aggregate**: count composite (code, label) combinations
//! 5. **Output**: write the report to an explicit destination

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::{debug, info, info_span};

use xtab_core::{Crosstab, build_crosstab};
use xtab_ingest::{
    CountryDirectory, DecodedTable, SampleId, decode_file, load_schema, require_variables,
};
use xtab_model::Schema;
use xtab_report::{CrosstabReport, ReportFormat, write_report_file};

/// Where the dictionary and records come from.
#[derive(Debug, Clone)]
pub enum DataSource {
    /// Look the sample up in a country directory under `data_root`.
    Resolve {
        countries: PathBuf,
        data_root: PathBuf,
    },
    /// Use the given files directly.
    Explicit { schema: PathBuf, records: PathBuf },
}

/// Where the report is written.
#[derive(Debug, Clone)]
pub enum OutputTarget {
    File(PathBuf),
    /// `{sample}_crosstab.{ext}` inside this directory.
    Directory(PathBuf),
}

#[derive(Debug, Clone)]
pub struct RunConfig {
    pub sample: String,
    pub variables: Vec<String>,
    pub source: DataSource,
    pub output: OutputTarget,
    pub format: ReportFormat,
}

#[derive(Debug)]
pub struct RunResult {
    pub sample: String,
    pub output_path: PathBuf,
    pub records: usize,
    pub crosstab: Crosstab,
}

/// Lower-cases and trims variable codes, dropping blanks.
pub fn normalize_codes<S: AsRef<str>>(codes: &[S]) -> Vec<String> {
    codes
        .iter()
        .map(|code| code.as_ref().trim().to_lowercase())
        .filter(|code| !code.is_empty())
        .collect()
}

/// Default report file name for a sample.
pub fn default_file_name(sample: &str, format: ReportFormat) -> String {
    format!("{sample}_crosstab.{}", format.extension())
}

pub fn output_path(target: &OutputTarget, sample: &str, format: ReportFormat) -> PathBuf {
    match target {
        OutputTarget::File(path) => path.clone(),
        OutputTarget::Directory(dir) => dir.join(default_file_name(sample, format)),
    }
}

/// Runs every stage and returns the written report path.
pub fn run(config: &RunConfig) -> Result<RunResult> {
    let variables = normalize_codes(&config.variables);
    anyhow::ensure!(!variables.is_empty(), "no variables requested");
    let sample = config.sample.trim().to_lowercase();
    let _span = info_span!("crosstab", sample = %sample).entered();

    let (schema_path, records_path) = resolve_sources(&sample, &config.source)?;

    let schema = {
        let _stage = info_span!("schema").entered();
        let schema = load_schema(&schema_path, &variables)
            .with_context(|| format!("load data dictionary {}", schema_path.display()))?;
        require_variables(&schema, &variables, &schema_path)?;
        schema
    };

    let table = decode_stage(&records_path, &schema)?;

    let crosstab = {
        let _stage = info_span!("aggregate").entered();
        build_crosstab(&table, &variables)
            .with_context(|| format!("crosstab {}", variables.join(" ")))?
    };

    let destination = output_path(&config.output, &sample, config.format);
    {
        let _stage = info_span!("output").entered();
        let report = CrosstabReport::new(&sample, &table, &crosstab, &variables);
        write_report_file(&report, &destination, config.format)
            .with_context(|| format!("write report {}", destination.display()))?;
    }

    info!(
        records = table.height(),
        combinations = crosstab.len(),
        output = %destination.display(),
        "Crosstab complete"
    );
    Ok(RunResult {
        sample,
        output_path: destination,
        records: table.height(),
        crosstab,
    })
}

fn resolve_sources(sample: &str, source: &DataSource) -> Result<(PathBuf, PathBuf)> {
    let _stage = info_span!("resolve").entered();
    match source {
        DataSource::Explicit { schema, records } => Ok((schema.clone(), records.clone())),
        DataSource::Resolve {
            countries,
            data_root,
        } => {
            let sample_id = SampleId::parse(sample)?;
            let directory = CountryDirectory::load(countries)
                .with_context(|| format!("load country directory {}", countries.display()))?;
            let location = directory.resolve(&sample_id, data_root)?;
            debug!(
                country = %location.country_name,
                year = sample_id.year(),
                unit = sample_id.unit(),
                schema = %location.schema_path.display(),
                records = %location.records_path.display(),
                "Resolved sample"
            );
            Ok((location.schema_path, location.records_path))
        }
    }
}

fn decode_stage(records_path: &Path, schema: &Schema) -> Result<DecodedTable> {
    let _stage = info_span!("decode").entered();
    decode_file(records_path, schema)
        .with_context(|| format!("decode records {}", records_path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_are_lowercased_and_trimmed() {
        assert_eq!(normalize_codes(&["V025", " v101 ", ""]), vec!["v025", "v101"]);
    }

    #[test]
    fn directory_target_uses_sample_file_name() {
        let target = OutputTarget::Directory(PathBuf::from("/tmp/out"));
        assert_eq!(
            output_path(&target, "bd2018ir", ReportFormat::Json),
            PathBuf::from("/tmp/out/bd2018ir_crosstab.json")
        );
        let target = OutputTarget::File(PathBuf::from("report.xlsx"));
        assert_eq!(
            output_path(&target, "bd2018ir", ReportFormat::Json),
            PathBuf::from("report.xlsx")
        );
    }
}
