//! Survey crosstab generator CLI.

use std::io::{self, IsTerminal};
use std::path::PathBuf;

use clap::{ColorChoice, Parser};
use tracing::level_filters::LevelFilter;
use xtab_cli::logging::{LogConfig, init_logging};
use xtab_cli::pipeline::{DataSource, OutputTarget, RunConfig, run};
use xtab_report::ReportFormat;

mod cli;
mod summary;

use crate::cli::{Cli, FormatArg};
use crate::summary::print_preview;

fn main() {
    let cli = Cli::parse();
    cli.color.write_global();
    let log_config = log_config_from_cli(&cli);
    if let Err(error) = init_logging(&log_config) {
        eprintln!("error: failed to initialize logging: {error}");
        std::process::exit(1);
    }
    let exit_code = match run(&run_config_from_cli(&cli)) {
        Ok(result) => {
            if cli.preview {
                print_preview(&result);
            }
            println!("{}", result.output_path.display());
            0
        }
        Err(error) => {
            eprintln!("error: {error:#}");
            1
        }
    };
    std::process::exit(exit_code);
}

fn run_config_from_cli(cli: &Cli) -> RunConfig {
    let source = match (&cli.schema, &cli.records) {
        (Some(schema), Some(records)) => DataSource::Explicit {
            schema: schema.clone(),
            records: records.clone(),
        },
        _ => DataSource::Resolve {
            countries: cli.countries.clone(),
            data_root: cli.data_root.clone(),
        },
    };
    let output = match &cli.output {
        Some(path) => OutputTarget::File(path.clone()),
        None => OutputTarget::Directory(cli.output_dir.clone().unwrap_or_else(|| PathBuf::from("."))),
    };
    RunConfig {
        sample: cli.sample.clone(),
        variables: cli.variables.clone(),
        source,
        output,
        format: match cli.format {
            FormatArg::Xlsx => ReportFormat::Xlsx,
            FormatArg::Json => ReportFormat::Json,
        },
    }
}

/// Explicit `--log-level` wins over -v/-q; either disables `RUST_LOG`.
fn log_config_from_cli(cli: &Cli) -> LogConfig {
    let level_filter = cli
        .log_level
        .map_or_else(|| cli.verbosity.tracing_level_filter(), LevelFilter::from);
    let with_ansi = match cli.color.color {
        ColorChoice::Always => true,
        ColorChoice::Never => false,
        ColorChoice::Auto => cli.log_file.is_none() && io::stderr().is_terminal(),
    };
    LogConfig {
        level_filter,
        use_env_filter: !(cli.verbosity.is_present() || cli.log_level.is_some()),
        with_ansi,
        format: cli.log_format.into(),
        log_file: cli.log_file.clone(),
        ..LogConfig::default()
    }
}
