//! CLI argument definitions for the crosstab generator.

use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use colorchoice_clap::Color;
use tracing::level_filters::LevelFilter;
use xtab_cli::logging::LogFormat;

#[derive(Parser)]
#[command(
    name = "xtab",
    version,
    about = "Crosstab survey variables into CODE = LABEL {FREQ} lines",
    long_about = "Decode a fixed-width survey sample with its data dictionary and count\n\
                  every observed combination of the selected variables.\n\n\
                  The dictionary and records are located through the country directory\n\
                  unless --schema and --records are both given."
)]
pub struct Cli {
    /// Sample identifier (country code, year, unit of analysis), e.g. bd2018ir.
    #[arg(value_name = "SAMPLE")]
    pub sample: String,

    /// Variable codes to cross, in output order.
    #[arg(value_name = "VARIABLES", required = true, num_args = 1..)]
    pub variables: Vec<String>,

    /// Country directory with columns country, fullname and path.
    #[arg(long = "countries", value_name = "PATH", default_value = "countries.xlsx")]
    pub countries: PathBuf,

    /// Root directory that country paths are relative to.
    #[arg(long = "data-root", value_name = "DIR", default_value = "/")]
    pub data_root: PathBuf,

    /// Data dictionary to use instead of the resolved one.
    #[arg(long = "schema", value_name = "PATH", requires = "records")]
    pub schema: Option<PathBuf>,

    /// Fixed-width record file to use instead of the resolved one.
    #[arg(long = "records", value_name = "PATH", requires = "schema")]
    pub records: Option<PathBuf>,

    /// Explicit report destination.
    #[arg(long = "output", value_name = "PATH", conflicts_with = "output_dir")]
    pub output: Option<PathBuf>,

    /// Directory for {sample}_crosstab.{ext} (default: current directory).
    #[arg(long = "output-dir", value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    /// Report format.
    #[arg(long = "format", value_enum, default_value = "xlsx")]
    pub format: FormatArg,

    /// Print the crosstab as a table on stderr.
    #[arg(long = "preview")]
    pub preview: bool,

    /// Adjust log verbosity (-v for info, -vv for debug, -q for errors only).
    #[command(flatten)]
    pub verbosity: Verbosity<WarnLevel>,

    /// Control ANSI color output (auto, always, never).
    #[command(flatten)]
    pub color: Color,

    /// Explicit log level (overrides -v/-q flags).
    #[arg(long = "log-level", value_enum)]
    pub log_level: Option<LogLevelArg>,

    /// Log output format (pretty for human, json for machine parsing).
    #[arg(long = "log-format", value_enum, default_value = "pretty")]
    pub log_format: LogFormatArg,

    /// Write logs to a file instead of stderr.
    #[arg(long = "log-file", value_name = "PATH")]
    pub log_file: Option<PathBuf>,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum FormatArg {
    Xlsx,
    Json,
}

/// CLI log level choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogLevelArg {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// CLI log format choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogFormatArg {
    Pretty,
    Compact,
    Json,
}

impl From<LogLevelArg> for LevelFilter {
    fn from(level: LogLevelArg) -> Self {
        match level {
            LogLevelArg::Error => Self::ERROR,
            LogLevelArg::Warn => Self::WARN,
            LogLevelArg::Info => Self::INFO,
            LogLevelArg::Debug => Self::DEBUG,
            LogLevelArg::Trace => Self::TRACE,
        }
    }
}

impl From<LogFormatArg> for LogFormat {
    fn from(format: LogFormatArg) -> Self {
        match format {
            LogFormatArg::Pretty => Self::Pretty,
            LogFormatArg::Compact => Self::Compact,
            LogFormatArg::Json => Self::Json,
        }
    }
}
