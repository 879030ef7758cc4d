//! CLI definition using clap

use crate::config::{parse_property, parse_timestamp, parse_unit_cover, Verbosity};
use chrono::{DateTime, Utc};
use clap::{ArgAction, Parser, ValueEnum};
use junit_gate::SubtestMode;
use std::path::PathBuf;

/// junit-gate: convert go test output to JUnit XML and enforce a coverage gate
///
/// Reads `go test -v` (or `go test -json`) output from stdin or `--in` and
/// writes a JUnit XML report to stdout or `--out`. Packages below the required
/// statement coverage are reported with a `lowCoverage` error.
#[derive(Parser, Debug)]
#[command(name = "junit-gate")]
#[command(author, version, about, long_about = None)]
#[allow(clippy::struct_excessive_bools)]
pub struct Cli {
    /// YAML config file; flags override its values
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Input format: gotest or gojson
    #[arg(long, value_name = "NAME")]
    pub parser: Option<String>,

    /// Read the transcript from FILE instead of stdin
    #[arg(long = "in", value_name = "FILE")]
    pub input: Option<PathBuf>,

    /// Write the report to FILE instead of stdout
    #[arg(long = "out", value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Hostname recorded on every test suite
    #[arg(long, env = "HOSTNAME")]
    pub hostname: Option<String>,

    /// Package name used when the input never names one
    #[arg(long, value_name = "NAME")]
    pub package_name: Option<String>,

    /// How parent tests of subtests are reported
    #[arg(long, value_enum)]
    pub subtest_mode: Option<SubtestModeArg>,

    /// Minimum statement coverage percentage for every package
    #[arg(long, value_name = "PCT")]
    pub min_coverage: Option<f64>,

    /// Per-package minimum coverage, e.g. example.com/legacy=40 (repeatable)
    #[arg(long = "min-cover", value_name = "UNIT=PCT", value_parser = parse_unit_cover)]
    pub min_cover: Vec<(String, f64)>,

    /// Property added to every test suite (repeatable)
    #[arg(long = "prop", value_name = "KEY=VALUE", value_parser = parse_property)]
    pub properties: Vec<(String, String)>,

    /// Omit the XML declaration
    #[arg(long)]
    pub no_xml_header: bool,

    /// Write raw parse events as JSON lines to stderr
    #[arg(long)]
    pub print_events: bool,

    /// Fixed timestamp for every test suite
    #[arg(long, value_name = "RFC3339", value_parser = parse_timestamp)]
    pub timestamp: Option<DateTime<Utc>>,

    /// Exit with status 1 when any package failed
    #[arg(long)]
    pub set_exit_code: bool,

    /// Log output format
    #[arg(long, value_enum, default_value = "text")]
    pub log_format: LogFormat,

    /// Verbosity level (-v, -vv)
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,

    /// Only log errors
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,
}

impl Cli {
    /// Verbosity selected by `-v` / `-q`
    #[must_use]
    pub const fn verbosity(&self) -> Verbosity {
        if self.quiet {
            return Verbosity::Quiet;
        }
        match self.verbose {
            0 => Verbosity::Normal,
            1 => Verbosity::Verbose,
            _ => Verbosity::Debug,
        }
    }
}

/// Subtest mode argument
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum SubtestModeArg {
    /// Report parents as go test does
    Default,
    /// Report failing parents as passed
    IgnoreParentResults,
    /// Drop parents of subtests
    ExcludeParents,
}

impl From<SubtestModeArg> for SubtestMode {
    fn from(arg: SubtestModeArg) -> Self {
        match arg {
            SubtestModeArg::Default => Self::Default,
            SubtestModeArg::IgnoreParentResults => Self::IgnoreParentResults,
            SubtestModeArg::ExcludeParents => Self::ExcludeParents,
        }
    }
}

/// Log output format
#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum LogFormat {
    /// Compact human-readable lines
    #[default]
    Text,
    /// One JSON object per line
    Json,
}
