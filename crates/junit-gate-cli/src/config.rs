//! CLI configuration: verbosity, config file loading, flag overrides

use crate::commands::Cli;
use crate::error::{CliError, CliResult};
use chrono::{DateTime, Utc};
use junit_gate::{Clock, Config, UnitConfig};
use std::fs;
use std::path::Path;

/// CLI verbosity level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Verbosity {
    /// Errors only
    Quiet,
    /// Warnings, including coverage warnings
    #[default]
    Normal,
    /// Pipeline progress
    Verbose,
    /// Per-unit detail
    Debug,
}

impl Verbosity {
    /// `EnvFilter` directive used when `RUST_LOG` is unset
    #[must_use]
    pub const fn filter_directive(self) -> &'static str {
        match self {
            Self::Quiet => "error",
            Self::Normal => "warn",
            Self::Verbose => "info",
            Self::Debug => "debug",
        }
    }
}

/// Load a YAML config file
pub fn load_config_file(path: &Path) -> CliResult<Config> {
    let text = fs::read_to_string(path).map_err(|e| CliError::open(path, e))?;
    serde_yaml_ng::from_str(&text).map_err(|source| CliError::Yaml {
        path: path.to_path_buf(),
        source,
    })
}

/// Build the pipeline configuration: config file first, then flags
pub fn build_config(cli: &Cli) -> CliResult<Config> {
    let mut config = match &cli.config {
        Some(path) => load_config_file(path)?,
        None => Config::new(),
    };

    if let Some(parser) = &cli.parser {
        config.parser.clone_from(parser);
    }
    if let Some(hostname) = &cli.hostname {
        config.hostname.clone_from(hostname);
    }
    if let Some(name) = &cli.package_name {
        config.package_name.clone_from(name);
    }
    if let Some(mode) = cli.subtest_mode {
        config.subtest_mode = mode.into();
    }
    if let Some(percent) = cli.min_coverage {
        config.required_coverage = percent;
    }
    for (unit, percent) in &cli.min_cover {
        config
            .unit_configs
            .insert(unit.clone(), UnitConfig::with_min_cover(*percent));
    }
    for (name, value) in &cli.properties {
        config.properties.insert(name.clone(), value.clone());
    }
    if cli.no_xml_header {
        config.skip_xml_header = true;
    }
    if cli.print_events {
        config.print_events = true;
    }
    if let Some(at) = cli.timestamp {
        config.clock = Clock::fixed(at);
    }

    if !config.required_coverage.is_finite() {
        return Err(CliError::config("minimum coverage must be a finite number"));
    }
    Ok(config)
}

/// Parse `KEY=VALUE`
pub fn parse_property(s: &str) -> Result<(String, String), String> {
    let (key, value) = s
        .split_once('=')
        .ok_or_else(|| format!("expected KEY=VALUE, got `{s}`"))?;
    if key.is_empty() {
        return Err(format!("empty key in `{s}`"));
    }
    Ok((key.to_string(), value.to_string()))
}

/// Parse `UNIT=PCT`
pub fn parse_unit_cover(s: &str) -> Result<(String, f64), String> {
    let (unit, percent) = parse_property(s)?;
    let percent: f64 = percent
        .parse()
        .map_err(|_| format!("invalid coverage percentage in `{s}`"))?;
    if !percent.is_finite() {
        return Err(format!("invalid coverage percentage in `{s}`"));
    }
    Ok((unit, percent))
}

/// Parse an RFC 3339 timestamp
pub fn parse_timestamp(s: &str) -> Result<DateTime<Utc>, String> {
    DateTime::parse_from_rfc3339(s)
        .map(|t| t.with_timezone(&Utc))
        .map_err(|e| format!("invalid RFC 3339 timestamp `{s}`: {e}"))
}
