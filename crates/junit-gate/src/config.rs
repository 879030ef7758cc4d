//! Pipeline configuration

use crate::clock::Clock;
use crate::coverage::CoveragePolicy;
use crate::parser::{ParserOptions, SubtestMode};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Per-unit settings
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct UnitConfig {
    /// Minimum statement coverage for this unit, replacing the global value
    pub min_cover: f64,
}

impl UnitConfig {
    /// Create a config with a coverage override
    #[must_use]
    pub const fn with_min_cover(min_cover: f64) -> Self {
        Self { min_cover }
    }
}

/// Configuration for one pipeline run
///
/// Read-only for the duration of a run; one value can serve concurrent runs.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Strategy name, `gotest` or `gojson`
    pub parser: String,
    /// Host identifier stamped on every test suite
    pub hostname: String,
    /// Unit name when the transcript never names a package
    pub package_name: String,
    /// Parent test reporting
    pub subtest_mode: SubtestMode,
    /// Unit timestamp source
    #[serde(skip)]
    pub clock: Clock,
    /// Global minimum coverage; `<= 0` disables the gate
    pub required_coverage: f64,
    /// Per-unit overrides keyed by unit name
    #[serde(rename = "units")]
    pub unit_configs: BTreeMap<String, UnitConfig>,
    /// Properties set on every unit
    pub properties: BTreeMap<String, String>,
    /// Omit the `<?xml ...?>` declaration
    pub skip_xml_header: bool,
    /// Write raw parse events as JSON lines
    pub print_events: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            parser: "gotest".to_string(),
            hostname: String::new(),
            package_name: String::new(),
            subtest_mode: SubtestMode::Default,
            clock: Clock::default(),
            required_coverage: 0.0,
            unit_configs: BTreeMap::new(),
            properties: BTreeMap::new(),
            skip_xml_header: false,
            print_events: false,
        }
    }
}

impl Config {
    /// Create default configuration
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the parser strategy name
    #[must_use]
    pub fn with_parser(mut self, parser: impl Into<String>) -> Self {
        self.parser = parser.into();
        self
    }

    /// Set the host identifier
    #[must_use]
    pub fn with_hostname(mut self, hostname: impl Into<String>) -> Self {
        self.hostname = hostname.into();
        self
    }

    /// Set the fallback package name
    #[must_use]
    pub fn with_package_name(mut self, name: impl Into<String>) -> Self {
        self.package_name = name.into();
        self
    }

    /// Set the subtest mode
    #[must_use]
    pub const fn with_subtest_mode(mut self, mode: SubtestMode) -> Self {
        self.subtest_mode = mode;
        self
    }

    /// Set the timestamp source
    #[must_use]
    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    /// Set the global coverage threshold
    #[must_use]
    pub const fn with_required_coverage(mut self, percent: f64) -> Self {
        self.required_coverage = percent;
        self
    }

    /// Override the threshold for one unit
    #[must_use]
    pub fn with_unit_min_cover(mut self, unit: impl Into<String>, percent: f64) -> Self {
        self.unit_configs
            .insert(unit.into(), UnitConfig::with_min_cover(percent));
        self
    }

    /// Add a property applied to every unit
    #[must_use]
    pub fn with_property(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.properties.insert(name.into(), value.into());
        self
    }

    /// Suppress the XML declaration
    #[must_use]
    pub const fn with_skip_xml_header(mut self, skip: bool) -> Self {
        self.skip_xml_header = skip;
        self
    }

    /// Emit raw parse events
    #[must_use]
    pub const fn with_print_events(mut self, print: bool) -> Self {
        self.print_events = print;
        self
    }

    /// Coverage thresholds shared by the watch hook and the enforcer
    #[must_use]
    pub fn coverage_policy(&self) -> CoveragePolicy<'_> {
        CoveragePolicy::new(self.required_coverage, &self.unit_configs)
    }

    /// Parser options derived from this configuration, without a handler
    #[must_use]
    pub fn parser_options<'h>(&self) -> ParserOptions<'h> {
        ParserOptions::new()
            .with_package_name(self.package_name.as_str())
            .with_subtest_mode(self.subtest_mode)
            .with_clock(self.clock.clone())
    }
}
