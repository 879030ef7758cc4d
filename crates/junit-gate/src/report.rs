//! Report model
//!
//! A [`Report`] is an ordered list of [`Unit`]s, one per tested package, in
//! the order the transcript produced them. Later pipeline stages mutate units
//! in place but never reorder, merge or drop them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Duration;

/// Outcome of a single test
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TestResult {
    /// Test passed
    Pass,
    /// Test failed
    Fail,
    /// Test was skipped
    Skip,
    /// Test started but no result line was seen
    #[default]
    Unknown,
}

impl TestResult {
    /// Check if result is failing
    #[must_use]
    pub const fn is_failed(self) -> bool {
        matches!(self, Self::Fail)
    }

    /// Map the keyword used in `--- PASS:` style lines
    #[must_use]
    pub fn from_keyword(keyword: &str) -> Self {
        match keyword {
            "PASS" | "ok" => Self::Pass,
            "FAIL" => Self::Fail,
            "SKIP" => Self::Skip,
            _ => Self::Unknown,
        }
    }
}

/// Individual test within a unit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Test {
    /// Sequential id, unique within a report
    pub id: usize,
    /// Full test name, subtests use `Parent/child`
    pub name: String,
    /// Reported duration
    pub duration: Duration,
    /// Result
    pub result: TestResult,
    /// Subtest nesting level, 0 for top-level tests
    pub level: usize,
    /// Output lines attributed to this test
    pub output: Vec<String>,
}

impl Test {
    /// Create a test with no result yet
    #[must_use]
    pub fn new(id: usize, name: impl Into<String>) -> Self {
        let name = name.into();
        let level = name.matches('/').count();
        Self {
            id,
            name,
            duration: Duration::ZERO,
            result: TestResult::Unknown,
            level,
            output: Vec::new(),
        }
    }

    /// Set the result
    #[must_use]
    pub fn with_result(mut self, result: TestResult) -> Self {
        self.result = result;
        self
    }
}

/// Build or run failure attached to a unit
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct UnitError {
    /// Short identifying name
    pub name: String,
    /// Cause tag, rendered as the JUnit `type` attribute
    pub cause: String,
    /// Time spent before the failure, if known
    pub duration: Duration,
    /// Human-readable output lines
    pub output: Vec<String>,
}

impl UnitError {
    /// Create an error with a name and cause
    #[must_use]
    pub fn new(name: impl Into<String>, cause: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            cause: cause.into(),
            duration: Duration::ZERO,
            output: Vec::new(),
        }
    }

    /// Set the output lines
    #[must_use]
    pub fn with_output(mut self, output: Vec<String>) -> Self {
        self.output = output;
        self
    }
}

/// Key/value metadata on a unit
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Property {
    /// Key
    pub name: String,
    /// Value
    pub value: String,
}

/// One tested package
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Unit {
    /// Package name
    pub name: String,
    /// When the unit was assembled
    pub timestamp: Option<DateTime<Utc>>,
    /// Package run time from the summary line
    pub duration: Duration,
    /// Statement coverage percentage; 0 when not instrumented
    pub coverage: f64,
    /// Output not attributed to any test
    pub output: Vec<String>,
    /// Tests in the order they started
    pub tests: Vec<Test>,
    /// Metadata, keys unique
    pub properties: Vec<Property>,
    /// Compilation failure, if any
    pub build_error: Option<UnitError>,
    /// Execution failure, if any
    pub run_error: Option<UnitError>,
}

impl Unit {
    /// Create an empty unit
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Set coverage
    #[must_use]
    pub const fn with_coverage(mut self, coverage: f64) -> Self {
        self.coverage = coverage;
        self
    }

    /// Set a build error
    #[must_use]
    pub fn with_build_error(mut self, error: UnitError) -> Self {
        self.build_error = Some(error);
        self
    }

    /// Set a run error
    #[must_use]
    pub fn with_run_error(mut self, error: UnitError) -> Self {
        self.run_error = Some(error);
        self
    }

    /// Add a test
    #[must_use]
    pub fn with_test(mut self, test: Test) -> Self {
        self.tests.push(test);
        self
    }

    /// Set a property; an existing key is overwritten in place
    pub fn set_property(&mut self, name: &str, value: &str) {
        if let Some(existing) = self.properties.iter_mut().find(|p| p.name == name) {
            existing.value = value.to_string();
        } else {
            self.properties.push(Property {
                name: name.to_string(),
                value: value.to_string(),
            });
        }
    }

    /// Look up a property value
    #[must_use]
    pub fn property(&self, name: &str) -> Option<&str> {
        self.properties
            .iter()
            .find(|p| p.name == name)
            .map(|p| p.value.as_str())
    }

    /// Whether a build or run error is recorded
    #[must_use]
    pub const fn has_error(&self) -> bool {
        self.build_error.is_some() || self.run_error.is_some()
    }

    /// Number of failed tests
    #[must_use]
    pub fn failed_count(&self) -> usize {
        self.tests.iter().filter(|t| t.result.is_failed()).count()
    }

    /// Whether the unit passed: no errors and no failed tests
    #[must_use]
    pub fn is_successful(&self) -> bool {
        !self.has_error() && self.failed_count() == 0
    }
}

/// Assembled report
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Report {
    /// Units in parse order
    pub units: Vec<Unit>,
}

impl Report {
    /// Create a report from units
    #[must_use]
    pub fn new(units: Vec<Unit>) -> Self {
        Self { units }
    }

    /// Set every property on every unit
    pub fn apply_properties(&mut self, properties: &BTreeMap<String, String>) {
        for unit in &mut self.units {
            for (name, value) in properties {
                unit.set_property(name, value);
            }
        }
    }

    /// Find a unit by name
    #[must_use]
    pub fn unit(&self, name: &str) -> Option<&Unit> {
        self.units.iter().find(|u| u.name == name)
    }

    /// Total number of tests across units
    #[must_use]
    pub fn test_count(&self) -> usize {
        self.units.iter().map(|u| u.tests.len()).sum()
    }

    /// Whether every unit passed
    #[must_use]
    pub fn is_successful(&self) -> bool {
        self.units.iter().all(Unit::is_successful)
    }
}
