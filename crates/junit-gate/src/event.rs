//! Parse events
//!
//! Events are what the transcript grammar produces, one per recognized line.
//! They feed the report builder, any installed handler, and optionally the
//! raw-event diagnostics stream. They are never stored in the report.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Kind of a parse event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    /// `=== RUN`
    RunTest,
    /// `=== PAUSE`
    PauseTest,
    /// `=== CONT`
    ContTest,
    /// `--- PASS|FAIL|SKIP:`
    EndTest,
    /// bare `PASS` / `FAIL`
    Status,
    /// `ok`, `FAIL` or `?` package summary
    Summary,
    /// standalone `coverage:` line
    Coverage,
    /// `# package` header preceding compiler output
    BuildOutput,
    /// anything else
    Output,
}

/// A single parse event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    /// Event kind
    #[serde(rename = "type")]
    pub kind: EventKind,
    /// Test or package name
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub name: String,
    /// Result keyword as written (`PASS`, `ok`, `FAIL`, `?`)
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub result: String,
    /// Reported duration
    #[serde(default)]
    pub duration: Duration,
    /// Free text: output line or bracketed summary note
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub data: String,
    /// Subtest indentation level of `--- ` lines
    #[serde(default)]
    pub indent: usize,
    /// Statement coverage percentage
    #[serde(default)]
    pub cov_pct: f64,
    /// Packages the coverage figure was measured over
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub cov_packages: Vec<String>,
}

impl Event {
    /// Create an event of the given kind with all other fields empty
    #[must_use]
    pub fn new(kind: EventKind) -> Self {
        Self {
            kind,
            name: String::new(),
            result: String::new(),
            duration: Duration::ZERO,
            data: String::new(),
            indent: 0,
            cov_pct: 0.0,
            cov_packages: Vec::new(),
        }
    }

    /// Plain output line
    #[must_use]
    pub fn output(data: impl Into<String>) -> Self {
        Self {
            data: data.into(),
            ..Self::new(EventKind::Output)
        }
    }

    /// Package summary with a coverage figure
    #[must_use]
    pub fn summary(name: impl Into<String>, result: impl Into<String>, cov_pct: f64) -> Self {
        Self {
            name: name.into(),
            result: result.into(),
            cov_pct,
            ..Self::new(EventKind::Summary)
        }
    }

    /// Set the name
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Whether this is a package summary
    #[must_use]
    pub fn is_summary(&self) -> bool {
        self.kind == EventKind::Summary
    }
}
