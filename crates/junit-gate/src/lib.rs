//! junit-gate: JUnit XML reports with a coverage gate for `go test` output
//!
//! Reads a `go test` transcript (plain `-v` text or the `-json` stream),
//! assembles a [`Report`] of tested packages, stamps configured properties on
//! every package, fails packages whose statement coverage is below their
//! threshold, and writes a JUnit XML document.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────┐    ┌──────────────┐    ┌────────────┐    ┌──────────┐    ┌─────────┐
//! │ Selector │───►│ Parser       │───►│ Properties │───►│ Coverage │───►│ JUnit   │
//! │ (config) │    │ + watch hook │    │            │    │ enforcer │    │ emitter │
//! └──────────┘    └──────────────┘    └────────────┘    └──────────┘    └─────────┘
//! ```
//!
//! # Example
//!
//! ```
//! use junit_gate::{Config, LOW_COVERAGE_CAUSE};
//! use std::io::Cursor;
//!
//! let transcript = "ok  \texample.com/pkg\t0.010s\tcoverage: 75.0% of statements\n";
//! let config = Config::new().with_required_coverage(80.0).with_skip_xml_header(true);
//!
//! let mut xml = Vec::new();
//! let outcome = config
//!     .run_with_event_sink(Cursor::new(transcript), &mut xml, std::io::sink())
//!     .unwrap();
//!
//! let unit = outcome.report.unit("example.com/pkg").unwrap();
//! assert_eq!(unit.run_error.as_ref().unwrap().cause, LOW_COVERAGE_CAUSE);
//! assert!(String::from_utf8(xml).unwrap().contains("lowCoverage"));
//! ```

#![warn(missing_docs)]

mod clock;
mod config;
mod coverage;
mod event;
mod junit;
mod pipeline;
mod report;
mod result;

/// Transcript parsing strategies
pub mod parser;

pub use clock::Clock;
pub use config::{Config, UnitConfig};
pub use coverage::{
    enforce, CoveragePolicy, CoverageWatch, LOW_COVERAGE_CAUSE, LOW_COVERAGE_ERROR,
};
pub use event::{Event, EventKind};
pub use junit::{JunitDocument, COVERAGE_PROPERTY, REPORT_NAME, XML_HEADER};
pub use parser::{Parser, ParserKind, ParserOptions, SubtestMode, RUNTIME_CAUSE};
pub use pipeline::Outcome;
pub use report::{Property, Report, Test, TestResult, Unit, UnitError};
pub use result::{GateError, GateResult, ParseError};
