//! JUnit XML document emitter
//!
//! One `<testsuite>` per unit, in report order. Build and run errors become
//! extra `<testcase>` entries with an `<error>` child whose `type` is the
//! error's cause tag, so a coverage failure shows up as
//! `type="lowCoverage"`.

use crate::report::{Report, Test, TestResult, Unit, UnitError};
use crate::result::{GateError, GateResult};
use quick_junit::{NonSuccessKind, Property, TestCase, TestCaseStatus, TestSuite};
use std::fmt;
use std::io::Write;

/// Standard XML declaration, written unless suppressed
pub const XML_HEADER: &str = "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n";

/// Name attribute of the root `<testsuites>` element
pub const REPORT_NAME: &str = "go-test";

/// Property carrying a unit's statement coverage
pub const COVERAGE_PROPERTY: &str = "coverage.statements.pct";

const FAILURE_MESSAGE: &str = "Failed";
const UNKNOWN_MESSAGE: &str = "No test result found";
const BUILD_ERROR_MESSAGE: &str = "Build error";
const RUN_ERROR_MESSAGE: &str = "Runtime error";

/// A report converted to the JUnit vocabulary
pub struct JunitDocument {
    inner: quick_junit::Report,
}

impl JunitDocument {
    /// Convert `report`, stamping every suite with `hostname`
    #[must_use]
    pub fn from_report(report: &Report, hostname: &str) -> Self {
        let mut inner = quick_junit::Report::new(REPORT_NAME);
        inner.add_test_suites(report.units.iter().map(|unit| suite(unit, hostname)));
        Self { inner }
    }

    /// Number of `<testsuite>` elements
    #[must_use]
    pub fn suite_count(&self) -> usize {
        self.inner.test_suites.len()
    }

    /// Render the document body without the XML declaration
    ///
    /// # Errors
    ///
    /// Returns [`GateError::Render`] if serialization fails.
    pub fn render(&self) -> GateResult<String> {
        let xml = self
            .inner
            .to_string()
            .map_err(|e| GateError::render(e.to_string()))?;
        Ok(strip_declaration(&xml).to_string())
    }

    /// Write the document, preceded by [`XML_HEADER`] when `header` is set
    ///
    /// # Errors
    ///
    /// Returns [`GateError::Render`] if serialization fails, or
    /// [`GateError::Write`] if the sink rejects the bytes.
    pub fn write_to<W: Write>(&self, mut writer: W, header: bool) -> GateResult<()> {
        let body = self.render()?;
        if header {
            writer
                .write_all(XML_HEADER.as_bytes())
                .map_err(GateError::Write)?;
        }
        writer.write_all(body.as_bytes()).map_err(GateError::Write)?;
        writer.flush().map_err(GateError::Write)
    }
}

impl fmt::Debug for JunitDocument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JunitDocument")
            .field("suites", &self.suite_count())
            .finish()
    }
}

fn strip_declaration(xml: &str) -> &str {
    if xml.starts_with("<?xml") {
        xml.split_once("?>")
            .map_or(xml, |(_, body)| body.trim_start())
    } else {
        xml
    }
}

fn suite(unit: &Unit, hostname: &str) -> TestSuite {
    let mut suite = TestSuite::new(unit.name.as_str());
    if let Some(timestamp) = unit.timestamp {
        suite.set_timestamp(timestamp);
    }
    suite.set_time(unit.duration);
    if !hostname.is_empty() {
        suite.extra.insert("hostname".into(), hostname.into());
    }

    for property in &unit.properties {
        suite.add_property(Property::new(property.name.as_str(), property.value.as_str()));
    }
    if unit.coverage > 0.0 {
        suite.add_property(Property::new(
            COVERAGE_PROPERTY,
            format!("{:.2}", unit.coverage),
        ));
    }
    if !unit.output.is_empty() {
        suite.set_system_out(unit.output.join("\n"));
    }

    suite.add_test_cases(unit.tests.iter().map(|test| test_case(&unit.name, test)));
    if let Some(error) = &unit.build_error {
        suite.add_test_case(error_case(&unit.name, error, BUILD_ERROR_MESSAGE));
    }
    if let Some(error) = &unit.run_error {
        suite.add_test_case(error_case(&unit.name, error, RUN_ERROR_MESSAGE));
    }
    suite
}

fn test_case(classname: &str, test: &Test) -> TestCase {
    let output = test.output.join("\n");
    let status = match test.result {
        TestResult::Pass => TestCaseStatus::success(),
        TestResult::Skip => {
            let mut status = TestCaseStatus::skipped();
            if !output.is_empty() {
                status.set_message(output.as_str());
            }
            status
        }
        TestResult::Fail => non_success(NonSuccessKind::Failure, FAILURE_MESSAGE, &output),
        TestResult::Unknown => non_success(NonSuccessKind::Error, UNKNOWN_MESSAGE, &output),
    };

    let mut case = TestCase::new(test.name.as_str(), status);
    case.set_classname(classname);
    case.set_time(test.duration);
    case
}

fn error_case(classname: &str, error: &UnitError, message: &str) -> TestCase {
    let mut status = non_success(NonSuccessKind::Error, message, &error.output.join("\n"));
    status.set_type(error.cause.as_str());

    let mut case = TestCase::new(error.name.as_str(), status);
    case.set_classname(classname);
    case.set_time(error.duration);
    case
}

fn non_success(kind: NonSuccessKind, message: &str, output: &str) -> TestCaseStatus {
    let mut status = TestCaseStatus::non_success(kind);
    status.set_message(message);
    if !output.is_empty() {
        status.set_description(output);
    }
    status
}
