//! Assembles units from parse events
//!
//! Tests and output accumulate under an *active key* until a summary line
//! closes the unit. The text grammar always uses the empty key; the JSON
//! grammar uses the record's package so interleaved packages stay apart.

use super::SubtestMode;
use crate::clock::Clock;
use crate::event::{Event, EventKind};
use crate::report::{Report, Test, TestResult, Unit, UnitError};
use std::mem;

/// Cause tag for genuine run failures not explained by a failing test
pub const RUNTIME_CAUSE: &str = "runtime";

#[derive(Debug, Default)]
struct PendingUnit {
    key: String,
    tests: Vec<Test>,
    output: Vec<String>,
    coverage: Option<f64>,
    current: Option<usize>,
}

#[derive(Debug)]
struct BuildOutput {
    package: String,
    lines: Vec<String>,
}

#[derive(Debug)]
pub(crate) struct ReportBuilder {
    package_name: String,
    subtest_mode: SubtestMode,
    clock: Clock,
    active: String,
    pending: Vec<PendingUnit>,
    build_outputs: Vec<BuildOutput>,
    in_build_output: Option<usize>,
    units: Vec<Unit>,
    next_id: usize,
}

impl ReportBuilder {
    pub(crate) fn new(package_name: String, subtest_mode: SubtestMode, clock: Clock) -> Self {
        Self {
            package_name,
            subtest_mode,
            clock,
            active: String::new(),
            pending: Vec::new(),
            build_outputs: Vec::new(),
            in_build_output: None,
            units: Vec::new(),
            next_id: 0,
        }
    }

    /// Route subsequent events to the unit keyed by `key`
    pub(crate) fn set_active(&mut self, key: &str) {
        if self.active != key {
            self.active = key.to_string();
        }
    }

    pub(crate) fn process(&mut self, event: &Event) {
        if event.kind != EventKind::Output {
            self.in_build_output = None;
        }

        match event.kind {
            EventKind::RunTest => {
                let id = self.next_id();
                let pending = self.pending_mut();
                pending.tests.push(Test::new(id, event.name.as_str()));
                pending.current = Some(pending.tests.len() - 1);
            }
            EventKind::PauseTest => self.pending_mut().current = None,
            EventKind::ContTest => {
                let pending = self.pending_mut();
                pending.current = pending.tests.iter().rposition(|t| t.name == event.name);
            }
            EventKind::EndTest => self.end_test(event),
            EventKind::Status => self.pending_mut().current = None,
            EventKind::Coverage => self.pending_mut().coverage = Some(event.cov_pct),
            EventKind::BuildOutput => {
                self.build_outputs.push(BuildOutput {
                    package: event.name.clone(),
                    lines: Vec::new(),
                });
                self.in_build_output = Some(self.build_outputs.len() - 1);
            }
            EventKind::Summary => self.finish_unit(event),
            EventKind::Output => self.output(&event.data),
        }
    }

    /// Append a compiler output line for `package`, outside any active unit
    pub(crate) fn build_output(&mut self, package: &str, line: &str) {
        let index = match self.build_outputs.iter().position(|b| b.package == package) {
            Some(index) => index,
            None => {
                self.build_outputs.push(BuildOutput {
                    package: package.to_string(),
                    lines: Vec::new(),
                });
                self.build_outputs.len() - 1
            }
        };
        self.build_outputs[index].lines.push(line.to_string());
    }

    fn end_test(&mut self, event: &Event) {
        let id = self.next_id();
        let pending = self.pending_mut();
        let index = pending
            .tests
            .iter()
            .rposition(|t| t.name == event.name && t.result == TestResult::Unknown)
            .unwrap_or_else(|| {
                pending.tests.push(Test::new(id, event.name.as_str()));
                pending.tests.len() - 1
            });
        let test = &mut pending.tests[index];
        test.result = TestResult::from_keyword(&event.result);
        test.duration = event.duration;
        test.level = event.indent;
        pending.current = Some(index);
    }

    fn output(&mut self, line: &str) {
        if let Some(index) = self.in_build_output {
            self.build_outputs[index].lines.push(line.to_string());
            return;
        }
        let pending = self.pending_mut();
        match pending.current {
            Some(index) => pending.tests[index].output.push(line.to_string()),
            None => pending.output.push(line.to_string()),
        }
    }

    fn finish_unit(&mut self, summary: &Event) {
        let pending = self.take_pending();
        let mut unit = Unit::new(summary.name.as_str());
        unit.timestamp = Some(self.clock.now());
        unit.duration = summary.duration;
        unit.coverage = if summary.cov_pct > 0.0 {
            summary.cov_pct
        } else {
            pending.coverage.unwrap_or(summary.cov_pct)
        };
        unit.output = pending.output;
        unit.tests = pending.tests;
        self.subtest_mode.apply(&mut unit.tests);

        if let Some(cause) = failure_note(&summary.data) {
            let lines = self
                .take_build_output(&summary.name)
                .unwrap_or_else(|| unit.output.clone());
            unit.build_error = Some(UnitError {
                duration: summary.duration,
                ..UnitError::new(summary.name.as_str(), cause).with_output(lines)
            });
        } else if summary.result == "FAIL" && unit.failed_count() == 0 {
            unit.run_error = Some(UnitError {
                duration: summary.duration,
                ..UnitError::new(summary.name.as_str(), RUNTIME_CAUSE)
                    .with_output(unit.output.clone())
            });
        }

        tracing::debug!(
            unit = %unit.name,
            tests = unit.tests.len(),
            coverage = unit.coverage,
            "unit assembled"
        );
        self.units.push(unit);
    }

    pub(crate) fn build(mut self) -> Report {
        for pending in mem::take(&mut self.pending) {
            if pending.tests.is_empty() && pending.output.is_empty() {
                continue;
            }
            let name = if pending.key.is_empty() {
                self.package_name.clone()
            } else {
                pending.key.clone()
            };
            let mut unit = Unit::new(name);
            unit.timestamp = Some(self.clock.now());
            unit.coverage = pending.coverage.unwrap_or(0.0);
            unit.output = pending.output;
            unit.tests = pending.tests;
            self.subtest_mode.apply(&mut unit.tests);
            self.units.push(unit);
        }

        for build in mem::take(&mut self.build_outputs) {
            let mut unit = Unit::new(build.package.as_str());
            unit.timestamp = Some(self.clock.now());
            unit.build_error =
                Some(UnitError::new(build.package, "build failed").with_output(build.lines));
            self.units.push(unit);
        }

        Report::new(self.units)
    }

    fn next_id(&mut self) -> usize {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    fn pending_mut(&mut self) -> &mut PendingUnit {
        let index = match self.pending.iter().position(|p| p.key == self.active) {
            Some(index) => index,
            None => {
                self.pending.push(PendingUnit {
                    key: self.active.clone(),
                    ..PendingUnit::default()
                });
                self.pending.len() - 1
            }
        };
        &mut self.pending[index]
    }

    fn take_pending(&mut self) -> PendingUnit {
        match self.pending.iter().position(|p| p.key == self.active) {
            Some(index) => self.pending.remove(index),
            None => PendingUnit::default(),
        }
    }

    fn take_build_output(&mut self, package: &str) -> Option<Vec<String>> {
        let index = self.build_outputs.iter().position(|b| b.package == package)?;
        Some(self.build_outputs.remove(index).lines)
    }
}

/// `[build failed]` -> `build failed`, `[setup failed]` -> `setup failed`
fn failure_note(data: &str) -> Option<&str> {
    let note = data.strip_prefix('[')?.strip_suffix(']')?;
    note.ends_with(" failed").then_some(note)
}

impl SubtestMode {
    pub(crate) fn apply(self, tests: &mut Vec<Test>) {
        if self == Self::Default {
            return;
        }
        let parents: Vec<bool> = {
            let view: &[Test] = tests;
            view.iter().map(|t| has_subtests(view, &t.name)).collect()
        };
        match self {
            Self::Default => {}
            Self::IgnoreParentResults => {
                for (test, parent) in tests.iter_mut().zip(parents) {
                    if parent && test.result.is_failed() {
                        test.result = TestResult::Pass;
                    }
                }
            }
            Self::ExcludeParents => {
                let mut flags = parents.into_iter();
                tests.retain(|_| !flags.next().unwrap_or(false));
            }
        }
    }
}

fn has_subtests(tests: &[Test], name: &str) -> bool {
    let prefix = format!("{name}/");
    tests.iter().any(|t| t.name.starts_with(&prefix))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::parser::gotest::parse_line;

    fn build(lines: &[&str], mode: SubtestMode) -> Report {
        let mut builder = ReportBuilder::new("default/pkg".to_string(), mode, Clock::default());
        for line in lines {
            builder.process(&parse_line(line));
        }
        builder.build()
    }

    mod assembly_tests {
        use super::*;

        #[test]
        fn test_tests_and_output_attach_to_unit() {
            let report = build(
                &[
                    "=== RUN   TestA",
                    "--- PASS: TestA (0.00s)",
                    "=== RUN   TestB",
                    "    b_test.go:9: boom",
                    "--- FAIL: TestB (0.01s)",
                    "FAIL",
                    "FAIL\texample.com/pkg\t0.020s",
                ],
                SubtestMode::Default,
            );
            assert_eq!(report.units.len(), 1);
            let unit = &report.units[0];
            assert_eq!(unit.name, "example.com/pkg");
            assert_eq!(unit.tests.len(), 2);
            assert_eq!(unit.tests[1].result, TestResult::Fail);
            assert_eq!(unit.tests[1].output, vec!["    b_test.go:9: boom"]);
            assert!(unit.run_error.is_none());
            assert!(unit.timestamp.is_some());
        }

        #[test]
        fn test_units_preserve_order() {
            let report = build(
                &[
                    "ok  \tz/last\t0.001s",
                    "ok  \ta/first\t0.001s",
                    "?   \tm/middle\t[no test files]",
                ],
                SubtestMode::Default,
            );
            let names: Vec<_> = report.units.iter().map(|u| u.name.as_str()).collect();
            assert_eq!(names, vec!["z/last", "a/first", "m/middle"]);
        }

        #[test]
        fn test_coverage_falls_back_to_standalone_line() {
            let report = build(
                &[
                    "=== RUN   TestA",
                    "--- PASS: TestA (0.00s)",
                    "PASS",
                    "coverage: 41.5% of statements",
                    "ok  \texample.com/pkg\t0.002s",
                ],
                SubtestMode::Default,
            );
            assert_eq!(report.units[0].coverage, 41.5);
        }

        #[test]
        fn test_parallel_output_follows_name_lines() {
            let report = build(
                &[
                    "=== RUN   TestA",
                    "=== PAUSE TestA",
                    "=== RUN   TestB",
                    "=== PAUSE TestB",
                    "=== CONT  TestA",
                    "=== CONT  TestB",
                    "=== NAME  TestA",
                    "    a_test.go:5: oops from A",
                    "--- FAIL: TestA (0.01s)",
                    "=== NAME  TestB",
                    "    b_test.go:7: note from B",
                    "--- PASS: TestB (0.01s)",
                    "=== NAME",
                    "package teardown",
                    "FAIL",
                    "FAIL\texample.com/par\t0.030s",
                ],
                SubtestMode::Default,
            );
            let unit = &report.units[0];
            assert_eq!(unit.tests[0].output, vec!["    a_test.go:5: oops from A"]);
            assert_eq!(unit.tests[0].result, TestResult::Fail);
            assert_eq!(unit.tests[1].output, vec!["    b_test.go:7: note from B"]);
            assert_eq!(unit.output, vec!["package teardown"]);
        }

        #[test]
        fn test_unfinished_test_is_unknown() {
            let report = build(
                &["=== RUN   TestHang", "panic: test timed out"],
                SubtestMode::Default,
            );
            let unit = &report.units[0];
            assert_eq!(unit.name, "default/pkg");
            assert_eq!(unit.tests[0].result, TestResult::Unknown);
            assert_eq!(unit.tests[0].output, vec!["panic: test timed out"]);
        }
    }

    mod error_tests {
        use super::*;

        #[test]
        fn test_build_failure_collects_compiler_output() {
            let report = build(
                &[
                    "# example.com/broken",
                    "./main.go:3:2: undefined: foo",
                    "FAIL\texample.com/broken [build failed]",
                ],
                SubtestMode::Default,
            );
            let unit = &report.units[0];
            let error = unit.build_error.as_ref().unwrap();
            assert_eq!(error.name, "example.com/broken");
            assert_eq!(error.cause, "build failed");
            assert_eq!(error.output, vec!["./main.go:3:2: undefined: foo"]);
            assert!(unit.run_error.is_none());
        }

        #[test]
        fn test_failure_without_failing_test_is_run_error() {
            let report = build(
                &["panic: nil map", "FAIL\texample.com/crash\t0.004s"],
                SubtestMode::Default,
            );
            let error = report.units[0].run_error.as_ref().unwrap();
            assert_eq!(error.cause, RUNTIME_CAUSE);
            assert_eq!(error.output, vec!["panic: nil map"]);
        }

        #[test]
        fn test_orphan_build_output_becomes_unit() {
            let report = build(
                &["# example.com/vet", "vet: bad printf"],
                SubtestMode::Default,
            );
            assert_eq!(report.units.len(), 1);
            assert!(report.units[0].build_error.is_some());
        }
    }

    mod subtest_mode_tests {
        use super::*;

        const LINES: &[&str] = &[
            "=== RUN   TestParent",
            "=== RUN   TestParent/child",
            "--- FAIL: TestParent (0.00s)",
            "    --- FAIL: TestParent/child (0.00s)",
            "FAIL",
            "FAIL\texample.com/pkg\t0.001s",
        ];

        #[test]
        fn test_default_keeps_parent_failure() {
            let report = build(LINES, SubtestMode::Default);
            assert_eq!(report.units[0].tests[0].result, TestResult::Fail);
            assert_eq!(report.units[0].tests[1].level, 1);
        }

        #[test]
        fn test_ignore_parent_results() {
            let report = build(LINES, SubtestMode::IgnoreParentResults);
            let tests = &report.units[0].tests;
            assert_eq!(tests[0].result, TestResult::Pass);
            assert_eq!(tests[1].result, TestResult::Fail);
        }

        #[test]
        fn test_exclude_parents() {
            let report = build(LINES, SubtestMode::ExcludeParents);
            let tests = &report.units[0].tests;
            assert_eq!(tests.len(), 1);
            assert_eq!(tests[0].name, "TestParent/child");
        }
    }

    #[test]
    fn test_failure_note() {
        assert_eq!(failure_note("[build failed]"), Some("build failed"));
        assert_eq!(failure_note("[setup failed]"), Some("setup failed"));
        assert_eq!(failure_note("[no test files]"), None);
        assert_eq!(failure_note(""), None);
    }
}
