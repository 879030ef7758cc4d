//! Smoke tests for the junit-gate binary

#![allow(deprecated)] // Allow deprecated Command::cargo_bin until assert_cmd is updated
#![allow(clippy::expect_used, clippy::unwrap_used)]

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

const TRANSCRIPT: &str = "\
=== RUN   TestX
--- PASS: TestX (0.01s)
PASS
ok  \tpkgX\t0.020s\tcoverage: 75.0% of statements
";

/// Get a command for the junit-gate binary with a predictable environment
fn junit_gate() -> Command {
    let mut cmd = Command::cargo_bin("junit-gate").expect("junit-gate binary should exist");
    cmd.env_remove("RUST_LOG").env_remove("HOSTNAME");
    cmd
}

// ============================================================================
// Basic CLI Tests
// ============================================================================

#[test]
fn test_version_flag() {
    junit_gate()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("0.4.0"));
}

#[test]
fn test_help_flag() {
    junit_gate()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("--min-coverage"))
        .stdout(predicate::str::contains("--parser"));
}

// ============================================================================
// Pipeline Tests
// ============================================================================

#[test]
fn test_stdin_to_stdout() {
    junit_gate()
        .write_stdin(TRANSCRIPT)
        .assert()
        .success()
        .stdout(predicate::str::starts_with("<?xml"))
        .stdout(predicate::str::contains("name=\"pkgX\""));
}

#[test]
fn test_no_xml_header() {
    junit_gate()
        .arg("--no-xml-header")
        .write_stdin(TRANSCRIPT)
        .assert()
        .success()
        .stdout(predicate::str::starts_with("<testsuites"));
}

#[test]
fn test_low_coverage_warns_and_reports() {
    junit_gate()
        .args(["--min-coverage", "80"])
        .write_stdin(TRANSCRIPT)
        .assert()
        .success()
        .stdout(predicate::str::contains("lowCoverage"))
        .stderr(predicate::str::contains(
            "COVERAGE FAIL: pkgX is too low 75.0 < 80.0",
        ));
}

#[test]
fn test_set_exit_code_on_low_coverage() {
    junit_gate()
        .args(["--min-coverage", "80", "--set-exit-code"])
        .write_stdin(TRANSCRIPT)
        .assert()
        .code(1);
}

#[test]
fn test_override_passes_gate() {
    junit_gate()
        .args(["--min-coverage", "80", "--min-cover", "pkgX=70", "--set-exit-code"])
        .write_stdin(TRANSCRIPT)
        .assert()
        .success()
        .stdout(predicate::str::contains("lowCoverage").not());
}

#[test]
fn test_properties_and_hostname() {
    junit_gate()
        .args(["--prop", "ci=true", "--hostname", "runner-7"])
        .write_stdin(TRANSCRIPT)
        .assert()
        .success()
        .stdout(predicate::str::contains("name=\"ci\" value=\"true\""))
        .stdout(predicate::str::contains("hostname=\"runner-7\""));
}

#[test]
fn test_print_events_to_stderr() {
    junit_gate()
        .arg("--print-events")
        .write_stdin(TRANSCRIPT)
        .assert()
        .success()
        .stderr(predicate::str::contains("\"type\":\"summary\""));
}

// ============================================================================
// Error Tests
// ============================================================================

#[test]
fn test_unknown_parser() {
    junit_gate()
        .args(["--parser", "tap"])
        .write_stdin(TRANSCRIPT)
        .assert()
        .failure()
        .stderr(predicate::str::contains("unsupported parser strategy: tap"));
}

#[test]
fn test_unknown_parser_leaves_out_file_alone() {
    let dir = TempDir::new().unwrap();
    let out = dir.path().join("report.xml");
    fs::write(&out, "previous").unwrap();

    junit_gate()
        .args(["--parser", "tap", "--out"])
        .arg(&out)
        .write_stdin(TRANSCRIPT)
        .assert()
        .failure();
    assert_eq!(fs::read_to_string(&out).unwrap(), "previous");
}

#[test]
fn test_malformed_json_input() {
    junit_gate()
        .args(["--parser", "gojson"])
        .write_stdin("{\"Action\": broken\n")
        .assert()
        .failure()
        .stderr(predicate::str::contains("line 1"));
}

#[test]
fn test_malformed_input_leaves_out_file_alone() {
    let dir = TempDir::new().unwrap();
    let out = dir.path().join("report.xml");
    fs::write(&out, "previous").unwrap();

    junit_gate()
        .args(["--parser", "gojson", "--out"])
        .arg(&out)
        .write_stdin("{\"Action\": broken\n")
        .assert()
        .failure();
    assert_eq!(fs::read_to_string(&out).unwrap(), "previous");
}

#[test]
fn test_missing_input_file() {
    junit_gate()
        .args(["--in", "/nonexistent/go-test.log"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("/nonexistent/go-test.log"));
}

#[test]
fn test_bad_property_flag() {
    junit_gate().args(["--prop", "novalue"]).assert().failure();
}

// ============================================================================
// File and Config Tests
// ============================================================================

#[test]
fn test_in_and_out_files() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("go-test.log");
    let output = dir.path().join("report.xml");
    fs::write(&input, TRANSCRIPT).unwrap();

    junit_gate()
        .arg("--in")
        .arg(&input)
        .arg("--out")
        .arg(&output)
        .assert()
        .success()
        .stdout(predicate::str::is_empty());

    let xml = fs::read_to_string(&output).unwrap();
    assert!(xml.starts_with("<?xml"));
    assert!(xml.contains("name=\"TestX\""));
}

#[test]
fn test_config_file() {
    let dir = TempDir::new().unwrap();
    let config = dir.path().join("junit-gate.yaml");
    fs::write(
        &config,
        "required_coverage: 90.0\nskip_xml_header: true\nproperties:\n  team: core\n",
    )
    .unwrap();

    junit_gate()
        .arg("--config")
        .arg(&config)
        .arg("--set-exit-code")
        .write_stdin(TRANSCRIPT)
        .assert()
        .code(1)
        .stdout(predicate::str::starts_with("<testsuites"))
        .stdout(predicate::str::contains("name=\"team\" value=\"core\""));
}
