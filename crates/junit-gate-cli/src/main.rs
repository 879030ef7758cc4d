//! junit-gate: JUnit XML from go test output, with a coverage gate
//!
//! ## Usage
//!
//! ```bash
//! go test -v -cover ./... 2>&1 | junit-gate > report.xml
//! go test -json -cover ./... | junit-gate --parser gojson --min-coverage 80 --set-exit-code
//! junit-gate --config junit-gate.yaml --in test.log --out report.xml
//! ```

use clap::Parser;
use junit_gate_cli::{logging, runner, Cli};
use std::process::ExitCode;

fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Err(e) = logging::init(cli.verbosity(), cli.log_format) {
        eprintln!("Error: {e}");
        return ExitCode::FAILURE;
    }

    match runner::run(&cli) {
        Ok(outcome) if runner::exit_success(&cli, &outcome) => ExitCode::SUCCESS,
        Ok(_) => ExitCode::from(1),
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}
