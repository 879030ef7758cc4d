//! Stream acquisition and pipeline invocation

use crate::commands::Cli;
use crate::config::build_config;
use crate::error::{CliError, CliResult};
use junit_gate::{Outcome, ParserKind};
use std::fs::{self, File};
use std::io::{self, BufRead, BufReader};
use tracing::debug;

/// Run the pipeline for `cli`
///
/// The parser name is resolved before any file is opened. With `--out`,
/// the document is rendered in memory and the file is only replaced after
/// the whole pipeline succeeded, so a failed run never truncates an
/// existing report.
pub fn run(cli: &Cli) -> CliResult<Outcome> {
    let config = build_config(cli)?;
    config.parser.parse::<ParserKind>()?;

    let input: Box<dyn BufRead> = match &cli.input {
        Some(path) => Box::new(BufReader::new(
            File::open(path).map_err(|e| CliError::open(path, e))?,
        )),
        None => Box::new(io::stdin().lock()),
    };

    debug!(parser = %config.parser, gate = config.required_coverage, "starting run");
    match &cli.output {
        Some(path) => {
            let mut document = Vec::new();
            let outcome = config.run(input, &mut document)?;
            fs::write(path, &document).map_err(|e| CliError::open(path, e))?;
            Ok(outcome)
        }
        None => Ok(config.run(input, io::stdout().lock())?),
    }
}

/// Whether the process should exit successfully
#[must_use]
pub fn exit_success(cli: &Cli, outcome: &Outcome) -> bool {
    !cli.set_exit_code || outcome.is_successful()
}
