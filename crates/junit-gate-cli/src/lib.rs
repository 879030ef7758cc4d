//! junit-gate CLI library
//!
//! Flag parsing, config file loading and logging setup around the
//! [`junit_gate`] pipeline.

#![warn(missing_docs)]

mod commands;
mod config;
mod error;
pub mod logging;
pub mod runner;

pub use commands::{Cli, LogFormat, SubtestModeArg};
pub use config::{
    build_config, load_config_file, parse_property, parse_timestamp, parse_unit_cover, Verbosity,
};
pub use error::{CliError, CliResult};
