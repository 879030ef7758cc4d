//! Error types for the CLI

use std::path::PathBuf;
use thiserror::Error;

/// Result type for CLI operations
pub type CliResult<T> = Result<T, CliError>;

/// Errors that can occur in the CLI
#[derive(Debug, Error)]
pub enum CliError {
    /// Configuration error
    #[error("Configuration error: {message}")]
    Config {
        /// Error message
        message: String,
    },

    /// Config file is not valid YAML for [`junit_gate::Config`]
    #[error("Invalid config file {}: {source}", path.display())]
    Yaml {
        /// File that failed to load
        path: PathBuf,
        /// Decoder error
        #[source]
        source: serde_yaml_ng::Error,
    },

    /// A named file could not be opened, created or written
    #[error("Cannot open {}: {source}", path.display())]
    Open {
        /// File that failed to open
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// Pipeline error
    #[error(transparent)]
    Gate(#[from] junit_gate::GateError),
}

impl CliError {
    /// Create a configuration error
    #[must_use]
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create an open error for `path`
    #[must_use]
    pub fn open(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Open {
            path: path.into(),
            source,
        }
    }
}
