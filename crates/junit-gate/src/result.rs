//! Result and error types for junit-gate.

use thiserror::Error;

/// Result type for pipeline operations
pub type GateResult<T> = Result<T, GateError>;

/// Errors that abort a pipeline run
///
/// A coverage shortfall is not one of these: it is recorded on the unit as a
/// run error and surfaces in the document like any other failure.
#[derive(Debug, Error)]
pub enum GateError {
    /// The configured parser name is not a known strategy
    #[error("unsupported parser strategy: {name}")]
    UnsupportedStrategy {
        /// The name that was requested
        name: String,
    },

    /// The transcript could not be parsed
    #[error("error parsing input: {0}")]
    Parse(#[from] ParseError),

    /// Raw events were requested but could not be serialized or written
    #[error("failed to emit parse events: {0}")]
    EventEmit(#[source] std::io::Error),

    /// The JUnit serializer rejected the document
    #[error("failed to render JUnit document: {message}")]
    Render {
        /// Serializer message
        message: String,
    },

    /// The output sink failed
    #[error("failed to write JUnit document: {0}")]
    Write(#[source] std::io::Error),
}

impl GateError {
    /// Create an unsupported strategy error
    #[must_use]
    pub fn unsupported_strategy(name: impl Into<String>) -> Self {
        Self::UnsupportedStrategy { name: name.into() }
    }

    /// Create a render error
    #[must_use]
    pub fn render(message: impl Into<String>) -> Self {
        Self::Render {
            message: message.into(),
        }
    }
}

/// Errors produced while reading a transcript
#[derive(Debug, Error)]
pub enum ParseError {
    /// Reading the input stream failed (includes invalid UTF-8)
    #[error("read failed: {0}")]
    Io(#[from] std::io::Error),

    /// A `go test -json` record could not be decoded
    #[error("malformed JSON record on line {line}: {source}")]
    Json {
        /// 1-based input line number
        line: usize,
        /// Decoder error
        #[source]
        source: serde_json::Error,
    },
}
