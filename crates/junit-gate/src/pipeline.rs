//! Pipeline entry point
//!
//! Stages run strictly in order on one call stack:
//!
//! 1. resolve the parser strategy (before any input is read)
//! 2. parse, with the coverage watch installed when the gate is enabled
//! 3. write raw events, if requested
//! 4. apply configured properties to every unit
//! 5. enforce coverage thresholds
//! 6. write the JUnit document

use crate::config::Config;
use crate::coverage::{self, CoverageWatch};
use crate::event::Event;
use crate::junit::JunitDocument;
use crate::parser::{Parser, ParserKind};
use crate::report::Report;
use crate::result::{GateError, GateResult};
use std::io::{self, BufRead, Write};
use tracing::{debug, info};

/// Everything a successful run produced besides the written document
#[derive(Debug, Clone, Default)]
pub struct Outcome {
    /// Final report, after properties and coverage enforcement
    pub report: Report,
    /// Every event observed while parsing, in order
    pub events: Vec<Event>,
    /// Coverage warnings raised during parsing
    pub warnings: Vec<String>,
}

impl Outcome {
    /// Whether every unit passed, coverage gate included
    #[must_use]
    pub fn is_successful(&self) -> bool {
        self.report.is_successful()
    }
}

impl Config {
    /// Run the pipeline, writing raw events (if enabled) to stderr
    ///
    /// # Errors
    ///
    /// See [`Config::run_with_event_sink`].
    pub fn run<R: BufRead, W: Write>(&self, input: R, output: W) -> GateResult<Outcome> {
        self.run_with_event_sink(input, output, io::stderr().lock())
    }

    /// Run the pipeline, writing raw events (if enabled) to `event_sink`
    ///
    /// # Errors
    ///
    /// - [`GateError::UnsupportedStrategy`] for an unknown parser name; no
    ///   input is read.
    /// - [`GateError::Parse`] if the transcript cannot be read.
    /// - [`GateError::EventEmit`] if raw events were requested and could not
    ///   be written.
    /// - [`GateError::Render`] or [`GateError::Write`] if the document
    ///   cannot be produced.
    pub fn run_with_event_sink<R, W, E>(
        &self,
        input: R,
        output: W,
        event_sink: E,
    ) -> GateResult<Outcome>
    where
        R: BufRead,
        W: Write,
        E: Write,
    {
        let kind: ParserKind = self.parser.parse()?;
        let policy = self.coverage_policy();
        let mut watch = policy.is_enabled().then(|| CoverageWatch::new(policy));

        let (mut report, events) = {
            let mut options = self.parser_options();
            if let Some(watch) = watch.as_mut() {
                options = options.with_event_handler(move |event: &Event| watch.observe(event));
            }
            let mut parser = Parser::new(kind, options);
            let report = parser.parse(input)?;
            (report, parser.into_events())
        };
        let warnings = watch.map(CoverageWatch::into_warnings).unwrap_or_default();
        debug!(
            parser = %kind,
            units = report.units.len(),
            events = events.len(),
            "parsed transcript"
        );

        if self.print_events {
            emit_events(&events, event_sink).map_err(GateError::EventEmit)?;
        }

        report.apply_properties(&self.properties);
        let marked = coverage::enforce(&mut report, &policy);

        JunitDocument::from_report(&report, &self.hostname)
            .write_to(output, !self.skip_xml_header)?;
        info!(
            units = report.units.len(),
            tests = report.test_count(),
            low_coverage = marked,
            "wrote JUnit report"
        );

        Ok(Outcome {
            report,
            events,
            warnings,
        })
    }
}

/// One JSON object per line
fn emit_events<E: Write>(events: &[Event], mut sink: E) -> io::Result<()> {
    for event in events {
        serde_json::to_writer(&mut sink, event)?;
        sink.write_all(b"\n")?;
    }
    sink.flush()
}
