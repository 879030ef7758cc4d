//! Parsing strategies
//!
//! Two strategies turn a `go test` transcript into a [`Report`]:
//!
//! ```text
//! gotest: line ──────────────────────┐
//!                                    ├──► line grammar ──► Event ──► ReportBuilder ──► Report
//! gojson: record ──► Output lines ───┘                      │
//!         build-output record ──► compiler output (keyed by ImportPath)
//!                                                           └──► event handler (optional)
//! ```
//!
//! Both accept the same [`ParserOptions`], so callers never branch on which
//! strategy was selected. The set of strategies is closed: an unknown name is
//! a configuration error raised by [`ParserKind::from_str`].

mod builder;
mod gojson;
pub mod gotest;

pub use builder::RUNTIME_CAUSE;

use crate::clock::Clock;
use crate::event::{Event, EventKind};
use crate::report::Report;
use crate::result::{GateError, ParseError};
use builder::ReportBuilder;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::io::BufRead;
use std::str::FromStr;

/// Callback invoked once per event, synchronously, in stream order
pub type EventHandler<'h> = Box<dyn FnMut(&Event) + 'h>;

/// Built-in parsing strategies
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParserKind {
    /// `go test -v` text output
    GoTest,
    /// `go test -json` event stream
    GoJson,
}

impl ParserKind {
    /// Name used in configuration
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::GoTest => "gotest",
            Self::GoJson => "gojson",
        }
    }
}

impl FromStr for ParserKind {
    type Err = GateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "gotest" => Ok(Self::GoTest),
            "gojson" => Ok(Self::GoJson),
            other => Err(GateError::unsupported_strategy(other)),
        }
    }
}

impl fmt::Display for ParserKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// How parent tests of subtests are reported
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SubtestMode {
    /// Report parents as the transcript does
    #[default]
    Default,
    /// Report failing parents as passed; their subtests carry the failure
    IgnoreParentResults,
    /// Drop parents from the report
    ExcludeParents,
}

/// Options shared by both strategies
pub struct ParserOptions<'h> {
    /// Unit name used when the transcript never names a package
    pub package_name: String,
    /// Parent test reporting
    pub subtest_mode: SubtestMode,
    /// Timestamp source for units
    pub clock: Clock,
    handler: Option<EventHandler<'h>>,
}

impl Default for ParserOptions<'_> {
    fn default() -> Self {
        Self {
            package_name: String::new(),
            subtest_mode: SubtestMode::Default,
            clock: Clock::default(),
            handler: None,
        }
    }
}

impl<'h> ParserOptions<'h> {
    /// Create default options
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the fallback package name
    #[must_use]
    pub fn with_package_name(mut self, name: impl Into<String>) -> Self {
        self.package_name = name.into();
        self
    }

    /// Set the subtest mode
    #[must_use]
    pub fn with_subtest_mode(mut self, mode: SubtestMode) -> Self {
        self.subtest_mode = mode;
        self
    }

    /// Set the clock
    #[must_use]
    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    /// Install a handler called for every event as it is produced
    #[must_use]
    pub fn with_event_handler(mut self, handler: impl FnMut(&Event) + 'h) -> Self {
        self.handler = Some(Box::new(handler));
        self
    }
}

impl fmt::Debug for ParserOptions<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ParserOptions")
            .field("package_name", &self.package_name)
            .field("subtest_mode", &self.subtest_mode)
            .field("clock", &self.clock)
            .field("handler", &self.handler.is_some())
            .finish()
    }
}

/// A configured parsing strategy
pub struct Parser<'h> {
    kind: ParserKind,
    options: ParserOptions<'h>,
    events: Vec<Event>,
}

impl<'h> Parser<'h> {
    /// Create a parser for `kind`
    #[must_use]
    pub fn new(kind: ParserKind, options: ParserOptions<'h>) -> Self {
        Self {
            kind,
            options,
            events: Vec::new(),
        }
    }

    /// Read `input` to the end and assemble the report
    ///
    /// # Errors
    ///
    /// Returns [`ParseError`] on read failures, invalid UTF-8, or a malformed
    /// JSON record. No partial report is returned.
    pub fn parse<R: BufRead>(&mut self, input: R) -> Result<Report, ParseError> {
        self.events.clear();
        let mut builder = ReportBuilder::new(
            self.options.package_name.clone(),
            self.options.subtest_mode,
            self.options.clock.clone(),
        );

        for (index, line) in input.lines().enumerate() {
            let line = line?;
            match self.kind {
                ParserKind::GoTest => self.observe(&mut builder, gotest::parse_line(&line)),
                ParserKind::GoJson => match gojson::decode(&line, index + 1)? {
                    Some(record) if record.is_output() => {
                        builder.set_active(&record.package);
                        for text in record.output_lines() {
                            self.observe(&mut builder, gotest::parse_line(text));
                        }
                    }
                    Some(record) if record.is_build_output() => {
                        let package = record.build_package();
                        for text in record.output_lines() {
                            let event = gotest::parse_line(text);
                            if event.kind != EventKind::BuildOutput {
                                builder.build_output(package, text);
                            }
                            self.record(event);
                        }
                    }
                    Some(_) => {}
                    None => {
                        builder.set_active("");
                        self.observe(&mut builder, gotest::parse_line(&line));
                    }
                },
            }
        }

        Ok(builder.build())
    }

    fn observe(&mut self, builder: &mut ReportBuilder, event: Event) {
        builder.process(&event);
        self.record(event);
    }

    fn record(&mut self, event: Event) {
        if let Some(handler) = self.options.handler.as_mut() {
            handler(&event);
        }
        self.events.push(event);
    }

    /// Events observed by the last [`Parser::parse`] call, in order
    #[must_use]
    pub fn events(&self) -> &[Event] {
        &self.events
    }

    /// Consume the parser, keeping its events
    #[must_use]
    pub fn into_events(self) -> Vec<Event> {
        self.events
    }
}

impl fmt::Debug for Parser<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Parser")
            .field("kind", &self.kind)
            .field("options", &self.options)
            .field("events", &self.events.len())
            .finish()
    }
}
