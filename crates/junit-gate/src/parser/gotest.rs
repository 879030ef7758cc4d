//! Line grammar for `go test -v` text output

use crate::event::{Event, EventKind};
use regex::{Captures, Regex};
use std::sync::OnceLock;
use std::time::Duration;

const RUN_PATTERN: &str = r"^=== (RUN|PAUSE|CONT)\s+(\S.*?)\s*$";

// Go 1.20+ names the test owning the following output; a bare `=== NAME`
// hands output back to the package.
const NAME_PATTERN: &str = r"^=== NAME(?:\s+(\S.*?))?\s*$";

const END_PATTERN: &str =
    r"^((?:    )*)--- (PASS|FAIL|SKIP): (\S+) \((\d+(?:\.\d+)?)(?:s| seconds)\)";

const STATUS_PATTERN: &str = r"^(PASS|FAIL|SKIP)\s*$";

const SUMMARY_PATTERN: &str = concat!(
    // 1: result
    r"^(\?|ok|FAIL)",
    // 2: package
    r"\s+(\S+)",
    // 3: elapsed seconds
    r"(?:\s+(\d+\.\d+)s)?",
    r"(?:\s+\(cached\))?",
    // 4: bracketed note before coverage
    r"(?:\s+(\[[^\]]+\]))?",
    // 5: coverage percentage, 6: covered packages
    r"(?:\s+coverage:\s+(?:\[no statements\]|(\d+(?:\.\d+)?)% of statements(?: in (.+?))?))?",
    // 7: bracketed note after coverage
    r"(?:\s+(\[[^\]]+\]))?",
    r"\s*$",
);

const COVERAGE_PATTERN: &str = r"^coverage:\s+(\d+(?:\.\d+)?)% of statements(?: in (.+?))?\s*$";

const BUILD_PATTERN: &str = r"^# ([^\s\[]+)(?: \[[^\]]+\])?\s*$";

fn pattern(cell: &'static OnceLock<Regex>, source: &str) -> &'static Regex {
    cell.get_or_init(|| Regex::new(source).expect("transcript pattern compiles"))
}

fn run_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    pattern(&RE, RUN_PATTERN)
}

fn name_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    pattern(&RE, NAME_PATTERN)
}

fn end_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    pattern(&RE, END_PATTERN)
}

fn status_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    pattern(&RE, STATUS_PATTERN)
}

fn summary_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    pattern(&RE, SUMMARY_PATTERN)
}

fn coverage_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    pattern(&RE, COVERAGE_PATTERN)
}

fn build_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    pattern(&RE, BUILD_PATTERN)
}

/// Classify one transcript line
#[must_use]
pub fn parse_line(line: &str) -> Event {
    if let Some(caps) = run_re().captures(line) {
        let kind = match &caps[1] {
            "RUN" => EventKind::RunTest,
            "PAUSE" => EventKind::PauseTest,
            _ => EventKind::ContTest,
        };
        return Event::new(kind).with_name(&caps[2]);
    }

    if let Some(caps) = name_re().captures(line) {
        let name = caps.get(1).map_or("", |m| m.as_str());
        return Event::new(EventKind::ContTest).with_name(name);
    }

    if let Some(caps) = end_re().captures(line) {
        return Event {
            result: caps[2].to_string(),
            duration: seconds(caps.get(4).map(|m| m.as_str())),
            indent: caps[1].len() / 4,
            ..Event::new(EventKind::EndTest).with_name(&caps[3])
        };
    }

    if let Some(caps) = status_re().captures(line) {
        return Event {
            result: caps[1].to_string(),
            ..Event::new(EventKind::Status)
        };
    }

    if let Some(caps) = summary_re().captures(line) {
        return summary(&caps);
    }

    if let Some(caps) = coverage_re().captures(line) {
        return Event {
            cov_pct: percent(caps.get(1).map(|m| m.as_str())),
            cov_packages: packages(caps.get(2).map(|m| m.as_str())),
            ..Event::new(EventKind::Coverage)
        };
    }

    if let Some(caps) = build_re().captures(line) {
        return Event::new(EventKind::BuildOutput).with_name(&caps[1]);
    }

    Event::output(line)
}

fn summary(caps: &Captures<'_>) -> Event {
    let note = caps
        .get(4)
        .or_else(|| caps.get(7))
        .map(|m| m.as_str().to_string())
        .unwrap_or_default();
    Event {
        result: caps[1].to_string(),
        duration: seconds(caps.get(3).map(|m| m.as_str())),
        data: note,
        cov_pct: percent(caps.get(5).map(|m| m.as_str())),
        cov_packages: packages(caps.get(6).map(|m| m.as_str())),
        ..Event::new(EventKind::Summary).with_name(&caps[2])
    }
}

fn seconds(raw: Option<&str>) -> Duration {
    raw.and_then(|s| s.parse::<f64>().ok())
        .filter(|s| s.is_finite() && *s >= 0.0)
        .map_or(Duration::ZERO, Duration::from_secs_f64)
}

fn percent(raw: Option<&str>) -> f64 {
    raw.and_then(|s| s.parse::<f64>().ok()).unwrap_or(0.0)
}

fn packages(raw: Option<&str>) -> Vec<String> {
    raw.map(|list| {
        list.split(", ")
            .filter(|p| !p.is_empty())
            .map(str::to_string)
            .collect()
    })
    .unwrap_or_default()
}
