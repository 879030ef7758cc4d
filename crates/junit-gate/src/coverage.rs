//! Coverage gate
//!
//! Two passes share one [`CoveragePolicy`]:
//!
//! - [`CoverageWatch`] observes summary events while parsing and warns.
//! - [`enforce`] runs on the finished report and records a run error on
//!   every unit whose coverage is below its threshold.
//!
//! Both are inactive unless the global threshold is positive. Per-unit
//! overrides only change the threshold of units the global gate covers.

use crate::config::UnitConfig;
use crate::event::Event;
use crate::report::{Report, UnitError};
use std::collections::BTreeMap;
use tracing::{info, warn};

/// Name of the run error recorded for a coverage shortfall
pub const LOW_COVERAGE_ERROR: &str = "package coverage is too low";

/// Cause tag of the run error recorded for a coverage shortfall
pub const LOW_COVERAGE_CAUSE: &str = "lowCoverage";

/// Effective coverage thresholds
#[derive(Debug, Clone, Copy)]
pub struct CoveragePolicy<'a> {
    required: f64,
    units: &'a BTreeMap<String, UnitConfig>,
}

impl<'a> CoveragePolicy<'a> {
    /// Create a policy from a global threshold and per-unit overrides
    #[must_use]
    pub const fn new(required: f64, units: &'a BTreeMap<String, UnitConfig>) -> Self {
        Self { required, units }
    }

    /// Whether the gate is active at all
    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.required > 0.0
    }

    /// Threshold for `unit`: its override if one exists, else the global value
    #[must_use]
    pub fn threshold_for(&self, unit: &str) -> f64 {
        self.units
            .get(unit)
            .map_or(self.required, |cfg| cfg.min_cover)
    }

    /// The threshold `coverage` falls short of, if any
    fn shortfall(&self, unit: &str, coverage: f64) -> Option<f64> {
        let threshold = self.threshold_for(unit);
        (coverage < threshold).then_some(threshold)
    }
}

/// Event-time observer that warns about low coverage as summaries arrive
#[derive(Debug)]
pub struct CoverageWatch<'a> {
    policy: CoveragePolicy<'a>,
    warnings: Vec<String>,
}

impl<'a> CoverageWatch<'a> {
    /// Create a watch for `policy`
    #[must_use]
    pub const fn new(policy: CoveragePolicy<'a>) -> Self {
        Self {
            policy,
            warnings: Vec::new(),
        }
    }

    /// Warning line for `event`, if it is a summary below its threshold
    #[must_use]
    pub fn check(&self, event: &Event) -> Option<String> {
        if !event.is_summary() {
            return None;
        }
        self.policy
            .shortfall(&event.name, event.cov_pct)
            .map(|threshold| {
                format!(
                    "COVERAGE FAIL: {} is too low {:.1} < {:.1}",
                    event.name, event.cov_pct, threshold
                )
            })
    }

    /// Inspect one event; never fails and never touches the report
    pub fn observe(&mut self, event: &Event) {
        if let Some(line) = self.check(event) {
            warn!(
                target: "junit_gate::coverage",
                unit = %event.name,
                observed = event.cov_pct,
                "{line}"
            );
            self.warnings.push(line);
        }
    }

    /// Warning lines emitted so far, in event order
    #[must_use]
    pub fn warnings(&self) -> &[String] {
        &self.warnings
    }

    /// Consume the watch, keeping its warnings
    #[must_use]
    pub fn into_warnings(self) -> Vec<String> {
        self.warnings
    }
}

/// Record a low-coverage run error on every unit below its threshold
///
/// Units that already carry a build or run error are left untouched. Returns
/// the number of units that were marked.
pub fn enforce(report: &mut Report, policy: &CoveragePolicy<'_>) -> usize {
    if !policy.is_enabled() {
        return 0;
    }

    let mut marked = 0;
    for unit in &mut report.units {
        if unit.has_error() {
            continue;
        }
        let Some(threshold) = policy.shortfall(&unit.name, unit.coverage) else {
            continue;
        };

        info!(
            unit = %unit.name,
            observed = unit.coverage,
            threshold,
            "marking unit failed for low coverage"
        );
        unit.run_error = Some(
            UnitError::new(LOW_COVERAGE_ERROR, LOW_COVERAGE_CAUSE).with_output(vec![format!(
                "FAIL: {} {} {:.6} < {:.6}",
                unit.name, LOW_COVERAGE_ERROR, unit.coverage, threshold
            )]),
        );
        marked += 1;
    }
    marked
}
