// SPDX-License-Identifier: AGPL-3.0-only

//! Shared harness for the `validate_*` binaries.
//!
//! Every validation binary follows the same pattern: explicit pass/fail
//! checks against tolerances from [`crate::tolerances`], a summary on
//! stdout, exit 0 when every check passes and 1 otherwise.

use std::process;

/// One recorded pass/fail check.
#[derive(Debug, Clone)]
pub struct Check {
    /// Human-readable label.
    pub label: String,
    /// Whether the check passed.
    pub passed: bool,
    /// One-line detail (observed vs expected) for the summary.
    pub detail: String,
}

/// Accumulates checks and produces a summary with exit code.
#[derive(Debug, Default)]
#[must_use]
pub struct ValidationHarness {
    name: String,
    checks: Vec<Check>,
}

impl ValidationHarness {
    /// New harness for a named validation binary.
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            checks: Vec::new(),
        }
    }

    fn record(&mut self, label: &str, passed: bool, detail: String) {
        let icon = if passed { "✓" } else { "✗" };
        println!("  {icon} {label}: {detail}");
        self.checks.push(Check {
            label: label.to_string(),
            passed,
            detail,
        });
    }

    /// |observed − expected| < tolerance.
    pub fn check_abs(&mut self, label: &str, observed: f64, expected: f64, tolerance: f64) {
        let passed = (observed - expected).abs() < tolerance;
        self.record(
            label,
            passed,
            format!("observed={observed:.9e}, expected={expected:.9e}, tol={tolerance:.1e} abs"),
        );
    }

    /// |observed − expected| / |expected| < tolerance (absolute near zero).
    pub fn check_rel(&mut self, label: &str, observed: f64, expected: f64, tolerance: f64) {
        let err = (observed - expected).abs();
        let passed = if expected.abs() > f64::EPSILON {
            err / expected.abs() < tolerance
        } else {
            err < tolerance
        };
        self.record(
            label,
            passed,
            format!("observed={observed:.9e}, expected={expected:.9e}, tol={tolerance:.1e} rel"),
        );
    }

    /// observed < threshold.
    pub fn check_upper(&mut self, label: &str, observed: f64, threshold: f64) {
        self.record(
            label,
            observed < threshold,
            format!("observed={observed:.6e} < {threshold:.6e}"),
        );
    }

    /// Exact integer equality, for entry and bin counts.
    pub fn check_count(&mut self, label: &str, observed: u64, expected: u64) {
        self.record(
            label,
            observed == expected,
            format!("observed={observed}, expected={expected}"),
        );
    }

    /// Plain boolean check.
    pub fn check_bool(&mut self, label: &str, passed: bool) {
        self.record(label, passed, String::from(if passed { "ok" } else { "failed" }));
    }

    /// Number of passed checks.
    #[must_use]
    pub fn passed_count(&self) -> usize {
        self.checks.iter().filter(|c| c.passed).count()
    }

    /// Total number of checks.
    #[must_use]
    pub fn total_count(&self) -> usize {
        self.checks.len()
    }

    /// Whether every check passed.
    #[must_use]
    pub fn all_passed(&self) -> bool {
        self.checks.iter().all(|c| c.passed)
    }

    /// Print the summary and exit 0 (all passed) or 1.
    pub fn finish(&self) -> ! {
        println!();
        println!(
            "═══ {}: {}/{} checks passed ═══",
            self.name,
            self.passed_count(),
            self.total_count()
        );
        if self.all_passed() {
            println!("ALL CHECKS PASSED");
            process::exit(0);
        }
        let failed: Vec<&str> = self
            .checks
            .iter()
            .filter(|c| !c.passed)
            .map(|c| c.label.as_str())
            .collect();
        println!("FAILED: {}", failed.join(", "));
        process::exit(1);
    }
}
