// SPDX-License-Identifier: AGPL-3.0-only

//! Centralized validation tolerances with numerical justification.
//!
//! Every threshold used by the integration tests and `validate_*` binaries
//! is defined here with its rationale. No ad-hoc magic numbers at call
//! sites.

/// Tolerance for operations that should be exact in f64 arithmetic.
///
/// f64 carries ~15.9 significant digits; 1e-10 leaves room for a handful
/// of rounding steps in compositions of exact operations.
pub const EXACT_F64: f64 = 1e-10;

/// Relative tolerance for online (Welford) mean/M₂ against a two-pass
/// computation.
///
/// Welford is stable to O(n·ε) relative error; 1e-9 covers runs up to
/// ~10⁶ samples with margin.
pub const WELFORD_REL: f64 = 1e-9;

/// Acceptance band, in standard errors, for Monte Carlo means against
/// their analytic expectation.
///
/// 4σ gives a ~6e-5 false-failure probability per check; with tens of
/// checks per binary the expected false-failure rate stays below 1%.
pub const MC_SIGMA: f64 = 4.0;

/// Relative tolerance for a Monte Carlo standard-error estimate against
/// its analytic value.
///
/// The sample standard deviation of n samples fluctuates with relative
/// width ~1/√(2(n−1)); 5% covers n ≥ 20,000 at ~20σ.
pub const MC_STDERR_REL: f64 = 0.05;

/// Relative tolerance for worker-merged totals against a sequential fill.
///
/// Merging reorders additions of identical f64 values; only rounding from
/// reordering accumulates.
pub const MERGE_REL: f64 = 1e-12;
