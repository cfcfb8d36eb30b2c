// SPDX-License-Identifier: AGPL-3.0-only

//! Bin-edge axis with linear, logarithmic, or explicit variable spacing.

use serde::{Deserialize, Serialize};

use crate::error::BeamHistError;

/// One histogram axis as an ascending list of bin edges.
///
/// `n` bins are bounded by `n + 1` edges; bin `i` covers
/// `[edges[i], edges[i+1])`. There are no overflow or underflow bins:
/// coordinates outside `[low, high)` belong to no bin.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Axis {
    edges: Vec<f64>,
}

impl Axis {
    /// `n` equal-width bins over `[lo, hi)`.
    pub fn linear(n: usize, lo: f64, hi: f64) -> Result<Self, BeamHistError> {
        if n == 0 {
            return Err(BeamHistError::InvalidAxis("bin count must be >= 1".into()));
        }
        if !(lo < hi) {
            return Err(BeamHistError::InvalidAxis(format!(
                "need lo < hi, got [{lo}, {hi})"
            )));
        }
        let width = (hi - lo) / n as f64;
        let mut edges: Vec<f64> = (0..n).map(|i| lo + i as f64 * width).collect();
        // exact upper edge, not lo + n*width, so [lo, hi) is honored at hi
        edges.push(hi);
        Ok(Self { edges })
    }

    /// `n` bins with natural-log-spaced edges over `[lo, hi)`; needs `lo > 0`.
    pub fn logarithmic(n: usize, lo: f64, hi: f64) -> Result<Self, BeamHistError> {
        if lo <= 0.0 {
            return Err(BeamHistError::InvalidAxis(format!(
                "log axis needs lo > 0, got {lo}"
            )));
        }
        if n == 0 {
            return Err(BeamHistError::InvalidAxis("bin count must be >= 1".into()));
        }
        if !(lo < hi) {
            return Err(BeamHistError::InvalidAxis(format!(
                "need lo < hi, got [{lo}, {hi})"
            )));
        }
        let (ln_lo, ln_hi) = (lo.ln(), hi.ln());
        let step = (ln_hi - ln_lo) / n as f64;
        let mut edges: Vec<f64> = (0..n).map(|i| (ln_lo + i as f64 * step).exp()).collect();
        edges.push(hi);
        Ok(Self { edges })
    }

    /// Explicit edges; must be strictly increasing with at least 2 entries.
    pub fn variable(edges: Vec<f64>) -> Result<Self, BeamHistError> {
        if edges.len() < 2 {
            return Err(BeamHistError::InvalidAxis(format!(
                "need at least 2 edges, got {}",
                edges.len()
            )));
        }
        if !edges.windows(2).all(|w| w[0] < w[1]) {
            return Err(BeamHistError::InvalidAxis(
                "edges must be strictly increasing".into(),
            ));
        }
        Ok(Self { edges })
    }

    /// Zero-based index of the bin containing `x`, or `None` outside
    /// `[low, high)`.
    #[must_use]
    pub fn index_of(&self, x: f64) -> Option<usize> {
        // written so NaN fails the lower bound too
        if !(x >= self.low()) || x >= self.high() {
            return None;
        }
        // first edge strictly above x; x >= low guarantees p >= 1
        let p = self.edges.partition_point(|&e| e <= x);
        Some(p - 1)
    }

    /// Number of bins.
    #[must_use]
    pub fn n_bins(&self) -> usize {
        self.edges.len() - 1
    }

    /// Lowest edge.
    #[must_use]
    pub fn low(&self) -> f64 {
        self.edges[0]
    }

    /// Highest edge.
    #[must_use]
    pub fn high(&self) -> f64 {
        self.edges[self.edges.len() - 1]
    }

    /// All edges, ascending.
    #[must_use]
    pub fn edges(&self) -> &[f64] {
        &self.edges
    }
}
