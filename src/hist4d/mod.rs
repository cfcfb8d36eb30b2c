// SPDX-License-Identifier: AGPL-3.0-only

//! Dense 4D histogram (x, y, z, energy) with a companion error histogram.
//!
//! The three spatial axes are always linear; the energy axis is linear,
//! logarithmic, or an explicit variable-width edge list. Values and errors
//! share one set of axis definitions for the histogram's whole lifetime.
//!
//! Filling drops out-of-range coordinates (no overflow/underflow bins).
//! Cross-histogram [`accumulate`](Hist4D::accumulate) is a plain count
//! merge for combining per-worker partials; errors on merged counts are
//! the host's concern (Poisson on totals, typically) and are not
//! propagated here.

pub mod axis;

pub use axis::Axis;

use serde::{Deserialize, Serialize};

use crate::error::BeamHistError;

/// Energy-axis binning selector.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum EnergyBinning {
    /// Equal-width bins over `[lo, hi)`.
    Linear { n: usize, lo: f64, hi: f64 },
    /// Natural-log-spaced bins over `[lo, hi)`; needs `lo > 0`.
    Logarithmic { n: usize, lo: f64, hi: f64 },
    /// Explicit strictly increasing edges (at least 2).
    Edges(Vec<f64>),
}

impl EnergyBinning {
    fn build(&self) -> Result<Axis, BeamHistError> {
        match self {
            Self::Linear { n, lo, hi } => Axis::linear(*n, *lo, *hi),
            Self::Logarithmic { n, lo, hi } => Axis::logarithmic(*n, *lo, *hi),
            Self::Edges(edges) => Axis::variable(edges.clone()),
        }
    }
}

/// Spatial axis specification: `(bin count, low edge, high edge)`.
pub type AxisSpec = (usize, f64, f64);

/// Dense 4D histogram with companion per-bin errors.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Hist4D {
    name: String,
    title: String,
    axes: [Axis; 4],
    /// Row-major over (x, y, z, e); e is the fastest index.
    data: Vec<f64>,
    error: Vec<f64>,
}

const AXIS_LABELS: [&str; 4] = ["x", "y", "z", "e"];

impl Hist4D {
    /// New histogram over linear x/y/z axes and the given energy binning.
    ///
    /// All axis validation happens here, before any state is observable.
    pub fn new(
        name: &str,
        title: &str,
        x: AxisSpec,
        y: AxisSpec,
        z: AxisSpec,
        energy: &EnergyBinning,
    ) -> Result<Self, BeamHistError> {
        let axes = [
            Axis::linear(x.0, x.1, x.2)?,
            Axis::linear(y.0, y.1, y.2)?,
            Axis::linear(z.0, z.1, z.2)?,
            energy.build()?,
        ];
        let len = axes.iter().map(Axis::n_bins).product();
        Ok(Self {
            name: name.to_string(),
            title: title.to_string(),
            axes,
            data: vec![0.0; len],
            error: vec![0.0; len],
        })
    }

    fn flat_index(&self, ix: usize, iy: usize, iz: usize, ie: usize) -> Result<usize, BeamHistError> {
        let idx = [ix, iy, iz, ie];
        for d in 0..4 {
            let bins = self.axes[d].n_bins();
            if idx[d] >= bins {
                return Err(BeamHistError::BinOutOfRange {
                    axis: AXIS_LABELS[d],
                    index: idx[d],
                    bins,
                });
            }
        }
        Ok(((ix * self.axes[1].n_bins() + iy) * self.axes[2].n_bins() + iz)
            * self.axes[3].n_bins()
            + ie)
    }

    /// Add unit weight to the bin containing `(x, y, z, e)`.
    pub fn fill(&mut self, x: f64, y: f64, z: f64, e: f64) {
        self.fill_weighted(x, y, z, e, 1.0);
    }

    /// Add `weight` to the bin containing `(x, y, z, e)`.
    ///
    /// A coordinate outside `[low, high)` on any axis drops the sample.
    pub fn fill_weighted(&mut self, x: f64, y: f64, z: f64, e: f64, weight: f64) {
        let Some(ix) = self.axes[0].index_of(x) else { return };
        let Some(iy) = self.axes[1].index_of(y) else { return };
        let Some(iz) = self.axes[2].index_of(z) else { return };
        let Some(ie) = self.axes[3].index_of(e) else { return };
        // indices came from the axes themselves; flat_index cannot fail
        if let Ok(idx) = self.flat_index(ix, iy, iz, ie) {
            self.data[idx] += weight;
        }
    }

    /// Bin content at zero-based indices.
    pub fn at(&self, ix: usize, iy: usize, iz: usize, ie: usize) -> Result<f64, BeamHistError> {
        self.flat_index(ix, iy, iz, ie).map(|i| self.data[i])
    }

    /// Overwrite the bin content at zero-based indices.
    pub fn set(
        &mut self,
        ix: usize,
        iy: usize,
        iz: usize,
        ie: usize,
        value: f64,
    ) -> Result<(), BeamHistError> {
        let idx = self.flat_index(ix, iy, iz, ie)?;
        self.data[idx] = value;
        Ok(())
    }

    /// Error-histogram content at zero-based indices.
    pub fn at_error(
        &self,
        ix: usize,
        iy: usize,
        iz: usize,
        ie: usize,
    ) -> Result<f64, BeamHistError> {
        self.flat_index(ix, iy, iz, ie).map(|i| self.error[i])
    }

    /// Overwrite the error-histogram content at zero-based indices.
    pub fn set_error(
        &mut self,
        ix: usize,
        iy: usize,
        iz: usize,
        ie: usize,
        value: f64,
    ) -> Result<(), BeamHistError> {
        let idx = self.flat_index(ix, iy, iz, ie)?;
        self.error[idx] = value;
        Ok(())
    }

    /// Zero all value and error bins; axis definitions are kept.
    pub fn reset(&mut self) {
        self.data.fill(0.0);
        self.error.fill(0.0);
    }

    /// Independent deep copy under a new name.
    #[must_use]
    pub fn clone_named(&self, name: &str) -> Self {
        let mut copy = self.clone();
        copy.name = name.to_string();
        copy
    }

    /// Element-wise count merge of a same-shaped histogram's values.
    ///
    /// Merges `data` only; errors on merged counts are recomputed by the
    /// host from the totals, not summed here.
    pub fn accumulate(&mut self, other: &Self) -> Result<(), BeamHistError> {
        if self.axes != other.axes {
            return Err(BeamHistError::ShapeMismatch(format!(
                "{} vs {}",
                self.shape_description(),
                other.shape_description()
            )));
        }
        for (dst, src) in self.data.iter_mut().zip(&other.data) {
            *dst += src;
        }
        Ok(())
    }

    /// Sum of all value bins; the checksum used by fill-drop tests.
    #[must_use]
    pub fn sum(&self) -> f64 {
        self.data.iter().sum()
    }

    /// Histogram identity.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Human-readable title.
    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Axis for dimension `d` (0 = x … 3 = e).
    #[must_use]
    pub fn axis(&self, d: usize) -> &Axis {
        &self.axes[d]
    }

    /// Bin counts per axis as `(nx, ny, nz, ne)`.
    #[must_use]
    pub fn n_bins(&self) -> (usize, usize, usize, usize) {
        (
            self.axes[0].n_bins(),
            self.axes[1].n_bins(),
            self.axes[2].n_bins(),
            self.axes[3].n_bins(),
        )
    }

    fn shape_description(&self) -> String {
        let (nx, ny, nz, ne) = self.n_bins();
        format!("{nx}x{ny}x{nz}x{ne}")
    }
}

impl Default for Hist4D {
    /// Placeholder shape: 3 bins over `[0, 1)` on every axis.
    fn default() -> Self {
        Self::new(
            "h",
            "",
            (3, 0.0, 1.0),
            (3, 0.0, 1.0),
            (3, 0.0, 1.0),
            &EnergyBinning::Linear {
                n: 3,
                lo: 0.0,
                hi: 1.0,
            },
        )
        .unwrap_or_else(|_| unreachable!("fixed placeholder axes are valid"))
    }
}
