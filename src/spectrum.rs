// SPDX-License-Identifier: AGPL-3.0-only

//! Sparse per-species weight accumulation.
//!
//! A `ParticleSpectrum` maps PDG codes to bins holding a running sum of
//! weights and sum of squared weights. One spectrum is produced per event
//! (or per worker) by the host simulation's sampler and then fed to
//! [`crate::accumulator::SpectrumAccumulator`] as a single sample.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::BeamHistError;

/// A single accumulation cell: Σw and Σw².
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Bin {
    /// Running sum of fill weights.
    pub value: f64,
    /// Running sum of squared fill weights.
    pub sumw2: f64,
}

impl Bin {
    /// Statistical error on the accumulated value, √(Σw²).
    ///
    /// Meaningful for non-negative fills; negative weights are not
    /// forbidden but make this quantity uninterpretable.
    #[must_use]
    pub fn error(&self) -> f64 {
        self.sumw2.sqrt()
    }
}

/// Sparse mapping PDG code → [`Bin`], key-sorted for deterministic iteration.
///
/// The key set only ever grows, and only through [`fill`](Self::fill) or
/// [`bin_mut`](Self::bin_mut). Checked reads via [`get`](Self::get) fail on
/// absent keys: a read implies the species must already be declared.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ParticleSpectrum {
    bins: BTreeMap<i64, Bin>,
    entries: u64,
}

impl ParticleSpectrum {
    /// Empty spectrum with no declared species.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Spectrum with the same key set as `self` and all-zero bins.
    ///
    /// Derives shape without copying payload values; used by the
    /// accumulator to fix its key set from a reference spectrum.
    #[must_use]
    pub fn blank_like(&self) -> Self {
        Self {
            bins: self.bins.keys().map(|&pdg| (pdg, Bin::default())).collect(),
            entries: 0,
        }
    }

    /// Add `weight` to the bin for `pdg`, creating it if absent.
    ///
    /// Adds `weight` to Σw and `weight²` to Σw². Always succeeds; this is
    /// the only operation that grows the key set besides `bin_mut`.
    pub fn fill(&mut self, pdg: i64, weight: f64) {
        let bin = self.bins.entry(pdg).or_default();
        bin.value += weight;
        bin.sumw2 += weight * weight;
        self.entries += 1;
    }

    /// [`fill`](Self::fill) with unit weight.
    pub fn fill_unweighted(&mut self, pdg: i64) {
        self.fill(pdg, 1.0);
    }

    /// Mutable bin access, creating a zero bin for `pdg` if absent.
    pub fn bin_mut(&mut self, pdg: i64) -> &mut Bin {
        self.bins.entry(pdg).or_default()
    }

    /// Checked read. Absent keys are [`BeamHistError::MissingSpecies`],
    /// asymmetric from `bin_mut` by design.
    pub fn get(&self, pdg: i64) -> Result<&Bin, BeamHistError> {
        self.bins.get(&pdg).ok_or(BeamHistError::MissingSpecies(pdg))
    }

    /// √(Σw²) for the bin of `pdg`.
    pub fn error(&self, pdg: i64) -> Result<f64, BeamHistError> {
        self.get(pdg).map(Bin::error)
    }

    /// Whether `pdg` is in the key set.
    #[must_use]
    pub fn contains(&self, pdg: i64) -> bool {
        self.bins.contains_key(&pdg)
    }

    /// PDG codes in ascending order.
    pub fn species(&self) -> impl Iterator<Item = i64> + '_ {
        self.bins.keys().copied()
    }

    /// (PDG code, bin) pairs in ascending key order.
    pub fn iter(&self) -> impl Iterator<Item = (i64, &Bin)> {
        self.bins.iter().map(|(&pdg, bin)| (pdg, bin))
    }

    /// Number of declared species.
    #[must_use]
    pub fn len(&self) -> usize {
        self.bins.len()
    }

    /// Whether no species are declared.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bins.is_empty()
    }

    /// Number of `fill` calls since construction or the last `reset`.
    #[must_use]
    pub const fn entries(&self) -> u64 {
        self.entries
    }

    /// Zero all bins and the entry count; the key set is kept.
    pub fn reset(&mut self) {
        for bin in self.bins.values_mut() {
            *bin = Bin::default();
        }
        self.entries = 0;
    }
}
