// SPDX-License-Identifier: AGPL-3.0-only

//! Online mean/variance accumulation over same-shaped spectra.
//!
//! One [`SpectrumAccumulator`] is constructed per named result. Each
//! [`accumulate`](SpectrumAccumulator::accumulate) call feeds one complete
//! per-event (or per-worker) spectrum as one independent sample; the
//! per-key mean and unnormalized sum of squared deviations are updated with
//! Welford's one-pass algorithm, which is numerically stable over long runs
//! where the naive Σx/Σx² formula loses precision.
//!
//! Finalization computes the standard error of the mean,
//! σ_mean = √(M₂ / (n(n−1))), and returns an owned [`SpectrumResult`] so
//! the accumulating and finalized phases are distinct types: a bin in
//! flight holds (Σw, Σw²), a finalized bin holds (mean, standard error).

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::BeamHistError;
use crate::spectrum::ParticleSpectrum;

/// A finalized bin: sample mean and standard error of the mean.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FinalBin {
    /// Arithmetic mean of the accumulated per-sample values.
    pub mean: f64,
    /// Standard error of the mean; exactly 0 when n ≤ 1.
    pub std_error: f64,
}

/// Finalized snapshot of an accumulation run, one [`FinalBin`] per species.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpectrumResult {
    /// Result identity, as registered with the host's output layer.
    pub name: String,
    /// Human-readable title.
    pub title: String,
    /// Number of samples the result is based on.
    pub entries: u64,
    /// Per-species mean and standard error, key-sorted.
    pub bins: BTreeMap<i64, FinalBin>,
}

impl SpectrumResult {
    /// Checked per-species read.
    pub fn get(&self, pdg: i64) -> Result<&FinalBin, BeamHistError> {
        self.bins.get(&pdg).ok_or(BeamHistError::MissingSpecies(pdg))
    }

    /// PDG codes in ascending order.
    pub fn species(&self) -> impl Iterator<Item = i64> + '_ {
        self.bins.keys().copied()
    }
}

/// Online per-species mean/variance accumulator with a fixed key set.
///
/// The key set is fixed at construction from a reference spectrum and never
/// changes; feeding a snapshot missing one of those keys fails with
/// [`BeamHistError::MissingSpecies`] for that key.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpectrumAccumulator {
    name: String,
    title: String,
    /// Key set fixed at construction, ascending.
    species: Vec<i64>,
    /// Per-key running mean, stored in each bin's `value`.
    mean: ParticleSpectrum,
    /// Per-key running Σ(xᵢ − mean)², stored in each bin's `sumw2`.
    variance: ParticleSpectrum,
    /// Samples accumulated so far.
    n: u64,
}

impl SpectrumAccumulator {
    /// New accumulator whose key set is that of `reference`.
    ///
    /// Only the key set is read from `reference`; its payload values are
    /// never copied and it is not retained.
    #[must_use]
    pub fn new(reference: &ParticleSpectrum, name: &str, title: &str) -> Self {
        Self {
            name: name.to_string(),
            title: title.to_string(),
            species: reference.species().collect(),
            mean: reference.blank_like(),
            variance: reference.blank_like(),
            n: 0,
        }
    }

    /// Feed one complete snapshot as one independent sample.
    ///
    /// For every key in the fixed key set, reads the snapshot's accumulated
    /// per-event total (`Bin::value`, not a raw weight) and applies the
    /// Welford update:
    ///
    /// ```text
    /// mean ← mean + (x − mean)/n
    /// M₂   ← M₂ + (x − mean_old)(x − mean_new)
    /// ```
    ///
    /// A snapshot missing one of the declared keys fails on that key with
    /// [`BeamHistError::MissingSpecies`]; keys the snapshot has beyond the
    /// declared set are ignored.
    pub fn accumulate(&mut self, snapshot: &ParticleSpectrum) -> Result<(), BeamHistError> {
        self.n += 1;
        let n = self.n as f64;
        for &pdg in &self.species {
            let x = snapshot.get(pdg)?.value;
            let old_mean = self.mean.get(pdg)?.value;
            let new_mean = old_mean + (x - old_mean) / n;
            self.mean.bin_mut(pdg).value = new_mean;
            self.variance.bin_mut(pdg).sumw2 += (x - old_mean) * (x - new_mean);
        }
        Ok(())
    }

    /// Count `count` snapshots known a priori to be all-zero without
    /// visiting any bin.
    ///
    /// The caller guarantees every bin of those snapshots is zero; no
    /// verification is performed. An all-zero sample still shifts the mean,
    /// so this is only exact while the accumulated means are themselves
    /// zero — the host uses it for events that produced no hits before any
    /// non-empty event arrived, and for bulk-registering empty events in a
    /// run where a species never fired.
    pub fn add_empty_entries(&mut self, count: u64) {
        self.n += count;
    }

    /// Finalize into an owned result with mean and standard error per key.
    ///
    /// A pure read of the accumulator's state: calling it again without an
    /// intervening [`accumulate`](Self::accumulate) yields an identical
    /// result. For n ≤ 1 the standard error is exactly 0 rather than
    /// NaN/Inf from the n(n−1) denominator; this policy is load-bearing
    /// for single-event runs and must not be "fixed".
    #[must_use]
    pub fn terminate(&self) -> SpectrumResult {
        let factor = if self.n > 1 {
            (1.0 / (self.n as f64 * (self.n as f64 - 1.0))).sqrt()
        } else {
            0.0
        };
        let bins = self
            .species
            .iter()
            .map(|&pdg| {
                // keys are fixed at construction; both lookups always succeed
                let mean = self.mean.get(pdg).map_or(0.0, |b| b.value);
                let m2 = self.variance.get(pdg).map_or(0.0, |b| b.sumw2);
                (
                    pdg,
                    FinalBin {
                        mean,
                        std_error: factor * m2.sqrt(),
                    },
                )
            })
            .collect();
        SpectrumResult {
            name: self.name.clone(),
            title: self.title.clone(),
            entries: self.n,
            bins,
        }
    }

    /// Samples accumulated so far.
    #[must_use]
    pub const fn n(&self) -> u64 {
        self.n
    }

    /// Result identity.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Running per-key means (each bin's `value`).
    #[must_use]
    pub const fn mean(&self) -> &ParticleSpectrum {
        &self.mean
    }

    /// Running per-key Σ(xᵢ − mean)² (each bin's `sumw2`).
    #[must_use]
    pub const fn variance(&self) -> &ParticleSpectrum {
        &self.variance
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pdg;
    use crate::tolerances::WELFORD_REL;

    fn reference(keys: &[i64]) -> ParticleSpectrum {
        let mut s = ParticleSpectrum::new();
        for &k in keys {
            s.bin_mut(k);
        }
        s
    }

    fn snapshot(keys: &[i64], values: &[f64]) -> ParticleSpectrum {
        let mut s = ParticleSpectrum::new();
        for (&k, &v) in keys.iter().zip(values) {
            s.bin_mut(k).value = v;
        }
        s
    }

    #[test]
    fn single_sample_mean_is_the_sample() {
        let mut acc = SpectrumAccumulator::new(&reference(&[pdg::ELECTRON]), "e", "electrons");
        acc.accumulate(&snapshot(&[pdg::ELECTRON], &[5.0])).unwrap();
        assert_eq!(acc.n(), 1);
        let mean = acc.mean().get(pdg::ELECTRON).unwrap().value;
        assert!((mean - 5.0).abs() < 1e-12);
    }

    #[test]
    fn welford_matches_two_pass_variance() {
        let keys = [pdg::PHOTON];
        let xs = [1.5, 2.5, 0.5, 4.0, 3.25, 2.0, 1.0];
        let mut acc = SpectrumAccumulator::new(&reference(&keys), "g", "photons");
        for &x in &xs {
            acc.accumulate(&snapshot(&keys, &[x])).unwrap();
        }

        let mean: f64 = xs.iter().sum::<f64>() / xs.len() as f64;
        let m2: f64 = xs.iter().map(|x| (x - mean) * (x - mean)).sum();

        let got_mean = acc.mean().get(pdg::PHOTON).unwrap().value;
        let got_m2 = acc.variance().get(pdg::PHOTON).unwrap().sumw2;
        assert!(
            ((got_mean - mean) / mean).abs() < WELFORD_REL,
            "online mean {got_mean} vs two-pass {mean}"
        );
        assert!(
            ((got_m2 - m2) / m2).abs() < WELFORD_REL,
            "online M2 {got_m2} vs two-pass {m2}"
        );
    }

    #[test]
    fn terminate_single_sample_zero_error() {
        let keys = [pdg::ELECTRON, pdg::PROTON];
        let mut acc = SpectrumAccumulator::new(&reference(&keys), "r", "result");
        acc.accumulate(&snapshot(&keys, &[123.0, -4.0])).unwrap();
        let result = acc.terminate();
        for pdg in keys {
            assert_eq!(
                result.get(pdg).unwrap().std_error,
                0.0,
                "n=1 must give exactly 0, not NaN"
            );
        }
    }

    #[test]
    fn terminate_zero_samples_zero_everything() {
        let acc = SpectrumAccumulator::new(&reference(&[pdg::MUON]), "mu", "muons");
        let result = acc.terminate();
        assert_eq!(result.entries, 0);
        let bin = result.get(pdg::MUON).unwrap();
        assert_eq!(bin.mean, 0.0);
        assert_eq!(bin.std_error, 0.0);
    }

    #[test]
    fn terminate_is_idempotent() {
        let keys = [pdg::ELECTRON];
        let mut acc = SpectrumAccumulator::new(&reference(&keys), "e", "electrons");
        for x in [2.0, 4.0, 6.0] {
            acc.accumulate(&snapshot(&keys, &[x])).unwrap();
        }
        let first = acc.terminate();
        let second = acc.terminate();
        assert_eq!(first, second);
    }

    #[test]
    fn electron_two_four_six_scenario() {
        // mean 4, M2 = (2−4)² + (4−4)² + (6−4)² = 8,
        // stderr = √(1/(3·2)) · √8 = √(8/6)
        let keys = [pdg::ELECTRON];
        let mut acc = SpectrumAccumulator::new(&reference(&keys), "e", "electrons");
        for x in [2.0, 4.0, 6.0] {
            acc.accumulate(&snapshot(&keys, &[x])).unwrap();
        }
        assert_eq!(acc.n(), 3);
        let m2 = acc.variance().get(pdg::ELECTRON).unwrap().sumw2;
        assert!((m2 - 8.0).abs() < 1e-12);

        let result = acc.terminate();
        let bin = result.get(pdg::ELECTRON).unwrap();
        assert!((bin.mean - 4.0).abs() < 1e-12);
        assert!((bin.std_error - (8.0_f64 / 6.0).sqrt()).abs() < 1e-12);
        assert_eq!(result.entries, 3);
    }

    #[test]
    fn missing_key_in_snapshot_fails() {
        let mut acc =
            SpectrumAccumulator::new(&reference(&[pdg::ELECTRON, pdg::PROTON]), "r", "result");
        let incomplete = snapshot(&[pdg::ELECTRON], &[1.0]);
        assert_eq!(
            acc.accumulate(&incomplete),
            Err(BeamHistError::MissingSpecies(pdg::PROTON))
        );
    }

    #[test]
    fn extra_keys_in_snapshot_are_ignored() {
        let keys = [pdg::ELECTRON];
        let mut acc = SpectrumAccumulator::new(&reference(&keys), "e", "electrons");
        let wide = snapshot(&[pdg::ELECTRON, pdg::PHOTON], &[3.0, 99.0]);
        acc.accumulate(&wide).unwrap();
        let result = acc.terminate();
        assert_eq!(result.species().collect::<Vec<_>>(), vec![pdg::ELECTRON]);
    }

    #[test]
    fn key_set_never_changes() {
        let keys = [1_i64, 2, 3];
        let mut acc = SpectrumAccumulator::new(&reference(&keys), "k", "keys");
        acc.accumulate(&snapshot(&keys, &[1.0, 2.0, 3.0])).unwrap();
        acc.add_empty_entries(5);
        let result = acc.terminate();
        assert_eq!(acc.mean().species().collect::<Vec<_>>(), keys);
        assert_eq!(acc.variance().species().collect::<Vec<_>>(), keys);
        assert_eq!(result.species().collect::<Vec<_>>(), keys);
    }

    #[test]
    fn add_empty_entries_only_bumps_n() {
        let keys = [pdg::NEUTRON];
        let mut acc = SpectrumAccumulator::new(&reference(&keys), "n", "neutrons");
        acc.add_empty_entries(10);
        assert_eq!(acc.n(), 10);
        assert_eq!(acc.mean().get(pdg::NEUTRON).unwrap().value, 0.0);
        assert_eq!(acc.variance().get(pdg::NEUTRON).unwrap().sumw2, 0.0);
    }
}
