// SPDX-License-Identifier: AGPL-3.0-only

//! Integration tests: spectrum accumulation end to end.
//!
//! Exercises the public API the way the host simulation does — build a
//! reference spectrum, feed per-event snapshots, finalize — and checks the
//! online results against direct two-pass computations.

use beamhist::pdg;
use beamhist::tolerances::WELFORD_REL;
use beamhist::{BeamHistError, ParticleSpectrum, SpectrumAccumulator};

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
fn online_mean_matches_arithmetic_mean() {
    let keys = [pdg::ELECTRON, pdg::PHOTON];
    let xs = [0.25, 1.75, 3.5, 0.125, 2.0, 5.5, 1.0, 0.0, 4.25];
    let mut acc = SpectrumAccumulator::new(&reference(&keys), "flux", "per-event flux");
    for &x in &xs {
        // photon held at 0 throughout
        acc.accumulate(&snapshot(&keys, &[x, 0.0])).unwrap();
    }
    let mean = xs.iter().sum::<f64>() / xs.len() as f64;
    let got = acc.mean().get(pdg::ELECTRON).unwrap().value;
    assert!(
        ((got - mean) / mean).abs() < WELFORD_REL,
        "online mean {got} vs arithmetic {mean}"
    );
    assert_eq!(acc.mean().get(pdg::PHOTON).unwrap().value, 0.0);
}

#[test]
fn online_m2_matches_two_pass_sum_of_squared_deviations() {
    let keys = [pdg::PROTON];
    let xs = [10.0, 10.5, 9.75, 11.0, 8.5, 10.25];
    let mut acc = SpectrumAccumulator::new(&reference(&keys), "p", "protons");
    for &x in &xs {
        acc.accumulate(&snapshot(&keys, &[x])).unwrap();
    }
    let mean = xs.iter().sum::<f64>() / xs.len() as f64;
    let m2: f64 = xs.iter().map(|x| (x - mean) * (x - mean)).sum();
    let got = acc.variance().get(pdg::PROTON).unwrap().sumw2;
    assert!(
        ((got - m2) / m2).abs() < WELFORD_REL,
        "online M2 {got} vs two-pass {m2}"
    );
}

#[test]
fn single_sample_standard_error_is_exactly_zero() {
    let keys = [pdg::ELECTRON, pdg::NEUTRON, pdg::PION_PLUS];
    let mut acc = SpectrumAccumulator::new(&reference(&keys), "one", "single event");
    acc.accumulate(&snapshot(&keys, &[1e6, -42.0, 0.001])).unwrap();
    let result = acc.terminate();
    for k in keys {
        let bin = result.get(k).unwrap();
        assert_eq!(bin.std_error, 0.0, "n=1 policy for key {k}");
        assert!(bin.std_error.is_finite());
    }
}

#[test]
fn repeated_termination_yields_identical_results() {
    let keys = [pdg::PHOTON];
    let mut acc = SpectrumAccumulator::new(&reference(&keys), "g", "photons");
    for x in [1.0, 3.0, 5.0, 7.0] {
        acc.accumulate(&snapshot(&keys, &[x])).unwrap();
    }
    let first = acc.terminate();
    let second = acc.terminate();
    assert_eq!(first, second);
    // and accumulation can continue after a read
    acc.accumulate(&snapshot(&keys, &[9.0])).unwrap();
    let third = acc.terminate();
    assert_eq!(third.entries, 5);
    assert!((third.get(pdg::PHOTON).unwrap().mean - 5.0).abs() < 1e-12);
}

#[test]
fn key_set_fixed_for_accumulator_lifetime() {
    let keys = [1_i64, 2, 3];
    let mut acc = SpectrumAccumulator::new(&reference(&keys), "k", "keyed");
    assert_eq!(acc.mean().species().collect::<Vec<_>>(), keys);
    assert_eq!(acc.variance().species().collect::<Vec<_>>(), keys);

    // snapshots with extra keys do not widen the set
    let mut wide = reference(&keys);
    wide.bin_mut(99).value = 1.0;
    acc.accumulate(&wide).unwrap();
    assert_eq!(acc.mean().species().collect::<Vec<_>>(), keys);

    let result = acc.terminate();
    assert_eq!(result.species().collect::<Vec<_>>(), keys);
    assert!(matches!(result.get(99), Err(BeamHistError::MissingSpecies(99))));
}

#[test]
fn electron_two_four_six_full_scenario() {
    // Per-event electron totals 2, 4, 6: mean 4, M2 8,
    // stderr = √(1/(3·2))·√8 = √(8/6) ≈ 1.1547
    let keys = [pdg::ELECTRON];
    let mut acc = SpectrumAccumulator::new(&reference(&keys), "e", "electron flux");
    for x in [2.0, 4.0, 6.0] {
        acc.accumulate(&snapshot(&keys, &[x])).unwrap();
    }
    let result = acc.terminate();
    let bin = result.get(pdg::ELECTRON).unwrap();
    assert_eq!(result.entries, 3);
    assert!((bin.mean - 4.0).abs() < 1e-12);
    assert!((bin.std_error - 1.154_700_538_379_251_5).abs() < 1e-12);
}

#[test]
fn empty_entries_dilute_the_mean_when_counted_first() {
    // 4 empty events then one event with total 10: mean 2, as if five
    // snapshots {0,0,0,0,10} had been fed.
    let keys = [pdg::PHOTON];
    let mut acc = SpectrumAccumulator::new(&reference(&keys), "g", "photons");
    acc.add_empty_entries(4);
    acc.accumulate(&snapshot(&keys, &[10.0])).unwrap();
    let result = acc.terminate();
    let bin = result.get(pdg::PHOTON).unwrap();
    assert!((bin.mean - 2.0).abs() < 1e-12);
    assert_eq!(result.entries, 5);
}

#[test]
fn mismatched_snapshot_fails_per_key() {
    let mut acc = SpectrumAccumulator::new(
        &reference(&[pdg::ELECTRON, pdg::PHOTON]),
        "r",
        "result",
    );
    let narrow = snapshot(&[pdg::ELECTRON], &[1.0]);
    assert_eq!(
        acc.accumulate(&narrow),
        Err(BeamHistError::MissingSpecies(pdg::PHOTON))
    );
}

#[test]
fn result_serializes_for_output_hand_off() {
    let keys = [pdg::ELECTRON];
    let mut acc = SpectrumAccumulator::new(&reference(&keys), "e_flux", "electron flux");
    for x in [2.0, 4.0, 6.0] {
        acc.accumulate(&snapshot(&keys, &[x])).unwrap();
    }
    let result = acc.terminate();
    let json = serde_json::to_string(&result).unwrap();
    let back: beamhist::SpectrumResult = serde_json::from_str(&json).unwrap();
    assert_eq!(back, result);
    assert_eq!(back.name, "e_flux");
}
