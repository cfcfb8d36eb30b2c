// SPDX-License-Identifier: AGPL-3.0-only

//! Validate the online spectrum accumulator.
//!
//! Closed-form Welford checks (electron 2/4/6 scenario, n ≤ 1 error
//! policy, key-set invariance) plus a reproducible Monte Carlo run:
//! per-event spectra are generated in parallel with rayon, then fed
//! sequentially to one accumulator and checked against the analytic
//! mean and standard error of the uniform distribution.

use rayon::prelude::*;

use beamhist::pdg;
use beamhist::tolerances;
use beamhist::validation::ValidationHarness;
use beamhist::{ParticleSpectrum, SpectrumAccumulator};

/// LCG RNG for reproducible event generation.
struct LcgRng(u64);

impl LcgRng {
    fn new(seed: u64) -> Self {
        Self(seed.wrapping_add(1))
    }

    fn next_u64(&mut self) -> u64 {
        self.0 = self
            .0
            .wrapping_mul(6_364_136_223_846_793_005)
            .wrapping_add(1_442_695_040_888_963_407);
        self.0
    }

    fn uniform(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }
}

fn reference() -> ParticleSpectrum {
    let mut s = ParticleSpectrum::new();
    s.bin_mut(pdg::ELECTRON);
    s.bin_mut(pdg::PHOTON);
    s
}

/// One simulated event: electron total ~ U[0,1), photon total ~ 3·U[0,1).
fn event_spectrum(seed: u64) -> ParticleSpectrum {
    let mut rng = LcgRng::new(seed);
    let mut s = ParticleSpectrum::new();
    s.bin_mut(pdg::ELECTRON).value = rng.uniform();
    s.bin_mut(pdg::PHOTON).value = 3.0 * rng.uniform();
    s
}

fn main() {
    println!("═══════════════════════════════════════════════════════════");
    println!("  beamhist spectrum accumulator validation");
    println!("  Reference: closed-form Welford + analytic U[0,1) moments");
    println!("═══════════════════════════════════════════════════════════\n");

    let mut harness = ValidationHarness::new("accumulator");

    // ─── Closed form: electron totals 2, 4, 6 ─────────────────────
    println!("── Closed form: per-event electron totals 2, 4, 6 ──");
    {
        let mut acc = SpectrumAccumulator::new(&reference(), "e_flux", "electron flux");
        for x in [2.0, 4.0, 6.0] {
            let mut snap = reference();
            snap.bin_mut(pdg::ELECTRON).value = x;
            if let Err(e) = acc.accumulate(&snap) {
                println!("  ✗ accumulate failed: {e}");
                harness.check_bool("accumulate 2/4/6", false);
            }
        }
        let result = acc.terminate();
        let e = result.get(pdg::ELECTRON).expect("fixed key set");
        harness.check_count("n after three events", result.entries, 3);
        harness.check_abs("mean of 2,4,6", e.mean, 4.0, tolerances::EXACT_F64);
        // M2 = 8, stderr = √(1/(3·2))·√8
        harness.check_abs(
            "stderr of 2,4,6",
            e.std_error,
            (8.0_f64 / 6.0).sqrt(),
            tolerances::EXACT_F64,
        );
        // photons were held at zero the whole run
        let g = result.get(pdg::PHOTON).expect("fixed key set");
        harness.check_abs("photon mean stays 0", g.mean, 0.0, tolerances::EXACT_F64);

        let again = acc.terminate();
        harness.check_bool("terminate is idempotent", again == result);
    }

    // ─── n ≤ 1 standard-error policy ──────────────────────────────
    println!("\n── n ≤ 1 standard-error policy ──");
    {
        let mut acc = SpectrumAccumulator::new(&reference(), "single", "one event");
        let mut snap = reference();
        snap.bin_mut(pdg::ELECTRON).value = 123.0;
        acc.accumulate(&snap).expect("matching key set");
        let result = acc.terminate();
        let e = result.get(pdg::ELECTRON).expect("fixed key set");
        harness.check_bool("n=1 stderr is exactly 0", e.std_error == 0.0);
        harness.check_bool("n=1 stderr is finite", e.std_error.is_finite());

        let empty = SpectrumAccumulator::new(&reference(), "none", "no events").terminate();
        harness.check_bool(
            "n=0 stderr is exactly 0",
            empty.get(pdg::ELECTRON).expect("fixed key set").std_error == 0.0,
        );
    }

    // ─── Key-set invariance ───────────────────────────────────────
    println!("\n── Key-set invariance ──");
    {
        let mut acc = SpectrumAccumulator::new(&reference(), "keys", "key set");
        let mut wide = reference();
        wide.bin_mut(pdg::MUON).value = 7.0; // beyond the declared set
        acc.accumulate(&wide).expect("declared keys all present");
        acc.add_empty_entries(4);
        let result = acc.terminate();
        let keys: Vec<i64> = result.species().collect();
        harness.check_bool(
            "result keys = declared keys",
            keys == vec![pdg::ELECTRON, pdg::PHOTON],
        );
        harness.check_count("add_empty_entries counted", result.entries, 5);
    }

    // ─── Monte Carlo vs analytic moments ──────────────────────────
    const N_EVENTS: u64 = 50_000;
    const SEED: u64 = 42;
    println!("\n── Monte Carlo: {N_EVENTS} events vs analytic U[0,1) ──");
    {
        // Parallel event generation; each event owns its spectrum. The
        // accumulation itself is the single sequential merge step.
        let events: Vec<ParticleSpectrum> = (0..N_EVENTS)
            .into_par_iter()
            .map(|i| event_spectrum(SEED + i * 1000))
            .collect();

        let mut acc = SpectrumAccumulator::new(&reference(), "mc", "Monte Carlo flux");
        for event in &events {
            acc.accumulate(event).expect("matching key set");
        }
        let result = acc.terminate();

        // U[0,1): mean 1/2, variance 1/12; photon scaled by 3.
        let n = N_EVENTS as f64;
        let e_stderr = (1.0 / 12.0 / n).sqrt();
        let g_stderr = 3.0 * e_stderr;

        let e = result.get(pdg::ELECTRON).expect("fixed key set");
        let g = result.get(pdg::PHOTON).expect("fixed key set");
        harness.check_abs(
            "electron MC mean",
            e.mean,
            0.5,
            tolerances::MC_SIGMA * e_stderr,
        );
        harness.check_rel(
            "electron MC stderr",
            e.std_error,
            e_stderr,
            tolerances::MC_STDERR_REL,
        );
        harness.check_abs(
            "photon MC mean",
            g.mean,
            1.5,
            tolerances::MC_SIGMA * g_stderr,
        );
        harness.check_rel(
            "photon MC stderr",
            g.std_error,
            g_stderr,
            tolerances::MC_STDERR_REL,
        );
        harness.check_count("MC entries", result.entries, N_EVENTS);
    }

    harness.finish();
}
