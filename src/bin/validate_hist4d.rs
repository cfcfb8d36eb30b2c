// SPDX-License-Identifier: AGPL-3.0-only

//! Validate the dense 4D histogram.
//!
//! Fill/read round-trip, out-of-range drop checksum, energy-axis variants,
//! and worker-merge parity: rayon workers each fill an independent
//! histogram from disjoint seed ranges, the partials are merged
//! sequentially with `accumulate`, and the merged result must match a
//! single sequential fill over the same events bin for bin.

use rayon::prelude::*;

use beamhist::tolerances;
use beamhist::validation::ValidationHarness;
use beamhist::{EnergyBinning, Hist4D};

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

fn flux_hist(name: &str) -> Hist4D {
    Hist4D::new(
        name,
        "energy flux",
        (4, -0.1, 0.1),
        (4, -0.1, 0.1),
        (8, 0.0, 10.0),
        &EnergyBinning::Logarithmic {
            n: 6,
            lo: 1e-3,
            hi: 1e3,
        },
    )
    .expect("valid axes")
}

/// Fill `h` with `n` LCG events from `seed`; some are out of range on
/// purpose (x stretched beyond the axis) to exercise the drop path.
fn fill_events(h: &mut Hist4D, seed: u64, n: u64) {
    let mut rng = LcgRng::new(seed);
    for _ in 0..n {
        let x = 0.3 * (rng.uniform() - 0.5); // ~33% outside [-0.1, 0.1)
        let y = 0.2 * (rng.uniform() - 0.5);
        let z = 10.0 * rng.uniform();
        let e = 1e-3 * 1e6_f64.powf(rng.uniform()); // log-uniform over the axis
        h.fill(x, y, z, e);
    }
}

fn main() {
    println!("═══════════════════════════════════════════════════════════");
    println!("  beamhist 4D histogram validation");
    println!("  Reference: direct indexing + sequential/parallel parity");
    println!("═══════════════════════════════════════════════════════════\n");

    let mut harness = ValidationHarness::new("hist4d");

    // ─── Fill/read round-trip ─────────────────────────────────────
    println!("── Fill/read round-trip ──");
    {
        let mut h = Hist4D::new(
            "unit",
            "",
            (2, 0.0, 2.0),
            (2, 0.0, 2.0),
            (2, 0.0, 2.0),
            &EnergyBinning::Linear {
                n: 2,
                lo: 0.0,
                hi: 2.0,
            },
        )
        .expect("valid axes");
        h.fill(0.5, 0.5, 0.5, 0.5);
        harness.check_abs(
            "filled bin reads 1",
            h.at(0, 0, 0, 0).expect("in range"),
            1.0,
            tolerances::EXACT_F64,
        );
        harness.check_abs("total content 1", h.sum(), 1.0, tolerances::EXACT_F64);
        harness.check_bool("indexed read past axis fails", h.at(2, 0, 0, 0).is_err());
    }

    // ─── Out-of-range fills drop ──────────────────────────────────
    println!("\n── Out-of-range fills drop ──");
    {
        let mut h = flux_hist("drop");
        fill_events(&mut h, 7, 1000);
        let checksum = h.sum();
        h.fill(0.5, 0.0, 5.0, 1.0); // x beyond [-0.1, 0.1)
        h.fill(0.0, 0.0, 5.0, 1e4); // e beyond the log axis
        h.fill(0.0, 0.0, 10.0, 1.0); // z on the excluded upper edge
        harness.check_abs(
            "checksum unchanged by out-of-range fills",
            h.sum(),
            checksum,
            tolerances::EXACT_F64,
        );
        harness.check_upper("some events dropped in range fill", checksum, 1000.0);
    }

    // ─── Energy-axis variants ─────────────────────────────────────
    println!("\n── Energy-axis variants ──");
    {
        let h = flux_hist("log");
        // ln-spaced decades: 1e-3..1e3 over 6 bins
        harness.check_abs(
            "log axis second edge",
            h.axis(3).edges()[1],
            1e-2,
            tolerances::EXACT_F64,
        );
        harness.check_bool(
            "log axis rejects lo=0",
            Hist4D::new(
                "bad",
                "",
                (1, 0.0, 1.0),
                (1, 0.0, 1.0),
                (1, 0.0, 1.0),
                &EnergyBinning::Logarithmic {
                    n: 2,
                    lo: 0.0,
                    hi: 1.0,
                },
            )
            .is_err(),
        );

        let mut v = Hist4D::new(
            "var",
            "",
            (1, 0.0, 1.0),
            (1, 0.0, 1.0),
            (1, 0.0, 1.0),
            &EnergyBinning::Edges(vec![0.0, 0.1, 1.0, 10.0]),
        )
        .expect("valid edges");
        v.fill(0.5, 0.5, 0.5, 0.05);
        v.fill(0.5, 0.5, 0.5, 3.0);
        harness.check_abs(
            "variable axis routes to first bin",
            v.at(0, 0, 0, 0).expect("in range"),
            1.0,
            tolerances::EXACT_F64,
        );
        harness.check_abs(
            "variable axis routes to last bin",
            v.at(0, 0, 0, 2).expect("in range"),
            1.0,
            tolerances::EXACT_F64,
        );
        harness.check_bool(
            "non-increasing edges rejected",
            Hist4D::new(
                "bad",
                "",
                (1, 0.0, 1.0),
                (1, 0.0, 1.0),
                (1, 0.0, 1.0),
                &EnergyBinning::Edges(vec![0.0, 1.0, 1.0]),
            )
            .is_err(),
        );
    }

    // ─── Worker-merge parity ──────────────────────────────────────
    const N_WORKERS: u64 = 8;
    const EVENTS_PER_WORKER: u64 = 5_000;
    println!("\n── Worker-merge parity: {N_WORKERS} workers × {EVENTS_PER_WORKER} events ──");
    {
        // Each worker owns an independent histogram over a disjoint seed
        // range; the merge afterward is the single sequential step.
        let partials: Vec<Hist4D> = (0..N_WORKERS)
            .into_par_iter()
            .map(|w| {
                let mut h = flux_hist("partial");
                fill_events(&mut h, w * EVENTS_PER_WORKER, EVENTS_PER_WORKER);
                h
            })
            .collect();

        let mut merged = flux_hist("merged");
        for partial in &partials {
            merged.accumulate(partial).expect("identical axes");
        }

        let mut sequential = flux_hist("sequential");
        for w in 0..N_WORKERS {
            fill_events(&mut sequential, w * EVENTS_PER_WORKER, EVENTS_PER_WORKER);
        }

        harness.check_rel(
            "merged total = sequential total",
            merged.sum(),
            sequential.sum(),
            tolerances::MERGE_REL,
        );

        let (nx, ny, nz, ne) = merged.n_bins();
        let mut max_bin_diff = 0.0_f64;
        for ix in 0..nx {
            for iy in 0..ny {
                for iz in 0..nz {
                    for ie in 0..ne {
                        let a = merged.at(ix, iy, iz, ie).expect("in range");
                        let b = sequential.at(ix, iy, iz, ie).expect("in range");
                        max_bin_diff = max_bin_diff.max((a - b).abs());
                    }
                }
            }
        }
        harness.check_abs(
            "bin-wise parity",
            max_bin_diff,
            0.0,
            tolerances::EXACT_F64,
        );

        let mut target = flux_hist("other");
        harness.check_bool(
            "shape mismatch rejected",
            target.accumulate(&Hist4D::default()).is_err(),
        );
    }

    harness.finish();
}
