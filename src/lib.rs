// SPDX-License-Identifier: AGPL-3.0-only

//! beamhist — statistics core for beam-delivery Monte Carlo output
//!
//! Per-event particle spectra keyed by PDG code, an online mean/variance
//! accumulator over same-shaped spectra (Welford), and a dense 4D
//! histogram (x, y, z, energy) with a companion error histogram and
//! count-merge semantics for combining per-worker partials.
//!
//! ## Active modules
//!   - `spectrum` — sparse PDG-keyed weight/weight² bins (`ParticleSpectrum`)
//!   - `accumulator` — online mean/variance with standard-error finalization
//!   - `hist4d` — dense 4D histogram, linear/log/variable energy binning
//!   - `pdg` — PDG Monte Carlo particle numbering constants
//!   - `tolerances` — documented validation thresholds
//!
//! ## Validation binaries
//!   - `validate_accumulator` — closed-form Welford checks + Monte Carlo run
//!   - `validate_hist4d` — fill/merge/round-trip checks + worker-merge parity
//!
//! No internal concurrency: each instance is a single-threaded mutable
//! aggregate. Hosts that parallelize give each worker its own instance and
//! perform one sequential merge afterward.

pub mod accumulator;
pub mod error;
pub mod hist4d;
pub mod pdg;
pub mod spectrum;
pub mod tolerances;
pub mod validation;

pub use accumulator::{FinalBin, SpectrumAccumulator, SpectrumResult};
pub use error::BeamHistError;
pub use hist4d::{Axis, EnergyBinning, Hist4D};
pub use spectrum::{Bin, ParticleSpectrum};

/// Crate-wide result alias.
pub type Result<T> = std::result::Result<T, BeamHistError>;
