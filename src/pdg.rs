// SPDX-License-Identifier: AGPL-3.0-only

//! PDG Monte Carlo particle numbering scheme codes.
//!
//! The subset that beam-delivery spectra actually key on. Antiparticles
//! carry the negated code. Reference: PDG, "Monte Carlo particle numbering
//! scheme", Prog. Theor. Exp. Phys. 2022, 083C01 (§45).

pub const ELECTRON: i64 = 11;
pub const POSITRON: i64 = -11;
pub const ELECTRON_NEUTRINO: i64 = 12;
pub const MUON: i64 = 13;
pub const MUON_PLUS: i64 = -13;
pub const MUON_NEUTRINO: i64 = 14;
pub const PHOTON: i64 = 22;
pub const PION_ZERO: i64 = 111;
pub const PION_PLUS: i64 = 211;
pub const PION_MINUS: i64 = -211;
pub const PROTON: i64 = 2212;
pub const NEUTRON: i64 = 2112;
