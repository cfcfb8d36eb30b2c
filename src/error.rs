// SPDX-License-Identifier: AGPL-3.0-only

//! Typed errors for spectrum and histogram operations.
//!
//! Replaces `Result<_, String>` in public APIs with a proper enum so callers
//! can pattern-match on failure modes (missing species key, out-of-range bin
//! index, invalid axis construction) rather than parsing opaque strings.

use std::fmt;

/// Errors arising from spectrum access, histogram indexing, or axis construction.
#[derive(Debug, Clone, PartialEq)]
pub enum BeamHistError {
    /// Checked read of a PDG code absent from a spectrum's key set.
    MissingSpecies(i64),

    /// Indexed bin access outside an axis ("x", "y", "z", or "e").
    BinOutOfRange {
        /// Axis label the index targeted.
        axis: &'static str,
        /// Offending zero-based bin index.
        index: usize,
        /// Number of bins on that axis.
        bins: usize,
    },

    /// Invalid axis parameters at construction (wraps the reason).
    InvalidAxis(String),

    /// Cross-histogram merge between incompatible axis definitions.
    ShapeMismatch(String),
}

impl fmt::Display for BeamHistError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingSpecies(pdg) => {
                write!(f, "PDG code {pdg} not in spectrum key set")
            }
            Self::BinOutOfRange { axis, index, bins } => {
                write!(f, "Bin index {index} out of range on {axis} axis ({bins} bins)")
            }
            Self::InvalidAxis(msg) => write!(f, "Invalid axis definition: {msg}"),
            Self::ShapeMismatch(msg) => write!(f, "Histogram shapes differ: {msg}"),
        }
    }
}

impl std::error::Error for BeamHistError {}
