//! Error types describing the failure modes of graph validation, sugar
//! detection, extraction, and pattern matching.
//!
//! Each variant wraps a more specific error that pinpoints the subsystem that
//! failed, so callers can recover or report richer diagnostics without losing
//! ergonomic `Result` signatures.

use thiserror::Error;

/// Root error emitted by every fallible top-level operation in this crate.
#[derive(Debug, Error)]
pub enum GlycosectorError {
    /// The input `MolecularGraph` failed structural validation before
    /// extraction could start.
    #[error("invalid input graph")]
    InvalidInput(#[from] GraphValidationError),

    /// Parsing a TOML settings payload did not succeed.
    #[error("failed to parse settings")]
    SettingsParse(#[from] toml::de::Error),

    /// The sugar detector could not complete its analysis of the input
    /// graph.
    #[error("sugar detection failed during '{step}' step")]
    DetectorFailure {
        /// Name of the detection step (e.g. "ring-perception" or
        /// "linear-chain-scan").
        step: String,
        /// Root detector error that triggered the failure.
        #[source]
        source: DetectorError,
    },

    /// A post-processing split routine could not match or apply its pattern.
    #[error("pattern match failed in post-processing splitter")]
    PatternMatchFailure(#[from] PatternMatchError),
}

/// Errors that describe structural or logical issues with the input
/// `MolecularGraph`.
///
/// These failures are detected before any chemical reasoning is attempted so
/// malformed inputs can be rejected early with precise diagnostics.
#[derive(Debug, Error)]
pub enum GraphValidationError {
    /// A bond references an atom handle that is missing from the graph.
    #[error("bond references a non-existent atom with id {atom_id}")]
    MissingAtom {
        /// Raw index of the atom that could not be found.
        atom_id: usize,
    },

    /// An atom is recorded as bonded to itself.
    #[error("atom with id {atom_id} is bonded to itself")]
    SelfBondingAtom {
        /// Raw index of the atom with the self-bond.
        atom_id: usize,
    },

    /// The same pair of atoms has more than one direct bond between them.
    #[error("atoms {atom_id_1} and {atom_id_2} already share a bond")]
    DuplicateBond {
        /// Raw index of the first atom.
        atom_id_1: usize,
        /// Raw index of the second atom.
        atom_id_2: usize,
    },
}

/// Errors raised while running the sugar pattern detector.
#[derive(Debug, Error)]
pub enum DetectorError {
    /// Smallest-set-of-smallest-rings perception did not converge to a
    /// consistent cycle basis.
    #[error("ring perception failed: {message}")]
    RingPerceptionFailed {
        /// Human-readable reason supplied by the ring-perception routine.
        message: String,
    },

    /// A candidate sugar ring or chain referenced an atom handle that was
    /// already removed from the working graph.
    #[error("sugar candidate references a missing atom with id {atom_id}")]
    MissingCandidateAtom {
        /// Raw index of the missing atom.
        atom_id: usize,
    },

    /// Catch-all variant for detector failures that do not fit the other
    /// buckets.
    #[error("an unexpected detector error occurred: {0}")]
    Other(String),
}

/// Error reported when a post-processing split routine's pattern cannot be
/// matched or safely applied.
#[derive(Debug, Error)]
pub enum PatternMatchError {
    /// The pattern's query graph could not be embedded in the candidate
    /// neighborhood at all.
    #[error("no match found for pattern '{pattern_name}' at atom id {anchor_atom_id}")]
    NoMatch {
        /// Name of the pattern being matched (e.g. `"ester"`).
        pattern_name: String,
        /// Raw index of the atom the match was attempted around.
        anchor_atom_id: usize,
    },

    /// A match was found but applying its rewrite would leave the graph in
    /// an inconsistent state (e.g. a boundary atom with no remaining bonds).
    #[error("applying pattern '{pattern_name}' at atom id {anchor_atom_id} would corrupt the graph: {reason}")]
    UnsafeApplication {
        /// Name of the pattern being matched.
        pattern_name: String,
        /// Raw index of the atom the match was attempted around.
        anchor_atom_id: usize,
        /// Human-readable reason the rewrite was refused.
        reason: String,
    },
}
