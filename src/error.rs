//! Data-integrity errors raised by the event record and the selection

use thiserror::Error;

/// Violation of the event record's structural invariants
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// Two parallel lists of the same index space have different lengths
    #[error("list `{list}` has {found} entries, expected {expected} like `{reference}`")]
    LengthMismatch {
        /// Name of the offending list
        list: &'static str,
        /// Name of the list whose length is taken as reference
        reference: &'static str,
        /// Length of the reference list
        expected: usize,
        /// Length of the offending list
        found: usize,
    },

    /// A particle-flow candidate index points past the end of the list
    #[error("candidate index {index} is out of range ({len} candidates)")]
    CandidateOutOfRange {
        /// Requested index
        index: usize,
        /// Number of candidates in the event
        len: usize,
    },
}

/// Result type of the analysis core
pub type Result<T> = std::result::Result<T, Error>;
