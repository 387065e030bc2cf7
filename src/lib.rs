//! K⁰_S selection: event classification and selection for a muon-neutrino
//! charged-current search with a K⁰_S → π⁺π⁻ decay
//!
//!
//! # Introduction (for the physicist)
//!
//! The signal is a νμ charged-current interaction producing a muon and a
//! short-lived neutral kaon, which decays to a pair of charged pions. This
//! crate reads simulated and reconstructed liquid-argon TPC events, sorts them
//! into truth categories (signal by interaction mode, neutral current, out of
//! fiducial volume...), and runs a chain of selection cuts on their
//! reconstruction: vertex containment, topological score, a truth-matched
//! muon candidate, and two decay pions matched to distinct candidates.
//!
//! Alongside the selection, it measures how well the signal particles are
//! reconstructed at all, through purity/completeness studies of the
//! truth-matched candidates.
//!
//!
//! # Introduction (for the computer guy)
//!
//! The program is a straightforward pipeline:
//!
//! * read in the configuration and load the event file
//! * loop over events, in batches,
//!     * build the event record from the raw ntuple branches,
//!     * classify it from its truth information,
//!     * evaluate every selection cut,
//!     * accumulate cut flow and reconstruction diagnostics, including
//!       efficiencies binned in the truth kinematics
//! * then merge the batches, display and store the result.
//!
//! Batches can be processed in parallel with the `multi-threading` feature,
//! the results do not depend on it.

#![warn(missing_docs)]

pub mod analysis;
pub mod category;
pub mod config;
pub mod constants;
pub mod cutflow;
pub mod diagnostics;
pub mod efficiency;
pub mod error;
pub mod evcut;
pub mod event;
pub mod geometry;
pub mod matching;
pub mod numeric;
pub mod output;
pub mod reader;
pub mod scheduling;
pub mod selection;
