//! Physical constants and default analysis thresholds

#![allow(missing_docs)]

use crate::numeric::Float;

// PDG Monte Carlo particle codes
pub const ELECTRON_NEUTRINO: i32 = 12;
pub const MUON_NEUTRINO: i32 = 14;
pub const TAU_NEUTRINO: i32 = 16;

// Interaction codes, as written by the event generator
pub const NEUTRAL_CURRENT: i32 = 1;
pub const INTERACTION_QE: i32 = 0;
pub const INTERACTION_RES: i32 = 1;
pub const INTERACTION_MEC: i32 = 10;

/// Minimal topological score of a neutrino-like slice
pub const TOPO_SCORE_CUT: Float = 0.1;

/// Minimal track score of a track-like candidate
pub const TRACK_SCORE_CUT: Float = 0.5;

/// Minimal track score of a muon candidate
pub const MUON_TRACK_SCORE_CUT: Float = 0.8;

/// Minimal hit count of a backtracked muon candidate (exclusive)
pub const MUON_MIN_HITS: u32 = 50;

/// Maximal distance between the muon track start and the vertex (cm)
pub const MUON_VTX_DISTANCE_CUT: Float = 4.;

/// Minimal muon track length (cm)
pub const MUON_LENGTH_CUT: Float = 10.;

/// Muon momentum window (GeV/c)
pub const MUON_P_MIN_MOM_CUT: Float = 0.100;
pub const MUON_P_MAX_MOM_CUT: Float = 1.200;

