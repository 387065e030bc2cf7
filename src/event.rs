//! This module defines the properties and storage of analysed events
//!
//! An `AnalysisEvent` is built fresh from the event source for every entry
//! and owns all of its data. Parallel per-daughter and per-candidate input
//! lists are zipped into vectors of structs when the event is built, so the
//! "same length" invariant of the input holds by construction here.

#![allow(missing_docs)]

use crate::{
    constants::NEUTRAL_CURRENT,
    error::{Error, Result},
    numeric::{Float, Momentum, Position},
};

/// Nature of the weak current exchanged in the neutrino interaction
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CurrentType {
    /// W boson exchange
    Charged,
    /// Z boson exchange
    Neutral,
}
//
impl CurrentType {
    /// Decode the generator's current code
    ///
    /// Only the neutral current code is singled out, anything else (including
    /// the bogus values found in non-simulated events) reads as charged.
    pub fn from_code(code: i32) -> Self {
        if code == NEUTRAL_CURRENT {
            Self::Neutral
        } else {
            Self::Charged
        }
    }
}

/// Simulated neutrino interaction
#[derive(Clone, Debug, PartialEq)]
pub struct NeutrinoTruth {
    /// PDG code of the incoming neutrino (signed)
    pub pdg: i32,

    /// Interaction vertex (cm)
    pub vertex: Position,

    /// Neutrino energy (GeV)
    pub energy: Float,

    /// Weak current type
    pub current: CurrentType,

    /// Generator interaction mode (0 = QE, 1 = RES, 10 = MEC, ...)
    pub interaction: i32,

    /// Hadronic invariant mass W (GeV)
    pub w: Float,

    /// Bjorken x
    pub x: Float,

    /// Inelasticity y
    pub y: Float,

    /// Squared four-momentum transfer Q² (GeV²)
    pub q2: Float,
}

/// Strange particle content of the simulated final state
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct StrangeContent {
    pub has_lambda: bool,
    pub has_sigma_plus: bool,
    pub has_sigma_minus: bool,
    pub has_sigma_zero: bool,
    pub num_kshort: u32,
}

/// Simulated final-state particle
#[derive(Clone, Debug, PartialEq)]
pub struct TruthDaughter {
    /// PDG code
    pub pdg: i32,

    /// Energy (GeV) and momentum (GeV/c)
    pub energy: Float,
    pub momentum: Momentum,
}

/// Simulated charged track of the signal block (muon or decay pion)
#[derive(Clone, Debug, PartialEq)]
pub struct TruthTrack {
    /// Simulation track identifier, as used by backtracking
    pub track_id: i32,

    /// Start and end positions (cm)
    pub start: Position,
    pub end: Position,

    /// Energy (GeV) and momentum (GeV/c)
    pub energy: Float,
    pub momentum: Momentum,

    /// Number of elastic and inelastic rescatters
    pub num_elastic: u32,
    pub num_inelastic: u32,

    /// Geant4 process which ended the track
    pub end_process: String,
}

/// Simulated K⁰_S → π⁺π⁻ decay
#[derive(Clone, Debug, PartialEq)]
pub struct KShortDecay {
    /// Total K⁰_S energy (GeV)
    pub total_energy: Float,

    /// Distance between the neutrino vertex and the decay point (cm)
    pub end_separation: Float,

    /// Decay point (cm)
    pub decay_vertex: Position,

    pub piplus: TruthTrack,
    pub piminus: TruthTrack,
}

/// Truth particle hypotheses of the signal topology
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Hypothesis {
    Muon,
    PiPlus,
    PiMinus,
}
//
impl Hypothesis {
    /// All hypotheses, in reporting order
    pub const ALL: [Self; 3] = [Self::Muon, Self::PiPlus, Self::PiMinus];

    /// Short human-readable name
    pub fn label(self) -> &'static str {
        match self {
            Self::Muon => "muon",
            Self::PiPlus => "pion-plus",
            Self::PiMinus => "pion-minus",
        }
    }
}

/// Purity and completeness of a candidate with respect to a truth particle
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct PurityCompleteness {
    /// Fraction of the candidate's energy coming from the truth particle
    pub purity: Float,

    /// Fraction of the truth particle's energy captured by the candidate
    pub completeness: Float,
}
//
impl PurityCompleteness {
    /// Build a purity/completeness pair
    pub fn new(purity: Float, completeness: Float) -> Self {
        Self {
            purity,
            completeness,
        }
    }

    /// Distance from the origin of the purity/completeness plane
    pub fn distance(&self) -> Float {
        self.purity.hypot(self.completeness)
    }
}

/// Per-hypothesis purity/completeness of a candidate
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct HypothesisScores {
    pub muon: PurityCompleteness,
    pub piplus: PurityCompleteness,
    pub piminus: PurityCompleteness,
}
//
impl HypothesisScores {
    /// Scores against a given truth hypothesis
    pub fn get(&self, hypothesis: Hypothesis) -> PurityCompleteness {
        match hypothesis {
            Hypothesis::Muon => self.muon,
            Hypothesis::PiPlus => self.piplus,
            Hypothesis::PiMinus => self.piminus,
        }
    }
}

/// Truth particle that a candidate was backtracked to
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Backtrack {
    pub pdg: i32,
    pub track_id: i32,
    pub energy: Float,
    pub purity: Float,
    pub completeness: Float,
}

/// Track fit of a candidate
#[derive(Clone, Debug, PartialEq)]
pub struct TrackFit {
    /// Start and end positions (cm)
    pub start: Position,
    pub end: Position,

    /// Track length (cm)
    pub length: Float,

    /// Momentum estimated from range under the muon hypothesis (GeV/c)
    pub range_momentum_muon: Float,
}

/// Reconstructed particle-flow candidate
#[derive(Clone, Debug, PartialEq)]
pub struct PfpCandidate {
    /// Reconstructed PDG code (13 for track-like, 11 for shower-like)
    pub pdg: i32,

    /// Number of hits in the candidate
    pub num_hits: u32,

    /// Track-like-ness score, between 0 and 1
    pub track_score: Float,

    /// Backtracked truth particle, if any
    pub backtrack: Option<Backtrack>,

    /// Purity and completeness against the signal truth particles
    pub scores: HypothesisScores,

    /// Track fit, if one was performed
    pub track: Option<TrackFit>,
}

/// Event-level reconstruction output
#[derive(Clone, Debug, PartialEq)]
pub struct RecoSummary {
    /// Neutrino-versus-cosmic topological score, between 0 and 1
    pub topological_score: Float,

    /// Reconstructed neutrino vertex (cm)
    pub vertex: Position,

    pub num_pf_particles: u32,
    pub num_tracks: u32,
    pub num_showers: u32,
}

/// Canonical record of one ntuple entry
#[derive(Clone, Debug, PartialEq)]
pub struct AnalysisEvent {
    pub run: u32,
    pub subrun: u32,
    pub event: u32,

    /// Simulated neutrino interaction
    pub truth: NeutrinoTruth,

    /// Simulated strange particle content
    pub strangeness: StrangeContent,

    /// Simulated final-state particles
    pub daughters: Vec<TruthDaughter>,

    /// Simulated muon, if the event has one
    pub muon: Option<TruthTrack>,

    /// Simulated K⁰_S decay, if it is the pionic one
    pub kshort: Option<KShortDecay>,

    /// Event-level reconstruction output
    pub reco: RecoSummary,

    /// Particle-flow candidates
    pub candidates: Vec<PfpCandidate>,
}
//
impl AnalysisEvent {
    /// Access a particle-flow candidate
    pub fn candidate(&self, index: usize) -> Result<&PfpCandidate> {
        self.candidates.get(index).ok_or(Error::CandidateOutOfRange {
            index,
            len: self.candidates.len(),
        })
    }

    /// Truth that the event holds both a muon and a K⁰_S → π⁺π⁻ decay
    pub fn is_true_signal(&self) -> bool {
        self.muon.is_some() && self.kshort.is_some()
    }

    /// Truth-level track of a signal hypothesis, if simulated
    pub fn truth_track(&self, hypothesis: Hypothesis) -> Option<&TruthTrack> {
        match hypothesis {
            Hypothesis::Muon => self.muon.as_ref(),
            Hypothesis::PiPlus => self.kshort.as_ref().map(|k| &k.piplus),
            Hypothesis::PiMinus => self.kshort.as_ref().map(|k| &k.piminus),
        }
    }

    /// Derived truth kinematics of the signal topology
    pub fn kinematics(&self) -> Option<SignalKinematics> {
        let muon = self.muon.as_ref()?;
        let kshort = self.kshort.as_ref()?;
        Some(SignalKinematics {
            muon_momentum: muon.momentum.norm(),
            piplus_momentum: kshort.piplus.momentum.norm(),
            piminus_momentum: kshort.piminus.momentum.norm(),
            opening_angle: kshort.piplus.momentum.angle(&kshort.piminus.momentum),
            kshort_energy: kshort.total_energy,
            kshort_separation: kshort.end_separation,
            neutrino_energy: self.truth.energy,
            w: self.truth.w,
            x: self.truth.x,
            y: self.truth.y,
            q2: self.truth.q2,
        })
    }
}

/// Truth kinematic scalars of a signal event
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SignalKinematics {
    /// Momentum magnitudes (GeV/c)
    pub muon_momentum: Float,
    pub piplus_momentum: Float,
    pub piminus_momentum: Float,

    /// Angle between the two decay pions (rad)
    pub opening_angle: Float,

    /// K⁰_S energy (GeV) and decay distance (cm)
    pub kshort_energy: Float,
    pub kshort_separation: Float,

    /// Neutrino energy (GeV) and interaction kinematics, as in `NeutrinoTruth`
    pub neutrino_energy: Float,
    pub w: Float,
    pub x: Float,
    pub y: Float,
    pub q2: Float,
}
