//! Ordered selection pipeline, turning predicates into cut flags
//!
//! Every cut is evaluated for every event, even after an earlier one has
//! failed, so that both individual and cumulative pass counts can be derived
//! from the flags. The cut order below is the order of the cut-flow tables.

use crate::{
    category::{Classifier, EventCategory},
    error::Result,
    evcut::SelectionCuts,
    event::AnalysisEvent,
    geometry::{Containment, FiducialVolume},
    matching::{distinct_candidates, HypothesisMatches, MatchStrategy},
};

use std::fmt::{self, Display};

/// Number of cuts in the pipeline
pub const NUM_CUTS: usize = 8;

/// Named cuts, in evaluation order
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Cut {
    /// Reconstructed vertex inside the fiducial volume
    RecoVertexInFv,
    /// Neutrino-like topological score
    TopologicalScore,
    /// A truth-matched, track-like muon candidate exists
    MuonCandidate,
    /// Muon track starts and ends inside the fiducial volume
    MuonContained,
    /// Muon track is long enough and attached to the vertex
    MuonQuality,
    /// Muon range momentum inside the analysis window
    MuonMomentum,
    /// Both decay pions are matched to a track-like candidate
    DecayPionsMatched,
    /// Muon and pion candidates are three different candidates
    DistinctCandidates,
}
//
impl Cut {
    /// All cuts, in evaluation order
    pub const ALL: [Self; NUM_CUTS] = [
        Self::RecoVertexInFv,
        Self::TopologicalScore,
        Self::MuonCandidate,
        Self::MuonContained,
        Self::MuonQuality,
        Self::MuonMomentum,
        Self::DecayPionsMatched,
        Self::DistinctCandidates,
    ];

    /// Position of the cut in the pipeline
    pub fn index(self) -> usize {
        self as usize
    }

    /// Name used in reports
    pub fn name(self) -> &'static str {
        match self {
            Self::RecoVertexInFv => "reco_vertex_in_fv",
            Self::TopologicalScore => "topological_score",
            Self::MuonCandidate => "muon_candidate",
            Self::MuonContained => "muon_contained",
            Self::MuonQuality => "muon_quality",
            Self::MuonMomentum => "muon_momentum",
            Self::DecayPionsMatched => "decay_pions_matched",
            Self::DistinctCandidates => "distinct_candidates",
        }
    }
}
//
impl Display for Cut {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(fmt, "{}", self.name())
    }
}

/// Outcome of every cut for one event
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CutFlags([bool; NUM_CUTS]);
//
impl CutFlags {
    /// Record the outcome of a cut
    pub fn set(&mut self, cut: Cut, passed: bool) {
        self.0[cut.index()] = passed;
    }

    /// Outcome of a cut, regardless of the other cuts
    pub fn passed(&self, cut: Cut) -> bool {
        self.0[cut.index()]
    }

    /// Truth that the event passes this cut and all the cuts before it
    pub fn passed_up_to(&self, cut: Cut) -> bool {
        self.0[..=cut.index()].iter().all(|&passed| passed)
    }

    /// First cut which the event fails, if any
    pub fn first_failed(&self) -> Option<Cut> {
        Cut::ALL.into_iter().find(|&cut| !self.passed(cut))
    }

    /// Truth that every cut passed
    pub fn all_passed(&self) -> bool {
        self.0.iter().all(|&passed| passed)
    }
}

/// Result of running the selection on one event
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SelectionOutcome {
    /// Outcome of each cut
    pub flags: CutFlags,

    /// Selected muon candidate, if any
    pub muon_candidate: Option<usize>,

    /// Truth-matched candidate per hypothesis, for diagnostics
    pub matches: HypothesisMatches,
}
//
impl SelectionOutcome {
    /// Overall decision (logical AND of all cuts)
    pub fn selected(&self) -> bool {
        self.flags.all_passed()
    }

    /// Cut at which the event was rejected, if it was
    pub fn first_failed_cut(&self) -> Option<Cut> {
        self.flags.first_failed()
    }
}

/// Event selection, for a given choice of fiducial volume and matching rule
pub struct Selection {
    /// Thresholds of the predicates
    cuts: SelectionCuts,

    /// Fiducial volume of the reconstructed vertex and muon track
    volume: Box<dyn Containment + Send + Sync>,

    /// How decay pions are associated with candidates
    strategy: MatchStrategy,
}
//
impl Selection {
    /// Set up the selection
    pub fn new(cuts: SelectionCuts, volume: FiducialVolume, strategy: MatchStrategy) -> Self {
        Self {
            cuts,
            volume: volume.build(),
            strategy,
        }
    }

    /// Thresholds of the predicates
    pub fn cuts(&self) -> &SelectionCuts {
        &self.cuts
    }

    /// Run every cut on an event
    ///
    /// Cuts which depend on a missing muon candidate fail rather than being
    /// skipped.
    pub fn evaluate(&self, event: &AnalysisEvent) -> Result<SelectionOutcome> {
        let cuts = &self.cuts;
        let volume = &*self.volume;
        let mut flags = CutFlags::default();

        flags.set(Cut::RecoVertexInFv, cuts.reco_vertex_in_fv(event, volume));
        flags.set(Cut::TopologicalScore, cuts.passes_topological_score(event));

        let muon_candidate = cuts.muon_candidate(event)?;
        let muon = muon_candidate
            .map(|index| event.candidate(index))
            .transpose()?;
        flags.set(Cut::MuonCandidate, muon.is_some());
        flags.set(
            Cut::MuonContained,
            muon.map_or(false, |muon| cuts.muon_contained(muon, volume)),
        );
        flags.set(
            Cut::MuonQuality,
            muon.map_or(false, |muon| cuts.muon_quality_ok(event, muon)),
        );
        flags.set(
            Cut::MuonMomentum,
            muon.and_then(|muon| muon.track.as_ref())
                .map_or(false, |track| cuts.muon_in_momentum_range(track.range_momentum_muon)),
        );

        let matches = self.strategy.match_all(event);
        let (piplus, piminus) = (matches.piplus, matches.piminus);
        let mut pions_are_tracks = true;
        for index in [piplus, piminus].into_iter().flatten() {
            pions_are_tracks &= cuts.is_track(event.candidate(index)?);
        }
        flags.set(
            Cut::DecayPionsMatched,
            piplus.is_some() && piminus.is_some() && pions_are_tracks,
        );
        flags.set(
            Cut::DistinctCandidates,
            distinct_candidates(muon_candidate, piplus, piminus),
        );

        Ok(SelectionOutcome {
            flags,
            muon_candidate,
            matches,
        })
    }
}

/// Everything the reporting layer needs to know about one event
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EventSummary {
    /// Truth category
    pub category: EventCategory,

    /// Selection result
    pub outcome: SelectionOutcome,
}

/// Classification and selection of events
pub struct Analysis {
    /// Truth categorization
    pub classifier: Classifier,

    /// Reconstruction-level selection
    pub selection: Selection,
}
//
impl Analysis {
    /// Classify and select one event
    pub fn process(&self, event: &AnalysisEvent) -> Result<EventSummary> {
        Ok(EventSummary {
            category: self.classifier.classify(&event.truth),
            outcome: self.selection.evaluate(event)?,
        })
    }
}
