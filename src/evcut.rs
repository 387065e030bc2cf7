//! Elementary selection predicates on analysed events

use crate::{
    constants::{
        MUON_LENGTH_CUT, MUON_MIN_HITS, MUON_P_MAX_MOM_CUT, MUON_P_MIN_MOM_CUT,
        MUON_TRACK_SCORE_CUT, MUON_VTX_DISTANCE_CUT, TOPO_SCORE_CUT, TRACK_SCORE_CUT,
    },
    error::Result,
    event::{AnalysisEvent, Hypothesis, PfpCandidate},
    geometry::Containment,
    matching::{self, AcceptanceRegion},
    numeric::Float,
};

/// Thresholds of the selection predicates
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SelectionCuts {
    /// Cut on minimum topological score (exclusive)
    pub topo_score: Float,

    /// Cut on minimum track score of a track-like candidate (exclusive)
    pub track_score: Float,

    /// Cut on minimum track score of the muon candidate (exclusive)
    pub muon_track_score: Float,

    /// Cut on minimum hit count of the muon candidate (exclusive)
    pub muon_min_hits: u32,

    /// Cut on minimum muon track length in cm (exclusive)
    pub muon_length: Float,

    /// Cut on maximum distance between muon track start and vertex in cm
    /// (exclusive)
    pub muon_vtx_distance: Float,

    /// Lower bound of the muon momentum window in GeV/c (inclusive)
    pub muon_p_min: Float,

    /// Upper bound of the muon momentum window in GeV/c (inclusive)
    pub muon_p_max: Float,

    /// Purity/completeness region of truth-matched candidates
    pub acceptance: AcceptanceRegion,
}
//
impl Default for SelectionCuts {
    fn default() -> Self {
        Self {
            topo_score: TOPO_SCORE_CUT,
            track_score: TRACK_SCORE_CUT,
            muon_track_score: MUON_TRACK_SCORE_CUT,
            muon_min_hits: MUON_MIN_HITS,
            muon_length: MUON_LENGTH_CUT,
            muon_vtx_distance: MUON_VTX_DISTANCE_CUT,
            muon_p_min: MUON_P_MIN_MOM_CUT,
            muon_p_max: MUON_P_MAX_MOM_CUT,
            acceptance: AcceptanceRegion::SELECTION,
        }
    }
}
//
impl SelectionCuts {
    /// Check the reconstructed (not true) vertex against a fiducial volume
    pub fn reco_vertex_in_fv(&self, event: &AnalysisEvent, volume: &dyn Containment) -> bool {
        volume.contains(&event.reco.vertex)
    }

    /// Check that the event looks like a neutrino rather than a cosmic
    pub fn passes_topological_score(&self, event: &AnalysisEvent) -> bool {
        event.reco.topological_score > self.topo_score
    }

    /// Decide whether a candidate should be treated as a track
    pub fn is_track(&self, candidate: &PfpCandidate) -> bool {
        candidate.track_score > self.track_score
    }

    /// Find the muon candidate of an event
    ///
    /// This is the candidate with the most hits among those backtracked to the
    /// true muon. It only qualifies if it has enough hits and looks like a
    /// track. Events without a true muon have no muon candidate.
    pub fn muon_candidate(&self, event: &AnalysisEvent) -> Result<Option<usize>> {
        let Some(index) = matching::hit_count_match(event, Hypothesis::Muon, self.muon_min_hits)
        else {
            return Ok(None);
        };
        let candidate = event.candidate(index)?;
        Ok((candidate.track_score > self.muon_track_score).then_some(index))
    }

    /// Check that the muon track starts and ends inside a fiducial volume
    pub fn muon_contained(&self, candidate: &PfpCandidate, volume: &dyn Containment) -> bool {
        candidate
            .track
            .as_ref()
            .map_or(false, |track| volume.contains(&track.start) && volume.contains(&track.end))
    }

    /// Check that the muon track is long enough and attached to the vertex
    pub fn muon_quality_ok(&self, event: &AnalysisEvent, candidate: &PfpCandidate) -> bool {
        let Some(track) = &candidate.track else {
            return false;
        };
        let vtx_distance = (track.start - event.reco.vertex).norm();
        track.length > self.muon_length && vtx_distance < self.muon_vtx_distance
    }

    /// Check that a muon momentum falls in the analysis window
    pub fn muon_in_momentum_range(&self, momentum: Float) -> bool {
        (self.muon_p_min..=self.muon_p_max).contains(&momentum)
    }
}
