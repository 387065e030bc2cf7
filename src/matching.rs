//! Association of reconstructed candidates with the truth signal particles

use crate::{
    event::{AnalysisEvent, Hypothesis, PfpCandidate, PurityCompleteness},
    numeric::Float,
};

use std::fmt::{self, Display};

/// Region of the purity/completeness plane where a candidate counts as a
/// reconstruction of the truth particle
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AcceptanceRegion {
    /// Minimal purity
    pub min_purity: Float,

    /// Minimal completeness
    pub min_completeness: Float,

    /// Whether pairs sitting on the bounds are rejected
    pub strict: bool,
}
//
impl AcceptanceRegion {
    /// Region used by the event selection and efficiency studies
    pub const SELECTION: Self = Self::new(0.5, 0.1);

    /// Region counting well-matched best candidates (bounds excluded)
    pub const BEST_MATCH: Self = Self::strict(0.5, 0.1);

    /// Tight region used to quote well-reconstructed muons (bounds excluded)
    pub const MUON_DIAGNOSTIC: Self = Self::strict(0.75, 0.9);

    /// Build a region whose bounds are inclusive
    pub const fn new(min_purity: Float, min_completeness: Float) -> Self {
        Self {
            min_purity,
            min_completeness,
            strict: false,
        }
    }

    /// Build a region whose bounds are exclusive
    pub const fn strict(min_purity: Float, min_completeness: Float) -> Self {
        Self {
            min_purity,
            min_completeness,
            strict: true,
        }
    }

    /// Truth that a purity/completeness pair lies inside the region
    pub fn accepts(&self, pc: PurityCompleteness) -> bool {
        if self.strict {
            pc.purity > self.min_purity && pc.completeness > self.min_completeness
        } else {
            pc.purity >= self.min_purity && pc.completeness >= self.min_completeness
        }
    }
}
//
impl Display for AcceptanceRegion {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        let op = if self.strict { ">" } else { ">=" };
        write!(
            fmt,
            "purity {op} {}, completeness {op} {}",
            self.min_purity, self.min_completeness
        )
    }
}

/// Rule used to pick the candidate reconstructing a truth particle
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum MatchStrategy {
    /// Candidate with the most hits among those backtracked to the truth
    /// particle, provided it has more than `min_hits` hits
    HitCount {
        /// Noise floor on the candidate's hit count (exclusive)
        min_hits: u32,
    },

    /// Candidate furthest from the origin of the purity/completeness plane,
    /// provided it lies in the acceptance region
    Distance(AcceptanceRegion),

    /// First candidate lying in the acceptance region
    FirstAccepted(AcceptanceRegion),
}
//
impl MatchStrategy {
    /// Index of the candidate matching a truth hypothesis, if any
    ///
    /// Events where the truth particle was not simulated never match.
    pub fn best_match(&self, event: &AnalysisEvent, hypothesis: Hypothesis) -> Option<usize> {
        match *self {
            Self::HitCount { min_hits } => hit_count_match(event, hypothesis, min_hits),
            Self::Distance(region) => best_by_distance(event, hypothesis)
                .filter(|&(_, pc)| region.accepts(pc))
                .map(|(index, _)| index),
            Self::FirstAccepted(region) => first_accepted(event, hypothesis, region),
        }
    }

    /// Match all three signal hypotheses
    pub fn match_all(&self, event: &AnalysisEvent) -> HypothesisMatches {
        HypothesisMatches {
            muon: self.best_match(event, Hypothesis::Muon),
            piplus: self.best_match(event, Hypothesis::PiPlus),
            piminus: self.best_match(event, Hypothesis::PiMinus),
        }
    }
}

/// Candidate with the most hits among those backtracked to a truth track
///
/// Returns its index alongside the candidate. On equal hit counts, the first
/// candidate wins.
pub fn best_by_hits(event: &AnalysisEvent, track_id: i32) -> Option<(usize, &PfpCandidate)> {
    let mut best: Option<(usize, &PfpCandidate)> = None;
    for (index, candidate) in event.candidates.iter().enumerate() {
        let Some(backtrack) = candidate.backtrack else {
            continue;
        };
        if backtrack.track_id != track_id {
            continue;
        }
        if best.map_or(true, |(_, best)| candidate.num_hits > best.num_hits) {
            best = Some((index, candidate));
        }
    }
    best
}

/// Best backtracked candidate of a truth hypothesis, above a hit floor
pub fn hit_count_match(event: &AnalysisEvent, hypothesis: Hypothesis, min_hits: u32) -> Option<usize> {
    let track = event.truth_track(hypothesis)?;
    best_by_hits(event, track.track_id)
        .filter(|(_, candidate)| candidate.num_hits > min_hits)
        .map(|(index, _)| index)
}

/// Candidate whose purity/completeness against a hypothesis is furthest
/// from the origin
///
/// Candidates at the origin never match. On equal distances, the first
/// candidate wins.
pub fn best_by_distance(
    event: &AnalysisEvent,
    hypothesis: Hypothesis,
) -> Option<(usize, PurityCompleteness)> {
    event.truth_track(hypothesis)?;
    let mut best: Option<(usize, PurityCompleteness)> = None;
    let mut max_distance = 0.;
    for (index, candidate) in event.candidates.iter().enumerate() {
        let pc = candidate.scores.get(hypothesis);
        let distance = pc.distance();
        if distance > max_distance {
            max_distance = distance;
            best = Some((index, pc));
        }
    }
    best
}

/// First candidate whose purity/completeness lies in the acceptance region
pub fn first_accepted(
    event: &AnalysisEvent,
    hypothesis: Hypothesis,
    region: AcceptanceRegion,
) -> Option<usize> {
    event.truth_track(hypothesis)?;
    event
        .candidates
        .iter()
        .position(|candidate| region.accepts(candidate.scores.get(hypothesis)))
}

/// Matched candidate index per truth hypothesis (`None` when unmatched)
#[allow(missing_docs)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct HypothesisMatches {
    pub muon: Option<usize>,
    pub piplus: Option<usize>,
    pub piminus: Option<usize>,
}
//
impl HypothesisMatches {
    /// Match of a given hypothesis
    pub fn get(&self, hypothesis: Hypothesis) -> Option<usize> {
        match hypothesis {
            Hypothesis::Muon => self.muon,
            Hypothesis::PiPlus => self.piplus,
            Hypothesis::PiMinus => self.piminus,
        }
    }

    /// Truth that all three hypotheses are matched to different candidates
    pub fn all_distinct(&self) -> bool {
        distinct_candidates(self.muon, self.piplus, self.piminus)
    }
}

/// Truth that three candidate indices are all present and pairwise distinct
pub fn distinct_candidates(
    muon: Option<usize>,
    piplus: Option<usize>,
    piminus: Option<usize>,
) -> bool {
    match (muon, piplus, piminus) {
        (Some(mu), Some(pp), Some(pm)) => mu != pp && mu != pm && pp != pm,
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::{
        tests::{candidate, signal_event},
        Backtrack, PfpCandidate,
    };

    fn backtracked(track_id: i32, num_hits: u32) -> PfpCandidate {
        let mut cand = candidate(num_hits, 0.9);
        cand.backtrack = Some(Backtrack {
            pdg: 13,
            track_id,
            energy: 0.5,
            purity: 0.9,
            completeness: 0.8,
        });
        cand
    }

    fn scored(hypothesis: Hypothesis, purity: Float, completeness: Float) -> PfpCandidate {
        let mut cand = candidate(100, 0.9);
        let pc = PurityCompleteness::new(purity, completeness);
        match hypothesis {
            Hypothesis::Muon => cand.scores.muon = pc,
            Hypothesis::PiPlus => cand.scores.piplus = pc,
            Hypothesis::PiMinus => cand.scores.piminus = pc,
        }
        cand
    }

    #[test]
    fn acceptance_boundaries_are_inclusive() {
        let region = AcceptanceRegion::SELECTION;
        assert!(region.accepts(PurityCompleteness::new(0.5, 0.1)));
        assert!(!region.accepts(PurityCompleteness::new(0.49, 0.1)));
        assert!(!region.accepts(PurityCompleteness::new(0.5, 0.09)));
        assert!(!AcceptanceRegion::MUON_DIAGNOSTIC.accepts(PurityCompleteness::new(0.8, 0.85)));
    }

    #[test]
    fn diagnostic_boundaries_are_exclusive() {
        let best = AcceptanceRegion::BEST_MATCH;
        assert!(!best.accepts(PurityCompleteness::new(0.5, 0.6)));
        assert!(!best.accepts(PurityCompleteness::new(0.6, 0.1)));
        assert!(!best.accepts(PurityCompleteness::new(0.47, 0.5)));
        assert!(best.accepts(PurityCompleteness::new(0.51, 0.11)));

        let muon = AcceptanceRegion::MUON_DIAGNOSTIC;
        assert!(!muon.accepts(PurityCompleteness::new(0.75, 0.95)));
        assert!(!muon.accepts(PurityCompleteness::new(0.8, 0.9)));
        assert!(muon.accepts(PurityCompleteness::new(0.76, 0.91)));
    }

    #[test]
    fn region_display() {
        assert_eq!(
            AcceptanceRegion::MUON_DIAGNOSTIC.to_string(),
            "purity > 0.75, completeness > 0.9"
        );
        assert_eq!(
            AcceptanceRegion::SELECTION.to_string(),
            "purity >= 0.5, completeness >= 0.1"
        );
    }

    #[test]
    fn hit_count_prefers_most_hits_above_floor() {
        let mut event = signal_event();
        event.candidates = vec![backtracked(1, 40), backtracked(1, 60), backtracked(7, 500)];
        let strategy = MatchStrategy::HitCount { min_hits: 50 };
        assert_eq!(strategy.best_match(&event, Hypothesis::Muon), Some(1));

        event.candidates = vec![backtracked(1, 40), backtracked(1, 45), backtracked(7, 500)];
        let hits = |best: Option<(usize, &PfpCandidate)>| best.map(|(i, c)| (i, c.num_hits));
        assert_eq!(hits(best_by_hits(&event, 1)), Some((1, 45)));
        assert_eq!(strategy.best_match(&event, Hypothesis::Muon), None);
    }

    #[test]
    fn hit_count_ties_keep_first_candidate() {
        let mut event = signal_event();
        event.candidates = vec![candidate(80, 0.9), backtracked(1, 80), backtracked(1, 80)];
        assert_eq!(best_by_hits(&event, 1).map(|(index, _)| index), Some(1));
    }

    #[test]
    fn missing_truth_never_matches() {
        let mut event = signal_event();
        event.candidates = vec![backtracked(1, 100), scored(Hypothesis::Muon, 1., 1.)];
        event.muon = None;
        for strategy in [
            MatchStrategy::HitCount { min_hits: 50 },
            MatchStrategy::Distance(AcceptanceRegion::SELECTION),
            MatchStrategy::FirstAccepted(AcceptanceRegion::SELECTION),
        ] {
            assert_eq!(strategy.best_match(&event, Hypothesis::Muon), None);
        }
    }

    #[test]
    fn distance_strategy_picks_furthest_candidate() {
        let mut event = signal_event();
        event.candidates = vec![
            scored(Hypothesis::PiPlus, 0.6, 0.2),
            scored(Hypothesis::PiPlus, 0.55, 0.9),
            scored(Hypothesis::PiPlus, 0.3, 0.3),
        ];
        let (index, pc) = best_by_distance(&event, Hypothesis::PiPlus).unwrap();
        assert_eq!(index, 1);
        assert_eq!(pc, PurityCompleteness::new(0.55, 0.9));

        // First-accepted stops at the first candidate in the region instead
        let first = MatchStrategy::FirstAccepted(AcceptanceRegion::SELECTION);
        assert_eq!(first.best_match(&event, Hypothesis::PiPlus), Some(0));

        // The furthest candidate must still be accepted
        event.candidates = vec![scored(Hypothesis::PiPlus, 0.2, 0.95)];
        let distance = MatchStrategy::Distance(AcceptanceRegion::SELECTION);
        assert_eq!(distance.best_match(&event, Hypothesis::PiPlus), None);
        assert!(best_by_distance(&event, Hypothesis::PiPlus).is_some());
    }

    #[test]
    fn candidates_at_origin_never_match() {
        let mut event = signal_event();
        event.candidates = vec![candidate(100, 0.9), candidate(100, 0.9)];
        assert_eq!(best_by_distance(&event, Hypothesis::PiMinus), None);
    }

    #[test]
    fn identical_matches_are_not_distinct() {
        let mut event = signal_event();
        let mut cand = candidate(100, 0.9);
        cand.scores.muon = PurityCompleteness::new(0.9, 0.9);
        cand.scores.piplus = PurityCompleteness::new(0.9, 0.9);
        cand.scores.piminus = PurityCompleteness::new(0.9, 0.9);
        event.candidates = vec![cand];
        let matches = MatchStrategy::FirstAccepted(AcceptanceRegion::SELECTION).match_all(&event);
        assert_eq!(matches.muon, Some(0));
        assert_eq!(matches.piplus, Some(0));
        assert_eq!(matches.piminus, Some(0));
        assert!(!matches.all_distinct());
    }

    #[test]
    fn distinctness_requires_all_matches() {
        assert!(distinct_candidates(Some(0), Some(1), Some(2)));
        assert!(!distinct_candidates(Some(0), Some(1), Some(0)));
        assert!(!distinct_candidates(Some(2), Some(2), Some(1)));
        assert!(!distinct_candidates(None, Some(1), Some(2)));
    }
}
