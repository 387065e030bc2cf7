//! Reconstruction quality studies on true signal events
//!
//! These accumulators answer "how well is the signal reconstructed" rather
//! than "is this event selected": they only look at events holding both a
//! true muon and a pionic K⁰_S decay, and they only use truth matching.
//!
//! The matching region and muon hit floor follow the selection cuts. The
//! regions that the best matches are checked against are fixed.

use crate::{
    constants::MUON_MIN_HITS,
    cutflow::ratio,
    efficiency::{EfficiencyHistogram, KinematicEfficiency, KinematicVariable},
    evcut::SelectionCuts,
    event::{AnalysisEvent, Hypothesis, PurityCompleteness},
    matching::{self, AcceptanceRegion, MatchStrategy},
    numeric::Float,
    scheduling::Merge,
};

/// Largest hit threshold of the muon hit scan
pub const HIT_SCAN_MAX: u32 = 500;

/// Step between hit thresholds of the muon hit scan
pub const HIT_SCAN_STEP: u32 = 10;

/// Number of thresholds of the muon hit scan
const NUM_HIT_THRESHOLDS: usize = (HIT_SCAN_MAX / HIT_SCAN_STEP) as usize + 1;

/// Hit threshold of the n-th scan point
fn hit_threshold(point: usize) -> u32 {
    point as u32 * HIT_SCAN_STEP
}

/// Binomial uncertainty of an efficiency measured on `total` trials
pub fn binomial_error(efficiency: Float, total: usize) -> Float {
    if total == 0 {
        0.
    } else {
        (efficiency * (1. - efficiency) / total as Float).sqrt()
    }
}

/// Reconstruction diagnostics, before finalization
#[derive(Clone, Debug, PartialEq)]
pub struct DiagnosticsAccumulator {
    /// Region used to match candidates to the signal particles
    acceptance: AcceptanceRegion,

    /// Hit-count muon matches need strictly more hits than this
    muon_min_hits: u32,

    /// Number of true signal events
    signal_events: usize,

    /// Events where each hypothesis has a first-accepted match
    matched: [usize; 3],

    /// Events where all three hypotheses match different candidates
    all_distinct: usize,

    /// Events where the furthest purity/completeness pair of each hypothesis
    /// lies in the best match region
    best_in_region: [usize; 3],

    /// Events where the hit-count muon match is well reconstructed
    muon_in_region: usize,

    /// Muons matched above each hit threshold
    scan_matched: [usize; NUM_HIT_THRESHOLDS],

    /// Backtracked purity sum of those matches
    scan_purity: [Float; NUM_HIT_THRESHOLDS],

    /// Backtracked completeness sum of those matches
    scan_completeness: [Float; NUM_HIT_THRESHOLDS],

    /// Distinct-match event efficiency against each kinematic variable, in
    /// the order of `KinematicVariable::ALL`
    kinematics: Vec<EfficiencyHistogram>,
}
//
impl Default for DiagnosticsAccumulator {
    fn default() -> Self {
        Self::new(AcceptanceRegion::SELECTION, MUON_MIN_HITS)
    }
}
//
impl DiagnosticsAccumulator {
    /// Prepare for diagnostics accumulation with given matching thresholds
    pub fn new(acceptance: AcceptanceRegion, muon_min_hits: u32) -> Self {
        Self {
            acceptance,
            muon_min_hits,
            signal_events: 0,
            matched: [0; 3],
            all_distinct: 0,
            best_in_region: [0; 3],
            muon_in_region: 0,
            scan_matched: [0; NUM_HIT_THRESHOLDS],
            scan_purity: [0.; NUM_HIT_THRESHOLDS],
            scan_completeness: [0.; NUM_HIT_THRESHOLDS],
            kinematics: KinematicVariable::ALL
                .iter()
                .map(|variable| EfficiencyHistogram::new(variable.binning().num_bins))
                .collect(),
        }
    }

    /// Prepare for diagnostics accumulation with the thresholds of a selection
    pub fn from_cuts(cuts: &SelectionCuts) -> Self {
        Self::new(cuts.acceptance, cuts.muon_min_hits)
    }

    /// Integrate one event, ignoring it unless it is a true signal event
    pub fn integrate(&mut self, event: &AnalysisEvent) {
        let Some(kinematics) = event.kinematics() else {
            return;
        };
        self.signal_events += 1;

        // Reconstruction efficiency
        let matches = MatchStrategy::FirstAccepted(self.acceptance).match_all(event);
        for (count, hypothesis) in self.matched.iter_mut().zip(Hypothesis::ALL) {
            *count += usize::from(matches.get(hypothesis).is_some());
        }
        let distinct = matches.all_distinct();
        self.all_distinct += usize::from(distinct);
        for (histogram, variable) in self.kinematics.iter_mut().zip(KinematicVariable::ALL) {
            let bin = variable.binning().locate(variable.value(&kinematics));
            histogram.fill(bin, distinct);
        }

        // Best purity/completeness pairs, candidates at the origin count as
        // unmatched
        for (count, hypothesis) in self.best_in_region.iter_mut().zip(Hypothesis::ALL) {
            let best = matching::best_by_distance(event, hypothesis)
                .map_or_else(PurityCompleteness::default, |(_, pc)| pc);
            *count += usize::from(AcceptanceRegion::BEST_MATCH.accepts(best));
        }

        // Hit-count muon matching, unmatched muons sit at the origin
        let Some(muon) = &event.muon else {
            return;
        };
        let best_muon = matching::best_by_hits(event, muon.track_id);
        let muon_pc = best_muon
            .filter(|(_, candidate)| candidate.num_hits > self.muon_min_hits)
            .and_then(|(_, candidate)| candidate.backtrack)
            .map_or_else(PurityCompleteness::default, |bt| {
                PurityCompleteness::new(bt.purity, bt.completeness)
            });
        self.muon_in_region += usize::from(AcceptanceRegion::MUON_DIAGNOSTIC.accepts(muon_pc));

        // Hit threshold scan
        let Some((_, candidate)) = best_muon else {
            return;
        };
        let Some(backtrack) = candidate.backtrack else {
            return;
        };
        for point in 0..NUM_HIT_THRESHOLDS {
            if candidate.num_hits > hit_threshold(point) {
                self.scan_matched[point] += 1;
                self.scan_purity[point] += backtrack.purity;
                self.scan_completeness[point] += backtrack.completeness;
            }
        }
    }

    /// Number of true signal events seen so far
    pub fn signal_events(&self) -> usize {
        self.signal_events
    }

    /// Compute efficiencies and fractions
    pub fn finalize(self) -> DiagnosticsReport {
        let total = self.signal_events;
        let per_hypothesis = |counts: [usize; 3]| -> Vec<(Hypothesis, Float)> {
            Hypothesis::ALL
                .into_iter()
                .zip(counts)
                .map(|(hypothesis, count)| (hypothesis, ratio(count, total)))
                .collect()
        };
        let hit_scan = (0..NUM_HIT_THRESHOLDS)
            .map(|point| {
                let matched = self.scan_matched[point];
                let efficiency = ratio(matched, total);
                let mean = |sum: Float| if matched == 0 { 0. } else { sum / matched as Float };
                HitScanPoint {
                    threshold: hit_threshold(point),
                    efficiency,
                    efficiency_error: binomial_error(efficiency, total),
                    mean_purity: mean(self.scan_purity[point]),
                    mean_completeness: mean(self.scan_completeness[point]),
                }
            })
            .collect();
        let kinematics = KinematicVariable::ALL
            .into_iter()
            .zip(&self.kinematics)
            .map(|(variable, histogram)| KinematicEfficiency {
                variable,
                bins: histogram.finalize(variable.binning()),
                outside: histogram.outside(),
            })
            .collect();
        DiagnosticsReport {
            acceptance: self.acceptance,
            muon_min_hits: self.muon_min_hits,
            signal_events: total,
            efficiencies: per_hypothesis(self.matched),
            event_efficiency: ratio(self.all_distinct, total),
            best_match_fractions: per_hypothesis(self.best_in_region),
            muon_region_fraction: ratio(self.muon_in_region, total),
            hit_scan,
            kinematics,
        }
    }
}
//
impl Merge for DiagnosticsAccumulator {
    fn merge(&mut self, other: Self) {
        debug_assert_eq!(self.acceptance, other.acceptance);
        debug_assert_eq!(self.muon_min_hits, other.muon_min_hits);
        self.signal_events += other.signal_events;
        self.all_distinct += other.all_distinct;
        self.muon_in_region += other.muon_in_region;
        for (mine, theirs) in [
            (&mut self.matched, &other.matched),
            (&mut self.best_in_region, &other.best_in_region),
        ] {
            mine.iter_mut().zip(theirs).for_each(|(m, t)| *m += t);
        }
        let scans = self.scan_matched.iter_mut().zip(&other.scan_matched);
        scans.for_each(|(m, t)| *m += t);
        for (mine, theirs) in [
            (&mut self.scan_purity, &other.scan_purity),
            (&mut self.scan_completeness, &other.scan_completeness),
        ] {
            mine.iter_mut().zip(theirs).for_each(|(m, t)| *m += t);
        }
        for (mine, theirs) in self.kinematics.iter_mut().zip(&other.kinematics) {
            mine.merge(theirs);
        }
    }
}

/// Point of the muon hit threshold scan
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct HitScanPoint {
    /// Muon matches need strictly more hits than this
    pub threshold: u32,

    /// Fraction of true muons matched above the threshold
    pub efficiency: Float,

    /// Binomial uncertainty on the efficiency
    pub efficiency_error: Float,

    /// Mean backtracked purity of the matches
    pub mean_purity: Float,

    /// Mean backtracked completeness of the matches
    pub mean_completeness: Float,
}

/// Finalized reconstruction diagnostics
#[derive(Clone, Debug, PartialEq)]
pub struct DiagnosticsReport {
    /// Region used to match candidates to the signal particles
    pub acceptance: AcceptanceRegion,

    /// Hit floor of the hit-count muon match
    pub muon_min_hits: u32,

    /// Number of true signal events
    pub signal_events: usize,

    /// Fraction of events where each hypothesis is reconstructed
    pub efficiencies: Vec<(Hypothesis, Float)>,

    /// Fraction of events where all three particles are reconstructed as
    /// three different candidates
    pub event_efficiency: Float,

    /// Fraction of events where the best purity/completeness pair of each
    /// hypothesis lies in `AcceptanceRegion::BEST_MATCH`
    pub best_match_fractions: Vec<(Hypothesis, Float)>,

    /// Fraction of events where the hit-count muon match lies in
    /// `AcceptanceRegion::MUON_DIAGNOSTIC`
    pub muon_region_fraction: Float,

    /// Muon hit threshold scan
    pub hit_scan: Vec<HitScanPoint>,

    /// Event efficiency against each truth kinematic variable
    pub kinematics: Vec<KinematicEfficiency>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::{
        tests::{candidate, numu_cc_event, signal_event},
        Backtrack, PfpCandidate,
    };
    use approx::assert_relative_eq;

    fn muon_match(num_hits: u32, purity: Float, completeness: Float) -> PfpCandidate {
        let mut cand = candidate(num_hits, 0.9);
        cand.backtrack = Some(Backtrack {
            pdg: 13,
            track_id: 1,
            energy: 0.5,
            purity,
            completeness,
        });
        cand.scores.muon = PurityCompleteness::new(purity, completeness);
        cand
    }

    fn pion_match(hypothesis: Hypothesis, purity: Float, completeness: Float) -> PfpCandidate {
        let mut cand = candidate(30, 0.6);
        let pc = PurityCompleteness::new(purity, completeness);
        match hypothesis {
            Hypothesis::PiPlus => cand.scores.piplus = pc,
            _ => cand.scores.piminus = pc,
        }
        cand
    }

    fn well_reconstructed() -> AnalysisEvent {
        let mut event = signal_event();
        event.candidates = vec![
            muon_match(120, 0.9, 0.95),
            pion_match(Hypothesis::PiPlus, 0.7, 0.6),
            pion_match(Hypothesis::PiMinus, 0.6, 0.5),
        ];
        event
    }

    fn poorly_reconstructed() -> AnalysisEvent {
        let mut event = signal_event();
        event.candidates = vec![
            muon_match(40, 0.6, 0.5),
            pion_match(Hypothesis::PiPlus, 0.3, 0.6),
        ];
        event
    }

    #[test]
    fn background_events_are_ignored() {
        let mut acc = DiagnosticsAccumulator::default();
        acc.integrate(&numu_cc_event());
        assert_eq!(acc, DiagnosticsAccumulator::default());
    }

    #[test]
    fn efficiencies_and_fractions() {
        let mut acc = DiagnosticsAccumulator::default();
        acc.integrate(&well_reconstructed());
        acc.integrate(&poorly_reconstructed());
        let report = acc.finalize();

        assert_eq!(report.signal_events, 2);
        assert_eq!(report.efficiencies[0], (Hypothesis::Muon, 1.));
        assert_eq!(report.efficiencies[1], (Hypothesis::PiPlus, 0.5));
        assert_eq!(report.efficiencies[2], (Hypothesis::PiMinus, 0.5));
        assert_relative_eq!(report.event_efficiency, 0.5);
        assert_eq!(report.best_match_fractions[1], (Hypothesis::PiPlus, 0.5));
        // The second muon falls below the hit floor, hence counts at (0, 0)
        assert_relative_eq!(report.muon_region_fraction, 0.5);
    }

    #[test]
    fn region_boundaries_are_exclusive() {
        let mut event = signal_event();
        event.candidates = vec![
            muon_match(120, 0.75, 0.9),
            pion_match(Hypothesis::PiPlus, 0.5, 0.6),
            pion_match(Hypothesis::PiMinus, 0.7, 0.1),
        ];
        let mut acc = DiagnosticsAccumulator::default();
        acc.integrate(&event);
        let report = acc.finalize();

        // Boundary pairs are accepted by the matching region...
        assert_eq!(report.efficiencies[1], (Hypothesis::PiPlus, 1.));
        assert_eq!(report.efficiencies[2], (Hypothesis::PiMinus, 1.));
        // ...but not by the best match and muon regions
        assert_eq!(report.best_match_fractions[0], (Hypothesis::Muon, 1.));
        assert_eq!(report.best_match_fractions[1], (Hypothesis::PiPlus, 0.));
        assert_eq!(report.best_match_fractions[2], (Hypothesis::PiMinus, 0.));
        assert_eq!(report.muon_region_fraction, 0.);
    }

    #[test]
    fn configured_thresholds_are_used() {
        let mut event = well_reconstructed();
        event.candidates[0].num_hits = 40;

        let mut default = DiagnosticsAccumulator::default();
        default.integrate(&event);
        let default = default.finalize();
        assert_eq!(default.muon_min_hits, MUON_MIN_HITS);
        assert_eq!(default.efficiencies[1], (Hypothesis::PiPlus, 1.));
        assert_eq!(default.muon_region_fraction, 0.);

        let mut custom = DiagnosticsAccumulator::new(AcceptanceRegion::new(0.8, 0.1), 30);
        custom.integrate(&event);
        let custom = custom.finalize();
        assert_eq!(custom.acceptance, AcceptanceRegion::new(0.8, 0.1));
        assert_eq!(custom.efficiencies[0], (Hypothesis::Muon, 1.));
        assert_eq!(custom.efficiencies[1], (Hypothesis::PiPlus, 0.));
        assert_eq!(custom.event_efficiency, 0.);
        assert_eq!(custom.muon_region_fraction, 1.);
    }

    #[test]
    fn kinematic_efficiencies() {
        let mut acc = DiagnosticsAccumulator::default();
        acc.integrate(&well_reconstructed());
        acc.integrate(&poorly_reconstructed());
        acc.integrate(&numu_cc_event());
        let report = acc.finalize();

        assert_eq!(report.kinematics.len(), KinematicVariable::ALL.len());
        for curve in &report.kinematics {
            let total: usize = curve.bins.iter().map(|bin| bin.total).sum();
            assert_eq!(total + curve.outside.1, 2, "{:?}", curve.variable);
        }

        // Both events share the same truth, one of them is reconstructed
        let energy = &report.kinematics[0];
        assert_eq!(energy.variable, KinematicVariable::KShortEnergy);
        assert_eq!(energy.bins.len(), 1);
        assert_eq!((energy.bins[0].passed, energy.bins[0].total), (1, 2));
        assert!(energy.bins[0].low <= 0.8 && 0.8 < energy.bins[0].high);

        let muon = &report.kinematics[3];
        assert_eq!(muon.variable, KinematicVariable::MuonMomentum);
        assert_relative_eq!(muon.bins[0].low, 0.4);
        assert_relative_eq!(muon.bins[0].efficiency, 0.5);
    }

    #[test]
    fn hit_scan() {
        let mut acc = DiagnosticsAccumulator::default();
        acc.integrate(&well_reconstructed());
        acc.integrate(&poorly_reconstructed());
        let report = acc.finalize();

        assert_eq!(report.hit_scan.len(), 51);
        assert_eq!(report.hit_scan.last().map(|p| p.threshold), Some(500));

        let zero = report.hit_scan[0];
        assert_relative_eq!(zero.efficiency, 1.);
        assert_relative_eq!(zero.efficiency_error, 0.);
        assert_relative_eq!(zero.mean_purity, 0.75);
        assert_relative_eq!(zero.mean_completeness, 0.725);

        let fifty = report.hit_scan[5];
        assert_eq!(fifty.threshold, 50);
        assert_relative_eq!(fifty.efficiency, 0.5);
        assert_relative_eq!(fifty.efficiency_error, 0.125f64.sqrt() as Float);
        assert_relative_eq!(fifty.mean_purity, 0.9);

        let high = report.hit_scan[12];
        assert_eq!(high.threshold, 120);
        assert_eq!(high.efficiency, 0.);
        assert_eq!(high.mean_purity, 0.);
    }

    #[test]
    fn split_and_merge_matches_single_pass() {
        let events = [well_reconstructed(), poorly_reconstructed(), numu_cc_event()];
        let mut single = DiagnosticsAccumulator::default();
        events.iter().for_each(|e| single.integrate(e));

        let mut left = DiagnosticsAccumulator::default();
        left.integrate(&events[0]);
        let mut right = DiagnosticsAccumulator::default();
        events[1..].iter().for_each(|e| right.integrate(e));
        left.merge(right);

        assert_eq!(left.finalize(), single.finalize());
    }
}
