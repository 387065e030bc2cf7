//! Event loop of the analysis, from event source to accumulated results

use crate::{
    cutflow::CutFlowAccumulator,
    diagnostics::DiagnosticsAccumulator,
    reader::EventSource,
    scheduling::{self, Merge},
    selection::Analysis,
};

use eyre::{Result, WrapErr};
use log::debug;

/// Interval between two progress messages, in events
const PROGRESS_INTERVAL: usize = 1000;

/// Everything that is accumulated over events
#[derive(Clone, Debug, PartialEq)]
pub struct AnalysisResults {
    /// Selection cut flow over all events
    pub cutflow: CutFlowAccumulator,

    /// Reconstruction diagnostics over true signal events
    pub diagnostics: DiagnosticsAccumulator,
}
//
impl AnalysisResults {
    /// Empty results, with diagnostics following the thresholds of the
    /// selection
    pub fn new(analysis: &Analysis) -> Self {
        Self {
            cutflow: CutFlowAccumulator::new(),
            diagnostics: DiagnosticsAccumulator::from_cuts(analysis.selection.cuts()),
        }
    }
}
//
impl Merge for AnalysisResults {
    fn merge(&mut self, other: Self) {
        self.cutflow.merge(other.cutflow);
        self.diagnostics.merge(other.diagnostics);
    }
}

/// Classify, select and study every event of a source
pub fn run<S: EventSource + Sync + ?Sized>(source: &S, analysis: &Analysis) -> Result<AnalysisResults> {
    let num_events = source.num_events();
    debug!("Processing {} events", num_events);
    scheduling::run_batches(num_events, |batch| {
        let mut results = AnalysisResults::new(analysis);
        for index in batch {
            let event = source.event(index)?;
            let summary = analysis
                .process(&event)
                .wrap_err_with(|| format!("Failed to process event {}", index))?;
            results.cutflow.integrate(&summary);
            results.diagnostics.integrate(&event);
            if (index + 1) % PROGRESS_INTERVAL == 0 {
                debug!("Processed {}/{} events", index + 1, num_events);
            }
        }
        Ok(results)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        category::Classifier,
        evcut::SelectionCuts,
        event::{tests::numu_cc_event, AnalysisEvent},
        geometry::FiducialVolume,
        matching::MatchStrategy,
        selection::{
            tests::{default_selection, selected_event},
            Selection,
        },
    };

    fn analysis() -> Analysis {
        Analysis {
            classifier: Classifier::new(Some(FiducialVolume::Wirecell)),
            selection: default_selection(),
        }
    }

    #[test]
    fn integrates_every_event() {
        let events = vec![selected_event(), numu_cc_event(), selected_event()];
        let results = run(events.as_slice(), &analysis()).unwrap();
        assert_eq!(results.cutflow.total(), 3);
        assert_eq!(results.diagnostics.signal_events(), 2);
        let table = results.cutflow.finalize();
        assert_eq!(table.selected, 2);
    }

    #[test]
    fn repeated_runs_are_identical() {
        let events: Vec<AnalysisEvent> = (0..25)
            .map(|i| if i % 3 == 0 { numu_cc_event() } else { selected_event() })
            .collect();
        let first = run(events.as_slice(), &analysis()).unwrap();
        let second = run(events.as_slice(), &analysis()).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn empty_source_gives_empty_results() {
        let events: Vec<AnalysisEvent> = Vec::new();
        let results = run(events.as_slice(), &analysis()).unwrap();
        assert_eq!(results, AnalysisResults::new(&analysis()));
    }

    #[test]
    fn diagnostics_follow_selection_thresholds() {
        let mut event = selected_event();
        if let Some(backtrack) = event.candidates[0].backtrack.as_mut() {
            backtrack.completeness = 0.95;
        }
        let events = vec![event];
        let report = run(events.as_slice(), &analysis())
            .unwrap()
            .diagnostics
            .finalize();
        assert_eq!(report.muon_region_fraction, 1.);

        let cuts = SelectionCuts {
            muon_min_hits: 250,
            ..SelectionCuts::default()
        };
        let analysis = Analysis {
            classifier: Classifier::new(Some(FiducialVolume::Wirecell)),
            selection: Selection::new(
                cuts,
                FiducialVolume::Wirecell,
                MatchStrategy::FirstAccepted(cuts.acceptance),
            ),
        };
        let report = run(events.as_slice(), &analysis)
            .unwrap()
            .diagnostics
            .finalize();
        assert_eq!(report.muon_min_hits, 250);
        // The 200-hit muon no longer clears the hit floor
        assert_eq!(report.muon_region_fraction, 0.);
    }
}
