//! Accumulation of selection outcomes into cut-flow tables

use crate::{
    category::EventCategory,
    numeric::Float,
    scheduling::Merge,
    selection::{Cut, EventSummary, NUM_CUTS},
};

/// Number of event categories
const NUM_CATEGORIES: usize = EventCategory::ALL.len();

/// Ratio of two event counts, zero when there is nothing to divide
pub fn ratio(numerator: usize, denominator: usize) -> Float {
    if denominator == 0 {
        0.
    } else {
        numerator as Float / denominator as Float
    }
}

/// Event counts of the selection, before finalization
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CutFlowAccumulator {
    /// Number of integrated events
    total: usize,

    /// Events passing each cut, ignoring the other cuts
    individual: [usize; NUM_CUTS],

    /// Events passing each cut and all the ones before it
    cumulative: [usize; NUM_CUTS],

    /// Events rejected first by each cut
    first_failed: [usize; NUM_CUTS],

    /// Events per truth category, indexed by category code
    category_total: [usize; NUM_CATEGORIES],

    /// Selected events per truth category, indexed by category code
    category_selected: [usize; NUM_CATEGORIES],
}
//
impl CutFlowAccumulator {
    /// Prepare for cut-flow accumulation
    pub fn new() -> Self {
        Self::default()
    }

    /// Integrate the selection outcome of one event
    pub fn integrate(&mut self, summary: &EventSummary) {
        let flags = &summary.outcome.flags;
        self.total += 1;
        let mut passed_so_far = true;
        for cut in Cut::ALL {
            let passed = flags.passed(cut);
            passed_so_far &= passed;
            self.individual[cut.index()] += usize::from(passed);
            self.cumulative[cut.index()] += usize::from(passed_so_far);
        }
        if let Some(cut) = flags.first_failed() {
            self.first_failed[cut.index()] += 1;
        }
        let category = usize::from(summary.category.code());
        self.category_total[category] += 1;
        self.category_selected[category] += usize::from(summary.outcome.selected());
    }

    /// Number of integrated events
    pub fn total(&self) -> usize {
        self.total
    }

    /// Turn the event counts into a cut-flow table
    pub fn finalize(self) -> CutFlowTable {
        let mut previous = self.total;
        let rows = Cut::ALL
            .into_iter()
            .map(|cut| {
                let cumulative = self.cumulative[cut.index()];
                let row = CutFlowRow {
                    cut,
                    individual: self.individual[cut.index()],
                    cumulative,
                    first_failed: self.first_failed[cut.index()],
                    efficiency: ratio(cumulative, self.total),
                    relative_efficiency: ratio(cumulative, previous),
                };
                previous = cumulative;
                row
            })
            .collect();

        let categories = EventCategory::ALL
            .into_iter()
            .map(|category| {
                let code = usize::from(category.code());
                CategoryRow {
                    category,
                    total: self.category_total[code],
                    selected: self.category_selected[code],
                }
            })
            .collect::<Vec<_>>();

        let selected = self.cumulative[NUM_CUTS - 1];
        let (signal_total, signal_selected) = categories
            .iter()
            .filter(|row| row.category.is_signal())
            .fold((0, 0), |(total, selected), row| {
                (total + row.total, selected + row.selected)
            });

        CutFlowTable {
            total: self.total,
            selected,
            rows,
            categories,
            signal_efficiency: ratio(signal_selected, signal_total),
            signal_purity: ratio(signal_selected, selected),
        }
    }
}
//
impl Merge for CutFlowAccumulator {
    fn merge(&mut self, other: Self) {
        self.total += other.total;
        let pairs = [
            (&mut self.individual, &other.individual),
            (&mut self.cumulative, &other.cumulative),
            (&mut self.first_failed, &other.first_failed),
        ];
        for (mine, theirs) in pairs {
            mine.iter_mut().zip(theirs).for_each(|(m, t)| *m += t);
        }
        let pairs = [
            (&mut self.category_total, &other.category_total),
            (&mut self.category_selected, &other.category_selected),
        ];
        for (mine, theirs) in pairs {
            mine.iter_mut().zip(theirs).for_each(|(m, t)| *m += t);
        }
    }
}

/// One line of the cut-flow table
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CutFlowRow {
    /// Cut which this row is about
    pub cut: Cut,

    /// Events passing this cut alone
    pub individual: usize,

    /// Events passing this cut and every one before it
    pub cumulative: usize,

    /// Events for which this was the first failed cut
    pub first_failed: usize,

    /// Cumulative count over the total event count
    pub efficiency: Float,

    /// Cumulative count over the cumulative count of the previous cut
    pub relative_efficiency: Float,
}

/// Selection tally of one truth category
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CategoryRow {
    /// Truth category
    pub category: EventCategory,

    /// Number of events in the category
    pub total: usize,

    /// Number of selected events in the category
    pub selected: usize,
}
//
impl CategoryRow {
    /// Fraction of this category's events which were selected
    pub fn efficiency(&self) -> Float {
        ratio(self.selected, self.total)
    }
}

/// Finalized cut flow
#[derive(Clone, Debug, PartialEq)]
pub struct CutFlowTable {
    /// Number of events which went through the selection
    pub total: usize,

    /// Number of events passing every cut
    pub selected: usize,

    /// One row per cut, in pipeline order
    pub rows: Vec<CutFlowRow>,

    /// One row per category, in code order
    pub categories: Vec<CategoryRow>,

    /// Fraction of signal events which were selected
    pub signal_efficiency: Float,

    /// Fraction of selected events which are signal
    pub signal_purity: Float,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::selection::{CutFlags, SelectionOutcome};
    use approx::assert_relative_eq;

    fn summary(category: EventCategory, passing: &[Cut]) -> EventSummary {
        let mut flags = CutFlags::default();
        for &cut in passing {
            flags.set(cut, true);
        }
        EventSummary {
            category,
            outcome: SelectionOutcome {
                flags,
                ..SelectionOutcome::default()
            },
        }
    }

    fn sample() -> Vec<EventSummary> {
        vec![
            summary(EventCategory::SignalCCQE, &Cut::ALL),
            summary(EventCategory::SignalCCRES, &Cut::ALL[..3]),
            summary(EventCategory::NC, &Cut::ALL[1..]),
            summary(EventCategory::Other, &Cut::ALL),
            summary(EventCategory::Unknown, &[]),
        ]
    }

    #[test]
    fn cut_flow_counts() {
        let mut acc = CutFlowAccumulator::new();
        sample().iter().for_each(|s| acc.integrate(s));
        let table = acc.finalize();

        assert_eq!(table.total, 5);
        assert_eq!(table.selected, 2);
        let first = &table.rows[0];
        assert_eq!(first.cut, Cut::RecoVertexInFv);
        assert_eq!((first.individual, first.cumulative, first.first_failed), (3, 3, 2));
        let topo = &table.rows[1];
        assert_eq!((topo.individual, topo.cumulative, topo.first_failed), (4, 3, 0));
        let contained = &table.rows[Cut::MuonContained.index()];
        assert_eq!((contained.cumulative, contained.first_failed), (2, 1));
        assert_relative_eq!(contained.efficiency, 0.4);
        assert_relative_eq!(contained.relative_efficiency, 2. / 3.);
        assert_eq!(table.rows.iter().map(|r| r.first_failed).sum::<usize>(), 3);
    }

    #[test]
    fn cut_flow_never_increases() {
        let mut acc = CutFlowAccumulator::new();
        sample().iter().for_each(|s| acc.integrate(s));
        let table = acc.finalize();
        let mut previous = table.total;
        for row in &table.rows {
            assert!(row.cumulative <= previous);
            assert!(row.cumulative <= row.individual);
            previous = row.cumulative;
        }
    }

    #[test]
    fn category_tallies() {
        let mut acc = CutFlowAccumulator::new();
        sample().iter().for_each(|s| acc.integrate(s));
        let table = acc.finalize();
        let qe = table.categories[EventCategory::SignalCCQE.code() as usize];
        assert_eq!((qe.total, qe.selected), (1, 1));
        let res = table.categories[EventCategory::SignalCCRES.code() as usize];
        assert_eq!((res.total, res.selected), (1, 0));
        assert_relative_eq!(table.signal_efficiency, 0.5);
        assert_relative_eq!(table.signal_purity, 0.5);
    }

    #[test]
    fn split_and_merge_matches_single_pass() {
        let events = sample();
        let mut single = CutFlowAccumulator::new();
        events.iter().for_each(|s| single.integrate(s));

        let mut left = CutFlowAccumulator::new();
        let mut right = CutFlowAccumulator::new();
        events[..2].iter().for_each(|s| left.integrate(s));
        events[2..].iter().for_each(|s| right.integrate(s));
        left.merge(right);

        assert_eq!(left, single);
        assert_eq!(left.finalize(), single.finalize());
    }

    #[test]
    fn empty_table_has_zero_efficiencies() {
        let table = CutFlowAccumulator::new().finalize();
        assert_eq!(table.total, 0);
        assert!(table.rows.iter().all(|row| row.efficiency == 0.));
        assert_eq!(table.signal_purity, 0.);
    }
}
