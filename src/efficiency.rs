//! Efficiencies binned in truth kinematic variables

use crate::{
    diagnostics::binomial_error,
    event::SignalKinematics,
    numeric::{reals, Float},
};

use num_traits::ToPrimitive;

/// Fixed-width binning of a variable over [min, max)
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Binning {
    /// Number of bins
    pub num_bins: usize,

    /// Lower edge of the first bin
    pub min: Float,

    /// Upper edge of the last bin
    pub max: Float,
}
//
impl Binning {
    /// Build a binning
    pub const fn new(num_bins: usize, min: Float, max: Float) -> Self {
        Self { num_bins, min, max }
    }

    /// Width of one bin
    pub fn width(&self) -> Float {
        (self.max - self.min) / self.num_bins as Float
    }

    /// Position of a value, or None if it falls outside of the range
    pub fn locate(&self, value: Float) -> Option<usize> {
        if !(self.min..self.max).contains(&value) {
            return None;
        }
        let index = ((value - self.min) / self.width()).floor().to_usize()?;
        // Rounding can push values just below max into a nonexistent bin
        Some(index.min(self.num_bins - 1))
    }

    /// Lower and upper edge of a bin
    pub fn edges(&self, bin: usize) -> (Float, Float) {
        let width = self.width();
        (
            self.min + bin as Float * width,
            self.min + (bin + 1) as Float * width,
        )
    }
}

/// Truth variables which the event reconstruction efficiency is studied
/// against
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum KinematicVariable {
    /// K⁰_S total energy (GeV)
    KShortEnergy,
    /// Distance between the neutrino vertex and the K⁰_S decay (cm)
    KShortSeparation,
    /// Angle between the decay pions (rad)
    OpeningAngle,
    /// Muon momentum (GeV/c)
    MuonMomentum,
    /// π⁺ momentum (GeV/c)
    PiPlusMomentum,
    /// π⁻ momentum (GeV/c)
    PiMinusMomentum,
    /// Hadronic invariant mass (GeV)
    W,
    /// Bjorken x
    X,
    /// Inelasticity
    Y,
    /// Squared four-momentum transfer (GeV²)
    Q2,
    /// Neutrino energy (GeV)
    NeutrinoEnergy,
}
//
impl KinematicVariable {
    /// All variables, in reporting order
    pub const ALL: [Self; 11] = [
        Self::KShortEnergy,
        Self::KShortSeparation,
        Self::OpeningAngle,
        Self::MuonMomentum,
        Self::PiPlusMomentum,
        Self::PiMinusMomentum,
        Self::W,
        Self::X,
        Self::Y,
        Self::Q2,
        Self::NeutrinoEnergy,
    ];

    /// Name used in reports
    pub fn label(self) -> &'static str {
        match self {
            Self::KShortEnergy => "K0S energy (GeV)",
            Self::KShortSeparation => "K0S decay distance (cm)",
            Self::OpeningAngle => "Pion opening angle (rad)",
            Self::MuonMomentum => "Muon momentum (GeV/c)",
            Self::PiPlusMomentum => "Pion-plus momentum (GeV/c)",
            Self::PiMinusMomentum => "Pion-minus momentum (GeV/c)",
            Self::W => "W (GeV)",
            Self::X => "Bjorken x",
            Self::Y => "Inelasticity y",
            Self::Q2 => "Q2 (GeV2)",
            Self::NeutrinoEnergy => "Neutrino energy (GeV)",
        }
    }

    /// Binning of the variable
    pub fn binning(self) -> Binning {
        match self {
            Self::KShortEnergy => Binning::new(15, 0.1, 3.0),
            Self::KShortSeparation => Binning::new(24, 0., 24.),
            Self::OpeningAngle => Binning::new(15, 0., reals::consts::PI),
            Self::MuonMomentum | Self::PiPlusMomentum | Self::PiMinusMomentum => {
                Binning::new(15, 0., 3.)
            }
            Self::W | Self::Q2 => Binning::new(30, 0., 3.),
            Self::X | Self::Y => Binning::new(20, 0., 1.),
            Self::NeutrinoEnergy => Binning::new(24, 0., 6.),
        }
    }

    /// Value of the variable in a signal event
    pub fn value(self, kin: &SignalKinematics) -> Float {
        match self {
            Self::KShortEnergy => kin.kshort_energy,
            Self::KShortSeparation => kin.kshort_separation,
            Self::OpeningAngle => kin.opening_angle,
            Self::MuonMomentum => kin.muon_momentum,
            Self::PiPlusMomentum => kin.piplus_momentum,
            Self::PiMinusMomentum => kin.piminus_momentum,
            Self::W => kin.w,
            Self::X => kin.x,
            Self::Y => kin.y,
            Self::Q2 => kin.q2,
            Self::NeutrinoEnergy => kin.neutrino_energy,
        }
    }
}

/// Passed and total event counts in the bins of a variable
///
/// Values outside of the binning range are counted separately.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EfficiencyHistogram {
    num_bins: usize,
    passed: Vec<usize>,
    total: Vec<usize>,
    outside_passed: usize,
    outside_total: usize,
}
//
impl EfficiencyHistogram {
    /// Empty histogram with a given number of bins
    pub fn new(num_bins: usize) -> Self {
        Self {
            num_bins,
            passed: vec![0; num_bins],
            total: vec![0; num_bins],
            outside_passed: 0,
            outside_total: 0,
        }
    }

    /// Record one event in the bin `bin`, or out of range if None
    pub fn fill(&mut self, bin: Option<usize>, passed: bool) {
        match bin {
            Some(bin) if bin < self.num_bins => {
                self.total[bin] += 1;
                self.passed[bin] += usize::from(passed);
            }
            _ => {
                self.outside_total += 1;
                self.outside_passed += usize::from(passed);
            }
        }
    }

    /// Number of recorded events, including those out of range
    pub fn entries(&self) -> usize {
        self.total.iter().sum::<usize>() + self.outside_total
    }

    /// Add the counts of another histogram with the same binning
    pub fn merge(&mut self, other: &Self) {
        debug_assert_eq!(self.num_bins, other.num_bins);
        let pairs = [
            (&mut self.passed, &other.passed),
            (&mut self.total, &other.total),
        ];
        for (mine, theirs) in pairs {
            mine.iter_mut().zip(theirs).for_each(|(m, t)| *m += t);
        }
        self.outside_passed += other.outside_passed;
        self.outside_total += other.outside_total;
    }

    /// Per-bin efficiencies, skipping empty bins
    pub fn finalize(&self, binning: Binning) -> Vec<EfficiencyBin> {
        (0..self.num_bins)
            .filter(|&bin| self.total[bin] > 0)
            .map(|bin| {
                let (low, high) = binning.edges(bin);
                let (passed, total) = (self.passed[bin], self.total[bin]);
                let efficiency = passed as Float / total as Float;
                EfficiencyBin {
                    low,
                    high,
                    passed,
                    total,
                    efficiency,
                    error: binomial_error(efficiency, total),
                }
            })
            .collect()
    }

    /// Passed and total counts of the events out of range
    pub fn outside(&self) -> (usize, usize) {
        (self.outside_passed, self.outside_total)
    }
}

/// Efficiency in one bin of a kinematic variable
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EfficiencyBin {
    /// Lower edge of the bin
    pub low: Float,

    /// Upper edge of the bin
    pub high: Float,

    /// Events passing in the bin
    pub passed: usize,

    /// Events in the bin
    pub total: usize,

    /// Fraction of passing events
    pub efficiency: Float,

    /// Binomial uncertainty on the efficiency
    pub error: Float,
}

/// Finalized efficiency curve against one kinematic variable
#[derive(Clone, Debug, PartialEq)]
pub struct KinematicEfficiency {
    /// Variable on the horizontal axis
    pub variable: KinematicVariable,

    /// Non-empty bins, in increasing order
    pub bins: Vec<EfficiencyBin>,

    /// Passed and total counts of the events out of range
    pub outside: (usize, usize),
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn binning_is_half_open() {
        let binning = Binning::new(24, 0., 24.);
        assert_eq!(binning.locate(0.), Some(0));
        assert_eq!(binning.locate(3.5), Some(3));
        assert_eq!(binning.locate(23.999), Some(23));
        assert_eq!(binning.locate(24.), None);
        assert_eq!(binning.locate(-0.1), None);
        assert_eq!(binning.locate(Float::NAN), None);
        let (low, high) = binning.edges(3);
        assert_relative_eq!(low, 3.);
        assert_relative_eq!(high, 4.);
    }

    #[test]
    fn every_variable_has_a_usable_binning() {
        for variable in KinematicVariable::ALL {
            let binning = variable.binning();
            assert!(binning.num_bins > 0 && binning.min < binning.max);
            assert!(!variable.label().is_empty());
        }
    }

    #[test]
    fn bins_count_passed_and_total() {
        let binning = Binning::new(4, 0., 4.);
        let mut histogram = EfficiencyHistogram::new(binning.num_bins);
        histogram.fill(binning.locate(0.5), true);
        histogram.fill(binning.locate(0.7), false);
        histogram.fill(binning.locate(2.5), true);
        histogram.fill(binning.locate(9.), true);
        assert_eq!(histogram.entries(), 4);
        assert_eq!(histogram.outside(), (1, 1));

        let bins = histogram.finalize(binning);
        assert_eq!(bins.len(), 2);
        assert_eq!((bins[0].passed, bins[0].total), (1, 2));
        assert_relative_eq!(bins[0].efficiency, 0.5);
        assert_relative_eq!(bins[0].error, 0.125f64.sqrt() as Float);
        assert_relative_eq!(bins[1].low, 2.);
        assert_relative_eq!(bins[1].efficiency, 1.);
    }

    #[test]
    fn merged_histograms_add_up() {
        let binning = Binning::new(3, 0., 3.);
        let values = [(0.5, true), (1.5, false), (2.5, true), (-1., false), (1.2, true)];
        let mut single = EfficiencyHistogram::new(3);
        values
            .iter()
            .for_each(|&(v, p)| single.fill(binning.locate(v), p));

        let mut left = EfficiencyHistogram::new(3);
        let mut right = EfficiencyHistogram::new(3);
        values[..2]
            .iter()
            .for_each(|&(v, p)| left.fill(binning.locate(v), p));
        values[2..]
            .iter()
            .for_each(|&(v, p)| right.fill(binning.locate(v), p));
        left.merge(&right);
        assert_eq!(left, single);
    }
}
