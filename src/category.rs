//! Truth-level classification of events into physics categories

use crate::{
    constants::{
        ELECTRON_NEUTRINO, INTERACTION_MEC, INTERACTION_QE, INTERACTION_RES, MUON_NEUTRINO,
        TAU_NEUTRINO,
    },
    event::{CurrentType, NeutrinoTruth},
    geometry::{Containment, FiducialVolume},
};

use std::fmt::{self, Display};

/// Mutually exclusive physics categories
///
/// The integer codes are those written to the output ntuples.
#[allow(missing_docs)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum EventCategory {
    Unknown = 0,
    SignalCCQE = 1,
    SignalCCMEC = 2,
    SignalCCRES = 3,
    SignalOther = 4,
    // Reserved for a strange-multiplicity split of the signal, never produced
    NuMuCCNhyp = 5,
    NuMuCC0kshrt0hyp = 6,
    NuMuCCOther = 7,
    NC = 8,
    OutOfFiducialVolume = 9,
    Other = 10,
}
//
impl EventCategory {
    /// All categories, in code order
    pub const ALL: [Self; 11] = [
        Self::Unknown,
        Self::SignalCCQE,
        Self::SignalCCMEC,
        Self::SignalCCRES,
        Self::SignalOther,
        Self::NuMuCCNhyp,
        Self::NuMuCC0kshrt0hyp,
        Self::NuMuCCOther,
        Self::NC,
        Self::OutOfFiducialVolume,
        Self::Other,
    ];

    /// Integer code of the category
    pub fn code(self) -> u8 {
        self as u8
    }

    /// Human-readable label
    pub fn label(self) -> &'static str {
        match self {
            Self::Unknown => "Unknown",
            Self::SignalCCQE => "Signal (CCQE)",
            Self::SignalCCMEC => "Signal (CCMEC)",
            Self::SignalCCRES => "Signal (CCRES)",
            Self::SignalOther => "Signal (Other)",
            Self::NuMuCCNhyp => "numu CCNhyp",
            Self::NuMuCC0kshrt0hyp => "numu CC0kshrt0hyp",
            Self::NuMuCCOther => "Other numu CC",
            Self::NC => "NC",
            Self::OutOfFiducialVolume => "Out FV",
            Self::Other => "Other",
        }
    }

    /// Truth that this is one of the signal categories
    pub fn is_signal(self) -> bool {
        matches!(
            self,
            Self::SignalCCQE | Self::SignalCCMEC | Self::SignalCCRES | Self::SignalOther
        )
    }
}
//
impl Display for EventCategory {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(fmt, "{}", self.label())
    }
}

/// Truth-level event classifier
///
/// Only looks at the simulated neutrino, never at reconstructed quantities.
pub struct Classifier {
    /// Volume which the true vertex must lie in, if checked at all
    truth_volume: Option<Box<dyn Containment + Send + Sync>>,
}
//
impl Classifier {
    /// Set up a classifier, optionally checking the true vertex position
    pub fn new(truth_volume: Option<FiducialVolume>) -> Self {
        Self {
            truth_volume: truth_volume.map(|volume| volume.build()),
        }
    }

    /// Assign a category to a simulated interaction
    ///
    /// Conditions are checked in priority order and the first match wins.
    pub fn classify(&self, truth: &NeutrinoTruth) -> EventCategory {
        let abs_pdg = truth.pdg.abs();
        let is_mc = [ELECTRON_NEUTRINO, MUON_NEUTRINO, TAU_NEUTRINO].contains(&abs_pdg);
        if !is_mc {
            return EventCategory::Unknown;
        }

        if let Some(volume) = &self.truth_volume {
            if !volume.contains(&truth.vertex) {
                return EventCategory::OutOfFiducialVolume;
            }
        }

        if truth.current == CurrentType::Neutral {
            return EventCategory::NC;
        }

        if truth.pdg != MUON_NEUTRINO {
            return EventCategory::Other;
        }

        match truth.interaction {
            INTERACTION_QE => EventCategory::SignalCCQE,
            INTERACTION_MEC => EventCategory::SignalCCMEC,
            INTERACTION_RES => EventCategory::SignalCCRES,
            _ => EventCategory::SignalOther,
        }
    }
}
