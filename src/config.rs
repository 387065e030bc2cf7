//! Mechanism for loading and sharing the analysis configuration

use crate::{
    category::Classifier,
    evcut::SelectionCuts,
    geometry::FiducialVolume,
    matching::{AcceptanceRegion, MatchStrategy},
    numeric::Float,
    selection::{Analysis, Selection},
};

use eyre::{ensure, eyre, Result, WrapErr};
use log::info;

use std::{fs, path::Path, str::FromStr};

/// Analysis configuration
#[derive(Clone, Debug, PartialEq)]
pub struct Configuration {
    /// Fiducial volume of the selection
    pub fiducial_volume: FiducialVolume,

    /// Whether the classifier checks the true vertex against the fiducial
    /// volume
    pub check_truth_vertex: bool,

    /// Thresholds of the selection cuts
    pub cuts: SelectionCuts,

    /// Name of the rule matching decay pions to candidates
    pub match_strategy: String,

    /// File which the report is written to
    pub report_file: String,
}
//
impl Default for Configuration {
    fn default() -> Self {
        Self {
            fiducial_volume: FiducialVolume::Wirecell,
            check_truth_vertex: true,
            cuts: SelectionCuts::default(),
            match_strategy: "first_accepted".to_owned(),
            report_file: "kshort_selection.report".to_owned(),
        }
    }
}
//
impl Configuration {
    /// Load the configuration from a file, check it, and print it out
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let config_str = fs::read_to_string(path)
            .wrap_err_with(|| format!("Failed to read configuration file {}", path.display()))?;
        let config = config_str.parse::<Self>()?;
        config.print();
        Ok(config)
    }

    /// Display the configuration
    pub fn print(&self) {
        let cuts = &self.cuts;
        info!("FIDUCIAL_VOLUME    : {}", self.fiducial_volume);
        info!("CHECK_TRUTH_VERTEX : {}", self.check_truth_vertex);
        info!("TOPO_SCORE         : {}", cuts.topo_score);
        info!("TRACK_SCORE        : {}", cuts.track_score);
        info!("MUON_TRACK_SCORE   : {}", cuts.muon_track_score);
        info!("MUON_MIN_HITS      : {}", cuts.muon_min_hits);
        info!("MUON_LENGTH        : {}", cuts.muon_length);
        info!("MUON_VTX_DISTANCE  : {}", cuts.muon_vtx_distance);
        info!("MUON_P_MIN         : {}", cuts.muon_p_min);
        info!("MUON_P_MAX         : {}", cuts.muon_p_max);
        info!("MIN_PURITY         : {}", cuts.acceptance.min_purity);
        info!("MIN_COMPLETENESS   : {}", cuts.acceptance.min_completeness);
        info!("MATCH_STRATEGY     : {}", self.match_strategy);
        info!("REPORT_FILE        : {}", self.report_file);
    }

    /// Rule matching decay pions to candidates
    pub fn strategy(&self) -> Result<MatchStrategy> {
        match self.match_strategy.as_str() {
            "first_accepted" => Ok(MatchStrategy::FirstAccepted(self.cuts.acceptance)),
            "distance" => Ok(MatchStrategy::Distance(self.cuts.acceptance)),
            "hit_count" => Ok(MatchStrategy::HitCount {
                min_hits: self.cuts.muon_min_hits,
            }),
            other => Err(eyre!("Unknown match strategy {}", other)),
        }
    }

    /// Set up the classifier and selection described by this configuration
    pub fn analysis(&self) -> Result<Analysis> {
        let truth_volume = self.check_truth_vertex.then_some(self.fiducial_volume);
        Ok(Analysis {
            classifier: Classifier::new(truth_volume),
            selection: Selection::new(self.cuts, self.fiducial_volume, self.strategy()?),
        })
    }

    /// Check that the configuration makes sense
    fn validate(&self) -> Result<()> {
        let cuts = &self.cuts;
        if let FiducialVolume::WholeTpc(padding)
        | FiducialVolume::WholeTpcPadded(padding)
        | FiducialVolume::WirecellPadded(padding) = self.fiducial_volume
        {
            ensure!(padding >= 0., "Fiducial volume padding must not be negative");
        }
        for (name, score) in [
            ("topo_score", cuts.topo_score),
            ("track_score", cuts.track_score),
            ("muon_track_score", cuts.muon_track_score),
            ("min_purity", cuts.acceptance.min_purity),
            ("min_completeness", cuts.acceptance.min_completeness),
        ] {
            ensure!(
                (0.0..=1.0).contains(&score),
                "Configuration of {} must lie between 0 and 1",
                name
            );
        }
        ensure!(
            cuts.muon_length >= 0. && cuts.muon_vtx_distance > 0.,
            "Muon track length and vertex distance cuts must be positive"
        );
        ensure!(
            cuts.muon_p_min <= cuts.muon_p_max,
            "The muon momentum window is inverted ({} > {})",
            cuts.muon_p_min,
            cuts.muon_p_max
        );
        self.strategy()?;
        Ok(())
    }
}
//
impl FromStr for Configuration {
    type Err = eyre::Report;

    /// Decode a configuration file's contents
    ///
    /// Configuration items are the first non-whitespace chunk of text on each
    /// line, in a fixed order. Blank lines are ignored, and the rest of a line
    /// is free for comments.
    fn from_str(config_str: &str) -> Result<Self> {
        let mut config_iter = config_str
            .lines()
            .filter_map(|line| line.split_whitespace().next());

        // This closure fetches the next configuration item, tagging it with
        // the name of the configuration field which it is supposed to fill
        let mut next_item = |name: &'static str| -> Result<ConfigItem> {
            config_iter
                .next()
                .map(|data| ConfigItem::new(name, data))
                .ok_or_else(|| eyre!("Missing configuration of {}", name))
        };

        let volume_name = next_item("fiducial_volume")?.data;
        let padding = next_item("padding")?.parse::<Float>()?;
        let fiducial_volume = FiducialVolume::from_name(volume_name, padding)
            .ok_or_else(|| eyre!("Unknown fiducial volume {}", volume_name))?;
        let check_truth_vertex = next_item("check_truth_vertex")?.parse_bool()?;
        let cuts = SelectionCuts {
            topo_score: next_item("topo_score")?.parse::<Float>()?,
            track_score: next_item("track_score")?.parse::<Float>()?,
            muon_track_score: next_item("muon_track_score")?.parse::<Float>()?,
            muon_min_hits: next_item("muon_min_hits")?.parse::<u32>()?,
            muon_length: next_item("muon_length")?.parse::<Float>()?,
            muon_vtx_distance: next_item("muon_vtx_distance")?.parse::<Float>()?,
            muon_p_min: next_item("muon_p_min")?.parse::<Float>()?,
            muon_p_max: next_item("muon_p_max")?.parse::<Float>()?,
            acceptance: AcceptanceRegion::new(
                next_item("min_purity")?.parse::<Float>()?,
                next_item("min_completeness")?.parse::<Float>()?,
            ),
        };
        let config = Configuration {
            fiducial_volume,
            check_truth_vertex,
            cuts,
            match_strategy: next_item("match_strategy")?.data.to_lowercase(),
            report_file: next_item("report_file")?.data.to_owned(),
        };

        config.validate()?;
        Ok(config)
    }
}

/// A value from the configuration file, tagged with the struct field which it
/// is supposed to map for error reporting purposes.
struct ConfigItem<'data> {
    name: &'static str,
    data: &'data str,
}
//
impl<'data> ConfigItem<'data> {
    /// Build a config item from a struct field tag and raw iterator data
    fn new(name: &'static str, data: &'data str) -> Self {
        Self { name, data }
    }

    /// Parse this data using Rust's standard parsing logic
    fn parse<T: FromStr>(self) -> Result<T>
    where
        <T as FromStr>::Err: std::error::Error + Send + Sync + 'static,
    {
        self.data
            .parse::<T>()
            .wrap_err_with(|| format!("Could not parse configuration of {}", self.name))
    }

    /// Parse a boolean, also accepting the yes/no spelling
    fn parse_bool(self) -> Result<bool> {
        match self.data.to_lowercase().as_str() {
            "yes" => Ok(true),
            "no" => Ok(false),
            _ => self.parse::<bool>(),
        }
    }
}
