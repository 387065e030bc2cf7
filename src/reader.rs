//! Event sources and the mapping of raw ntuple branches onto event records
//!
//! Raw entries are kept in their reader-level form, with one flat field per
//! ntuple branch, and converted into a fresh `AnalysisEvent` whenever an event
//! is requested. The conversion is where the parallel lists of an entry get
//! zipped together, so it is also where their lengths are checked.

use crate::{
    error::{Error, Result as CoreResult},
    event::{
        AnalysisEvent, Backtrack, CurrentType, HypothesisScores, KShortDecay, NeutrinoTruth,
        PfpCandidate, PurityCompleteness, RecoSummary, StrangeContent, TrackFit, TruthDaughter,
        TruthTrack,
    },
    numeric::{xyz, Float},
};

use eyre::{eyre, Result, WrapErr};
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};

use std::{
    fs::File,
    io::{BufRead, BufReader},
    path::Path,
};

/// Indexed access to analysed events
pub trait EventSource {
    /// Number of events available
    fn num_events(&self) -> usize;

    /// Build the event record of a given entry
    fn event(&self, index: usize) -> Result<AnalysisEvent>;
}

/// In-memory events can serve as an event source directly
impl EventSource for [AnalysisEvent] {
    fn num_events(&self) -> usize {
        self.len()
    }

    fn event(&self, index: usize) -> Result<AnalysisEvent> {
        self.get(index)
            .cloned()
            .ok_or_else(|| eyre!("Event index {} is out of range ({} events)", index, self.len()))
    }
}

/// Events of a JSON-lines ntuple dump, one JSON object per line
#[derive(Debug, Default)]
pub struct JsonEventFile {
    /// Raw entries, tagged with the line they come from
    entries: Vec<(usize, RawEvent)>,
}
//
impl JsonEventFile {
    /// Load every entry of a JSON-lines file
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path)
            .wrap_err_with(|| format!("Failed to open event file {}", path.display()))?;
        let events = Self::from_reader(BufReader::new(file))
            .wrap_err_with(|| format!("Failed to read event file {}", path.display()))?;
        if events.num_events() == 0 {
            warn!("No events found in {}", path.display());
        } else {
            info!("Loaded {} events from {}", events.num_events(), path.display());
        }
        Ok(events)
    }

    /// Load every entry of a JSON-lines stream, skipping blank lines
    pub fn from_reader(reader: impl BufRead) -> Result<Self> {
        let mut entries = Vec::new();
        for (line_idx, line) in reader.lines().enumerate() {
            let line_no = line_idx + 1;
            let line = line.wrap_err_with(|| format!("Failed to read line {}", line_no))?;
            if line.trim().is_empty() {
                continue;
            }
            let raw = serde_json::from_str::<RawEvent>(&line)
                .wrap_err_with(|| format!("Failed to parse event at line {}", line_no))?;
            entries.push((line_no, raw));
        }
        debug!("Parsed {} raw entries", entries.len());
        Ok(Self { entries })
    }
}
//
impl EventSource for JsonEventFile {
    fn num_events(&self) -> usize {
        self.entries.len()
    }

    fn event(&self, index: usize) -> Result<AnalysisEvent> {
        let (line_no, raw) = self.entries.get(index).ok_or_else(|| {
            eyre!(
                "Event index {} is out of range ({} events)",
                index,
                self.entries.len()
            )
        })?;
        AnalysisEvent::try_from(raw.clone())
            .wrap_err_with(|| format!("Invalid event at line {}", line_no))
    }
}

/// Ntuple entry, as written by the event dumper
///
/// Missing branches take their default value. Per-candidate lists of the
/// optional groups (backtracking, purity/completeness, track fits) may be
/// left empty, in which case the group is absent from every candidate.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
#[allow(missing_docs)]
pub struct RawEvent {
    // ### IDENTITY ###
    pub run: u32,
    pub sub: u32,
    pub evt: u32,

    // ### TRUTH NEUTRINO ###
    pub nu_pdg: i32,
    pub ccnc: i32,
    pub interaction: i32,
    pub nu_e: Float,
    pub true_nu_vtx_x: Float,
    pub true_nu_vtx_y: Float,
    pub true_nu_vtx_z: Float,
    #[serde(rename = "mc_nu_W")]
    pub mc_nu_w: Float,
    #[serde(rename = "mc_nu_X")]
    pub mc_nu_x: Float,
    #[serde(rename = "mc_nu_Y")]
    pub mc_nu_y: Float,
    #[serde(rename = "mc_nu_QSqr")]
    pub mc_nu_qsqr: Float,

    // ### TRUTH STRANGENESS ###
    pub mc_has_lambda: bool,
    pub mc_has_sigma_plus: bool,
    pub mc_has_sigma_minus: bool,
    pub mc_has_sigma_zero: bool,
    pub mc_n_kshort: u32,

    // ### TRUTH DAUGHTERS ###
    pub mc_nu_daughter_pdg: Vec<i32>,
    pub mc_nu_daughter_energy: Vec<Float>,
    pub mc_nu_daughter_px: Vec<Float>,
    pub mc_nu_daughter_py: Vec<Float>,
    pub mc_nu_daughter_pz: Vec<Float>,

    // ### TRUTH MUON ###
    pub mc_has_muon: bool,
    pub mc_muon_tid: i32,
    pub mc_muon_energy: Float,
    pub mc_muon_px: Float,
    pub mc_muon_py: Float,
    pub mc_muon_pz: Float,
    pub mc_muon_startx: Float,
    pub mc_muon_starty: Float,
    pub mc_muon_startz: Float,
    pub mc_muon_endx: Float,
    pub mc_muon_endy: Float,
    pub mc_muon_endz: Float,
    pub mc_muon_n_elas: u32,
    pub mc_muon_n_inelas: u32,
    pub mc_muon_end_process: String,

    // ### TRUTH K0S DECAY ###
    pub mc_is_kshort_decay_pionic: bool,
    pub mc_kshrt_total_energy: Float,
    pub mc_kshrt_end_sep: Float,
    pub mc_kshrt_endx: Float,
    pub mc_kshrt_endy: Float,
    pub mc_kshrt_endz: Float,

    pub mc_kshrt_piplus_tid: i32,
    pub mc_kshrt_piplus_energy: Float,
    pub mc_kshrt_piplus_px: Float,
    pub mc_kshrt_piplus_py: Float,
    pub mc_kshrt_piplus_pz: Float,
    pub mc_kshrt_piplus_startx: Float,
    pub mc_kshrt_piplus_starty: Float,
    pub mc_kshrt_piplus_startz: Float,
    pub mc_kshrt_piplus_endx: Float,
    pub mc_kshrt_piplus_endy: Float,
    pub mc_kshrt_piplus_endz: Float,
    pub mc_kshrt_piplus_n_elas: u32,
    pub mc_kshrt_piplus_n_inelas: u32,
    pub mc_kshrt_piplus_end_process: String,

    pub mc_kshrt_piminus_tid: i32,
    pub mc_kshrt_piminus_energy: Float,
    pub mc_kshrt_piminus_px: Float,
    pub mc_kshrt_piminus_py: Float,
    pub mc_kshrt_piminus_pz: Float,
    pub mc_kshrt_piminus_startx: Float,
    pub mc_kshrt_piminus_starty: Float,
    pub mc_kshrt_piminus_startz: Float,
    pub mc_kshrt_piminus_endx: Float,
    pub mc_kshrt_piminus_endy: Float,
    pub mc_kshrt_piminus_endz: Float,
    pub mc_kshrt_piminus_n_elas: u32,
    pub mc_kshrt_piminus_n_inelas: u32,
    pub mc_kshrt_piminus_end_process: String,

    // ### RECONSTRUCTED EVENT ###
    pub topological_score: Float,
    pub reco_nu_vtx_sce_x: Float,
    pub reco_nu_vtx_sce_y: Float,
    pub reco_nu_vtx_sce_z: Float,
    pub n_pfps: u32,
    pub n_tracks: u32,
    pub n_showers: u32,

    // ### RECONSTRUCTED CANDIDATES ###
    pub pfp_pdg: Vec<i32>,
    pub pfnhits: Vec<u32>,
    pub trk_score: Vec<Float>,

    pub backtracked_pdg: Vec<i32>,
    pub backtracked_tid: Vec<i32>,
    pub backtracked_e: Vec<Float>,
    pub backtracked_purity: Vec<Float>,
    pub backtracked_completeness: Vec<Float>,

    pub pfp_muon_purity: Vec<Float>,
    pub pfp_muon_completeness: Vec<Float>,
    pub pfp_piplus_purity: Vec<Float>,
    pub pfp_piplus_completeness: Vec<Float>,
    pub pfp_piminus_purity: Vec<Float>,
    pub pfp_piminus_completeness: Vec<Float>,

    pub trk_start_x: Vec<Float>,
    pub trk_start_y: Vec<Float>,
    pub trk_start_z: Vec<Float>,
    pub trk_end_x: Vec<Float>,
    pub trk_end_y: Vec<Float>,
    pub trk_end_z: Vec<Float>,
    pub trk_len: Vec<Float>,
    pub trk_range_muon_mom: Vec<Float>,
}

/// Length checks of one index space of parallel lists
struct ParallelLists {
    /// Name and length of the list that other lists are checked against
    reference: &'static str,
    len: usize,
}
//
impl ParallelLists {
    /// Take a list as the reference of an index space
    fn new<T>(reference: &'static str, list: &[T]) -> Self {
        Self {
            reference,
            len: list.len(),
        }
    }

    /// Check that a mandatory list is as long as the reference
    fn check<T>(&self, list: &'static str, values: &[T]) -> CoreResult<()> {
        if values.len() == self.len {
            Ok(())
        } else {
            Err(Error::LengthMismatch {
                list,
                reference: self.reference,
                expected: self.len,
                found: values.len(),
            })
        }
    }

    /// Check an optional group of lists, which must be all empty or all as
    /// long as the reference. Returns whether the group is present.
    fn check_group(&self, group: &[(&'static str, usize)]) -> CoreResult<bool> {
        let present = group.iter().any(|&(_, len)| len > 0);
        if present {
            for &(list, len) in group {
                if len != self.len {
                    return Err(Error::LengthMismatch {
                        list,
                        reference: self.reference,
                        expected: self.len,
                        found: len,
                    });
                }
            }
        }
        Ok(present)
    }
}

/// Build a truth track from its flat branches
#[allow(clippy::too_many_arguments)]
fn truth_track(
    track_id: i32,
    energy: Float,
    momentum: [Float; 3],
    start: [Float; 3],
    end: [Float; 3],
    num_elastic: u32,
    num_inelastic: u32,
    end_process: String,
) -> TruthTrack {
    let vec = |[x, y, z]: [Float; 3]| xyz(x, y, z);
    TruthTrack {
        track_id,
        start: vec(start),
        end: vec(end),
        energy,
        momentum: vec(momentum),
        num_elastic,
        num_inelastic,
        end_process,
    }
}
//
impl TryFrom<RawEvent> for AnalysisEvent {
    type Error = Error;

    fn try_from(raw: RawEvent) -> CoreResult<Self> {
        // Truth daughters
        let daughters_space = ParallelLists::new("mc_nu_daughter_pdg", &raw.mc_nu_daughter_pdg);
        daughters_space.check("mc_nu_daughter_energy", &raw.mc_nu_daughter_energy)?;
        daughters_space.check("mc_nu_daughter_px", &raw.mc_nu_daughter_px)?;
        daughters_space.check("mc_nu_daughter_py", &raw.mc_nu_daughter_py)?;
        daughters_space.check("mc_nu_daughter_pz", &raw.mc_nu_daughter_pz)?;
        let daughters = (0..daughters_space.len)
            .map(|i| TruthDaughter {
                pdg: raw.mc_nu_daughter_pdg[i],
                energy: raw.mc_nu_daughter_energy[i],
                momentum: xyz(
                    raw.mc_nu_daughter_px[i],
                    raw.mc_nu_daughter_py[i],
                    raw.mc_nu_daughter_pz[i],
                ),
            })
            .collect();

        // Reconstructed candidates
        let pfp_space = ParallelLists::new("pfp_pdg", &raw.pfp_pdg);
        pfp_space.check("pfnhits", &raw.pfnhits)?;
        pfp_space.check("trk_score", &raw.trk_score)?;
        let has_backtrack = pfp_space.check_group(&[
            ("backtracked_pdg", raw.backtracked_pdg.len()),
            ("backtracked_tid", raw.backtracked_tid.len()),
            ("backtracked_e", raw.backtracked_e.len()),
            ("backtracked_purity", raw.backtracked_purity.len()),
            ("backtracked_completeness", raw.backtracked_completeness.len()),
        ])?;
        let has_scores = pfp_space.check_group(&[
            ("pfp_muon_purity", raw.pfp_muon_purity.len()),
            ("pfp_muon_completeness", raw.pfp_muon_completeness.len()),
            ("pfp_piplus_purity", raw.pfp_piplus_purity.len()),
            ("pfp_piplus_completeness", raw.pfp_piplus_completeness.len()),
            ("pfp_piminus_purity", raw.pfp_piminus_purity.len()),
            ("pfp_piminus_completeness", raw.pfp_piminus_completeness.len()),
        ])?;
        let has_tracks = pfp_space.check_group(&[
            ("trk_start_x", raw.trk_start_x.len()),
            ("trk_start_y", raw.trk_start_y.len()),
            ("trk_start_z", raw.trk_start_z.len()),
            ("trk_end_x", raw.trk_end_x.len()),
            ("trk_end_y", raw.trk_end_y.len()),
            ("trk_end_z", raw.trk_end_z.len()),
            ("trk_len", raw.trk_len.len()),
            ("trk_range_muon_mom", raw.trk_range_muon_mom.len()),
        ])?;
        let candidates = (0..pfp_space.len)
            .map(|i| {
                // Unmatched candidates are backtracked to PDG code 0 or to a
                // negative track id
                let matched =
                    has_backtrack && raw.backtracked_pdg[i] != 0 && raw.backtracked_tid[i] >= 0;
                let backtrack = matched.then(|| Backtrack {
                    pdg: raw.backtracked_pdg[i],
                    track_id: raw.backtracked_tid[i],
                    energy: raw.backtracked_e[i],
                    purity: raw.backtracked_purity[i],
                    completeness: raw.backtracked_completeness[i],
                });
                let scores = if has_scores {
                    HypothesisScores {
                        muon: PurityCompleteness::new(
                            raw.pfp_muon_purity[i],
                            raw.pfp_muon_completeness[i],
                        ),
                        piplus: PurityCompleteness::new(
                            raw.pfp_piplus_purity[i],
                            raw.pfp_piplus_completeness[i],
                        ),
                        piminus: PurityCompleteness::new(
                            raw.pfp_piminus_purity[i],
                            raw.pfp_piminus_completeness[i],
                        ),
                    }
                } else {
                    HypothesisScores::default()
                };
                // Candidates without a track fit carry a negative or NaN length
                let length = if has_tracks { raw.trk_len[i] } else { Float::NAN };
                let track = (length.is_finite() && length >= 0.).then(|| TrackFit {
                    start: xyz(raw.trk_start_x[i], raw.trk_start_y[i], raw.trk_start_z[i]),
                    end: xyz(raw.trk_end_x[i], raw.trk_end_y[i], raw.trk_end_z[i]),
                    length,
                    range_momentum_muon: raw.trk_range_muon_mom[i],
                });
                PfpCandidate {
                    pdg: raw.pfp_pdg[i],
                    num_hits: raw.pfnhits[i],
                    track_score: raw.trk_score[i],
                    backtrack,
                    scores,
                    track,
                }
            })
            .collect();

        // Truth signal block, guarded by its flags
        let muon = raw.mc_has_muon.then(|| {
            truth_track(
                raw.mc_muon_tid,
                raw.mc_muon_energy,
                [raw.mc_muon_px, raw.mc_muon_py, raw.mc_muon_pz],
                [raw.mc_muon_startx, raw.mc_muon_starty, raw.mc_muon_startz],
                [raw.mc_muon_endx, raw.mc_muon_endy, raw.mc_muon_endz],
                raw.mc_muon_n_elas,
                raw.mc_muon_n_inelas,
                raw.mc_muon_end_process,
            )
        });
        let kshort = raw.mc_is_kshort_decay_pionic.then(|| KShortDecay {
            total_energy: raw.mc_kshrt_total_energy,
            end_separation: raw.mc_kshrt_end_sep,
            decay_vertex: xyz(raw.mc_kshrt_endx, raw.mc_kshrt_endy, raw.mc_kshrt_endz),
            piplus: truth_track(
                raw.mc_kshrt_piplus_tid,
                raw.mc_kshrt_piplus_energy,
                [
                    raw.mc_kshrt_piplus_px,
                    raw.mc_kshrt_piplus_py,
                    raw.mc_kshrt_piplus_pz,
                ],
                [
                    raw.mc_kshrt_piplus_startx,
                    raw.mc_kshrt_piplus_starty,
                    raw.mc_kshrt_piplus_startz,
                ],
                [
                    raw.mc_kshrt_piplus_endx,
                    raw.mc_kshrt_piplus_endy,
                    raw.mc_kshrt_piplus_endz,
                ],
                raw.mc_kshrt_piplus_n_elas,
                raw.mc_kshrt_piplus_n_inelas,
                raw.mc_kshrt_piplus_end_process,
            ),
            piminus: truth_track(
                raw.mc_kshrt_piminus_tid,
                raw.mc_kshrt_piminus_energy,
                [
                    raw.mc_kshrt_piminus_px,
                    raw.mc_kshrt_piminus_py,
                    raw.mc_kshrt_piminus_pz,
                ],
                [
                    raw.mc_kshrt_piminus_startx,
                    raw.mc_kshrt_piminus_starty,
                    raw.mc_kshrt_piminus_startz,
                ],
                [
                    raw.mc_kshrt_piminus_endx,
                    raw.mc_kshrt_piminus_endy,
                    raw.mc_kshrt_piminus_endz,
                ],
                raw.mc_kshrt_piminus_n_elas,
                raw.mc_kshrt_piminus_n_inelas,
                raw.mc_kshrt_piminus_end_process,
            ),
        });

        Ok(AnalysisEvent {
            run: raw.run,
            subrun: raw.sub,
            event: raw.evt,
            truth: NeutrinoTruth {
                pdg: raw.nu_pdg,
                vertex: xyz(raw.true_nu_vtx_x, raw.true_nu_vtx_y, raw.true_nu_vtx_z),
                energy: raw.nu_e,
                current: CurrentType::from_code(raw.ccnc),
                interaction: raw.interaction,
                w: raw.mc_nu_w,
                x: raw.mc_nu_x,
                y: raw.mc_nu_y,
                q2: raw.mc_nu_qsqr,
            },
            strangeness: StrangeContent {
                has_lambda: raw.mc_has_lambda,
                has_sigma_plus: raw.mc_has_sigma_plus,
                has_sigma_minus: raw.mc_has_sigma_minus,
                has_sigma_zero: raw.mc_has_sigma_zero,
                num_kshort: raw.mc_n_kshort,
            },
            daughters,
            muon,
            kshort,
            reco: RecoSummary {
                topological_score: raw.topological_score,
                vertex: xyz(
                    raw.reco_nu_vtx_sce_x,
                    raw.reco_nu_vtx_sce_y,
                    raw.reco_nu_vtx_sce_z,
                ),
                num_pf_particles: raw.n_pfps,
                num_tracks: raw.n_tracks,
                num_showers: raw.n_showers,
            },
            candidates,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::Hypothesis;
    use approx::assert_relative_eq;

    fn two_candidates() -> RawEvent {
        RawEvent {
            nu_pdg: 14,
            ccnc: 0,
            pfp_pdg: vec![13, 11],
            pfnhits: vec![120, 30],
            trk_score: vec![0.9, 0.2],
            ..RawEvent::default()
        }
    }

    #[test]
    fn optional_groups_may_be_absent() {
        let event = AnalysisEvent::try_from(two_candidates()).unwrap();
        assert_eq!(event.candidates.len(), 2);
        assert!(event.candidates.iter().all(|c| c.backtrack.is_none() && c.track.is_none()));
        assert_eq!(event.candidates[1].scores, HypothesisScores::default());
        assert!(event.muon.is_none() && event.kshort.is_none());
    }

    #[test]
    fn mismatched_lists_are_rejected() {
        let mut raw = two_candidates();
        raw.pfnhits.push(4);
        assert_eq!(
            AnalysisEvent::try_from(raw),
            Err(Error::LengthMismatch {
                list: "pfnhits",
                reference: "pfp_pdg",
                expected: 2,
                found: 3,
            })
        );

        let mut raw = two_candidates();
        raw.backtracked_pdg = vec![13, 0];
        raw.backtracked_tid = vec![1, 0];
        assert!(matches!(
            AnalysisEvent::try_from(raw),
            Err(Error::LengthMismatch { list: "backtracked_e", .. })
        ));

        let mut raw = two_candidates();
        raw.mc_nu_daughter_pdg = vec![13];
        assert!(matches!(
            AnalysisEvent::try_from(raw),
            Err(Error::LengthMismatch { reference: "mc_nu_daughter_pdg", .. })
        ));
    }

    #[test]
    fn candidate_groups_are_zipped() {
        let mut raw = two_candidates();
        raw.backtracked_pdg = vec![13, 0];
        raw.backtracked_tid = vec![7, 0];
        raw.backtracked_e = vec![0.4, 0.];
        raw.backtracked_purity = vec![0.95, 0.];
        raw.backtracked_completeness = vec![0.85, 0.];
        raw.trk_start_x = vec![1., 0.];
        raw.trk_start_y = vec![2., 0.];
        raw.trk_start_z = vec![3., 0.];
        raw.trk_end_x = vec![4., 0.];
        raw.trk_end_y = vec![5., 0.];
        raw.trk_end_z = vec![6., 0.];
        raw.trk_len = vec![50., -999.];
        raw.trk_range_muon_mom = vec![0.3, -999.];
        let event = AnalysisEvent::try_from(raw).unwrap();

        let first = &event.candidates[0];
        assert_eq!(first.backtrack.map(|b| b.track_id), Some(7));
        let track = first.track.as_ref().unwrap();
        assert_eq!(track.end, xyz(4., 5., 6.));
        assert_relative_eq!(track.range_momentum_muon, 0.3);

        let second = &event.candidates[1];
        assert!(second.backtrack.is_none());
        assert!(second.track.is_none());
    }

    #[test]
    fn signal_block_follows_guards() {
        let mut raw = two_candidates();
        raw.mc_muon_tid = 5;
        raw.mc_kshrt_piplus_tid = 6;
        raw.mc_kshrt_piminus_px = 0.2;
        let event = AnalysisEvent::try_from(raw.clone()).unwrap();
        assert!(event.muon.is_none());

        raw.mc_has_muon = true;
        raw.mc_is_kshort_decay_pionic = true;
        let event = AnalysisEvent::try_from(raw).unwrap();
        assert!(event.is_true_signal());
        assert_eq!(event.truth_track(Hypothesis::Muon).map(|t| t.track_id), Some(5));
        assert_eq!(event.truth_track(Hypothesis::PiPlus).map(|t| t.track_id), Some(6));
        let piminus = event.truth_track(Hypothesis::PiMinus).unwrap();
        assert_relative_eq!(piminus.momentum.x, 0.2);
    }

    #[test]
    fn json_lines_are_parsed() {
        let input = "\n{\"run\": 7, \"nu_pdg\": 14, \"mc_nu_W\": 1.3, \"pfp_pdg\": [13], \
                     \"pfnhits\": [80], \"trk_score\": [0.95]}\n\n{\"evt\": 3}\n";
        let file = JsonEventFile::from_reader(input.as_bytes()).unwrap();
        assert_eq!(file.num_events(), 2);
        let first = file.event(0).unwrap();
        assert_eq!(first.run, 7);
        assert_relative_eq!(first.truth.w, 1.3);
        assert_eq!(first.candidates[0].num_hits, 80);
        assert_eq!(file.event(1).unwrap().event, 3);
        assert!(file.event(2).is_err());
    }

    #[test]
    fn negative_track_ids_are_unmatched() {
        let input = "{\"pfp_pdg\": [13, 13], \"pfnhits\": [80, 20], \"trk_score\": [0.9, 0.8], \
                     \"backtracked_pdg\": [13, 211], \"backtracked_tid\": [4, -1], \
                     \"backtracked_e\": [0.5, 0.1], \"backtracked_purity\": [0.9, 0.4], \
                     \"backtracked_completeness\": [0.8, 0.3], \"mc_muon_tid\": -1}\n";
        let file = JsonEventFile::from_reader(input.as_bytes()).unwrap();
        let event = file.event(0).unwrap();
        assert_eq!(event.candidates[0].backtrack.map(|b| b.track_id), Some(4));
        assert!(event.candidates[1].backtrack.is_none());
    }

    #[test]
    fn errors_carry_line_numbers() {
        let input = "{\"run\": 1}\n{\"run\": oops}\n";
        let message = format!("{:?}", JsonEventFile::from_reader(input.as_bytes()).unwrap_err());
        assert!(message.contains("line 2"), "{}", message);

        let input = "{\"run\": 1}\n\n{\"pfp_pdg\": [13], \"pfnhits\": []}\n";
        let file = JsonEventFile::from_reader(input.as_bytes()).unwrap();
        let message = format!("{:?}", file.event(1).unwrap_err());
        assert!(message.contains("line 3"), "{}", message);
        assert!(message.contains("pfnhits"), "{}", message);
    }
}
