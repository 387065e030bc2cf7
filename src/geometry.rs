//! Containment tests against the detector's active and fiducial regions
//!
//! Several incompatible definitions of "inside the detector" coexist in the
//! analysis, and selected samples depend on which one is used. They are all
//! kept here as distinct variants of the `Containment` capability, and the
//! caller picks one through a `FiducialVolume` preset.

use crate::numeric::{Float, Position};

use num_traits::ToPrimitive;

use std::fmt::{self, Display};

/// Anything which can decide whether a point lies inside a detector region
pub trait Containment {
    /// Truth that `point` (in cm) lies inside the region
    fn contains(&self, point: &Position) -> bool;
}

/// Region of the TPC where the wires are unresponsive, along z (open)
const DEAD_ZONE: (Float, Float) = (675.1, 775.1);

/// Truth that a z coordinate falls strictly inside the dead zone
fn in_dead_zone(z: Float) -> bool {
    z > DEAD_ZONE.0 && z < DEAD_ZONE.1
}

/// Axis-aligned box, open on every side
#[allow(missing_docs)]
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BoxVolume {
    pub x_min: Float,
    pub x_max: Float,
    pub y_min: Float,
    pub y_max: Float,
    pub z_min: Float,
    pub z_max: Float,
}
//
impl BoxVolume {
    /// Full active volume of the TPC
    pub const ACTIVE_TPC: Self = Self {
        x_min: 0.,
        x_max: 256.,
        y_min: -116.,
        y_max: 116.,
        z_min: 0.,
        z_max: 1036.,
    };

    /// Precut containment volume, 10 cm away from the TPC walls
    pub const PCV: Self = Self {
        x_min: 10.,
        x_max: 246.35,
        y_min: -106.5,
        y_max: 106.5,
        z_min: 10.,
        z_max: 1026.8,
    };

    /// TPC boundaries as surveyed, used by the dead-region variants
    pub const SURVEYED_TPC: Self = Self {
        x_min: -1.55,
        x_max: 254.8,
        y_min: -115.53,
        y_max: 117.47,
        z_min: 0.1,
        z_max: 1036.9,
    };

    /// Tighten every bound of the box by `padding`
    pub fn shrunk(&self, padding: Float) -> Self {
        Self {
            x_min: self.x_min + padding,
            x_max: self.x_max - padding,
            y_min: self.y_min + padding,
            y_max: self.y_max - padding,
            z_min: self.z_min + padding,
            z_max: self.z_max - padding,
        }
    }
}
//
impl Containment for BoxVolume {
    fn contains(&self, point: &Position) -> bool {
        point.x > self.x_min
            && point.x < self.x_max
            && point.y > self.y_min
            && point.y < self.y_max
            && point.z > self.z_min
            && point.z < self.z_max
    }
}

/// Box with the dead zone carved out of it
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DeadRegionBox {
    outer: BoxVolume,
}
//
impl DeadRegionBox {
    /// Surveyed TPC minus the dead zone
    pub fn new() -> Self {
        Self::padded(0.)
    }

    /// Surveyed TPC tightened by `padding` on all sides, minus the dead zone
    pub fn padded(padding: Float) -> Self {
        Self {
            outer: BoxVolume::SURVEYED_TPC.shrunk(padding),
        }
    }
}
//
impl Default for DeadRegionBox {
    fn default() -> Self {
        Self::new()
    }
}
//
impl Containment for DeadRegionBox {
    fn contains(&self, point: &Position) -> bool {
        self.outer.contains(point) && !in_dead_zone(point.z)
    }
}

/// Margin between the wirecell survey boundaries and the fiducial volume (cm)
const BOUNDARY_DIS_CUT: Float = 3.0;

/// Number of polygons per projection
const NUM_BUCKETS: usize = 10;

/// Highest reachable bucket index
///
/// The survey tables below have 11 slots, but bucket indices saturate at 9 so
/// the last slot is never used.
const MAX_BUCKET: i64 = NUM_BUCKETS as i64 - 1;

// (Y, X) projection, sliced along z in 100 cm chunks
const YX_TOP_Y1: Float = 116.;
const YX_TOP_X1: [Float; 11] = [
    0., 150.00, 132.56, 122.86, 119.46, 114.22, 110.90, 115.85, 113.48, 126.36, 144.21,
];
const YX_TOP_Y2: [Float; 11] = [
    0., 110.00, 108.14, 106.77, 105.30, 103.40, 102.18, 101.76, 102.27, 102.75, 105.10,
];
const YX_TOP_X2: Float = 256.;
const YX_BOT_Y1: Float = -115.;
const YX_BOT_X1: [Float; 11] = [
    0., 115.71, 98.05, 92.42, 91.14, 92.25, 85.38, 78.19, 74.46, 78.86, 108.90,
];
const YX_BOT_Y2: [Float; 11] = [
    0., -101.72, -99.46, -99.51, -100.43, -99.55, -98.56, -98.00, -98.30, -99.32, -104.20,
];
const YX_BOT_X2: Float = 256.;

// (Z, X) projection, sliced along y in 24 cm chunks
const ZX_UP_Z1: Float = 0.;
const ZX_UP_X1: Float = 120.;
const ZX_UP_Z2: Float = 11.;
const ZX_UP_X2: Float = 256.;
const ZX_DW_Z1: Float = 1037.;
const ZX_DW_X1: [Float; 11] = [
    0., 120.00, 115.24, 108.50, 110.67, 120.90, 126.43, 140.51, 157.15, 120.00, 120.00,
];
const ZX_DW_Z2: [Float; 11] = [
    0., 1029.00, 1029.12, 1027.21, 1026.01, 1024.91, 1025.27, 1025.32, 1027.61, 1026.00,
    1026.00,
];
const ZX_DW_X2: Float = 256.;

// Detector faces
const ANODE: Float = 0.;
const TOP: Float = 117.;
const BOTTOM: Float = -116.;
const UPSTREAM: Float = 0.;
const DOWNSTREAM: Float = 1037.;

/// Closed 6-vertex ring in a 2D projection, drift coordinate first
#[derive(Clone, Copy, Debug, PartialEq)]
struct Polygon {
    /// Drift (x) coordinate of each vertex
    u: [Float; 6],

    /// Other coordinate (y or z) of each vertex
    v: [Float; 6],
}
//
impl Polygon {
    /// Even-odd ray casting test
    fn contains(&self, test_u: Float, test_v: Float) -> bool {
        let mut inside = false;
        let mut j = self.u.len() - 1;
        for i in 0..self.u.len() {
            let (ui, vi) = (self.u[i], self.v[i]);
            let (uj, vj) = (self.u[j], self.v[j]);
            if (vi > test_v) != (vj > test_v) && test_u < (uj - ui) * (test_v - vi) / (vj - vi) + ui
            {
                inside = !inside;
            }
            j = i;
        }
        inside
    }
}

/// Saturating bucket index of a coordinate already scaled to bucket units
fn bucket(scaled: Float) -> Option<usize> {
    let index = scaled.floor().to_i64()?;
    index.clamp(0, MAX_BUCKET).to_usize()
}

/// Fiducial volume derived from the wirecell detector survey
#[derive(Clone, Debug, PartialEq)]
pub struct WirecellVolume {
    /// (X, Y) polygons, indexed by z bucket
    xy: [Polygon; NUM_BUCKETS],

    /// (X, Z) polygons, indexed by y bucket
    xz: [Polygon; NUM_BUCKETS],
}
//
impl WirecellVolume {
    /// Build the polygons from the survey tables
    pub fn new() -> Self {
        let cut = BOUNDARY_DIS_CUT;
        let xy = std::array::from_fn(|idx| Polygon {
            u: [
                ANODE + cut,
                YX_BOT_X1[idx] - cut,
                YX_BOT_X2 - cut,
                YX_TOP_X2 - cut,
                YX_TOP_X1[idx] - cut,
                ANODE + cut,
            ],
            v: [
                BOTTOM + cut,
                YX_BOT_Y1 + cut,
                YX_BOT_Y2[idx] + cut,
                YX_TOP_Y2[idx] - cut,
                YX_TOP_Y1 - cut,
                TOP - cut,
            ],
        });
        let xz = std::array::from_fn(|idx| Polygon {
            u: [
                ANODE + cut,
                ZX_UP_X1 - cut,
                ZX_UP_X2 - cut,
                ZX_DW_X2 - cut,
                ZX_DW_X1[idx] - cut,
                ANODE + cut,
            ],
            v: [
                UPSTREAM + cut + 1.,
                ZX_UP_Z1 + cut + 1.,
                ZX_UP_Z2 + cut + 1.,
                ZX_DW_Z2[idx] - cut - 1.,
                ZX_DW_Z1 - cut - 1.,
                DOWNSTREAM - cut - 1.,
            ],
        });
        Self { xy, xz }
    }
}
//
impl Default for WirecellVolume {
    fn default() -> Self {
        Self::new()
    }
}
//
impl Containment for WirecellVolume {
    fn contains(&self, point: &Position) -> bool {
        if !point.iter().all(|coord| coord.is_finite()) {
            return false;
        }
        if !(0. ..=1000.).contains(&point.z) || in_dead_zone(point.z) {
            return false;
        }
        let (Some(index_y), Some(index_z)) = (bucket((point.y + 116.) / 24.), bucket(point.z / 100.))
        else {
            return false;
        };
        self.xy[index_z].contains(point.x, point.y) && self.xz[index_y].contains(point.x, point.z)
    }
}

/// Wirecell volume intersected with a padded dead-region box
#[derive(Clone, Debug, PartialEq)]
pub struct PaddedWirecell {
    wirecell: WirecellVolume,
    padded: DeadRegionBox,
}
//
impl PaddedWirecell {
    /// Set up the intersection for a given padding (cm)
    pub fn new(padding: Float) -> Self {
        Self {
            wirecell: WirecellVolume::new(),
            padded: DeadRegionBox::padded(padding),
        }
    }
}
//
impl Containment for PaddedWirecell {
    fn contains(&self, point: &Position) -> bool {
        self.wirecell.contains(point) && self.padded.contains(point)
    }
}

/// Named fiducial volume presets, as selected in the configuration
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum FiducialVolume {
    /// Open box over the full active TPC
    ActiveTpc,
    /// Open box 10 cm away from the TPC walls
    Pcv,
    /// Surveyed TPC minus the dead zone
    OldFv,
    /// Surveyed TPC minus the dead zone, tightened by some padding (cm)
    ///
    /// Same test as `WholeTpcPadded`, under its historical name.
    WholeTpc(Float),
    /// Surveyed TPC minus the dead zone, tightened by some padding (cm)
    WholeTpcPadded(Float),
    /// Wirecell survey polygons
    Wirecell,
    /// Wirecell survey polygons within a padded TPC (cm)
    WirecellPadded(Float),
}
//
impl FiducialVolume {
    /// Look up a preset by its configuration name
    ///
    /// The padding is only used by the padded presets.
    pub fn from_name(name: &str, padding: Float) -> Option<Self> {
        let volume = match name.to_lowercase().as_str() {
            "active_tpc" => Self::ActiveTpc,
            "pcv" => Self::Pcv,
            "old_fv" => Self::OldFv,
            "whole_tpc" => Self::WholeTpc(padding),
            "whole_tpc_padded" => Self::WholeTpcPadded(padding),
            "wirecell" => Self::Wirecell,
            "wirecell_padded" => Self::WirecellPadded(padding),
            _ => return None,
        };
        Some(volume)
    }

    /// Build the corresponding containment test
    pub fn build(&self) -> Box<dyn Containment + Send + Sync> {
        match *self {
            Self::ActiveTpc => Box::new(BoxVolume::ACTIVE_TPC),
            Self::Pcv => Box::new(BoxVolume::PCV),
            Self::OldFv => Box::new(DeadRegionBox::new()),
            Self::WholeTpc(padding) | Self::WholeTpcPadded(padding) => {
                Box::new(DeadRegionBox::padded(padding))
            }
            Self::Wirecell => Box::new(WirecellVolume::new()),
            Self::WirecellPadded(padding) => Box::new(PaddedWirecell::new(padding)),
        }
    }
}
//
impl Display for FiducialVolume {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ActiveTpc => write!(fmt, "active_tpc"),
            Self::Pcv => write!(fmt, "pcv"),
            Self::OldFv => write!(fmt, "old_fv"),
            Self::WholeTpc(padding) => write!(fmt, "whole_tpc ({padding} cm)"),
            Self::WholeTpcPadded(padding) => write!(fmt, "whole_tpc_padded ({padding} cm)"),
            Self::Wirecell => write!(fmt, "wirecell"),
            Self::WirecellPadded(padding) => write!(fmt, "wirecell_padded ({padding} cm)"),
        }
    }
}
