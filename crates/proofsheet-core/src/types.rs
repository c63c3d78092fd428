// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Core domain types for Proofsheet: entries, orientations, rotations, and the
// clamped percentages that drive image placement.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::ProofsheetError;
use crate::raster::RasterHandle;

/// Aspect ratio (width / height) at or above which an image is a panorama.
pub const PANORAMA_THRESHOLD: f32 = 2.6;

/// Unique identifier for an entry. Stable across reordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EntryId(pub Uuid);

impl EntryId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for EntryId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for EntryId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The user's page orientation choice for an entry.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrientationPreference {
    /// Decide from the image's aspect ratio.
    #[default]
    Auto,
    Portrait,
    Landscape,
}

/// A resolved page orientation. Never "auto".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PageOrientation {
    Portrait,
    Landscape,
}

impl PageOrientation {
    /// Page dimensions in millimetres (width, height) for the given paper.
    pub fn page_dimensions_mm(&self, paper: PaperSize) -> (f32, f32) {
        let (w, h) = paper.dimensions_mm();
        let (short, long) = (w.min(h) as f32, w.max(h) as f32);
        match self {
            Self::Portrait => (short, long),
            Self::Landscape => (long, short),
        }
    }
}

impl std::fmt::Display for PageOrientation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Portrait => f.write_str("portrait"),
            Self::Landscape => f.write_str("landscape"),
        }
    }
}

/// Quarter-turn rotation, clockwise.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "i32", into = "i32")]
pub enum Rotation {
    #[default]
    Deg0,
    Deg90,
    Deg180,
    Deg270,
}

impl Rotation {
    /// Rotation from a degree value. Accepts any multiple of 90, normalised
    /// into `[0, 360)`.
    pub fn from_degrees(degrees: i32) -> Result<Self, ProofsheetError> {
        match degrees.rem_euclid(360) {
            0 => Ok(Self::Deg0),
            90 => Ok(Self::Deg90),
            180 => Ok(Self::Deg180),
            270 => Ok(Self::Deg270),
            _ => Err(ProofsheetError::InvalidRotation(degrees)),
        }
    }

    pub fn degrees(&self) -> i32 {
        match self {
            Self::Deg0 => 0,
            Self::Deg90 => 90,
            Self::Deg180 => 180,
            Self::Deg270 => 270,
        }
    }

    /// Compose two rotations.
    pub fn plus(self, other: Rotation) -> Rotation {
        match (self.degrees() + other.degrees()).rem_euclid(360) {
            90 => Self::Deg90,
            180 => Self::Deg180,
            270 => Self::Deg270,
            _ => Self::Deg0,
        }
    }

    /// Whether this rotation swaps width and height.
    pub fn swaps_axes(&self) -> bool {
        matches!(self, Self::Deg90 | Self::Deg270)
    }
}

impl TryFrom<i32> for Rotation {
    type Error = ProofsheetError;

    fn try_from(degrees: i32) -> Result<Self, Self::Error> {
        Self::from_degrees(degrees)
    }
}

impl From<Rotation> for i32 {
    fn from(rotation: Rotation) -> Self {
        rotation.degrees()
    }
}

/// Shrink factor applied after contain-fit, in percent. Always within
/// `[50, 100]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "i32", into = "i32")]
pub struct Scale(u8);

impl Scale {
    pub const MIN: i32 = 50;
    pub const MAX: i32 = 100;

    /// Clamp a raw percentage into the scale domain.
    pub fn new(percent: i32) -> Self {
        Self(percent.clamp(Self::MIN, Self::MAX) as u8)
    }

    pub fn percent(&self) -> i32 {
        self.0 as i32
    }

    pub fn factor(&self) -> f32 {
        self.0 as f32 / 100.0
    }
}

impl Default for Scale {
    fn default() -> Self {
        Self(100)
    }
}

impl From<i32> for Scale {
    fn from(percent: i32) -> Self {
        Self::new(percent)
    }
}

impl From<Scale> for i32 {
    fn from(scale: Scale) -> Self {
        scale.percent()
    }
}

/// Displacement from centre, in percent of half the available slack.
/// Always within `[-100, 100]`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "i32", into = "i32")]
pub struct Offset(i8);

impl Offset {
    pub const MIN: i32 = -100;
    pub const MAX: i32 = 100;

    /// Clamp a raw percentage into the offset domain.
    pub fn new(percent: i32) -> Self {
        Self(percent.clamp(Self::MIN, Self::MAX) as i8)
    }

    pub fn percent(&self) -> i32 {
        self.0 as i32
    }

    pub fn factor(&self) -> f32 {
        self.0 as f32 / 100.0
    }
}

impl From<i32> for Offset {
    fn from(percent: i32) -> Self {
        Self::new(percent)
    }
}

impl From<Offset> for i32 {
    fn from(offset: Offset) -> Self {
        offset.percent()
    }
}

/// One page's worth of input state.
#[derive(Debug, Clone, Default)]
pub struct Entry {
    pub id: EntryId,
    /// Drawn top-left in the title style.
    pub title: Option<String>,
    /// Drawn below the title in the size style.
    pub size: Option<String>,
    /// Finalized (already cropped) source pixels. Entries without an image
    /// contribute no page.
    pub image: Option<RasterHandle>,
    pub orientation: OrientationPreference,
    pub scale: Scale,
    pub offset_x: Offset,
    pub offset_y: Offset,
    /// User-requested rotation, applied before orientation correction.
    pub rotation: Rotation,
}

impl Entry {
    /// A blank entry with every field at its default.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn has_image(&self) -> bool {
        self.image.is_some()
    }
}

/// Standard paper sizes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaperSize {
    A4,
    A3,
    Letter,
    Legal,
    Tabloid,
    Custom { width_mm: u32, height_mm: u32 },
}

impl PaperSize {
    /// Dimensions in millimetres (width, height), portrait.
    pub fn dimensions_mm(&self) -> (u32, u32) {
        match self {
            Self::A4 => (210, 297),
            Self::A3 => (297, 420),
            Self::Letter => (216, 279),
            Self::Legal => (216, 356),
            Self::Tabloid => (279, 432),
            Self::Custom {
                width_mm,
                height_mm,
            } => (*width_mm, *height_mm),
        }
    }
}

/// How the conversion service treats transparent pixels.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Background {
    /// Preserve alpha.
    Transparent,
    /// Flatten onto white.
    #[default]
    White,
}

impl Background {
    /// Value of the `bg` query parameter.
    pub fn query_value(&self) -> &'static str {
        match self {
            Self::Transparent => "transparent",
            Self::White => "white",
        }
    }
}

/// Which conversion path produced a normalized raster.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConversionPath {
    Primary,
    Fallback,
}
