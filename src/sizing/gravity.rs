//! Crop specifications and the gravity codes the backend understands.
//!
//! A registered size carries a [`CropSpec`]: no crop (fit inside the box),
//! a hard center crop, or a crop anchored to one of nine positions. The
//! backend only speaks compass codes, so [`map_crop`] turns each spec into a
//! [`Gravity`]:
//!
//! ```text
//!            left    center   right
//! top        nowe    no       noea
//! center     we      ce       ea
//! bottom     sowe    so       soea
//! ```
//!
//! In configuration and JSON a crop is written the way the CMS stores it:
//! `false`, `true`, or a `["left", "top"]` keyword pair. Keyword pairs are
//! parsed leniently: anything outside the vocabulary anchors at the center
//! instead of failing.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tracing::debug;

/// Horizontal crop anchor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HorizontalAnchor {
    Left,
    Center,
    Right,
}

impl HorizontalAnchor {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Left => "left",
            Self::Center => "center",
            Self::Right => "right",
        }
    }
}

impl FromStr for HorizontalAnchor {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "left" => Ok(Self::Left),
            "center" => Ok(Self::Center),
            "right" => Ok(Self::Right),
            other => Err(format!("unknown horizontal anchor '{other}'")),
        }
    }
}

/// Vertical crop anchor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VerticalAnchor {
    Top,
    Center,
    Bottom,
}

impl VerticalAnchor {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Top => "top",
            Self::Center => "center",
            Self::Bottom => "bottom",
        }
    }
}

impl FromStr for VerticalAnchor {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "top" => Ok(Self::Top),
            "center" => Ok(Self::Center),
            "bottom" => Ok(Self::Bottom),
            other => Err(format!("unknown vertical anchor '{other}'")),
        }
    }
}

/// How a size is cut out of the original.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "RawCrop", into = "RawCrop")]
pub enum CropSpec {
    /// Fit inside the box, keeping the whole image.
    #[default]
    Disabled,
    /// Crop to the box around the center.
    Enabled,
    /// Crop to the box, keeping the given corner or edge.
    Directional(HorizontalAnchor, VerticalAnchor),
}

impl CropSpec {
    /// Build a directional crop from CMS keywords.
    ///
    /// Falls back to center/center when either keyword is unrecognized.
    pub fn from_keywords(horizontal: &str, vertical: &str) -> Self {
        match (horizontal.parse(), vertical.parse()) {
            (Ok(h), Ok(v)) => Self::Directional(h, v),
            _ => {
                debug!(horizontal, vertical, "unrecognized crop keywords, using center");
                Self::Directional(HorizontalAnchor::Center, VerticalAnchor::Center)
            }
        }
    }

    /// True for every variant that crops (`Enabled` and `Directional`).
    pub fn is_enabled(&self) -> bool {
        !matches!(self, Self::Disabled)
    }
}

impl fmt::Display for CropSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Disabled => write!(f, "none"),
            Self::Enabled => write!(f, "hard"),
            Self::Directional(h, v) => write!(f, "{},{}", h.as_str(), v.as_str()),
        }
    }
}

/// Parses the CLI form: `none`, `hard`, or `left,top`.
impl FromStr for CropSpec {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "none" | "false" => Ok(Self::Disabled),
            "hard" | "true" => Ok(Self::Enabled),
            pair => match pair.split_once(',') {
                Some((h, v)) => Ok(Self::from_keywords(h.trim(), v.trim())),
                None => Err(format!(
                    "invalid crop '{pair}': expected none, hard, or <horizontal>,<vertical>"
                )),
            },
        }
    }
}

/// Wire form of [`CropSpec`]: a boolean or a keyword list.
#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum RawCrop {
    Flag(bool),
    Keywords(Vec<String>),
}

impl From<RawCrop> for CropSpec {
    fn from(raw: RawCrop) -> Self {
        match raw {
            RawCrop::Flag(false) => Self::Disabled,
            RawCrop::Flag(true) => Self::Enabled,
            RawCrop::Keywords(words) => match words.as_slice() {
                [h, v, ..] => Self::from_keywords(h, v),
                _ => {
                    debug!(?words, "crop needs two keywords, using center");
                    Self::Directional(HorizontalAnchor::Center, VerticalAnchor::Center)
                }
            },
        }
    }
}

impl From<CropSpec> for RawCrop {
    fn from(crop: CropSpec) -> Self {
        match crop {
            CropSpec::Disabled => Self::Flag(false),
            CropSpec::Enabled => Self::Flag(true),
            CropSpec::Directional(h, v) => {
                Self::Keywords(vec![h.as_str().to_string(), v.as_str().to_string()])
            }
        }
    }
}

/// Compass code sent to the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum GravityCode {
    #[serde(rename = "ce")]
    Center,
    #[serde(rename = "we")]
    West,
    #[serde(rename = "ea")]
    East,
    #[serde(rename = "no")]
    North,
    #[serde(rename = "so")]
    South,
    #[serde(rename = "nowe")]
    NorthWest,
    #[serde(rename = "noea")]
    NorthEast,
    #[serde(rename = "soea")]
    SouthEast,
    #[serde(rename = "sowe")]
    SouthWest,
}

impl GravityCode {
    pub fn from_anchors(horizontal: HorizontalAnchor, vertical: VerticalAnchor) -> Self {
        use HorizontalAnchor as H;
        use VerticalAnchor as V;
        match (horizontal, vertical) {
            (H::Center, V::Center) => Self::Center,
            (H::Left, V::Center) => Self::West,
            (H::Right, V::Center) => Self::East,
            (H::Center, V::Top) => Self::North,
            (H::Center, V::Bottom) => Self::South,
            (H::Left, V::Top) => Self::NorthWest,
            (H::Right, V::Top) => Self::NorthEast,
            (H::Right, V::Bottom) => Self::SouthEast,
            (H::Left, V::Bottom) => Self::SouthWest,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Center => "ce",
            Self::West => "we",
            Self::East => "ea",
            Self::North => "no",
            Self::South => "so",
            Self::NorthWest => "nowe",
            Self::NorthEast => "noea",
            Self::SouthEast => "soea",
            Self::SouthWest => "sowe",
        }
    }
}

impl fmt::Display for GravityCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Gravity parameter: a code plus optional explicit offsets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Gravity {
    pub code: GravityCode,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub offsets: Option<(i32, i32)>,
}

impl Gravity {
    pub fn center() -> Self {
        Self {
            code: GravityCode::Center,
            offsets: None,
        }
    }
}

/// Map a crop specification to the backend gravity.
///
/// Fit-only sizes get center gravity pinned with zero offsets; cropped sizes
/// get their anchor's code and no offsets.
pub fn map_crop(crop: &CropSpec) -> Gravity {
    match crop {
        CropSpec::Disabled => Gravity {
            code: GravityCode::Center,
            offsets: Some((0, 0)),
        },
        CropSpec::Enabled => Gravity::center(),
        CropSpec::Directional(h, v) => Gravity {
            code: GravityCode::from_anchors(*h, *v),
            offsets: None,
        },
    }
}
