use std::fmt;
use std::str::FromStr;

use crate::error::Error;

/// Named reference point on a page, as fractions of the displayed width/height.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "kebab-case"))]
pub enum AnchorPosition {
    RightBottom,
    RightTop,
    LeftBottom,
    LeftTop,
    Center,
    TopCenter,
    BottomCenter,
    LeftCenter,
    RightCenter,
}

/// Canonical order of the catalog.
pub const ALL_ANCHORS: [AnchorPosition; 9] = [
    AnchorPosition::RightBottom,
    AnchorPosition::RightTop,
    AnchorPosition::LeftBottom,
    AnchorPosition::LeftTop,
    AnchorPosition::Center,
    AnchorPosition::TopCenter,
    AnchorPosition::BottomCenter,
    AnchorPosition::LeftCenter,
    AnchorPosition::RightCenter,
];

/// Ladder tried when the user has no preferred anchor.
pub const AUTOMATIC_LADDER: [AnchorPosition; 4] = [
    AnchorPosition::RightBottom,
    AnchorPosition::RightTop,
    AnchorPosition::LeftBottom,
    AnchorPosition::LeftTop,
];

impl AnchorPosition {
    /// (x_ratio, y_ratio), Y measured from the top edge.
    pub fn ratios(self) -> (f32, f32) {
        match self {
            AnchorPosition::RightBottom => (0.85, 0.90),
            AnchorPosition::RightTop => (0.85, 0.10),
            AnchorPosition::LeftBottom => (0.15, 0.90),
            AnchorPosition::LeftTop => (0.15, 0.10),
            AnchorPosition::Center => (0.50, 0.50),
            AnchorPosition::TopCenter => (0.50, 0.10),
            AnchorPosition::BottomCenter => (0.50, 0.90),
            AnchorPosition::LeftCenter => (0.15, 0.50),
            AnchorPosition::RightCenter => (0.85, 0.50),
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            AnchorPosition::RightBottom => "right-bottom",
            AnchorPosition::RightTop => "right-top",
            AnchorPosition::LeftBottom => "left-bottom",
            AnchorPosition::LeftTop => "left-top",
            AnchorPosition::Center => "center",
            AnchorPosition::TopCenter => "top-center",
            AnchorPosition::BottomCenter => "bottom-center",
            AnchorPosition::LeftCenter => "left-center",
            AnchorPosition::RightCenter => "right-center",
        }
    }
}

impl fmt::Display for AnchorPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for AnchorPosition {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        ALL_ANCHORS
            .iter()
            .copied()
            .find(|a| a.name().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| Error::UnknownAnchor(s.to_string()))
    }
}

/// User-ordered permutation of all nine anchors, consulted when the preferred
/// anchor is not blank and fallback is enabled.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(
    feature = "serde",
    serde(try_from = "Vec<AnchorPosition>", into = "Vec<AnchorPosition>")
)]
pub struct FallbackPriority([AnchorPosition; 9]);

impl FallbackPriority {
    /// Rejects anything that is not exactly the nine anchors, each once.
    pub fn new(order: &[AnchorPosition]) -> Result<Self, Error> {
        if order.len() != ALL_ANCHORS.len() {
            return Err(Error::InvalidFallbackPriority(format!(
                "expected {} anchors, got {}",
                ALL_ANCHORS.len(),
                order.len()
            )));
        }
        let mut slots = [AnchorPosition::RightBottom; 9];
        for (i, anchor) in order.iter().enumerate() {
            if order[..i].contains(anchor) {
                return Err(Error::InvalidFallbackPriority(format!(
                    "{anchor} listed more than once"
                )));
            }
            slots[i] = *anchor;
        }
        Ok(Self(slots))
    }

    pub fn anchors(&self) -> &[AnchorPosition; 9] {
        &self.0
    }
}

impl Default for FallbackPriority {
    fn default() -> Self {
        Self(ALL_ANCHORS)
    }
}

impl TryFrom<Vec<AnchorPosition>> for FallbackPriority {
    type Error = Error;

    fn try_from(order: Vec<AnchorPosition>) -> Result<Self, Self::Error> {
        Self::new(&order)
    }
}

impl From<FallbackPriority> for Vec<AnchorPosition> {
    fn from(priority: FallbackPriority) -> Self {
        priority.0.to_vec()
    }
}

impl FromStr for FallbackPriority {
    type Err = Error;

    /// Comma-separated anchor names, e.g. `right-bottom,left-bottom,...`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let order = s
            .split(',')
            .filter(|part| !part.trim().is_empty())
            .map(str::parse)
            .collect::<Result<Vec<AnchorPosition>, _>>()?;
        Self::new(&order)
    }
}
