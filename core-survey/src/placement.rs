//! # Placement Resolver
//!
//! Folds the two alignment options of `load` into the SDK's single anchor
//! position. Absent vertical alignment means bottom, absent horizontal
//! alignment means right.

use bridge_traits::sdk::Placement;
use std::fmt;

/// `yAlign` option values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VerticalAlign {
    Top,
    Center,
    Bottom,
}

impl VerticalAlign {
    pub const NAMES: &'static [&'static str] = &["top", "center", "bottom"];

    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "top" => Some(Self::Top),
            "center" => Some(Self::Center),
            "bottom" => Some(Self::Bottom),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Top => "top",
            Self::Center => "center",
            Self::Bottom => "bottom",
        }
    }
}

impl fmt::Display for VerticalAlign {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// `xAlign` option values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HorizontalAlign {
    Left,
    Right,
}

impl HorizontalAlign {
    pub const NAMES: &'static [&'static str] = &["left", "right"];

    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "left" => Some(Self::Left),
            "right" => Some(Self::Right),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Left => "left",
            Self::Right => "right",
        }
    }
}

impl fmt::Display for HorizontalAlign {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Resolves the anchor position for a pair of alignment options.
///
/// Total over every combination, including either side absent.
pub fn resolve(y_align: Option<VerticalAlign>, x_align: Option<HorizontalAlign>) -> Placement {
    let left = matches!(x_align, Some(HorizontalAlign::Left));
    match y_align.unwrap_or(VerticalAlign::Bottom) {
        VerticalAlign::Top if left => Placement::TopLeft,
        VerticalAlign::Top => Placement::TopRight,
        VerticalAlign::Center if left => Placement::MiddleLeft,
        VerticalAlign::Center => Placement::MiddleRight,
        VerticalAlign::Bottom if left => Placement::BottomLeft,
        VerticalAlign::Bottom => Placement::BottomRight,
    }
}
