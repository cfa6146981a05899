use serde::{Deserialize, Serialize};

use crate::types::Color;

/// Semantic color tokens for the timeline chrome. Phase bars carry explicit
/// colors; everything around them is themed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ThemeToken {
    Background,
    PlotBackground,

    GridLine,
    LaneDivider,

    AxisText,
    AxisTitle,

    LabelBackground,
    LabelText,

    TodayMarker,

    TooltipBackground,
    TooltipText,
}

impl ThemeToken {
    /// Default light palette shared by the canvas and SVG renderers.
    pub fn resolve(self) -> Color {
        match self {
            Self::Background => Color::rgb(0xff, 0xff, 0xff),
            Self::PlotBackground => Color::rgb(0xf8, 0xf9, 0xfa),
            Self::GridLine => Color::rgb(0xe0, 0xe0, 0xe0),
            Self::LaneDivider => Color::rgb(0xd0, 0xd4, 0xda),
            Self::AxisText => Color::rgb(0x55, 0x5b, 0x66),
            Self::AxisTitle => Color::rgb(0x22, 0x25, 0x2b),
            Self::LabelBackground => Color::rgba(0xff, 0xff, 0xff, 0xd9),
            Self::LabelText => Color::rgb(0x33, 0x33, 0x33),
            Self::TodayMarker => Color::rgb(0xe7, 0x4c, 0x3c),
            Self::TooltipBackground => Color::rgba(0x1f, 0x23, 0x28, 0xeb),
            Self::TooltipText => Color::rgb(0xff, 0xff, 0xff),
        }
    }
}
