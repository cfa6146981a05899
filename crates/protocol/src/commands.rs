use serde::{Deserialize, Serialize};

use crate::theme::ThemeToken;
use crate::types::{Color, Point, Rect};

/// How a shape or glyph is filled.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Paint {
    /// A semantic color resolved by the renderer's palette.
    Token(ThemeToken),
    Solid(Color),
    /// Linear gradient from the top edge of the shape to its bottom edge.
    VerticalGradient { top: Color, bottom: Color },
}

impl From<ThemeToken> for Paint {
    fn from(token: ThemeToken) -> Self {
        Self::Token(token)
    }
}

impl From<Color> for Paint {
    fn from(color: Color) -> Self {
        Self::Solid(color)
    }
}

impl Paint {
    /// A single representative color, used by renderers that cannot do
    /// gradients (the gradient's top color wins).
    pub fn flatten(&self) -> Color {
        match self {
            Self::Token(token) => token.resolve(),
            Self::Solid(color) => *color,
            Self::VerticalGradient { top, .. } => *top,
        }
    }
}

/// A single, stateless render instruction.
///
/// The core emits a `Vec<RenderCommand>` per frame. Renderers consume
/// this list sequentially; each command carries all the data it needs and
/// all coordinates are CSS pixels.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum RenderCommand {
    /// Fill a rectangle, optionally stroking a 1px border. `element_id`
    /// tags hit-testable shapes.
    DrawRect {
        rect: Rect,
        fill: Paint,
        border: Option<Paint>,
        element_id: Option<u64>,
    },

    /// Draw a text string. `position.y` is the vertical middle of the glyphs.
    DrawText {
        position: Point,
        text: String,
        color: Paint,
        font_size: f64,
        align: TextAlign,
        bold: bool,
    },

    /// Draw a line segment. `dash` is an `(on, off)` pattern in pixels.
    DrawLine {
        from: Point,
        to: Point,
        color: Paint,
        width: f64,
        dash: Option<(f64, f64)>,
    },

    /// Begin a logical group (e.g. a lane). Renderers may use this for
    /// batching, layer separation, or accessibility.
    BeginGroup { id: String, label: Option<String> },

    /// End the current group.
    EndGroup,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TextAlign {
    Left,
    Center,
    Right,
}
