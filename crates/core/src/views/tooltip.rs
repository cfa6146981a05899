use hcm_timeline_protocol::{Point, Rect, RenderCommand, TextAlign, ThemeToken, Viewport};

use crate::model::{Phase, Project};

const FONT_SIZE: f64 = 12.0;
const LINE_HEIGHT: f64 = 18.0;
/// Approximate advance of one glyph at `FONT_SIZE`.
const CHAR_WIDTH: f64 = 7.0;
const PAD_X: f64 = 10.0;
const PAD_Y: f64 = 8.0;
const GAP: f64 = 8.0;
const MARGIN: f64 = 4.0;

/// Text lines shown for a hovered phase bar.
pub fn tooltip_lines(project: &Project, phase: &Phase) -> Vec<String> {
    vec![
        project.display_label(),
        format!("Phase: {}", phase.phase),
        format!("Start: {}", phase.start_date.format("%Y-%m-%d")),
        format!("End: {}", phase.end_date.format("%Y-%m-%d")),
        format!("Duration: {} weeks", phase.duration_weeks()),
    ]
}

/// Where a `w` × `h` box goes for a bar at `anchor`.
///
/// Below the bar by default, above it when the bottom edge would overflow,
/// then clamped to the surface on every side.
pub fn tooltip_rect(anchor: Rect, w: f64, h: f64, viewport: &Viewport) -> Rect {
    let mut y = anchor.bottom() + GAP;
    if y + h > viewport.height - MARGIN {
        y = anchor.y - GAP - h;
    }
    let max_y = (viewport.height - h - MARGIN).max(MARGIN);
    let max_x = (viewport.width - w - MARGIN).max(MARGIN);
    Rect::new(
        anchor.x.clamp(MARGIN, max_x),
        y.clamp(MARGIN, max_y),
        w,
        h,
    )
}

/// Dark box with one text line per tooltip field, first line bold.
pub fn render_tooltip(
    project: &Project,
    phase: &Phase,
    anchor: Rect,
    viewport: &Viewport,
) -> Vec<RenderCommand> {
    let lines = tooltip_lines(project, phase);
    let widest = lines.iter().map(|l| l.chars().count()).max().unwrap_or(0);
    let w = widest as f64 * CHAR_WIDTH + 2.0 * PAD_X;
    let h = lines.len() as f64 * LINE_HEIGHT + 2.0 * PAD_Y;
    let rect = tooltip_rect(anchor, w, h, viewport);

    let mut commands = Vec::with_capacity(lines.len() + 1);
    commands.push(RenderCommand::DrawRect {
        rect,
        fill: ThemeToken::TooltipBackground.into(),
        border: None,
        element_id: None,
    });
    for (i, line) in lines.into_iter().enumerate() {
        commands.push(RenderCommand::DrawText {
            position: Point::new(
                rect.x + PAD_X,
                rect.y + PAD_Y + (i as f64 + 0.5) * LINE_HEIGHT,
            ),
            text: line,
            color: ThemeToken::TooltipText.into(),
            font_size: FONT_SIZE,
            align: TextAlign::Left,
            bold: i == 0,
        });
    }
    commands
}
