use hcm_timeline_protocol::{Paint, Point, Rect, RenderCommand, TextAlign, ThemeToken};

use crate::config::PhasePalette;
use crate::hit::{ElementKey, HitElement, HitIndex};
use crate::layout::Layout;
use crate::model::Project;
use crate::time::TimeScale;

/// Labels longer than this are cut to `LABEL_MAX_CHARS - 3` plus `...`.
pub const LABEL_MAX_CHARS: usize = 32;
pub const MIN_BAR_WIDTH: f64 = 2.0;
const LABEL_FONT_SIZE: f64 = 12.0;
const LABEL_INSET_X: f64 = 10.0;
const LABEL_TEXT_X: f64 = 16.0;
const BAR_INSET_Y: f64 = 8.0;
const GRADIENT_DARKEN: f64 = 0.2;
const BORDER_DARKEN: f64 = 0.4;

/// One lane per project: a label box and the phase bars, in that order.
///
/// Every drawn bar is pushed to `hits`, so later bars win overlapping hit
/// tests. The index is expected to be empty on entry.
pub fn render_lanes(
    projects: &[&Project],
    layout: &Layout,
    scale: &TimeScale,
    palette: &PhasePalette,
    hits: &mut HitIndex,
) -> Vec<RenderCommand> {
    let mut commands = Vec::with_capacity(projects.len() * 8);
    let row_height = layout.row_height;
    let bar_height = (row_height - 2.0 * BAR_INSET_Y).max(row_height * 0.5);
    let bar_offset = (row_height - bar_height) / 2.0;

    for (lane, project) in projects.iter().enumerate() {
        let lane_y = layout.lane_y(lane);
        let label = project.display_label();

        commands.push(RenderCommand::BeginGroup {
            id: format!("lane:{}", project.project_id),
            label: Some(label.clone()),
        });

        commands.push(RenderCommand::DrawRect {
            rect: Rect::new(
                LABEL_INSET_X,
                lane_y + bar_offset,
                (layout.plot.x - 2.0 * LABEL_INSET_X).max(0.0),
                bar_height,
            ),
            fill: ThemeToken::LabelBackground.into(),
            border: None,
            element_id: None,
        });
        commands.push(RenderCommand::DrawText {
            position: Point::new(LABEL_TEXT_X, lane_y + row_height / 2.0),
            text: truncate_label(&label),
            color: ThemeToken::LabelText.into(),
            font_size: LABEL_FONT_SIZE,
            align: TextAlign::Left,
            bold: false,
        });

        for (phase_index, phase) in project.ordered_phases() {
            let start_x = scale.date_to_x(phase.start_date);
            let end_x = scale.date_to_x(phase.end_date);
            let width = (end_x - start_x).max(MIN_BAR_WIDTH);
            if !start_x.is_finite() || !width.is_finite() {
                continue;
            }

            let rect = Rect::new(start_x, lane_y + bar_offset, width, bar_height);
            let base = palette.color_for(&phase.phase);
            let element_id = hits.push(HitElement {
                key: ElementKey {
                    project_id: project.project_id,
                    phase_index,
                },
                rect,
            });

            commands.push(RenderCommand::DrawRect {
                rect,
                fill: Paint::VerticalGradient {
                    top: base,
                    bottom: base.darken(GRADIENT_DARKEN),
                },
                border: Some(Paint::Solid(base.darken(BORDER_DARKEN))),
                element_id: Some(element_id),
            });
        }

        commands.push(RenderCommand::EndGroup);
    }

    commands
}

/// Cut a lane label to [`LABEL_MAX_CHARS`] characters.
pub fn truncate_label(label: &str) -> String {
    if label.chars().count() <= LABEL_MAX_CHARS {
        return label.to_string();
    }
    let mut out: String = label.chars().take(LABEL_MAX_CHARS - 3).collect();
    out.push_str("...");
    out
}
