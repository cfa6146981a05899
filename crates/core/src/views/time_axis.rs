use hcm_timeline_protocol::{Point, Rect, RenderCommand, TextAlign, ThemeToken};

use crate::time::{Granularity, TimePeriod};

const LABEL_FONT_SIZE: f64 = 11.0;
const TITLE_FONT_SIZE: f64 = 14.0;
/// Distance of the period labels above the plot.
const LABEL_OFFSET_Y: f64 = 12.0;
const TITLE_OFFSET_Y: f64 = 42.0;

/// Period labels centred in their equal-width slots, plus the axis title.
pub fn render_time_axis(
    plot: Rect,
    periods: &[TimePeriod],
    granularity: Granularity,
    start_year: i32,
) -> Vec<RenderCommand> {
    let mut commands = Vec::with_capacity(periods.len() + 1);

    commands.push(RenderCommand::DrawText {
        position: Point::new(plot.x, plot.y - TITLE_OFFSET_Y),
        text: format!("{} view · {}", granularity.title(), start_year),
        color: ThemeToken::AxisTitle.into(),
        font_size: TITLE_FONT_SIZE,
        align: TextAlign::Left,
        bold: true,
    });

    if periods.is_empty() {
        return commands;
    }

    let slot = plot.w / periods.len() as f64;
    for (i, period) in periods.iter().enumerate() {
        commands.push(RenderCommand::DrawText {
            position: Point::new(plot.x + (i as f64 + 0.5) * slot, plot.y - LABEL_OFFSET_Y),
            text: period.label.clone(),
            color: ThemeToken::AxisText.into(),
            font_size: LABEL_FONT_SIZE,
            align: TextAlign::Center,
            bold: false,
        });
    }

    commands
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::DateRange;
    use crate::time::time_periods;
    use chrono::NaiveDate;

    #[test]
    fn labels_are_centred_in_slots() {
        let range = DateRange {
            min_date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            max_date: NaiveDate::from_ymd_opt(2024, 1, 31).unwrap(),
        };
        let periods = time_periods(&range, Granularity::Weekly);
        let plot = Rect::new(250.0, 60.0, 500.0, 300.0);
        let cmds = render_time_axis(plot, &periods, Granularity::Weekly, 2024);
        assert_eq!(cmds.len(), 6);

        match &cmds[0] {
            RenderCommand::DrawText { text, .. } => assert_eq!(text, "Weekly view · 2024"),
            other => panic!("unexpected {other:?}"),
        }
        match &cmds[1] {
            RenderCommand::DrawText {
                position,
                text,
                align,
                ..
            } => {
                assert_eq!(text, "W1");
                assert_eq!(position.x, 300.0);
                assert_eq!(*align, TextAlign::Center);
            }
            other => panic!("unexpected {other:?}"),
        }
    }
}
