use chrono::NaiveDate;
use hcm_timeline_protocol::{Point, Rect, RenderCommand, TextAlign, ThemeToken};

use crate::time::TimeScale;

const FONT_SIZE: f64 = 10.0;
const LABEL_OFFSET_Y: f64 = 26.0;
const DASH: (f64, f64) = (5.0, 5.0);

/// Dashed vertical line at `today` with a `TODAY` label above the plot.
///
/// Dates outside the scale's range produce nothing.
pub fn render_today(today: NaiveDate, scale: &TimeScale, plot: Rect) -> Vec<RenderCommand> {
    if !scale.range().contains(today) {
        return Vec::new();
    }

    let x = scale.date_to_x(today);
    vec![
        RenderCommand::DrawLine {
            from: Point::new(x, plot.y),
            to: Point::new(x, plot.bottom()),
            color: ThemeToken::TodayMarker.into(),
            width: 2.0,
            dash: Some(DASH),
        },
        RenderCommand::DrawText {
            position: Point::new(x, plot.y - LABEL_OFFSET_Y),
            text: "TODAY".into(),
            color: ThemeToken::TodayMarker.into(),
            font_size: FONT_SIZE,
            align: TextAlign::Center,
            bold: true,
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::DateRange;

    fn scale() -> (TimeScale, Rect) {
        let plot = Rect::new(250.0, 60.0, 600.0, 300.0);
        let range = DateRange {
            min_date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            max_date: NaiveDate::from_ymd_opt(2024, 1, 31).unwrap(),
        };
        (TimeScale::new(range, plot), plot)
    }

    #[test]
    fn marker_inside_range() {
        let (scale, plot) = scale();
        let today = NaiveDate::from_ymd_opt(2024, 1, 16).unwrap();
        let cmds = render_today(today, &scale, plot);
        assert_eq!(cmds.len(), 2);
        match &cmds[0] {
            RenderCommand::DrawLine { from, to, dash, .. } => {
                assert_eq!(from.x, 550.0);
                assert_eq!(to.y, plot.bottom());
                assert!(dash.is_some());
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn nothing_outside_range() {
        let (scale, plot) = scale();
        let today = NaiveDate::from_ymd_opt(2025, 6, 1).unwrap();
        assert!(render_today(today, &scale, plot).is_empty());
    }
}
