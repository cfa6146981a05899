use hcm_timeline_protocol::{Point, Rect, RenderCommand, ThemeToken};

/// Vertical period boundaries and one divider under every rendered lane.
///
/// Periods share the plot width equally, so `period_count` periods need
/// `period_count + 1` verticals. Lane dividers span the label column too.
pub fn render_grid(
    plot: Rect,
    period_count: usize,
    lane_count: usize,
    row_height: f64,
) -> Vec<RenderCommand> {
    let mut commands = Vec::with_capacity(period_count + lane_count + 1);

    if period_count > 0 {
        let step = plot.w / period_count as f64;
        for i in 0..=period_count {
            let x = plot.x + i as f64 * step;
            commands.push(RenderCommand::DrawLine {
                from: Point::new(x, plot.y),
                to: Point::new(x, plot.bottom()),
                color: ThemeToken::GridLine.into(),
                width: 1.0,
                dash: None,
            });
        }
    }

    for lane in 0..lane_count {
        let y = plot.y + (lane + 1) as f64 * row_height;
        commands.push(RenderCommand::DrawLine {
            from: Point::new(0.0, y),
            to: Point::new(plot.right(), y),
            color: ThemeToken::LaneDivider.into(),
            width: 1.0,
            dash: None,
        });
    }

    commands
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lines(cmds: &[RenderCommand]) -> Vec<(Point, Point)> {
        cmds.iter()
            .filter_map(|c| match c {
                RenderCommand::DrawLine { from, to, .. } => Some((*from, *to)),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn one_more_vertical_than_periods() {
        let plot = Rect::new(100.0, 50.0, 500.0, 200.0);
        let cmds = render_grid(plot, 5, 0, 40.0);
        let verticals = lines(&cmds);
        assert_eq!(verticals.len(), 6);
        assert_eq!(verticals[0].0.x, 100.0);
        assert_eq!(verticals[5].0.x, 600.0);
    }

    #[test]
    fn divider_under_each_lane() {
        let plot = Rect::new(100.0, 50.0, 500.0, 200.0);
        let cmds = render_grid(plot, 0, 3, 40.0);
        let ys: Vec<f64> = lines(&cmds).iter().map(|(a, _)| a.y).collect();
        assert_eq!(ys, vec![90.0, 130.0, 170.0]);
    }
}
