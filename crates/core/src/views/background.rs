use hcm_timeline_protocol::{Rect, RenderCommand, ThemeToken, Viewport};

/// Surface fill followed by the plot panel.
pub fn render_background(viewport: &Viewport, plot: Rect) -> Vec<RenderCommand> {
    vec![
        RenderCommand::DrawRect {
            rect: Rect::new(0.0, 0.0, viewport.width, viewport.height),
            fill: ThemeToken::Background.into(),
            border: None,
            element_id: None,
        },
        RenderCommand::DrawRect {
            rect: plot,
            fill: ThemeToken::PlotBackground.into(),
            border: None,
            element_id: None,
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn surface_then_panel() {
        let plot = Rect::new(250.0, 60.0, 500.0, 300.0);
        let cmds = render_background(&Viewport::new(770.0, 400.0, 1.0), plot);
        assert_eq!(cmds.len(), 2);
        match &cmds[1] {
            RenderCommand::DrawRect { rect, fill, .. } => {
                assert_eq!(*rect, plot);
                assert_eq!(*fill, ThemeToken::PlotBackground.into());
            }
            other => panic!("unexpected {other:?}"),
        }
    }
}
