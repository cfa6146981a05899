use hcm_timeline_core::Surface;
use hcm_timeline_protocol::{Paint, Point, RenderCommand, TextAlign, Viewport};
use ratatui::{buffer::Buffer, layout::Rect, style::Color};

/// CSS pixels covered by one terminal column.
pub const CELL_WIDTH: f64 = 8.0;
/// CSS pixels covered by one terminal row. Half the default lane height.
pub const CELL_HEIGHT: f64 = 20.0;

fn paint_to_color(paint: &Paint) -> Color {
    let c = paint.flatten();
    Color::Rgb(c.r, c.g, c.b)
}

/// Centre of the cell at `(column, row)` relative to the drawing area.
pub fn cell_center(column: u16, row: u16) -> Point {
    Point::new(
        (f64::from(column) + 0.5) * CELL_WIDTH,
        (f64::from(row) + 0.5) * CELL_HEIGHT,
    )
}

fn to_col(x: f64) -> i32 {
    (x / CELL_WIDTH).floor() as i32
}

fn to_row(y: f64) -> i32 {
    (y / CELL_HEIGHT).floor() as i32
}

/// Headless surface sized from the terminal; frames are drawn into a ratatui
/// buffer at draw time.
#[derive(Debug, Default)]
pub struct TerminalSurface {
    columns: u16,
    viewport: Option<Viewport>,
    frame: Vec<RenderCommand>,
}

impl TerminalSurface {
    pub fn new(columns: u16) -> Self {
        Self {
            columns,
            ..Self::default()
        }
    }

    pub fn set_columns(&mut self, columns: u16) {
        self.columns = columns;
    }

    pub fn frame(&self) -> &[RenderCommand] {
        &self.frame
    }

    /// Rows the current viewport needs.
    pub fn rows(&self) -> u16 {
        self.viewport
            .map_or(0, |vp| (vp.height / CELL_HEIGHT).ceil() as u16)
    }
}

impl Surface for TerminalSurface {
    fn container_width(&self) -> f64 {
        f64::from(self.columns) * CELL_WIDTH
    }

    fn resize(&mut self, viewport: Viewport) {
        self.viewport = Some(viewport);
    }

    fn present(&mut self, commands: &[RenderCommand]) {
        self.frame = commands.to_vec();
    }

    fn clear(&mut self) {
        self.frame.clear();
    }
}

/// Rasterize a frame into `area` of `buf`, one cell per
/// [`CELL_WIDTH`] × [`CELL_HEIGHT`] block. `scroll_rows` shifts the frame up.
pub fn draw_commands(buf: &mut Buffer, area: Rect, commands: &[RenderCommand], scroll_rows: u16) {
    let mut put = |col: i32, row: i32, f: &mut dyn FnMut(&mut ratatui::buffer::Cell)| {
        let row = row - i32::from(scroll_rows);
        if col < 0 || row < 0 || col >= i32::from(area.width) || row >= i32::from(area.height) {
            return;
        }
        let x = area.x + col as u16;
        let y = area.y + row as u16;
        f(&mut buf[(x, y)]);
    };

    for cmd in commands {
        match cmd {
            RenderCommand::DrawRect {
                rect,
                fill,
                element_id,
                ..
            } => {
                let bg = paint_to_color(fill);
                let (c0, c1) = (to_col(rect.x), to_col(rect.right() - 0.01).max(to_col(rect.x)));
                let (r0, r1) = (to_row(rect.y), to_row(rect.bottom() - 0.01).max(to_row(rect.y)));
                for row in r0..=r1 {
                    for col in c0..=c1 {
                        put(col, row, &mut |cell| {
                            if element_id.is_some() {
                                cell.set_char('█').set_fg(bg);
                            } else {
                                cell.set_char(' ').set_bg(bg);
                            }
                        });
                    }
                }
            }
            RenderCommand::DrawLine {
                from,
                to,
                color,
                dash,
                ..
            } => {
                let fg = paint_to_color(color);
                if (from.x - to.x).abs() < f64::EPSILON {
                    let glyph = if dash.is_some() { '┊' } else { '│' };
                    let col = to_col(from.x);
                    for row in to_row(from.y.min(to.y))..to_row(from.y.max(to.y)) {
                        put(col, row, &mut |cell| {
                            cell.set_char(glyph).set_fg(fg);
                        });
                    }
                } else {
                    let glyph = if dash.is_some() { '┄' } else { '─' };
                    let row = to_row(from.y) - 1;
                    for col in to_col(from.x.min(to.x))..to_col(from.x.max(to.x)) {
                        put(col, row, &mut |cell| {
                            cell.set_char(glyph).set_fg(fg);
                        });
                    }
                }
            }
            RenderCommand::DrawText {
                position,
                text,
                color,
                align,
                ..
            } => {
                let fg = paint_to_color(color);
                let len = text.chars().count() as i32;
                let anchor = to_col(position.x);
                let start = match align {
                    TextAlign::Left => anchor,
                    TextAlign::Center => anchor - len / 2,
                    TextAlign::Right => anchor - len,
                };
                let row = to_row(position.y);
                for (i, ch) in text.chars().enumerate() {
                    put(start + i as i32, row, &mut |cell| {
                        cell.set_char(ch).set_fg(fg);
                    });
                }
            }
            RenderCommand::BeginGroup { .. } | RenderCommand::EndGroup => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hcm_timeline_protocol::{Color as Rgb, ThemeToken};

    fn symbol(buf: &Buffer, x: u16, y: u16) -> String {
        buf[(x, y)].symbol().to_string()
    }

    #[test]
    fn bars_render_as_blocks() {
        let area = Rect::new(0, 0, 20, 5);
        let mut buf = Buffer::empty(area);
        let cmds = vec![RenderCommand::DrawRect {
            rect: hcm_timeline_protocol::Rect::new(16.0, 20.0, 24.0, 20.0),
            fill: Paint::Solid(Rgb::rgb(255, 0, 0)),
            border: None,
            element_id: Some(0),
        }];
        draw_commands(&mut buf, area, &cmds, 0);
        assert_eq!(symbol(&buf, 2, 1), "█");
        assert_eq!(symbol(&buf, 4, 1), "█");
        assert_eq!(symbol(&buf, 5, 1), " ");
        assert_eq!(buf[(2, 1)].fg, Color::Rgb(255, 0, 0));
    }

    #[test]
    fn centred_text_and_dashed_line() {
        let area = Rect::new(0, 0, 20, 5);
        let mut buf = Buffer::empty(area);
        let cmds = vec![
            RenderCommand::DrawLine {
                from: Point::new(80.0, 20.0),
                to: Point::new(80.0, 80.0),
                color: ThemeToken::TodayMarker.into(),
                width: 2.0,
                dash: Some((5.0, 5.0)),
            },
            RenderCommand::DrawText {
                position: Point::new(80.0, 10.0),
                text: "TODAY".into(),
                color: ThemeToken::TodayMarker.into(),
                font_size: 10.0,
                align: TextAlign::Center,
                bold: true,
            },
        ];
        draw_commands(&mut buf, area, &cmds, 0);
        assert_eq!(symbol(&buf, 10, 1), "┊");
        assert_eq!(symbol(&buf, 10, 3), "┊");
        let row0: String = (8..13).map(|x| symbol(&buf, x, 0)).collect();
        assert_eq!(row0, "TODAY");
    }

    #[test]
    fn out_of_area_is_clipped() {
        let area = Rect::new(0, 0, 4, 2);
        let mut buf = Buffer::empty(area);
        let cmds = vec![RenderCommand::DrawText {
            position: Point::new(0.0, 10.0),
            text: "overflowing".into(),
            color: ThemeToken::LabelText.into(),
            font_size: 12.0,
            align: TextAlign::Left,
            bold: false,
        }];
        draw_commands(&mut buf, area, &cmds, 0);
        let row0: String = (0..4).map(|x| symbol(&buf, x, 0)).collect();
        assert_eq!(row0, "over");
    }

    #[test]
    fn surface_width_follows_columns() {
        let mut surface = TerminalSurface::new(100);
        assert_eq!(surface.container_width(), 800.0);
        surface.resize(Viewport::new(800.0, 400.0, 1.0));
        assert_eq!(surface.rows(), 20);
        assert_eq!(cell_center(0, 0), Point::new(4.0, 10.0));
    }
}
