//! 2D-canvas implementation of [`Surface`].

use hcm_timeline_core::{Surface, SurfaceResolver};
use hcm_timeline_protocol::{Paint, Rect, RenderCommand, TextAlign, Viewport};
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement};

const FONT_FAMILY: &str = "system-ui, -apple-system, sans-serif";

pub struct CanvasSurface {
    canvas: HtmlCanvasElement,
    ctx: CanvasRenderingContext2d,
    viewport: Viewport,
}

impl CanvasSurface {
    pub fn new(canvas: HtmlCanvasElement) -> Result<Self, JsValue> {
        let ctx = canvas
            .get_context("2d")?
            .ok_or_else(|| JsValue::from_str("canvas has no 2d context"))?
            .dyn_into::<CanvasRenderingContext2d>()?;
        Ok(Self {
            viewport: Viewport::new(f64::from(canvas.width()), f64::from(canvas.height()), 1.0),
            canvas,
            ctx,
        })
    }

    pub fn canvas(&self) -> &HtmlCanvasElement {
        &self.canvas
    }

    fn draw(&self, cmd: &RenderCommand) -> Result<(), JsValue> {
        let ctx = &self.ctx;
        match cmd {
            RenderCommand::DrawRect {
                rect, fill, border, ..
            } => {
                self.set_fill(fill, *rect)?;
                ctx.fill_rect(rect.x, rect.y, rect.w, rect.h);
                if let Some(border) = border {
                    ctx.set_stroke_style_str(&border.flatten().to_css());
                    ctx.set_line_width(1.0);
                    ctx.stroke_rect(rect.x, rect.y, rect.w, rect.h);
                }
            }
            RenderCommand::DrawText {
                position,
                text,
                color,
                font_size,
                align,
                bold,
            } => {
                let weight = if *bold { "bold " } else { "" };
                ctx.set_font(&format!("{weight}{font_size}px {FONT_FAMILY}"));
                ctx.set_text_align(match align {
                    TextAlign::Left => "left",
                    TextAlign::Center => "center",
                    TextAlign::Right => "right",
                });
                ctx.set_text_baseline("middle");
                ctx.set_fill_style_str(&color.flatten().to_css());
                ctx.fill_text(text, position.x, position.y)?;
            }
            RenderCommand::DrawLine {
                from,
                to,
                color,
                width,
                dash,
            } => {
                let pattern = js_sys::Array::new();
                if let Some((on, off)) = dash {
                    pattern.push(&JsValue::from_f64(*on));
                    pattern.push(&JsValue::from_f64(*off));
                }
                ctx.set_line_dash(&pattern)?;
                ctx.set_stroke_style_str(&color.flatten().to_css());
                ctx.set_line_width(*width);
                ctx.begin_path();
                ctx.move_to(from.x, from.y);
                ctx.line_to(to.x, to.y);
                ctx.stroke();
                if dash.is_some() {
                    ctx.set_line_dash(&js_sys::Array::new())?;
                }
            }
            RenderCommand::BeginGroup { .. } | RenderCommand::EndGroup => {}
        }
        Ok(())
    }

    fn set_fill(&self, paint: &Paint, rect: Rect) -> Result<(), JsValue> {
        match paint {
            Paint::VerticalGradient { top, bottom } => {
                let gradient = self
                    .ctx
                    .create_linear_gradient(rect.x, rect.y, rect.x, rect.bottom());
                gradient.add_color_stop(0.0, &top.to_css())?;
                gradient.add_color_stop(1.0, &bottom.to_css())?;
                self.ctx.set_fill_style_canvas_gradient(&gradient);
            }
            other => self.ctx.set_fill_style_str(&other.flatten().to_css()),
        }
        Ok(())
    }
}

impl Surface for CanvasSurface {
    fn container_width(&self) -> f64 {
        let width = self
            .canvas
            .parent_element()
            .map_or_else(|| self.canvas.client_width(), |parent| parent.client_width());
        f64::from(width)
    }

    fn device_pixel_ratio(&self) -> f64 {
        web_sys::window().map_or(1.0, |w| w.device_pixel_ratio())
    }

    fn resize(&mut self, viewport: Viewport) {
        self.viewport = viewport;
        self.canvas.set_width(viewport.backing_width());
        self.canvas.set_height(viewport.backing_height());
        let style = self.canvas.style();
        let sized = style
            .set_property("width", &format!("{}px", viewport.width))
            .and_then(|()| style.set_property("height", &format!("{}px", viewport.height)));
        let scale = viewport.scale();
        if let Err(err) = sized.and_then(|()| self.ctx.set_transform(scale, 0.0, 0.0, scale, 0.0, 0.0)) {
            web_sys::console::error_2(&"hcm-timeline: canvas resize failed".into(), &err);
        }
    }

    fn present(&mut self, commands: &[RenderCommand]) {
        self.clear();
        for cmd in commands {
            if let Err(err) = self.draw(cmd) {
                web_sys::console::error_2(&"hcm-timeline: draw failed".into(), &err);
            }
        }
    }

    fn clear(&mut self) {
        self.ctx
            .clear_rect(0.0, 0.0, self.viewport.width, self.viewport.height);
    }
}

/// Resolves canvas element ids in the current document.
#[derive(Debug, Clone, Copy, Default)]
pub struct DomResolver;

impl SurfaceResolver for DomResolver {
    type Surface = CanvasSurface;

    fn resolve(&self, id: &str) -> Option<CanvasSurface> {
        let canvas = web_sys::window()?
            .document()?
            .get_element_by_id(id)?
            .dyn_into::<HtmlCanvasElement>()
            .ok()?;
        match CanvasSurface::new(canvas) {
            Ok(surface) => Some(surface),
            Err(err) => {
                web_sys::console::error_2(&"hcm-timeline: no 2d context".into(), &err);
                None
            }
        }
    }
}
