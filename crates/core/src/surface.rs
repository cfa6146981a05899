//! The drawing-surface seam between the view and a concrete backend.

use hcm_timeline_protocol::{RenderCommand, Viewport};

/// A place frames can be presented.
///
/// Implementations own their pixel buffer. The view sizes the surface with
/// [`resize`](Surface::resize) before presenting.
pub trait Surface {
    /// Width available from the hosting container, CSS pixels.
    fn container_width(&self) -> f64;

    fn device_pixel_ratio(&self) -> f64 {
        1.0
    }

    /// Set the CSS size and backing resolution.
    fn resize(&mut self, viewport: Viewport);

    /// Replace the surface contents with one frame.
    fn present(&mut self, commands: &[RenderCommand]);

    fn clear(&mut self);
}

/// Looks surfaces up by id, e.g. a canvas element id in the DOM.
pub trait SurfaceResolver {
    type Surface: Surface;

    fn resolve(&self, id: &str) -> Option<Self::Surface>;
}

/// Headless surface that keeps every presented frame. Used by exporters and
/// tests.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecordingSurface {
    pub container_width: f64,
    pub dpr: f64,
    pub viewport: Option<Viewport>,
    pub frames: Vec<Vec<RenderCommand>>,
    pub clears: usize,
}

impl RecordingSurface {
    pub fn new(container_width: f64) -> Self {
        Self {
            container_width,
            dpr: 1.0,
            ..Self::default()
        }
    }

    pub fn with_dpr(mut self, dpr: f64) -> Self {
        self.dpr = dpr;
        self
    }

    pub fn last_frame(&self) -> Option<&[RenderCommand]> {
        self.frames.last().map(Vec::as_slice)
    }

    pub fn frame_count(&self) -> usize {
        self.frames.len()
    }
}

impl Surface for RecordingSurface {
    fn container_width(&self) -> f64 {
        self.container_width
    }

    fn device_pixel_ratio(&self) -> f64 {
        self.dpr
    }

    fn resize(&mut self, viewport: Viewport) {
        self.viewport = Some(viewport);
    }

    fn present(&mut self, commands: &[RenderCommand]) {
        self.frames.push(commands.to_vec());
    }

    fn clear(&mut self) {
        self.clears += 1;
    }
}

/// Resolver over a fixed set of named container widths.
#[derive(Debug, Clone, Default)]
pub struct RecordingResolver {
    surfaces: Vec<(String, f64)>,
}

impl RecordingResolver {
    pub fn with_surface(mut self, id: impl Into<String>, container_width: f64) -> Self {
        self.surfaces.push((id.into(), container_width));
        self
    }
}

impl SurfaceResolver for RecordingResolver {
    type Surface = RecordingSurface;

    fn resolve(&self, id: &str) -> Option<RecordingSurface> {
        self.surfaces
            .iter()
            .find(|(name, _)| name == id)
            .map(|(_, width)| RecordingSurface::new(*width))
    }
}
