//! Surface sizing and lane assignment.

use std::collections::BTreeSet;

use hcm_timeline_protocol::{Rect, Viewport};

use crate::config::TimelineConfig;
use crate::model::{Project, TimelineDataset};

/// Surfaces never shrink below this height, so short lists are not cramped.
pub const MIN_SURFACE_HEIGHT: f64 = 400.0;
/// Room for the axis, title and bottom inset on top of the lanes.
pub const CHROME_HEIGHT: f64 = 150.0;

/// Resolved geometry for one surface size.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Layout {
    pub viewport: Viewport,
    pub plot: Rect,
    pub row_height: f64,
}

impl Layout {
    /// Size the surface to `container_width` × `max(400, rows * rowHeight + 150)`
    /// and inset the plot by the configured padding.
    pub fn compute(
        container_width: f64,
        device_pixel_ratio: f64,
        row_count: usize,
        config: &TimelineConfig,
    ) -> Self {
        let width = if container_width.is_finite() {
            container_width.max(0.0)
        } else {
            0.0
        };
        let height = (row_count as f64 * config.row_height + CHROME_HEIGHT).max(MIN_SURFACE_HEIGHT);
        let viewport = Viewport::new(width, height, device_pixel_ratio);

        let pad = config.padding;
        let plot = Rect::new(
            pad.left,
            pad.top,
            (width - pad.left - pad.right).max(0.0),
            (height - pad.top - pad.bottom).max(0.0),
        );

        Self {
            viewport,
            plot,
            row_height: config.row_height,
        }
    }

    /// Top edge of the lane at `index`.
    pub fn lane_y(&self, index: usize) -> f64 {
        self.plot.y + index as f64 * self.row_height
    }
}

/// Projects that get a lane, in dataset order.
///
/// With a filter only the listed ids appear; unknown ids simply match nothing.
pub fn visible_projects<'a>(
    dataset: &'a TimelineDataset,
    filter: Option<&BTreeSet<i64>>,
) -> Vec<&'a Project> {
    dataset
        .projects
        .iter()
        .filter(|p| filter.is_none_or(|ids| ids.contains(&p.project_id)))
        .collect()
}
