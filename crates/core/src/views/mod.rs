//! View transforms. Each function turns a slice of timeline state into the
//! render commands for one layer of the frame, back to front.

pub mod background;
pub mod grid;
pub mod lanes;
pub mod time_axis;
pub mod today;
pub mod tooltip;

pub use background::render_background;
pub use grid::render_grid;
pub use lanes::{render_lanes, truncate_label};
pub use time_axis::render_time_axis;
pub use today::render_today;
pub use tooltip::{render_tooltip, tooltip_lines};
