//! Core of the HCM project timeline: data model, calendar math, layout,
//! view transforms that emit `RenderCommand`s, hit testing and the
//! interactive [`TimelineView`].

pub mod config;
pub mod debounce;
pub mod drill_down;
pub mod error;
pub mod hit;
pub mod host;
pub mod layout;
pub mod loader;
pub mod model;
pub mod surface;
pub mod svg;
pub mod time;
pub mod view;
pub mod views;

pub use config::{Padding, PhasePalette, TimelineConfig};
pub use debounce::{Debounce, DebounceTicket};
pub use drill_down::{DrillDownRequest, DrillDownSequencer};
pub use error::TimelineError;
pub use hit::{ElementKey, HitElement, HitIndex};
pub use host::TimelineHost;
pub use layout::Layout;
pub use model::{DateRange, Phase, PhaseKind, Project, TimelineDataset};
pub use surface::{RecordingResolver, RecordingSurface, Surface, SurfaceResolver};
pub use time::{Granularity, TimePeriod, TimeScale, iso_week, time_periods};
pub use view::{Callbacks, ClickOutcome, PointerState, TimelineView, ViewState};
