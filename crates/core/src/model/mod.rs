pub mod dataset;
pub mod iso_date;
pub mod phase;

pub use dataset::{DateRange, Phase, Project, TimelineDataset};
pub use phase::PhaseKind;
