use chrono::NaiveDate;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TimelineError {
    #[error("drawing surface not found: {0}")]
    SurfaceNotFound(String),
    #[error("invalid dataset: {0}")]
    InvalidDataset(String),
    #[error("invalid date range: end {end} is before start {start}")]
    InvalidDateRange { start: NaiveDate, end: NaiveDate },
    #[error("parse: {0}")]
    Parse(String),
}

impl From<serde_json::Error> for TimelineError {
    fn from(err: serde_json::Error) -> Self {
        Self::Parse(err.to_string())
    }
}
