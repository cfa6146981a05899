use std::collections::HashSet;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::TimelineError;
use crate::model::iso_date;
use crate::model::phase::PhaseKind;

/// Inclusive calendar span shown on the time axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DateRange {
    #[serde(with = "iso_date")]
    pub min_date: NaiveDate,
    #[serde(with = "iso_date")]
    pub max_date: NaiveDate,
}

impl DateRange {
    /// Build a range, rejecting `max < min`.
    pub fn new(min_date: NaiveDate, max_date: NaiveDate) -> Result<Self, TimelineError> {
        if max_date < min_date {
            return Err(TimelineError::InvalidDateRange {
                start: min_date,
                end: max_date,
            });
        }
        Ok(Self { min_date, max_date })
    }

    /// Whole days between `min_date` and `max_date`; zero for a single-day range.
    pub fn total_days(&self) -> i64 {
        (self.max_date - self.min_date).num_days().max(0)
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.min_date && date <= self.max_date
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Phase {
    pub phase: PhaseKind,
    #[serde(with = "iso_date")]
    pub start_date: NaiveDate,
    #[serde(with = "iso_date")]
    pub end_date: NaiveDate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration_weeks: Option<u32>,
}

impl Phase {
    pub fn new(phase: impl Into<PhaseKind>, start_date: NaiveDate, end_date: NaiveDate) -> Self {
        Self {
            phase: phase.into(),
            start_date,
            end_date,
            duration_weeks: None,
        }
    }

    /// `ceil(days / 7) + 1`, counting the start week itself.
    pub fn derived_duration_weeks(&self) -> u32 {
        let days = (self.end_date - self.start_date).num_days().max(0);
        let weeks = (days + 6) / 7 + 1;
        u32::try_from(weeks).unwrap_or(u32::MAX)
    }

    /// Duration reported by the API when present, otherwise derived.
    pub fn duration_weeks(&self) -> u32 {
        self.duration_weeks
            .unwrap_or_else(|| self.derived_duration_weeks())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub project_id: i64,
    pub project_name: String,
    #[serde(default)]
    pub customer_name: String,
    #[serde(default)]
    pub phases: Vec<Phase>,
}

impl Project {
    /// Lane label: `"Customer - Project"`, or just the project name.
    pub fn display_label(&self) -> String {
        if self.customer_name.trim().is_empty() {
            self.project_name.clone()
        } else {
            format!("{} - {}", self.customer_name, self.project_name)
        }
    }

    /// Phases in draw order paired with their index in `phases`.
    ///
    /// Canonical sequence first, then start date; ties keep input order.
    pub fn ordered_phases(&self) -> Vec<(usize, &Phase)> {
        let mut ordered: Vec<(usize, &Phase)> = self.phases.iter().enumerate().collect();
        ordered.sort_by(|(_, a), (_, b)| {
            a.phase
                .sequence()
                .cmp(&b.phase.sequence())
                .then(a.start_date.cmp(&b.start_date))
        });
        ordered
    }
}

/// Everything one render cycle needs. Replaced wholesale, never patched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimelineDataset {
    pub date_range: DateRange,
    #[serde(default)]
    pub projects: Vec<Project>,
}

impl TimelineDataset {
    pub fn new(date_range: DateRange, projects: Vec<Project>) -> Self {
        Self {
            date_range,
            projects,
        }
    }

    pub fn from_json(json: &str) -> Result<Self, TimelineError> {
        let value: serde_json::Value = serde_json::from_str(json)?;
        Self::from_value(value)
    }

    pub fn from_value(value: serde_json::Value) -> Result<Self, TimelineError> {
        if value.get("dateRange").is_none_or(serde_json::Value::is_null) {
            return Err(TimelineError::InvalidDataset("missing dateRange".into()));
        }
        let dataset: Self = serde_json::from_value(value)?;
        dataset.validate()?;
        Ok(dataset)
    }

    /// Reject an inverted date range and repeated project ids, which would
    /// make hit results ambiguous. Empty project lists are legal.
    pub fn validate(&self) -> Result<(), TimelineError> {
        if self.date_range.max_date < self.date_range.min_date {
            return Err(TimelineError::InvalidDataset(format!(
                "maxDate {} is before minDate {}",
                self.date_range.max_date, self.date_range.min_date
            )));
        }
        let mut seen = HashSet::with_capacity(self.projects.len());
        if let Some(dup) = self.projects.iter().find(|p| !seen.insert(p.project_id)) {
            return Err(TimelineError::InvalidDataset(format!(
                "duplicate projectId {}",
                dup.project_id
            )));
        }
        Ok(())
    }

    pub fn project(&self, project_id: i64) -> Option<&Project> {
        self.projects.iter().find(|p| p.project_id == project_id)
    }
}
