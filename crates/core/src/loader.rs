//! Normalizes `/api/timeline-data` rows into a [`TimelineDataset`].
//!
//! Endpoints disagree on key casing (`projectid`, `projectId`, `project_id`),
//! so the aliases are accepted here and nowhere else.

use std::collections::HashMap;

use chrono::{Days, NaiveDate};
use serde::{Deserialize, Deserializer};

use crate::error::TimelineError;
use crate::model::{DateRange, Phase, Project, TimelineDataset, iso_date};

/// One joined project/phase row as the API returns it.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TimelineRow {
    #[serde(alias = "projectId", alias = "project_id")]
    pub projectid: i64,
    #[serde(default, alias = "customerName", alias = "customer_name")]
    pub customername: String,
    #[serde(default, alias = "projectName", alias = "project_name")]
    pub projectname: String,
    #[serde(
        default,
        alias = "projectStartDate",
        alias = "project_start_date",
        deserialize_with = "iso_date::option::deserialize"
    )]
    pub projectstartdate: Option<NaiveDate>,
    #[serde(alias = "phaseName", alias = "phase_name")]
    pub phase: String,
    #[serde(
        default,
        alias = "durationWeeks",
        alias = "duration_weeks",
        deserialize_with = "lenient_weeks"
    )]
    pub durationweeks: Option<u32>,
    #[serde(
        default,
        alias = "startDate",
        alias = "start_date",
        deserialize_with = "iso_date::option::deserialize"
    )]
    pub startdate: Option<NaiveDate>,
    #[serde(
        default,
        alias = "endDate",
        alias = "end_date",
        deserialize_with = "iso_date::option::deserialize"
    )]
    pub enddate: Option<NaiveDate>,
}

/// Week counts arrive as integers, floats (`4.0`), numeric strings or null.
/// Negative and non-finite counts are treated as missing.
fn lenient_weeks<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<u32>, D::Error> {
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    let weeks = match value {
        Some(serde_json::Value::Number(n)) => n.as_f64(),
        Some(serde_json::Value::String(s)) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    Ok(weeks
        .filter(|f| f.is_finite() && *f >= 0.0 && *f <= f64::from(u32::MAX))
        .map(|f| f.round() as u32))
}

pub fn rows_from_json(json: &str) -> Result<Vec<TimelineRow>, TimelineError> {
    Ok(serde_json::from_str(json)?)
}

/// Group rows into projects in first-seen order and derive the date range.
///
/// A row with both dates is used as is. A row missing either date is placed
/// right after the previous phase of its project (or at `projectstartdate`)
/// and lasts `durationweeks`. Rows that fit neither are dropped with a
/// warning.
pub fn dataset_from_rows(rows: Vec<TimelineRow>) -> Result<TimelineDataset, TimelineError> {
    let mut projects: Vec<Project> = Vec::new();
    let mut slots: HashMap<i64, usize> = HashMap::new();
    let mut cursors: HashMap<i64, NaiveDate> = HashMap::new();
    let mut dropped = 0usize;

    for row in rows {
        let slot = *slots.entry(row.projectid).or_insert_with(|| {
            projects.push(Project {
                project_id: row.projectid,
                project_name: row.projectname.clone(),
                customer_name: row.customername.clone(),
                phases: Vec::new(),
            });
            projects.len() - 1
        });
        if let Some(start) = row.projectstartdate {
            cursors.entry(row.projectid).or_insert(start);
        }

        let Some((start, end)) = phase_span(&row, cursors.get(&row.projectid).copied()) else {
            tracing::warn!(
                project = row.projectid,
                phase = %row.phase,
                "dropping timeline row without usable dates"
            );
            dropped += 1;
            continue;
        };
        if end < start {
            tracing::warn!(project = row.projectid, phase = %row.phase, %start, %end, "dropping inverted phase");
            dropped += 1;
            continue;
        }

        cursors.insert(row.projectid, end);
        let mut phase = Phase::new(row.phase, start, end);
        phase.duration_weeks = row.durationweeks;
        projects[slot].phases.push(phase);
    }

    let range = projects
        .iter()
        .flat_map(|p| &p.phases)
        .fold(None, |acc: Option<(NaiveDate, NaiveDate)>, phase| {
            Some(match acc {
                None => (phase.start_date, phase.end_date),
                Some((lo, hi)) => (lo.min(phase.start_date), hi.max(phase.end_date)),
            })
        });
    let Some((min_date, max_date)) = range else {
        return Err(TimelineError::InvalidDataset(
            "no timeline rows with usable dates".into(),
        ));
    };

    tracing::debug!(
        projects = projects.len(),
        dropped,
        %min_date,
        %max_date,
        "timeline rows normalized"
    );
    Ok(TimelineDataset::new(DateRange::new(min_date, max_date)?, projects))
}

fn phase_span(row: &TimelineRow, cursor: Option<NaiveDate>) -> Option<(NaiveDate, NaiveDate)> {
    if let (Some(start), Some(end)) = (row.startdate, row.enddate) {
        return Some((start, end));
    }
    let weeks = row.durationweeks?;
    let start = row.startdate.or(cursor)?;
    let end = start.checked_add_days(Days::new(u64::from(weeks) * 7))?;
    Some((start, end))
}

/// Accept either a full dataset object or an array of API rows.
pub fn load_dataset_json(json: &str) -> Result<TimelineDataset, TimelineError> {
    let value: serde_json::Value = serde_json::from_str(json)?;
    if value.is_array() {
        let rows: Vec<TimelineRow> = serde_json::from_value(value)?;
        dataset_from_rows(rows)
    } else {
        TimelineDataset::from_value(value)
    }
}
