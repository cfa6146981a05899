//! JSON in, JSON out. Everything here runs natively so it can be tested
//! without a browser.

use chrono::NaiveDate;
use hcm_timeline_core::loader::load_dataset_json;
use hcm_timeline_core::model::iso_date;
use hcm_timeline_core::svg::render_svg;
use hcm_timeline_core::{
    Callbacks, DateRange, Granularity, Phase, Project, RecordingSurface, TimelineConfig,
    TimelineDataset, TimelineError, TimelineView, time_periods,
};
use serde::Serialize;

pub fn parse_dataset(json: &str) -> Result<TimelineDataset, TimelineError> {
    load_dataset_json(json)
}

/// Missing or blank config means all defaults.
pub fn parse_config(json: Option<&str>) -> Result<TimelineConfig, TimelineError> {
    match json.map(str::trim) {
        Some(raw) if !raw.is_empty() => TimelineConfig::from_json(raw),
        _ => Ok(TimelineConfig::default()),
    }
}

pub fn parse_granularity(label: &str) -> Result<Granularity, TimelineError> {
    label
        .parse()
        .map_err(|err: hcm_timeline_core::time::UnknownGranularity| {
            TimelineError::Parse(err.to_string())
        })
}

/// A JS number as a project id. Fractions, NaN and out-of-range values are
/// not ids.
pub fn project_id(value: f64) -> Option<i64> {
    let in_range = value >= i64::MIN as f64 && value < i64::MAX as f64;
    (value.is_finite() && value.fract() == 0.0 && in_range).then_some(value as i64)
}

/// Periods for `[min, max]` as a JSON array of `{ start, end, label }`.
pub fn periods_json(min: &str, max: &str, granularity: &str) -> Result<String, TimelineError> {
    let range = DateRange::new(iso_date::parse(min)?, iso_date::parse(max)?)?;
    let periods = time_periods(&range, parse_granularity(granularity)?);
    Ok(serde_json::to_string(&periods)?)
}

/// Render a dataset headlessly and return the SVG document.
pub fn export_svg(
    dataset_json: &str,
    config_json: Option<&str>,
    width: f64,
    today: Option<&str>,
) -> Result<String, TimelineError> {
    let dataset = parse_dataset(dataset_json)?;
    let config = parse_config(config_json)?;
    let mut view = TimelineView::new(
        RecordingSurface::new(width),
        dataset,
        config,
        Callbacks::default(),
    )?;
    if let Some(today) = today {
        let today: NaiveDate = iso_date::parse(today)?;
        view.set_today_provider(move || today);
    }
    let (commands, _) = view.build_frame();
    Ok(render_svg(&commands, &view.viewport()))
}

/// What a canvas click hands to JS.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum ClickPayload<'a> {
    Phase {
        project: &'a Project,
        phase: &'a Phase,
    },
    #[serde(rename_all = "camelCase")]
    Date {
        #[serde(serialize_with = "iso_date::serialize")]
        date: NaiveDate,
        week: u32,
        request_id: u64,
    },
}

pub fn payload_json(payload: &ClickPayload<'_>) -> Result<String, TimelineError> {
    Ok(serde_json::to_string(payload)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    const DATASET: &str = r#"{
        "dateRange": { "minDate": "2024-01-01", "maxDate": "2024-03-31" },
        "projects": [{
            "projectId": 3, "projectName": "Payroll", "customerName": "Globex",
            "phases": [{ "phase": "Plan", "startDate": "2024-01-08", "endDate": "2024-02-02" }]
        }]
    }"#;

    #[test]
    fn blank_config_is_default() {
        assert_eq!(parse_config(None).unwrap(), TimelineConfig::default());
        assert_eq!(parse_config(Some("  ")).unwrap(), TimelineConfig::default());
        let cfg = parse_config(Some(r#"{ "rowHeight": 32 }"#)).unwrap();
        assert_eq!(cfg.row_height, 32.0);
    }

    #[test]
    fn only_whole_numbers_are_project_ids() {
        assert_eq!(project_id(42.0), Some(42));
        assert_eq!(project_id(-7.0), Some(-7));
        assert_eq!(project_id(1.5), None);
        assert_eq!(project_id(f64::NAN), None);
        assert_eq!(project_id(f64::INFINITY), None);
        assert_eq!(project_id(1e20), None);
    }

    #[test]
    fn periods_as_json() {
        let json = periods_json("2024-01-01", "2024-03-31", "quarterly").unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value[0]["label"], "Q1 24");
        assert_eq!(value[0]["start"], "2024-01-01");
        assert!(periods_json("2024-01-01", "2024-03-31", "daily").is_err());
        assert!(matches!(
            periods_json("2024-03-31", "2024-01-01", "weekly"),
            Err(TimelineError::InvalidDateRange { .. })
        ));
    }

    #[test]
    fn svg_export_marks_today() {
        let svg = export_svg(DATASET, None, 900.0, Some("2024-02-01")).unwrap();
        assert!(svg.contains("TODAY"));
        assert!(svg.contains("lane:3"));
        let without = export_svg(DATASET, None, 900.0, Some("2025-01-01")).unwrap();
        assert!(!without.contains("TODAY"));
    }

    #[test]
    fn click_payloads_are_tagged() {
        let date = NaiveDate::from_ymd_opt(2024, 1, 8).unwrap();
        let json = payload_json(&ClickPayload::Date {
            date,
            week: 2,
            request_id: 4,
        })
        .unwrap();
        assert_eq!(
            json,
            r#"{"kind":"date","date":"2024-01-08","week":2,"requestId":4}"#
        );

        let dataset = parse_dataset(DATASET).unwrap();
        let project = &dataset.projects[0];
        let json = payload_json(&ClickPayload::Phase {
            project,
            phase: &project.phases[0],
        })
        .unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["kind"], "phase");
        assert_eq!(value["project"]["projectId"], 3);
        assert_eq!(value["phase"]["phase"], "Plan");
    }
}
