//! Calendar math: period bucketing, ISO week numbers, and the date ↔ x mapping.

use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, Days, Months, NaiveDate, TimeDelta};
use hcm_timeline_protocol::Rect;
use serde::{Deserialize, Serialize};

use crate::model::DateRange;

/// Time-bucketing unit for the axis.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Granularity {
    #[default]
    Weekly,
    Monthly,
    Quarterly,
}

impl Granularity {
    pub const ALL: [Granularity; 3] = [Self::Weekly, Self::Monthly, Self::Quarterly];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Weekly => "weekly",
            Self::Monthly => "monthly",
            Self::Quarterly => "quarterly",
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            Self::Weekly => "Weekly",
            Self::Monthly => "Monthly",
            Self::Quarterly => "Quarterly",
        }
    }
}

impl fmt::Display for Granularity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownGranularity(pub String);

impl fmt::Display for UnknownGranularity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown granularity {:?}", self.0)
    }
}

impl std::error::Error for UnknownGranularity {}

impl FromStr for Granularity {
    type Err = UnknownGranularity;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim();
        Self::ALL
            .into_iter()
            .find(|g| g.as_str().eq_ignore_ascii_case(needle))
            .ok_or_else(|| UnknownGranularity(s.to_string()))
    }
}

/// One bucket of the axis. `end` is exclusive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimePeriod {
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub label: String,
}

/// Split `range` into consecutive periods starting at `min_date`.
///
/// Weekly steps are 7 days, monthly steps one calendar month and quarterly
/// steps three months, each measured from `min_date` (day clamped to the end of
/// short months). A period is emitted while its start is `<= max_date`, so the
/// result is never empty.
pub fn time_periods(range: &DateRange, granularity: Granularity) -> Vec<TimePeriod> {
    let starts = period_starts(range, granularity);
    let last_end = range
        .max_date
        .checked_add_days(Days::new(1))
        .unwrap_or(range.max_date);

    starts
        .iter()
        .enumerate()
        .map(|(i, &start)| TimePeriod {
            start,
            end: starts.get(i + 1).copied().unwrap_or(last_end),
            label: period_label(start, granularity),
        })
        .collect()
}

fn period_starts(range: &DateRange, granularity: Granularity) -> Vec<NaiveDate> {
    let mut starts = Vec::new();
    for step in 0u32.. {
        let next = match granularity {
            Granularity::Weekly => range
                .min_date
                .checked_add_days(Days::new(u64::from(step) * 7)),
            Granularity::Monthly => range.min_date.checked_add_months(Months::new(step)),
            Granularity::Quarterly => range
                .min_date
                .checked_add_months(Months::new(step.saturating_mul(3))),
        };
        match next {
            Some(start) if start <= range.max_date => starts.push(start),
            _ => break,
        }
    }
    starts
}

fn period_label(start: NaiveDate, granularity: Granularity) -> String {
    match granularity {
        Granularity::Weekly => format!("W{}", iso_week(start)),
        Granularity::Monthly => start.format("%b %y").to_string(),
        Granularity::Quarterly => format!("Q{} {}", start.month0() / 3 + 1, start.format("%y")),
    }
}

/// ISO-8601 week number (week 1 holds the year's first Thursday).
pub fn iso_week(date: NaiveDate) -> u32 {
    date.iso_week().week()
}

/// Signed whole days from `from` to `to`.
pub fn days_between(from: NaiveDate, to: NaiveDate) -> i64 {
    (to - from).num_days()
}

/// Maps dates onto the horizontal extent of the plot rectangle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimeScale {
    range: DateRange,
    left: f64,
    width: f64,
}

impl TimeScale {
    pub fn new(range: DateRange, plot: Rect) -> Self {
        Self {
            range,
            left: plot.x,
            width: plot.w.max(0.0),
        }
    }

    pub fn range(&self) -> DateRange {
        self.range
    }

    pub fn total_days(&self) -> i64 {
        self.range.total_days()
    }

    /// `left + days(min, date) / totalDays * width`.
    ///
    /// A zero-day span collapses every date onto `left`.
    pub fn date_to_x(&self, date: NaiveDate) -> f64 {
        let total = self.total_days();
        if total == 0 {
            return self.left;
        }
        let days = days_between(self.range.min_date, date) as f64;
        self.left + days / total as f64 * self.width
    }

    /// Inverse of [`date_to_x`](Self::date_to_x), floored to whole days.
    pub fn x_to_date(&self, x: f64) -> NaiveDate {
        let total = self.total_days();
        if total == 0 || self.width <= 0.0 || !x.is_finite() {
            return self.range.min_date;
        }
        let offset = ((x - self.left) / self.width * total as f64).floor() as i64;
        TimeDelta::try_days(offset)
            .and_then(|delta| self.range.min_date.checked_add_signed(delta))
            .unwrap_or(self.range.min_date)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap_or_default()
    }

    fn range(a: NaiveDate, b: NaiveDate) -> DateRange {
        DateRange {
            min_date: a,
            max_date: b,
        }
    }

    #[test]
    fn iso_week_boundaries() {
        assert_eq!(iso_week(date(2024, 1, 1)), 1);
        assert_eq!(iso_week(date(2023, 12, 31)), 52);
        assert_eq!(iso_week(date(2021, 1, 3)), 53);
    }

    #[test]
    fn january_2024_weekly() {
        let periods = time_periods(&range(date(2024, 1, 1), date(2024, 1, 31)), Granularity::Weekly);
        let labels: Vec<&str> = periods.iter().map(|p| p.label.as_str()).collect();
        assert_eq!(labels, vec!["W1", "W2", "W3", "W4", "W5"]);
        assert_eq!(periods[4].start, date(2024, 1, 29));
        assert_eq!(periods[4].end, date(2024, 2, 1));
        assert_eq!(periods[0].end, periods[1].start);
    }

    #[test]
    fn monthly_and_quarterly_labels() {
        let r = range(date(2024, 1, 15), date(2024, 7, 1));
        let months = time_periods(&r, Granularity::Monthly);
        assert_eq!(months.len(), 6);
        assert_eq!(months[0].label, "Jan 24");
        assert_eq!(months[5].label, "Jun 24");

        let quarters = time_periods(&r, Granularity::Quarterly);
        let labels: Vec<&str> = quarters.iter().map(|p| p.label.as_str()).collect();
        assert_eq!(labels, vec!["Q1 24", "Q2 24"]);
    }

    #[test]
    fn month_steps_clamp_to_month_end() {
        let r = range(date(2024, 1, 31), date(2024, 4, 30));
        let starts: Vec<NaiveDate> = time_periods(&r, Granularity::Monthly)
            .into_iter()
            .map(|p| p.start)
            .collect();
        assert_eq!(
            starts,
            vec![date(2024, 1, 31), date(2024, 2, 29), date(2024, 3, 31), date(2024, 4, 30)]
        );
    }

    #[test]
    fn single_day_range_has_one_period() {
        let r = range(date(2024, 5, 5), date(2024, 5, 5));
        for g in Granularity::ALL {
            assert_eq!(time_periods(&r, g).len(), 1, "{g}");
        }
    }

    #[test]
    fn scale_maps_endpoints() {
        let r = range(date(2024, 1, 1), date(2024, 1, 31));
        let scale = TimeScale::new(r, Rect::new(250.0, 60.0, 600.0, 300.0));
        assert_eq!(scale.total_days(), 30);
        assert_eq!(scale.date_to_x(date(2024, 1, 1)), 250.0);
        assert_eq!(scale.date_to_x(date(2024, 1, 31)), 850.0);
        assert_eq!(scale.x_to_date(250.0), date(2024, 1, 1));
        assert_eq!(scale.x_to_date(850.0), date(2024, 1, 31));
    }

    #[test]
    fn zero_span_collapses_to_left() {
        let r = range(date(2024, 1, 1), date(2024, 1, 1));
        let scale = TimeScale::new(r, Rect::new(250.0, 60.0, 600.0, 300.0));
        assert_eq!(scale.date_to_x(date(2024, 6, 1)), 250.0);
        assert_eq!(scale.x_to_date(700.0), date(2024, 1, 1));
    }

    #[test]
    fn granularity_parses_case_insensitively() {
        assert_eq!("Monthly".parse::<Granularity>(), Ok(Granularity::Monthly));
        assert!("daily".parse::<Granularity>().is_err());
    }
}
