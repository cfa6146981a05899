//! Serde helpers for calendar dates sent as ISO-8601 strings.
//!
//! The API emits plain dates (`2024-01-01`) but some endpoints serialize
//! datetimes (`2024-01-01T00:00:00`, `2024-01-01 00:00:00`) or RFC 2822
//! timestamps (`Mon, 01 Jan 2024 00:00:00 GMT`); only the date part is kept.

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serializer};

use crate::error::TimelineError;

const FORMAT: &str = "%Y-%m-%d";

pub fn parse(input: &str) -> Result<NaiveDate, TimelineError> {
    let trimmed = input.trim();
    let date_part = trimmed
        .split(['T', ' '])
        .next()
        .unwrap_or(trimmed);
    NaiveDate::parse_from_str(date_part, FORMAT)
        .or_else(|err| {
            chrono::DateTime::parse_from_rfc2822(trimmed)
                .map(|dt| dt.date_naive())
                .map_err(|_| err)
        })
        .map_err(|err| TimelineError::Parse(format!("date {trimmed:?}: {err}")))
}

pub fn format(date: NaiveDate) -> String {
    date.format(FORMAT).to_string()
}

pub fn serialize<S: Serializer>(date: &NaiveDate, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&format(*date))
}

pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveDate, D::Error> {
    let raw = String::deserialize(deserializer)?;
    parse(&raw).map_err(serde::de::Error::custom)
}

pub mod option {
    use chrono::NaiveDate;
    use serde::{Deserialize, Deserializer};

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<NaiveDate>, D::Error> {
        match Option::<String>::deserialize(deserializer)? {
            Some(raw) if !raw.trim().is_empty() => {
                super::parse(&raw).map(Some).map_err(serde::de::Error::custom)
            }
            _ => Ok(None),
        }
    }
}
